//! Error taxonomy for a snapshot run.

use crate::client::ApiError;
use crate::report::sink::SinkError;

/// Fatal errors for a snapshot run. Host-scoped transport failures never
/// surface here; the scan loop logs them and moves on to the next host.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Bad credentials or unreachable server at login time.
    #[error("authentication failed: {0}")]
    Auth(#[source] ApiError),

    /// The server speaks an API version outside the supported set.
    #[error("unsupported API version {found} (supported: {supported})")]
    UnsupportedApi { found: String, supported: String },

    /// A scan-scoped remote call failed (host enumeration, version check).
    #[error(transparent)]
    Transport(#[from] ApiError),

    /// The periodic session refresh failed; the session is unusable for the
    /// remainder of the scan.
    #[error("session reconnect failed: {0}")]
    Reconnect(#[source] ApiError),

    /// The report file cannot be written.
    #[error("cannot write report: {0}")]
    Output(#[from] SinkError),
}
