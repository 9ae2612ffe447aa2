//! Session manager: owns the authenticated API handle.
//!
//! The remote API expires sessions under long scans, so the scan loop asks
//! for a periodic [`Session::reconnect`]. That policy (when to reconnect)
//! lives in the report assembler; this module only knows how.

use tracing::{debug, warn};

use crate::client::ManagementApi;
use crate::error::SnapshotError;

/// API versions this tool knows how to talk to. A compatibility gate, not a
/// negotiated capability.
pub const SUPPORTED_API: &[&str] = &["11.1", "12", "13", "13.0", "14", "14.0", "15", "15.0"];

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// An authenticated session over any [`ManagementApi`] implementation.
pub struct Session<C: ManagementApi> {
    client: C,
    credentials: Credentials,
    token: String,
}

impl<C: ManagementApi> Session<C> {
    /// Authenticate and return a live session.
    pub fn open(client: C, credentials: Credentials) -> Result<Self, SnapshotError> {
        let token = client
            .login(&credentials.username, &credentials.password)
            .map_err(SnapshotError::Auth)?;
        debug!("session opened");
        Ok(Self {
            client,
            credentials,
            token,
        })
    }

    /// Check the server's API version against [`SUPPORTED_API`]. Returns the
    /// reported version on success.
    pub fn verify_api_version(&self) -> Result<String, SnapshotError> {
        let version = self.client.api_version()?;
        if !SUPPORTED_API.contains(&version.as_str()) {
            return Err(SnapshotError::UnsupportedApi {
                found: version,
                supported: SUPPORTED_API.join(", "),
            });
        }
        Ok(version)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Drop the current token and log in again. The logout is best-effort:
    /// the old token may already have expired, which is exactly the situation
    /// this refresh works around.
    pub fn reconnect(&mut self) -> Result<(), SnapshotError> {
        if let Err(e) = self.client.logout(&self.token) {
            debug!(error = %e, "logout of stale session failed, continuing");
        }
        self.token = self
            .client
            .login(&self.credentials.username, &self.credentials.password)
            .map_err(SnapshotError::Reconnect)?;
        debug!("session refreshed");
        Ok(())
    }

    /// Log out. Transport errors are reported but never propagate; the report
    /// already produced must stay usable.
    pub fn close(self) {
        if let Err(e) = self.client.logout(&self.token) {
            warn!(error = %e, "logout failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    fn credentials() -> Credentials {
        Credentials {
            username: "admin".into(),
            password: "secret".into(),
        }
    }

    #[test]
    fn open_fails_on_bad_credentials() {
        let api = FakeApi {
            fail_login: true,
            ..FakeApi::default()
        };
        let err = Session::open(api, credentials()).err().expect("must fail");
        assert!(matches!(err, SnapshotError::Auth(_)));
    }

    #[test]
    fn version_gate_rejects_unknown_versions() {
        let api = FakeApi {
            version: "10.5".into(),
            ..FakeApi::default()
        };
        let session = Session::open(api, credentials()).unwrap();
        let err = session.verify_api_version().err().expect("must fail");
        assert!(matches!(
            err,
            SnapshotError::UnsupportedApi { found, .. } if found == "10.5"
        ));
    }

    #[test]
    fn version_gate_accepts_each_supported_version() {
        for v in SUPPORTED_API {
            let api = FakeApi {
                version: (*v).to_string(),
                ..FakeApi::default()
            };
            let session = Session::open(api, credentials()).unwrap();
            assert_eq!(session.verify_api_version().unwrap(), *v);
        }
    }

    #[test]
    fn reconnect_survives_a_stale_token() {
        let api = FakeApi {
            fail_logout: true,
            ..FakeApi::default()
        };
        let mut session = Session::open(api, credentials()).unwrap();
        let before = session.token().to_string();
        session.reconnect().expect("stale logout must not abort");
        assert_ne!(session.token(), before);
        assert_eq!(session.client().logins.get(), 2);
    }
}
