//! errasnap — errata snapshot reports for Spacewalk / Uyuni managed hosts.
//!
//! Connects to a management server's RPC API, walks every managed host,
//! resolves the errata (and optionally uncovered package updates) relevant
//! to each one, and writes a semicolon-delimited report with one row per
//! (host, finding) pair.

pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod report;
pub mod session;
/// In-memory API double, shared by unit and integration tests.
pub mod testing;
