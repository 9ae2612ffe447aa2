//! Typed HTTP client for the management server's RPC API.
//!
//! The call set mirrors the Spacewalk / Uyuni API namespaces (`auth.*`,
//! `system.*`, `errata.*`, `packages.*`). Everything downstream of the
//! session layer talks to the [`ManagementApi`] trait so tests can run the
//! whole scan against an in-memory server.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::domain::types::{Erratum, ErratumRef, Host, NetworkInfo, PackageUpdate};

/// A single remote call failed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{method} failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} returned a malformed payload: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} rejected: {reason}")]
    Rejected {
        method: &'static str,
        reason: String,
    },
}

/// The management server's RPC surface, one method per remote call.
///
/// Calls are blocking request/response; the scan is a single sequential
/// control flow, so no call ever overlaps another on the same handle.
pub trait ManagementApi {
    fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;
    fn logout(&self, token: &str) -> Result<(), ApiError>;
    fn api_version(&self) -> Result<String, ApiError>;
    fn list_systems(&self, token: &str) -> Result<Vec<Host>, ApiError>;
    fn relevant_errata(&self, token: &str, system_id: i64) -> Result<Vec<Erratum>, ApiError>;
    fn upgradable_packages(
        &self,
        token: &str,
        system_id: i64,
    ) -> Result<Vec<PackageUpdate>, ApiError>;
    fn network(&self, token: &str, system_id: i64) -> Result<NetworkInfo, ApiError>;
    fn custom_values(
        &self,
        token: &str,
        system_id: i64,
    ) -> Result<HashMap<String, String>, ApiError>;
    fn details(
        &self,
        token: &str,
        system_id: i64,
    ) -> Result<serde_json::Map<String, serde_json::Value>, ApiError>;
    fn errata_keywords(&self, token: &str, advisory_name: &str) -> Result<Vec<String>, ApiError>;
    fn providing_errata(&self, token: &str, package_id: i64) -> Result<Vec<ErratumRef>, ApiError>;
}

/// Response envelope used by the server's HTTP API bridge.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    result: Option<T>,
    #[serde(default)]
    messages: Vec<String>,
}

pub struct HttpApiClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpApiClient {
    /// Build a client for `http://<server>/rpc/api`.
    pub fn new(server: &str) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| ApiError::Http {
                method: "client.build",
                source,
            })?;
        Ok(Self {
            base_url: format!("http://{}/rpc/api", server.trim_end_matches('/')),
            http,
        })
    }

    // ── Internal helpers ───────────────────────────────────

    fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .http
            .post(&url)
            .json(&params)
            .send()
            .map_err(|source| ApiError::Http { method, source })?;

        if !resp.status().is_success() {
            return Err(ApiError::Rejected {
                method,
                reason: format!("HTTP {}", resp.status()),
            });
        }

        let envelope: ApiResponse<T> = resp
            .json()
            .map_err(|source| ApiError::Decode { method, source })?;

        if !envelope.success {
            return Err(ApiError::Rejected {
                method,
                reason: envelope.messages.join("; "),
            });
        }
        envelope.result.ok_or(ApiError::Rejected {
            method,
            reason: "empty result".into(),
        })
    }
}

impl ManagementApi for HttpApiClient {
    fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        self.call("auth.login", json!({ "login": username, "password": password }))
    }

    fn logout(&self, token: &str) -> Result<(), ApiError> {
        // auth.logout returns an integer status; the value carries no
        // information we act on.
        let _: i64 = self.call("auth.logout", json!({ "sessionKey": token }))?;
        Ok(())
    }

    fn api_version(&self) -> Result<String, ApiError> {
        self.call("api.getVersion", json!({}))
    }

    fn list_systems(&self, token: &str) -> Result<Vec<Host>, ApiError> {
        self.call("system.listSystems", json!({ "sessionKey": token }))
    }

    fn relevant_errata(&self, token: &str, system_id: i64) -> Result<Vec<Erratum>, ApiError> {
        self.call(
            "system.getRelevantErrata",
            json!({ "sessionKey": token, "sid": system_id }),
        )
    }

    fn upgradable_packages(
        &self,
        token: &str,
        system_id: i64,
    ) -> Result<Vec<PackageUpdate>, ApiError> {
        self.call(
            "system.listLatestUpgradablePackages",
            json!({ "sessionKey": token, "sid": system_id }),
        )
    }

    fn network(&self, token: &str, system_id: i64) -> Result<NetworkInfo, ApiError> {
        self.call(
            "system.getNetwork",
            json!({ "sessionKey": token, "sid": system_id }),
        )
    }

    fn custom_values(
        &self,
        token: &str,
        system_id: i64,
    ) -> Result<HashMap<String, String>, ApiError> {
        self.call(
            "system.getCustomValues",
            json!({ "sessionKey": token, "sid": system_id }),
        )
    }

    fn details(
        &self,
        token: &str,
        system_id: i64,
    ) -> Result<serde_json::Map<String, serde_json::Value>, ApiError> {
        self.call(
            "system.getDetails",
            json!({ "sessionKey": token, "sid": system_id }),
        )
    }

    fn errata_keywords(&self, token: &str, advisory_name: &str) -> Result<Vec<String>, ApiError> {
        self.call(
            "errata.listKeywords",
            json!({ "sessionKey": token, "advisoryName": advisory_name }),
        )
    }

    fn providing_errata(&self, token: &str, package_id: i64) -> Result<Vec<ErratumRef>, ApiError> {
        self.call(
            "packages.listProvidingErrata",
            json!({ "sessionKey": token, "pid": package_id }),
        )
    }
}
