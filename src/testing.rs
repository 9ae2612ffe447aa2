//! In-memory management API for tests.
//!
//! `FakeApi` implements [`ManagementApi`](crate::client::ManagementApi) over
//! plain maps so unit and integration tests can run the entire scan without
//! a server. Call counters use `Cell` because the trait takes `&self`.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use crate::client::{ApiError, ManagementApi};
use crate::domain::types::{
    AdvisoryType, Erratum, ErratumRef, Host, NetworkInfo, PackageUpdate,
};

pub fn fake_erratum(advisory_name: &str) -> Erratum {
    Erratum {
        advisory_name: advisory_name.to_string(),
        advisory_type: AdvisoryType::Security,
        advisory_synopsis: format!("{advisory_name} synopsis"),
        update_date: "2014-06-05".to_string(),
        reboot_suggested: false,
    }
}

pub fn fake_update(name: &str, package_id: i64) -> PackageUpdate {
    PackageUpdate {
        name: name.to_string(),
        from_version: "1.0".to_string(),
        from_release: "1".to_string(),
        to_version: "1.1".to_string(),
        to_release: "2".to_string(),
        to_package_id: package_id,
    }
}

#[derive(Debug)]
pub struct FakeApi {
    pub version: String,
    pub hosts: Vec<Host>,
    pub errata: HashMap<i64, Vec<Erratum>>,
    pub updates: HashMap<i64, Vec<PackageUpdate>>,
    pub networks: HashMap<i64, String>,
    pub custom_values: HashMap<i64, HashMap<String, String>>,
    pub virtualized: HashSet<i64>,
    pub keywords: HashMap<String, Vec<String>>,
    /// Package IDs already provided by some erratum.
    pub covered_packages: HashSet<i64>,

    pub fail_login: bool,
    /// Fail every login after the first (reconnects only).
    pub fail_relogin: bool,
    pub fail_logout: bool,
    pub fail_errata_for: HashSet<i64>,

    pub logins: Cell<usize>,
    pub logouts: Cell<usize>,
    pub network_calls: Cell<usize>,
    pub keyword_calls: Cell<usize>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            version: "14".to_string(),
            hosts: Vec::new(),
            errata: HashMap::new(),
            updates: HashMap::new(),
            networks: HashMap::new(),
            custom_values: HashMap::new(),
            virtualized: HashSet::new(),
            keywords: HashMap::new(),
            covered_packages: HashSet::new(),
            fail_login: false,
            fail_relogin: false,
            fail_logout: false,
            fail_errata_for: HashSet::new(),
            logins: Cell::new(0),
            logouts: Cell::new(0),
            network_calls: Cell::new(0),
            keyword_calls: Cell::new(0),
        }
    }
}

fn rejected(method: &'static str, reason: &str) -> ApiError {
    ApiError::Rejected {
        method,
        reason: reason.to_string(),
    }
}

impl ManagementApi for FakeApi {
    fn login(&self, _username: &str, _password: &str) -> Result<String, ApiError> {
        if self.fail_login {
            return Err(rejected("auth.login", "invalid credentials"));
        }
        if self.fail_relogin && self.logins.get() >= 1 {
            return Err(rejected("auth.login", "server unreachable"));
        }
        self.logins.set(self.logins.get() + 1);
        Ok(format!("token-{}", self.logins.get()))
    }

    fn logout(&self, _token: &str) -> Result<(), ApiError> {
        self.logouts.set(self.logouts.get() + 1);
        if self.fail_logout {
            return Err(rejected("auth.logout", "session already expired"));
        }
        Ok(())
    }

    fn api_version(&self) -> Result<String, ApiError> {
        Ok(self.version.clone())
    }

    fn list_systems(&self, _token: &str) -> Result<Vec<Host>, ApiError> {
        Ok(self.hosts.clone())
    }

    fn relevant_errata(&self, _token: &str, system_id: i64) -> Result<Vec<Erratum>, ApiError> {
        if self.fail_errata_for.contains(&system_id) {
            return Err(rejected("system.getRelevantErrata", "transport failure"));
        }
        Ok(self.errata.get(&system_id).cloned().unwrap_or_default())
    }

    fn upgradable_packages(
        &self,
        _token: &str,
        system_id: i64,
    ) -> Result<Vec<PackageUpdate>, ApiError> {
        Ok(self.updates.get(&system_id).cloned().unwrap_or_default())
    }

    fn network(&self, _token: &str, system_id: i64) -> Result<NetworkInfo, ApiError> {
        self.network_calls.set(self.network_calls.get() + 1);
        Ok(NetworkInfo {
            ip: self.networks.get(&system_id).cloned().unwrap_or_default(),
            hostname: None,
        })
    }

    fn custom_values(
        &self,
        _token: &str,
        system_id: i64,
    ) -> Result<HashMap<String, String>, ApiError> {
        Ok(self
            .custom_values
            .get(&system_id)
            .cloned()
            .unwrap_or_default())
    }

    fn details(
        &self,
        _token: &str,
        system_id: i64,
    ) -> Result<serde_json::Map<String, serde_json::Value>, ApiError> {
        let mut details = serde_json::Map::new();
        details.insert("profile_name".into(), format!("host-{system_id}").into());
        if self.virtualized.contains(&system_id) {
            details.insert("virtualization".into(), "KVM/QEMU".into());
        }
        Ok(details)
    }

    fn errata_keywords(&self, _token: &str, advisory_name: &str) -> Result<Vec<String>, ApiError> {
        self.keyword_calls.set(self.keyword_calls.get() + 1);
        Ok(self.keywords.get(advisory_name).cloned().unwrap_or_default())
    }

    fn providing_errata(&self, _token: &str, package_id: i64) -> Result<Vec<ErratumRef>, ApiError> {
        if self.covered_packages.contains(&package_id) {
            return Ok(vec![ErratumRef {
                advisory: "RHSA-2014:0001".to_string(),
            }]);
        }
        Ok(Vec::new())
    }
}

/// Fluent setup for scan-level tests.
pub struct FakeApiBuilder {
    api: FakeApi,
}

impl FakeApiBuilder {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            api: FakeApi::default(),
        }
    }

    pub fn host(mut self, id: i64, name: &str) -> Self {
        self.api.hosts.push(Host {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn erratum(mut self, host_id: i64, erratum: Erratum) -> Self {
        self.api.errata.entry(host_id).or_default().push(erratum);
        self
    }

    pub fn update(mut self, host_id: i64, update: PackageUpdate) -> Self {
        self.api.updates.entry(host_id).or_default().push(update);
        self
    }

    pub fn network(mut self, host_id: i64, ip: &str) -> Self {
        self.api.networks.insert(host_id, ip.to_string());
        self
    }

    pub fn custom_value(mut self, host_id: i64, key: &str, value: &str) -> Self {
        self.api
            .custom_values
            .entry(host_id)
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn covered(mut self, package_id: i64) -> Self {
        self.api.covered_packages.insert(package_id);
        self
    }

    pub fn fail_errata_for(mut self, host_id: i64) -> Self {
        self.api.fail_errata_for.insert(host_id);
        self
    }

    pub fn build(self) -> FakeApi {
        self.api
    }
}
