//! Core data model: hosts, errata, package updates and report fields.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One managed host as returned by `system.listSystems`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: i64,
    pub name: String,
}

/// Advisory classification used by the management server.
///
/// The wire format is the server's human-readable label ("Security Advisory"
/// etc.); unknown labels are carried through verbatim so a newer server
/// cannot break deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryType {
    Security,
    Bugfix,
    Enhancement,
    Other(String),
}

impl AdvisoryType {
    pub fn as_label(&self) -> &str {
        match self {
            AdvisoryType::Security => "Security Advisory",
            AdvisoryType::Bugfix => "Bug Fix Advisory",
            AdvisoryType::Enhancement => "Product Enhancement Advisory",
            AdvisoryType::Other(label) => label,
        }
    }
}

impl From<String> for AdvisoryType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Security Advisory" => AdvisoryType::Security,
            "Bug Fix Advisory" => AdvisoryType::Bugfix,
            "Product Enhancement Advisory" => AdvisoryType::Enhancement,
            _ => AdvisoryType::Other(label),
        }
    }
}

impl fmt::Display for AdvisoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl Serialize for AdvisoryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for AdvisoryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(AdvisoryType::from(String::deserialize(deserializer)?))
    }
}

/// One advisory relevant to a host (`system.getRelevantErrata`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Erratum {
    pub advisory_name: String,
    pub advisory_type: AdvisoryType,
    pub advisory_synopsis: String,
    pub update_date: String,
    /// Derived from `errata.listKeywords`, not part of the API payload.
    #[serde(skip)]
    pub reboot_suggested: bool,
}

/// One upgradable package (`system.listLatestUpgradablePackages`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageUpdate {
    pub name: String,
    pub from_version: String,
    pub from_release: String,
    pub to_version: String,
    pub to_release: String,
    /// Target package ID, used only for the providing-errata coverage check.
    pub to_package_id: i64,
}

/// Back-reference from `packages.listProvidingErrata`; only its presence
/// matters for coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErratumRef {
    pub advisory: String,
}

/// Network details for a host (`system.getNetwork`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub ip: String,
    #[serde(default)]
    pub hostname: Option<String>,
}

/// One reportable item for one host: either an advisory or a package update
/// not covered by any advisory. Produces exactly one report row.
#[derive(Debug, Clone)]
pub enum Finding {
    Erratum(Erratum),
    Update(PackageUpdate),
}

/// Report column identifier. The configured report is an ordered sequence of
/// these; order is significant and duplicates are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldSpec {
    Hostname,
    Ip,
    ErrataName,
    ErrataType,
    ErrataDesc,
    ErrataDate,
    ErrataReboot,
    SystemOwner,
    SystemCluster,
    SystemVirt,
    SystemMonitoring,
    SystemMonitoringNotes,
    SystemBackup,
    SystemBackupNotes,
    SystemAntivir,
    SystemAntivirNotes,
}

impl FieldSpec {
    /// Column name as written in the report header.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSpec::Hostname => "hostname",
            FieldSpec::Ip => "ip",
            FieldSpec::ErrataName => "errata_name",
            FieldSpec::ErrataType => "errata_type",
            FieldSpec::ErrataDesc => "errata_desc",
            FieldSpec::ErrataDate => "errata_date",
            FieldSpec::ErrataReboot => "errata_reboot",
            FieldSpec::SystemOwner => "system_owner",
            FieldSpec::SystemCluster => "system_cluster",
            FieldSpec::SystemVirt => "system_virt",
            FieldSpec::SystemMonitoring => "system_monitoring",
            FieldSpec::SystemMonitoringNotes => "system_monitoring_notes",
            FieldSpec::SystemBackup => "system_backup",
            FieldSpec::SystemBackupNotes => "system_backup_notes",
            FieldSpec::SystemAntivir => "system_antivir",
            FieldSpec::SystemAntivirNotes => "system_antivir_notes",
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
