//! Field resolver: turns one (host, finding, column) triple into the exact
//! output string.
//!
//! Resolution is pure. Absent metadata is a value path, never an error: an
//! absent custom-value bag and a present bag missing the key behave
//! identically. Flag columns resolve strictly to "0" or "1".

use crate::config::ReportConfig;
use crate::domain::types::{FieldSpec, Finding};
use crate::report::collector::HostContext;

const OWNER_KEY: &str = "SYSTEM_OWNER";
const CLUSTER_KEY: &str = "SYSTEM_CLUSTER";
const MONITORING_KEY: &str = "SYSTEM_MONITORING";
const MONITORING_NOTES_KEY: &str = "SYSTEM_MONITORING_NOTES";
const BACKUP_KEY: &str = "SYSTEM_BACKUP";
const BACKUP_NOTES_KEY: &str = "SYSTEM_BACKUP_NOTES";
const ANTIVIR_KEY: &str = "SYSTEM_ANTIVIR";
const ANTIVIR_NOTES_KEY: &str = "SYSTEM_ANTIVIR_NOTES";

/// Resolve one configured column for one finding.
pub fn resolve(field: FieldSpec, ctx: &HostContext, finding: &Finding, cfg: &ReportConfig) -> String {
    match field {
        FieldSpec::Hostname => ctx.host.name.clone(),
        FieldSpec::Ip => ctx.ip.clone().unwrap_or_default(),
        FieldSpec::ErrataName => match finding {
            Finding::Erratum(e) => e.advisory_name.clone(),
            Finding::Update(u) => u.name.clone(),
        },
        FieldSpec::ErrataType => match finding {
            Finding::Erratum(e) => e.advisory_type.to_string(),
            Finding::Update(_) => "Regular update".to_string(),
        },
        FieldSpec::ErrataDesc => match finding {
            Finding::Erratum(e) => e.advisory_synopsis.clone(),
            Finding::Update(u) => format!(
                "{}-{} to {}-{}",
                u.from_version, u.from_release, u.to_version, u.to_release
            ),
        },
        FieldSpec::ErrataDate => match finding {
            Finding::Erratum(e) => e.update_date.clone(),
            Finding::Update(_) => "unknown".to_string(),
        },
        FieldSpec::ErrataReboot => match finding {
            Finding::Erratum(e) => flag(e.reboot_suggested),
            Finding::Update(_) => "0".to_string(),
        },
        FieldSpec::SystemOwner => match ctx.custom_values.get(OWNER_KEY) {
            Some(owner) => collapse_whitespace(owner),
            None => missing_owner_default(finding, cfg),
        },
        FieldSpec::SystemCluster => flag_value(ctx, CLUSTER_KEY),
        FieldSpec::SystemVirt => flag(ctx.virtualized),
        FieldSpec::SystemMonitoring => flag_value(ctx, MONITORING_KEY),
        FieldSpec::SystemMonitoringNotes => note_value(ctx, MONITORING_NOTES_KEY),
        FieldSpec::SystemBackup => flag_value(ctx, BACKUP_KEY),
        FieldSpec::SystemBackupNotes => note_value(ctx, BACKUP_NOTES_KEY),
        FieldSpec::SystemAntivir => flag_value(ctx, ANTIVIR_KEY),
        FieldSpec::SystemAntivirNotes => note_value(ctx, ANTIVIR_NOTES_KEY),
    }
}

/// Historical quirk, reproduced on purpose: a missing owner reads "null" on
/// erratum rows but "unknown" on update rows. The override unifies both when
/// the operator asks for it.
fn missing_owner_default(finding: &Finding, cfg: &ReportConfig) -> String {
    if let Some(unified) = &cfg.missing_owner_override {
        return unified.clone();
    }
    match finding {
        Finding::Erratum(_) => "null".to_string(),
        Finding::Update(_) => "unknown".to_string(),
    }
}

/// Replace every internal run of whitespace (newlines included) with one
/// space. A present-but-blank value collapses to the empty string.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flag(set: bool) -> String {
    if set { "1" } else { "0" }.to_string()
}

/// "1" only when the custom value exists and is exactly "1".
fn flag_value(ctx: &HostContext, key: &str) -> String {
    flag(ctx.custom_values.get(key).is_some_and(|v| v == "1"))
}

/// Verbatim note, empty when the key is absent or the value is empty.
fn note_value(ctx: &HostContext, key: &str) -> String {
    ctx.custom_values.get(key).cloned().unwrap_or_default()
}
