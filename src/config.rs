//! Immutable report configuration, threaded through the scan.

use serde::{Deserialize, Serialize};

use crate::domain::types::FieldSpec;

/// Everything the scan loop and the field resolver need to know, fixed at
/// startup. No component mutates this after the scan begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Ordered report columns; order is significant and duplicates are kept.
    pub fields: Vec<FieldSpec>,
    /// Also report package updates that are not part of any erratum.
    pub include_updates: bool,
    /// Re-login after this many hosts (session-expiry workaround). Must be
    /// positive.
    pub reconnect_threshold: usize,
    /// When set, this literal replaces both kind-specific missing-owner
    /// defaults ("null" for errata rows, "unknown" for update rows).
    pub missing_owner_override: Option<String>,
}

impl ReportConfig {
    /// Column list matching the historical default report shape. Note that
    /// `errata_date` precedes `errata_desc` here, unlike the enum order.
    pub fn default_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::Hostname,
            FieldSpec::Ip,
            FieldSpec::ErrataName,
            FieldSpec::ErrataType,
            FieldSpec::ErrataDate,
            FieldSpec::ErrataDesc,
            FieldSpec::ErrataReboot,
            FieldSpec::SystemOwner,
            FieldSpec::SystemCluster,
            FieldSpec::SystemVirt,
            FieldSpec::SystemMonitoring,
            FieldSpec::SystemMonitoringNotes,
            FieldSpec::SystemBackup,
            FieldSpec::SystemBackupNotes,
            FieldSpec::SystemAntivir,
            FieldSpec::SystemAntivirNotes,
        ]
    }

    /// True when some configured column reads the host's custom-value bag.
    pub fn wants_custom_values(&self) -> bool {
        self.fields.iter().any(|f| {
            matches!(
                f,
                FieldSpec::SystemOwner
                    | FieldSpec::SystemCluster
                    | FieldSpec::SystemMonitoring
                    | FieldSpec::SystemMonitoringNotes
                    | FieldSpec::SystemBackup
                    | FieldSpec::SystemBackupNotes
                    | FieldSpec::SystemAntivir
                    | FieldSpec::SystemAntivirNotes
            )
        })
    }

    pub fn wants_network(&self) -> bool {
        self.fields.contains(&FieldSpec::Ip)
    }

    pub fn wants_details(&self) -> bool {
        self.fields.contains(&FieldSpec::SystemVirt)
    }

    pub fn wants_reboot_flag(&self) -> bool {
        self.fields.contains(&FieldSpec::ErrataReboot)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fields: Self::default_fields(),
            include_updates: false,
            reconnect_threshold: 5,
            missing_owner_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_field_list_has_all_sixteen_columns() {
        let cfg = ReportConfig::default();
        assert_eq!(cfg.fields.len(), 16);
        assert_eq!(cfg.fields[4], FieldSpec::ErrataDate);
        assert_eq!(cfg.fields[5], FieldSpec::ErrataDesc);
    }

    #[test]
    fn fetch_hints_follow_the_field_list() {
        let cfg = ReportConfig {
            fields: vec![FieldSpec::Hostname, FieldSpec::ErrataName],
            ..ReportConfig::default()
        };
        assert!(!cfg.wants_custom_values());
        assert!(!cfg.wants_network());
        assert!(!cfg.wants_details());
        assert!(!cfg.wants_reboot_flag());

        let cfg = ReportConfig {
            fields: vec![FieldSpec::Ip, FieldSpec::SystemBackupNotes],
            ..ReportConfig::default()
        };
        assert!(cfg.wants_custom_values());
        assert!(cfg.wants_network());
    }
}
