//! Finding collector: per-host metadata snapshot and finding set.
//!
//! Metadata is fetched once per host visit and reused for every row, which
//! keeps the output identical to re-fetching per field while cutting the
//! remote call count. Fetches are skipped entirely when no configured column
//! needs them.

use std::collections::HashMap;

use tracing::debug;

use crate::client::{ApiError, ManagementApi};
use crate::config::ReportConfig;
use crate::domain::types::{Finding, Host};

/// Keyword the server attaches to advisories that want a reboot.
const REBOOT_KEYWORD: &str = "reboot_suggested";

/// Read-only snapshot of one host's metadata, taken once per host visit.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub host: Host,
    /// Fetched only when the `ip` column is configured.
    pub ip: Option<String>,
    /// Custom-value bag; an absent bag and an empty bag are the same thing.
    pub custom_values: HashMap<String, String>,
    /// Presence of the "virtualization" detail key.
    pub virtualized: bool,
}

/// Take the metadata snapshot for one host. Any failing call is host-scoped:
/// the caller logs it and advances to the next host.
pub fn snapshot_host<C: ManagementApi>(
    client: &C,
    token: &str,
    host: &Host,
    cfg: &ReportConfig,
) -> Result<HostContext, ApiError> {
    let ip = if cfg.wants_network() {
        Some(client.network(token, host.id)?.ip)
    } else {
        None
    };

    let custom_values = if cfg.wants_custom_values() {
        client.custom_values(token, host.id)?
    } else {
        HashMap::new()
    };

    let virtualized = if cfg.wants_details() {
        client
            .details(token, host.id)?
            .contains_key("virtualization")
    } else {
        false
    };

    Ok(HostContext {
        host: host.clone(),
        ip,
        custom_values,
        virtualized,
    })
}

/// Collect the findings for one host: relevant errata first, then (when
/// enabled) upgradable packages not already covered by an erratum.
pub fn collect_findings<C: ManagementApi>(
    client: &C,
    token: &str,
    host: &Host,
    cfg: &ReportConfig,
) -> Result<Vec<Finding>, ApiError> {
    let mut findings = Vec::new();

    for mut erratum in client.relevant_errata(token, host.id)? {
        if cfg.wants_reboot_flag() {
            let keywords = client.errata_keywords(token, &erratum.advisory_name)?;
            erratum.reboot_suggested = keywords.iter().any(|k| k == REBOOT_KEYWORD);
        }
        findings.push(Finding::Erratum(erratum));
    }

    if cfg.include_updates {
        for update in client.upgradable_packages(token, host.id)? {
            // A package already provided by some erratum would duplicate a
            // row emitted above. Checked per update; package identity is
            // host-specific, so the answer must not be cached across hosts.
            let providing = client.providing_errata(token, update.to_package_id)?;
            if providing.is_empty() {
                findings.push(Finding::Update(update));
            } else {
                debug!(
                    host = %host.name,
                    package = %update.name,
                    "skipping update already covered by an erratum"
                );
            }
        }
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FieldSpec;
    use crate::testing::{fake_erratum, fake_update, FakeApi};

    fn host() -> Host {
        Host {
            id: 1,
            name: "web01".into(),
        }
    }

    fn api_with_host() -> FakeApi {
        let mut api = FakeApi::default();
        api.hosts.push(host());
        api
    }

    #[test]
    fn zero_errata_and_updates_disabled_is_not_an_error() {
        let api = api_with_host();
        let cfg = ReportConfig::default();
        let findings = collect_findings(&api, "t", &host(), &cfg).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn covered_updates_are_dropped() {
        let mut api = api_with_host();
        api.updates
            .insert(1, vec![fake_update("kernel", 100), fake_update("tzdata", 200)]);
        api.covered_packages.insert(100);

        let cfg = ReportConfig {
            include_updates: true,
            ..ReportConfig::default()
        };
        let findings = collect_findings(&api, "t", &host(), &cfg).unwrap();
        assert_eq!(findings.len(), 1);
        match &findings[0] {
            Finding::Update(u) => assert_eq!(u.name, "tzdata"),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn errata_precede_updates_in_collection_order() {
        let mut api = api_with_host();
        api.errata.insert(1, vec![fake_erratum("RHSA-2014:0678")]);
        api.updates.insert(1, vec![fake_update("tzdata", 200)]);

        let cfg = ReportConfig {
            include_updates: true,
            ..ReportConfig::default()
        };
        let findings = collect_findings(&api, "t", &host(), &cfg).unwrap();
        assert_eq!(findings.len(), 2);
        assert!(matches!(findings[0], Finding::Erratum(_)));
        assert!(matches!(findings[1], Finding::Update(_)));
    }

    #[test]
    fn reboot_keyword_sets_the_flag() {
        let mut api = api_with_host();
        api.errata.insert(1, vec![fake_erratum("RHSA-2014:0678")]);
        api.keywords.insert(
            "RHSA-2014:0678".into(),
            vec!["restart_suggested".into(), "reboot_suggested".into()],
        );

        let cfg = ReportConfig::default();
        let findings = collect_findings(&api, "t", &host(), &cfg).unwrap();
        match &findings[0] {
            Finding::Erratum(e) => assert!(e.reboot_suggested),
            other => panic!("expected erratum, got {other:?}"),
        }
    }

    #[test]
    fn keyword_lookup_is_skipped_when_reboot_column_is_unused() {
        let mut api = api_with_host();
        api.errata.insert(1, vec![fake_erratum("RHSA-2014:0678")]);

        let cfg = ReportConfig {
            fields: vec![FieldSpec::Hostname, FieldSpec::ErrataName],
            ..ReportConfig::default()
        };
        collect_findings(&api, "t", &host(), &cfg).unwrap();
        assert_eq!(api.keyword_calls.get(), 0);
    }

    #[test]
    fn snapshot_fetches_only_what_the_field_list_needs() {
        let mut api = api_with_host();
        api.networks.insert(1, "192.0.2.10".into());

        let cfg = ReportConfig {
            fields: vec![FieldSpec::Hostname, FieldSpec::ErrataName],
            ..ReportConfig::default()
        };
        let ctx = snapshot_host(&api, "t", &host(), &cfg).unwrap();
        assert!(ctx.ip.is_none());
        assert!(ctx.custom_values.is_empty());
        assert_eq!(api.network_calls.get(), 0);

        let cfg = ReportConfig::default();
        let ctx = snapshot_host(&api, "t", &host(), &cfg).unwrap();
        assert_eq!(ctx.ip.as_deref(), Some("192.0.2.10"));
        assert_eq!(api.network_calls.get(), 1);
    }

    #[test]
    fn virtualization_detail_presence_marks_the_host() {
        let mut api = api_with_host();
        api.networks.insert(1, "192.0.2.10".into());
        api.virtualized.insert(1);

        let ctx = snapshot_host(&api, "t", &host(), &ReportConfig::default()).unwrap();
        assert!(ctx.virtualized);
    }
}
