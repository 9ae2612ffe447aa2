//! Report assembler: drives the scan and emits rows.
//!
//! Per host: snapshot metadata, collect findings, resolve every configured
//! column per finding, hand the row to the sink. A failing host is logged
//! and skipped; the scan continues with the next one. After every
//! `reconnect_threshold` hosts the session is refreshed to dodge the remote
//! API's session expiry.

pub mod collector;
pub mod fields;
pub mod sink;

use tracing::{debug, info, warn};

use crate::client::{ApiError, ManagementApi};
use crate::config::ReportConfig;
use crate::domain::types::Host;
use crate::error::SnapshotError;
use crate::report::sink::{RowSink, SinkError};
use crate::session::Session;

/// Scan outcome counters, reported once at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub hosts_scanned: usize,
    pub hosts_failed: usize,
    pub rows_written: usize,
    pub reconnects: usize,
}

/// Distinguishes a host-scoped remote failure (skip the host) from an output
/// failure (fatal for the run).
enum HostScanError {
    Api(ApiError),
    Output(SinkError),
}

impl From<ApiError> for HostScanError {
    fn from(e: ApiError) -> Self {
        HostScanError::Api(e)
    }
}

impl From<SinkError> for HostScanError {
    fn from(e: SinkError) -> Self {
        HostScanError::Output(e)
    }
}

/// Run the full scan: header, one row per finding per host, periodic session
/// refresh, flush after every host.
pub fn run_scan<C: ManagementApi, S: RowSink>(
    session: &mut Session<C>,
    cfg: &ReportConfig,
    sink: &mut S,
) -> Result<ScanSummary, SnapshotError> {
    let header: Vec<String> = cfg.fields.iter().map(|f| f.as_str().to_string()).collect();
    sink.write_row(&header)?;

    let hosts = session.client().list_systems(session.token())?;
    info!(hosts = hosts.len(), "host enumeration complete");

    let mut summary = ScanSummary::default();
    let mut hosts_since_reconnect = 0usize;

    for host in &hosts {
        info!(host = %host.name, id = host.id, "scanning host");
        match scan_host(session.client(), session.token(), host, cfg, sink) {
            Ok(rows) => {
                summary.hosts_scanned += 1;
                summary.rows_written += rows;
            }
            Err(HostScanError::Api(e)) => {
                // Failure isolation: this host contributes nothing further,
                // the run keeps going.
                warn!(host = %host.name, error = %e, "host scan failed, skipping");
                summary.hosts_failed += 1;
            }
            Err(HostScanError::Output(e)) => {
                return Err(SnapshotError::Output(e));
            }
        }
        sink.flush()?;

        hosts_since_reconnect += 1;
        if hosts_since_reconnect == cfg.reconnect_threshold {
            if let Err(e) = session.reconnect() {
                // The session is unusable; keep what was written so far.
                let _ = sink.flush();
                return Err(e);
            }
            summary.reconnects += 1;
            hosts_since_reconnect = 0;
        }
    }

    sink.flush()?;
    Ok(summary)
}

fn scan_host<C: ManagementApi, S: RowSink>(
    client: &C,
    token: &str,
    host: &Host,
    cfg: &ReportConfig,
    sink: &mut S,
) -> Result<usize, HostScanError> {
    let ctx = collector::snapshot_host(client, token, host, cfg)?;
    let findings = collector::collect_findings(client, token, host, cfg)?;

    if findings.is_empty() {
        debug!(host = %host.name, "no relevant errata or updates");
        return Ok(0);
    }

    let mut rows = 0;
    for finding in &findings {
        let row: Vec<String> = cfg
            .fields
            .iter()
            .map(|field| fields::resolve(*field, &ctx, finding, cfg))
            .collect();
        sink.write_row(&row)?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FieldSpec;
    use crate::report::sink::VecSink;
    use crate::session::Credentials;
    use crate::testing::{fake_erratum, fake_update, FakeApi, FakeApiBuilder};

    fn session(api: FakeApi) -> Session<FakeApi> {
        Session::open(
            api,
            Credentials {
                username: "admin".into(),
                password: "secret".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn header_row_matches_the_configured_field_order() {
        let api = FakeApiBuilder::new().build();
        let mut session = session(api);
        let cfg = ReportConfig {
            fields: vec![
                FieldSpec::ErrataName,
                FieldSpec::Hostname,
                FieldSpec::Hostname,
            ],
            ..ReportConfig::default()
        };
        let mut sink = VecSink::default();

        run_scan(&mut session, &cfg, &mut sink).unwrap();
        assert_eq!(
            sink.rows,
            vec![vec![
                "errata_name".to_string(),
                "hostname".to_string(),
                "hostname".to_string()
            ]]
        );
    }

    #[test]
    fn every_row_has_one_value_per_configured_field() {
        let api = FakeApiBuilder::new()
            .host(1, "web01")
            .erratum(1, fake_erratum("RHSA-2014:0678"))
            .erratum(1, fake_erratum("RHBA-2014:0100"))
            .build();
        let mut session = session(api);
        let cfg = ReportConfig {
            fields: vec![
                FieldSpec::Hostname,
                FieldSpec::ErrataName,
                FieldSpec::Hostname,
            ],
            ..ReportConfig::default()
        };
        let mut sink = VecSink::default();

        let summary = run_scan(&mut session, &cfg, &mut sink).unwrap();
        assert_eq!(summary.rows_written, 2);
        for row in &sink.rows {
            assert_eq!(row.len(), 3);
        }
        assert_eq!(sink.rows[1][0], "web01");
        assert_eq!(sink.rows[1][1], "RHSA-2014:0678");
        assert_eq!(sink.rows[1][2], "web01");
    }

    #[test]
    fn hosts_without_findings_emit_no_rows() {
        let api = FakeApiBuilder::new().host(1, "idle01").build();
        let mut session = session(api);
        let cfg = ReportConfig::default();
        let mut sink = VecSink::default();

        let summary = run_scan(&mut session, &cfg, &mut sink).unwrap();
        assert_eq!(summary.hosts_scanned, 1);
        assert_eq!(summary.rows_written, 0);
        assert_eq!(sink.rows.len(), 1); // header only
    }

    #[test]
    fn reconnects_after_every_threshold_hosts() {
        let mut builder = FakeApiBuilder::new();
        for i in 1..=5 {
            builder = builder.host(i, &format!("host{i:02}"));
        }
        let api = builder.build();
        let mut session = session(api);
        let cfg = ReportConfig {
            reconnect_threshold: 2,
            ..ReportConfig::default()
        };
        let mut sink = VecSink::default();

        let summary = run_scan(&mut session, &cfg, &mut sink).unwrap();
        assert_eq!(summary.hosts_scanned, 5);
        assert_eq!(summary.reconnects, 2);
        // open + two refreshes
        assert_eq!(session.client().logins.get(), 3);
    }

    #[test]
    fn a_failing_host_does_not_stop_the_scan() {
        let api = FakeApiBuilder::new()
            .host(1, "broken01")
            .host(2, "web02")
            .erratum(2, fake_erratum("RHSA-2014:0678"))
            .fail_errata_for(1)
            .build();
        let mut session = session(api);
        let cfg = ReportConfig {
            fields: vec![FieldSpec::Hostname, FieldSpec::ErrataName],
            ..ReportConfig::default()
        };
        let mut sink = VecSink::default();

        let summary = run_scan(&mut session, &cfg, &mut sink).unwrap();
        assert_eq!(summary.hosts_failed, 1);
        assert_eq!(summary.hosts_scanned, 1);
        assert_eq!(sink.rows.len(), 2);
        assert_eq!(sink.rows[1], vec!["web02", "RHSA-2014:0678"]);
    }

    #[test]
    fn covered_updates_never_reach_the_sink() {
        let api = FakeApiBuilder::new()
            .host(1, "web01")
            .update(1, fake_update("kernel", 100))
            .update(1, fake_update("tzdata", 200))
            .covered(100)
            .build();
        let mut session = session(api);
        let cfg = ReportConfig {
            fields: vec![FieldSpec::ErrataName],
            include_updates: true,
            ..ReportConfig::default()
        };
        let mut sink = VecSink::default();

        run_scan(&mut session, &cfg, &mut sink).unwrap();
        assert_eq!(sink.rows.len(), 2);
        assert_eq!(sink.rows[1], vec!["tzdata"]);
    }

    #[test]
    fn reconnect_failure_aborts_the_remainder_of_the_scan() {
        let mut api = FakeApiBuilder::new()
            .host(1, "web01")
            .host(2, "web02")
            .host(3, "web03")
            .build();
        api.fail_relogin = true;
        let mut session = session(api);
        let cfg = ReportConfig {
            reconnect_threshold: 1,
            ..ReportConfig::default()
        };
        let mut sink = VecSink::default();

        let err = run_scan(&mut session, &cfg, &mut sink)
            .err()
            .expect("must fail");
        assert!(matches!(err, SnapshotError::Reconnect(_)));
        // Header survives; the report stays parseable.
        assert_eq!(sink.rows.len(), 1);
    }
}
