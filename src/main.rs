use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;

use errasnap::auth;
use errasnap::client::HttpApiClient;
use errasnap::config::ReportConfig;
use errasnap::domain::types::FieldSpec;
use errasnap::report::{self, sink::CsvSink};
use errasnap::session::Session;

#[derive(Parser)]
#[command(
    name = "errasnap",
    version,
    about = "Snapshot reports of errata relevant to Spacewalk / Uyuni managed hosts"
)]
struct Cli {
    /// Management server to connect to
    #[arg(short, long, default_value = "localhost")]
    server: String,

    /// Auth file to use instead of shell variables (mode 0600: username on
    /// line 1, password on line 2)
    #[arg(short, long)]
    authfile: Option<PathBuf>,

    /// Report filename (default: errata-snapshot-report-<server>-<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report column; repeat to build an ordered list (default: all columns)
    #[arg(short = 'f', long = "field", value_enum, value_name = "FIELD")]
    fields: Vec<FieldSpec>,

    /// Also report package updates that are not part of an erratum
    #[arg(short = 'p', long)]
    include_patches: bool,

    /// Hosts to scan between session re-logins (API session-expiry workaround)
    #[arg(short, long, default_value_t = 5, value_name = "THRESHOLD")]
    reconnect_threshold: usize,

    /// Replace both missing-owner defaults ("null"/"unknown") with this value
    #[arg(long, value_name = "VALUE")]
    unify_missing_owner: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.reconnect_threshold == 0 {
        bail!("--reconnect-threshold must be a positive integer");
    }

    let cfg = ReportConfig {
        fields: if cli.fields.is_empty() {
            ReportConfig::default_fields()
        } else {
            cli.fields.clone()
        },
        include_updates: cli.include_patches,
        reconnect_threshold: cli.reconnect_threshold,
        missing_owner_override: cli.unify_missing_owner.clone(),
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.server));

    let credentials = auth::acquire(cli.authfile.as_deref())?;

    let client = HttpApiClient::new(&cli.server)?;
    let mut session = Session::open(client, credentials)?;
    let version = session.verify_api_version()?;
    info!(version = %version, server = %cli.server, "connected");

    // The output target must be writable before any scanning starts.
    let mut sink = CsvSink::create(&output)?;

    println!(
        "{} Scanning hosts on {} ({} columns per row)",
        "::".blue().bold(),
        cli.server.bold(),
        cfg.fields.len()
    );

    let summary = match report::run_scan(&mut session, &cfg, &mut sink) {
        Ok(summary) => summary,
        Err(e) => {
            session.close();
            return Err(e.into());
        }
    };
    session.close();

    if summary.hosts_failed > 0 {
        println!(
            "{} {} host(s) could not be scanned; see the log for details",
            "!!".red().bold(),
            summary.hosts_failed
        );
    }
    println!(
        "{} Wrote {} row(s) for {} host(s) to {}",
        "ok".green().bold(),
        summary.rows_written,
        summary.hosts_scanned,
        output.display()
    );

    Ok(())
}

fn default_output_path(server: &str) -> PathBuf {
    PathBuf::from(format!(
        "errata-snapshot-report-{}-{}.csv",
        server,
        chrono::Local::now().format("%Y%m%d-%H%M")
    ))
}
