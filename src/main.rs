// Entry point and high-level CLI flow.
//
// - `serve` (default) loads the dataset once and serves the dashboard.
//   In debug mode the dataset is re-read on every request instead.
// - `summary` loads the dataset and prints the cards and chart tables,
//   optionally writing them as JSON too.
use anyhow::Context;
use clap::Parser;
use claims_dashboard::config::{Cli, Command};
use claims_dashboard::server::{self, AppState};
use claims_dashboard::types::ClaimRecord;
use claims_dashboard::{loader, output, summary};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const PREVIEW_ROWS: usize = 12;

fn load(path: &Path) -> anyhow::Result<Vec<ClaimRecord>> {
    let (records, _) = loader::load_claims(path)
        .inspect_err(|e| error!(error = %e, "dataset load failed"))
        .with_context(|| format!("failed to load dataset {}", path.display()))?;
    Ok(records)
}

fn run_summary(cli: &Cli, json: Option<&Path>) -> anyhow::Result<()> {
    let records = load(&cli.data)?;
    let report = summary::summary_report(&records).context("cannot summarize dataset")?;
    output::print_summary(&report, PREVIEW_ROWS);
    if let Some(path) = json {
        output::write_json(path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}

async fn run_server(cli: &Cli) -> anyhow::Result<()> {
    // Validated at startup even in debug mode.
    let records = load(&cli.data)?;
    let state = if cli.debug {
        info!("debug mode: dataset reloads on every request");
        AppState::reloading(cli.data.clone())
    } else {
        AppState::new(records)
    };
    server::serve(cli.addr(), state)
        .await
        .with_context(|| format!("server on {} stopped", cli.addr()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command() {
        Command::Serve => run_server(&cli).await,
        Command::Summary { json } => run_summary(&cli, json.as_deref()),
    }
}
