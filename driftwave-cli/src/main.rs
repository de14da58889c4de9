//! Stand-in host driver for the Driftwave connector.
//!
//! Reads an ordered batch of execution items from a JSON file, runs them
//! through the connector, and prints index-correlated rows, the same
//! contract a workflow host would consume. Useful for trying the
//! connector without a host and for end-to-end debugging.

use anyhow::{Context, Result};
use clap::Parser;
use driftwave_config::DriftwaveConfigLoader;
use driftwave_connector::runner::ItemRecord;
use driftwave_connector::{ApiTransport, ExecutionItem, catalog, run_batch};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Run a batch of Driftwave connector items from a JSON file.
#[derive(Parser)]
#[command(name = "driftwave", version)]
struct Cli {
    /// Path to a JSON array of items: [{"operation": "search", "params": {...}}, ...]
    #[arg(required_unless_present = "describe")]
    items: Option<PathBuf>,

    /// Optional YAML config; DRIFTWAVE_* environment variables always apply.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Abort the whole batch at the first failing item instead of
    /// recording the failure and continuing.
    #[arg(long)]
    halt_on_failure: bool,

    /// Print the connector's parameter catalog and exit.
    #[arg(long)]
    describe: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if cli.describe {
        println!("{}", serde_json::to_string_pretty(&catalog::descriptor())?);
        return Ok(());
    }

    let mut loader = DriftwaveConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let config = loader.load().context("load connector configuration")?;

    let items_path = cli.items.expect("clap enforces items unless --describe");
    let raw = std::fs::read_to_string(&items_path)
        .with_context(|| format!("read items file: {}", items_path.display()))?;
    let items: Vec<ExecutionItem> =
        serde_json::from_str(&raw).context("items file must be a JSON array of execution items")?;

    let mut transport = ApiTransport::with_base(&config.base_url, &config.api_key)?;
    if let Some(secs) = config.timeout_secs {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    tracing::info!(items = items.len(), halt = cli.halt_on_failure, "cli.batch.start");
    let records = run_batch(&transport, &items, !cli.halt_on_failure).await?;

    let mut rows = Vec::new();
    for record in &records {
        rows.extend(record.to_rows()?);
    }
    println!("{}", serde_json::to_string_pretty(&rows)?);

    let failed = records
        .iter()
        .filter(|r| matches!(r, ItemRecord::Error { .. }))
        .count();
    if failed > 0 {
        tracing::warn!(failed, "cli.batch.partial");
        std::process::exit(1);
    }
    Ok(())
}
