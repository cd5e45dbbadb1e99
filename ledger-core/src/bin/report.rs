//! Ledger report CLI
//!
//! Opens the ledger at the configured data directory and prints the
//! current report snapshot as JSON.

use waste_ledger_core::{Config, Ledger, ReportFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(data_dir = ?config.data_dir, "Opening ledger");

    let ledger = Ledger::open(config)?;

    let mut filter = ReportFilter::default();
    if let Ok(group) = std::env::var("LEDGER_REPORT_GROUP") {
        filter.product_group = Some(group);
    }

    let snapshot = ledger.compute_stats(&filter)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
