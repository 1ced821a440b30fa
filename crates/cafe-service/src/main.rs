//! # Café Service
//!
//! Runs one service over an order feed:
//!
//! ```text
//! cafe-service orders.txt [--config cafe.toml]
//! ```
//!
//! The journal goes to `log_path` (default `cafe.log`), overwritten on every
//! run. Diagnostic tracing goes to stderr and is controlled by `RUST_LOG`.
//! Ctrl-C cancels the run; the journal is still flushed and closed.

use anyhow::Context;
use cafe_service::config::ServiceConfig;
use cafe_service::lifecycle::{create_log_file, Coordinator};
use cafe_service::order_source::OrderSource;
use clap::Parser;
use pipeline_framework::tracing::setup_tracing;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "cafe-service", version, about = "Simulate a café service from an order feed")]
struct Cli {
    /// Order feed: one `<seconds> <item>,<item>,...` line per order.
    #[arg(value_name = "ORDERS")]
    orders: PathBuf,

    /// TOML config file. Falls back to $CAFE_CONFIG_PATH, then defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    let (config, source) =
        ServiceConfig::resolve(cli.config.as_deref()).context("failed to load configuration")?;
    info!(?source, feed = %cli.orders.display(), "Starting service");

    let orders = OrderSource::open(&cli.orders, config.feed_poll())
        .with_context(|| format!("failed to load orders from {}", cli.orders.display()))?;
    let log_path = config.log_path.clone();
    let sink = create_log_file(&log_path)?;
    println!("Writing service log to {}", log_path.display());

    let coordinator = Coordinator::new(config);
    let handle = coordinator.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling service");
            handle.cancel();
        }
    });

    let outcome = coordinator.run(orders, sink).await;
    println!("\nLog file {} closed.\n", log_path.display());

    let report = outcome.context("service did not complete")?;
    info!(
        taken = report.taken.len(),
        delivered = report.delivered.len(),
        direct = report.direct_deliveries(),
        conserved = report.is_conserved(),
        "Service complete"
    );
    Ok(())
}
