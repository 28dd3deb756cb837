//! Collector binary entry point

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use triage_collector::{Collector, CollectorConfig, RealApiClient};

#[derive(Parser)]
#[command(name = "triage-collector")]
#[command(about = "Collects patient records, scores them for risk, and submits the assessment")]
struct Args {
    /// Base URL of the assessment service
    #[arg(long, default_value = "https://assessment.example.com")]
    base_url: String,

    /// Records requested per page
    #[arg(long, default_value_t = 5)]
    page_size: u32,

    /// Stop after this many pages, regardless of what pagination advertises
    #[arg(long)]
    max_pages: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = CollectorConfig::from_env(&args.base_url)
        .context("collector cannot start without a credential")?;
    config.page_size = args.page_size;
    config.max_pages = args.max_pages;

    info!("🚀 Starting collection against {}", config.base_url);

    let client = RealApiClient::new(&config);
    let collector = Collector::new(client, config);

    let categories = collector.run().await;

    // The run is complete whether or not the submission lands; a failed
    // submission is reported, not retried.
    if let Err(e) = collector.report(&categories).await {
        error!("Run finished but the submission did not land: {}", e);
    }

    Ok(())
}
