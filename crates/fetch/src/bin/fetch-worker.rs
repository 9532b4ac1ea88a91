//! fetch-worker — one raw-data sweep: prices per coin, then posts.
//!
//! Intended for scheduled invocation once per polling interval. Each
//! fetched record lands as its own object in the raw zone, which is what
//! later emits the storage-event notifications the dispatcher consumes.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use coinpulse_core::config::{load_dotenv, Config};
use coinpulse_fetch::{fetch_posts, fetch_prices, RawSink};
use coinpulse_storage::StorageBackend;

// ── CLI ─────────────────────────────────────────────────────────────

/// Raw-data fetch worker.
#[derive(Parser, Debug)]
#[command(name = "fetch-worker", version, about)]
struct Cli {
    /// Local data directory used when no object store is configured.
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Skip the price sweep.
    #[arg(long, default_value_t = false)]
    no_prices: bool,

    /// Skip the post sweep.
    #[arg(long, default_value_t = false)]
    no_posts: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let backend = StorageBackend::from_config(&config.aws, &cli.data_dir)?;
    let sink = RawSink::new(
        backend.store_arc(),
        config.fetch.raw_prefix.clone(),
        config.fetch.compress,
    );
    let client = reqwest::Client::new();

    if !cli.no_prices {
        let points = fetch_prices(&client, &config.fetch.coins, &config.fetch.currency).await?;
        for point in &points {
            sink.write_record(&format!("coingecko/{}", point.coin), point)
                .await?;
        }
        info!(points = points.len(), "price sweep complete");
    }

    if !cli.no_posts {
        let posts = fetch_posts(
            &client,
            &config.fetch.subreddits,
            config.fetch.post_limit,
            &config.fetch.user_agent,
        )
        .await?;
        for post in &posts {
            sink.write_record("reddit/cryptocurrency", post).await?;
        }
        info!(posts = posts.len(), "post sweep complete");
    }

    info!("fetch-worker exited cleanly");
    Ok(())
}
