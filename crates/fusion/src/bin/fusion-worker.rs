//! fusion-worker — runs one partition's sentiment-fusion job.
//!
//! Invoked by the job system with the submission's positional arguments:
//! the hour-partition input URI and the output URI. The bucket and
//! partition are derived from the input URI; the joined store layout under
//! `processed/joined/` is fixed per deployment.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use coinpulse_core::config::{load_dotenv, Config};
use coinpulse_fusion::{parse_input_uri, Classifier, FusionJob, HttpSentimentModel};
use coinpulse_storage::StorageBackend;

// ── CLI ─────────────────────────────────────────────────────────────

/// Sentiment-fusion job worker.
#[derive(Parser, Debug)]
#[command(name = "fusion-worker", version, about)]
struct Cli {
    /// Hour-partition input URI, e.g.
    /// s3://data-bucket/raw/reddit/cryptocurrency/2025/11/25/21
    input_uri: String,

    /// Output URI from the job submission (recorded for traceability).
    output_uri: String,

    /// Local data directory used when no object store is configured.
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
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

    let (bucket, partition) = parse_input_uri(&cli.input_uri)?;

    info!(
        partition = %partition,
        bucket = %bucket,
        output_uri = %cli.output_uri,
        "fusion-worker starting"
    );

    // The store is rooted at the bucket named in the input URI.
    let aws = coinpulse_core::config::AwsConfig {
        data_bucket: bucket,
        ..config.aws
    };
    let backend = StorageBackend::from_config(&aws, &cli.data_dir)?;

    // One model instance per worker, reused across all micro-batches.
    let model = Arc::new(HttpSentimentModel::new(&config.model));
    let classifier = Classifier::new(model, config.model.batch_size as usize);

    let job = FusionJob::new(backend.store_arc(), classifier);
    let outcome = job.run(partition).await?;

    info!(
        fused_rows = outcome.fused_rows,
        files = outcome.files.len(),
        "fusion-worker exited cleanly"
    );
    Ok(())
}
