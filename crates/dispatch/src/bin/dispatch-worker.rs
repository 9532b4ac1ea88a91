//! dispatch-worker — turns storage-event queue batches into job submissions.
//!
//! Poll loop: receive a queue batch, parse storage-event notifications,
//! group them by calendar-hour partition, dispatch one job per partition,
//! then ack every message except those named in the report's
//! `batchItemFailures` (which are nacked for redelivery).

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use coinpulse_core::config::{load_dotenv, Config};
use coinpulse_dispatch::{group_by_partition, DispatchReport, EmrJobApi, JobDispatcher};
use coinpulse_queue::{parse_batch, QueueConsumer, QueueMessage, SqsConsumer};

// ── CLI ─────────────────────────────────────────────────────────────

/// Partition-aware dispatch worker.
#[derive(Parser, Debug)]
#[command(name = "dispatch-worker", version, about)]
struct Cli {
    /// Messages to request per queue poll.
    #[arg(long, env = "DISPATCH_POLL_BATCH", default_value_t = 10)]
    poll_batch: u32,

    /// Process a single batch and exit (for scheduled invocations).
    #[arg(long, default_value_t = false)]
    once: bool,
}

/// Process one queue batch end to end, returning the batch report.
async fn handle_batch(dispatcher: &JobDispatcher, messages: &[QueueMessage]) -> DispatchReport {
    let (notifications, parse_errors) = parse_batch(messages);
    let grouped = group_by_partition(notifications);

    let mut report = dispatcher.dispatch(&grouped.partitions).await;

    // Failures caught before dispatch are folded into the same redelivery
    // list: unparseable message bodies and notifications with bad keys.
    for (message_id, _) in &parse_errors {
        report.record_item_failure(message_id);
    }
    for (notification, _) in &grouped.rejected {
        report.record_item_failure(&notification.message_id);
    }

    report
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

    let consumer = SqsConsumer::new(&config.aws, &config.queue).await?;
    let api = Arc::new(
        EmrJobApi::new(&config.aws.region, &config.emr, &config.aws.data_bucket).await?,
    );
    let dispatcher = JobDispatcher::new(api, config.aws.data_bucket.clone());

    match consumer.health_check().await {
        Ok(health) => info!(
            messages = ?health.approximate_message_count,
            provider = %health.provider,
            "queue reachable"
        ),
        Err(e) => warn!(error = %e, "queue health check failed"),
    }

    info!("dispatch-worker starting");

    loop {
        let messages = match consumer.poll_batch(cli.poll_batch).await {
            Ok(messages) => messages,
            Err(e) => {
                error!(error = %e, "queue poll failed");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };

        if messages.is_empty() {
            if cli.once {
                break;
            }
            continue;
        }

        let report = handle_batch(&dispatcher, &messages).await;
        info!(
            total = report.total,
            completed = report.completed,
            failures = report.failures.batch_item_failures.len(),
            report = %serde_json::to_string(&report).unwrap_or_default(),
            "batch dispatched"
        );

        let failed_ids = report.failed_message_ids();
        for msg in &messages {
            let result = if failed_ids.contains(msg.id.as_str()) {
                consumer.nack(&msg.receipt_handle).await
            } else {
                consumer.ack(&msg.receipt_handle).await
            };
            if let Err(e) = result {
                warn!(message_id = %msg.id, error = %e, "failed to settle message");
            }
        }

        if cli.once {
            break;
        }
    }

    info!("dispatch-worker exited cleanly");
    Ok(())
}
