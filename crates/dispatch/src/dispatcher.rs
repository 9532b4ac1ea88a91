//! Partition-aware job dispatcher.
//!
//! For each partition in a batch: claim it, check the job system for an
//! already-active run of the same name, and submit a new run only when none
//! exists. Partitions are processed sequentially and independently; every
//! attempt resolves to a [`PartitionOutcome`] so no error can cross the
//! per-partition boundary into its siblings.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{error, info};

use coinpulse_core::PartitionKey;
use coinpulse_queue::Notification;

use crate::error::DispatchError;
use crate::job::{JobApi, JobSubmission};
use crate::lease::LeaseRegistry;
use crate::report::DispatchReport;

/// Raw-post landing prefix inside the data bucket.
const INPUT_PREFIX: &str = "raw/reddit/cryptocurrency";
/// Per-partition job output prefix inside the data bucket.
const OUTPUT_PREFIX: &str = "processed/reddit";

/// Result of one partition's dispatch attempt.
#[derive(Debug)]
pub enum PartitionOutcome {
    /// A new job run was submitted.
    Submitted { job_id: String },
    /// An active run (or a concurrent in-process claim) already owns the
    /// partition, so nothing was submitted. Counts as completed.
    AlreadyActive,
    /// The attempt failed; siblings are unaffected.
    Failed { error: DispatchError },
}

pub struct JobDispatcher {
    api: Arc<dyn JobApi>,
    data_bucket: String,
    leases: LeaseRegistry,
}

impl JobDispatcher {
    pub fn new(api: Arc<dyn JobApi>, data_bucket: impl Into<String>) -> Self {
        Self {
            api,
            data_bucket: data_bucket.into(),
            leases: LeaseRegistry::new(),
        }
    }

    /// Dispatch one batch of grouped notifications.
    ///
    /// `completed` counts submissions and idempotent skips alike; failures
    /// record the partition plus the first notification's message id for
    /// queue-level redelivery.
    pub async fn dispatch(
        &self,
        partitions: &IndexMap<PartitionKey, Vec<Notification>>,
    ) -> DispatchReport {
        let mut report = DispatchReport::new(partitions.len());

        for (partition, notifications) in partitions {
            match self.dispatch_partition(*partition).await {
                PartitionOutcome::Submitted { job_id } => {
                    info!(partition = %partition, job_id = %job_id, "submitted job");
                    report.record_completed();
                }
                PartitionOutcome::AlreadyActive => {
                    info!(partition = %partition, "job already active, skipping submission");
                    report.record_completed();
                }
                PartitionOutcome::Failed { error } => {
                    error!(partition = %partition, error = %error, "failed to dispatch partition");
                    let message_id = notifications.first().map(|n| n.message_id.as_str());
                    report.record_partition_failure(partition, message_id);
                }
            }
        }

        report
    }

    /// Attempt one partition. Never returns an error: every failure is
    /// captured in the outcome. The lease guard drops on all paths.
    async fn dispatch_partition(&self, partition: PartitionKey) -> PartitionOutcome {
        let _lease = match self.leases.try_acquire(partition) {
            Some(guard) => guard,
            None => return PartitionOutcome::AlreadyActive,
        };

        let name = partition.to_string();

        let active = match self.api.list_active_jobs().await {
            Ok(jobs) => jobs,
            Err(error) => return PartitionOutcome::Failed { error },
        };

        if active.iter().any(|job| job.name == name && job.state.is_active()) {
            return PartitionOutcome::AlreadyActive;
        }

        let submission = JobSubmission {
            input_uri: format!("s3://{}/{}/{}", self.data_bucket, INPUT_PREFIX, name),
            output_uri: format!("s3://{}/{}/{}", self.data_bucket, OUTPUT_PREFIX, name),
            name,
        };

        match self.api.submit(&submission).await {
            Ok(job_id) => PartitionOutcome::Submitted { job_id },
            Err(error) => PartitionOutcome::Failed { error },
        }
    }
}
