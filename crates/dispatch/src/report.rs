//! Dispatch batch report: the response contract returned upstream.
//!
//! `batchItemFailures` names the queue messages the upstream should
//! redeliver; everything else in the batch is considered acknowledged.

use std::collections::HashSet;

use serde::Serialize;

use coinpulse_core::PartitionKey;

/// One queue message to redeliver.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BatchItemFailure {
    #[serde(rename = "itemIdentifiers")]
    pub item_identifiers: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct DispatchFailures {
    #[serde(rename = "batchItemFailures")]
    pub batch_item_failures: Vec<BatchItemFailure>,
    /// Formatted partition paths that failed to dispatch.
    pub partitions: Vec<String>,
}

/// Outcome of one dispatch invocation.
///
/// `completed` counts both fresh submissions and idempotent skips; the two
/// are only distinguishable from the logs and external job state.
#[derive(Debug, Clone, Serialize, Default)]
pub struct DispatchReport {
    pub total: usize,
    pub completed: usize,
    pub failures: DispatchFailures,
}

impl DispatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_completed(&mut self) {
        self.completed += 1;
    }

    /// Record a failed partition with the message to redeliver.
    pub fn record_partition_failure(&mut self, partition: &PartitionKey, message_id: Option<&str>) {
        if let Some(id) = message_id {
            self.record_item_failure(id);
        }
        self.failures.partitions.push(partition.to_string());
    }

    /// Record a message-level failure with no owning partition (parse or
    /// grouping errors caught before dispatch).
    pub fn record_item_failure(&mut self, message_id: &str) {
        self.failures.batch_item_failures.push(BatchItemFailure {
            item_identifiers: message_id.to_string(),
        });
    }

    /// Message ids the upstream queue should redeliver.
    pub fn failed_message_ids(&self) -> HashSet<&str> {
        self.failures
            .batch_item_failures
            .iter()
            .map(|f| f.item_identifiers.as_str())
            .collect()
    }
}
