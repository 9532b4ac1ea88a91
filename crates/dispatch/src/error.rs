//! Dispatch error types.

use thiserror::Error;

use coinpulse_core::partition::PartitionError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("job API error: {0}")]
    JobApi(String),

    #[error("partition error: {0}")]
    Partition(#[from] PartitionError),
}
