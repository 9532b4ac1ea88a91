//! Fusion job error types.

use thiserror::Error;

use coinpulse_core::partition::PartitionError;
use coinpulse_storage::StorageError;

use crate::sentiment::ModelError;

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("no input data under {0}")]
    MissingInput(String),

    #[error("malformed record in {key}: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("invalid input URI: {0}")]
    InvalidUri(String),

    #[error("partition error: {0}")]
    Partition(#[from] PartitionError),
}
