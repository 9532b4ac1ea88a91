//! Partitioned parquet append for fused rows.
//!
//! Output layout: `{root}/date=YYYY-MM-DD/hour=HH/topic=<topic>/part-<id>.parquet`.
//! Partition values live in the path, so files carry only the measure
//! columns. Writes are additive: every run emits fresh part files and
//! nothing deduplicates reruns of the same hour.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use object_store::ObjectStore;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::debug;
use uuid::Uuid;

use coinpulse_core::PartitionKey;
use coinpulse_storage::put_bytes;

use crate::error::FusionError;
use crate::fuse::FusedRecord;

fn file_schema() -> Schema {
    Schema::new(vec![
        Field::new("price_usd", DataType::Float64, false),
        Field::new("price_sample_count", DataType::Int64, false),
        Field::new("sentiment_label", DataType::Utf8, false),
        Field::new("sentiment_score", DataType::Float64, false),
    ])
}

fn records_to_batch(records: &[&FusedRecord]) -> Result<RecordBatch, FusionError> {
    let schema = Arc::new(file_schema());
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.price_usd),
        )),
        Arc::new(Int64Array::from_iter_values(
            records.iter().map(|r| r.price_sample_count as i64),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.sentiment_label.as_str()),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.sentiment_score),
        )),
    ];

    RecordBatch::try_new(schema, arrays).map_err(|e| FusionError::Parquet(e.to_string()))
}

fn batch_to_parquet_bytes(batch: &RecordBatch) -> Result<Vec<u8>, FusionError> {
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))
        .map_err(|e| FusionError::Parquet(e.to_string()))?;
    writer
        .write(batch)
        .map_err(|e| FusionError::Parquet(e.to_string()))?;
    writer
        .close()
        .map_err(|e| FusionError::Parquet(e.to_string()))?;

    Ok(buf)
}

/// Append fused rows to the joined store, one part file per topic.
///
/// Returns the keys written.
pub async fn write_fused(
    store: &dyn ObjectStore,
    output_root: &str,
    partition: &PartitionKey,
    records: &[FusedRecord],
) -> Result<Vec<String>, FusionError> {
    let mut written = Vec::new();

    for record in records {
        let rows = [record];
        let batch = records_to_batch(&rows)?;
        let bytes = batch_to_parquet_bytes(&batch)?;

        let key = format!(
            "{output_root}/date={}/hour={}/topic={}/part-{}.parquet",
            partition.date_string(),
            partition.hour_string(),
            record.topic,
            Uuid::new_v4().simple()
        );

        debug!(key = %key, rows = batch.num_rows(), "writing part file");
        put_bytes(store, &key, bytes).await?;
        written.push(key);
    }

    Ok(written)
}
