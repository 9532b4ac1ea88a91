//! Raw landing-zone sink: one compact JSON record per keyed object.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use object_store::ObjectStore;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use coinpulse_storage::put_bytes;

use crate::error::FetchError;

/// Build an hour-partitioned object key:
/// `{prefix}/{source}/{YYYY}/{MM}/{DD}/{HH}/{ts}-{ms}-{rand}.{ext}`.
fn record_key(
    prefix: &str,
    source: &str,
    now: DateTime<Utc>,
    rand: &str,
    compress: bool,
) -> String {
    let ts = now.format("%Y-%m-%d_%H-%M-%S");
    let ms = now.timestamp_subsec_millis();
    let ext = if compress { "json.gz" } else { "json" };
    format!(
        "{prefix}/{source}/{:04}/{:02}/{:02}/{:02}/{ts}-{ms:03}-{rand}.{ext}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
    )
}

/// Writes fetched records to the raw landing zone.
pub struct RawSink {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    compress: bool,
}

impl RawSink {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>, compress: bool) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            compress,
        }
    }

    /// Serialize one record as compact JSON (gzipped when configured) and
    /// write it under the source's current-hour path. Returns the key.
    pub async fn write_record<T: Serialize>(
        &self,
        source: &str,
        record: &T,
    ) -> Result<String, FetchError> {
        let now = Utc::now();
        let rand = Uuid::new_v4().simple().to_string();
        let key = record_key(&self.prefix, source, now, &rand[..8], self.compress);

        let payload = serde_json::to_vec(record)?;
        let body = if self.compress {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&payload)?;
            encoder.finish()?
        } else {
            payload
        };

        let size = body.len();
        put_bytes(self.store.as_ref(), &key, body).await?;
        info!(key = %key, size_bytes = size, "uploaded raw record");

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use flate2::read::GzDecoder;
    use object_store::memory::InMemory;
    use serde_json::json;

    use coinpulse_storage::{get_bytes, list_keys};

    #[test]
    fn test_key_layout() {
        let now: DateTime<Utc> = "2025-11-25T21:03:11.042Z".parse().unwrap();
        let key = record_key("raw", "coingecko/bitcoin", now, "ab12cd34", true);
        assert_eq!(
            key,
            "raw/coingecko/bitcoin/2025/11/25/21/2025-11-25_21-03-11-042-ab12cd34.json.gz"
        );
    }

    #[test]
    fn test_key_extension_without_compression() {
        let now: DateTime<Utc> = "2025-01-02T03:04:05Z".parse().unwrap();
        let key = record_key("raw", "reddit/cryptocurrency", now, "deadbeef", false);
        assert!(key.starts_with("raw/reddit/cryptocurrency/2025/01/02/03/"));
        assert!(key.ends_with(".json"));
    }

    #[tokio::test]
    async fn test_write_record_gzip_roundtrip() {
        let store = Arc::new(InMemory::new());
        let sink = RawSink::new(store.clone(), "raw", true);

        let record = json!({"coin": "bitcoin", "price_usd": 97000.5});
        let key = sink.write_record("coingecko/bitcoin", &record).await.unwrap();

        let body = get_bytes(store.as_ref(), &key).await.unwrap();
        let mut decoder = GzDecoder::new(&body[..]);
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&decoded).unwrap();
        assert_eq!(parsed, record);
        // Compact separators, no pretty printing.
        assert!(!decoded.contains('\n'));
    }

    #[tokio::test]
    async fn test_write_record_uncompressed() {
        let store = Arc::new(InMemory::new());
        let sink = RawSink::new(store.clone(), "raw", false);

        let key = sink.write_record("reddit/cryptocurrency", &json!({"id": "x"})).await.unwrap();
        assert!(key.ends_with(".json"));

        let body = get_bytes(store.as_ref(), &key).await.unwrap();
        assert_eq!(&body[..], br#"{"id":"x"}"#);
    }

    #[tokio::test]
    async fn test_distinct_keys_per_record() {
        let store = Arc::new(InMemory::new());
        let sink = RawSink::new(store.clone(), "raw", true);

        sink.write_record("coingecko/bitcoin", &json!({"n": 1})).await.unwrap();
        sink.write_record("coingecko/bitcoin", &json!({"n": 2})).await.unwrap();

        let keys = list_keys(store.as_ref(), "raw/coingecko/bitcoin").await.unwrap();
        assert_eq!(keys.len(), 2);
    }
}
