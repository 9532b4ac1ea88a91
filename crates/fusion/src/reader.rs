//! Readers for the raw landing zone.
//!
//! Raw records are small JSON objects written one per object, optionally
//! gzipped. Posts are read strictly (a malformed record aborts the job);
//! price records are read permissively (bad records are skipped).

use std::io::Read;

use flate2::read::GzDecoder;
use object_store::ObjectStore;
use serde_json::Value;
use tracing::{debug, warn};

use coinpulse_core::{PartitionKey, PricePoint, RawPost};
use coinpulse_storage::{get_bytes, list_keys};

use crate::error::FusionError;

/// Decompress an object body when its key carries a gzip extension.
fn decode_body(raw: &[u8], key: &str) -> Result<Vec<u8>, FusionError> {
    if key.ends_with(".gz") {
        let mut decoder = GzDecoder::new(raw);
        let mut decoded = Vec::new();
        decoder
            .read_to_end(&mut decoded)
            .map_err(|e| FusionError::MalformedRecord {
                key: key.to_string(),
                reason: format!("gzip decode failed: {e}"),
            })?;
        Ok(decoded)
    } else {
        Ok(raw.to_vec())
    }
}

/// Split a body into JSON values: a top-level array yields its elements, a
/// top-level object yields itself, anything else is parsed line by line.
fn body_to_values(data: &[u8], key: &str) -> Result<Vec<Value>, FusionError> {
    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(value @ Value::Object(_)) => Ok(vec![value]),
        Ok(other) => Err(FusionError::MalformedRecord {
            key: key.to_string(),
            reason: format!("expected object or array, got {other}"),
        }),
        Err(_) => {
            // Newline-delimited fallback.
            let text = std::str::from_utf8(data).map_err(|e| FusionError::MalformedRecord {
                key: key.to_string(),
                reason: format!("not UTF-8: {e}"),
            })?;
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| {
                    serde_json::from_str(line).map_err(|e| FusionError::MalformedRecord {
                        key: key.to_string(),
                        reason: format!("bad JSON line: {e}"),
                    })
                })
                .collect()
        }
    }
}

/// Read every raw post under the partition's input prefix.
///
/// Absent input (no objects) and malformed records are both fatal: the job
/// cannot produce a meaningful hour without its posts.
pub async fn read_posts(
    store: &dyn ObjectStore,
    input_prefix: &str,
) -> Result<Vec<RawPost>, FusionError> {
    let keys = list_keys(store, input_prefix).await?;
    if keys.is_empty() {
        return Err(FusionError::MissingInput(input_prefix.to_string()));
    }

    let mut posts = Vec::new();
    for key in &keys {
        let raw = get_bytes(store, key).await?;
        let decoded = decode_body(&raw, key)?;
        for value in body_to_values(&decoded, key)? {
            let post: RawPost =
                serde_json::from_value(value).map_err(|e| FusionError::MalformedRecord {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
            posts.push(post);
        }
    }

    debug!(objects = keys.len(), posts = posts.len(), prefix = input_prefix, "read raw posts");
    Ok(posts)
}

/// Read raw price records for the partition's hour, wildcarded across the
/// per-coin sub-sources under `{price_root}/`.
///
/// Unlike posts, bad objects and bad records are skipped with a warning:
/// missing price data degrades the hour, it does not fail it.
pub async fn read_prices(
    store: &dyn ObjectStore,
    price_root: &str,
    partition: &PartitionKey,
) -> Result<Vec<PricePoint>, FusionError> {
    let keys = list_keys(store, price_root).await?;
    let hour_marker = format!("/{partition}/");

    let mut points = Vec::new();
    for key in keys.iter().filter(|k| k.contains(&hour_marker)) {
        let parsed = get_bytes(store, key)
            .await
            .map_err(FusionError::from)
            .and_then(|raw| decode_body(&raw, key))
            .and_then(|decoded| body_to_values(&decoded, key));

        let values = match parsed {
            Ok(values) => values,
            Err(e) => {
                warn!(key = %key, error = %e, "skipping unreadable price object");
                continue;
            }
        };

        for value in values {
            match serde_json::from_value::<PricePoint>(value) {
                Ok(point) => points.push(point),
                Err(e) => warn!(key = %key, error = %e, "skipping malformed price record"),
            }
        }
    }

    debug!(points = points.len(), partition = %partition, "read raw price records");
    Ok(points)
}
