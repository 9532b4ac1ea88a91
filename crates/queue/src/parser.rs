//! Parse queue message bodies into storage-event [`Notification`]s.
//!
//! A message body is the storage service's event envelope:
//! `{"Records": [{"s3": {"bucket": {"name": ...}, "object": {"key": ...}}}]}`.
//! One message can carry several sub-records; each becomes a notification
//! tagged with the owning message's id so batch-level redelivery can target
//! exactly the failed messages.

use serde::Deserialize;
use tracing::warn;

use crate::consumer::QueueMessage;
use crate::error::QueueError;

/// One storage-event record: a new object landed in a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub bucket: String,
    pub key: String,
    /// Id of the queue message this record arrived in.
    pub message_id: String,
}

#[derive(Deserialize)]
struct EventBody {
    #[serde(rename = "Records", default)]
    records: Vec<EventRecord>,
}

#[derive(Deserialize)]
struct EventRecord {
    #[serde(default)]
    s3: Option<S3Entity>,
}

#[derive(Deserialize)]
struct S3Entity {
    #[serde(default)]
    bucket: Option<BucketEntity>,
    #[serde(default)]
    object: Option<ObjectEntity>,
}

#[derive(Deserialize)]
struct BucketEntity {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ObjectEntity {
    key: Option<String>,
}

/// Parse a single queue message body into notifications.
///
/// Sub-records missing a bucket name or object key are dropped without
/// being counted; only structurally invalid JSON fails the message.
pub fn parse_message(msg: &QueueMessage) -> Result<Vec<Notification>, QueueError> {
    let body: EventBody = serde_json::from_str(&msg.body)
        .map_err(|e| QueueError::Parse(format!("invalid JSON in message {}: {}", msg.id, e)))?;

    let notifications = body
        .records
        .into_iter()
        .filter_map(|record| {
            let s3 = record.s3?;
            let bucket = s3.bucket.and_then(|b| b.name)?;
            let key = s3.object.and_then(|o| o.key)?;
            Some(Notification {
                bucket,
                key,
                message_id: msg.id.clone(),
            })
        })
        .collect();

    Ok(notifications)
}

/// Parse a batch of messages, separating successes from failures.
///
/// Returns `(notifications, errors)`. Good messages are never blocked by
/// bad ones; each error carries the offending message id so the caller can
/// nack exactly that message.
pub fn parse_batch(messages: &[QueueMessage]) -> (Vec<Notification>, Vec<(String, QueueError)>) {
    let mut notifications = Vec::with_capacity(messages.len());
    let mut errors = Vec::new();

    for msg in messages {
        match parse_message(msg) {
            Ok(parsed) => notifications.extend(parsed),
            Err(e) => {
                warn!(message_id = %msg.id, error = %e, "failed to parse queue message");
                errors.push((msg.id.clone(), e));
            }
        }
    }

    (notifications, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_msg(id: &str, body: &str) -> QueueMessage {
        QueueMessage {
            id: id.to_string(),
            body: body.to_string(),
            receipt_handle: format!("handle-{id}"),
            timestamp: Utc::now(),
            attempt_count: 1,
        }
    }

    fn event_body(entries: &[(&str, &str)]) -> String {
        let records: Vec<String> = entries
            .iter()
            .map(|(bucket, key)| {
                format!(
                    r#"{{"s3":{{"bucket":{{"name":"{bucket}"}},"object":{{"key":"{key}"}}}}}}"#
                )
            })
            .collect();
        format!(r#"{{"Records":[{}]}}"#, records.join(","))
    }

    #[test]
    fn test_parse_single_record() {
        let body = event_body(&[("data-bucket", "raw/reddit/cryptocurrency/2025/11/25/21/a.json.gz")]);
        let msg = make_msg("msg-1", &body);
        let notifications = parse_message(&msg).unwrap();

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].bucket, "data-bucket");
        assert_eq!(
            notifications[0].key,
            "raw/reddit/cryptocurrency/2025/11/25/21/a.json.gz"
        );
        assert_eq!(notifications[0].message_id, "msg-1");
    }

    #[test]
    fn test_parse_multiple_records_per_message() {
        let body = event_body(&[("b", "k1"), ("b", "k2"), ("b", "k3")]);
        let notifications = parse_message(&make_msg("msg-2", &body)).unwrap();
        assert_eq!(notifications.len(), 3);
        assert!(notifications.iter().all(|n| n.message_id == "msg-2"));
    }

    #[test]
    fn test_record_missing_key_dropped_silently() {
        let body = r#"{"Records":[
            {"s3":{"bucket":{"name":"b"},"object":{"key":"good"}}},
            {"s3":{"bucket":{"name":"b"},"object":{}}},
            {"s3":{"bucket":{},"object":{"key":"orphan"}}},
            {"s3":{"bucket":{"name":"b"}}}
        ]}"#;
        let notifications = parse_message(&make_msg("msg-3", body)).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].key, "good");
    }

    #[test]
    fn test_empty_records_list() {
        let notifications = parse_message(&make_msg("msg-4", r#"{"Records":[]}"#)).unwrap();
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_missing_records_field() {
        let notifications = parse_message(&make_msg("msg-5", r#"{}"#)).unwrap();
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_invalid_json_fails_the_message() {
        let err = parse_message(&make_msg("msg-bad", "not json")).unwrap_err();
        assert!(matches!(err, QueueError::Parse(_)));
    }

    #[test]
    fn test_parse_batch_partial_success() {
        let messages = vec![
            make_msg("good-1", &event_body(&[("b", "k1")])),
            make_msg("bad-1", "{{{"),
            make_msg("good-2", &event_body(&[("b", "k2"), ("b", "k3")])),
        ];

        let (notifications, errors) = parse_batch(&messages);

        assert_eq!(notifications.len(), 3);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "bad-1");
    }
}
