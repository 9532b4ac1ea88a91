//! Group storage-event notifications by their calendar-hour partition.

use indexmap::IndexMap;
use tracing::warn;

use coinpulse_core::partition::{PartitionError, PartitionKey};
use coinpulse_queue::Notification;

/// Result of grouping a batch of notifications.
#[derive(Debug, Default)]
pub struct GroupOutcome {
    /// Partition → notifications, in first-seen partition order.
    pub partitions: IndexMap<PartitionKey, Vec<Notification>>,
    /// Notifications whose key did not yield a valid partition.
    pub rejected: Vec<(Notification, PartitionError)>,
}

/// Group notifications by the partition embedded in their object key.
///
/// A notification with an unparseable key fails alone: it lands in
/// `rejected` and grouping of the remaining notifications continues.
pub fn group_by_partition(notifications: Vec<Notification>) -> GroupOutcome {
    let mut outcome = GroupOutcome::default();

    for notification in notifications {
        match PartitionKey::from_object_key(&notification.key) {
            Ok(partition) => {
                outcome
                    .partitions
                    .entry(partition)
                    .or_default()
                    .push(notification);
            }
            Err(e) => {
                warn!(
                    key = %notification.key,
                    message_id = %notification.message_id,
                    error = %e,
                    "notification key does not resolve to a partition"
                );
                outcome.rejected.push((notification, e));
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(key: &str, message_id: &str) -> Notification {
        Notification {
            bucket: "data-bucket".into(),
            key: key.into(),
            message_id: message_id.into(),
        }
    }

    #[test]
    fn test_groups_by_embedded_hour() {
        let outcome = group_by_partition(vec![
            notification("raw/reddit/cryptocurrency/2025/11/25/21/a.json.gz", "m1"),
            notification("raw/reddit/cryptocurrency/2025/11/25/22/b.json.gz", "m2"),
            notification("raw/reddit/cryptocurrency/2025/11/25/21/c.json.gz", "m3"),
        ]);

        assert_eq!(outcome.partitions.len(), 2);
        assert!(outcome.rejected.is_empty());

        let p21 = PartitionKey::new(2025, 11, 25, 21).unwrap();
        assert_eq!(outcome.partitions[&p21].len(), 2);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let outcome = group_by_partition(vec![
            notification("raw/reddit/cryptocurrency/2025/11/25/23/a.json.gz", "m1"),
            notification("raw/reddit/cryptocurrency/2025/11/25/01/b.json.gz", "m2"),
        ]);

        let keys: Vec<String> = outcome.partitions.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2025/11/25/23", "2025/11/25/01"]);
    }

    #[test]
    fn test_bad_key_fails_in_isolation() {
        let outcome = group_by_partition(vec![
            notification("raw/reddit/cryptocurrency/2025/11/25/21/a.json.gz", "m1"),
            notification("raw/reddit/cryptocurrency/2025/13/40/99/b.json.gz", "m2"),
            notification("too/short", "m3"),
            notification("raw/reddit/cryptocurrency/2025/11/25/22/c.json.gz", "m4"),
        ]);

        assert_eq!(outcome.partitions.len(), 2);
        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected[0].0.message_id, "m2");
        assert_eq!(outcome.rejected[1].0.message_id, "m3");
    }
}
