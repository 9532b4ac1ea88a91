//! Raw social-post records as written by the post fetcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One post as fetched from a subreddit listing and stored under
/// `raw/reddit/...`. Every field is required; a record missing one is a
/// malformed input and fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub text: String,
    pub subreddit: String,
    /// Creation time. Older extracts wrote this as `created_utc`.
    #[serde(alias = "created_utc")]
    pub timestamp: DateTime<Utc>,
    pub upvotes: i64,
    pub num_comments: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_record() {
        let json = r#"{
            "id": "1abcd2",
            "title": "BTC to the moon",
            "text": "bought more bitcoin today",
            "subreddit": "Bitcoin",
            "timestamp": "2025-11-25T21:03:11Z",
            "upvotes": 42,
            "num_comments": 7
        }"#;
        let post: RawPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "1abcd2");
        assert_eq!(post.upvotes, 42);
    }

    #[test]
    fn test_created_utc_alias() {
        let json = r#"{
            "id": "x",
            "title": "t",
            "text": "",
            "subreddit": "ethereum",
            "created_utc": "2025-11-25T21:00:00Z",
            "upvotes": 0,
            "num_comments": 0
        }"#;
        let post: RawPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.timestamp.to_rfc3339(), "2025-11-25T21:00:00+00:00");
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let json = r#"{"id": "x", "title": "t"}"#;
        assert!(serde_json::from_str::<RawPost>(json).is_err());
    }
}
