//! Sentiment-fusion job orchestrator.
//!
//! One run covers one calendar-hour partition: classify every post, infer
//! its topic, aggregate sentiment and price per topic, inner-join the two,
//! and append the fused rows to the partitioned store. Post-side problems
//! are fatal; price-side problems degrade the hour to zero fused rows.

use std::sync::Arc;
use std::time::Instant;

use object_store::ObjectStore;
use tracing::{info, warn};

use coinpulse_core::PartitionKey;

use crate::aggregate::{aggregate_prices, aggregate_sentiment, ScoredPost};
use crate::classifier::Classifier;
use crate::error::FusionError;
use crate::fuse::fuse;
use crate::reader::{read_posts, read_prices};
use crate::topics::infer_topic;
use crate::writer::write_fused;

/// Raw-post landing prefix inside the data bucket.
const POSTS_PREFIX: &str = "raw/reddit/cryptocurrency";
/// Raw-price landing prefix, wildcarded across per-coin sub-sources.
const PRICES_PREFIX: &str = "raw/coingecko";
/// Root of the joined analytical store.
const OUTPUT_ROOT: &str = "processed/joined";

/// Split a submitted input URI into its bucket and trailing hour partition,
/// e.g. `s3://data-bucket/raw/reddit/cryptocurrency/2025/11/25/21`.
pub fn parse_input_uri(uri: &str) -> Result<(String, PartitionKey), FusionError> {
    let stripped = uri
        .strip_prefix("s3://")
        .or_else(|| uri.strip_prefix("s3a://"))
        .ok_or_else(|| FusionError::InvalidUri(uri.to_string()))?;

    let parts: Vec<&str> = stripped.trim_end_matches('/').split('/').collect();
    if parts.len() < 5 {
        return Err(FusionError::InvalidUri(uri.to_string()));
    }

    let bucket = parts[0].to_string();
    let partition: PartitionKey = parts[parts.len() - 4..].join("/").parse()?;
    Ok((bucket, partition))
}

/// Summary of one completed run.
#[derive(Debug)]
pub struct FusionOutcome {
    pub posts: usize,
    pub topics: usize,
    pub fused_rows: usize,
    pub files: Vec<String>,
}

pub struct FusionJob {
    store: Arc<dyn ObjectStore>,
    classifier: Classifier,
}

impl FusionJob {
    pub fn new(store: Arc<dyn ObjectStore>, classifier: Classifier) -> Self {
        Self { store, classifier }
    }

    /// Run all stages for one partition.
    pub async fn run(&self, partition: PartitionKey) -> Result<FusionOutcome, FusionError> {
        let start = Instant::now();
        let input_prefix = format!("{POSTS_PREFIX}/{partition}");

        // Posts are the job's reason to exist: absent or malformed input
        // aborts the run.
        let posts = read_posts(self.store.as_ref(), &input_prefix).await?;
        let sentiments = self.classifier.classify_posts(&posts).await?;

        let scored: Vec<ScoredPost> = posts
            .into_iter()
            .zip(sentiments)
            .map(|(post, sentiment)| ScoredPost {
                topic: infer_topic(&post.subreddit, &post.title, &post.text),
                post,
                sentiment,
            })
            .collect();

        let sentiment_aggregates = aggregate_sentiment(&scored);

        // Price data is best-effort: unreadable input degrades to an empty
        // aggregate and therefore zero fused rows for the hour.
        let price_points = match read_prices(self.store.as_ref(), PRICES_PREFIX, &partition).await
        {
            Ok(points) => points,
            Err(e) => {
                warn!(partition = %partition, error = %e, "price data unavailable, degrading to empty aggregate");
                Vec::new()
            }
        };
        let price_aggregates = aggregate_prices(&price_points, &partition);

        let fused = fuse(&sentiment_aggregates, &price_aggregates, &partition);
        let files = write_fused(self.store.as_ref(), OUTPUT_ROOT, &partition, &fused).await?;

        let outcome = FusionOutcome {
            posts: scored.len(),
            topics: sentiment_aggregates.len(),
            fused_rows: fused.len(),
            files,
        };

        info!(
            partition = %partition,
            posts = outcome.posts,
            topics = outcome.topics,
            fused_rows = outcome.fused_rows,
            elapsed_ms = start.elapsed().as_millis(),
            "fusion run complete"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use object_store::memory::InMemory;
    use serde_json::json;

    use coinpulse_storage::{list_keys, put_bytes};

    use crate::sentiment::{ModelError, Sentiment, SentimentLabel, SentimentModel};

    /// Deterministic model keyed on trigger words.
    struct KeywordModel;

    #[async_trait]
    impl SentimentModel for KeywordModel {
        async fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Sentiment>, ModelError> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("moon") {
                        Sentiment { label: SentimentLabel::Positive, score: 0.9 }
                    } else if t.contains("crash") {
                        Sentiment { label: SentimentLabel::Negative, score: -0.8 }
                    } else {
                        Sentiment { label: SentimentLabel::Neutral, score: 0.0 }
                    }
                })
                .collect())
        }
    }

    fn job(store: Arc<InMemory>) -> FusionJob {
        FusionJob::new(store, Classifier::new(Arc::new(KeywordModel), 8))
    }

    async fn put_post(store: &InMemory, partition: &str, name: &str, subreddit: &str, text: &str) {
        let value = json!({
            "id": name,
            "title": "title",
            "text": text,
            "subreddit": subreddit,
            "timestamp": "2025-11-25T21:10:00Z",
            "upvotes": 1,
            "num_comments": 0
        });
        put_bytes(
            store,
            &format!("raw/reddit/cryptocurrency/{partition}/{name}.json"),
            serde_json::to_vec(&value).unwrap(),
        )
        .await
        .unwrap();
    }

    async fn put_price(store: &InMemory, coin: &str, partition: &str, name: &str, price: f64, ts: &str) {
        let value = json!({"coin": coin, "price_usd": price, "timestamp": ts});
        put_bytes(
            store,
            &format!("raw/coingecko/{coin}/{partition}/{name}.json"),
            serde_json::to_vec(&value).unwrap(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_fusion() {
        let store = Arc::new(InMemory::new());
        let partition = PartitionKey::new(2025, 11, 25, 21).unwrap();

        put_post(&store, "2025/11/25/21", "p1", "Bitcoin", "btc to the moon").await;
        put_post(&store, "2025/11/25/21", "p2", "Bitcoin", "hodl").await;
        put_post(&store, "2025/11/25/21", "p3", "ethereum", "eth will crash").await;
        put_post(&store, "2025/11/25/21", "p4", "wallstreetbets", "stonks").await;
        put_price(&store, "bitcoin", "2025/11/25/21", "a", 97_000.0, "2025-11-25T21:05:00Z").await;
        put_price(&store, "bitcoin", "2025/11/25/21", "b", 97_100.0, "2025-11-25T21:35:00Z").await;

        let outcome = job(store.clone()).run(partition).await.unwrap();

        assert_eq!(outcome.posts, 4);
        // bitcoin and ethereum inferred; the wallstreetbets post is excluded.
        assert_eq!(outcome.topics, 2);
        // Only bitcoin has prices, so the inner join keeps one row.
        assert_eq!(outcome.fused_rows, 1);
        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0]
            .starts_with("processed/joined/date=2025-11-25/hour=21/topic=bitcoin/"));
    }

    #[test]
    fn test_parse_input_uri() {
        let (bucket, partition) =
            parse_input_uri("s3://data-bucket/raw/reddit/cryptocurrency/2025/11/25/21").unwrap();
        assert_eq!(bucket, "data-bucket");
        assert_eq!(partition.to_string(), "2025/11/25/21");

        // Trailing slash and the s3a scheme both accepted.
        assert!(parse_input_uri("s3a://b/raw/reddit/cryptocurrency/2025/11/25/21/").is_ok());

        assert!(matches!(
            parse_input_uri("https://b/raw/2025/11/25/21"),
            Err(FusionError::InvalidUri(_))
        ));
        assert!(matches!(
            parse_input_uri("s3://b/2025/11/25/xx"),
            Err(FusionError::Partition(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_posts_is_fatal() {
        let store = Arc::new(InMemory::new());
        let partition = PartitionKey::new(2025, 11, 25, 21).unwrap();

        let err = job(store).run(partition).await.unwrap_err();
        assert!(matches!(err, FusionError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_missing_prices_degrades_to_zero_rows() {
        let store = Arc::new(InMemory::new());
        let partition = PartitionKey::new(2025, 11, 25, 21).unwrap();

        put_post(&store, "2025/11/25/21", "p1", "Bitcoin", "btc to the moon").await;

        let outcome = job(store.clone()).run(partition).await.unwrap();

        assert_eq!(outcome.topics, 1);
        assert_eq!(outcome.fused_rows, 0);
        let written = list_keys(store.as_ref(), "processed/joined").await.unwrap();
        assert!(written.is_empty());
    }

    #[tokio::test]
    async fn test_prices_outside_hour_excluded() {
        let store = Arc::new(InMemory::new());
        let partition = PartitionKey::new(2025, 11, 25, 21).unwrap();

        put_post(&store, "2025/11/25/21", "p1", "Bitcoin", "btc to the moon").await;
        // Object sits under the right key but its timestamp is the next hour.
        put_price(&store, "bitcoin", "2025/11/25/21", "late", 1.0, "2025-11-25T22:01:00Z").await;

        let outcome = job(store).run(partition).await.unwrap();
        assert_eq!(outcome.fused_rows, 0);
    }
}
