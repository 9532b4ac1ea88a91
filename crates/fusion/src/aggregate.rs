//! Per-topic sentiment and price aggregation.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use coinpulse_core::{PartitionKey, PricePoint, RawPost};

use crate::sentiment::{Sentiment, SentimentLabel};

/// Mean-score thresholds for the re-derived aggregate label.
const POSITIVE_THRESHOLD: f64 = 0.2;
const NEGATIVE_THRESHOLD: f64 = -0.2;

/// A post after classification and topic inference.
#[derive(Debug, Clone)]
pub struct ScoredPost {
    pub post: RawPost,
    pub topic: Option<&'static str>,
    pub sentiment: Sentiment,
}

/// Per-topic sentiment summary for one hour of posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentAggregate {
    pub topic: String,
    pub label: SentimentLabel,
    pub mean_score: f64,
    pub positive_count: u64,
    pub negative_count: u64,
}

/// Per-topic price summary for one hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAggregate {
    pub topic: String,
    pub hour: DateTime<Utc>,
    pub mean_price: f64,
    pub sample_count: u64,
}

/// The aggregate label is always recomputed from the mean score,
/// independent of the individual record labels.
fn label_for_mean(mean_score: f64) -> SentimentLabel {
    if mean_score >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if mean_score <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Group classified posts by topic and summarise sentiment.
///
/// Posts with no inferred topic are excluded. Output keeps first-seen
/// topic order.
pub fn aggregate_sentiment(posts: &[ScoredPost]) -> Vec<SentimentAggregate> {
    let mut groups: IndexMap<&str, Vec<&Sentiment>> = IndexMap::new();

    for scored in posts {
        if let Some(topic) = scored.topic {
            groups.entry(topic).or_default().push(&scored.sentiment);
        }
    }

    groups
        .into_iter()
        .map(|(topic, sentiments)| {
            let positive_count = sentiments
                .iter()
                .filter(|s| s.label == SentimentLabel::Positive)
                .count() as u64;
            let negative_count = sentiments
                .iter()
                .filter(|s| s.label == SentimentLabel::Negative)
                .count() as u64;
            let mean_score =
                sentiments.iter().map(|s| s.score).sum::<f64>() / sentiments.len() as f64;

            SentimentAggregate {
                topic: topic.to_string(),
                label: label_for_mean(mean_score),
                mean_score,
                positive_count,
                negative_count,
            }
        })
        .collect()
}

/// Restrict price points to the partition's hour, then summarise per topic.
///
/// An empty filtered set yields an empty vec, never a failure.
pub fn aggregate_prices(points: &[PricePoint], partition: &PartitionKey) -> Vec<PriceAggregate> {
    let Some(target_hour) = partition.hour_start() else {
        return Vec::new();
    };

    let mut groups: IndexMap<&str, Vec<f64>> = IndexMap::new();
    for point in points {
        if point.hour_bucket() == target_hour {
            groups.entry(point.coin.as_str()).or_default().push(point.price_usd);
        }
    }

    groups
        .into_iter()
        .map(|(topic, prices)| PriceAggregate {
            topic: topic.to_string(),
            hour: target_hour,
            mean_price: prices.iter().sum::<f64>() / prices.len() as f64,
            sample_count: prices.len() as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scored(topic: Option<&'static str>, label: SentimentLabel, score: f64) -> ScoredPost {
        ScoredPost {
            post: RawPost {
                id: "p".into(),
                title: "t".into(),
                text: "x".into(),
                subreddit: "s".into(),
                timestamp: Utc::now(),
                upvotes: 0,
                num_comments: 0,
            },
            topic,
            sentiment: Sentiment { label, score },
        }
    }

    #[test]
    fn test_aggregate_sentiment_by_topic() {
        let posts = vec![
            scored(Some("bitcoin"), SentimentLabel::Positive, 0.9),
            scored(Some("bitcoin"), SentimentLabel::Neutral, 0.0),
            scored(Some("ethereum"), SentimentLabel::Negative, -0.8),
        ];

        let aggregates = aggregate_sentiment(&posts);
        assert_eq!(aggregates.len(), 2);

        let bitcoin = &aggregates[0];
        assert_eq!(bitcoin.topic, "bitcoin");
        assert_eq!(bitcoin.positive_count, 1);
        assert_eq!(bitcoin.negative_count, 0);
        assert!((bitcoin.mean_score - 0.45).abs() < 1e-9);
        assert_eq!(bitcoin.label, SentimentLabel::Positive);

        let ethereum = &aggregates[1];
        assert!((ethereum.mean_score + 0.8).abs() < 1e-9);
        assert_eq!(ethereum.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_untopiced_posts_excluded() {
        let posts = vec![
            scored(None, SentimentLabel::Positive, 0.9),
            scored(Some("solana"), SentimentLabel::Neutral, 0.1),
        ];
        let aggregates = aggregate_sentiment(&posts);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].topic, "solana");
    }

    #[test]
    fn test_label_rederived_from_mean_not_majority() {
        // Two neutral labels, but the mean crosses the positive threshold.
        let posts = vec![
            scored(Some("bitcoin"), SentimentLabel::Neutral, 0.19),
            scored(Some("bitcoin"), SentimentLabel::Neutral, 0.21),
        ];
        let aggregates = aggregate_sentiment(&posts);
        assert_eq!(aggregates[0].label, SentimentLabel::Positive);
        assert_eq!(aggregates[0].positive_count, 0);
    }

    #[test]
    fn test_mean_threshold_boundaries() {
        assert_eq!(label_for_mean(0.2), SentimentLabel::Positive);
        assert_eq!(label_for_mean(-0.2), SentimentLabel::Negative);
        assert_eq!(label_for_mean(0.19), SentimentLabel::Neutral);
        assert_eq!(label_for_mean(-0.19), SentimentLabel::Neutral);
    }

    fn price(coin: &str, price_usd: f64, timestamp: &str) -> PricePoint {
        PricePoint {
            coin: coin.into(),
            price_usd,
            timestamp: timestamp.parse().unwrap(),
        }
    }

    #[test]
    fn test_aggregate_prices_filters_to_hour() {
        let partition = PartitionKey::new(2025, 11, 25, 21).unwrap();
        let points = vec![
            price("bitcoin", 100.0, "2025-11-25T21:05:00Z"),
            price("bitcoin", 110.0, "2025-11-25T21:55:00Z"),
            price("bitcoin", 999.0, "2025-11-25T22:01:00Z"),
            price("ethereum", 10.0, "2025-11-25T21:30:00Z"),
        ];

        let aggregates = aggregate_prices(&points, &partition);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].topic, "bitcoin");
        assert!((aggregates[0].mean_price - 105.0).abs() < 1e-9);
        assert_eq!(aggregates[0].sample_count, 2);
        assert_eq!(aggregates[1].sample_count, 1);
    }

    #[test]
    fn test_empty_price_set_is_empty_not_an_error() {
        let partition = PartitionKey::new(2025, 11, 25, 21).unwrap();
        let aggregates = aggregate_prices(&[], &partition);
        assert!(aggregates.is_empty());
    }
}
