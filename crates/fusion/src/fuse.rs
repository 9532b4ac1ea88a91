//! Fusion of sentiment and price aggregates.

use std::collections::HashMap;

use serde::Serialize;

use coinpulse_core::PartitionKey;

use crate::aggregate::{PriceAggregate, SentimentAggregate};
use crate::sentiment::SentimentLabel;

/// One output row of the joined store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedRecord {
    pub topic: String,
    pub price_usd: f64,
    pub price_sample_count: u64,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub date: String,
    pub hour: String,
}

/// Inner join of sentiment and price aggregates on topic.
///
/// The hour is fixed by the partition being processed, so topic is the only
/// join key; topics present on one side only produce no row.
pub fn fuse(
    sentiment: &[SentimentAggregate],
    prices: &[PriceAggregate],
    partition: &PartitionKey,
) -> Vec<FusedRecord> {
    let by_topic: HashMap<&str, &PriceAggregate> =
        prices.iter().map(|p| (p.topic.as_str(), p)).collect();

    sentiment
        .iter()
        .filter_map(|agg| {
            let price = by_topic.get(agg.topic.as_str())?;
            Some(FusedRecord {
                topic: agg.topic.clone(),
                price_usd: price.mean_price,
                price_sample_count: price.sample_count,
                sentiment_label: agg.label,
                sentiment_score: agg.mean_score,
                date: partition.date_string(),
                hour: partition.hour_string(),
            })
        })
        .collect()
}
