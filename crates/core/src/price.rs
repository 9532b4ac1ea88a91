//! Raw price points as written by the price fetcher.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One spot-price sample for a coin, stored under `raw/coingecko/{coin}/...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub coin: String,
    pub price_usd: f64,
    pub timestamp: DateTime<Utc>,
}

impl PricePoint {
    /// The top-of-hour instant this sample falls into.
    pub fn hour_bucket(&self) -> DateTime<Utc> {
        self.timestamp
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_bucket_truncates() {
        let point = PricePoint {
            coin: "bitcoin".into(),
            price_usd: 97_123.5,
            timestamp: "2025-11-25T21:47:09Z".parse().unwrap(),
        };
        assert_eq!(point.hour_bucket().to_rfc3339(), "2025-11-25T21:00:00+00:00");
    }
}
