//! CoinGecko spot-price fetcher.

use std::collections::HashMap;

use chrono::Utc;
use reqwest::Client;
use tracing::warn;

use coinpulse_core::PricePoint;

use crate::error::FetchError;

const SIMPLE_PRICE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Fetch the latest price for each configured coin.
///
/// All points in one sweep share the same timestamp. Coins missing from the
/// response are skipped with a warning rather than failing the sweep.
pub async fn fetch_prices(
    client: &Client,
    coins: &[String],
    currency: &str,
) -> Result<Vec<PricePoint>, FetchError> {
    let response = client
        .get(SIMPLE_PRICE_URL)
        .query(&[("ids", coins.join(",").as_str()), ("vs_currencies", currency)])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Api(format!("{status}: {body}")));
    }

    let data: HashMap<String, HashMap<String, f64>> = response.json().await?;
    let timestamp = Utc::now();

    let mut points = Vec::with_capacity(coins.len());
    for coin in coins {
        match data.get(coin).and_then(|quotes| quotes.get(currency)) {
            Some(price) => points.push(PricePoint {
                coin: coin.clone(),
                price_usd: *price,
                timestamp,
            }),
            None => warn!(coin = %coin, "no quote in price response"),
        }
    }

    Ok(points)
}
