//! Subreddit listing fetcher.
//!
//! Uses the public `/r/{subreddit}/new.json` listing endpoint; a descriptive
//! user agent is required or the API throttles aggressively.

use chrono::DateTime;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use coinpulse_core::RawPost;

use crate::error::FetchError;

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: ChildData,
}

#[derive(Deserialize)]
struct ChildData {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    created_utc: f64,
    score: i64,
    num_comments: i64,
}

/// Fetch the newest posts from each configured subreddit.
pub async fn fetch_posts(
    client: &Client,
    subreddits: &[String],
    limit: u32,
    user_agent: &str,
) -> Result<Vec<RawPost>, FetchError> {
    let mut posts = Vec::new();

    for subreddit in subreddits {
        let url = format!("https://www.reddit.com/r/{subreddit}/new.json?limit={limit}");
        let response = client
            .get(&url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(FetchError::Api(format!("{subreddit}: {status}")));
        }

        let listing: Listing = response.json().await?;
        debug!(subreddit = %subreddit, posts = listing.data.children.len(), "fetched listing");

        for child in listing.data.children {
            let data = child.data;
            let Some(timestamp) = DateTime::from_timestamp(data.created_utc as i64, 0) else {
                warn!(id = %data.id, created_utc = data.created_utc, "skipping post with invalid timestamp");
                continue;
            };

            posts.push(RawPost {
                id: data.id,
                title: data.title,
                text: data.selftext,
                subreddit: subreddit.clone(),
                timestamp,
                upvotes: data.score,
                num_comments: data.num_comments,
            });
        }
    }

    Ok(posts)
}
