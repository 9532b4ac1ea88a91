//! Topic inference from post text.

/// Ordered topic → surface-form table, evaluated in fixed priority order.
///
/// When aliases of several topics co-occur in one post, the first topic in
/// this table wins. That ordering is the tie-break contract; entries must
/// not be reordered casually.
pub const TOPIC_ALIASES: &[(&str, &[&str])] = &[
    ("bitcoin", &["bitcoin", "btc", "₿"]),
    ("ethereum", &["ethereum", "eth", "ether"]),
    ("solana", &["solana", "sol"]),
    ("dogecoin", &["dogecoin", "doge"]),
    ("cardano", &["cardano", "ada"]),
];

/// Infer the topic a post is about.
///
/// An exact match between the post's source channel and a topic name wins
/// immediately; otherwise the first topic whose alias appears as a
/// space-delimited token in the lower-cased `title + text` wins. Posts
/// matching nothing return `None` and are excluded from aggregation.
pub fn infer_topic(subreddit: &str, title: &str, text: &str) -> Option<&'static str> {
    let channel = subreddit.to_lowercase();
    for (topic, _) in TOPIC_ALIASES {
        if channel == *topic {
            return Some(topic);
        }
    }

    let combined = format!(" {} {} ", title.to_lowercase(), text.to_lowercase());
    for (topic, aliases) in TOPIC_ALIASES {
        for alias in *aliases {
            if combined.contains(&format!(" {alias} ")) {
                return Some(topic);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_match_wins_immediately() {
        // The channel names a topic, so an earlier topic's alias in the
        // text does not steal the post.
        assert_eq!(infer_topic("Ethereum", "thoughts on btc", ""), Some("ethereum"));
    }

    #[test]
    fn test_alias_token_match() {
        assert_eq!(infer_topic("CryptoCurrency", "bought more BTC today", ""), Some("bitcoin"));
        assert_eq!(infer_topic("CryptoCurrency", "", "ada looks strong"), Some("cardano"));
    }

    #[test]
    fn test_alias_must_be_space_delimited() {
        // "豆doge" or "dogecoinish" style substrings do not count.
        assert_eq!(infer_topic("CryptoCurrency", "adamant about nothing", ""), None);
        assert_eq!(infer_topic("CryptoCurrency", "bitcoins", ""), None);
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // Both bitcoin and ethereum aliases present: table order decides.
        assert_eq!(infer_topic("CryptoCurrency", "eth vs btc", ""), Some("bitcoin"));
    }

    #[test]
    fn test_no_match_excluded() {
        assert_eq!(infer_topic("wallstreetbets", "stonks only go up", ""), None);
    }

    #[test]
    fn test_unicode_alias() {
        assert_eq!(infer_topic("CryptoCurrency", "sold all my ₿ yesterday", ""), Some("bitcoin"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(infer_topic("BITCOIN", "", ""), Some("bitcoin"));
        assert_eq!(infer_topic("CryptoCurrency", "SOLANA season", ""), Some("solana"));
    }
}
