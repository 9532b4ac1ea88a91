pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod fuse;
pub mod inference;
pub mod job;
pub mod reader;
pub mod sentiment;
pub mod topics;
pub mod writer;

pub use aggregate::{aggregate_prices, aggregate_sentiment, PriceAggregate, ScoredPost, SentimentAggregate};
pub use classifier::Classifier;
pub use error::FusionError;
pub use fuse::{fuse, FusedRecord};
pub use inference::HttpSentimentModel;
pub use job::{parse_input_uri, FusionJob, FusionOutcome};
pub use sentiment::{ModelError, Sentiment, SentimentLabel, SentimentModel};
pub use topics::{infer_topic, TOPIC_ALIASES};
