pub mod consumer;
pub mod error;
pub mod parser;
pub mod sqs;

pub use consumer::{QueueConsumer, QueueHealth, QueueMessage};
pub use error::QueueError;
pub use parser::{parse_batch, parse_message, Notification};
pub use sqs::SqsConsumer;
