pub mod config;
pub mod partition;
pub mod post;
pub mod price;

pub use config::Config;
pub use partition::{PartitionError, PartitionKey};
pub use post::RawPost;
pub use price::PricePoint;
