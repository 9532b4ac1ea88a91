pub mod coingecko;
pub mod error;
pub mod reddit;
pub mod sink;

pub use coingecko::fetch_prices;
pub use error::FetchError;
pub use reddit::fetch_posts;
pub use sink::RawSink;
