pub mod rate_cache;
pub mod rate_feed;

pub use rate_cache::RateCache;
pub use rate_feed::{HttpRateFeed, RateFeed};
