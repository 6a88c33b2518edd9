//! Market data tracking for zmm.
//!
//! Consumes per-side top-of-book streams from the exchange feed and keeps
//! the latest best bid, best ask and fair (mid) price for the quoted asset.

pub mod error;
pub mod feed;
pub mod market_state;
pub mod tracker;

pub use error::{FeedError, FeedResult};
pub use feed::{BookStream, BookUpdate, MarketDataFeed};
pub use market_state::{MarketSnapshot, MarketState};
pub use tracker::track_side;
