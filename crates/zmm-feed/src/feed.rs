//! Market data feed contract.
//!
//! The exchange client owns the websocket and the order-book account
//! decoding; the engine only sees the resulting best price per side.

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use zmm_core::{Asset, Price, Side};

use crate::error::FeedResult;

/// Top-of-book snapshot for one side of the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub side: Side,
    pub best_price: Price,
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl BookUpdate {
    pub fn new(side: Side, best_price: Price) -> Self {
        Self {
            side,
            best_price,
            received_at: Utc::now(),
        }
    }
}

/// Lazy, infinite sequence of book updates for one side.
///
/// The stream is only restartable by subscribing again.
pub type BookStream = BoxStream<'static, FeedResult<BookUpdate>>;

/// Source of per-side top-of-book updates.
pub trait MarketDataFeed: Send + Sync {
    /// Subscribe to best-price updates for one side of the asset's book.
    fn subscribe<'a>(&'a self, asset: &'a Asset, side: Side) -> BoxFuture<'a, FeedResult<BookStream>>;
}
