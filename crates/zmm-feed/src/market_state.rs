//! Market state aggregation.
//!
//! Keeps best bid, best ask and the derived fair price for the quoted asset.
//! Bid and ask arrive on independent streams; the fair price is recomputed
//! on every update to either side.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;
use zmm_core::{Price, Side};

use crate::feed::BookUpdate;

/// Point-in-time copy of the tracked market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketSnapshot {
    /// Best bid price (None until the first bid update).
    pub best_bid: Option<Price>,
    /// Best ask price (None until the first ask update).
    pub best_ask: Option<Price>,
    /// Mid of best bid and best ask. Unset until both sides were seen.
    pub fair_price: Option<Price>,
    /// Time of the last update to either side.
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of updates applied since startup.
    pub update_count: u64,
}

impl MarketSnapshot {
    fn recompute_fair(&mut self) {
        self.fair_price = match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(Price::mid(bid, ask)),
            _ => None,
        };
    }
}

/// Latest top-of-book state, shared between the feed tasks and the quoter.
#[derive(Debug, Default)]
pub struct MarketState {
    inner: RwLock<MarketSnapshot>,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a book update and return the resulting snapshot.
    ///
    /// Every update counts, even when the price did not change.
    pub fn apply(&self, update: &BookUpdate) -> MarketSnapshot {
        let mut state = self.inner.write();
        match update.side {
            Side::Bid => state.best_bid = Some(update.best_price),
            Side::Ask => state.best_ask = Some(update.best_price),
        }
        state.recompute_fair();
        state.updated_at = Some(update.received_at);
        state.update_count += 1;

        debug!(
            side = %update.side,
            price = %update.best_price,
            fair = ?state.fair_price.map(|p| p.to_string()),
            "Book update applied"
        );

        state.clone()
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.inner.read().clone()
    }

    pub fn fair_price(&self) -> Option<Price> {
        self.inner.read().fair_price
    }
}
