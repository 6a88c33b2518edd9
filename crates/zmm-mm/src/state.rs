//! Per-asset quote state owned by the executor.

use serde::{Deserialize, Serialize};
use zmm_core::Price;

/// Prices the engine believes are live, plus the rate-limit window.
///
/// Resting prices are `0` until the first successful submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteState {
    pub resting_bid: Price,
    pub resting_ask: Price,
    /// Epoch millis until which no submission may be attempted.
    pub rate_limited_until_ms: u64,
}

impl QuoteState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_rate_limited(&self, now_ms: u64) -> bool {
        now_ms < self.rate_limited_until_ms
    }

    /// Remaining backoff in millis (0 once elapsed).
    pub fn backoff_remaining_ms(&self, now_ms: u64) -> u64 {
        self.rate_limited_until_ms.saturating_sub(now_ms)
    }

    /// Record a successful replace.
    pub fn record_placed(&mut self, bid: Price, ask: Price) {
        self.resting_bid = bid;
        self.resting_ask = ask;
    }

    /// Extend the backoff window. Never shortens an open window.
    ///
    /// Returns the effective deadline.
    pub fn extend_backoff(&mut self, until_ms: u64) -> u64 {
        self.rate_limited_until_ms = self.rate_limited_until_ms.max(until_ms);
        self.rate_limited_until_ms
    }
}
