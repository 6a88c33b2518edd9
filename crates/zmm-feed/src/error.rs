//! Feed error types.

use thiserror::Error;
use zmm_core::Side;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Subscription failed: {0}")]
    Subscribe(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Feed disconnected on {side} side: {reason}")]
    Disconnected { side: Side, reason: String },
}

impl FeedError {
    /// Transient errors are logged and the stream keeps being consumed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
