//! Executor error types.

use thiserror::Error;

/// Errors reported by the order-management collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderServiceError {
    /// HTTP 429 from the exchange SDK, with the retry hint if present.
    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl OrderServiceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

pub type OrderServiceResult<T> = Result<T, OrderServiceError>;

/// Errors reported by the snapshot accessor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Account decode error: {0}")]
    Decode(String),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Rate limited, backing off {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Backoff window open for another {remaining_ms}ms")]
    BackingOff { remaining_ms: u64 },

    #[error("Replacement already in flight")]
    InFlight,

    #[error("Order submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Cancel all failed: {0}")]
    CancelFailed(String),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl ExecutorError {
    /// Label used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::BackingOff { .. } => "backing_off",
            Self::InFlight => "in_flight",
            Self::SubmissionFailed(_) => "failed",
            Self::CancelFailed(_) => "cancel_failed",
            Self::Snapshot(_) => "snapshot",
        }
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
