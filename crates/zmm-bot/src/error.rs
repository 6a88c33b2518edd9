//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] zmm_feed::FeedError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] zmm_executor::SnapshotError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] zmm_telemetry::TelemetryError),

    #[error("Housekeeping error: {0}")]
    Housekeeping(String),
}

pub type AppResult<T> = Result<T, AppError>;
