//! Prometheus metrics and structured logging for zmm.
//!
//! - Prometheus metrics for book updates, decisions, submissions, backoff
//! - Structured logging with tracing (JSON in production)
//! - Account summary reporting for the housekeeping task

pub mod account;
pub mod error;
pub mod logging;
pub mod metrics;

pub use account::{AccountSummaryReporter, SessionStats};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
