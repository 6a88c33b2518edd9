//! zmm quoting engine application.
//!
//! Orchestrates:
//! - Per-side book subscriptions feeding the market state
//! - Quote cycles (decide + single-flight replace)
//! - Periodic account housekeeping
//! - Orderly shutdown with a final cancel-all

pub mod app;
pub mod config;
pub mod error;
pub mod housekeeping;
pub mod paper;
pub mod replay;

pub use app::{Supervisor, SupervisorState};
pub use config::{AppConfig, CliOverrides, SupervisorConfig};
pub use error::{AppError, AppResult};
pub use housekeeping::{HousekeepingSink, LoggingSink};
pub use paper::PaperExchange;
pub use replay::ReplayFeed;
