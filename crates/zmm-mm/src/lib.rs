//! Quote decision engine for zmm.
//!
//! Decides, on every book update, whether the resting bid/ask pair should be
//! replaced and at which prices:
//! - Symmetric targets at `edge_bps` around the fair price
//! - Deviation gate: requote only when a target moved more than the edge
//! - Cold start: always rebuild a two-sided market
//! - Inventory skew: tighten the unwinding side of a profitable position
//!
//! # Architecture
//!
//! ```text
//! Book update -> Quoter (zmm-executor)
//!                ├─ fetch position + open orders
//!                ├─ decide(DecisionInput, QuoteConfig) -> Decision
//!                └─ Replace(bid, ask) -> Executor.submit()
//! ```
//!
//! Everything in this crate is pure: no I/O, no clock, no shared state.

pub mod config;
pub mod quote_engine;
pub mod state;

pub use config::{ConfigError, QuoteConfig};
pub use quote_engine::{compute_targets, decide, Decision, DecisionInput, QuotePair, SkipReason};
pub use state::QuoteState;
