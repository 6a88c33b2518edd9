//! Core domain types for the zmm quoting engine.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `Side`, `OrderType`, `OrderRequest`: Order vocabulary
//! - `Asset`, `Network`: What we quote and where
//! - `Position`, `RestingOrder`, `AccountSummary`: Account snapshots
//! - `Clock`: Injectable time source

pub mod clock;
pub mod decimal;
pub mod error;
pub mod market;
pub mod order;
pub mod position;

pub use clock::{Clock, ManualClock, SystemClock};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use market::{Asset, Network};
pub use order::{ClientOrderId, OrderRequest, OrderType, Side};
pub use position::{AccountSummary, Position, RestingOrder};

/// Basis points per unit (1 bps = 1/10000).
pub const BPS_DIVISOR: rust_decimal::Decimal = rust_decimal_macros::dec!(10000);
