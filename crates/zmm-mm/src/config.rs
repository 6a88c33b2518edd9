//! Quoting configuration.
//!
//! Immutable once the engine starts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zmm_core::{ClientOrderId, OrderType, BPS_DIVISOR};

/// Rejected configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("edge_bps must be in [0, 10000), got {0}")]
    EdgeOutOfRange(Decimal),

    #[error("quote_size must be positive, got {0}")]
    NonPositiveSize(Decimal),

    #[error("time_in_force_secs must be positive")]
    ZeroTimeInForce,
}

/// Quoting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Half-spread around the fair price in basis points.
    /// Also the requote threshold.
    #[serde(default = "default_edge_bps")]
    pub edge_bps: Decimal,

    /// Quote offset in basis points. Accepted for CLI compatibility,
    /// not applied to prices.
    #[serde(default)]
    pub offset_bps: Decimal,

    /// Size of each quote in lots.
    #[serde(default = "default_quote_size")]
    pub quote_size: Decimal,

    /// Lifetime of a quote on production networks.
    #[serde(default = "default_time_in_force_secs")]
    pub time_in_force_secs: u64,

    /// When false, decisions are computed and logged but never submitted.
    #[serde(default = "default_true")]
    pub quoting_enabled: bool,

    /// Use the sliding post-only variant instead of plain post-only.
    #[serde(default)]
    pub post_only_slide: bool,

    /// Tag attached to every quote.
    #[serde(default = "default_client_order_id")]
    pub client_order_id: u64,

    /// Backoff applied when a rate-limit response carries no retry hint.
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            edge_bps: default_edge_bps(),
            offset_bps: Decimal::ZERO,
            quote_size: default_quote_size(),
            time_in_force_secs: default_time_in_force_secs(),
            quoting_enabled: true,
            post_only_slide: false,
            client_order_id: default_client_order_id(),
            default_retry_after_secs: default_retry_after_secs(),
        }
    }
}

impl QuoteConfig {
    /// Edge as a fraction: `edge_bps / 10000`.
    pub fn edge_fraction(&self) -> Decimal {
        self.edge_bps / BPS_DIVISOR
    }

    /// Requote threshold in basis points (same as the edge).
    pub fn requote_threshold_bps(&self) -> Decimal {
        self.edge_bps
    }

    pub fn order_type(&self) -> OrderType {
        if self.post_only_slide {
            OrderType::PostOnlySlide
        } else {
            OrderType::PostOnly
        }
    }

    pub fn client_order_id(&self) -> ClientOrderId {
        ClientOrderId::new(self.client_order_id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.edge_bps < Decimal::ZERO || self.edge_bps >= BPS_DIVISOR {
            return Err(ConfigError::EdgeOutOfRange(self.edge_bps));
        }
        if self.quote_size <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveSize(self.quote_size));
        }
        if self.time_in_force_secs == 0 {
            return Err(ConfigError::ZeroTimeInForce);
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
fn default_edge_bps() -> Decimal {
    Decimal::new(20, 0) // 20 bps
}
fn default_quote_size() -> Decimal {
    Decimal::new(1, 1) // 0.1 lots
}
fn default_time_in_force_secs() -> u64 {
    120
}
fn default_client_order_id() -> u64 {
    1337
}
fn default_retry_after_secs() -> u64 {
    10
}
