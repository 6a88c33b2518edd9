//! Order-related types and identifiers.
//!
//! Provides book side, order type, client order ID and the order request
//! handed to the order-management collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Price, Size};

/// Book side: bid (buy) or ask (sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type for quotes.
///
/// Quotes are always maker-only. `PostOnlySlide` reprices a crossing order to
/// the top of the book instead of cancelling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    PostOnly,
    PostOnlySlide,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostOnly => write!(f, "post_only"),
            Self::PostOnlySlide => write!(f, "post_only_slide"),
        }
    }
}

/// Client order ID attached to every quote.
///
/// The exchange accepts a numeric tag; every quote of this engine carries the
/// same configured tag so our orders are recognisable on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientOrderId(u64);

impl ClientOrderId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single quote to be placed. Built fresh for every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub side: Side,
    pub price: Price,
    pub size: Size,
    pub order_type: OrderType,
    /// Unix timestamp (seconds) after which the order expires on-chain.
    /// `None` means good-til-cancelled.
    pub expiry_ts: Option<i64>,
    pub client_order_id: ClientOrderId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_serde_lowercase() {
        let side: Side = serde_json::from_str("\"ask\"").unwrap();
        assert_eq!(side, Side::Ask);
        assert_eq!(serde_json::to_string(&Side::Bid).unwrap(), "\"bid\"");
    }

    #[test]
    fn test_order_request_serializes_gtc_as_null() {
        let req = OrderRequest {
            side: Side::Bid,
            price: Price::new(dec!(99.8)),
            size: Size::new(dec!(0.1)),
            order_type: OrderType::PostOnly,
            expiry_ts: None,
            client_order_id: ClientOrderId::new(1337),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["order_type"], "post_only");
        assert!(json["expiry_ts"].is_null());
        assert_eq!(json["client_order_id"], 1337);
    }
}
