//! Account snapshots fetched from the exchange on demand.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Price, Side, Size};

/// Position snapshot for one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Net size (positive = long, negative = short).
    pub size: Decimal,
    /// Cumulative notional paid for the open size.
    pub cost_of_trades: Decimal,
}

impl Position {
    pub fn new(size: Decimal, cost_of_trades: Decimal) -> Self {
        Self {
            size,
            cost_of_trades,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.size.is_zero()
    }

    pub fn is_long(&self) -> bool {
        self.size > Decimal::ZERO
    }

    /// Average cost basis: `cost_of_trades / |size|`.
    ///
    /// Returns `None` for a flat position.
    pub fn avg_cost(&self) -> Option<Decimal> {
        self.cost_of_trades.checked_div(self.size.abs())
    }
}

/// An order currently resting on the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub order_id: u128,
    pub side: Side,
    pub price: Price,
    pub size: Size,
}

/// Margin account summary used by housekeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub balance: Decimal,
    pub unrealized_pnl: Decimal,
}

impl AccountSummary {
    /// Balance including unrealized PnL.
    pub fn total_balance(&self) -> Decimal {
        self.balance + self.unrealized_pnl
    }
}
