//! Quote decision engine.
//!
//! Computes bid/ask targets based on:
//! - Fair price (mid of best bid and best ask)
//! - Fixed edge (`edge_bps`), which doubles as the requote threshold
//! - Inventory skew (tighten the unwinding side of a profitable position)
//!
//! `decide` is pure: the caller fetches position and open orders, reads the
//! clock and the executor state, and acts on the returned [`Decision`].

use rust_decimal::Decimal;
use tracing::debug;

use zmm_core::{Position, Price};

use crate::config::QuoteConfig;
use crate::state::QuoteState;

/// Bid/ask price pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePair {
    pub bid: Price,
    pub ask: Price,
}

/// Everything one decision needs, captured once the snapshots arrive.
#[derive(Debug, Clone)]
pub struct DecisionInput {
    /// Current time in epoch millis.
    pub now_ms: u64,
    /// A replacement for this asset is currently being submitted.
    pub quoting_in_flight: bool,
    /// Executor state (resting prices and backoff window).
    pub state: QuoteState,
    pub fair_price: Option<Price>,
    /// Current position, `None` when the account holds none.
    pub position: Option<Position>,
    /// Number of our orders currently resting on the book.
    pub resting_order_count: usize,
}

/// Why a cycle ended without a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    RateLimited { remaining_ms: u64 },
    NoFairPrice,
    QuotingDisabled,
    WithinThreshold,
}

impl SkipReason {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InFlight => "in_flight",
            Self::RateLimited { .. } => "rate_limited",
            Self::NoFairPrice => "no_fair_price",
            Self::QuotingDisabled => "quoting_disabled",
            Self::WithinThreshold => "within_threshold",
        }
    }
}

/// Outcome of one decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Replace(QuotePair),
}

impl Decision {
    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace(_))
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace(_) => "replace",
            Self::Skip(reason) => reason.as_str(),
        }
    }
}

/// Symmetric targets: `fair * (1 ∓ edge_bps / 10000)`.
pub fn compute_targets(fair: Price, config: &QuoteConfig) -> QuotePair {
    let edge = config.edge_fraction();
    QuotePair {
        bid: Price::new(fair.inner() * (Decimal::ONE - edge)),
        ask: Price::new(fair.inner() * (Decimal::ONE + edge)),
    }
}

/// True when `target` moved more than `edge * resting` away from `resting`.
///
/// A zero resting price (nothing placed yet) always trips.
fn deviates(target: Price, resting: Price, edge: Decimal) -> bool {
    if resting.is_zero() {
        return true;
    }
    target.abs_diff(resting) > edge * resting.inner()
}

/// Profit factor of a position at `fair`, or `None` when not profitable.
///
/// Long: `(fair - avg) / avg`. Short: `(avg - fair) / avg`.
fn profit_factor(position: &Position, fair: Price) -> Option<Decimal> {
    let avg = position.avg_cost()?;
    if avg.is_zero() {
        return None;
    }
    let fair = fair.inner();
    let pf = if position.is_long() {
        if fair <= avg {
            return None;
        }
        (fair - avg) / avg
    } else {
        if fair >= avg {
            return None;
        }
        (avg - fair) / avg
    };
    Some(pf.max(Decimal::ZERO))
}

/// Decide whether to replace the resting quotes and at which prices.
///
/// Early exits, in order: in flight, rate limited, no fair price, quoting
/// disabled. Deviation flags are taken against the resting prices as they
/// were before any cold-start reset.
pub fn decide(input: &DecisionInput, config: &QuoteConfig) -> Decision {
    if input.quoting_in_flight {
        return Decision::Skip(SkipReason::InFlight);
    }
    if input.state.is_rate_limited(input.now_ms) {
        return Decision::Skip(SkipReason::RateLimited {
            remaining_ms: input.state.backoff_remaining_ms(input.now_ms),
        });
    }
    let Some(fair) = input.fair_price else {
        return Decision::Skip(SkipReason::NoFairPrice);
    };

    let edge = config.edge_fraction();
    let targets = compute_targets(fair, config);
    let resting = &input.state;

    let bid_deviates = deviates(targets.bid, resting.resting_bid, edge);
    let ask_deviates = deviates(targets.ask, resting.resting_ask, edge);
    let deviation = bid_deviates || ask_deviates;
    let cold_start = input.resting_order_count <= 1;

    debug!(
        fair = %fair,
        target_bid = %targets.bid,
        target_ask = %targets.ask,
        resting_bid = %resting.resting_bid,
        resting_ask = %resting.resting_ask,
        threshold_bid = %(edge * resting.resting_bid.inner()),
        threshold_ask = %(edge * resting.resting_ask.inner()),
        bid_deviates,
        ask_deviates,
        resting_orders = input.resting_order_count,
        "Quote targets computed"
    );

    if !config.quoting_enabled {
        return Decision::Skip(SkipReason::QuotingDisabled);
    }

    let position = input.position.filter(|p| !p.is_flat());

    let Some(position) = position else {
        return if deviation || cold_start {
            Decision::Replace(targets)
        } else {
            Decision::Skip(SkipReason::WithinThreshold)
        };
    };

    match profit_factor(&position, fair) {
        Some(pf) if deviation => {
            let skewed = if position.is_long() {
                // Long: sell into the profit with a tighter ask.
                QuotePair {
                    bid: targets.bid,
                    ask: targets.ask * (Decimal::ONE - pf * edge),
                }
            } else {
                QuotePair {
                    bid: targets.bid * (Decimal::ONE + pf * edge),
                    ask: targets.ask,
                }
            };
            debug!(
                size = %position.size,
                profit_factor = %pf,
                bid = %skewed.bid,
                ask = %skewed.ask,
                "Inventory skew applied"
            );
            Decision::Replace(skewed)
        }
        _ if deviation || cold_start => Decision::Replace(targets),
        _ => Decision::Skip(SkipReason::WithinThreshold),
    }
}
