//! Prometheus metrics for the zmm quoting engine.
//!
//! Covers:
//! - Book updates and fair price
//! - Quote decisions by outcome
//! - Submissions, latency and rate-limit backoff
//! - Supervisor state, task failures and shutdown cancel-all
//! - Account summary gauges (housekeeping)
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which must crash at startup. These panics
//! only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_histogram_vec, CounterVec,
    Gauge, GaugeVec, HistogramVec,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Book updates received.
/// Labels: asset, side (bid/ask)
pub static BOOK_UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zmm_book_updates_total",
        "Total top-of-book updates received",
        &["asset", "side"]
    )
    .unwrap()
});

/// Current fair (mid) price.
pub static FAIR_PRICE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!("zmm_fair_price", "Current fair (mid) price", &["asset"]).unwrap()
});

/// Quote decisions.
/// Labels: asset, outcome (replace or a skip reason)
pub static DECISIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zmm_decisions_total",
        "Total quote decisions by outcome",
        &["asset", "outcome"]
    )
    .unwrap()
});

/// Triggers dropped before a decision cycle was spawned.
/// Labels: asset, reason
pub static TRIGGERS_DROPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zmm_triggers_dropped_total",
        "Book update triggers dropped without spawning a cycle",
        &["asset", "reason"]
    )
    .unwrap()
});

/// Replace submissions.
/// Labels: asset, result (ok/rate_limited/failed/backing_off/in_flight)
pub static SUBMISSIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zmm_submissions_total",
        "Total replace submissions by result",
        &["asset", "result"]
    )
    .unwrap()
});

/// Replace submission latency in milliseconds.
pub static SUBMIT_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "zmm_submit_latency_ms",
        "Replace submission round-trip latency in milliseconds",
        &["asset"],
        vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Rate-limit responses received.
pub static RATE_LIMITED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zmm_rate_limited_total",
        "Total rate-limit responses from the order service",
        &["asset"]
    )
    .unwrap()
});

/// End of the current backoff window (epoch millis, 0 = none).
pub static BACKOFF_UNTIL_MS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "zmm_backoff_until_ms",
        "End of the rate-limit backoff window in epoch millis",
        &["asset"]
    )
    .unwrap()
});

/// Replacement in flight (1 = in flight).
pub static QUOTE_IN_FLIGHT: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "zmm_quote_in_flight",
        "Replacement in flight (1=in flight)",
        &["asset"]
    )
    .unwrap()
});

/// Resting quote prices as last confirmed.
/// Labels: asset, side
pub static RESTING_PRICE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "zmm_resting_price",
        "Resting quote price last confirmed by the order service",
        &["asset", "side"]
    )
    .unwrap()
});

/// Supervisor state (1 = active).
/// Labels: state (running/draining/stopped)
pub static SUPERVISOR_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "zmm_supervisor_state",
        "Supervisor state machine current state (1=active, 0=inactive)",
        &["state"]
    )
    .unwrap()
});

/// Supervised tasks that ended with an error.
/// Labels: task
pub static TASK_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zmm_task_failures_total",
        "Total supervised task failures",
        &["task"]
    )
    .unwrap()
});

/// Shutdown cancel-all outcomes.
/// Labels: result (ok/failed)
pub static CANCEL_ALL_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "zmm_cancel_all_total",
        "Total cancel-all requests by result",
        &["result"]
    )
    .unwrap()
});

/// Account balance (housekeeping).
pub static ACCOUNT_BALANCE: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("zmm_account_balance", "Margin account balance").unwrap());

/// Unrealized PnL (housekeeping).
pub static ACCOUNT_UNREALIZED_PNL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("zmm_account_unrealized_pnl", "Margin account unrealized PnL").unwrap()
});

/// Balance including unrealized PnL (housekeeping).
pub static ACCOUNT_TOTAL_BALANCE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "zmm_account_total_balance",
        "Margin account balance including unrealized PnL"
    )
    .unwrap()
});

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a book update.
    pub fn book_update(asset: &str, side: &str) {
        BOOK_UPDATES_TOTAL.with_label_values(&[asset, side]).inc();
    }

    pub fn fair_price(asset: &str, price: Decimal) {
        FAIR_PRICE.with_label_values(&[asset]).set(as_f64(price));
    }

    /// Record a decision outcome.
    pub fn decision(asset: &str, outcome: &str) {
        DECISIONS_TOTAL.with_label_values(&[asset, outcome]).inc();
    }

    pub fn trigger_dropped(asset: &str, reason: &str) {
        TRIGGERS_DROPPED_TOTAL
            .with_label_values(&[asset, reason])
            .inc();
    }

    /// Record a submission result.
    pub fn submission(asset: &str, result: &str) {
        SUBMISSIONS_TOTAL.with_label_values(&[asset, result]).inc();
    }

    pub fn submit_latency(asset: &str, latency_ms: f64) {
        SUBMIT_LATENCY_MS
            .with_label_values(&[asset])
            .observe(latency_ms);
    }

    /// Record a rate-limit response and the resulting backoff deadline.
    pub fn rate_limited(asset: &str, until_ms: u64) {
        RATE_LIMITED_TOTAL.with_label_values(&[asset]).inc();
        BACKOFF_UNTIL_MS
            .with_label_values(&[asset])
            .set(until_ms as f64);
    }

    pub fn in_flight(asset: &str, in_flight: bool) {
        QUOTE_IN_FLIGHT
            .with_label_values(&[asset])
            .set(if in_flight { 1.0 } else { 0.0 });
    }

    /// Record the resting prices confirmed by a successful replace.
    pub fn resting_prices(asset: &str, bid: Decimal, ask: Decimal) {
        RESTING_PRICE
            .with_label_values(&[asset, "bid"])
            .set(as_f64(bid));
        RESTING_PRICE
            .with_label_values(&[asset, "ask"])
            .set(as_f64(ask));
    }

    /// Set the supervisor state. Only the active state is 1.
    pub fn supervisor_state_set(state: &str) {
        for s in &["running", "draining", "stopped"] {
            SUPERVISOR_STATE.with_label_values(&[s]).set(0.0);
        }
        SUPERVISOR_STATE.with_label_values(&[state]).set(1.0);
    }

    pub fn task_failed(task: &str) {
        TASK_FAILURES_TOTAL.with_label_values(&[task]).inc();
    }

    pub fn cancel_all(ok: bool) {
        let result = if ok { "ok" } else { "failed" };
        CANCEL_ALL_TOTAL.with_label_values(&[result]).inc();
    }

    /// Update account gauges from a housekeeping snapshot.
    pub fn account(balance: Decimal, unrealized_pnl: Decimal) {
        ACCOUNT_BALANCE.set(as_f64(balance));
        ACCOUNT_UNREALIZED_PNL.set(as_f64(unrealized_pnl));
        ACCOUNT_TOTAL_BALANCE.set(as_f64(balance + unrealized_pnl));
    }
}
