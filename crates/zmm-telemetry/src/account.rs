//! Account summary and session statistics reporting.
//!
//! Called from the housekeeping task: logs the margin account summary,
//! updates the account gauges and summarises the session counters.

use chrono::{DateTime, Utc};
use tracing::info;
use zmm_core::AccountSummary;

use crate::metrics::{
    Metrics, DECISIONS_TOTAL, RATE_LIMITED_TOTAL, SUBMISSIONS_TOTAL, TRIGGERS_DROPPED_TOTAL,
};

/// Quoting activity since startup, read back from the counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub asset: String,
    pub replace_decisions: u64,
    pub within_threshold_skips: u64,
    pub submissions_ok: u64,
    pub submissions_failed: u64,
    pub rate_limited: u64,
    pub triggers_dropped: u64,
}

/// Housekeeping reporter for one asset.
pub struct AccountSummaryReporter {
    asset: String,
    start_time: DateTime<Utc>,
}

impl AccountSummaryReporter {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            start_time: Utc::now(),
        }
    }

    /// Log an account summary and update the account gauges.
    pub fn report(&self, summary: &AccountSummary) {
        Metrics::account(summary.balance, summary.unrealized_pnl);
        info!(
            asset = %self.asset,
            balance = %summary.balance,
            unrealized_pnl = %summary.unrealized_pnl,
            total = %summary.total_balance(),
            "Account summary"
        );
    }

    pub fn session_stats(&self) -> SessionStats {
        let asset = self.asset.as_str();
        let dropped = ["in_flight", "rate_limited", "evaluating"]
            .iter()
            .map(|reason| counter(&TRIGGERS_DROPPED_TOTAL, &[asset, reason]))
            .sum();

        SessionStats {
            asset: self.asset.clone(),
            replace_decisions: counter(&DECISIONS_TOTAL, &[asset, "replace"]),
            within_threshold_skips: counter(&DECISIONS_TOTAL, &[asset, "within_threshold"]),
            submissions_ok: counter(&SUBMISSIONS_TOTAL, &[asset, "ok"]),
            submissions_failed: counter(&SUBMISSIONS_TOTAL, &[asset, "failed"]),
            rate_limited: counter(&RATE_LIMITED_TOTAL, &[asset]),
            triggers_dropped: dropped,
        }
    }

    /// Log the session statistics.
    pub fn output_session_summary(&self) {
        let s = self.session_stats();
        let uptime = Utc::now() - self.start_time;

        info!(
            asset = %s.asset,
            uptime_mins = uptime.num_minutes(),
            replaces = s.replace_decisions,
            skips_within_threshold = s.within_threshold_skips,
            submissions_ok = s.submissions_ok,
            submissions_failed = s.submissions_failed,
            rate_limited = s.rate_limited,
            triggers_dropped = s.triggers_dropped,
            "Session summary"
        );
    }
}

fn counter(vec: &prometheus::CounterVec, labels: &[&str]) -> u64 {
    vec.with_label_values(labels).get() as u64
}
