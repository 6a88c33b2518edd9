//! Periodic account housekeeping.
//!
//! On a fixed interval, fetch the account summary and hand it to a sink.
//! Failures are logged and swallowed; the task only ends when aborted.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};
use zmm_core::AccountSummary;
use zmm_executor::SnapshotAccessor;
use zmm_telemetry::AccountSummaryReporter;

use crate::error::AppResult;

/// Destination of periodic account summaries.
pub trait HousekeepingSink: Send + Sync {
    fn record<'a>(&'a self, summary: &'a AccountSummary) -> BoxFuture<'a, AppResult<()>>;
}

/// Sink that logs the summary, updates the account gauges and logs the
/// session counters.
pub struct LoggingSink {
    reporter: AccountSummaryReporter,
}

impl LoggingSink {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            reporter: AccountSummaryReporter::new(asset),
        }
    }
}

impl HousekeepingSink for LoggingSink {
    fn record<'a>(&'a self, summary: &'a AccountSummary) -> BoxFuture<'a, AppResult<()>> {
        Box::pin(async move {
            self.reporter.report(summary);
            self.reporter.output_session_summary();
            Ok(())
        })
    }
}

/// One housekeeping pass. Errors are returned to the caller.
pub async fn run_once(
    snapshots: &dyn SnapshotAccessor,
    sink: &dyn HousekeepingSink,
) -> AppResult<()> {
    let summary = snapshots.fetch_account_summary().await?;
    sink.record(&summary).await
}

/// Run housekeeping forever. The first pass happens one interval after start.
pub async fn run_housekeeping(
    snapshots: Arc<dyn SnapshotAccessor>,
    sink: Arc<dyn HousekeepingSink>,
    interval: Duration,
) -> AppResult<()> {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match run_once(snapshots.as_ref(), sink.as_ref()).await {
            Ok(()) => debug!("Housekeeping pass complete"),
            Err(e) => warn!(error = %e, "Housekeeping pass failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use zmm_executor::{MockSnapshots, SnapshotError};

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<AccountSummary>>,
        fail: bool,
    }

    impl HousekeepingSink for RecordingSink {
        fn record<'a>(&'a self, summary: &'a AccountSummary) -> BoxFuture<'a, AppResult<()>> {
            Box::pin(async move {
                if self.fail {
                    return Err(AppError::Housekeeping("disk full".to_string()));
                }
                self.records.lock().push(*summary);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_run_once_hands_summary_to_sink() {
        let snapshots = MockSnapshots::new();
        snapshots.set_account_summary(AccountSummary {
            balance: dec!(500),
            unrealized_pnl: dec!(12),
        });
        let sink = RecordingSink::default();

        tokio_test::assert_ok!(run_once(&snapshots, &sink).await);
        let records = sink.records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_balance(), dec!(512));
    }

    #[tokio::test]
    async fn test_run_once_propagates_fetch_error() {
        let snapshots = MockSnapshots::new();
        snapshots.set_failure(Some(SnapshotError::Rpc("timeout".to_string())));
        let sink = RecordingSink::default();

        assert!(matches!(
            run_once(&snapshots, &sink).await,
            Err(AppError::Snapshot(_))
        ));
        assert!(sink.records.lock().is_empty());
    }

    #[tokio::test]
    async fn test_loop_survives_sink_errors() {
        let snapshots = Arc::new(MockSnapshots::new());
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });

        let handle = tokio::spawn(run_housekeeping(
            snapshots.clone(),
            sink,
            Duration::from_millis(10),
        ));

        tokio::time::timeout(Duration::from_secs(2), async {
            while snapshots.summary_fetch_count() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test]
    async fn test_logging_sink_records() {
        let sink = LoggingSink::new("TEST-SINK");
        let summary = AccountSummary {
            balance: dec!(1),
            unrealized_pnl: dec!(0),
        };
        tokio_test::assert_ok!(sink.record(&summary).await);
    }
}
