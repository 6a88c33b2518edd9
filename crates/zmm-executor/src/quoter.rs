//! Quote cycle driver.
//!
//! Every book update is a trigger. The trigger is checked synchronously and
//! either dropped or turned into one spawned cycle: fetch position and open
//! orders, read the latest fair price, decide, submit. At most one cycle per
//! asset exists at a time. A trigger dropped because a cycle was still
//! evaluating earns one more cycle once the current one ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use zmm_feed::MarketState;
use zmm_mm::{decide, Decision, DecisionInput};
use zmm_telemetry::Metrics;

use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::Executor;
use crate::single_flight::SingleFlight;
use crate::snapshot::SnapshotAccessor;

pub struct Quoter {
    executor: Arc<Executor>,
    snapshots: Arc<dyn SnapshotAccessor>,
    market: Arc<MarketState>,
    evaluating: SingleFlight,
    /// A trigger was dropped while a cycle was evaluating.
    pending: AtomicBool,
    /// Set on shutdown; no new cycles start afterwards.
    halted: AtomicBool,
    current: Mutex<Option<AbortHandle>>,
}

impl Quoter {
    pub fn new(
        executor: Arc<Executor>,
        snapshots: Arc<dyn SnapshotAccessor>,
        market: Arc<MarketState>,
    ) -> Self {
        Self {
            executor,
            snapshots,
            market,
            evaluating: SingleFlight::new(),
            pending: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn market(&self) -> &Arc<MarketState> {
        &self.market
    }

    /// Handle a book-update trigger without blocking.
    ///
    /// Returns the spawned cycle, or `None` when the trigger was dropped.
    /// Must be called from within a tokio runtime.
    pub fn on_book_update(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let asset = self.executor.asset().symbol();

        if self.is_halted() {
            return None;
        }
        if self.executor.is_backing_off() {
            Metrics::trigger_dropped(asset, "rate_limited");
            return None;
        }
        if self.executor.is_in_flight() {
            Metrics::trigger_dropped(asset, "in_flight");
            return None;
        }
        let Some(guard) = self.evaluating.try_acquire() else {
            self.pending.store(true, Ordering::Release);
            Metrics::trigger_dropped(asset, "evaluating");
            return None;
        };
        self.pending.store(false, Ordering::Release);

        let quoter = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(e) = quoter.run_cycle().await {
                warn!(
                    asset = %quoter.executor.asset(),
                    error = %e,
                    "Quote cycle aborted"
                );
            }
            drop(guard);

            if quoter.pending.swap(false, Ordering::AcqRel) {
                debug!(asset = %quoter.executor.asset(), "Re-evaluating after dropped trigger");
                quoter.on_book_update();
            }
        });
        *self.current.lock() = Some(handle.abort_handle());
        // Lost a race with `halt`, which may have taken the previous handle.
        if self.is_halted() {
            handle.abort();
        }
        Some(handle)
    }

    /// Stop accepting triggers and abort the running cycle, if any.
    ///
    /// A submission interrupted here may or may not have reached the
    /// exchange; the caller is expected to cancel all orders afterwards.
    pub fn halt(&self) {
        self.halted.store(true, Ordering::Release);
        if let Some(handle) = self.current.lock().take() {
            handle.abort();
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// One decision cycle. Submission errors are handled by the executor and
    /// do not fail the cycle; snapshot errors do.
    ///
    /// The fair price is read after the snapshots arrive, so updates that
    /// landed while fetching are included.
    pub async fn run_cycle(&self) -> ExecutorResult<Decision> {
        let executor = &self.executor;
        let asset = executor.asset();

        let position = self.snapshots.fetch_position(asset).await?;
        let open_orders = self.snapshots.fetch_open_orders(asset).await?;

        let input = DecisionInput {
            now_ms: executor.now_ms(),
            quoting_in_flight: executor.is_in_flight(),
            state: executor.state(),
            fair_price: self.market.fair_price(),
            position,
            resting_order_count: open_orders.len(),
        };
        let decision = decide(&input, executor.config());
        Metrics::decision(asset.symbol(), decision.as_str());

        match decision {
            Decision::Replace(pair) => {
                debug!(asset = %asset, bid = %pair.bid, ask = %pair.ask, "Requoting");
                match executor.submit(pair.bid, pair.ask).await {
                    Ok(()) => {}
                    Err(ExecutorError::RateLimited { .. } | ExecutorError::SubmissionFailed(_)) => {
                        // Logged by the executor.
                    }
                    Err(e) => debug!(asset = %asset, reason = e.as_str(), "Submit skipped"),
                }
            }
            Decision::Skip(reason) => {
                debug!(asset = %asset, reason = reason.as_str(), "Quote cycle skipped");
            }
        }

        Ok(decision)
    }

    /// Log the orders resting at start-up.
    pub async fn log_initial_orders(&self) -> ExecutorResult<usize> {
        let asset = self.executor.asset();
        let orders = self.snapshots.fetch_open_orders(asset).await?;
        info!(asset = %asset, count = orders.len(), "Initial open orders");
        for order in &orders {
            info!(
                asset = %asset,
                order_id = order.order_id,
                side = %order.side,
                price = %order.price,
                size = %order.size,
                "Resting order"
            );
        }
        Ok(orders.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OrderServiceError, SnapshotError};
    use crate::order_service::MockOrderService;
    use crate::snapshot::MockSnapshots;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use zmm_core::{Asset, ManualClock, Network, Position, Price, RestingOrder, Side, Size};
    use zmm_feed::BookUpdate;
    use zmm_mm::{QuoteConfig, SkipReason};

    const START_MS: u64 = 1_700_000_000_000;

    struct Harness {
        quoter: Arc<Quoter>,
        market: Arc<MarketState>,
        service: Arc<MockOrderService>,
        snapshots: Arc<MockSnapshots>,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let service = Arc::new(MockOrderService::new());
        let snapshots = Arc::new(MockSnapshots::new());
        let clock = Arc::new(ManualClock::new(START_MS));
        let executor = Arc::new(Executor::new(
            Asset::new("SOL"),
            Network::Devnet,
            QuoteConfig::default(),
            service.clone(),
            clock.clone(),
        ));
        let market = Arc::new(MarketState::new());
        Harness {
            quoter: Arc::new(Quoter::new(executor, snapshots.clone(), market.clone())),
            market,
            service,
            snapshots,
            clock,
        }
    }

    fn quote(market: &MarketState, side: Side, price: rust_decimal::Decimal) {
        market.apply(&BookUpdate::new(side, Price::new(price)));
    }

    /// Book at 99.9 / 100.1, fair 100.
    fn with_fair(h: &Harness) {
        quote(&h.market, Side::Bid, dec!(99.9));
        quote(&h.market, Side::Ask, dec!(100.1));
    }

    fn resting(side: Side, price: rust_decimal::Decimal) -> RestingOrder {
        RestingOrder {
            order_id: 1,
            side,
            price: Price::new(price),
            size: Size::new(dec!(0.1)),
        }
    }

    async fn wait_for_replaces(service: &MockOrderService, n: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while service.replace_count() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_cold_start_cycle_places_quotes() {
        let h = harness();
        with_fair(&h);
        let decision = h.quoter.run_cycle().await.unwrap();

        assert!(decision.is_replace());
        let calls = h.service.replace_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].price, Price::new(dec!(99.8)));
        assert_eq!(calls[0][1].price, Price::new(dec!(100.2)));
        assert_eq!(h.quoter.executor().state().resting_ask, Price::new(dec!(100.2)));
    }

    #[tokio::test]
    async fn test_no_fair_price_skips_without_submit() {
        let h = harness();
        quote(&h.market, Side::Bid, dec!(99.9));
        let decision = h.quoter.run_cycle().await.unwrap();
        assert_eq!(decision, Decision::Skip(SkipReason::NoFairPrice));
        assert_eq!(h.service.replace_count(), 0);
    }

    #[tokio::test]
    async fn test_simultaneous_triggers_during_submission() {
        let h = harness();
        with_fair(&h);
        h.service.hold();

        let first = h.quoter.on_book_update().expect("first trigger spawns");
        wait_for_replaces(&h.service, 1).await;

        assert!(h.quoter.on_book_update().is_none());
        assert!(h.quoter.on_book_update().is_none());

        h.service.release();
        first.await.unwrap();
        assert_eq!(h.service.replace_count(), 1);
        assert!(!h.quoter.executor().is_in_flight());
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let h = harness();
        with_fair(&h);
        h.service
            .set_next_result(Err(OrderServiceError::Rejected("would cross".into())));

        h.quoter.on_book_update().unwrap().await.unwrap();
        assert_eq!(h.service.replace_count(), 1);
        assert!(h.quoter.executor().state().resting_bid.is_zero());

        h.service.set_next_result(Ok(()));
        h.quoter.on_book_update().unwrap().await.unwrap();
        assert_eq!(h.service.replace_count(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_drops_triggers_until_elapsed() {
        let h = harness();
        with_fair(&h);
        h.service.set_next_result(Err(OrderServiceError::RateLimited {
            retry_after_secs: Some(5),
        }));
        h.quoter.on_book_update().unwrap().await.unwrap();

        h.service.set_next_result(Ok(()));
        h.clock.advance_ms(4_000);
        assert!(h.quoter.on_book_update().is_none());
        assert_eq!(h.snapshots.position_fetch_count(), 1);

        h.clock.advance_ms(1_000);
        h.quoter.on_book_update().unwrap().await.unwrap();
        assert_eq!(h.service.replace_count(), 2);
    }

    #[tokio::test]
    async fn test_halt_aborts_cycle_and_drops_triggers() {
        let h = harness();
        with_fair(&h);
        h.service.hold();

        let cycle = h.quoter.on_book_update().unwrap();
        wait_for_replaces(&h.service, 1).await;
        assert!(h.quoter.executor().is_in_flight());

        h.quoter.halt();
        assert!(cycle.await.unwrap_err().is_cancelled());
        assert!(!h.quoter.executor().is_in_flight());
        assert!(h.quoter.is_halted());

        h.service.release();
        assert!(h.quoter.on_book_update().is_none());
        assert_eq!(h.service.replace_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_error_ends_cycle() {
        let h = harness();
        with_fair(&h);
        h.snapshots
            .set_failure(Some(SnapshotError::Rpc("node unavailable".into())));

        let result = h.quoter.run_cycle().await;
        assert!(matches!(result, Err(ExecutorError::Snapshot(_))));
        assert_eq!(h.service.replace_count(), 0);

        h.snapshots.set_failure(None);
        h.quoter.on_book_update().unwrap().await.unwrap();
        assert_eq!(h.service.replace_count(), 1);
    }

    #[tokio::test]
    async fn test_steady_state_within_threshold() {
        let h = harness();
        with_fair(&h);
        h.quoter.run_cycle().await.unwrap();

        h.snapshots.set_open_orders(vec![
            resting(Side::Bid, dec!(99.8)),
            resting(Side::Ask, dec!(100.2)),
        ]);
        h.snapshots
            .set_position(Some(Position::new(dec!(1), dec!(90))));

        quote(&h.market, Side::Bid, dec!(100));
        quote(&h.market, Side::Ask, dec!(100.2));
        let decision = h.quoter.run_cycle().await.unwrap();
        assert_eq!(decision, Decision::Skip(SkipReason::WithinThreshold));
        assert_eq!(h.service.replace_count(), 1);
        assert_eq!(h.quoter.log_initial_orders().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_back_to_back_bid_then_ask_quotes_latest_fair() {
        let h = harness();
        h.snapshots.set_open_orders(vec![
            resting(Side::Bid, dec!(99.8)),
            resting(Side::Ask, dec!(100.2)),
        ]);

        // Only the bid is known when the first cycle is spawned.
        quote(&h.market, Side::Bid, dec!(99.9));
        let first = h.quoter.on_book_update().expect("bid trigger spawns");
        quote(&h.market, Side::Ask, dec!(100.1));
        assert!(h.quoter.on_book_update().is_none());

        first.await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), async {
            while h.quoter.evaluating.is_busy() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let calls = h.service.replace_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].price, Price::new(dec!(99.8)));
        assert_eq!(calls[0][1].price, Price::new(dec!(100.2)));
        // The dropped ask trigger was evaluated once more, within threshold.
        assert_eq!(h.snapshots.position_fetch_count(), 2);
        assert!(!h.quoter.pending.load(Ordering::Acquire));
    }
}
