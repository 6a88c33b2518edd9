//! Order replacement executor.
//!
//! One `Executor` per quoted asset. It owns the [`QuoteState`] and the
//! single-flight slot for submissions, and turns rate-limit responses into a
//! backoff window.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use zmm_core::{Asset, Clock, Network, OrderRequest, Price, Side, Size};
use zmm_mm::{QuoteConfig, QuoteState};
use zmm_telemetry::Metrics;

use crate::error::{ExecutorError, ExecutorResult, OrderServiceError};
use crate::order_service::OrderManagement;
use crate::single_flight::SingleFlight;

/// Holds the in-flight gauge at 1 for its lifetime, including when the
/// submitting task is aborted.
struct InFlightGauge<'a> {
    asset: &'a str,
}

impl<'a> InFlightGauge<'a> {
    fn raise(asset: &'a str) -> Self {
        Metrics::in_flight(asset, true);
        Self { asset }
    }
}

impl Drop for InFlightGauge<'_> {
    fn drop(&mut self) {
        Metrics::in_flight(self.asset, false);
    }
}

pub struct Executor {
    asset: Asset,
    network: Network,
    config: QuoteConfig,
    orders: Arc<dyn OrderManagement>,
    clock: Arc<dyn Clock>,
    /// Never held across an await.
    state: Mutex<QuoteState>,
    flight: SingleFlight,
}

impl Executor {
    pub fn new(
        asset: Asset,
        network: Network,
        config: QuoteConfig,
        orders: Arc<dyn OrderManagement>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            asset,
            network,
            config,
            orders,
            clock,
            state: Mutex::new(QuoteState::new()),
            flight: SingleFlight::new(),
        }
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Copy of the current quote state.
    pub fn state(&self) -> QuoteState {
        *self.state.lock()
    }

    pub fn is_in_flight(&self) -> bool {
        self.flight.is_busy()
    }

    pub fn is_backing_off(&self) -> bool {
        self.state.lock().is_rate_limited(self.clock.now_ms())
    }

    /// Build the bid/ask pair for one submission.
    ///
    /// Both orders share one expiry, set only on production networks.
    pub fn build_orders(&self, bid: Price, ask: Price) -> Vec<OrderRequest> {
        let expiry_ts = if self.network.is_production() {
            Some(self.clock.now_secs() + self.config.time_in_force_secs as i64)
        } else {
            None
        };
        let size = Size::new(self.config.quote_size);

        [(Side::Bid, bid), (Side::Ask, ask)]
            .into_iter()
            .map(|(side, price)| OrderRequest {
                side,
                price,
                size,
                order_type: self.config.order_type(),
                expiry_ts,
                client_order_id: self.config.client_order_id(),
            })
            .collect()
    }

    /// Replace the resting quotes with `bid`/`ask` in one atomic call.
    ///
    /// Returns without a network call while the backoff window is open or
    /// another submission is in flight. Resting prices only move on success.
    pub async fn submit(&self, bid: Price, ask: Price) -> ExecutorResult<()> {
        let asset = self.asset.symbol();

        let remaining_ms = self.state.lock().backoff_remaining_ms(self.clock.now_ms());
        if remaining_ms > 0 {
            debug!(asset, remaining_ms, "Submit skipped: backing off");
            Metrics::submission(asset, "backing_off");
            return Err(ExecutorError::BackingOff { remaining_ms });
        }

        let Some(_guard) = self.flight.try_acquire() else {
            debug!(asset, "Submit skipped: replacement in flight");
            Metrics::submission(asset, "in_flight");
            return Err(ExecutorError::InFlight);
        };
        let gauge = InFlightGauge::raise(asset);

        let orders = self.build_orders(bid, ask);
        debug!(asset, %bid, %ask, expiry = ?orders[0].expiry_ts, "Submitting replace");

        let started = Instant::now();
        let result = self.orders.replace_orders(&self.asset, orders).await;
        Metrics::submit_latency(asset, started.elapsed().as_secs_f64() * 1000.0);
        drop(gauge);

        match result {
            Ok(()) => {
                self.state.lock().record_placed(bid, ask);
                Metrics::submission(asset, "ok");
                Metrics::resting_prices(asset, bid.inner(), ask.inner());
                info!(asset, %bid, %ask, "Quotes replaced");
                Ok(())
            }
            Err(OrderServiceError::RateLimited { retry_after_secs }) => {
                let retry_after_secs =
                    retry_after_secs.unwrap_or(self.config.default_retry_after_secs);
                let until_ms = self.state.lock().extend_backoff(
                    self.clock
                        .now_ms()
                        .saturating_add(retry_after_secs.saturating_mul(1000)),
                );
                Metrics::submission(asset, "rate_limited");
                Metrics::rate_limited(asset, until_ms);
                warn!(asset, retry_after_secs, until_ms, "Rate limited, backing off");
                Err(ExecutorError::RateLimited { retry_after_secs })
            }
            Err(e) => {
                Metrics::submission(asset, "failed");
                error!(asset, %bid, %ask, error = %e, "Replace failed");
                Err(ExecutorError::SubmissionFailed(e.to_string()))
            }
        }
    }

    /// Cancel every resting order of the asset.
    ///
    /// Not gated by the single-flight slot or the backoff window.
    pub async fn cancel_all(&self) -> ExecutorResult<()> {
        let asset = self.asset.symbol();
        match self.orders.cancel_all_orders(&self.asset).await {
            Ok(()) => {
                Metrics::cancel_all(true);
                info!(asset, "All orders cancelled");
                Ok(())
            }
            Err(e) => {
                Metrics::cancel_all(false);
                error!(asset, error = %e, "Cancel all failed");
                Err(ExecutorError::CancelFailed(e.to_string()))
            }
        }
    }
}
