//! Supervisor and run loop.
//!
//! `Running -> Draining -> Stopped`:
//! - Running: one book subscription task per side plus the housekeeping task;
//!   task liveness is polled on a fixed interval and failures are logged
//!   without stopping the siblings.
//! - Draining (on Ctrl-C or the shutdown token): abort every task, halt the
//!   quoter, then issue exactly one cancel-all for the asset.
//! - Stopped: terminal.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use zmm_core::{Asset, Side, SystemClock};
use zmm_executor::{Executor, OrderManagement, Quoter, SnapshotAccessor};
use zmm_feed::{track_side, MarketDataFeed, MarketState};
use zmm_telemetry::Metrics;

use crate::config::{AppConfig, SupervisorConfig};
use crate::error::{AppError, AppResult};
use crate::housekeeping::{run_housekeeping, HousekeepingSink, LoggingSink};
use crate::paper::PaperExchange;
use crate::replay::ReplayFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Running,
    Draining,
    Stopped,
}

impl SupervisorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// A spawned task. The handle is taken once its end has been reported.
struct Supervised {
    name: &'static str,
    handle: Option<JoinHandle<AppResult<()>>>,
}

pub struct Supervisor {
    config: SupervisorConfig,
    feed: Arc<dyn MarketDataFeed>,
    snapshots: Arc<dyn SnapshotAccessor>,
    sink: Arc<dyn HousekeepingSink>,
    quoter: Arc<Quoter>,
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(
        config: SupervisorConfig,
        feed: Arc<dyn MarketDataFeed>,
        snapshots: Arc<dyn SnapshotAccessor>,
        sink: Arc<dyn HousekeepingSink>,
        executor: Arc<Executor>,
    ) -> Self {
        let market = Arc::new(MarketState::new());
        let quoter = Arc::new(Quoter::new(executor, Arc::clone(&snapshots), market));
        Self {
            config,
            feed,
            snapshots,
            sink,
            quoter,
            state: SupervisorState::Running,
        }
    }

    /// Wire the bundled binary: replay feed, paper exchange, system clock.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let path = config.replay.path.as_deref().ok_or_else(|| {
            AppError::Config("no market data source: set replay.path or --replay".to_string())
        })?;
        let asset = config.asset();

        let feed = Arc::new(ReplayFeed::new(
            path,
            Duration::from_millis(config.replay.interval_ms),
        ));
        let exchange = Arc::new(PaperExchange::new(config.paper.starting_balance));
        let orders: Arc<dyn OrderManagement> = exchange.clone();
        let executor = Arc::new(Executor::new(
            asset.clone(),
            config.network,
            config.quote.clone(),
            orders,
            Arc::new(SystemClock),
        ));

        Ok(Self::new(
            config.supervisor_config(),
            feed,
            exchange,
            Arc::new(LoggingSink::new(asset.symbol())),
            executor,
        ))
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn market(&self) -> &Arc<MarketState> {
        self.quoter.market()
    }

    pub fn quoter(&self) -> &Arc<Quoter> {
        &self.quoter
    }

    fn set_state(&mut self, state: SupervisorState) {
        info!(from = self.state.as_str(), to = state.as_str(), "Supervisor state");
        self.state = state;
        Metrics::supervisor_state_set(state.as_str());
    }

    fn asset(&self) -> &Asset {
        self.quoter.executor().asset()
    }

    /// Run until Ctrl-C or `shutdown` fires, then drain and stop.
    pub async fn run(mut self, shutdown: CancellationToken) -> AppResult<SupervisorState> {
        let asset = self.asset().clone();
        let quote = self.quoter.executor().config();
        info!(
            asset = %asset,
            edge_bps = %quote.edge_bps,
            quote_size = %quote.quote_size,
            tif_secs = quote.time_in_force_secs,
            quoting_enabled = quote.quoting_enabled,
            "Starting supervisor"
        );
        if !quote.offset_bps.is_zero() {
            warn!(offset_bps = %quote.offset_bps, "Quote offset is accepted but not applied");
        }
        Metrics::supervisor_state_set(self.state.as_str());

        if let Err(e) = self.quoter.log_initial_orders().await {
            warn!(asset = %asset, error = %e, "Failed to fetch initial open orders");
        }

        let mut tasks = vec![
            self.spawn_feed(Side::Bid),
            self.spawn_feed(Side::Ask),
            Supervised {
                name: "housekeeping",
                handle: Some(tokio::spawn(run_housekeeping(
                    Arc::clone(&self.snapshots),
                    Arc::clone(&self.sink),
                    self.config.housekeeping_interval,
                ))),
            },
        ];

        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    Self::check_tasks(&mut tasks).await;
                }

                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.drain(tasks).await;
        Ok(self.state)
    }

    fn spawn_feed(&self, side: Side) -> Supervised {
        let feed = Arc::clone(&self.feed);
        let market = Arc::clone(self.market());
        let quoter = Arc::clone(&self.quoter);
        let asset = self.asset().clone();

        let handle = tokio::spawn(async move {
            let stream = feed.subscribe(&asset, side).await?;
            let symbol = asset.symbol().to_string();
            track_side(side, stream, market, move |snapshot| {
                Metrics::book_update(&symbol, side.as_str());
                if let Some(fair) = snapshot.fair_price {
                    Metrics::fair_price(&symbol, fair.inner());
                }
                quoter.on_book_update();
            })
            .await?;
            Ok::<(), AppError>(())
        });

        Supervised {
            name: match side {
                Side::Bid => "book_bid",
                Side::Ask => "book_ask",
            },
            handle: Some(handle),
        }
    }

    /// Report tasks that ended since the last poll. Siblings keep running.
    async fn check_tasks(tasks: &mut [Supervised]) {
        for task in tasks.iter_mut() {
            if !task.handle.as_ref().is_some_and(|h| h.is_finished()) {
                continue;
            }
            let Some(handle) = task.handle.take() else {
                continue;
            };
            match handle.await {
                Ok(Ok(())) => info!(task = task.name, "Task ended"),
                Ok(Err(e)) => {
                    Metrics::task_failed(task.name);
                    error!(task = task.name, error = %e, "Task failed");
                }
                Err(e) => {
                    Metrics::task_failed(task.name);
                    error!(task = task.name, error = %e, "Task panicked");
                }
            }
        }
    }

    async fn drain(&mut self, tasks: Vec<Supervised>) {
        self.set_state(SupervisorState::Draining);

        // Tasks already reported by `check_tasks` have no handle left.
        let handles: Vec<_> = tasks.into_iter().filter_map(|t| t.handle).collect();
        for handle in &handles {
            handle.abort();
        }
        self.quoter.halt();
        for handle in handles {
            let _ = handle.await;
        }

        // Exactly once, regardless of resting orders or an interrupted submit.
        if let Err(e) = self.quoter.executor().cancel_all().await {
            error!(asset = %self.asset(), error = %e, "Cancel all on shutdown failed");
        }

        self.set_state(SupervisorState::Stopped);
    }
}
