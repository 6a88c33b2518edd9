//! Shared fixtures for supervisor tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use zmm_bot::{LoggingSink, Supervisor, SupervisorConfig};
use zmm_core::{Asset, ManualClock, Network, Price, Side};
use zmm_executor::{Executor, MockOrderService, MockSnapshots};
use zmm_feed::{BookStream, BookUpdate, FeedError, FeedResult, MarketDataFeed};
use zmm_mm::QuoteConfig;

/// Delay before each scripted item.
const PACE: Duration = Duration::from_millis(5);

/// Feed that replays scripted items per side, paced, then stays open forever.
#[derive(Default)]
pub struct ScriptedFeed {
    scripts: Mutex<HashMap<Side, Vec<FeedResult<BookUpdate>>>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, side: Side, item: FeedResult<BookUpdate>) {
        self.scripts.lock().entry(side).or_default().push(item);
    }

    pub fn push_price(&self, side: Side, price: Decimal) {
        self.push(side, Ok(BookUpdate::new(side, Price::new(price))));
    }

    pub fn push_fatal(&self, side: Side) {
        self.push(
            side,
            Err(FeedError::Disconnected {
                side,
                reason: "socket closed".to_string(),
            }),
        );
    }
}

impl MarketDataFeed for ScriptedFeed {
    fn subscribe<'a>(&'a self, _asset: &'a Asset, side: Side) -> BoxFuture<'a, FeedResult<BookStream>> {
        Box::pin(async move {
            let items = self.scripts.lock().remove(&side).unwrap_or_default();
            let paced = stream::iter(items).then(|item| async move {
                tokio::time::sleep(PACE).await;
                item
            });
            Ok(paced.chain(stream::pending()).boxed())
        })
    }
}

pub struct Fixture {
    pub supervisor: Supervisor,
    pub feed: Arc<ScriptedFeed>,
    pub orders: Arc<MockOrderService>,
    pub snapshots: Arc<MockSnapshots>,
}

pub fn fast_config() -> SupervisorConfig {
    SupervisorConfig {
        poll_interval: Duration::from_millis(10),
        housekeeping_interval: Duration::from_millis(20),
    }
}

/// Build a supervisor over mocks. Feed items must be pushed before `run`.
pub fn fixture() -> Fixture {
    let feed = Arc::new(ScriptedFeed::new());
    let orders = Arc::new(MockOrderService::new());
    let snapshots = Arc::new(MockSnapshots::new());
    let executor = Arc::new(Executor::new(
        Asset::new("TEST"),
        Network::Devnet,
        QuoteConfig::default(),
        orders.clone(),
        Arc::new(ManualClock::new(1_700_000_000_000)),
    ));

    let supervisor = Supervisor::new(
        fast_config(),
        feed.clone(),
        snapshots.clone(),
        Arc::new(LoggingSink::new("TEST")),
        executor,
    );

    Fixture {
        supervisor,
        feed,
        orders,
        snapshots,
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
