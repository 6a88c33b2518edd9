//! Position and order snapshot collaborator.
//!
//! Snapshots are fetched on demand for every decision cycle and never cached.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use zmm_core::{AccountSummary, Asset, Position, RestingOrder};

use crate::error::{SnapshotError, SnapshotResult};

/// Read access to the account's position, open orders and margin summary.
pub trait SnapshotAccessor: Send + Sync {
    /// Current position in `asset`, `None` when the account holds none.
    fn fetch_position<'a>(&'a self, asset: &'a Asset)
        -> BoxFuture<'a, SnapshotResult<Option<Position>>>;

    /// Our orders currently resting on the asset's book.
    fn fetch_open_orders<'a>(
        &'a self,
        asset: &'a Asset,
    ) -> BoxFuture<'a, SnapshotResult<Vec<RestingOrder>>>;

    fn fetch_account_summary(&self) -> BoxFuture<'_, SnapshotResult<AccountSummary>>;
}

/// Mock snapshot accessor for testing.
#[derive(Debug)]
pub struct MockSnapshots {
    position: Mutex<Option<Position>>,
    open_orders: Mutex<Vec<RestingOrder>>,
    summary: Mutex<AccountSummary>,
    /// When set, every fetch fails with this error.
    failure: Mutex<Option<SnapshotError>>,
    position_fetches: AtomicUsize,
    summary_fetches: AtomicUsize,
}

impl Default for MockSnapshots {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSnapshots {
    pub fn new() -> Self {
        Self {
            position: Mutex::new(None),
            open_orders: Mutex::new(Vec::new()),
            summary: Mutex::new(AccountSummary {
                balance: Decimal::ZERO,
                unrealized_pnl: Decimal::ZERO,
            }),
            failure: Mutex::new(None),
            position_fetches: AtomicUsize::new(0),
            summary_fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_position(&self, position: Option<Position>) {
        *self.position.lock() = position;
    }

    pub fn set_open_orders(&self, orders: Vec<RestingOrder>) {
        *self.open_orders.lock() = orders;
    }

    pub fn set_account_summary(&self, summary: AccountSummary) {
        *self.summary.lock() = summary;
    }

    pub fn set_failure(&self, failure: Option<SnapshotError>) {
        *self.failure.lock() = failure;
    }

    pub fn position_fetch_count(&self) -> usize {
        self.position_fetches.load(Ordering::SeqCst)
    }

    pub fn summary_fetch_count(&self) -> usize {
        self.summary_fetches.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> SnapshotResult<()> {
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl SnapshotAccessor for MockSnapshots {
    fn fetch_position<'a>(
        &'a self,
        _asset: &'a Asset,
    ) -> BoxFuture<'a, SnapshotResult<Option<Position>>> {
        Box::pin(async move {
            self.position_fetches.fetch_add(1, Ordering::SeqCst);
            self.check_failure()?;
            Ok(*self.position.lock())
        })
    }

    fn fetch_open_orders<'a>(
        &'a self,
        _asset: &'a Asset,
    ) -> BoxFuture<'a, SnapshotResult<Vec<RestingOrder>>> {
        Box::pin(async move {
            self.check_failure()?;
            Ok(self.open_orders.lock().clone())
        })
    }

    fn fetch_account_summary(&self) -> BoxFuture<'_, SnapshotResult<AccountSummary>> {
        Box::pin(async move {
            self.summary_fetches.fetch_add(1, Ordering::SeqCst);
            self.check_failure()?;
            Ok(*self.summary.lock())
        })
    }
}
