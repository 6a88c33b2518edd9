//! Order-management collaborator.
//!
//! The exchange client owns signing and transaction submission; the executor
//! only hands it order requests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use zmm_core::{Asset, OrderRequest};

use crate::error::OrderServiceResult;

/// Order placement and cancellation for one account.
pub trait OrderManagement: Send + Sync {
    /// Cancel every resting order of the asset and place `orders`, atomically.
    fn replace_orders<'a>(
        &'a self,
        asset: &'a Asset,
        orders: Vec<OrderRequest>,
    ) -> BoxFuture<'a, OrderServiceResult<()>>;

    /// Cancel every resting order of the asset.
    fn cancel_all_orders<'a>(&'a self, asset: &'a Asset) -> BoxFuture<'a, OrderServiceResult<()>>;
}

/// Mock order service for testing.
#[derive(Debug)]
pub struct MockOrderService {
    /// Recorded replace calls.
    replaces: Mutex<Vec<Vec<OrderRequest>>>,
    cancel_alls: AtomicUsize,
    next_result: Mutex<OrderServiceResult<()>>,
    next_cancel_result: Mutex<OrderServiceResult<()>>,
    /// While set, replace calls park after being recorded.
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl Default for MockOrderService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderService {
    pub fn new() -> Self {
        Self {
            replaces: Mutex::new(Vec::new()),
            cancel_alls: AtomicUsize::new(0),
            next_result: Mutex::new(Ok(())),
            next_cancel_result: Mutex::new(Ok(())),
            gate: Mutex::new(None),
        }
    }

    /// Set the result of subsequent replace calls.
    pub fn set_next_result(&self, result: OrderServiceResult<()>) {
        *self.next_result.lock() = result;
    }

    pub fn set_cancel_result(&self, result: OrderServiceResult<()>) {
        *self.next_cancel_result.lock() = result;
    }

    /// Park replace calls until [`release`](Self::release).
    pub fn hold(&self) {
        *self.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let parked and future replace calls complete.
    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.close();
        }
    }

    pub fn replace_calls(&self) -> Vec<Vec<OrderRequest>> {
        self.replaces.lock().clone()
    }

    pub fn replace_count(&self) -> usize {
        self.replaces.lock().len()
    }

    pub fn cancel_all_count(&self) -> usize {
        self.cancel_alls.load(Ordering::SeqCst)
    }
}

impl OrderManagement for MockOrderService {
    fn replace_orders<'a>(
        &'a self,
        _asset: &'a Asset,
        orders: Vec<OrderRequest>,
    ) -> BoxFuture<'a, OrderServiceResult<()>> {
        Box::pin(async move {
            self.replaces.lock().push(orders);
            let gate = self.gate.lock().clone();
            if let Some(gate) = gate {
                // Closed on release; the error is the wake-up.
                let _ = gate.acquire().await;
            }
            self.next_result.lock().clone()
        })
    }

    fn cancel_all_orders<'a>(&'a self, _asset: &'a Asset) -> BoxFuture<'a, OrderServiceResult<()>> {
        Box::pin(async move {
            self.cancel_alls.fetch_add(1, Ordering::SeqCst);
            self.next_cancel_result.lock().clone()
        })
    }
}
