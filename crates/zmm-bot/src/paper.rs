//! In-memory paper exchange.
//!
//! Stands in for the exchange client in the bundled binary: keeps resting
//! quotes per asset, never fills, and reports a static account balance.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

use zmm_core::{AccountSummary, Asset, OrderRequest, Position, RestingOrder, Side};
use zmm_executor::{
    OrderManagement, OrderServiceError, OrderServiceResult, SnapshotAccessor, SnapshotResult,
};

#[derive(Debug, Default)]
struct PaperBook {
    next_order_id: u128,
    orders: HashMap<Asset, Vec<RestingOrder>>,
    position: Option<Position>,
    balance: Decimal,
}

#[derive(Debug)]
pub struct PaperExchange {
    book: Mutex<PaperBook>,
}

impl PaperExchange {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            book: Mutex::new(PaperBook {
                next_order_id: 1,
                balance: starting_balance,
                ..Default::default()
            }),
        }
    }

    pub fn set_position(&self, position: Option<Position>) {
        self.book.lock().position = position;
    }

    pub fn open_orders(&self, asset: &Asset) -> Vec<RestingOrder> {
        self.book
            .lock()
            .orders
            .get(asset)
            .cloned()
            .unwrap_or_default()
    }
}

/// A post-only pair must not cross itself.
fn check_not_crossed(orders: &[OrderRequest]) -> OrderServiceResult<()> {
    let best = |side: Side| {
        orders
            .iter()
            .filter(|o| o.side == side)
            .map(|o| o.price)
            .reduce(|a, b| if side == Side::Bid { a.max(b) } else { a.min(b) })
    };
    match (best(Side::Bid), best(Side::Ask)) {
        (Some(bid), Some(ask)) if bid >= ask => Err(OrderServiceError::Rejected(format!(
            "post-only bid {bid} crosses ask {ask}"
        ))),
        _ => Ok(()),
    }
}

impl OrderManagement for PaperExchange {
    fn replace_orders<'a>(
        &'a self,
        asset: &'a Asset,
        orders: Vec<OrderRequest>,
    ) -> BoxFuture<'a, OrderServiceResult<()>> {
        Box::pin(async move {
            check_not_crossed(&orders)?;

            let mut book = self.book.lock();
            let mut resting = Vec::with_capacity(orders.len());
            for order in orders {
                let order_id = book.next_order_id;
                book.next_order_id += 1;
                resting.push(RestingOrder {
                    order_id,
                    side: order.side,
                    price: order.price,
                    size: order.size,
                });
            }
            debug!(asset = %asset, count = resting.len(), "Paper orders replaced");
            book.orders.insert(asset.clone(), resting);
            Ok(())
        })
    }

    fn cancel_all_orders<'a>(&'a self, asset: &'a Asset) -> BoxFuture<'a, OrderServiceResult<()>> {
        Box::pin(async move {
            let cancelled = self
                .book
                .lock()
                .orders
                .remove(asset)
                .map(|o| o.len())
                .unwrap_or(0);
            debug!(asset = %asset, cancelled, "Paper orders cancelled");
            Ok(())
        })
    }
}

impl SnapshotAccessor for PaperExchange {
    fn fetch_position<'a>(
        &'a self,
        _asset: &'a Asset,
    ) -> BoxFuture<'a, SnapshotResult<Option<Position>>> {
        Box::pin(async move { Ok(self.book.lock().position) })
    }

    fn fetch_open_orders<'a>(
        &'a self,
        asset: &'a Asset,
    ) -> BoxFuture<'a, SnapshotResult<Vec<RestingOrder>>> {
        Box::pin(async move { Ok(self.open_orders(asset)) })
    }

    fn fetch_account_summary(&self) -> BoxFuture<'_, SnapshotResult<AccountSummary>> {
        Box::pin(async move {
            Ok(AccountSummary {
                balance: self.book.lock().balance,
                unrealized_pnl: Decimal::ZERO,
            })
        })
    }
}
