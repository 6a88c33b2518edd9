//! Order replacement for zmm.
//!
//! # Key Components
//!
//! - [`Executor`]: Submits a bid/ask pair as one atomic replace, owns the
//!   per-asset [`QuoteState`](zmm_mm::QuoteState) and the rate-limit backoff
//! - [`Quoter`]: Turns book-update triggers into decision cycles
//! - [`SingleFlight`]: Lock-free "at most one in flight" guard
//! - [`OrderManagement`] / [`SnapshotAccessor`]: Exchange collaborators
//!
//! # Trigger Gates (in `Quoter::on_book_update`, synchronous)
//!
//! 1. Halted -> dropped
//! 2. Backoff window open -> dropped
//! 3. Executor submission in flight -> dropped
//! 4. Cycle already evaluating -> dropped, one re-evaluation queued
//! 5. (all passed) -> spawn fetch + read fair price + decide + submit

pub mod error;
pub mod executor;
pub mod order_service;
pub mod quoter;
pub mod single_flight;
pub mod snapshot;

pub use error::{
    ExecutorError, ExecutorResult, OrderServiceError, OrderServiceResult, SnapshotError,
    SnapshotResult,
};
pub use executor::Executor;
pub use order_service::{MockOrderService, OrderManagement};
pub use quoter::Quoter;
pub use single_flight::{FlightGuard, SingleFlight};
pub use snapshot::{MockSnapshots, SnapshotAccessor};
