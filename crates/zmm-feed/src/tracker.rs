//! Per-side feed consumption loop.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{info, warn};
use zmm_core::Side;

use crate::error::FeedResult;
use crate::feed::BookStream;
use crate::market_state::{MarketSnapshot, MarketState};

/// Consume one side's book stream until it ends or fails.
///
/// Each update is applied to `state` and then handed to `on_update`, which
/// must not block: it is the trigger for the quote decision, not the decision
/// itself. Transient errors are logged and skipped; any other error ends the
/// loop and is returned to the owner of the task.
pub async fn track_side<F>(
    side: Side,
    mut stream: BookStream,
    state: Arc<MarketState>,
    mut on_update: F,
) -> FeedResult<()>
where
    F: FnMut(MarketSnapshot) + Send,
{
    info!(%side, "Book subscription started");

    while let Some(item) = stream.next().await {
        match item {
            Ok(update) => {
                if update.side != side {
                    warn!(expected = %side, got = %update.side, "Book update on wrong stream, ignoring");
                    continue;
                }
                let snapshot = state.apply(&update);
                on_update(snapshot);
            }
            Err(e) if e.is_transient() => {
                warn!(%side, error = %e, "Transient feed error, continuing");
            }
            Err(e) => return Err(e),
        }
    }

    info!(%side, "Book subscription ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::feed::BookUpdate;
    use futures_util::stream;
    use rust_decimal_macros::dec;
    use zmm_core::Price;

    #[tokio::test]
    async fn test_every_update_triggers() {
        let updates = vec![
            Ok(BookUpdate::new(Side::Bid, Price::new(dec!(99)))),
            Ok(BookUpdate::new(Side::Bid, Price::new(dec!(99)))),
            Ok(BookUpdate::new(Side::Bid, Price::new(dec!(98)))),
        ];
        let state = Arc::new(MarketState::new());
        let mut seen = Vec::new();

        let result = track_side(
            Side::Bid,
            stream::iter(updates).boxed(),
            state.clone(),
            |snap| seen.push(snap.best_bid),
        )
        .await;

        tokio_test::assert_ok!(result);
        assert_eq!(seen.len(), 3);
        assert_eq!(state.snapshot().best_bid, Some(Price::new(dec!(98))));
    }

    #[tokio::test]
    async fn test_transient_error_skipped_fatal_returned() {
        let updates = vec![
            Err(FeedError::Decode("bad account data".to_string())),
            Ok(BookUpdate::new(Side::Ask, Price::new(dec!(101)))),
            Err(FeedError::Disconnected {
                side: Side::Ask,
                reason: "socket closed".to_string(),
            }),
            Ok(BookUpdate::new(Side::Ask, Price::new(dec!(102)))),
        ];
        let state = Arc::new(MarketState::new());
        let mut triggers = 0;

        let result = track_side(
            Side::Ask,
            stream::iter(updates).boxed(),
            state.clone(),
            |_| triggers += 1,
        )
        .await;

        assert!(matches!(result, Err(FeedError::Disconnected { .. })));
        assert_eq!(triggers, 1);
        assert_eq!(state.snapshot().best_ask, Some(Price::new(dec!(101))));
    }

    #[tokio::test]
    async fn test_wrong_side_ignored() {
        let updates = vec![Ok(BookUpdate::new(Side::Ask, Price::new(dec!(101))))];
        let state = Arc::new(MarketState::new());
        let mut triggers = 0;

        let result = track_side(Side::Bid, stream::iter(updates).boxed(), state.clone(), |_| {
            triggers += 1
        })
        .await;

        tokio_test::assert_ok!(result);
        assert_eq!(triggers, 0);
        assert_eq!(state.snapshot().best_ask, None);
    }
}
