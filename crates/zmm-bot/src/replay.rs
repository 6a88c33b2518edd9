//! JSON-lines book update replay.
//!
//! Each non-empty line is one [`BookUpdate`], e.g.
//! `{"side":"bid","best_price":"99.95"}`. A subscription replays the lines of
//! its side in file order, optionally paced, then ends.

use std::path::PathBuf;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt};
use tracing::info;

use zmm_core::{Asset, Side};
use zmm_feed::{BookStream, BookUpdate, FeedError, FeedResult, MarketDataFeed};

pub struct ReplayFeed {
    path: PathBuf,
    interval: Duration,
}

impl ReplayFeed {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
        }
    }
}

/// Parse the lines belonging to `side`. Malformed lines become decode errors
/// in place so the consumer can skip them.
fn parse_side(content: &str, side: Side) -> Vec<FeedResult<BookUpdate>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str::<BookUpdate>(line) {
            Ok(update) if update.side == side => Some(Ok(update)),
            Ok(_) => None,
            Err(e) => Some(Err(FeedError::Decode(format!("line {}: {e}", idx + 1)))),
        })
        .collect()
}

impl MarketDataFeed for ReplayFeed {
    fn subscribe<'a>(&'a self, asset: &'a Asset, side: Side) -> BoxFuture<'a, FeedResult<BookStream>> {
        Box::pin(async move {
            let content = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| FeedError::Subscribe(format!("{}: {e}", self.path.display())))?;
            let items = parse_side(&content, side);
            info!(
                asset = %asset,
                %side,
                path = %self.path.display(),
                updates = items.len(),
                "Replay subscription opened"
            );

            let interval = self.interval;
            let stream = stream::iter(items).then(move |item| async move {
                if !interval.is_zero() {
                    tokio::time::sleep(interval).await;
                }
                item
            });
            Ok(stream.boxed())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use zmm_core::Price;

    fn replay_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_replay_filters_by_side() {
        let file = replay_file(&[
            r#"{"side":"bid","best_price":"99.9"}"#,
            r#"{"side":"ask","best_price":"100.1"}"#,
            "",
            r#"{"side":"bid","best_price":"99.8"}"#,
        ]);
        let feed = ReplayFeed::new(file.path(), Duration::ZERO);
        let asset = Asset::new("SOL");

        let bids: Vec<_> = feed
            .subscribe(&asset, Side::Bid)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(bids.len(), 2);
        assert_eq!(
            bids[1].as_ref().unwrap().best_price,
            Price::new(dec!(99.8))
        );

        let asks: Vec<_> = feed
            .subscribe(&asset, Side::Ask)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(asks.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_line_is_transient() {
        let file = replay_file(&[
            r#"{"side":"bid","best_price":"99.9"}"#,
            "not json",
        ]);
        let feed = ReplayFeed::new(file.path(), Duration::ZERO);

        let items: Vec<_> = feed
            .subscribe(&Asset::new("SOL"), Side::Bid)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        let err = items[1].as_ref().unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_missing_file_fails_subscribe() {
        let feed = ReplayFeed::new("/nonexistent/book.jsonl", Duration::ZERO);
        let result = feed.subscribe(&Asset::new("SOL"), Side::Ask).await;
        assert!(matches!(result, Err(FeedError::Subscribe(_))));
    }
}
