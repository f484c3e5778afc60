//! Property-based coverage of the quantified invariants in `spec.md` §8.
//!
//! `FullOrderBook::on_message` is async, but `proptest!` closures are
//! synchronous; each property spins up a small current-thread runtime to
//! drive the futures involved, the same way the teacher isolates async
//! work under a deterministic harness.

use super::super::error::SnapshotError;
use super::super::message::{FeedMessage, MessageKind, Snapshot};
use super::super::order::Side;
use super::super::state::BookState;
use super::super::transport::SnapshotSource;
use super::FullOrderBook;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Snapshot, SnapshotError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Snapshot, SnapshotError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotSource for ScriptedSource {
    async fn fetch(&self, _product_id: &str) -> Result<Snapshot, SnapshotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        responses.pop_front().unwrap_or_else(|| Err(SnapshotError::new("test", "script exhausted")))
    }
}

fn bare(kind: MessageKind, sequence: i64) -> FeedMessage {
    FeedMessage {
        kind,
        sequence: Some(sequence),
        side: None,
        order_id: None,
        maker_order_id: None,
        price: None,
        size: None,
        remaining_size: None,
        new_size: None,
    }
}

fn open(sequence: i64, side: Side, id: &str, price: &str, size: &str) -> FeedMessage {
    FeedMessage {
        side: Some(side),
        order_id: Some(id.to_string()),
        price: Some(price.to_string()),
        remaining_size: Some(size.to_string()),
        ..bare(MessageKind::Open, sequence)
    }
}

fn done(sequence: i64, side: Side, id: &str, price: &str) -> FeedMessage {
    FeedMessage {
        side: Some(side),
        order_id: Some(id.to_string()),
        price: Some(price.to_string()),
        ..bare(MessageKind::Done, sequence)
    }
}

fn current_thread_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap()
}

proptest! {
    /// `spec.md` §8: for any out-of-order insertion of `seq+k+2` before
    /// `seq+k+1`, the book triggers a reload.
    #[test]
    fn out_of_order_gap_always_triggers_reload(base in 1i64..10_000, k in 0i64..50) {
        let rt = current_thread_runtime();
        rt.block_on(async {
            let source = ScriptedSource::new(vec![
                Ok(Snapshot { bids: vec![], asks: vec![], sequence: base }),
                Ok(Snapshot { bids: vec![], asks: vec![], sequence: base + k + 2 }),
            ]);
            let mut book = FullOrderBook::new();

            // Establishes Ready(base + k) via the initial load.
            book.on_message(open(base + k, Side::Buy, "seed", "1.00", "1.0"), &source, "BTC-USD").await;
            prop_assert_eq!(book.state(), BookState::Ready(base + k));

            // Jumps straight to base+k+2, skipping base+k+1: a gap.
            book.on_message(
                open(base + k + 2, Side::Buy, "jump", "1.00", "1.0"),
                &source,
                "BTC-USD",
            )
            .await;

            prop_assert_eq!(source.calls(), 2);
            prop_assert_eq!(book.state(), BookState::Ready(base + k + 2));
            Ok(())
        })?;
    }

    /// `spec.md` §8: `open(o)` followed by `done(o.id, o.price)` returns
    /// the book to its prior state (the order is gone, same as before the
    /// pair was applied).
    #[test]
    fn open_then_done_is_a_round_trip(
        base in 1i64..10_000,
        price_cents in 1i64..1_000_000,
        size_cents in 1i64..1_000_000,
    ) {
        let rt = current_thread_runtime();
        rt.block_on(async {
            let source = ScriptedSource::new(vec![Ok(Snapshot { bids: vec![], asks: vec![], sequence: base })]);
            let mut book = FullOrderBook::new();

            let price = format!("{}.{:02}", price_cents / 100, price_cents % 100);
            let size = format!("{}.{:02}", size_cents / 100, size_cents % 100);

            // First message ever seen loads the snapshot and installs the
            // book at Ready(base); the bid count before the pair is 0.
            book.on_message(open(base + 1, Side::Buy, "roundtrip", &price, &size), &source, "BTC-USD").await;
            prop_assert_eq!(book.bids().len(), 1);

            book.on_message(done(base + 2, Side::Buy, "roundtrip", &price), &source, "BTC-USD").await;

            prop_assert_eq!(book.state(), BookState::Ready(base + 2));
            prop_assert!(book.bids().is_empty());
            prop_assert!(book.asks().is_empty());
            Ok(())
        })?;
    }
}
