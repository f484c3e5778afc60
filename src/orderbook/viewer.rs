//! Top-of-book publication: the shape handed to a downstream consumer,
//! and the trait that consumer implements.

use super::price::Price;
use serde::{Deserialize, Serialize};

/// A point-in-time view of the top of a [`super::book::FullOrderBook`],
/// as published by a [`super::engine::BookEngine`].
///
/// `top_bids`/`top_asks` are always the same fixed length the engine was
/// configured with (`spec.md` §6): a shallow side is padded rather than
/// shortened, so a viewer can always index `top_bids[i]` without a bounds
/// check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// Best-to-worst bid prices, padded with [`Price::ZERO`] if the side
    /// is shallower than the configured depth.
    pub top_bids: Vec<Price>,
    /// Best-to-worst ask prices, padded with [`Price::INFINITY`] if the
    /// side is shallower than the configured depth.
    pub top_asks: Vec<Price>,
    /// `best_ask - best_bid`. Meaningless (and not clamped) if either side
    /// was padded — a consumer should treat a padded side as "unknown",
    /// not as a real price.
    pub spread: Price,
}

impl BookSnapshot {
    /// The best bid, if the bid side wasn't empty (i.e. wasn't padded).
    pub fn best_bid(&self) -> Option<Price> {
        self.top_bids.first().copied().filter(|p| *p != Price::ZERO)
    }

    /// The best ask, if the ask side wasn't empty (i.e. wasn't padded).
    pub fn best_ask(&self) -> Option<Price> {
        self.top_asks.first().copied().filter(|p| *p != Price::INFINITY)
    }
}

/// A consumer of published top-of-book snapshots.
///
/// Kept deliberately small — a viewer only ever sees the latest snapshot,
/// never the underlying book or its message stream (`spec.md` §6: "the
/// viewer is a dumb renderer").
pub trait Viewer: Send {
    /// Called with each snapshot the engine publishes.
    fn on_snapshot(&mut self, snapshot: BookSnapshot);
}

/// A [`Viewer`] that just remembers the most recent snapshot. Useful for
/// tests and for simple polling integrations that don't need push
/// notification.
#[derive(Debug, Default)]
pub struct LatestSnapshotViewer {
    latest: Option<BookSnapshot>,
}

impl LatestSnapshotViewer {
    /// Creates a viewer with no snapshot yet received.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent snapshot received, if any.
    pub fn latest(&self) -> Option<&BookSnapshot> {
        self.latest.as_ref()
    }
}

impl Viewer for LatestSnapshotViewer {
    fn on_snapshot(&mut self, snapshot: BookSnapshot) {
        self.latest = Some(snapshot);
    }
}
