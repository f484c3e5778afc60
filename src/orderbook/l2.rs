//! The aggregated level-2 book: a cheaper alternative to
//! [`super::book::FullOrderBook`] that tracks per-price aggregate size
//! only, with no per-order detail and no sequence-gap reconciliation.
//!
//! Grounded on the original client's `L2OrderBook` (`apply_snapshot` /
//! `apply_update`): a snapshot installs the initial price -> size map, and
//! every subsequent update either overwrites a price's size or, if the
//! update carries size zero, removes the price entirely.

use super::price::{Price, Size};
use std::collections::BTreeMap;

/// One row of an L2 snapshot or update: a price and its aggregate size.
/// A `size` of [`Price::ZERO`] in an update means "remove this price".
pub type L2Row = (Price, Size);

/// An aggregated, per-price view of one side of the book. Unlike
/// [`super::side_book::SideBook`] it carries no per-order identity or
/// arrival order — only the total size resting at each price.
#[derive(Debug, Clone, Default)]
pub struct L2AggregatedBook {
    bids: BTreeMap<Price, Size>,
    asks: BTreeMap<Price, Size>,
}

impl L2AggregatedBook {
    /// An empty book, with no snapshot installed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both sides wholesale with a snapshot's rows. Any row with
    /// a zero size is dropped rather than stored.
    pub fn apply_snapshot(&mut self, bids: Vec<L2Row>, asks: Vec<L2Row>) {
        self.bids = bids.into_iter().filter(|(_, size)| !size.is_zero()).collect();
        self.asks = asks.into_iter().filter(|(_, size)| !size.is_zero()).collect();
    }

    /// Applies a single price-level update: `size` zero removes `price`
    /// from the side entirely, otherwise it overwrites whatever was there.
    pub fn apply_update(&mut self, side: super::order::Side, price: Price, size: Size) {
        let book_side = match side {
            super::order::Side::Buy => &mut self.bids,
            super::order::Side::Sell => &mut self.asks,
        };
        if size.is_zero() {
            book_side.remove(&price);
        } else {
            book_side.insert(price, size);
        }
    }

    /// The highest bid price currently aggregated, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    /// The lowest ask price currently aggregated, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Number of distinct bid price levels.
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }
}
