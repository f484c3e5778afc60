//! One side of the book: an ordered map of price → price level, with
//! top-N views.
//!
//! Backed by a plain `BTreeMap` — the spec requires no concurrency
//! guarantees at this layer (single-owner, pinned to the book's feed
//! handler thread; see `spec.md` §4.2/§5), so there is no need for the
//! lock-free skip list the teacher crate uses for its multi-threaded
//! matching engine.

use super::level::PriceLevel;
use super::order::{Order, OrderId, Side};
use super::price::{Price, Size};
use std::collections::BTreeMap;

/// A mapping `Price -> PriceLevel`, ordered by price key, for one side of
/// one book.
///
/// "Best" depends on `side`: for Bids the best is the maximum key, for
/// Asks the minimum. No empty `PriceLevel` is ever stored — a level is
/// removed the moment its last order is removed.
#[derive(Debug, Clone)]
pub struct SideBook {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
}

impl SideBook {
    /// Creates an empty side book. `side` fixes the ordering used by
    /// [`SideBook::best`] and [`SideBook::top_n`].
    pub fn new(side: Side) -> Self {
        Self { side, levels: BTreeMap::new() }
    }

    /// Discards all levels, returning the side to empty. Used when
    /// installing a fresh snapshot.
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Number of distinct price levels on this side.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True if this side has no resting orders at all.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Looks up the level at `price`, if any orders rest there.
    pub fn get_level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Mutable lookup of the level at `price`.
    pub fn get_level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Inserts `order`, creating its price level if this is the first
    /// order at that price.
    pub fn insert_order(&mut self, order: Order) {
        self.levels
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price, self.side))
            .append(order);
    }

    /// Removes the order `id` from the level at `price`. Returns `false`
    /// (a silent no-op, per the spec's robust-consumer rule) if either the
    /// price level or the order is not found. Deletes the price key
    /// entirely if the level becomes empty.
    pub fn remove_order(&mut self, price: Price, id: &str) -> bool {
        let Some(level) = self.levels.get_mut(&price) else {
            return false;
        };
        let removed = level.remove_by_id(id);
        if removed && level.is_empty() {
            self.levels.remove(&price);
        }
        removed
    }

    /// The best (most aggressive) price on this side, if any orders rest
    /// on it: the maximum key for Bids, the minimum key for Asks.
    pub fn best(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// The top `n` `(price, aggregated_size)` pairs, in best-to-worst
    /// order for this side.
    ///
    /// If fewer than `n` levels exist, the result is padded: with
    /// [`Price::ZERO`] for Bids, with [`Price::INFINITY`] for Asks — so
    /// that downstream spread computations never see a misleadingly low
    /// or negative value when a side is shallow.
    pub fn top_n(&self, n: usize) -> Vec<(Price, Size)> {
        let mut out: Vec<(Price, Size)> = match self.side {
            Side::Buy => self
                .levels
                .iter()
                .rev()
                .take(n)
                .map(|(p, l)| (*p, l.total_size()))
                .collect(),
            Side::Sell => self
                .levels
                .iter()
                .take(n)
                .map(|(p, l)| (*p, l.total_size()))
                .collect(),
        };
        let pad_price = match self.side {
            Side::Buy => Price::ZERO,
            Side::Sell => Price::INFINITY,
        };
        while out.len() < n {
            out.push((pad_price, Size::ZERO));
        }
        out
    }

    /// Locates the price level (if any) containing order `id`. Used by
    /// callers that only have an order id and not its price; `O(levels)`.
    pub fn find_order_price(&self, id: &OrderId) -> Option<Price> {
        self.levels
            .iter()
            .find(|(_, level)| level.iter().any(|o| o.id == *id))
            .map(|(price, _)| *price)
    }
}
