//! Order and side primitives.

use super::price::{Price, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, exchange-assigned order identifier. Unique within the book's
/// lifetime for any order that is currently live.
pub type OrderId = String;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// A bid — a resting buy order.
    Buy,
    /// An ask — a resting sell order.
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// A single resting order in the book.
///
/// Invariant: while present in the book, `size > 0`. An order never
/// migrates between prices or sides — a `change` in price or side would
/// instead arrive as a `done` of the old order plus an `open` of a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Exchange-assigned order identifier.
    pub id: OrderId,
    /// Buy or sell.
    pub side: Side,
    /// Limit price.
    pub price: Price,
    /// Remaining live size.
    pub size: Size,
}

impl Order {
    /// Constructs a new resting order.
    pub fn new(id: OrderId, side: Side, price: Price, size: Size) -> Self {
        Self { id, side, price, size }
    }
}
