//! A single price level: the ordered list of live orders resting at one
//! price, on one side.

use super::order::{Order, OrderId, Side};
use super::price::{Price, Size};

/// All orders resting at a single `(side, price)` pair, in arrival order
/// (first added = front, at index 0).
///
/// Invariant: every order in a level shares the level's `price` and
/// `side`, and no two orders share an `order_id`. No concurrency
/// guarantees are made — a `PriceLevel` has a single owner (its
/// [`super::side_book::SideBook`]).
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    side: Side,
    orders: Vec<Order>,
}

impl PriceLevel {
    /// Creates an empty level at `price` on `side`.
    pub fn new(price: Price, side: Side) -> Self {
        Self { price, side, orders: Vec::new() }
    }

    /// The level's price.
    pub fn price(&self) -> Price {
        self.price
    }

    /// The level's side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Appends `order` to the tail (newest arrival).
    pub fn append(&mut self, order: Order) {
        debug_assert_eq!(order.price, self.price, "order price must match level price");
        debug_assert_eq!(order.side, self.side, "order side must match level side");
        self.orders.push(order);
    }

    /// Removes the order with `id`, if present. `O(k)` in level depth. If
    /// (unexpectedly) two orders share an id, removes the first match only.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        if let Some(pos) = self.orders.iter().position(|o| o.id == id) {
            self.orders.remove(pos);
            true
        } else {
            false
        }
    }

    /// Returns a mutable reference to the order with `id`, for in-place
    /// size mutation (`match` decrements, `change` overwrites).
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// True if the level holds no orders. A level in this state must never
    /// remain stored in a `SideBook` — see
    /// [`super::side_book::SideBook::remove_order`].
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of live orders at this level.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Iterates orders in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Sum of `size` over every order at this level.
    pub fn total_size(&self) -> Size {
        self.orders.iter().fold(Size::ZERO, |acc, o| acc.add(o.size))
    }
}
