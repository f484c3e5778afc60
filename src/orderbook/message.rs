//! Wire-level feed message and REST snapshot payload shapes.
//!
//! Prices and sizes are transmitted as decimal strings on both the feed
//! and the snapshot response; they are parsed lazily by the dispatch
//! handlers in [`super::book`] rather than eagerly here, so that a
//! malformed field in one part of a message can be reported without
//! rejecting fields that parsed fine.

use super::order::{OrderId, Side};
use serde::{Deserialize, Serialize};

/// The type tag of a feed message. Unrecognized tags deserialize to
/// `Unknown` rather than failing — the spec treats a new exchange message
/// type as benign (`UnknownMessageType`, see `spec.md` §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A new order was placed (or became resting) on the book.
    Open,
    /// An order left the book, via cancel or fill.
    Done,
    /// A resting order was (partially or fully) matched.
    Match,
    /// A resting order's size was changed in place.
    Change,
    /// Acknowledgement that an order was received (no book effect).
    Received,
    /// A reserve/iceberg order's hidden size became visible (no book
    /// effect tracked by this engine).
    Activate,
    /// Any message type this engine doesn't recognize.
    #[serde(other)]
    Unknown,
}

/// A single message from the exchange's full-channel feed.
///
/// Fields the message type doesn't use are simply absent; deserializing a
/// message with the wrong fields for its type does not by itself fail —
/// the dispatch handlers treat a required-but-absent field as
/// `MissingField` and discard the message without advancing `sequence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedMessage {
    /// The message type.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Exchange-assigned sequence number. Absent (`None`) is never a valid
    /// ordering value and is treated as `-1`, i.e. always stale.
    #[serde(default)]
    pub sequence: Option<i64>,
    /// Side the message concerns.
    #[serde(default)]
    pub side: Option<Side>,
    /// The order this message concerns.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    /// On `match`, the id of the resting order being hit.
    #[serde(default)]
    pub maker_order_id: Option<OrderId>,
    /// Decimal string price, where applicable.
    #[serde(default)]
    pub price: Option<String>,
    /// Decimal string size, where applicable (e.g. `match` fill size).
    #[serde(default)]
    pub size: Option<String>,
    /// Decimal string remaining size, used by `open`.
    #[serde(default)]
    pub remaining_size: Option<String>,
    /// Decimal string new size, used by `change`.
    #[serde(default)]
    pub new_size: Option<String>,
}

impl FeedMessage {
    /// The effective sequence number for ordering decisions: a missing
    /// field is never valid and is treated as `-1`.
    pub fn effective_sequence(&self) -> i64 {
        self.sequence.unwrap_or(-1)
    }
}

/// One row of a REST order book snapshot, as returned per-side by a
/// [`super::transport::SnapshotSource`]: decimal price, decimal size, and
/// the resting order's id.
pub type SnapshotRow = (String, String, OrderId);

/// The full response of a `SnapshotSource::fetch` call: a point-in-time
/// book state plus the sequence of the last update it incorporates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Resting bids, in no particular order (the engine re-sorts them).
    pub bids: Vec<SnapshotRow>,
    /// Resting asks, in no particular order.
    pub asks: Vec<SnapshotRow>,
    /// The sequence number of the last feed message incorporated into this
    /// snapshot.
    pub sequence: i64,
}
