//! Error taxonomy for the engine boundary (`spec.md` §7).
//!
//! Most per-message failure modes (`MissingField`, `UnknownMessageType`,
//! `StaleMessage`, `OrderNotFound`) are *not* represented here: the spec's
//! policy for each of those is to silently discard and log, never to
//! surface a `Result::Err` up through [`super::book::FullOrderBook::on_message`].
//! Only the two failure modes that a caller must be able to react to —
//! a bad snapshot fetch, and transport loss — get a real error type.

pub use super::price::ParseError;

/// The REST snapshot fetch failed. Per `spec.md` §7, this is retried with
/// backoff inside [`super::book::FullOrderBook::load_snapshot`]; it is
/// exposed here so a [`super::transport::SnapshotSource`] implementation
/// has something concrete to return.
#[derive(Debug, Clone, thiserror::Error)]
#[error("snapshot fetch failed for product {product_id:?}: {message}")]
pub struct SnapshotError {
    /// The product the fetch was for.
    pub product_id: String,
    /// Human-readable failure reason from the transport.
    pub message: String,
}

impl SnapshotError {
    /// Constructs a new snapshot error.
    pub fn new(product_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self { product_id: product_id.into(), message: message.into() }
    }
}

/// The underlying feed transport lost its connection. Per `spec.md` §7,
/// nothing about this is fatal to the engine except the transport's own
/// inability to reconnect — that inability is what this error represents;
/// a transient disconnect-then-reconnect is communicated via
/// `on_open`/`on_close` lifecycle events, not this error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transport unable to reconnect: {0}")]
pub struct TransportError(pub String);
