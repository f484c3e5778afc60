//! Abstract collaborators consumed by the core: the push-based feed
//! transport and the pull-based REST snapshot source.
//!
//! Per `spec.md` §1, the WebSocket transport and REST client themselves
//! are out of scope — only these interfaces, which the core consumes,
//! are specified here. A real implementation (connection management,
//! auth, retry/backoff of the socket itself) lives outside this crate.

use super::error::SnapshotError;
use super::message::{FeedMessage, Snapshot};
use tokio::sync::mpsc;

/// A connection-lifecycle or data event delivered by a [`FeedTransport`].
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The underlying connection was (re)established.
    Open,
    /// The underlying connection closed.
    Close,
    /// A feed message arrived.
    Message(FeedMessage),
}

/// A push-based source of feed messages and connection-lifecycle events.
///
/// Per `spec.md` §5, the book is pinned to a single consumer thread; the
/// idiomatic way to satisfy that here is for `start` to hand back an
/// unbounded channel that a transport implementation feeds from its own
/// I/O task, while [`super::engine::BookEngine::run`] drains it on the
/// book's dedicated task.
pub trait FeedTransport: Send {
    /// Begins (or resumes) delivering events, returning the receiving end
    /// of the channel events will arrive on.
    fn start(&mut self) -> mpsc::UnboundedReceiver<TransportEvent>;

    /// Signals the transport to close. Any in-flight work should be
    /// cancelled or its completion discarded once this returns.
    fn close(&mut self);
}

/// A pull-based source of full order book snapshots, fetched on initial
/// start and on every sequence-gap-triggered reload.
pub trait SnapshotSource: Send + Sync {
    /// Fetches the current full book for `product_id`.
    fn fetch(&self, product_id: &str) -> impl std::future::Future<Output = Result<Snapshot, SnapshotError>> + Send;
}
