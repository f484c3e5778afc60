//! Wires a [`FullOrderBook`] to a [`FeedTransport`] and a [`SnapshotSource`],
//! publishing top-of-book to a [`Viewer`] over a bounded handoff channel.

use super::book::FullOrderBook;
use super::transport::{FeedTransport, SnapshotSource, TransportEvent};
use super::viewer::{BookSnapshot, Viewer};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

/// Default period [`drive_viewer`] polls the publish channel at, absent
/// an explicit override.
pub const DEFAULT_VIEWER_POLL_PERIOD: Duration = Duration::from_millis(50);

/// Depth of the handoff channel between [`BookEngine::run`] and the task
/// driving a [`Viewer`].
///
/// A single slot, per `spec.md` §9: the viewer only ever cares about the
/// most recent book state, but a *consumed* slot must never be
/// overwritten before the viewer sees it — see [`BookEngine::publish`].
const PUBLISH_CHANNEL_CAPACITY: usize = 1;

/// Ties a [`FullOrderBook`] to its collaborators and drives it to
/// completion.
///
/// Owns the book, the transport, and the snapshot source for exactly one
/// product; per `spec.md` §5 a single `BookEngine` is meant to be pinned
/// to one task/thread.
pub struct BookEngine<T, S> {
    product_id: String,
    book: FullOrderBook,
    transport: T,
    source: S,
    publish_depth: usize,
    publish_tx: mpsc::Sender<BookSnapshot>,
}

impl<T, S> BookEngine<T, S>
where
    T: FeedTransport,
    S: SnapshotSource,
{
    /// Builds a new engine for `product_id`. Returns the engine along with
    /// the receiving end of its publish channel, which the caller wires up
    /// to a [`Viewer`] (see [`drive_viewer`]).
    pub fn new(
        product_id: impl Into<String>,
        transport: T,
        source: S,
        publish_depth: usize,
    ) -> (Self, mpsc::Receiver<BookSnapshot>) {
        let (publish_tx, publish_rx) = mpsc::channel(PUBLISH_CHANNEL_CAPACITY);
        let engine = Self {
            product_id: product_id.into(),
            book: FullOrderBook::new(),
            transport,
            source,
            publish_depth,
            publish_tx,
        };
        (engine, publish_rx)
    }

    /// Read-only access to the underlying book, mainly for diagnostics.
    pub fn book(&self) -> &FullOrderBook {
        &self.book
    }

    /// Starts the transport and drains its events until the transport
    /// channel closes (the transport was dropped or explicitly closed).
    ///
    /// Every applied message republishes a fresh snapshot; a publish that
    /// can't be delivered because the previous one is still unconsumed is
    /// dropped rather than queued, per `spec.md` §9 ("publish the oldest
    /// unseen snapshot, not the latest" — `try_send` never evicts whatever
    /// is already sitting in the single slot).
    pub async fn run(&mut self) {
        let mut events = self.transport.start();
        let mut reconnecting = false;
        while let Some(event) = events.recv().await {
            match event {
                TransportEvent::Open => {
                    info!(product_id = %self.product_id, "transport connected");
                    if reconnecting {
                        // A reconnect gives no guarantee no messages were
                        // missed while disconnected (spec.md §7): force a
                        // fresh snapshot load rather than trusting the old
                        // sequence number.
                        warn!(product_id = %self.product_id, "forcing reload after reconnect");
                        self.book.force_reload();
                        reconnecting = false;
                    }
                }
                TransportEvent::Close => {
                    warn!(product_id = %self.product_id, "transport disconnected");
                    reconnecting = true;
                }
                TransportEvent::Message(msg) => {
                    self.book.on_message(msg, &self.source, &self.product_id).await;
                    self.publish();
                }
            }
        }
        trace!(product_id = %self.product_id, "transport event stream closed, run() returning");
    }

    fn publish(&self) {
        if !self.book.state().is_ready() {
            return;
        }
        let snapshot = self.book.snapshot(self.publish_depth);
        match self.publish_tx.try_send(snapshot) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!(product_id = %self.product_id, "viewer hasn't consumed the last snapshot, dropping this one");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!(product_id = %self.product_id, "viewer channel closed");
            }
        }
    }

    /// Signals the transport to close. Does not itself stop [`run`]; that
    /// happens once the transport's event stream subsequently closes.
    pub fn stop(&mut self) {
        self.transport.close();
    }
}

/// Drains `rx` on a periodic, non-blocking poll and forwards every
/// snapshot to `viewer`, until the channel closes.
///
/// Per `spec.md` §5 ("the viewer uses non-blocking receive in a periodic
/// poll"), this deliberately does not `.await` on the channel directly —
/// it ticks on `poll_period` and calls `try_recv`, so a viewer with other
/// work to interleave (rendering, its own event loop) could fold this
/// same poll into its own tick instead of dedicating a task to it.
pub async fn drive_viewer<V: Viewer>(
    mut rx: mpsc::Receiver<BookSnapshot>,
    mut viewer: V,
    poll_period: Duration,
) {
    let mut ticker = tokio::time::interval(poll_period);
    loop {
        ticker.tick().await;
        match rx.try_recv() {
            Ok(snapshot) => viewer.on_snapshot(snapshot),
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => break,
        }
    }
}
