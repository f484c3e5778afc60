//! A registry of [`BookEngine`]s, one per product, each driven on its own
//! spawned task.
//!
//! Generalizes the teacher crate's `BookManagerTokio`: that type fanned
//! `TradeEvent`s from a shared matching engine out to per-order-book
//! channels. There is no shared matching engine here — each product's
//! feed and snapshot source are already independent — so the manager's
//! job shrinks to bookkeeping: own the join handles, and let a caller
//! stop a product's engine without tearing down the others.

use super::transport::{FeedTransport, SnapshotSource};
use super::viewer::{BookSnapshot, Viewer};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// One running product's task handle plus the publish channel it feeds.
struct Handle {
    task: JoinHandle<()>,
}

/// Owns one [`super::engine::BookEngine`] task per product.
///
/// `BookManager` does not itself know how to build a transport or
/// snapshot source for a product — that's supplied by the caller at
/// `spawn` time, the same way the teacher's manager takes a pre-built
/// `TradeEvent` channel rather than constructing one internally.
#[derive(Default)]
pub struct BookManager {
    handles: HashMap<String, Handle>,
}

impl BookManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a [`super::engine::BookEngine`] for `product_id`, driving it
    /// to a fresh [`Viewer`] of type `V` on its own task. Returns `false`
    /// without spawning if `product_id` is already registered.
    pub fn spawn<T, S, V>(
        &mut self,
        product_id: impl Into<String>,
        transport: T,
        source: S,
        publish_depth: usize,
        viewer: V,
    ) -> bool
    where
        T: FeedTransport + 'static,
        S: SnapshotSource + 'static,
        V: Viewer + 'static,
    {
        let product_id = product_id.into();
        if self.handles.contains_key(&product_id) {
            return false;
        }

        let (mut engine, publish_rx) =
            super::engine::BookEngine::new(product_id.clone(), transport, source, publish_depth);

        let engine_product_id = product_id.clone();
        let task = tokio::spawn(async move {
            let viewer_task = tokio::spawn(super::engine::drive_viewer(
                publish_rx,
                viewer,
                super::engine::DEFAULT_VIEWER_POLL_PERIOD,
            ));
            engine.run().await;
            let _ = viewer_task.await;
            info!(product_id = %engine_product_id, "book engine task exited");
        });

        self.handles.insert(product_id, Handle { task });
        true
    }

    /// Aborts the task for `product_id`, if registered. Returns `true` if
    /// something was actually running.
    pub fn stop(&mut self, product_id: &str) -> bool {
        match self.handles.remove(product_id) {
            Some(handle) => {
                handle.task.abort();
                true
            }
            None => false,
        }
    }

    /// Product ids currently registered.
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    /// Number of products currently registered.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no products are registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// A [`Viewer`] that forwards every snapshot over an unbounded channel,
/// tagged with the product id it came from. Useful when a `BookManager`'s
/// several products should all feed one aggregating consumer.
pub struct TaggedForwarder {
    product_id: String,
    tx: mpsc::UnboundedSender<(String, BookSnapshot)>,
}

impl TaggedForwarder {
    /// Builds a forwarder for `product_id` that sends onto `tx`.
    pub fn new(product_id: impl Into<String>, tx: mpsc::UnboundedSender<(String, BookSnapshot)>) -> Self {
        Self { product_id: product_id.into(), tx }
    }
}

impl Viewer for TaggedForwarder {
    fn on_snapshot(&mut self, snapshot: BookSnapshot) {
        let _ = self.tx.send((self.product_id.clone(), snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let manager = BookManager::new();
        assert!(manager.is_empty());
        assert_eq!(manager.products().count(), 0);
    }

    #[test]
    fn stop_on_unknown_product_returns_false() {
        let mut manager = BookManager::new();
        assert!(!manager.stop("BTC-USD"));
    }
}
