//! A live, reconciled replica of an exchange limit order book.
//!
//! The core type is [`orderbook::FullOrderBook`]: it merges an
//! asynchronous full-channel delta feed with a point-in-time REST
//! snapshot, detecting and recovering from sequence gaps, and exposes a
//! top-of-book view suitable for publishing to a downstream viewer. See
//! [`orderbook::engine::BookEngine`] for the piece that wires a book to
//! its transport and snapshot source, and [`orderbook::manager::BookManager`]
//! for running several products at once.
//!
//! ```no_run
//! use full_order_book::prelude::*;
//!
//! # async fn example<T: FeedTransport, S: SnapshotSource>(transport: T, source: S) {
//! let (mut engine, publish_rx) = BookEngine::new("BTC-USD", transport, source, 10);
//! let viewer = LatestSnapshotViewer::new();
//! let poll_period = full_order_book::orderbook::engine::DEFAULT_VIEWER_POLL_PERIOD;
//! tokio::join!(
//!     engine.run(),
//!     full_order_book::orderbook::engine::drive_viewer(publish_rx, viewer, poll_period)
//! );
//! # }
//! ```

pub mod orderbook;
pub mod prelude;

/// Installs a global `tracing` subscriber filtered by `filter_directive`
/// (an `EnvFilter` string, e.g. `"info"` or `"full_order_book=debug"`),
/// optionally formatting output as JSON.
///
/// Intended to be called once near the start of `main` by a binary
/// embedding this crate; see [`orderbook::cli::BookCliArgs::init_logging`]
/// for the CLI-driven equivalent. Safe to call more than once in tests —
/// a failure to install (because a subscriber is already set) is ignored.
pub fn init_logging(filter_directive: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_new(filter_directive).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);

    let result = if json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    if result.is_err() {
        tracing::trace!("tracing subscriber already installed, skipping");
    }
}
