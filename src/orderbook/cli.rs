//! Process-level configuration surface.
//!
//! This is reference scaffolding, not the core of the crate: the actual
//! transport and snapshot source (the two collaborators
//! [`super::engine::BookEngine`] needs) are out of scope here, same as in
//! `spec.md` §1 — a real binary supplies its own and calls
//! [`super::engine::BookEngine::run`] directly. What belongs here is the
//! configuration a deployment needs regardless of which transport it
//! plugs in: which products to track, how deep to publish, and how to
//! configure logging.

use clap::Parser;

/// Command-line / environment configuration for a process hosting one or
/// more [`super::engine::BookEngine`]s.
#[derive(Debug, Clone, Parser)]
#[command(name = "full-order-book", about = "Reconciled limit order book engine")]
pub struct BookCliArgs {
    /// Product ids to track (e.g. `BTC-USD`). May be given more than once.
    #[arg(long = "product", required = true)]
    pub products: Vec<String>,

    /// Number of price levels to publish per snapshot.
    #[arg(long, default_value_t = 10)]
    pub publish_depth: usize,

    /// Cap on the number of feed messages buffered while a snapshot load
    /// is in flight, before the book forces a fresh reload.
    #[arg(long, default_value_t = super::book::DEFAULT_PENDING_CAPACITY)]
    pub pending_capacity: usize,

    /// `tracing-subscriber` `EnvFilter` directive, e.g. `info` or
    /// `full_order_book=debug`.
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Emit logs as JSON instead of the default human-readable format.
    #[arg(long)]
    pub json_logs: bool,
}

impl BookCliArgs {
    /// Parses arguments from the process's `argv`.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Installs the global `tracing` subscriber described by these args.
    /// Call once, near the start of `main`.
    pub fn init_logging(&self) {
        crate::init_logging(&self.log_filter, self.json_logs);
    }
}
