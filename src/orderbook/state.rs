//! The `FullOrderBook` reconciliation state machine.
//!
//! The original client modeled this with integer sentinels (`-2` for
//! "needs a snapshot", `-1` for "snapshot in flight"). Per `spec.md` §9,
//! this crate models it as a tagged enum instead, so the compiler — not a
//! magic-number convention — enforces exhaustive handling at every call
//! site.

/// Reconciliation state of a [`super::book::FullOrderBook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    /// Initial state: no snapshot has been loaded yet, and none is in
    /// flight. The next feed message received will trigger a load.
    NeedsLoad,
    /// A snapshot request is in flight. All incoming feed messages are
    /// buffered rather than applied.
    Loading,
    /// Normal operation. The payload is the sequence number of the last
    /// feed message successfully applied (or the installed snapshot's
    /// sequence, if none have been applied since).
    Ready(i64),
}

impl BookState {
    /// The last applied sequence number, if the book is `Ready`.
    pub fn sequence(&self) -> Option<i64> {
        match self {
            BookState::Ready(seq) => Some(*seq),
            _ => None,
        }
    }

    /// True if the book can currently apply feed messages directly.
    pub fn is_ready(&self) -> bool {
        matches!(self, BookState::Ready(_))
    }
}
