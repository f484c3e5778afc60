//! Convenience re-exports of the crate's most commonly used types.

pub use crate::orderbook::{
    BookEngine, BookManager, BookSnapshot, BookState, FeedMessage, FeedTransport, FullOrderBook,
    L2AggregatedBook, MessageKind, Order, OrderId, Price, PriceLevel, Side, SideBook, Size,
    Snapshot, SnapshotError, SnapshotSource, TransportError, TransportEvent, Viewer,
};
pub use crate::orderbook::viewer::LatestSnapshotViewer;
pub use crate::init_logging;
