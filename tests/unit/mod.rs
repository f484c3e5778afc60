//! End-to-end integration tests driving the public API the way an
//! embedding binary would: a scripted transport and snapshot source feed
//! a [`BookEngine`], which publishes to a [`Viewer`].

use full_order_book::prelude::*;
use std::sync::Mutex;
use tokio::sync::mpsc as tmpsc;

struct ChannelTransport {
    rx: Option<tmpsc::UnboundedReceiver<TransportEvent>>,
}

impl FeedTransport for ChannelTransport {
    fn start(&mut self) -> tmpsc::UnboundedReceiver<TransportEvent> {
        self.rx.take().expect("start called once")
    }

    fn close(&mut self) {}
}

struct ScriptedSource {
    responses: Mutex<std::collections::VecDeque<Result<Snapshot, SnapshotError>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Snapshot, SnapshotError>>) -> Self {
        Self { responses: Mutex::new(responses.into()) }
    }
}

impl SnapshotSource for ScriptedSource {
    async fn fetch(&self, _product_id: &str) -> Result<Snapshot, SnapshotError> {
        let mut responses = self.responses.lock().unwrap();
        responses.pop_front().unwrap_or_else(|| Err(SnapshotError::new("test", "exhausted")))
    }
}

fn feed(kind: MessageKind, sequence: i64) -> FeedMessage {
    FeedMessage {
        kind,
        sequence: Some(sequence),
        side: None,
        order_id: None,
        maker_order_id: None,
        price: None,
        size: None,
        remaining_size: None,
        new_size: None,
    }
}

fn open(sequence: i64, side: Side, id: &str, price: &str, size: &str) -> FeedMessage {
    FeedMessage {
        side: Some(side),
        order_id: Some(id.to_string()),
        price: Some(price.to_string()),
        remaining_size: Some(size.to_string()),
        ..feed(MessageKind::Open, sequence)
    }
}

#[tokio::test]
async fn engine_publishes_top_of_book_after_each_applied_message() {
    let (tx, rx) = tmpsc::unbounded_channel();
    let transport = ChannelTransport { rx: Some(rx) };
    let source = ScriptedSource::new(vec![Ok(Snapshot {
        bids: vec![("100.00".to_string(), "1.0".to_string(), "seed-bid".to_string())],
        asks: vec![("101.00".to_string(), "1.0".to_string(), "seed-ask".to_string())],
        sequence: 1,
    })]);

    let (mut engine, publish_rx) = BookEngine::new("BTC-USD", transport, source, 3);

    tx.send(TransportEvent::Open).unwrap();
    tx.send(TransportEvent::Message(open(2, Side::Buy, "a", "99.50", "2.0"))).unwrap();
    drop(tx);

    let run_handle = tokio::spawn(async move {
        engine.run().await;
        engine
    });

    let mut rx = publish_rx;
    let snapshot = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
        .await
        .expect("publish did not arrive in time")
        .expect("channel closed without publishing");

    assert_eq!(snapshot.best_bid(), Some(Price::parse("100.00").unwrap()));
    assert_eq!(snapshot.best_ask(), Some(Price::parse("101.00").unwrap()));

    let engine = run_handle.await.unwrap();
    assert_eq!(engine.book().state(), BookState::Ready(2));
}

#[tokio::test]
async fn sequence_gap_forces_a_second_snapshot_fetch() {
    let (tx, rx) = tmpsc::unbounded_channel();
    let transport = ChannelTransport { rx: Some(rx) };
    let source = ScriptedSource::new(vec![
        Ok(Snapshot { bids: vec![], asks: vec![], sequence: 1 }),
        Ok(Snapshot { bids: vec![], asks: vec![], sequence: 10 }),
    ]);

    let (mut engine, _publish_rx) = BookEngine::new("ETH-USD", transport, source, 1);

    tx.send(TransportEvent::Message(open(2, Side::Buy, "a", "10.00", "1.0"))).unwrap();
    // Jumps to 7: a gap against 2.
    tx.send(TransportEvent::Message(open(7, Side::Buy, "b", "10.50", "1.0"))).unwrap();
    drop(tx);

    engine.run().await;

    assert_eq!(engine.book().state(), BookState::Ready(10));
}

#[tokio::test]
async fn viewer_receives_snapshots_through_the_manager() {
    let (tx, rx) = tmpsc::unbounded_channel();
    let transport = ChannelTransport { rx: Some(rx) };
    let source = ScriptedSource::new(vec![Ok(Snapshot {
        bids: vec![("5.00".to_string(), "1.0".to_string(), "seed".to_string())],
        asks: vec![],
        sequence: 1,
    })]);

    let (manager_tx, mut manager_rx) = tmpsc::unbounded_channel();
    let mut manager = BookManager::new();
    assert!(manager.spawn(
        "BTC-USD",
        transport,
        source,
        1,
        full_order_book::orderbook::manager::TaggedForwarder::new("BTC-USD", manager_tx),
    ));
    assert_eq!(manager.len(), 1);

    tx.send(TransportEvent::Message(open(2, Side::Buy, "a", "6.00", "1.0"))).unwrap();
    drop(tx);

    let (product_id, snapshot) = tokio::time::timeout(std::time::Duration::from_secs(1), manager_rx.recv())
        .await
        .expect("no snapshot arrived in time")
        .expect("manager channel closed");

    assert_eq!(product_id, "BTC-USD");
    assert_eq!(snapshot.best_bid(), Some(Price::parse("6.00").unwrap()));

    manager.stop("BTC-USD");
}

#[tokio::test]
async fn fresh_book_requires_exactly_one_snapshot_fetch_for_in_order_traffic() {
    let (tx, rx) = tmpsc::unbounded_channel();
    let transport = ChannelTransport { rx: Some(rx) };
    let source = ScriptedSource::new(vec![Ok(Snapshot { bids: vec![], asks: vec![], sequence: 100 })]);

    let (mut engine, _publish_rx) = BookEngine::new("BTC-USD", transport, source, 1);

    tx.send(TransportEvent::Message(open(101, Side::Buy, "a", "1.00", "1.0"))).unwrap();
    tx.send(TransportEvent::Message(open(102, Side::Sell, "b", "2.00", "1.0"))).unwrap();
    drop(tx);

    engine.run().await;
    assert_eq!(engine.book().state(), BookState::Ready(102));
}
