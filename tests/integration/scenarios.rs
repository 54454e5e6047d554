//! End-to-end read and write paths over in-memory collaborators.

use std::sync::{Arc, Mutex};

use crate::*;
use inscribe_core::frame::{self, APP_VERSION};
use inscribe_core::names::encode_names_frame;
use inscribe_services::{
    Ack, Aggregator, Broadcaster, NameSet, PublishOutcome, PublishRequest, TransactionBuilder,
    TransactionHandle, Writer,
};

fn alice() -> Vec<u8> {
    let mut frame = vec![0x00];
    frame.extend_from_slice(br#"["alice"]"#);
    frame
}

#[tokio::test]
async fn test_single_name_is_collected() {
    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    let mut rx = agg.subscribe();

    agg.run(source_of(vec![alice()])).await.unwrap();

    let notifications = drain(&mut rx);
    assert_eq!(new_names(&notifications), vec!["alice"]);
    assert_eq!(error_count(&notifications), 0);
    assert_eq!(agg.names().snapshot(), vec!["alice"]);
}

#[tokio::test]
async fn test_repeat_delivery_notifies_once() {
    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    let mut rx = agg.subscribe();

    agg.run(source_of(vec![alice(), alice()])).await.unwrap();

    assert_eq!(new_names(&drain(&mut rx)), vec!["alice"]);
    assert_eq!(agg.names().len(), 1);
}

#[tokio::test]
async fn test_wrong_version_is_invisible() {
    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    let mut rx = agg.subscribe();

    let mut bob = vec![0x01];
    bob.extend_from_slice(br#"["bob"]"#);
    agg.run(source_of(vec![bob])).await.unwrap();

    assert!(drain(&mut rx).is_empty());
    assert!(agg.names().is_empty());
}

#[tokio::test]
async fn test_garbage_payload_reports_one_error() {
    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    let mut rx = agg.subscribe();

    agg.run(source_of(vec![frame::encode(0x00, b"not json")]))
        .await
        .unwrap();

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(error_count(&notifications), 1);
    assert!(agg.names().is_empty());
}

#[tokio::test]
async fn test_set_size_counts_distinct_names() {
    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    let mut rx = agg.subscribe();

    let frames = vec![
        encode_names_frame(APP_VERSION, &["a", "b"]),
        Vec::new(),
        encode_names_frame(0x09, &["c"]),
        encode_names_frame(APP_VERSION, &["b", "c"]),
        encode_names_frame(APP_VERSION, &["a"]),
        encode_names_frame(APP_VERSION, &["d", "d"]),
    ];
    agg.run(source_of(frames)).await.unwrap();

    assert_eq!(new_names(&drain(&mut rx)), vec!["a", "b", "c", "d"]);
    assert_eq!(agg.names().len(), 4);

    let stats = agg.stats().snapshot();
    assert_eq!(stats.records, 6);
    assert_eq!(stats.no_frame, 1);
    assert_eq!(stats.foreign_version, 1);
    assert_eq!(stats.new_names, 4);
    assert_eq!(stats.duplicates, 3);
}

#[tokio::test]
async fn test_notifications_follow_record_order() {
    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    let mut rx = agg.subscribe();

    let frames = vec![
        encode_names_frame(APP_VERSION, &["first"]),
        frame::encode(APP_VERSION, b"{broken"),
        encode_names_frame(APP_VERSION, &["second"]),
    ];
    agg.run(source_of(frames)).await.unwrap();

    let notifications = drain(&mut rx);
    assert!(matches!(&notifications[0], Notification::NewName(n) if n == "first"));
    assert!(matches!(&notifications[1], Notification::DecodeFailed(_)));
    assert!(matches!(&notifications[2], Notification::NewName(n) if n == "second"));
}

// ── Write path ────────────────────────────────────────────────────────────────

/// Serializes the frame straight into the "transaction" so tests can find it.
struct EchoBuilder;

impl TransactionBuilder for EchoBuilder {
    async fn build(&self, _amount: u64, frame: &[u8]) -> anyhow::Result<TransactionHandle> {
        Ok(TransactionHandle {
            txid: MOCK_TXID.to_string(),
            hex: format!("02000000016a{:02x}{}", frame.len(), hex::encode(frame)),
        })
    }
}

#[derive(Clone, Default)]
struct RecordingBroadcaster {
    sent: Arc<Mutex<Vec<String>>>,
}

impl Broadcaster for RecordingBroadcaster {
    async fn broadcast(&self, tx_hex: &str) -> anyhow::Result<Ack> {
        self.sent.lock().unwrap().push(tx_hex.to_string());
        Ok(Ack {
            txid: MOCK_TXID.to_string(),
        })
    }
}

#[tokio::test]
async fn test_dry_run_embeds_frame_without_broadcast() {
    let broadcaster = RecordingBroadcaster::default();
    let writer = Writer::new(EchoBuilder, broadcaster.clone());

    let outcome = writer
        .publish(&PublishRequest {
            names: vec!["x".into(), "y".into()],
            version: APP_VERSION,
            amount: 10_000,
            dry_run: true,
        })
        .await
        .unwrap();

    let PublishOutcome::DryRun { tx } = outcome else {
        panic!("dry run must not broadcast");
    };
    let mut expected = vec![0x00];
    expected.extend_from_slice(br#"["x","y"]"#);
    assert!(tx.hex.contains(&hex::encode(&expected)));
    assert!(broadcaster.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_written_frame_is_read_back() {
    let broadcaster = RecordingBroadcaster::default();
    let writer = Writer::new(EchoBuilder, broadcaster.clone());
    let outcome = writer
        .publish(&PublishRequest {
            names: vec!["alice".into(), "bob".into()],
            version: APP_VERSION,
            amount: 10_000,
            dry_run: false,
        })
        .await
        .unwrap();
    assert!(matches!(outcome, PublishOutcome::Broadcast { .. }));
    assert_eq!(*broadcaster.sent.lock().unwrap(), vec![outcome.tx().hex.clone()]);

    // Peel the echo envelope back off: 12 hex chars of prefix + 2 of length.
    let hex_frame = &outcome.tx().hex[14..];
    let frame = hex::decode(hex_frame).unwrap();

    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    let mut rx = agg.subscribe();
    agg.run(source_of(vec![frame])).await.unwrap();
    assert_eq!(new_names(&drain(&mut rx)), vec!["alice", "bob"]);
}
