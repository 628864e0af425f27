mod common;

use common::RecordingTransport;
use rask_rollbar::rollbar::credentials;
use rask_rollbar::rollbar::{
    ClientConfig, ClientMetadata, DeliveryMode, Reporter, RollbarClient, RollbarLevel,
};
use serial_test::serial;
use std::time::{Duration, Instant};

fn metadata(token: &str) -> ClientMetadata {
    ClientMetadata::new(token, "staging", "9f1c2e", "worker-3", "/srv/billing")
}

fn client(mode: DeliveryMode, transport: RecordingTransport) -> RollbarClient {
    RollbarClient::with_transport(mode, metadata("server-token"), ClientConfig::default(), transport)
        .unwrap()
}

#[test]
fn test_sync_message_is_delivered_before_returning() {
    let transport = RecordingTransport::with_delay(Duration::from_millis(50));
    let client = client(DeliveryMode::Sync, transport.clone());

    let started = Instant::now();
    client.message(RollbarLevel::Error, "ledger mismatch");

    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(transport.bodies(), vec!["ledger mismatch".to_string()]);
}

#[test]
fn test_async_message_returns_before_delivery() {
    let transport = RecordingTransport::closed();
    let client = client(DeliveryMode::Async, transport.clone());

    client.message(RollbarLevel::Warning, "slow upstream");
    assert_eq!(transport.len(), 0);
    assert_eq!(client.pending_count(), 1);

    transport.open();
    client.wait();
    assert_eq!(transport.bodies(), vec!["slow upstream".to_string()]);
    assert_eq!(client.pending_count(), 0);
}

#[test]
fn test_wait_drains_every_queued_message() {
    let transport = RecordingTransport::with_delay(Duration::from_millis(2));
    let client = client(DeliveryMode::Async, transport.clone());

    for i in 0..20 {
        client.message(RollbarLevel::Error, &format!("failure {i}"));
    }
    client.wait();

    let bodies = transport.bodies();
    assert_eq!(bodies.len(), 20);
    assert_eq!(bodies[0], "failure 0");
    assert_eq!(bodies[19], "failure 19");
}

#[test]
fn test_wait_with_nothing_pending_returns() {
    let client = client(DeliveryMode::Async, RecordingTransport::new());
    client.wait();
    assert_eq!(client.pending_count(), 0);
}

#[test]
fn test_full_async_queue_drops_messages() {
    let transport = RecordingTransport::closed();
    let config = ClientConfig {
        queue_capacity: 2,
        ..Default::default()
    };
    let client = RollbarClient::with_transport(
        DeliveryMode::Async,
        metadata("server-token"),
        config,
        transport.clone(),
    )
    .unwrap();

    for i in 0..10 {
        client.message(RollbarLevel::Critical, &format!("burst {i}"));
    }
    transport.open();
    client.wait();

    // The worker may already hold one item on top of the queued ones.
    let delivered = transport.len();
    assert!((2..=3).contains(&delivered), "delivered {}", delivered);
}

#[test]
fn test_item_carries_level_and_metadata() {
    let transport = RecordingTransport::new();
    let client = client(DeliveryMode::Sync, transport.clone());

    client.message(RollbarLevel::Critical, "out of memory");

    let items = transport.items.lock();
    let item = &items[0];
    assert_eq!(item.access_token, "server-token");
    assert_eq!(item.data.level, RollbarLevel::Critical);
    assert_eq!(item.data.environment, "staging");
    assert_eq!(item.data.code_version.as_deref(), Some("9f1c2e"));
    assert_eq!(item.data.server.host.as_deref(), Some("worker-3"));
    assert_eq!(item.data.server.root.as_deref(), Some("/srv/billing"));
}

#[test]
#[serial(rollbar_token)]
fn test_empty_token_uses_registered_token() {
    credentials::register_token("registered-token");
    let transport = RecordingTransport::new();
    let client = RollbarClient::with_transport(
        DeliveryMode::Sync,
        metadata(""),
        ClientConfig::default(),
        transport.clone(),
    )
    .unwrap();

    client.message(RollbarLevel::Warning, "cache miss storm");
    credentials::clear_registered_token();

    assert_eq!(transport.items.lock()[0].access_token, "registered-token");
}

#[test]
#[serial(rollbar_token)]
fn test_no_token_anywhere_drops_message() {
    credentials::clear_registered_token();
    let transport = RecordingTransport::new();
    let client = RollbarClient::with_transport(
        DeliveryMode::Sync,
        metadata(""),
        ClientConfig::default(),
        transport.clone(),
    )
    .unwrap();

    client.message(RollbarLevel::Error, "nobody hears this");
    client.wait();

    assert_eq!(transport.len(), 0);
}

#[test]
fn test_drop_delivers_queued_messages() {
    let transport = RecordingTransport::with_delay(Duration::from_millis(5));
    {
        let client = client(DeliveryMode::Async, transport.clone());
        client.message(RollbarLevel::Error, "first");
        client.message(RollbarLevel::Error, "second");
    }
    assert_eq!(transport.len(), 2);
}
