use super::*;
use crate::position::PositionUpdate;
use serde_json::Map;
use std::sync::Arc;

fn update(lat: f64) -> PositionUpdate {
    PositionUpdate {
        lat,
        lng: 0.0,
        received_at_ms: 0,
        ip: None,
        extra: Map::new(),
    }
}

// ── PositionStore ─────────────────────────────────────────────────────────────

#[test]
fn test_empty_store() {
    let store = PositionStore::new(10);
    assert!(store.latest().is_none());
    assert!(store.is_empty());
    assert!(store.history().is_empty());
}

#[test]
fn test_record_replaces_latest() {
    let mut store = PositionStore::new(10);

    store.record(update(1.0));
    store.record(update(2.0));
    store.record(update(3.0));

    assert_eq!(store.latest().unwrap().lat, 3.0);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_history_is_oldest_first() {
    let mut store = PositionStore::new(10);

    store.record(update(1.0));
    store.record(update(2.0));

    let history = store.history();
    assert_eq!(history[0].lat, 1.0);
    assert_eq!(history[1].lat, 2.0);
}

#[test]
fn test_history_evicts_oldest_past_capacity() {
    let mut store = PositionStore::new(3);

    for i in 0..5 {
        store.record(update(i as f64));
    }

    assert_eq!(store.len(), 3);
    let history = store.history();
    let lats: Vec<f64> = history.iter().map(|u| u.lat).collect();
    assert_eq!(lats, vec![2.0, 3.0, 4.0]);
    // latest unaffected by eviction
    assert_eq!(store.latest().unwrap().lat, 4.0);
}

#[test]
fn test_history_never_exceeds_capacity() {
    let mut store = PositionStore::new(100);

    for i in 0..250 {
        store.record(update(i as f64));
        assert!(store.len() <= 100);
    }

    assert_eq!(store.len(), 100);
    assert_eq!(store.history()[0].lat, 150.0);
}

// ── TrackerEngine ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_accept_updates_latest_and_history() {
    let engine = Arc::new(TrackerEngine::new(100));

    engine.accept(update(1.0));
    engine.accept(update(2.0));

    assert_eq!(engine.latest().unwrap().lat, 2.0);
    assert_eq!(engine.history().len(), 2);
}

#[tokio::test]
async fn test_subscriber_attached_before_first_update_sees_only_live_updates() {
    let engine = Arc::new(TrackerEngine::new(100));
    let mut sub = engine.attach();

    // Nothing replayed when latest is absent
    assert!(sub.try_recv().is_none());

    engine.accept(update(1.0));

    assert_eq!(sub.try_recv().unwrap().lat, 1.0);
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_attach_replays_latest_exactly_once() {
    let engine = Arc::new(TrackerEngine::new(100));
    engine.accept(update(1.0));
    engine.accept(update(2.0));

    let mut sub = engine.attach();

    // Synchronization point: current latest, then live updates only
    assert_eq!(sub.try_recv().unwrap().lat, 2.0);
    assert!(sub.try_recv().is_none());

    engine.accept(update(3.0));
    assert_eq!(sub.try_recv().unwrap().lat, 3.0);
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_fan_out_preserves_order_per_subscriber() {
    let engine = Arc::new(TrackerEngine::new(100));
    let mut sub_a = engine.attach();
    let mut sub_b = engine.attach();

    engine.accept(update(1.0));
    engine.accept(update(2.0));

    for sub in [&mut sub_a, &mut sub_b] {
        assert_eq!(sub.try_recv().unwrap().lat, 1.0);
        assert_eq!(sub.try_recv().unwrap().lat, 2.0);
        assert!(sub.try_recv().is_none());
    }
}

#[tokio::test]
async fn test_dropping_subscription_detaches() {
    let engine = Arc::new(TrackerEngine::new(100));

    let sub = engine.attach();
    assert_eq!(engine.subscriber_count(), 1);

    drop(sub);
    assert_eq!(engine.subscriber_count(), 0);

    // Publishing to an empty set is fine
    engine.accept(update(1.0));
}

#[tokio::test]
async fn test_detach_is_idempotent() {
    let engine = Arc::new(TrackerEngine::new(100));
    let sub = engine.attach();
    let mut other = engine.attach();
    let id = sub.id();

    engine.detach(id);
    engine.detach(id);
    assert_eq!(engine.subscriber_count(), 1);

    // The remaining subscriber still receives updates
    drop(sub);
    engine.accept(update(1.0));
    assert_eq!(other.try_recv().unwrap().lat, 1.0);
}

#[tokio::test]
async fn test_slow_subscriber_is_detached_not_waited_on() {
    // Buffer of one: the replayed latest fills it, the next publish overflows
    let engine = Arc::new(TrackerEngine::with_channel_capacity(100, 1));
    engine.accept(update(1.0));

    let mut sub = engine.attach();
    assert_eq!(engine.subscriber_count(), 1);

    engine.accept(update(2.0));
    assert_eq!(engine.subscriber_count(), 0);

    // The subscriber still drains what was delivered before detachment
    assert_eq!(sub.try_recv().unwrap().lat, 1.0);
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_subscription_stream_yields_updates() {
    use futures::StreamExt;

    let engine = Arc::new(TrackerEngine::new(100));
    engine.accept(update(1.0));

    let mut sub = engine.attach();
    engine.accept(update(2.0));

    assert_eq!(sub.next().await.unwrap().lat, 1.0);
    assert_eq!(sub.next().await.unwrap().lat, 2.0);
}
