// tests/status_bus.rs

use std::collections::BTreeSet;

use tokio_stream::StreamExt;
use workchain::status::{StatusBus, StatusFilter, StatusSnapshot};
use workchain::work::{RunId, UnitId, WorkData, WorkInfo, WorkKind, WorkState};
use workchain_test_utils::{init_tracing, with_timeout};

fn info(chain: &str, index: usize, state: WorkState, tags: &[&str]) -> WorkInfo {
    WorkInfo {
        chain: chain.to_string(),
        index,
        id: UnitId::new(),
        run_id: RunId::new(),
        kind: WorkKind::new("k"),
        state,
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        output: (state == WorkState::Succeeded).then(WorkData::new),
    }
}

#[test]
fn new_bus_reports_nothing() {
    let bus = StatusBus::new();
    assert!(bus.current(&StatusFilter::All).is_empty());
}

#[test]
fn filters_select_by_chain_and_tag() {
    let bus = StatusBus::new();
    bus.publish(StatusSnapshot::new(vec![
        info("x", 0, WorkState::Succeeded, &[]),
        info("x", 1, WorkState::Running, &["progress"]),
        info("y", 0, WorkState::Enqueued, &["progress", "output"]),
    ]));

    assert_eq!(bus.current(&StatusFilter::All).len(), 3);
    assert_eq!(bus.current(&StatusFilter::Chain("x".to_string())).len(), 2);
    assert!(bus.current(&StatusFilter::Chain("z".to_string())).is_empty());

    let progress = bus.current(&StatusFilter::Tag("progress".to_string()));
    let labels: Vec<_> = progress
        .iter()
        .map(|u| format!("{}#{}", u.chain, u.index))
        .collect();
    assert_eq!(labels, vec!["x#1", "y#0"]);
    assert_eq!(bus.current(&StatusFilter::Tag("output".to_string())).len(), 1);
}

#[tokio::test]
async fn late_subscriber_starts_from_latest_snapshot() {
    init_tracing();

    let bus = StatusBus::new();
    bus.publish(StatusSnapshot::new(vec![info("x", 0, WorkState::Running, &[])]));
    bus.publish(StatusSnapshot::new(vec![info("x", 0, WorkState::Succeeded, &[])]));

    let mut updates = bus.subscribe(StatusFilter::Chain("x".to_string()));
    let first = with_timeout(updates.next()).await.expect("stream ended");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].state, WorkState::Succeeded);
}

#[tokio::test]
async fn subscribers_see_every_published_change_in_order() {
    init_tracing();

    let bus = StatusBus::new();
    let mut updates = bus.subscribe(StatusFilter::All);

    // Initial (empty) snapshot.
    let initial = with_timeout(updates.next()).await.expect("stream ended");
    assert!(initial.is_empty());

    for state in [WorkState::Enqueued, WorkState::Running, WorkState::Succeeded] {
        bus.publish(StatusSnapshot::new(vec![info("x", 0, state, &[])]));
        let next = with_timeout(updates.next()).await.expect("stream ended");
        assert_eq!(next[0].state, state);
    }
}

#[tokio::test]
async fn clones_share_the_same_channel() {
    let bus = StatusBus::new();
    let publisher = bus.clone();
    let mut updates = bus.subscribe(StatusFilter::Tag("t".to_string()));
    with_timeout(updates.next()).await;

    publisher.publish(StatusSnapshot::new(vec![
        info("x", 0, WorkState::Running, &["t"]),
        info("x", 1, WorkState::Enqueued, &[]),
    ]));

    let next = with_timeout(updates.next()).await.expect("stream ended");
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].index, 0);
}
