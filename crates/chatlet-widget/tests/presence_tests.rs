// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity transitions and the backend probe.

use std::sync::Arc;
use std::time::Duration;

use chatlet_bus::WidgetEvent;
use chatlet_config::model::NoticeConfig;
use chatlet_core::{FailureKind, MessageKind};
use chatlet_test_utils::{settle, MockTransport, TestHarness};
use chatlet_widget::ConnectivityProbe;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn losing_connection_appends_one_notice() {
    let mut harness = TestHarness::builder().build().unwrap();

    harness.set_online(false).await;

    assert!(!harness.widget.is_online());
    let history = harness.widget.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, MessageKind::Error);
    assert_eq!(history[0].text, NoticeConfig::default().connection_lost);

    let events = harness.drain_events();
    assert_eq!(events[0], WidgetEvent::ConnectivityChanged { online: false });
    assert!(matches!(events[1], WidgetEvent::MessageAppended { .. }));
}

#[tokio::test]
async fn regaining_connection_appends_nothing() {
    let mut harness = TestHarness::builder().offline().build().unwrap();
    assert!(!harness.widget.is_online());

    harness.set_online(true).await;

    assert!(harness.widget.is_online());
    assert!(harness.widget.history().is_empty());
    assert_eq!(
        harness.drain_events(),
        vec![WidgetEvent::ConnectivityChanged { online: true }]
    );
}

#[tokio::test]
async fn repeated_value_is_not_a_transition() {
    let mut harness = TestHarness::builder().build().unwrap();

    harness.set_online(true).await;
    harness.set_online(false).await;
    harness.set_online(false).await;

    assert_eq!(harness.widget.history().len(), 1);
    let changes = harness
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, WidgetEvent::ConnectivityChanged { .. }))
        .count();
    assert_eq!(changes, 1);
}

#[tokio::test]
async fn send_after_reconnect_reaches_backend() {
    let harness = TestHarness::builder().offline().build().unwrap();
    assert_eq!(
        harness.send_message("first").await.failure(),
        Some(FailureKind::Offline)
    );

    harness.set_online(true).await;
    assert!(harness.send_message("second").await.is_delivered());
    assert_eq!(harness.transport.chat_request_count(), 1);
}

#[tokio::test]
async fn dropping_widget_stops_monitor() {
    let harness = TestHarness::builder().build().unwrap();
    assert!(!harness.connectivity_closed());

    assert!(harness.shutdown().await);
}

#[tokio::test]
async fn probe_publishes_reachability_changes() {
    let transport = Arc::new(MockTransport::new());
    let (probe, mut rx) = ConnectivityProbe::new(transport.clone(), Duration::from_secs(15), true);

    assert!(probe.probe_once().await);
    assert!(!rx.has_changed().unwrap());

    transport.set_reachable(false);
    assert!(!probe.probe_once().await);
    assert!(rx.has_changed().unwrap());
    assert!(!*rx.borrow_and_update());

    transport.set_reachable(true);
    assert!(probe.probe_once().await);
    assert!(*rx.borrow_and_update());
}

#[tokio::test(start_paused = true)]
async fn running_probe_drives_widget_offline() {
    let transport = Arc::new(MockTransport::new());
    let (probe, rx) = ConnectivityProbe::new(transport.clone(), Duration::from_secs(15), true);
    let widget = chatlet_widget::ChatWidget::start(
        &harness_config(),
        Arc::new(chatlet_storage::MemoryStore::new()),
        transport.clone(),
        rx,
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let task = probe.spawn(cancel.clone());
    settle().await;
    assert!(widget.is_online());

    transport.set_reachable(false);
    tokio::time::sleep(Duration::from_secs(16)).await;
    settle().await;
    assert!(!widget.is_online());
    assert_eq!(widget.history().len(), 1);

    cancel.cancel();
    task.await.unwrap();
}

fn harness_config() -> chatlet_config::ChatletConfig {
    let mut config = chatlet_config::ChatletConfig::default();
    config.widget.customer_id = "c1".into();
    config.widget.api_url = "http://backend.test/api".into();
    config
}
