// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete Chatlet pipeline.
//!
//! Each test runs a widget over a temp SQLite file and the real HTTP
//! transport pointed at a wiremock backend. Tests are independent and
//! order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use chatlet_config::ChatletConfig;
use chatlet_core::{DurableStore, FailureKind, FileUpload, MessageKind};
use chatlet_storage::{load_history, SqliteStore};
use chatlet_test_utils::settle;
use chatlet_transport::HttpTransport;
use chatlet_widget::{ChatWidget, ConnectivityProbe};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Backend {
    server: MockServer,
    _dir: tempfile::TempDir,
    config: ChatletConfig,
}

impl Backend {
    async fn start() -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = ChatletConfig::default();
        config.widget.customer_id = "acme-42".into();
        config.widget.api_url = format!("{}/api", server.uri());
        config.storage.database_path = dir.path().join("chatlet.db").display().to_string();
        config.transport.timeout_secs = 2;

        Self {
            server,
            _dir: dir,
            config,
        }
    }

    fn store(&self) -> Arc<dyn DurableStore> {
        Arc::new(SqliteStore::from_config(&self.config.storage).unwrap())
    }

    fn widget(&self, online: bool) -> (ChatWidget, tokio::sync::watch::Sender<bool>) {
        let transport = Arc::new(HttpTransport::from_config(&self.config).unwrap());
        let (tx, rx) = tokio::sync::watch::channel(online);
        let widget = ChatWidget::start(&self.config, self.store(), transport, rx).unwrap();
        (widget, tx)
    }
}

// ---- Message pipeline ----

#[tokio::test]
async fn message_round_trip_over_http() {
    let backend = Backend::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("x-customer-id", "acme-42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "success", "message": "hi there"})),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let (widget, _tx) = backend.widget(true);
    let outcome = widget.send_message("hello").await;

    assert!(outcome.is_delivered());
    let texts: Vec<_> = widget.history().into_iter().map(|m| (m.kind, m.text)).collect();
    assert_eq!(
        texts,
        vec![
            (MessageKind::User, "hello".to_string()),
            (MessageKind::Bot, "hi there".to_string())
        ]
    );

    let requests = backend.server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["text"], "hello");
    assert_eq!(body["history"][0]["type"], "user");
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn conversation_survives_restart() {
    let backend = Backend::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "success", "message": "noted"})),
        )
        .mount(&backend.server)
        .await;

    {
        let (widget, _tx) = backend.widget(true);
        widget.send_message("remember me").await;
        widget.input("unsent");
    }

    let (widget, _tx) = backend.widget(true);
    assert_eq!(widget.history().len(), 2);
    assert_eq!(widget.history()[0].text, "remember me");
    assert_eq!(widget.draft(), "unsent");
}

#[tokio::test]
async fn backend_error_status_becomes_notice() {
    let backend = Backend::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "error"})),
        )
        .mount(&backend.server)
        .await;

    let (widget, _tx) = backend.widget(true);
    let outcome = widget.send_message("hello").await;

    assert_eq!(outcome.failure(), Some(FailureKind::Backend));
    let history = widget.history();
    assert_eq!(history[1].kind, MessageKind::Error);
    assert_eq!(history[1].text, backend.config.notices.send_failed);
}

#[tokio::test]
async fn slow_backend_times_out_as_transport_failure() {
    let backend = Backend::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&backend.server)
        .await;

    let (widget, _tx) = backend.widget(true);
    let outcome = widget.send_message("hello").await;

    assert_eq!(outcome.failure(), Some(FailureKind::Transport));
    assert!(widget.active_indicators().is_empty());
}

#[tokio::test]
async fn offline_send_makes_no_request() {
    let backend = Backend::start().await;
    let (widget, _tx) = backend.widget(false);

    widget.send_message("hello").await;

    assert!(backend.server.received_requests().await.unwrap().is_empty());
    assert_eq!(widget.history()[0].text, backend.config.notices.offline);
}

// ---- Upload ----

#[tokio::test]
async fn image_upload_links_returned_url() {
    let backend = Backend::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "success", "url": "/files/1.png"})),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let (widget, _tx) = backend.widget(true);
    let outcome = widget
        .upload_file(FileUpload::new("cat.png", "image/png", vec![137, 80, 78, 71]))
        .await;

    assert!(outcome.is_delivered());
    assert_eq!(widget.history()[0].text, "![cat.png](/files/1.png)");
}

#[tokio::test]
async fn rejected_upload_never_hits_backend() {
    let backend = Backend::start().await;
    let (widget, _tx) = backend.widget(true);

    widget
        .upload_file(FileUpload::new("doc.pdf", "application/pdf", vec![1]))
        .await;

    assert!(backend.server.received_requests().await.unwrap().is_empty());
    assert_eq!(widget.history()[0].text, backend.config.notices.unsupported_file_type);
}

// ---- Typing ----

#[tokio::test]
async fn typing_status_posts_camel_case_flag() {
    let backend = Backend::start().await;
    Mock::given(method("POST"))
        .and(path("/api/typing"))
        .and(body_json(serde_json::json!({"isTyping": true})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend.server)
        .await;

    let (widget, _tx) = backend.widget(true);
    widget.send_typing_status(true).await;
}

// ---- Presence ----

#[tokio::test]
async fn probe_marks_widget_offline_when_backend_disappears() {
    let backend = Backend::start().await;
    let transport = Arc::new(HttpTransport::from_config(&backend.config).unwrap());
    let (probe, rx) = ConnectivityProbe::new(transport.clone(), Duration::from_secs(60), true);
    let widget = ChatWidget::start(&backend.config, backend.store(), transport, rx).unwrap();

    // Any non-5xx answer counts as reachable.
    assert!(probe.probe_once().await);

    drop(backend.server);
    assert!(!probe.probe_once().await);
    settle().await;

    assert!(!widget.is_online());
    let history = widget.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, MessageKind::Error);

    let cancel = CancellationToken::new();
    cancel.cancel();
    probe.run(cancel).await;
}

#[tokio::test]
async fn persisted_window_is_last_twenty() {
    let backend = Backend::start().await;
    let (widget, _tx) = backend.widget(false);
    for _ in 0..25 {
        widget.send_message("x").await;
    }

    let store = backend.store();
    let persisted = load_history(store.as_ref(), widget.customer_id());
    assert_eq!(persisted.len(), 20);
    assert_eq!(persisted[..], widget.history()[5..]);
}
