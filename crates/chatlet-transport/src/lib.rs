// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport to the Chatlet support backend.
//!
//! This crate implements [`ChatTransport`] over reqwest: JSON chat and typing
//! requests, multipart uploads, and a `HEAD` reachability probe. It only
//! classifies failures; turning them into chat notices is the widget's job.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use chatlet_config::ChatletConfig;
use chatlet_core::error::ChatletError;
use chatlet_core::traits::{ChatTransport, PluginAdapter};
use chatlet_core::types::{
    AdapterType, ChatReply, ChatRequest, CustomerId, FileUpload, HealthStatus, UploadReply,
};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::types::{ChatResponse, TypingRequest, UploadResponse};

/// Backend transport implementing [`ChatTransport`].
pub struct HttpTransport {
    client: ApiClient,
}

impl HttpTransport {
    /// Creates a transport for `api_url` identifying as `customer`.
    pub fn new(
        api_url: &str,
        customer: &CustomerId,
        timeout: Duration,
    ) -> Result<Self, ChatletError> {
        let client = ApiClient::new(api_url, customer, timeout)?;
        info!(api_url = client.base_url(), customer = %customer, "HTTP transport initialized");
        Ok(Self { client })
    }

    /// Creates a transport from the `[widget]` and `[transport]` sections.
    pub fn from_config(config: &ChatletConfig) -> Result<Self, ChatletError> {
        Self::new(
            &config.widget.api_url,
            &CustomerId(config.widget.customer_id.clone()),
            Duration::from_secs(config.transport.timeout_secs),
        )
    }

    pub fn api_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl PluginAdapter for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    /// Any HTTP response counts as reachable; server errors as degraded.
    async fn health_check(&self) -> Result<HealthStatus, ChatletError> {
        match self.client.head().await {
            Ok(status) if status.is_server_error() => {
                Ok(HealthStatus::Degraded(format!("backend returned {status}")))
            }
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => {
                debug!(error = %e, "reachability probe failed");
                Ok(HealthStatus::Unhealthy(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatletError> {
        debug!(context = request.history.len(), "sending chat request");
        let response: ChatResponse = self.client.post_json("chat", request).await?;
        chat_reply(response)
    }

    async fn send_typing(&self, is_typing: bool) -> Result<(), ChatletError> {
        self.client
            .post_json_unit("typing", &TypingRequest { is_typing })
            .await
    }

    async fn upload(&self, file: &FileUpload) -> Result<UploadReply, ChatletError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ChatletError::Transport {
                message: format!("invalid MIME type `{}`: {e}", file.mime_type),
                source: Some(Box::new(e)),
            })?;
        let form = Form::new().part("file", part);

        debug!(file = %file.name, size = file.size(), "uploading file");
        let response: UploadResponse = self.client.post_multipart("upload", form).await?;
        upload_reply(response)
    }
}

fn chat_reply(response: ChatResponse) -> Result<ChatReply, ChatletError> {
    let success = response.is_success();
    match response {
        ChatResponse {
            message: Some(message),
            ..
        } if success => Ok(ChatReply { message }),
        ChatResponse { status, message } => Err(ChatletError::Backend { status, message }),
    }
}

fn upload_reply(response: UploadResponse) -> Result<UploadReply, ChatletError> {
    let success = response.is_success();
    match response {
        UploadResponse { url: Some(url), .. } if success => Ok(UploadReply { url }),
        UploadResponse {
            status, message, ..
        } => Err(ChatletError::Backend { status, message }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlet_core::{FailureKind, Message, MessageKind};
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(uri: &str) -> HttpTransport {
        HttpTransport::new(uri, &CustomerId::from("c1"), Duration::from_secs(5)).unwrap()
    }

    fn fixed(text: &str, kind: MessageKind) -> Message {
        Message {
            text: text.into(),
            kind,
            timestamp: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[tokio::test]
    async fn send_chat_success() {
        let server = MockServer::start().await;
        let request = ChatRequest {
            text: "hello".into(),
            history: vec![fixed("hello", MessageKind::User)],
        };

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("x-customer-id", "c1"))
            .and(body_json(serde_json::json!({
                "text": "hello",
                "history": [{"text": "hello", "type": "user", "timestamp": "2026-01-01T00:00:00.000Z"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": "hi there"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = transport(&server.uri()).send_chat(&request).await.unwrap();
        assert_eq!(reply.message, "hi there");
    }

    #[tokio::test]
    async fn send_chat_backend_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "no agent available"
            })))
            .mount(&server)
            .await;

        let request = ChatRequest {
            text: "hello".into(),
            history: vec![],
        };
        let err = transport(&server.uri())
            .send_chat(&request)
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Backend);
        assert!(
            matches!(&err, ChatletError::Backend { status, message: Some(m) } if status == "error" && m == "no agent available"),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn success_without_message_is_backend_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
            )
            .mount(&server)
            .await;

        let request = ChatRequest {
            text: "hello".into(),
            history: vec![],
        };
        let err = transport(&server.uri())
            .send_chat(&request)
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Backend);
    }

    #[tokio::test]
    async fn send_chat_non_json_is_transport_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let request = ChatRequest {
            text: "hello".into(),
            history: vec![],
        };
        let err = transport(&server.uri())
            .send_chat(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatletError::Transport { .. }), "got: {err:?}");
        assert_eq!(err.failure_kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn connection_refused_is_transport_failure() {
        let t = transport("http://127.0.0.1:1");
        let request = ChatRequest {
            text: "hello".into(),
            history: vec![],
        };
        let err = t.send_chat(&request).await.unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn send_typing_posts_flag() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/typing"))
            .and(header("x-customer-id", "c1"))
            .and(body_json(serde_json::json!({"isTyping": true})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        transport(&server.uri()).send_typing(true).await.unwrap();
    }

    #[tokio::test]
    async fn send_typing_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/typing"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        assert!(transport(&server.uri()).send_typing(false).await.is_err());
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_part() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("x-customer-id", "c1"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"cat.png\""))
            .and(body_string_contains("PNGDATA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "url": "/uploads/cat.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = FileUpload::new("cat.png", "image/png", b"PNGDATA".to_vec());
        let reply = transport(&server.uri()).upload(&file).await.unwrap();
        assert_eq!(reply.url, "/uploads/cat.png");
    }

    #[tokio::test]
    async fn upload_rejected_by_backend() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "disk full"
            })))
            .mount(&server)
            .await;

        let file = FileUpload::new("cat.png", "image/png", b"PNGDATA".to_vec());
        let err = transport(&server.uri()).upload(&file).await.unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Backend);
    }

    #[tokio::test]
    async fn health_check_reachable_on_any_response() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;

        let status = transport(&server.uri()).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_degraded_on_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let status = transport(&server.uri()).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
        assert!(status.is_reachable());
    }

    #[tokio::test]
    async fn health_check_unreachable_on_connection_failure() {
        let status = transport("http://127.0.0.1:1").health_check().await.unwrap();
        assert!(!status.is_reachable());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let t = transport("https://support.example.com/api");
        assert_eq!(t.name(), "http");
        assert_eq!(t.adapter_type(), AdapterType::Transport);
        assert_eq!(t.api_url(), "https://support.example.com/api");
    }

    #[test]
    fn from_config_reads_widget_section() {
        let mut config = ChatletConfig::default();
        config.widget.customer_id = "c1".into();
        config.widget.api_url = "https://support.example.com/api/".into();
        let t = HttpTransport::from_config(&config).unwrap();
        assert_eq!(t.api_url(), "https://support.example.com/api");
    }
}
