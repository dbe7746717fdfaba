// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the support backend.
//!
//! Provides [`ApiClient`], which owns the identity header, the request
//! timeout, and the mapping from reqwest failures onto [`ChatletError`].
//! Requests are never retried.

use std::time::Duration;

use chatlet_core::{ChatletError, CustomerId};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Header carrying the customer identifier on every request.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

/// Low-level client bound to one backend base URL and one customer.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a client for `base_url` that identifies as `customer`.
    pub fn new(
        base_url: &str,
        customer: &CustomerId,
        timeout: Duration,
    ) -> Result<Self, ChatletError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CUSTOMER_ID_HEADER,
            HeaderValue::from_str(customer.as_str()).map_err(|e| {
                ChatletError::Config(format!("invalid customer id header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ChatletError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of `endpoint` under the base URL.
    pub fn endpoint(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// POSTs `body` as JSON and parses the response body as `R`.
    ///
    /// The HTTP status is not inspected: the backend reports failures in
    /// the body, and a body that does not parse is a transport failure.
    pub async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ChatletError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;
        self.parse_body(endpoint, response).await
    }

    /// POSTs `body` as JSON and ignores the response body.
    ///
    /// Non-2xx responses are reported as transport failures.
    pub async fn post_json_unit<B>(&self, endpoint: &str, body: &B) -> Result<(), ChatletError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;

        let status = response.status();
        debug!(endpoint, status = %status, "response received");
        if status.is_success() {
            Ok(())
        } else {
            Err(ChatletError::Transport {
                message: format!("{endpoint} returned {status}"),
                source: None,
            })
        }
    }

    /// POSTs a multipart form and parses the response body as `R`.
    pub async fn post_multipart<R>(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> Result<R, ChatletError>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(endpoint);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;
        self.parse_body(endpoint, response).await
    }

    /// Sends `HEAD` to the base URL and returns the status.
    pub async fn head(&self) -> Result<StatusCode, ChatletError> {
        let response = self
            .client
            .head(&self.base_url)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;
        Ok(response.status())
    }

    async fn parse_body<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<R, ChatletError> {
        let status = response.status();
        debug!(endpoint, status = %status, "response received");

        let body = response.text().await.map_err(|e| self.map_send_err(e))?;
        serde_json::from_str(&body).map_err(|e| ChatletError::Transport {
            message: format!("{endpoint} returned an unreadable body ({status}): {e}"),
            source: Some(Box::new(e)),
        })
    }

    fn map_send_err(&self, e: reqwest::Error) -> ChatletError {
        if e.is_timeout() {
            ChatletError::Timeout {
                duration: self.timeout,
            }
        } else {
            ChatletError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, &CustomerId::from("c1"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = test_client("https://support.example.com/api/");
        assert_eq!(client.base_url(), "https://support.example.com/api");
        assert_eq!(
            client.endpoint("chat"),
            "https://support.example.com/api/chat"
        );
        assert_eq!(
            client.endpoint("/typing"),
            "https://support.example.com/api/typing"
        );
    }

    #[test]
    fn invalid_customer_id_is_config_error() {
        let err = ApiClient::new(
            "http://localhost",
            &CustomerId::from("bad\nid"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, ChatletError::Config(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn client_sends_customer_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("x-customer-id", "c1"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let body: Value = client
            .post_json("echo", &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn error_status_with_json_body_is_still_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"status": "error"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let body: Value = client.post_json("chat", &serde_json::json!({})).await.unwrap();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(
            &server.uri(),
            &CustomerId::from("c1"),
            Duration::from_millis(50),
        )
        .unwrap();
        let err = client
            .post_json::<_, Value>("chat", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatletError::Timeout { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn head_returns_status() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert_eq!(client.head().await.unwrap(), StatusCode::NOT_FOUND);
    }
}
