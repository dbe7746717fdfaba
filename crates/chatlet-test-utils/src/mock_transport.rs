// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport` with scripted replies and
//! records every request it receives, so tests can assert on exactly what
//! would have gone over the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chatlet_core::traits::{ChatTransport, PluginAdapter};
use chatlet_core::types::{
    AdapterType, ChatReply, ChatRequest, FileUpload, HealthStatus, UploadReply,
};
use chatlet_core::ChatletError;

/// Reply text used when the chat script is empty.
pub const DEFAULT_REPLY: &str = "mock reply";

/// One scripted answer to a chat or upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// Success: reply text for chat, URL for upload.
    Success(String),
    /// The backend answers with this non-success status.
    Backend(String),
    /// The request fails before a response arrives.
    Transport,
    /// The request times out.
    Timeout,
}

impl Scripted {
    fn into_result(self) -> Result<String, ChatletError> {
        match self {
            Scripted::Success(value) => Ok(value),
            Scripted::Backend(status) => Err(ChatletError::Backend {
                status,
                message: None,
            }),
            Scripted::Transport => Err(ChatletError::Transport {
                message: "connection refused".to_string(),
                source: None,
            }),
            Scripted::Timeout => Err(ChatletError::Timeout {
                duration: Duration::from_secs(30),
            }),
        }
    }
}

/// A mock transport that answers from FIFO scripts.
///
/// When the chat script is empty, [`DEFAULT_REPLY`] is returned. When the
/// upload script is empty, the URL is `/uploads/<file name>`.
#[derive(Default)]
pub struct MockTransport {
    chat_script: Mutex<VecDeque<Scripted>>,
    upload_script: Mutex<VecDeque<Scripted>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    typing_signals: Mutex<Vec<bool>>,
    uploads: Mutex<Vec<FileUpload>>,
    unreachable: AtomicBool,
    typing_fails: AtomicBool,
    chat_delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock pre-loaded with successful chat replies.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transport = Self::new();
        for reply in replies {
            transport.push_chat(Scripted::Success(reply.into()));
        }
        transport
    }

    /// Add a chat answer to the end of the script.
    pub fn push_chat(&self, answer: Scripted) {
        lock(&self.chat_script).push_back(answer);
    }

    /// Add an upload answer to the end of the script.
    pub fn push_upload(&self, answer: Scripted) {
        lock(&self.upload_script).push_back(answer);
    }

    /// Make `health_check` report the backend as unreachable (or reachable again).
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    pub fn set_typing_fails(&self, fails: bool) {
        self.typing_fails.store(fails, Ordering::SeqCst);
    }

    /// Delay every chat reply by `delay` (Tokio time, so it can be paused).
    pub fn set_chat_delay(&self, delay: Duration) {
        *lock(&self.chat_delay) = Some(delay);
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        lock(&self.chat_requests).clone()
    }

    pub fn chat_request_count(&self) -> usize {
        lock(&self.chat_requests).len()
    }

    pub fn typing_signals(&self) -> Vec<bool> {
        lock(&self.typing_signals).clone()
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        lock(&self.uploads).clone()
    }

    pub fn upload_count(&self) -> usize {
        lock(&self.uploads).len()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatletError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("mock backend unreachable".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatletError> {
        lock(&self.chat_requests).push(request.clone());
        let answer = lock(&self.chat_script)
            .pop_front()
            .unwrap_or_else(|| Scripted::Success(DEFAULT_REPLY.to_string()));

        let delay = *lock(&self.chat_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        answer.into_result().map(|message| ChatReply { message })
    }

    async fn send_typing(&self, is_typing: bool) -> Result<(), ChatletError> {
        lock(&self.typing_signals).push(is_typing);
        if self.typing_fails.load(Ordering::SeqCst) {
            return Err(ChatletError::Transport {
                message: "typing endpoint unavailable".to_string(),
                source: None,
            });
        }
        Ok(())
    }

    async fn upload(&self, file: &FileUpload) -> Result<UploadReply, ChatletError> {
        lock(&self.uploads).push(file.clone());
        let answer = lock(&self.upload_script)
            .pop_front()
            .unwrap_or_else(|| Scripted::Success(format!("/uploads/{}", file.name)));
        answer.into_result().map(|url| UploadReply { url })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
