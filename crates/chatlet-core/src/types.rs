// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the widget, its adapters, and the rendering surface.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier of one widget installation.
///
/// Scopes every durable storage key and is sent to the backend as the
/// `X-Customer-ID` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who produced a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    /// Typed or uploaded by the person chatting.
    User,
    /// Reply from the support backend.
    Bot,
    /// Locally generated failure notice.
    Error,
}

/// One entry in the conversation history. Immutable once created.
///
/// Serializes as `{"text", "type", "timestamp"}`, the same shape the browser
/// widget keeps in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            kind,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, MessageKind::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, MessageKind::Bot)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, MessageKind::Error)
    }
}

/// Identifies one shown "thinking" indicator.
///
/// Each send owns exactly one id and removes exactly that id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorId(pub u64);

/// Why a send or upload did not produce the expected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FailureKind {
    /// Connectivity was down; no request was attempted.
    Offline,
    /// The request was attempted and failed or timed out.
    Transport,
    /// The backend answered with a non-success status.
    Backend,
    /// A file was rejected locally before any request.
    Validation,
}

/// Result of a user-initiated send or upload.
///
/// Every variant has already been reflected in the conversation history;
/// callers only consume it for logging or tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The expected message was appended (bot reply, or uploaded image link).
    Delivered(Message),
    /// A local `error` notice was appended instead.
    Failed { kind: FailureKind, notice: Message },
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered(_))
    }

    /// The failure kind, if this outcome is a failure.
    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            Outcome::Delivered(_) => None,
            Outcome::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is reachable and operational.
    Healthy,
    /// Adapter is reachable but reported a problem.
    Degraded(String),
    /// Adapter is not reachable.
    Unhealthy(String),
}

impl HealthStatus {
    /// Whether the adapter can be reached at all. Degraded still counts.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy(_))
    }
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
}

// --- Wire types ---

/// Body of `POST {api_url}/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    /// Recent conversation context, oldest first (at most five entries).
    pub history: Vec<Message>,
}

/// Successful reply to a chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub message: String,
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Successful reply to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub url: String,
}
