// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Chatlet widget.

use thiserror::Error;

use crate::types::FailureKind;

/// The primary error type used across the Chatlet adapter traits and core operations.
///
/// These errors never reach the person chatting: the widget converts each one
/// into an inline `error` message and an [`Outcome`](crate::types::Outcome).
#[derive(Debug, Error)]
pub enum ChatletError {
    /// Configuration errors (missing customer id, bad API URL, invalid header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage errors (database open, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport-level failures: connection refused, DNS, unreadable body.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered, but the body did not report success.
    #[error("backend reported status `{status}`")]
    Backend {
        status: String,
        message: Option<String>,
    },

    /// Request timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatletError {
    /// Classifies this error into the widget's failure taxonomy.
    ///
    /// Timeouts are transport failures: the request was attempted and
    /// never completed.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ChatletError::Backend { .. } => FailureKind::Backend,
            _ => FailureKind::Transport,
        }
    }
}
