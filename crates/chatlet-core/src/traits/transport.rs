// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for the chat backend.

use async_trait::async_trait;

use crate::error::ChatletError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatReply, ChatRequest, FileUpload, UploadReply};

/// Adapter for the chat backend's HTTP API.
///
/// Implementations only move bytes and classify failures. They never touch
/// conversation history; that is the widget's job.
#[async_trait]
pub trait ChatTransport: PluginAdapter {
    /// Delivers one user message with its context and returns the bot reply.
    ///
    /// Returns [`ChatletError::Backend`] when the body reports a non-success
    /// status, and a transport or timeout error when the request fails.
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatletError>;

    /// Reports whether the user is currently typing.
    async fn send_typing(&self, is_typing: bool) -> Result<(), ChatletError>;

    /// Uploads one already-validated file and returns its public URL.
    async fn upload(&self, file: &FileUpload) -> Result<UploadReply, ChatletError>;
}
