// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support backend request/response bodies.

use serde::{Deserialize, Serialize};

/// Value of `status` in a successful response body.
pub const STATUS_SUCCESS: &str = "success";

/// Body of `POST /typing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingRequest {
    #[serde(rename = "isTyping")]
    pub is_typing: bool,
}

/// Response to `POST /chat`.
///
/// Only `status` is required; a failing backend may omit `message`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
