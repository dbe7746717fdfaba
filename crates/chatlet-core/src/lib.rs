// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Chatlet support widget.
//!
//! This crate provides the message model, the failure taxonomy, the error
//! type, and the adapter traits that storage backends and backend transports
//! implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ChatletError;
pub use types::{
    AdapterType, ChatReply, ChatRequest, CustomerId, FailureKind, FileUpload, HealthStatus,
    IndicatorId, Message, MessageKind, Outcome, UploadReply,
};

pub use traits::{ChatTransport, DurableStore, PluginAdapter};
