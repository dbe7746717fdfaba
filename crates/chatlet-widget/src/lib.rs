// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session and message-delivery lifecycle of the Chatlet support widget.
//!
//! A [`ChatWidget`] ties together the durable session state, the backend
//! transport, connectivity tracking, typing debounce and thinking
//! indicators, and reports every visible change on its event bus.
//!
//! ```no_run
//! # async fn demo() -> Result<(), chatlet_core::ChatletError> {
//! use std::sync::Arc;
//! use chatlet_storage::MemoryStore;
//! use chatlet_transport::HttpTransport;
//! use chatlet_widget::ChatWidget;
//!
//! let config = chatlet_config::load_and_validate_str(
//!     "[widget]\ncustomer_id = \"c1\"\napi_url = \"https://support.example.com/api\"",
//! )
//! .expect("valid config");
//! let transport = Arc::new(HttpTransport::from_config(&config)?);
//! let (_online, connectivity) = tokio::sync::watch::channel(true);
//! let widget = ChatWidget::start(&config, Arc::new(MemoryStore::new()), transport, connectivity)?;
//! widget.send_message("hello").await;
//! # Ok(())
//! # }
//! ```

pub mod indicator;
pub mod presence;
pub mod typing;
pub mod upload;
pub mod widget;

pub use indicator::{IndicatorGuard, IndicatorTracker};
pub use presence::{ConnectivityProbe, Presence};
pub use typing::{TypingDebouncer, TypingState, TYPING_IDLE_TIMEOUT};
pub use upload::{image_markdown, UploadPolicy, UploadViolation};
pub use widget::{ChatWidget, CONTEXT_WINDOW};
