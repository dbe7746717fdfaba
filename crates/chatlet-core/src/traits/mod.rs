// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Network adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch. Durable storage is synchronous.

pub mod adapter;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use storage::DurableStore;
pub use transport::ChatTransport;
