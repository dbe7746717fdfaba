// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable session state for the Chatlet widget.
//!
//! Provides two [`DurableStore`](chatlet_core::DurableStore) backends, a
//! WAL-mode SQLite file with embedded migrations and an in-memory map, plus
//! [`SessionStore`], which keeps one customer's conversation history and
//! draft in sync with whichever backend it is given.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod session;

pub use database::SqliteStore;
pub use memory::MemoryStore;
pub use session::{
    draft_key, history_key, load_draft, load_history, persisted_window, SessionStore,
    PERSISTED_HISTORY_LIMIT,
};
