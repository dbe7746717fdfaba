// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key/value storage trait (SQLite, in-memory).

use crate::error::ChatletError;

/// Persistent key/value storage that survives restarts.
///
/// The desktop counterpart of browser local storage: string keys, string
/// values, synchronous from the caller's point of view. Implementations
/// must be safe to share between tasks.
pub trait DurableStore: Send + Sync {
    /// Reads a value. Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, ChatletError>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), ChatletError>;

    /// Deletes a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), ChatletError>;
}
