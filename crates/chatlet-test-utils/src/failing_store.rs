// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable store that refuses writes, standing in for a full or broken disk.

use std::sync::atomic::{AtomicUsize, Ordering};

use chatlet_core::{ChatletError, DurableStore};
use chatlet_storage::MemoryStore;

/// Reads succeed from an inner [`MemoryStore`]; every write fails.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    rejected_writes: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value that reads will return.
    pub fn seed(&self, key: &str, value: &str) -> Result<(), ChatletError> {
        self.inner.set(key, value)
    }

    pub fn rejected_writes(&self) -> usize {
        self.rejected_writes.load(Ordering::SeqCst)
    }
}

impl DurableStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatletError> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), ChatletError> {
        self.rejected_writes.fetch_add(1, Ordering::SeqCst);
        Err(ChatletError::Storage {
            source: "storage quota exceeded".into(),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), ChatletError> {
        self.rejected_writes.fetch_add(1, Ordering::SeqCst);
        Err(ChatletError::Storage {
            source: "storage quota exceeded".into(),
        })
    }
}
