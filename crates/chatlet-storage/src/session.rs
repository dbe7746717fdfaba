// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-customer conversation history and draft.
//!
//! The in-memory history holds the whole session. Every append rewrites the
//! durable copy with the most recent [`PERSISTED_HISTORY_LIMIT`] entries.
//! Storage failures never reach the caller: they are logged and the
//! in-memory state stays authoritative.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatlet_core::{CustomerId, DurableStore, Message};
use tracing::{debug, warn};

/// Maximum number of messages kept in durable storage.
pub const PERSISTED_HISTORY_LIMIT: usize = 20;

/// Durable key holding the JSON history array for `customer`.
pub fn history_key(customer: &CustomerId) -> String {
    format!("chat_history_{customer}")
}

/// Durable key holding the draft text for `customer`.
pub fn draft_key(customer: &CustomerId) -> String {
    format!("chat_draft_{customer}")
}

/// The suffix of `history` that is written to durable storage.
pub fn persisted_window(history: &[Message]) -> &[Message] {
    let start = history.len().saturating_sub(PERSISTED_HISTORY_LIMIT);
    &history[start..]
}

/// Reads the persisted history. Absent, unreadable or malformed data yields
/// an empty history.
pub fn load_history(store: &dyn DurableStore, customer: &CustomerId) -> Vec<Message> {
    let key = history_key(customer);
    let raw = match store.get(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key = %key, error = %e, "failed to read history, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Message>>(&raw) {
        Ok(history) => history,
        Err(e) => {
            warn!(key = %key, error = %e, "malformed history, starting empty");
            Vec::new()
        }
    }
}

/// Reads the persisted draft, or the empty string.
pub fn load_draft(store: &dyn DurableStore, customer: &CustomerId) -> String {
    let key = draft_key(customer);
    match store.get(&key) {
        Ok(draft) => draft.unwrap_or_default(),
        Err(e) => {
            warn!(key = %key, error = %e, "failed to read draft");
            String::new()
        }
    }
}

/// Conversation history and draft of one customer, backed by a durable store.
pub struct SessionStore {
    store: Arc<dyn DurableStore>,
    customer: CustomerId,
    history_key: String,
    draft_key: String,
    history: Mutex<Vec<Message>>,
    draft: Mutex<String>,
}

impl SessionStore {
    /// Loads history and draft for `customer` from `store`.
    pub fn open(store: Arc<dyn DurableStore>, customer: CustomerId) -> Self {
        let history = load_history(store.as_ref(), &customer);
        let draft = load_draft(store.as_ref(), &customer);
        debug!(
            customer = %customer,
            messages = history.len(),
            has_draft = !draft.is_empty(),
            "session state loaded"
        );
        Self {
            history_key: history_key(&customer),
            draft_key: draft_key(&customer),
            store,
            customer,
            history: Mutex::new(history),
            draft: Mutex::new(draft),
        }
    }

    pub fn customer(&self) -> &CustomerId {
        &self.customer
    }

    /// Full in-memory history, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.lock_history().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_history().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_history().is_empty()
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Message> {
        let history = self.lock_history();
        let start = history.len().saturating_sub(n);
        history[start..].to_vec()
    }

    /// Appends a message and persists the most recent window.
    ///
    /// Persisting happens under the history lock so the durable order always
    /// matches the in-memory order.
    pub fn append(&self, message: Message) {
        let mut history = self.lock_history();
        history.push(message);
        self.persist(&history);
    }

    /// The history as currently held in durable storage.
    pub fn persisted(&self) -> Vec<Message> {
        load_history(self.store.as_ref(), &self.customer)
    }

    pub fn draft(&self) -> String {
        self.draft
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the draft and writes it through immediately.
    pub fn save_draft(&self, text: &str) {
        let mut draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        *draft = text.to_string();
        if let Err(e) = self.store.set(&self.draft_key, text) {
            warn!(key = %self.draft_key, error = %e, "failed to persist draft");
        }
    }

    fn persist(&self, history: &[Message]) {
        let window = persisted_window(history);
        let json = match serde_json::to_string(window) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %self.history_key, error = %e, "failed to serialize history");
                return;
            }
        };
        match self.store.set(&self.history_key, &json) {
            Ok(()) => debug!(key = %self.history_key, persisted = window.len(), "history persisted"),
            Err(e) => warn!(key = %self.history_key, error = %e, "failed to persist history"),
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, Vec<Message>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
