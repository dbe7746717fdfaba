// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typing-status debounce.
//!
//! The first input after idling reports `typing = true`. Every input restarts
//! a one second idle timer; when it fires, or when a message is sent, the
//! debouncer reports `typing = false`. Signals leave through a single worker
//! task so the backend always sees them in the order they were decided.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chatlet_core::ChatTransport;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Inactivity after which `typing = false` is sent.
pub const TYPING_IDLE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Whether the user is currently considered to be typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Idle,
    Typing,
}

#[derive(Debug)]
struct DebounceState {
    state: TypingState,
    // Bumped on every restart or cancel; a timer only fires for its own generation.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Turns raw input events into debounced typing signals.
pub struct TypingDebouncer {
    state: Arc<Mutex<DebounceState>>,
    signals: mpsc::UnboundedSender<bool>,
    idle_timeout: Duration,
    runtime: Handle,
}

impl TypingDebouncer {
    /// Spawns the signal worker on `runtime`.
    pub fn new(transport: Arc<dyn ChatTransport>, idle_timeout: Duration, runtime: &Handle) -> Self {
        let (signals, rx) = mpsc::unbounded_channel();
        runtime.spawn(signal_worker(transport, rx));
        Self {
            state: Arc::new(Mutex::new(DebounceState {
                state: TypingState::Idle,
                generation: 0,
                timer: None,
            })),
            signals,
            idle_timeout,
            runtime: runtime.clone(),
        }
    }

    pub fn state(&self) -> TypingState {
        lock(&self.state).state
    }

    /// Records one input change.
    pub fn on_input(&self) {
        let mut st = lock(&self.state);
        if st.state == TypingState::Idle {
            st.state = TypingState::Typing;
            self.emit(true);
        }

        st.generation += 1;
        if let Some(timer) = st.timer.take() {
            timer.abort();
        }

        let generation = st.generation;
        let deadline = Instant::now() + self.idle_timeout;
        let state = Arc::downgrade(&self.state);
        let signals = self.signals.clone();
        st.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(state) = state.upgrade() else {
                return;
            };
            let mut st = lock(&state);
            if st.generation == generation && st.state == TypingState::Typing {
                st.state = TypingState::Idle;
                st.timer = None;
                if signals.send(false).is_err() {
                    debug!(is_typing = false, "typing worker gone, signal dropped");
                }
            }
        }));
    }

    /// Records that a message was sent. Ends a typing burst immediately.
    pub fn on_message_sent(&self) {
        let mut st = lock(&self.state);
        if st.state != TypingState::Typing {
            return;
        }
        st.generation += 1;
        if let Some(timer) = st.timer.take() {
            timer.abort();
        }
        st.state = TypingState::Idle;
        self.emit(false);
    }

    fn emit(&self, is_typing: bool) {
        if self.signals.send(is_typing).is_err() {
            debug!(is_typing, "typing worker gone, signal dropped");
        }
    }
}

impl Drop for TypingDebouncer {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.state).timer.take() {
            timer.abort();
        }
    }
}

fn lock(state: &Mutex<DebounceState>) -> MutexGuard<'_, DebounceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn signal_worker(transport: Arc<dyn ChatTransport>, mut rx: mpsc::UnboundedReceiver<bool>) {
    while let Some(is_typing) = rx.recv().await {
        if let Err(e) = transport.send_typing(is_typing).await {
            warn!(is_typing, error = %e, "failed to send typing status");
        }
    }
    debug!("typing worker stopped");
}
