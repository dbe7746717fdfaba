// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed event bus connecting a widget instance to its rendering surfaces.
//!
//! Built on a Tokio broadcast channel. Publishing never blocks and never
//! fails: with no subscribers the event is simply dropped, and a subscriber
//! that falls more than `capacity` events behind observes
//! [`broadcast::error::RecvError::Lagged`] and skips ahead.

pub mod events;

pub use events::WidgetEvent;

use tokio::sync::broadcast;
use tracing::trace;

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out publisher of [`WidgetEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WidgetEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to every current subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: WidgetEvent) -> usize {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => {
                trace!(event = name, receivers, "event published");
                receivers
            }
            Err(_) => {
                trace!(event = name, "event dropped, no subscribers");
                0
            }
        }
    }

    /// Returns a receiver that observes every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
