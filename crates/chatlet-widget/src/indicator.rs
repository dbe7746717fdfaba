// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! "Thinking" indicators shown while a chat reply is pending.
//!
//! Every send owns one [`IndicatorGuard`]. Dropping the guard removes
//! exactly that indicator, so an early return or a cancelled future can
//! never leave one behind or remove someone else's.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chatlet_bus::{EventBus, WidgetEvent};
use chatlet_core::IndicatorId;

/// Tracks which indicators are currently visible.
#[derive(Debug)]
pub struct IndicatorTracker {
    next_id: AtomicU64,
    active: Mutex<BTreeSet<IndicatorId>>,
    bus: EventBus,
}

impl IndicatorTracker {
    pub fn new(bus: EventBus) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            active: Mutex::new(BTreeSet::new()),
            bus,
        }
    }

    /// Shows a new indicator and returns the guard that owns it.
    pub fn show(self: &Arc<Self>) -> IndicatorGuard {
        let id = IndicatorId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        self.bus.publish(WidgetEvent::indicator_shown(id));
        IndicatorGuard {
            tracker: Arc::clone(self),
            id,
        }
    }

    /// Currently visible indicators, oldest first.
    pub fn active(&self) -> Vec<IndicatorId> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    fn remove(&self, id: IndicatorId) {
        let removed = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed {
            self.bus.publish(WidgetEvent::indicator_removed(id));
        }
    }
}

/// Owns one visible indicator until dropped.
#[derive(Debug)]
#[must_use = "dropping the guard removes the indicator immediately"]
pub struct IndicatorGuard {
    tracker: Arc<IndicatorTracker>,
    id: IndicatorId,
}

impl IndicatorGuard {
    pub fn id(&self) -> IndicatorId {
        self.id
    }

    /// Removes the indicator now.
    pub fn dismiss(self) {}
}

impl Drop for IndicatorGuard {
    fn drop(&mut self) {
        self.tracker.remove(self.id);
    }
}
