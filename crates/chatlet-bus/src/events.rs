// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events published by a widget instance.

use chatlet_core::{IndicatorId, Message};
use serde::Serialize;

/// A state change the rendering surface may want to redraw.
///
/// Events describe what already happened; the widget has updated its own
/// state before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WidgetEvent {
    /// A message was appended to the conversation history.
    MessageAppended { message: Message },
    /// A "thinking" indicator appeared while a reply is pending.
    IndicatorShown { id: u64 },
    /// The indicator with this id was removed.
    IndicatorRemoved { id: u64 },
    /// Connectivity flipped.
    ConnectivityChanged { online: bool },
    /// The chat window was opened or closed.
    VisibilityChanged { open: bool },
    /// Theme values changed; read the new theme from the widget.
    ThemeChanged,
}

impl WidgetEvent {
    pub fn indicator_shown(id: IndicatorId) -> Self {
        WidgetEvent::IndicatorShown { id: id.0 }
    }

    pub fn indicator_removed(id: IndicatorId) -> Self {
        WidgetEvent::IndicatorRemoved { id: id.0 }
    }

    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            WidgetEvent::MessageAppended { .. } => "message_appended",
            WidgetEvent::IndicatorShown { .. } => "indicator_shown",
            WidgetEvent::IndicatorRemoved { .. } => "indicator_removed",
            WidgetEvent::ConnectivityChanged { .. } => "connectivity_changed",
            WidgetEvent::VisibilityChanged { .. } => "visibility_changed",
            WidgetEvent::ThemeChanged => "theme_changed",
        }
    }
}
