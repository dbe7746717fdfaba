// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of messages and widget events.

use chatlet_bus::WidgetEvent;
use chatlet_core::{Message, MessageKind};
use colored::Colorize;

/// One transcript line, e.g. `[10:00:00] bot: hi there`.
pub fn format_message(message: &Message, use_color: bool) -> String {
    let time = clock(&message.timestamp);
    let label = match message.kind {
        MessageKind::User => "you",
        MessageKind::Bot => "bot",
        MessageKind::Error => "!",
    };

    if !use_color {
        return format!("[{time}] {label}: {}", message.text);
    }

    let label = match message.kind {
        MessageKind::User => label.blue().bold(),
        MessageKind::Bot => label.green().bold(),
        MessageKind::Error => label.red().bold(),
    };
    let text = match message.kind {
        MessageKind::Error => message.text.red(),
        _ => message.text.normal(),
    };
    format!("{} {label}: {text}", format!("[{time}]").dimmed())
}

/// The line a live session prints for an event, if any.
pub fn format_event(event: &WidgetEvent, use_color: bool) -> Option<String> {
    let line = match event {
        WidgetEvent::MessageAppended { message } => return Some(format_message(message, use_color)),
        WidgetEvent::IndicatorShown { .. } => "...".to_string(),
        WidgetEvent::IndicatorRemoved { .. } => return None,
        WidgetEvent::ConnectivityChanged { online: true } => "● online".to_string(),
        WidgetEvent::ConnectivityChanged { online: false } => "● offline".to_string(),
        WidgetEvent::VisibilityChanged { open } => {
            format!("chat window {}", if *open { "opened" } else { "closed" })
        }
        WidgetEvent::ThemeChanged => "theme updated".to_string(),
    };

    if !use_color {
        return Some(line);
    }
    Some(match event {
        WidgetEvent::ConnectivityChanged { online: true } => line.green().to_string(),
        WidgetEvent::ConnectivityChanged { online: false } => line.red().to_string(),
        _ => line.dimmed().to_string(),
    })
}

// `2024-05-01T10:00:00.123Z` -> `10:00:00`
fn clock(timestamp: &str) -> &str {
    timestamp
        .split_once('T')
        .and_then(|(_, time)| time.get(..8))
        .unwrap_or(timestamp)
}
