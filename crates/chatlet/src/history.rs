// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatlet history` command implementation.
//!
//! Prints the persisted conversation window and any saved draft for the
//! configured customer, without contacting the backend.

use std::io::IsTerminal;

use chatlet_config::ChatletConfig;
use chatlet_core::{ChatletError, CustomerId, DurableStore, Message};
use chatlet_storage::{load_draft, load_history, SqliteStore};
use serde::Serialize;

use crate::render::format_message;

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub customer_id: String,
    pub messages: Vec<Message>,
    pub draft: String,
}

impl HistoryResponse {
    pub fn load(store: &dyn DurableStore, customer: &CustomerId) -> Self {
        Self {
            customer_id: customer.to_string(),
            messages: load_history(store, customer),
            draft: load_draft(store, customer),
        }
    }
}

/// Run the `chatlet history` command.
pub fn run_history(config: &ChatletConfig, json: bool, plain: bool) -> Result<(), ChatletError> {
    let store = SqliteStore::from_config(&config.storage)?;
    let customer = CustomerId::from(config.widget.customer_id.trim());
    let response = HistoryResponse::load(&store, &customer);

    if json {
        let rendered = serde_json::to_string_pretty(&response)
            .map_err(|e| ChatletError::Internal(format!("failed to render history: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    for line in transcript_lines(&response, use_color) {
        println!("{line}");
    }
    Ok(())
}

fn transcript_lines(response: &HistoryResponse, use_color: bool) -> Vec<String> {
    if response.messages.is_empty() {
        return vec![format!("no saved messages for {}", response.customer_id)];
    }

    let mut lines: Vec<String> = response
        .messages
        .iter()
        .map(|m| format_message(m, use_color))
        .collect();
    if !response.draft.is_empty() {
        lines.push(format!("draft: {}", response.draft));
    }
    lines
}
