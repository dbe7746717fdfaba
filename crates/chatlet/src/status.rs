// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatlet status` command implementation.
//!
//! Shows the resolved widget settings, the storage location with its saved
//! message count, and whether the backend answers a health probe.

use std::io::IsTerminal;

use chatlet_config::ChatletConfig;
use chatlet_core::{ChatletError, CustomerId, HealthStatus, PluginAdapter};
use chatlet_storage::{load_history, SqliteStore};
use chatlet_transport::HttpTransport;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub customer_id: String,
    pub api_url: String,
    pub position: String,
    pub backend_reachable: bool,
    pub backend_status: String,
    pub database_path: String,
    pub saved_messages: Option<usize>,
}

/// Human-readable form of a health probe result.
fn describe_health(health: &HealthStatus) -> String {
    match health {
        HealthStatus::Healthy => "reachable".to_string(),
        HealthStatus::Degraded(reason) => format!("reachable ({reason})"),
        HealthStatus::Unhealthy(reason) => format!("unreachable ({reason})"),
    }
}

/// Run the `chatlet status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(config: &ChatletConfig, json: bool, plain: bool) -> Result<(), ChatletError> {
    let transport = HttpTransport::from_config(config)?;
    let health = transport
        .health_check()
        .await
        .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));

    // A missing or locked database is reported, not fatal.
    let customer = CustomerId::from(config.widget.customer_id.trim());
    let saved_messages = match SqliteStore::from_config(&config.storage) {
        Ok(store) => Some(load_history(&store, &customer).len()),
        Err(e) => {
            tracing::warn!(error = %e, "could not open history database");
            None
        }
    };

    let response = StatusResponse {
        customer_id: customer.to_string(),
        api_url: transport.api_url().to_string(),
        position: config.widget.position.to_string(),
        backend_reachable: health.is_reachable(),
        backend_status: describe_health(&health),
        database_path: config.storage.database_path.clone(),
        saved_messages,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, use_color);
    }

    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  chatlet status");
    println!("  {}", "-".repeat(35));
    println!("    Customer: {}", status.customer_id);
    println!("    Position: {}", status.position);

    if use_color {
        use colored::Colorize;
        let marker = if status.backend_reachable {
            format!("{} {}", "✓".green(), status.backend_status.green())
        } else {
            format!("{} {}", "✗".red(), status.backend_status.red())
        };
        println!("    Backend:  {marker}");
    } else {
        let marker = if status.backend_reachable { "[OK]" } else { "[FAIL]" };
        println!("    Backend:  {marker} {}", status.backend_status);
    }
    println!("    Endpoint: {}", status.api_url);

    match status.saved_messages {
        Some(count) => println!("    Storage:  {} ({count} saved messages)", status.database_path),
        None => println!("    Storage:  {} (unavailable)", status.database_path),
    }
    println!();
}
