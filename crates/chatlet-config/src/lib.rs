// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Chatlet widget.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `CHATLET_*` environment variable overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use chatlet_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("customer: {}", config.widget.customer_id);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError, ConfigSources};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ChatletConfig, ThemeConfig, ThemeOverrides, WidgetPosition};

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On any error: points miette diagnostics at the TOML files involved
pub fn load_and_validate() -> Result<ChatletConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<ChatletConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        let mut sources = ConfigSources::new();
        if let Ok(content) = std::fs::read_to_string(path) {
            sources.push(path.display().to_string(), content);
        }
        sources
    })
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<ChatletConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        ConfigSources::inline(toml_content)
    })
}

// Sources are only read back when there is something to point at.
fn finish(
    loaded: Result<ChatletConfig, figment::Error>,
    sources: impl FnOnce() -> ConfigSources,
) -> Result<ChatletConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => match validation::validate_config(&config) {
            Ok(()) => Ok(config),
            Err(errors) => Err(diagnostic::locate_validation_errors(errors, &sources())),
        },
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Reads the TOML files of the lookup hierarchy, highest precedence first.
fn collect_toml_sources() -> ConfigSources {
    let mut sources = ConfigSources::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_FILE) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_FILE).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.to_string());
        sources.push(path, content);
    }

    if let Some(path) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&path)
    {
        sources.push(path.display().to_string(), content);
    }

    if let Ok(content) = std::fs::read_to_string(loader::SYSTEM_CONFIG_PATH) {
        sources.push(loader::SYSTEM_CONFIG_PATH, content);
    }

    sources
}
