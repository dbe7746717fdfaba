// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chatlet.toml` > `~/.config/chatlet/chatlet.toml` > `/etc/chatlet/chatlet.toml`
//! with environment variable overrides via `CHATLET_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChatletConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<ChatletConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of compiled defaults.
///
/// No files and no environment are consulted. Used by tests.
pub fn load_config_from_str(toml_content: &str) -> Result<ChatletConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatletConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file (`chatlet --config <path>`) with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatletConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatletConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatlet/chatlet.toml` (system-wide)
/// 3. `<config_dir>/chatlet/chatlet.toml` (user)
/// 4. `./chatlet.toml` (local directory)
/// 5. `CHATLET_*` environment variables
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChatletConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/chatlet/chatlet.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "chatlet.toml";

/// Per-user configuration file under the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chatlet").join("chatlet.toml"))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CHATLET_WIDGET_CUSTOMER_ID` must map to `widget.customer_id`,
/// not `widget.customer.id`.
fn env_provider() -> Env {
    Env::prefixed("CHATLET_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 7] = [
        "widget",
        "upload",
        "theme",
        "notices",
        "transport",
        "presence",
        "storage",
    ];

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
