// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Chatlet widget.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Default upload size limit: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Top-level Chatlet configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional except the two required
/// keys in `[widget]`, which validation enforces.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatletConfig {
    /// Widget identity, backend location, and copy.
    #[serde(default)]
    pub widget: WidgetConfig,

    /// File upload limits.
    #[serde(default)]
    pub upload: UploadConfig,

    /// Color and typography overrides.
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Localized strings for locally generated error messages.
    #[serde(default)]
    pub notices: NoticeConfig,

    /// HTTP transport settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Connectivity probe settings.
    #[serde(default)]
    pub presence: PresenceConfig,

    /// Durable storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where the widget is anchored on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

/// Widget identity and copy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetConfig {
    /// Opaque customer identifier. Required.
    #[serde(default)]
    pub customer_id: String,

    /// Base URL of the chat backend, e.g. `https://support.example.com/api`. Required.
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub position: WidgetPosition,

    /// Title shown in the widget header.
    #[serde(default = "default_title")]
    pub title: String,

    /// Shown when there is no history yet. Never persisted.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            customer_id: String::new(),
            api_url: String::new(),
            position: WidgetPosition::default(),
            title: default_title(),
            welcome_message: default_welcome_message(),
            log_level: default_log_level(),
        }
    }
}

fn default_title() -> String {
    "چت آنلاین".to_string()
}

fn default_welcome_message() -> String {
    "سلام! چطور می‌توانم کمکتان کنم؟".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// File upload limits, checked before any request is made.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// MIME allow-list.
    #[serde(default = "default_allowed_file_types")]
    pub allowed_file_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_file_types: default_allowed_file_types(),
        }
    }
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_allowed_file_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
    ]
}

/// Color and typography values. Each one defaults independently.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_secondary")]
    pub secondary: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_error")]
    pub error: String,
    #[serde(default = "default_success")]
    pub success: String,
    #[serde(default = "default_font_size")]
    pub font_size: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_border_radius")]
    pub border_radius: String,
    #[serde(default = "default_box_shadow")]
    pub box_shadow: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            background: default_background(),
            text: default_text(),
            error: default_error(),
            success: default_success(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            border_radius: default_border_radius(),
            box_shadow: default_box_shadow(),
        }
    }
}

impl ThemeConfig {
    /// Applies every override that is set, leaving the rest untouched.
    pub fn merge(&mut self, overrides: ThemeOverrides) {
        let ThemeOverrides {
            primary,
            secondary,
            background,
            text,
            error,
            success,
            font_size,
            font_family,
            border_radius,
            box_shadow,
        } = overrides;

        let slots = [
            (&mut self.primary, primary),
            (&mut self.secondary, secondary),
            (&mut self.background, background),
            (&mut self.text, text),
            (&mut self.error, error),
            (&mut self.success, success),
            (&mut self.font_size, font_size),
            (&mut self.font_family, font_family),
            (&mut self.border_radius, border_radius),
            (&mut self.box_shadow, box_shadow),
        ];
        for (slot, value) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    /// Returns `(key, value)` pairs in declaration order.
    pub fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("background", self.background.as_str()),
            ("text", self.text.as_str()),
            ("error", self.error.as_str()),
            ("success", self.success.as_str()),
            ("font_size", self.font_size.as_str()),
            ("font_family", self.font_family.as_str()),
            ("border_radius", self.border_radius.as_str()),
            ("box_shadow", self.box_shadow.as_str()),
        ]
    }
}

fn default_primary() -> String {
    "#0084ff".to_string()
}

fn default_secondary() -> String {
    "#e3f2fd".to_string()
}

fn default_background() -> String {
    "#ffffff".to_string()
}

fn default_text() -> String {
    "#000000".to_string()
}

fn default_error() -> String {
    "#d32f2f".to_string()
}

fn default_success() -> String {
    "#4caf50".to_string()
}

fn default_font_size() -> String {
    "14px".to_string()
}

fn default_font_family() -> String {
    "inherit".to_string()
}

fn default_border_radius() -> String {
    "10px".to_string()
}

fn default_box_shadow() -> String {
    "0 2px 10px rgba(0,0,0,0.1)".to_string()
}

/// Partial theme update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeOverrides {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub background: Option<String>,
    pub text: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub font_size: Option<String>,
    pub font_family: Option<String>,
    pub border_radius: Option<String>,
    pub box_shadow: Option<String>,
}

impl ThemeOverrides {
    /// Builds a single-key override, e.g. from `/theme primary=#ff0000`.
    ///
    /// Returns `None` for an unknown key.
    pub fn single(key: &str, value: impl Into<String>) -> Option<Self> {
        let value = Some(value.into());
        let mut overrides = Self::default();
        match key {
            "primary" => overrides.primary = value,
            "secondary" => overrides.secondary = value,
            "background" => overrides.background = value,
            "text" => overrides.text = value,
            "error" => overrides.error = value,
            "success" => overrides.success = value,
            "font_size" => overrides.font_size = value,
            "font_family" => overrides.font_family = value,
            "border_radius" => overrides.border_radius = value,
            "box_shadow" => overrides.box_shadow = value,
            _ => return None,
        }
        Some(overrides)
    }
}

/// Localized text of locally generated `error` messages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NoticeConfig {
    /// Send attempted while offline.
    #[serde(default = "default_offline_notice")]
    pub offline: String,

    /// Connectivity dropped while the widget was open.
    #[serde(default = "default_connection_lost_notice")]
    pub connection_lost: String,

    /// Chat request failed or the backend reported a failure.
    #[serde(default = "default_send_failed_notice")]
    pub send_failed: String,

    /// Upload rejected by the MIME allow-list.
    #[serde(default = "default_unsupported_file_type_notice")]
    pub unsupported_file_type: String,

    /// Upload rejected by the size limit.
    #[serde(default = "default_file_too_large_notice")]
    pub file_too_large: String,

    /// Upload request failed.
    #[serde(default = "default_upload_failed_notice")]
    pub upload_failed: String,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            offline: default_offline_notice(),
            connection_lost: default_connection_lost_notice(),
            send_failed: default_send_failed_notice(),
            unsupported_file_type: default_unsupported_file_type_notice(),
            file_too_large: default_file_too_large_notice(),
            upload_failed: default_upload_failed_notice(),
        }
    }
}

fn default_offline_notice() -> String {
    "لطفاً اتصال اینترنت خود را بررسی کنید.".to_string()
}

fn default_connection_lost_notice() -> String {
    "اتصال به اینترنت قطع شده است.".to_string()
}

fn default_send_failed_notice() -> String {
    "متأسفانه مشکلی پیش آمده است.".to_string()
}

fn default_unsupported_file_type_notice() -> String {
    "فرمت فایل انتخاب شده پشتیبانی نمی‌شود.".to_string()
}

fn default_file_too_large_notice() -> String {
    "حجم فایل بیشتر از حد مجاز است.".to_string()
}

fn default_upload_failed_notice() -> String {
    "خطا در آپلود فایل".to_string()
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connectivity probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceConfig {
    /// Seconds between reachability checks.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

fn default_probe_interval_secs() -> u64 {
    15
}

/// Durable storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("chatlet").join("chatlet.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "chatlet.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}
