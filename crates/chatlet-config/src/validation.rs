// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as required identifiers, URL schemes, and positive limits.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::ChatletConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChatletConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Required keys. Defaults are empty so a missing key lands here.
    if config.widget.customer_id.trim().is_empty() {
        errors.push(ConfigError::MissingKey {
            key: "widget.customer_id".to_string(),
        });
    }

    let api_url = config.widget.api_url.trim();
    if api_url.is_empty() {
        errors.push(ConfigError::MissingKey {
            key: "widget.api_url".to_string(),
        });
    } else if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        errors.push(ConfigError::validation(
            "widget.api_url",
            "must start with http:// or https://",
        ));
    }

    if config.upload.max_file_size == 0 {
        errors.push(ConfigError::validation(
            "upload.max_file_size",
            "must be greater than 0",
        ));
    }

    if config.upload.allowed_file_types.is_empty() {
        errors.push(ConfigError::validation(
            "upload.allowed_file_types",
            "must list at least one MIME type",
        ));
    }

    let mut seen_types = HashSet::new();
    for mime in &config.upload.allowed_file_types {
        if !is_mime_type(mime) {
            errors.push(
                ConfigError::validation(
                    "upload.allowed_file_types",
                    format!("`{mime}` is not a type/subtype"),
                )
                .with_entry(mime.as_str()),
            );
        } else if !seen_types.insert(mime.to_ascii_lowercase()) {
            errors.push(
                ConfigError::validation(
                    "upload.allowed_file_types",
                    format!("duplicate MIME type `{mime}`"),
                )
                .with_entry(mime.as_str()),
            );
        }
    }

    for (key, value) in config.theme.entries() {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(
                format!("theme.{key}"),
                "must not be empty",
            ));
        }
    }

    if config.transport.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "transport.timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.presence.probe_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "presence.probe_interval_secs",
            "must be greater than 0",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path",
            "must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_mime_type(value: &str) -> bool {
    match value.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !value.contains(char::is_whitespace)
                && !subtype.contains('/')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ChatletConfig {
        let mut config = ChatletConfig::default();
        config.widget.customer_id = "c1".to_string();
        config.widget.api_url = "https://support.example.com/api".to_string();
        config
    }

    #[test]
    fn minimal_config_validates() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn defaults_are_missing_required_keys() {
        let errors = validate_config(&ChatletConfig::default()).unwrap_err();
        let missing: Vec<_> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::MissingKey { key } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["widget.customer_id", "widget.api_url"]);
    }

    fn keys(errors: &[ConfigError]) -> Vec<&str> {
        errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::Validation { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn api_url_without_scheme_fails_validation() {
        let mut config = valid_config();
        config.widget.api_url = "support.example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(keys(&errors), vec!["widget.api_url"]);
    }

    #[test]
    fn zero_max_file_size_fails_validation() {
        let mut config = valid_config();
        config.upload.max_file_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(keys(&errors), vec!["upload.max_file_size"]);
    }

    #[test]
    fn malformed_mime_type_fails_validation() {
        let mut config = valid_config();
        config.upload.allowed_file_types = vec!["image/png".into(), "pdf".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ConfigError::Validation { key, entry: Some(entry), message, .. }
                if key == "upload.allowed_file_types" && entry == "pdf" && message.contains("`pdf`")
        ));
    }

    #[test]
    fn duplicate_mime_type_fails_validation() {
        let mut config = valid_config();
        config.upload.allowed_file_types = vec!["image/png".into(), "IMAGE/PNG".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { entry: Some(entry), message, .. }
                if entry == "IMAGE/PNG" && message.contains("duplicate")
        )));
    }

    #[test]
    fn empty_theme_value_fails_validation() {
        let mut config = valid_config();
        config.theme.primary = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(keys(&errors), vec!["theme.primary"]);
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = valid_config();
        config.transport.timeout_secs = 0;
        config.presence.probe_interval_secs = 0;
        config.storage.database_path = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
