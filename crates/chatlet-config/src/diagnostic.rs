// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Turns figment extraction failures and validation results into
//! [`ConfigError`]s that point at the offending line of `chatlet.toml`,
//! name the `CHATLET_*` variable that could supply a missing key, and carry
//! help text for the section the key belongs to.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One configuration problem, renderable with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A top-level `[section]` chatlet does not read.
    #[error("unknown section `[{section}]`")]
    #[diagnostic(
        code(chatlet::config::unknown_section),
        help("{}", unknown_help("sections", suggestion.as_deref(), valid_sections))
    )]
    UnknownSection {
        section: String,
        suggestion: Option<String>,
        valid_sections: String,
        #[label("chatlet does not read this section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key that its section does not define.
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(chatlet::config::unknown_key),
        help("{}", unknown_help("keys", suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        section: String,
        key: String,
        /// Closest valid key, if any is close enough.
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a [{section}] key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type, e.g. a string for `max_file_size`.
    #[error("`{key}` has the wrong type: found {found}, expected {expected}")]
    #[diagnostic(code(chatlet::config::invalid_type), help("{}", section_help(key)))]
    InvalidType {
        /// Dotted key, e.g. `upload.max_file_size`.
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required key that no source supplied.
    #[error("missing required key `{key}`")]
    #[diagnostic(code(chatlet::config::missing_key), help("{}", missing_key_help(key)))]
    MissingKey {
        /// Dotted key, e.g. `widget.customer_id`.
        key: String,
    },

    /// A well-typed value chatlet cannot work with.
    #[error("invalid `{key}`: {message}")]
    #[diagnostic(code(chatlet::config::validation), help("{}", section_help(key)))]
    Validation {
        /// Dotted key, e.g. `widget.api_url`.
        key: String,
        message: String,
        /// The list entry at fault, for list-valued keys.
        entry: Option<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("configuration error: {0}")]
    #[diagnostic(code(chatlet::config::other))]
    Other(String),
}

impl ConfigError {
    /// A validation failure not yet tied to a source location.
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            key: key.into(),
            message: message.into(),
            entry: None,
            span: None,
            src: None,
        }
    }

    /// Narrows a validation failure to one entry of a list value.
    pub fn with_entry(self, value: impl Into<String>) -> Self {
        match self {
            ConfigError::Validation {
                key,
                message,
                span,
                src,
                ..
            } => ConfigError::Validation {
                key,
                message,
                entry: Some(value.into()),
                span,
                src,
            },
            other => other,
        }
    }

    /// The source span, when the error could be located.
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            ConfigError::UnknownSection { span, .. }
            | ConfigError::UnknownKey { span, .. }
            | ConfigError::InvalidType { span, .. }
            | ConfigError::Validation { span, .. } => *span,
            ConfigError::MissingKey { .. } | ConfigError::Other(_) => None,
        }
    }
}

fn unknown_help(what: &str, suggestion: Option<&str>, valid: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid {what}: {valid}"),
        None => format!("valid {what}: {valid}"),
    }
}

/// The environment variable the loader maps onto a dotted key.
pub fn env_var_for(key: &str) -> String {
    format!("CHATLET_{}", key.replace('.', "_").to_ascii_uppercase())
}

fn missing_key_help(key: &str) -> String {
    match key.split_once('.') {
        Some((section, field)) => format!(
            "set `{field}` under [{section}] in chatlet.toml, or export {}",
            env_var_for(key)
        ),
        None => format!("set `{key}` in chatlet.toml, or export {}", env_var_for(key)),
    }
}

fn section_help(key: &str) -> &'static str {
    match key.split('.').next().unwrap_or_default() {
        "widget" => {
            "[widget] needs a customer_id and an absolute api_url, e.g. https://support.example.com/api"
        }
        "upload" => {
            "max_file_size is in bytes; allowed_file_types lists MIME types such as \"image/png\""
        }
        "theme" => "theme values are CSS values such as \"#0084ff\" or \"14px\"",
        "notices" => "notices are the texts shown in the conversation when something fails",
        "transport" => "timeout_secs is a whole number of seconds greater than 0",
        "presence" => "probe_interval_secs is a whole number of seconds greater than 0",
        "storage" => "database_path is a file path; wal_mode is true or false",
        _ => "see `chatlet config` for every section and its current values",
    }
}

/// TOML texts the configuration was read from, highest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    files: Vec<(String, String)>,
}

/// What to point at inside a TOML text.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Section(&'a str),
    Key {
        section: &'a str,
        key: &'a str,
    },
    Value {
        section: &'a str,
        key: &'a str,
        entry: Option<&'a str>,
    },
}

impl ConfigSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single unnamed text, as passed to `load_and_validate_str`.
    pub fn inline(content: &str) -> Self {
        let mut sources = Self::new();
        sources.push("<inline>", content);
        sources
    }

    pub fn push(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.push((name.into(), content.into()));
    }

    /// Locates `target`, trying `preferred` (the file figment blamed) first.
    fn find(
        &self,
        preferred: Option<&str>,
        target: Target<'_>,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let ordered = self
            .files
            .iter()
            .filter(|(name, _)| Some(name.as_str()) == preferred)
            .chain(
                self.files
                    .iter()
                    .filter(|(name, _)| Some(name.as_str()) != preferred),
            );

        for (name, content) in ordered {
            if let Some((offset, len)) = locate(content, target) {
                let span = SourceSpan::new(offset.into(), len);
                return (Some(span), Some(NamedSource::new(name, content.clone())));
            }
        }
        (None, None)
    }
}

/// Byte offset and length of `target` in `content`.
///
/// Understands `[section]` headers, `key = value` lines and arrays that span
/// several lines. Keys before the first header are top-level.
fn locate(content: &str, target: Target<'_>) -> Option<(usize, usize)> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if let Some(header) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.split_once(']'))
            .map(|(name, _)| name.trim())
        {
            if matches!(target, Target::Section(name) if name == header) {
                return Some((line_start + indent, header.len() + 2));
            }
            current = Some(header);
            continue;
        }

        let (section, key) = match target {
            Target::Section(_) => continue,
            Target::Key { section, key } | Target::Value { section, key, .. } => (section, key),
        };
        if current != Some(section) {
            continue;
        }
        let Some((name, _)) = trimmed.split_once('=') else {
            continue;
        };
        if name.trim() != key {
            continue;
        }

        let key_start = line_start + indent;
        let Target::Value { entry, .. } = target else {
            return Some((key_start, key.len()));
        };

        let eq = key_start + trimmed.find('=')? + 1;
        let after_eq = &content[eq..];
        let value_start = eq + (after_eq.len() - after_eq.trim_start().len());
        let value_end = value_end(content, value_start);

        if let Some(entry) = entry {
            let quoted = format!("\"{entry}\"");
            if let Some(pos) = content[value_start..value_end].find(&quoted) {
                return Some((value_start + pos, quoted.len()));
            }
        }
        return Some((value_start, value_end - value_start));
    }
    None
}

// End of a value: the matching `]` for arrays, otherwise the end of the line.
fn value_end(content: &str, value_start: usize) -> usize {
    let rest = &content[value_start..];
    if rest.starts_with('[') {
        if let Some(close) = rest.find(']') {
            return value_start + close + 1;
        }
    }
    let line = rest.split('\n').next().unwrap_or_default();
    value_start + line.trim_end().len()
}

fn blamed_file(error: &figment::Error) -> Option<String> {
    error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        })
}

/// Converts every error inside a `figment::Error` into a [`ConfigError`].
pub fn figment_to_config_errors(err: figment::Error, sources: &ConfigSources) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let preferred = blamed_file(&error);
            let preferred = preferred.as_deref();
            let path = &error.path;

            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let suggestion = suggest_key(field, expected);
                    match path.first() {
                        None => {
                            let (span, src) = sources.find(preferred, Target::Section(field));
                            ConfigError::UnknownSection {
                                section: field.clone(),
                                suggestion,
                                valid_sections: expected.join(", "),
                                span,
                                src,
                            }
                        }
                        Some(section) => {
                            let (span, src) = sources.find(
                                preferred,
                                Target::Key {
                                    section,
                                    key: field,
                                },
                            );
                            ConfigError::UnknownKey {
                                section: section.clone(),
                                key: field.clone(),
                                suggestion,
                                valid_keys: expected.join(", "),
                                span,
                                src,
                            }
                        }
                    }
                }
                Kind::MissingField(field) => {
                    let mut key = path.join(".");
                    if !key.is_empty() {
                        key.push('.');
                    }
                    key.push_str(field);
                    ConfigError::MissingKey { key }
                }
                Kind::InvalidType(found, expected) => {
                    let (span, src) = match path.as_slice() {
                        [section, key] => sources.find(
                            preferred,
                            Target::Value {
                                section,
                                key,
                                entry: None,
                            },
                        ),
                        _ => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: found.to_string(),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Attaches source spans to validation errors that can be found in `sources`.
pub fn locate_validation_errors(
    errors: Vec<ConfigError>,
    sources: &ConfigSources,
) -> Vec<ConfigError> {
    errors
        .into_iter()
        .map(|error| match error {
            ConfigError::Validation {
                key,
                message,
                entry,
                span: None,
                ..
            } => {
                let (span, src) = match key.split_once('.') {
                    Some((section, field)) => sources.find(
                        None,
                        Target::Value {
                            section,
                            key: field,
                            entry: entry.as_deref(),
                        },
                    ),
                    None => (None, None),
                };
                ConfigError::Validation {
                    key,
                    message,
                    entry,
                    span,
                    src,
                }
            }
            other => other,
        })
        .collect()
}

/// Best "did you mean" candidate for an unknown key, by Jaro-Winkler similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Renders every error with miette's graphical handler, followed by a count.
pub fn render_to_string(errors: &[ConfigError]) -> String {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        let diagnostic: &dyn Diagnostic = error;
        let mut buf = String::new();
        match handler.render_report(&mut buf, diagnostic) {
            Ok(()) => out.push_str(&buf),
            Err(_) => out.push_str(&format!("Error: {error}\n")),
        }
    }
    match errors.len() {
        0 | 1 => {}
        n => out.push_str(&format!("chatlet: {n} configuration problems\n")),
    }
    out
}

/// Prints [`render_to_string`] to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_to_string(errors));
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = "\
[widget]
customer_id = \"c1\"
api_url = \"ftp://support.example.com\"

[upload]
allowed_file_types = [
    \"image/png\",
    \"pdf\",
]
";

    fn spanned<'a>(content: &'a str, target: Target<'_>) -> Option<&'a str> {
        locate(content, target).map(|(offset, len)| &content[offset..offset + len])
    }

    #[test]
    fn suggest_customer_id_for_typo() {
        let valid = &["customer_id", "api_url", "position", "title"];
        assert_eq!(suggest_key("custmer_id", valid), Some("customer_id".to_string()));
    }

    #[test]
    fn suggest_max_file_size_for_typo() {
        let valid = &["max_file_size", "allowed_file_types"];
        assert_eq!(suggest_key("max_filesize", valid), Some("max_file_size".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        assert_eq!(suggest_key("zzzzzz", &["customer_id", "api_url"]), None);
    }

    #[test]
    fn locates_key_only_inside_its_section() {
        let content = "[theme]\nprimary = \"#fff\"\n\n[widget]\ncustmer_id = \"c1\"\n";
        let target = Target::Key {
            section: "widget",
            key: "custmer_id",
        };
        assert_eq!(spanned(content, target), Some("custmer_id"));

        let wrong_section = Target::Key {
            section: "widget",
            key: "primary",
        };
        assert_eq!(spanned(content, wrong_section), None);
    }

    #[test]
    fn key_prefix_is_not_a_match() {
        let content = "[widget]\ntitle_text = \"x\"\n";
        let target = Target::Key {
            section: "widget",
            key: "title",
        };
        assert_eq!(spanned(content, target), None);
    }

    #[test]
    fn locates_section_header() {
        let content = "[widget]\ncustomer_id = \"c1\"\n\n  [logging]\nlevel = 1\n";
        assert_eq!(spanned(content, Target::Section("logging")), Some("[logging]"));
    }

    #[test]
    fn value_span_covers_scalar() {
        let target = Target::Value {
            section: "widget",
            key: "api_url",
            entry: None,
        };
        assert_eq!(spanned(TOML, target), Some("\"ftp://support.example.com\""));
    }

    #[test]
    fn value_span_narrows_to_list_entry_across_lines() {
        let target = Target::Value {
            section: "upload",
            key: "allowed_file_types",
            entry: Some("pdf"),
        };
        assert_eq!(spanned(TOML, target), Some("\"pdf\""));
    }

    #[test]
    fn validation_errors_gain_spans() {
        let errors = vec![
            ConfigError::validation("widget.api_url", "must start with http:// or https://"),
            ConfigError::validation("storage.database_path", "must not be empty"),
        ];
        let located = locate_validation_errors(errors, &ConfigSources::inline(TOML));
        assert!(located[0].span().is_some());
        assert!(located[1].span().is_none());
    }

    #[test]
    fn missing_key_help_names_env_var() {
        assert_eq!(env_var_for("widget.customer_id"), "CHATLET_WIDGET_CUSTOMER_ID");
        let error = ConfigError::MissingKey {
            key: "widget.customer_id".to_string(),
        };
        let help = error.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("under [widget]"), "got: {help}");
        assert!(help.contains("CHATLET_WIDGET_CUSTOMER_ID"), "got: {help}");
    }

    #[test]
    fn validation_help_is_per_section() {
        let theme = ConfigError::validation("theme.primary", "must not be empty");
        let transport = ConfigError::validation("transport.timeout_secs", "must be greater than 0");
        let theme_help = theme.help().map(|h| h.to_string()).unwrap_or_default();
        let transport_help = transport.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(theme_help.contains("CSS"));
        assert!(transport_help.contains("seconds"));
    }

    #[test]
    fn render_counts_multiple_errors() {
        let errors = vec![
            ConfigError::validation("transport.timeout_secs", "must be greater than 0"),
            ConfigError::validation("presence.probe_interval_secs", "must be greater than 0"),
        ];
        let rendered = render_to_string(&errors);
        assert!(rendered.contains("transport.timeout_secs"));
        assert!(rendered.contains("2 configuration problems"));
    }
}
