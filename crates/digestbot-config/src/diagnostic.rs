// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration errors and their terminal rendering.
//!
//! Figment reports an unknown key or a mistyped value together with the
//! section it was found in. [`from_figment`] points each one at its line in
//! `digestbot.toml` and, for unknown keys, suggests the closest key that
//! section accepts.

#![allow(unused_assignments)] // miette's Diagnostic derive

use std::path::Path;

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Keys each `digestbot.toml` section accepts. `""` is the top level.
const SECTION_KEYS: &[(&str, &[&str])] = &[
    ("", &["agent", "storage", "timers"]),
    ("agent", &["name", "log_level"]),
    ("storage", &["database_path", "wal_mode"]),
    (
        "timers",
        &[
            "overdue_minutes",
            "poll_interval_secs",
            "wait_slack_secs",
            "wake_buffer_secs",
            "recovery_interval_secs",
            "request_timeout_secs",
            "max_timers_per_user",
            "min_frequency_secs",
        ],
    ),
];

/// Jaro-Winkler score a key must reach to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Name under which [`crate::load_and_validate_str`] registers its input.
pub(crate) const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section))]
    #[diagnostic(
        code(digestbot::config::unknown_key),
        help("{}", unknown_key_help(section, suggestion.as_deref()))
    )]
    UnknownKey {
        /// Section the key appeared in, `""` for the top level.
        section: String,
        key: String,
        suggestion: Option<String>,
        #[label("not a digestbot setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(digestbot::config::invalid_type))]
    InvalidType {
        /// Dotted path, e.g. `timers.max_timers_per_user`.
        key: String,
        detail: String,
        #[label("this value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("validation error: {message}")]
    #[diagnostic(code(digestbot::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(digestbot::config::other))]
    Other(String),
}

/// A TOML document the configuration was read from.
#[derive(Debug, Clone)]
pub struct TomlSource {
    pub path: String,
    pub text: String,
}

/// The keys `section` accepts, empty for a section digestbot does not have.
pub fn section_keys(section: &str) -> &'static [&'static str] {
    SECTION_KEYS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// The accepted key of `section` closest to `unknown`, if any is close enough.
pub fn suggest_key(section: &str, unknown: &str) -> Option<&'static str> {
    section_keys(section)
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key)
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(section: &str, suggestion: Option<&str>) -> String {
    let accepted = format!(
        "{} accepts: {}",
        section_label(section),
        section_keys(section).join(", ")
    );
    match suggestion {
        Some(key) => format!("did you mean `{key}`? {accepted}"),
        None => accepted,
    }
}

/// Convert every error inside a `figment::Error` into a [`ConfigError`].
pub fn from_figment(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let source = source_of(&error, sources);
            match &error.kind {
                Kind::UnknownField(key, _) => {
                    let section = error.path.first().cloned().unwrap_or_default();
                    let (span, src) = locate(source, &section, key);
                    ConfigError::UnknownKey {
                        suggestion: suggest_key(&section, key).map(str::to_string),
                        section,
                        key: key.clone(),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (span, src) = match error.path.as_slice() {
                        [section, key] => locate(source, section, key),
                        _ => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: error.path.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn source_of<'a>(error: &figment::Error, sources: &'a [TomlSource]) -> Option<&'a TomlSource> {
    let metadata = error.metadata.as_ref()?;
    match metadata.source.as_ref().and_then(|s| s.file_path()) {
        Some(file) => sources.iter().find(|s| Path::new(&s.path) == file),
        None if metadata.name.contains("source string") => {
            sources.iter().find(|s| s.path == INLINE_SOURCE)
        }
        None => None,
    }
}

fn locate(
    source: Option<&TomlSource>,
    section: &str,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(source) = source else {
        return (None, None);
    };
    match key_offset(&source.text, section, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(&source.path, source.text.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key` inside `[section]`.
///
/// For the top level (`section == ""`) a key is either a plain assignment
/// before the first header or a `[key]` header itself.
pub fn key_offset(text: &str, section: &str, key: &str) -> Option<usize> {
    let mut current = "";
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start().len();

        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            current = header.trim();
            if section.is_empty() && current == key {
                return line.find(key).map(|at| offset + at);
            }
        } else if current == section
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + indent);
        }

        offset += line.len();
    }

    None
}

/// Print each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
