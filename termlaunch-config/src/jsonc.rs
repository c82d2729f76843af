//! Settings document parsing.
//!
//! Editor-style settings files are JSON with whole-line `//` comments. YAML
//! documents are accepted too, selected by file extension.

use crate::error::{ConfigError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::LazyLock;

/// Matches a line holding only a `//` comment.
static LINE_COMMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*//.*$").expect("line comment regex is a compile-time constant")
});

/// Remove whole-line `//` comments. Trailing comments after values are kept
/// because they may sit inside string literals.
pub fn strip_line_comments(source: &str) -> String {
    LINE_COMMENT_PATTERN.replace_all(source, "").into_owned()
}

/// Parse JSON with whole-line comments into a value.
pub fn parse_jsonc(source: &str) -> std::result::Result<Value, serde_json::Error> {
    serde_json::from_str(&strip_line_comments(source))
}

/// Parse a settings document at `path` into a JSON object.
///
/// Empty files (or files holding only comments) yield an empty object.
pub fn parse_settings_document(path: &Path, source: &str) -> Result<Map<String, Value>> {
    let value: Value = if is_yaml(path) {
        if source.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml_ng::from_str(source).map_err(|e| ConfigError::parse(path, e))?
        }
    } else {
        let stripped = strip_line_comments(source);
        if stripped.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&stripped).map_err(|e| ConfigError::parse(path, e))?
        }
    };

    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::parse(
            path,
            format!("expected an object at the top level, found {}", type_name(&other)),
        )),
    }
}

/// Render a settings document for `path`, YAML or pretty JSON by extension.
pub fn render_settings_document(path: &Path, document: &Map<String, Value>) -> Result<String> {
    if is_yaml(path) {
        serde_yaml_ng::to_string(document).map_err(|e| ConfigError::parse(path, e))
    } else {
        serde_json::to_string_pretty(document)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ConfigError::parse(path, e))
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
