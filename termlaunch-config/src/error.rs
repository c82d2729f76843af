//! Typed error variants for the termlaunch-config crate.
//!
//! Invalid or out-of-range setting values are never errors: they are
//! recovered inside [`crate::Entry`]. The variants here cover construction
//! problems (unknown keys, broken schema) and store I/O.

use crate::store::ConfigTarget;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the schema, the settings store and entry construction.
///
/// # Example
///
/// ```rust,no_run
/// use termlaunch_config::ConfigError;
///
/// fn describe(e: &ConfigError) -> &'static str {
///     match e {
///         ConfigError::UnknownKey(_) | ConfigError::InvalidKey(_) => "bad key",
///         ConfigError::Io { .. } | ConfigError::Parse { .. } => "settings file",
///         _ => "other",
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key is not declared in the static schema.
    #[error("Unknown setting key '{0}'")]
    UnknownKey(String),

    /// The key has no `namespace.section` shape.
    #[error("Malformed setting key '{0}': expected '<namespace>.<section>'")]
    InvalidKey(String),

    /// A schema default or bound could not be decoded as the entry's type.
    #[error("Schema value for '{key}' does not match the declared type: {source}")]
    Schema {
        /// Key whose schema record is broken.
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The schema document itself is not valid JSON.
    #[error("Schema document parse error: {0}")]
    SchemaDocument(#[source] serde_json::Error),

    /// A settings file could not be read or written.
    #[error("I/O error on settings file '{}': {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings file contained invalid JSON or YAML.
    #[error("Parse error in settings file '{}': {message}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The requested write target has no layer in the store.
    #[error("No settings layer configured for target {0:?}")]
    NoLayer(ConfigTarget),

    /// The store refused the update.
    #[error("Update of '{key}' rejected: {reason}")]
    WriteRejected {
        /// Dotted key being written.
        key: String,
        /// Store-specific reason.
        reason: String,
    },
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ConfigError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
