//! Dotted setting keys.

use crate::error::{ConfigError, Result};
use std::fmt;

/// A dotted setting identifier such as `windowsTerminal.defaultProfile`.
///
/// The part before the first dot is the application namespace; the rest is
/// the section path inside that namespace. The store is addressed with both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingKey {
    key: String,
    split: usize,
}

impl SettingKey {
    /// Parse a key, requiring a non-empty namespace and section.
    pub fn parse(key: &str) -> Result<Self> {
        match key.find('.') {
            Some(split) if split > 0 && split + 1 < key.len() => Ok(Self {
                key: key.to_string(),
                split,
            }),
            _ => Err(ConfigError::InvalidKey(key.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Namespace prefix, e.g. `windowsTerminal`.
    pub fn application_key(&self) -> &str {
        &self.key[..self.split]
    }

    /// Remainder after the namespace, e.g. `defaultProfile`.
    pub fn section(&self) -> &str {
        &self.key[self.split + 1..]
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for SettingKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
