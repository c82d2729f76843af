//! Configuration change events.

use std::collections::BTreeSet;

/// Set of dotted keys whose effective value changed in one reload batch.
///
/// Changes inside a language overlay report the inner key, so a change to
/// `[python].windowsTerminal.defaultProfile` shows up as
/// `windowsTerminal.defaultProfile`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationChangeEvent {
    keys: BTreeSet<String>,
}

impl ConfigurationChangeEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Whether `section` (a namespace or a full dotted key) was affected.
    ///
    /// True when a changed key equals `section`, lies beneath it, or is an
    /// ancestor of it (an object-valued key replaced wholesale).
    pub fn affects_configuration(&self, section: &str) -> bool {
        self.keys.iter().any(|key| {
            key == section
                || is_dotted_prefix(section, key)
                || is_dotted_prefix(key, section)
        })
    }
}

/// `prefix` is a whole-segment prefix of `key` (`a.b` of `a.b.c`, not of `a.bc`).
fn is_dotted_prefix(prefix: &str, key: &str) -> bool {
    key.len() > prefix.len()
        && key.starts_with(prefix)
        && key.as_bytes()[prefix.len()] == b'.'
}
