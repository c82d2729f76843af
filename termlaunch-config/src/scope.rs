//! Configuration scopes.
//!
//! A scope selects which layer of overrides a read consults. `Global` is the
//! plain settings view; `Named("python")` is the `[python]` language overlay.

use std::fmt;

/// Sub-context under which a setting may be overridden.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Scope {
    /// The unscoped settings view.
    #[default]
    Global,
    /// A language (or other) overlay, e.g. `Named("python")`.
    Named(String),
}

impl Scope {
    /// Build a scope from an identifier; empty strings mean `Global`.
    pub fn named(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            Self::Global
        } else {
            Self::Named(id)
        }
    }

    /// Build a scope from an optional language identifier.
    pub fn from_language_id(id: Option<&str>) -> Self {
        match id {
            Some(id) => Self::named(id.trim()),
            None => Self::Global,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    /// The overlay section name, e.g. `[python]`. `None` for `Global`.
    pub fn overlay_section(&self) -> Option<String> {
        match self {
            Self::Global => None,
            Self::Named(id) => Some(format!("[{}]", id)),
        }
    }

    /// Parse an overlay section header such as `[python]` back into a scope.
    pub fn from_overlay_section(section: &str) -> Option<Self> {
        let inner = section.strip_prefix('[')?.strip_suffix(']')?;
        match Self::named(inner) {
            Self::Global => None,
            scope => Some(scope),
        }
    }

    /// Key used in diagnostics: `key` for `Global`, `[id].key` otherwise.
    pub fn annotate(&self, key: &str) -> String {
        match self.overlay_section() {
            Some(section) => format!("{}.{}", section, key),
            None => key.to_string(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Named(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for Scope {
    fn from(id: &str) -> Self {
        Self::named(id)
    }
}
