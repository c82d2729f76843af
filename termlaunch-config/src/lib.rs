//! Settings access for the termlaunch Windows Terminal launcher.
//!
//! This crate provides typed, cached, validated access to layered settings:
//!
//! - Per-scope memoization of resolved values ([`ScopeCache`])
//! - Typed accessors with validation, bounds and language overrides ([`Entry`])
//! - Accessors resolving through enum mappings ([`MapEntry`])
//! - The registry of recognized settings ([`SettingsRegistry`])
//! - A layered, file-backed settings store ([`LayeredStore`])
//! - Settings file watching for hot reload

pub mod cache;
pub mod change;
pub mod entry;
pub mod error;
pub mod jsonc;
pub mod key;
pub mod map_entry;
pub mod paths;
pub mod registry;
pub mod schema;
pub mod scope;
pub mod store;
pub mod types;
pub mod validators;
#[cfg(feature = "watcher")]
pub mod watcher;

pub use cache::ScopeCache;
pub use change::ConfigurationChangeEvent;
pub use entry::{Entry, SettingValue, Validator};
pub use error::{ConfigError, Result};
pub use key::SettingKey;
pub use map_entry::{MapEntry, SettingEnum};
pub use registry::{NAMESPACE, SettingHandle, SettingsRegistry};
pub use schema::{Schema, SettingSchema};
pub use scope::Scope;
pub use store::{ConfigStore, ConfigTarget, LayeredStore};
pub use types::{
    DirectoryPriority, DirectoryPriorityKey, StatusBarAlignment, StatusBarAlignmentKey,
    StatusBarCommand,
};
#[cfg(feature = "watcher")]
pub use watcher::{SettingsChangeEvent, SettingsWatcher};
