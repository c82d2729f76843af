//! The set of recognized settings.
//!
//! [`SettingsRegistry`] declares every `windowsTerminal.*` setting as a typed
//! [`Entry`] or [`MapEntry`]. Build it once at startup and pass it by
//! reference to whatever needs settings.

use crate::change::ConfigurationChangeEvent;
use crate::entry::{Entry, SettingValue};
use crate::error::{ConfigError, Result};
use crate::key::SettingKey;
use crate::map_entry::{MapEntry, SettingEnum};
use crate::schema::Schema;
use crate::scope::Scope;
use crate::store::{ConfigStore, ConfigTarget};
use crate::types::{
    DirectoryPriority, DirectoryPriorityKey, StatusBarAlignment, StatusBarAlignmentKey,
    StatusBarCommand,
};
use crate::validators::non_empty_string;
use serde_json::Value;
use std::sync::Arc;

/// Namespace shared by every registered key.
pub const NAMESPACE: &str = "windowsTerminal";

/// Type-erased view of an entry, used for bulk invalidation and key-based access.
pub trait SettingHandle: Send + Sync {
    fn key(&self) -> &SettingKey;

    fn clear(&self, scope: Option<&Scope>);

    fn on_did_change_configuration(&self, affects_configuration: &dyn Fn(&str) -> bool) -> bool;

    /// Resolved value as JSON; the stored key for map entries.
    fn resolved_json(&self, scope: &Scope) -> Value;

    /// Schema default as JSON.
    fn default_json(&self) -> Value;

    /// Decode `value` as the entry's type and write it.
    fn set_json(&self, value: Value, target: ConfigTarget) -> Result<()>;

    fn reset(&self, target: ConfigTarget) -> Result<()>;
}

fn decode_for<V: SettingValue>(key: &SettingKey, value: Value) -> Result<V> {
    serde_json::from_value(value).map_err(|e| ConfigError::WriteRejected {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

impl<V: SettingValue> SettingHandle for Entry<V> {
    fn key(&self) -> &SettingKey {
        Entry::key(self)
    }

    fn clear(&self, scope: Option<&Scope>) {
        Entry::clear(self, scope);
    }

    fn on_did_change_configuration(&self, affects_configuration: &dyn Fn(&str) -> bool) -> bool {
        Entry::on_did_change_configuration(self, affects_configuration)
    }

    fn resolved_json(&self, scope: &Scope) -> Value {
        serde_json::to_value(self.get(scope)).unwrap_or(Value::Null)
    }

    fn default_json(&self) -> Value {
        serde_json::to_value(self.default_value()).unwrap_or(Value::Null)
    }

    fn set_json(&self, value: Value, target: ConfigTarget) -> Result<()> {
        let decoded = decode_for::<V>(Entry::key(self), value)?;
        self.set(decoded, target)
    }

    fn reset(&self, target: ConfigTarget) -> Result<()> {
        Entry::reset(self, target)
    }
}

impl<K: SettingEnum, V: Send + Sync + 'static> SettingHandle for MapEntry<K, V> {
    fn key(&self) -> &SettingKey {
        MapEntry::key(self)
    }

    fn clear(&self, scope: Option<&Scope>) {
        MapEntry::clear(self, scope);
    }

    fn on_did_change_configuration(&self, affects_configuration: &dyn Fn(&str) -> bool) -> bool {
        MapEntry::on_did_change_configuration(self, affects_configuration)
    }

    fn resolved_json(&self, scope: &Scope) -> Value {
        serde_json::to_value(self.get_key(scope)).unwrap_or(Value::Null)
    }

    fn default_json(&self) -> Value {
        serde_json::to_value(self.entry().default_value()).unwrap_or(Value::Null)
    }

    fn set_json(&self, value: Value, target: ConfigTarget) -> Result<()> {
        let decoded = decode_for::<K>(MapEntry::key(self), value)?;
        self.set(decoded, target)
    }

    fn reset(&self, target: ConfigTarget) -> Result<()> {
        MapEntry::reset(self, target)
    }
}

/// Every `windowsTerminal.*` setting, typed.
#[derive(Debug)]
pub struct SettingsRegistry {
    pub status_bar_text: Entry<String>,
    pub status_bar_alignment: MapEntry<StatusBarAlignmentKey, Option<StatusBarAlignment>>,
    pub status_bar_priority: Entry<i64>,
    pub status_bar_command: MapEntry<StatusBarCommand, &'static str>,
    pub settings_json_path: Entry<String>,
    pub default_profile: Entry<String>,
    pub directory_option_priority: MapEntry<DirectoryPriorityKey, DirectoryPriority>,
    pub default_directory: Entry<String>,
    pub default_options: Entry<String>,
    pub executable: Entry<String>,
}

impl SettingsRegistry {
    /// Declare every setting against `schema`, reading through `store`.
    pub fn new(schema: &Schema, store: Arc<dyn ConfigStore>) -> Result<Self> {
        let key = |section: &str| format!("{}.{}", NAMESPACE, section);

        let registry = Self {
            status_bar_text: Entry::new(&key("statusBarText"), schema, store.clone())?,
            status_bar_alignment: MapEntry::new(
                &key("statusBarAlignment"),
                schema,
                store.clone(),
                StatusBarAlignmentKey::alignment,
            )?,
            status_bar_priority: Entry::new(&key("statusBarPriority"), schema, store.clone())?,
            status_bar_command: MapEntry::new(
                &key("statusBarCommand"),
                schema,
                store.clone(),
                StatusBarCommand::label,
            )?,
            settings_json_path: Entry::new(&key("settingsJsonPath"), schema, store.clone())?,
            default_profile: Entry::new(&key("defaultProfile"), schema, store.clone())?,
            directory_option_priority: MapEntry::new(
                &key("directoryOptionPriority"),
                schema,
                store.clone(),
                DirectoryPriorityKey::priority,
            )?,
            default_directory: Entry::new(&key("defaultDirectory"), schema, store.clone())?,
            default_options: Entry::new(&key("defaultOptions"), schema, store.clone())?,
            executable: Entry::with_validator(&key("executable"), schema, store, non_empty_string)?,
        };

        log::debug!("Settings registry built with {} entries", registry.entries().len());
        Ok(registry)
    }

    /// Registry over the packaged schema.
    pub fn builtin(store: Arc<dyn ConfigStore>) -> Result<Self> {
        Self::new(&Schema::builtin()?, store)
    }

    /// All entries, in declaration order.
    pub fn entries(&self) -> Vec<&dyn SettingHandle> {
        let entries: [&dyn SettingHandle; 10] = [
            &self.status_bar_text,
            &self.status_bar_alignment,
            &self.status_bar_priority,
            &self.status_bar_command,
            &self.settings_json_path,
            &self.default_profile,
            &self.directory_option_priority,
            &self.default_directory,
            &self.default_options,
            &self.executable,
        ];
        entries.to_vec()
    }

    /// Entry registered under the dotted `key`.
    pub fn entry(&self, key: &str) -> Option<&dyn SettingHandle> {
        self.entries()
            .into_iter()
            .find(|entry| entry.key().as_str() == key)
    }

    /// Drop every cached value.
    pub fn clear_all(&self) {
        for entry in self.entries() {
            entry.clear(None);
        }
    }

    /// Forward a change event to every entry.
    ///
    /// Returns whether any entry was invalidated.
    pub fn on_did_change_configuration(&self, event: &ConfigurationChangeEvent) -> bool {
        let affects = |key: &str| event.affects_configuration(key);
        let mut any = false;
        for entry in self.entries() {
            any |= entry.on_did_change_configuration(&affects);
        }
        if any {
            log::info!("Settings changed, cached values invalidated");
        }
        any
    }
}
