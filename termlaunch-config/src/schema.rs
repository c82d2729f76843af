//! Static settings schema.
//!
//! The schema declares every recognized key with its default and optional
//! numeric bounds. It is loaded once at startup and never changes; entries
//! copy what they need out of it at construction.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Packaged schema for the `windowsTerminal` namespace.
const BUILTIN_SCHEMA: &str = include_str!("../assets/schema.json");

/// Schema record for one setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SettingSchema {
    /// Declared JSON type (`string`, `integer`, ...). Informational.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Value used when the setting is absent or invalid.
    #[serde(default)]
    pub default: Value,
    /// Inclusive lower bound for numeric settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    /// Inclusive upper bound for numeric settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    /// Allowed values for enum-like settings.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SettingSchema {
    pub fn new(default: impl Into<Value>) -> Self {
        Self {
            default: default.into(),
            ..Self::default()
        }
    }

    pub fn with_minimum(mut self, minimum: impl Into<Value>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    pub fn with_maximum(mut self, maximum: impl Into<Value>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Mapping from dotted key to [`SettingSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, SettingSchema>,
}

impl Schema {
    /// An empty schema, to be filled with [`Schema::with_setting`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SCHEMA)
    }

    /// Parse a schema document of the form `{"properties": {key: {...}}}`.
    pub fn from_json(source: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(source).map_err(ConfigError::SchemaDocument)?;
        log::debug!("Loaded settings schema with {} keys", schema.properties.len());
        Ok(schema)
    }

    pub fn with_setting(mut self, key: impl Into<String>, setting: SettingSchema) -> Self {
        self.properties.insert(key.into(), setting);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SettingSchema> {
        self.properties.get(key)
    }

    /// Look up a key, failing with [`ConfigError::UnknownKey`].
    pub fn require(&self, key: &str) -> Result<&SettingSchema> {
        self.get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}
