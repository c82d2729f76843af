//! Typed, cached accessors for single settings.
//!
//! An [`Entry`] binds one schema key to a Rust type. Every read goes through
//! the regulate pipeline (validate, clamp, default) and is memoized per
//! [`Scope`] until the entry is cleared, written, or told that its key changed.

use crate::cache::ScopeCache;
use crate::error::{ConfigError, Result};
use crate::key::SettingKey;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::store::{ConfigStore, ConfigTarget};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Types an [`Entry`] can resolve to.
///
/// `PartialOrd` backs the schema bounds; it is only consulted when the schema
/// declares a `minimum` or `maximum`.
pub trait SettingValue:
    Clone + fmt::Debug + PartialOrd + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> SettingValue for T where
    T: Clone + fmt::Debug + PartialOrd + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Predicate deciding whether a decoded value is acceptable.
pub type Validator<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

/// Typed accessor for one configuration key.
pub struct Entry<V: SettingValue> {
    key: SettingKey,
    validator: Option<Validator<V>>,
    default_value: V,
    min_value: Option<V>,
    max_value: Option<V>,
    store: Arc<dyn ConfigStore>,
    cache: ScopeCache<V>,
}

impl<V: SettingValue> fmt::Debug for Entry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("default_value", &self.default_value)
            .field("min_value", &self.min_value)
            .field("max_value", &self.max_value)
            .field("has_validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl<V: SettingValue> Entry<V> {
    /// Create an entry for `key`, reading default and bounds from `schema`.
    ///
    /// # Errors
    /// Fails when the key is malformed, missing from the schema, or when the
    /// schema's default or bounds do not decode as `V`.
    pub fn new(key: &str, schema: &Schema, store: Arc<dyn ConfigStore>) -> Result<Self> {
        Self::build(key, schema, store, None)
    }

    /// Like [`Entry::new`], with a validator applied to every read.
    pub fn with_validator<F>(
        key: &str,
        schema: &Schema,
        store: Arc<dyn ConfigStore>,
        validator: F,
    ) -> Result<Self>
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        Self::build(key, schema, store, Some(Arc::new(validator)))
    }

    fn build(
        key: &str,
        schema: &Schema,
        store: Arc<dyn ConfigStore>,
        validator: Option<Validator<V>>,
    ) -> Result<Self> {
        let key = SettingKey::parse(key)?;
        let setting = schema.require(key.as_str())?;

        let default_value: V = decode_schema_value(&key, &setting.default)?;
        let min_value = setting
            .minimum
            .as_ref()
            .map(|v| decode_schema_value(&key, v))
            .transpose()?;
        let max_value = setting
            .maximum
            .as_ref()
            .map(|v| decode_schema_value(&key, v))
            .transpose()?;

        if let Some(validator) = &validator
            && !validator(&default_value)
        {
            log::warn!(
                "Schema default for \"{}\" ({:?}) does not pass its own validator",
                key,
                default_value
            );
        }

        Ok(Self {
            key,
            validator,
            default_value,
            min_value,
            max_value,
            store,
            cache: ScopeCache::new(),
        })
    }

    pub fn key(&self) -> &SettingKey {
        &self.key
    }

    /// Namespace half of the key, e.g. `windowsTerminal`.
    pub fn application_key(&self) -> &str {
        self.key.application_key()
    }

    /// Section half of the key, e.g. `defaultProfile`.
    pub fn section(&self) -> &str {
        self.key.section()
    }

    pub fn default_value(&self) -> &V {
        &self.default_value
    }

    pub fn min_value(&self) -> Option<&V> {
        self.min_value.as_ref()
    }

    pub fn max_value(&self) -> Option<&V> {
        self.max_value.as_ref()
    }

    /// Resolved value for `scope`, computed once and then served from cache.
    ///
    /// A `Named` scope without its own override resolves to the `Global` value.
    pub fn get(&self, scope: &Scope) -> V {
        self.cache.get(scope, |scope| self.resolve(scope))
    }

    /// Cached value for `scope`, without reading the store.
    pub fn get_cache(&self, scope: &Scope) -> Option<V> {
        self.cache.get_cache(scope)
    }

    /// Forget the cached value for one scope, or for all scopes.
    pub fn clear(&self, scope: Option<&Scope>) {
        self.cache.clear(scope);
    }

    /// Write `value` to the `target` layer, then drop every cached scope.
    ///
    /// A global write can change what scoped reads fall back to, so the whole
    /// cache is cleared. On failure the cache is left as it was.
    pub fn set(&self, value: V, target: ConfigTarget) -> Result<()> {
        let raw = serde_json::to_value(&value).map_err(|e| ConfigError::WriteRejected {
            key: self.key.to_string(),
            reason: e.to_string(),
        })?;
        self.write_raw(Some(raw), target)
    }

    /// Remove the value from the `target` layer so lower layers or the default apply.
    pub fn reset(&self, target: ConfigTarget) -> Result<()> {
        self.write_raw(None, target)
    }

    fn write_raw(&self, raw: Option<Value>, target: ConfigTarget) -> Result<()> {
        self.store
            .write(self.application_key(), self.section(), raw, target)?;
        self.clear(None);
        Ok(())
    }

    /// Clear the cache when `affects_configuration` reports this key as changed.
    ///
    /// Returns whether the entry was invalidated.
    pub fn on_did_change_configuration(&self, affects_configuration: &dyn Fn(&str) -> bool) -> bool {
        let affected = affects_configuration(self.key.as_str());
        if affected {
            log::debug!("Setting \"{}\" changed, clearing cache", self.key);
            self.clear(None);
        }
        affected
    }

    /// Apply the validator and schema bounds to a decoded value.
    ///
    /// Rejected values are logged under `diagnostic_key` and replaced by the
    /// default. Values outside the bounds are clamped without logging.
    pub fn regulate(&self, diagnostic_key: &str, value: V) -> V {
        if let Some(validator) = &self.validator
            && !validator(&value)
        {
            self.report_invalid(diagnostic_key, &value);
            return self.default_value.clone();
        }

        if let Some(min) = &self.min_value
            && value < *min
        {
            return min.clone();
        }
        if let Some(max) = &self.max_value
            && *max < value
        {
            return max.clone();
        }
        value
    }

    fn resolve(&self, scope: &Scope) -> V {
        let raw = self
            .store
            .read(self.application_key(), self.section(), scope);

        match (scope, raw) {
            (Scope::Global, None) => self.default_value.clone(),
            (Scope::Global, Some(raw)) => self.regulate_raw(self.key.as_str(), raw),
            (Scope::Named(_), None) => self.get(&Scope::Global),
            (Scope::Named(_), Some(raw)) => {
                self.regulate_raw(&scope.annotate(self.key.as_str()), raw)
            }
        }
    }

    /// Decode a raw store value; values of the wrong shape count as invalid.
    fn regulate_raw(&self, diagnostic_key: &str, raw: Value) -> V {
        match serde_json::from_value::<V>(raw.clone()) {
            Ok(value) => self.regulate(diagnostic_key, value),
            Err(e) => {
                log::debug!("Decoding \"{}\" failed: {}", diagnostic_key, e);
                self.report_invalid(diagnostic_key, &raw);
                self.default_value.clone()
            }
        }
    }

    // Log only; never surfaced to the user.
    fn report_invalid(&self, diagnostic_key: &str, value: &impl Serialize) {
        let shown = serde_json::to_string(value).unwrap_or_else(|_| "<unprintable>".to_string());
        log::error!(
            "\"{}\" setting value( {} ) is invalid! Please check your settings.",
            diagnostic_key,
            shown
        );
    }
}

fn decode_schema_value<V: SettingValue>(key: &SettingKey, value: &Value) -> Result<V> {
    serde_json::from_value(value.clone()).map_err(|source| ConfigError::Schema {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SettingSchema;
    use crate::store::LayeredStore;
    use serde_json::json;

    fn retry_schema() -> Schema {
        Schema::new()
            .with_setting(
                "app.retryCount",
                SettingSchema::new(3).with_minimum(0).with_maximum(10),
            )
            .with_setting("app.name", SettingSchema::new("default"))
    }

    fn store(user: Value) -> Arc<LayeredStore> {
        Arc::new(LayeredStore::new().with_json(ConfigTarget::User, user))
    }

    #[test]
    fn test_absent_value_uses_default() {
        let entry: Entry<i64> = Entry::new("app.retryCount", &retry_schema(), store(json!({})))
            .expect("entry");
        assert_eq!(entry.get(&Scope::Global), 3);
    }

    #[test]
    fn test_bounds_clamp() {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_schema(),
            store(json!({"app.retryCount": 15})),
        )
        .expect("entry");
        assert_eq!(entry.get(&Scope::Global), 10);
        assert_eq!(entry.regulate("app.retryCount", -5), 0);
        assert_eq!(entry.regulate("app.retryCount", 4), 4);
    }

    #[test]
    fn test_validator_rejection_returns_default() {
        let entry: Entry<String> = Entry::with_validator(
            "app.name",
            &retry_schema(),
            store(json!({"app.name": ""})),
            |v: &String| !v.is_empty(),
        )
        .expect("entry");
        assert_eq!(entry.get(&Scope::Global), "default");
    }

    #[test]
    fn test_wrong_type_is_treated_as_invalid() {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_schema(),
            store(json!({"app.retryCount": "many"})),
        )
        .expect("entry");
        assert_eq!(entry.get(&Scope::Global), 3);
    }

    #[test]
    fn test_scoped_override_and_fallback() {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_schema(),
            store(json!({"app.retryCount": 5, "[python]": {"app.retryCount": 99}})),
        )
        .expect("entry");
        assert_eq!(entry.get(&Scope::named("python")), 10);
        assert_eq!(entry.get(&Scope::named("rust")), 5);
        assert_eq!(entry.get_cache(&Scope::Global), Some(5));
    }

    #[test]
    fn test_set_clears_every_scope() {
        let entry: Entry<i64> =
            Entry::new("app.retryCount", &retry_schema(), store(json!({}))).expect("entry");
        entry.get(&Scope::Global);
        entry.get(&Scope::named("go"));

        entry.set(7, ConfigTarget::User).expect("set");
        assert_eq!(entry.get_cache(&Scope::Global), None);
        assert_eq!(entry.get_cache(&Scope::named("go")), None);
        assert_eq!(entry.get(&Scope::Global), 7);
        assert_eq!(entry.get(&Scope::named("go")), 7);
    }

    #[test]
    fn test_clear_one_scope_keeps_others() {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_schema(),
            store(json!({"app.retryCount": 5, "[python]": {"app.retryCount": 2}})),
        )
        .expect("entry");
        let python = Scope::named("python");
        assert_eq!(entry.get(&Scope::Global), 5);
        assert_eq!(entry.get(&python), 2);

        entry.clear(Some(&python));
        assert_eq!(entry.get_cache(&python), None);
        assert_eq!(entry.get_cache(&Scope::Global), Some(5));
        assert_eq!(entry.get(&python), 2);

        entry.clear(None);
        assert_eq!(entry.get_cache(&python), None);
        assert_eq!(entry.get_cache(&Scope::Global), None);
    }

    #[test]
    fn test_failed_set_keeps_cache() {
        let entry: Entry<i64> =
            Entry::new("app.retryCount", &retry_schema(), store(json!({}))).expect("entry");
        entry.get(&Scope::Global);
        let err = entry.set(7, ConfigTarget::Workspace).unwrap_err();
        assert!(matches!(err, ConfigError::NoLayer(ConfigTarget::Workspace)));
        assert_eq!(entry.get_cache(&Scope::Global), Some(3));
    }

    #[test]
    fn test_reset_restores_default() {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_schema(),
            store(json!({"app.retryCount": 8})),
        )
        .expect("entry");
        assert_eq!(entry.get(&Scope::Global), 8);
        entry.reset(ConfigTarget::User).expect("reset");
        assert_eq!(entry.get(&Scope::Global), 3);
    }

    #[test]
    fn test_change_notification() {
        let entry: Entry<i64> =
            Entry::new("app.retryCount", &retry_schema(), store(json!({}))).expect("entry");
        entry.get(&Scope::Global);

        assert!(!entry.on_did_change_configuration(&|key| key == "app.other"));
        assert_eq!(entry.get_cache(&Scope::Global), Some(3));

        assert!(entry.on_did_change_configuration(&|key| key.starts_with("app")));
        assert_eq!(entry.get_cache(&Scope::Global), None);
    }

    #[test]
    fn test_addressing() {
        let entry: Entry<String> =
            Entry::new("app.name", &retry_schema(), store(json!({}))).expect("entry");
        assert_eq!(entry.application_key(), "app");
        assert_eq!(entry.section(), "name");
    }

    #[test]
    fn test_construction_errors() {
        let schema = retry_schema();
        assert!(matches!(
            Entry::<i64>::new("app.unknown", &schema, store(json!({}))),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            Entry::<i64>::new("app.name", &schema, store(json!({}))),
            Err(ConfigError::Schema { .. })
        ));
        assert!(matches!(
            Entry::<i64>::new("retryCount", &schema, store(json!({}))),
            Err(ConfigError::InvalidKey(_))
        ));
    }
}
