//! Settings whose stored value selects from a fixed mapping.
//!
//! The stored value is an enum key (`"left"`, `"right"`, ...); readers get the
//! mapped value instead. The mapping is an exhaustive `fn(K) -> V`, so every
//! key the validator accepts has a target.

use crate::entry::{Entry, SettingValue};
use crate::error::Result;
use crate::key::SettingKey;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::store::{ConfigStore, ConfigTarget};
use crate::validators::enum_validator;
use std::fmt;
use std::sync::Arc;

/// Enum usable as the stored key of a [`MapEntry`].
pub trait SettingEnum: SettingValue + Copy + Eq {
    /// Every variant, i.e. the key set of the mapping.
    fn variants() -> &'static [Self];
}

/// An [`Entry`] resolved through a total mapping.
pub struct MapEntry<K: SettingEnum, V> {
    entry: Entry<K>,
    mapping: fn(K) -> V,
}

impl<K: SettingEnum, V> fmt::Debug for MapEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapEntry")
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

impl<K: SettingEnum, V> MapEntry<K, V> {
    /// Create the entry; its validator accepts exactly `K::variants()`.
    pub fn new(
        key: &str,
        schema: &Schema,
        store: Arc<dyn ConfigStore>,
        mapping: fn(K) -> V,
    ) -> Result<Self> {
        let entry = Entry::with_validator(key, schema, store, enum_validator::<K>())?;
        Ok(Self { entry, mapping })
    }

    /// Mapped value for `scope`.
    pub fn get(&self, scope: &Scope) -> V {
        (self.mapping)(self.entry.get(scope))
    }

    /// The resolved key itself, before mapping.
    pub fn get_key(&self, scope: &Scope) -> K {
        self.entry.get(scope)
    }

    /// Mapped cached value, without reading the store.
    pub fn get_cache(&self, scope: &Scope) -> Option<V> {
        self.entry.get_cache(scope).map(self.mapping)
    }

    pub fn set(&self, key: K, target: ConfigTarget) -> Result<()> {
        self.entry.set(key, target)
    }

    pub fn reset(&self, target: ConfigTarget) -> Result<()> {
        self.entry.reset(target)
    }

    pub fn clear(&self, scope: Option<&Scope>) {
        self.entry.clear(scope);
    }

    pub fn on_did_change_configuration(&self, affects_configuration: &dyn Fn(&str) -> bool) -> bool {
        self.entry.on_did_change_configuration(affects_configuration)
    }

    pub fn key(&self) -> &SettingKey {
        self.entry.key()
    }

    /// The inner key-typed entry.
    pub fn entry(&self) -> &Entry<K> {
        &self.entry
    }

    pub fn map(&self, key: K) -> V {
        (self.mapping)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SettingSchema;
    use crate::store::LayeredStore;
    use serde::{Deserialize, Serialize};
    use serde_json::{Value, json};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Align {
        Left,
        Right,
    }

    impl SettingEnum for Align {
        fn variants() -> &'static [Self] {
            &[Align::Left, Align::Right]
        }
    }

    fn align_label(align: Align) -> &'static str {
        match align {
            Align::Left => "L",
            Align::Right => "R",
        }
    }

    fn align_entry(user: Value) -> MapEntry<Align, &'static str> {
        let schema = Schema::new().with_setting("app.align", SettingSchema::new("left"));
        let store = Arc::new(LayeredStore::new().with_json(ConfigTarget::User, user));
        MapEntry::new("app.align", &schema, store, align_label).expect("map entry")
    }

    #[test]
    fn test_every_key_maps() {
        for (raw, expected) in [("left", "L"), ("right", "R")] {
            let entry = align_entry(json!({"app.align": raw}));
            assert_eq!(entry.get(&Scope::Global), expected);
        }
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let entry = align_entry(json!({"app.align": "middle"}));
        assert_eq!(entry.get(&Scope::Global), "L");
        assert_eq!(entry.get_key(&Scope::Global), Align::Left);
    }

    #[test]
    fn test_get_cache_maps_without_computing() {
        let entry = align_entry(json!({"app.align": "right"}));
        assert_eq!(entry.get_cache(&Scope::Global), None);
        entry.get(&Scope::Global);
        assert_eq!(entry.get_cache(&Scope::Global), Some("R"));
    }

    #[test]
    fn test_set_and_change_delegate() {
        let entry = align_entry(json!({}));
        assert_eq!(entry.get(&Scope::Global), "L");
        entry.set(Align::Right, ConfigTarget::User).expect("set");
        assert_eq!(entry.get(&Scope::Global), "R");

        assert!(entry.on_did_change_configuration(&|key| key == "app.align"));
        assert_eq!(entry.get_cache(&Scope::Global), None);
        assert_eq!(entry.key().as_str(), "app.align");
    }
}
