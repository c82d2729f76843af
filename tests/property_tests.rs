//! Property tests for value regulation and caching.

mod common;

use common::{CountingStore, memory_registry, memory_store, retry_count_schema};
use proptest::prelude::*;
use serde_json::json;
use termlaunch_config::{
    ConfigStore, ConfigTarget, DirectoryPriorityKey, Entry, SettingEnum, Scope,
    StatusBarAlignmentKey, StatusBarCommand,
};

proptest! {
    #[test]
    fn prop_numeric_values_are_clamped(raw in any::<i64>()) {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_count_schema(),
            memory_store(json!({"app.retryCount": raw})),
        )
        .expect("entry");
        let value = entry.get(&Scope::Global);
        prop_assert!((0..=10).contains(&value));
        prop_assert_eq!(value, raw.clamp(0, 10));
    }

    #[test]
    fn prop_priority_stays_in_schema_range(raw in any::<i64>()) {
        let registry = memory_registry(json!({"windowsTerminal.statusBarPriority": raw}));
        prop_assert_eq!(
            registry.status_bar_priority.get(&Scope::Global),
            raw.clamp(-10000, 10000)
        );
    }

    #[test]
    fn prop_non_numeric_values_yield_default(raw in "[a-z ]{0,12}") {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_count_schema(),
            memory_store(json!({"app.retryCount": raw})),
        )
        .expect("entry");
        prop_assert_eq!(entry.get(&Scope::Global), 3);
    }

    #[test]
    fn prop_repeated_get_reads_store_once(raw in -20i64..20, repeats in 1usize..8) {
        let store = CountingStore::new(json!({"app.retryCount": raw}));
        let entry: Entry<i64> =
            Entry::new("app.retryCount", &retry_count_schema(), store.clone()).expect("entry");

        let first = entry.get(&Scope::Global);
        for _ in 0..repeats {
            prop_assert_eq!(entry.get(&Scope::Global), first);
        }
        prop_assert_eq!(store.reads(), 1);
    }

    #[test]
    fn prop_set_then_get_roundtrips_in_range(value in 0i64..=10) {
        let store = CountingStore::new(json!({"app.retryCount": 1}));
        let entry: Entry<i64> =
            Entry::new("app.retryCount", &retry_count_schema(), store.clone()).expect("entry");
        entry.get(&Scope::Global);
        entry.set(value, ConfigTarget::User).expect("set");
        prop_assert_eq!(entry.get(&Scope::Global), value);
        prop_assert_eq!(
            store.read("app", "retryCount", &Scope::Global),
            Some(json!(value))
        );
    }

    #[test]
    fn prop_unscoped_language_matches_global(language in "[a-z]{1,10}", raw in 0i64..=10) {
        let entry: Entry<i64> = Entry::new(
            "app.retryCount",
            &retry_count_schema(),
            memory_store(json!({"app.retryCount": raw})),
        )
        .expect("entry");
        prop_assert_eq!(entry.get(&Scope::named(language)), entry.get(&Scope::Global));
    }
}

#[test]
fn test_every_map_key_maps() {
    for key in StatusBarAlignmentKey::variants() {
        let registry = memory_registry(json!({"windowsTerminal.statusBarAlignment": key}));
        assert_eq!(
            registry.status_bar_alignment.get(&Scope::Global),
            key.alignment()
        );
    }
    for key in StatusBarCommand::variants() {
        let registry = memory_registry(json!({"windowsTerminal.statusBarCommand": key}));
        assert_eq!(registry.status_bar_command.get(&Scope::Global), key.label());
    }
    for key in DirectoryPriorityKey::variants() {
        let registry = memory_registry(json!({"windowsTerminal.directoryOptionPriority": key}));
        assert_eq!(
            registry.directory_option_priority.get(&Scope::Global),
            key.priority()
        );
    }
}
