//! Status bar item driven by the `statusBar*` settings.

use termlaunch_config::{Scope, SettingsRegistry, StatusBarAlignment};

/// The launcher's status bar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBarItem {
    /// `None` when the alignment setting is `"none"`.
    pub alignment: Option<StatusBarAlignment>,
    pub priority: i64,
    pub text: String,
    /// Command identifier run on click.
    pub command: &'static str,
    pub tooltip: &'static str,
    pub visible: bool,
}

impl StatusBarItem {
    /// Build the item from the global settings.
    pub fn from_registry(registry: &SettingsRegistry) -> Self {
        let mut item = Self {
            alignment: None,
            priority: 0,
            text: String::new(),
            command: "",
            tooltip: "",
            visible: false,
        };
        item.update(registry);
        item
    }

    /// Re-read every field from `registry` after a configuration change.
    pub fn update(&mut self, registry: &SettingsRegistry) {
        let scope = Scope::Global;
        let command = registry.status_bar_command.get_key(&scope);

        self.alignment = registry.status_bar_alignment.get(&scope);
        self.priority = registry.status_bar_priority.get(&scope);
        self.text = registry.status_bar_text.get(&scope);
        self.command = command.command_id();
        self.tooltip = registry.status_bar_command.get(&scope);
        self.visible = self.alignment.is_some();
        log::debug!("Status bar item updated: {:?}", self);
    }

    /// One-line rendering for the `status` command.
    pub fn render(&self) -> String {
        let side = match self.alignment {
            Some(StatusBarAlignment::Left) => "left",
            Some(StatusBarAlignment::Right) => "right",
            None => return "status bar item hidden".to_string(),
        };
        format!(
            "[{}] {} ({}, priority {}) -> {}",
            side, self.text, self.tooltip, self.priority, self.command
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use termlaunch_config::{ConfigTarget, ConfigurationChangeEvent, LayeredStore};

    fn registry_with_store(user: Value) -> (SettingsRegistry, Arc<LayeredStore>) {
        let store = Arc::new(LayeredStore::new().with_json(ConfigTarget::User, user));
        let registry = SettingsRegistry::builtin(store.clone()).expect("registry");
        (registry, store)
    }

    #[test]
    fn test_default_item() {
        let (registry, _) = registry_with_store(json!({}));
        let item = StatusBarItem::from_registry(&registry);
        assert_eq!(item.alignment, Some(StatusBarAlignment::Left));
        assert_eq!(item.text, "$(terminal)");
        assert_eq!(item.command, "windowsTerminal.open");
        assert_eq!(item.tooltip, "Open Windows Terminal");
        assert!(item.visible);
        assert_eq!(
            item.render(),
            "[left] $(terminal) (Open Windows Terminal, priority 0) -> windowsTerminal.open"
        );
    }

    #[test]
    fn test_hidden_when_alignment_none() {
        let (registry, _) =
            registry_with_store(json!({"windowsTerminal.statusBarAlignment": "none"}));
        let item = StatusBarItem::from_registry(&registry);
        assert!(!item.visible);
        assert_eq!(item.render(), "status bar item hidden");
    }

    #[test]
    fn test_update_after_change() {
        let (registry, store) = registry_with_store(json!({}));
        let mut item = StatusBarItem::from_registry(&registry);

        let mut document = serde_json::Map::new();
        document.insert(
            "windowsTerminal.statusBarCommand".to_string(),
            json!("windowsTerminal.openSettings"),
        );
        document.insert("windowsTerminal.statusBarText".to_string(), json!("WT"));
        let event = store.replace_document(ConfigTarget::User, document);
        assert!(registry.on_did_change_configuration(&event));

        item.update(&registry);
        assert_eq!(item.text, "WT");
        assert_eq!(item.command, "windowsTerminal.openSettings");
        assert_eq!(item.tooltip, "Open Windows Terminal's settings.json");
    }

    #[test]
    fn test_unrelated_change_keeps_cached_values() {
        let (registry, _) = registry_with_store(json!({}));
        StatusBarItem::from_registry(&registry);
        let event = ConfigurationChangeEvent::from_keys(["editor.fontSize"]);
        assert!(!registry.on_did_change_configuration(&event));
        assert!(registry.status_bar_text.get_cache(&Scope::Global).is_some());
    }
}
