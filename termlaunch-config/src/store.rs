//! Layered settings store.
//!
//! The store holds one settings document per [`ConfigTarget`]. Reads walk the
//! layers from highest to lowest precedence and return the first value found;
//! writes go to exactly one layer and are persisted atomically when that layer
//! is backed by a file.
//!
//! Documents use editor-style addressing. A key may be written flat
//! (`"windowsTerminal.defaultProfile": "pwsh"`) or nested
//! (`"windowsTerminal": {"defaultProfile": "pwsh"}`), and language overlays
//! are objects under `"[python]"` holding flat or nested keys.

use crate::change::ConfigurationChangeEvent;
use crate::error::{ConfigError, Result};
use crate::jsonc::{parse_settings_document, render_settings_document};
use crate::scope::Scope;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence target for a write, in increasing order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ConfigTarget {
    /// Per-user settings.
    #[default]
    User,
    /// Settings of the open workspace.
    Workspace,
    /// Settings of one folder inside a multi-root workspace.
    WorkspaceFolder,
}

impl ConfigTarget {
    pub fn all() -> &'static [ConfigTarget] {
        &[
            ConfigTarget::User,
            ConfigTarget::Workspace,
            ConfigTarget::WorkspaceFolder,
        ]
    }

    /// Display name for CLI output
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Workspace => "workspace",
            Self::WorkspaceFolder => "workspace-folder",
        }
    }
}

/// Read/write access to raw setting values.
///
/// Implementations address values by namespace and section (the two halves
/// of a [`crate::SettingKey`]) and by [`Scope`].
pub trait ConfigStore: Send + Sync {
    /// Raw value of `namespace.section` in `scope`, or `None` when absent.
    ///
    /// A `Named` scope only consults that scope's overlay; falling back to the
    /// global value is the caller's job.
    fn read(&self, namespace: &str, section: &str, scope: &Scope) -> Option<Value>;

    /// Store `value` (or remove the key when `None`) in the `target` layer.
    fn write(
        &self,
        namespace: &str,
        section: &str,
        value: Option<Value>,
        target: ConfigTarget,
    ) -> Result<()>;
}

/// One settings document at a given precedence.
#[derive(Debug, Clone, Default)]
struct Layer {
    path: Option<PathBuf>,
    document: Map<String, Value>,
}

/// [`ConfigStore`] backed by per-target settings documents.
#[derive(Debug, Default)]
pub struct LayeredStore {
    layers: RwLock<BTreeMap<ConfigTarget, Layer>>,
}

impl LayeredStore {
    /// A store with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an in-memory layer holding `document`.
    pub fn with_document(self, target: ConfigTarget, document: Map<String, Value>) -> Self {
        self.layers.write().insert(
            target,
            Layer {
                path: None,
                document,
            },
        );
        self
    }

    /// Add an in-memory layer parsed from a JSON value. Non-objects give an empty layer.
    pub fn with_json(self, target: ConfigTarget, value: Value) -> Self {
        let document = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.with_document(target, document)
    }

    /// Attach a file-backed layer. A missing file is an empty layer that will
    /// be created on the first write.
    pub fn open_layer(&self, target: ConfigTarget, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let document = load_document(&path)?;
        log::info!(
            "Settings layer {} loaded from {} ({} top-level keys)",
            target.display_name(),
            path.display(),
            document.len()
        );
        self.layers.write().insert(
            target,
            Layer {
                path: Some(path),
                document,
            },
        );
        Ok(())
    }

    /// Files backing the layers, in precedence order.
    pub fn layer_paths(&self) -> Vec<PathBuf> {
        self.layers
            .read()
            .values()
            .filter_map(|layer| layer.path.clone())
            .collect()
    }

    pub fn targets(&self) -> Vec<ConfigTarget> {
        self.layers.read().keys().copied().collect()
    }

    pub fn layer_path(&self, target: ConfigTarget) -> Option<PathBuf> {
        self.layers
            .read()
            .get(&target)
            .and_then(|layer| layer.path.clone())
    }

    /// Replace the document of an existing layer and report what changed.
    ///
    /// Used for in-memory layers and by hosts that push settings in directly.
    pub fn replace_document(
        &self,
        target: ConfigTarget,
        document: Map<String, Value>,
    ) -> ConfigurationChangeEvent {
        let mut layers = self.layers.write();
        let before = effective_view(&layers);
        layers.entry(target).or_default().document = document;
        let after = effective_view(&layers);
        diff_views(&before, &after)
    }

    /// Re-read every file-backed layer and report which keys changed.
    ///
    /// On a parse error the layer keeps its previous document and the error
    /// is returned; other layers are still refreshed.
    pub fn reload(&self) -> Result<ConfigurationChangeEvent> {
        let mut layers = self.layers.write();
        let before = effective_view(&layers);
        let mut first_error = None;

        for (target, layer) in layers.iter_mut() {
            let Some(path) = layer.path.clone() else {
                continue;
            };
            match load_document(&path) {
                Ok(document) => layer.document = document,
                Err(e) => {
                    log::warn!(
                        "Keeping previous {} settings, reload failed: {}",
                        target.display_name(),
                        e
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        let event = diff_views(&before, &effective_view(&layers));
        drop(layers);

        if !event.is_empty() {
            log::info!(
                "Settings reloaded, changed keys: {}",
                event.keys().collect::<Vec<_>>().join(", ")
            );
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(event),
        }
    }
}

impl ConfigStore for LayeredStore {
    fn read(&self, namespace: &str, section: &str, scope: &Scope) -> Option<Value> {
        let layers = self.layers.read();
        layers.values().rev().find_map(|layer| {
            let container = match scope.overlay_section() {
                None => &layer.document,
                Some(overlay) => layer.document.get(&overlay)?.as_object()?,
            };
            lookup(container, namespace, section).cloned()
        })
    }

    fn write(
        &self,
        namespace: &str,
        section: &str,
        value: Option<Value>,
        target: ConfigTarget,
    ) -> Result<()> {
        let key = format!("{}.{}", namespace, section);
        let mut layers = self.layers.write();
        let layer = layers.get_mut(&target).ok_or(ConfigError::NoLayer(target))?;

        let mut document = layer.document.clone();
        remove_nested(&mut document, namespace, section);
        match value {
            Some(value) => {
                document.insert(key.clone(), value);
            }
            None => {
                document.remove(&key);
            }
        }

        if let Some(path) = &layer.path {
            save_document(path, &document)?;
        }
        layer.document = document;

        log::info!("Updated '{}' in {} settings", key, target.display_name());
        Ok(())
    }
}

/// Find `namespace.section` in a document, flat first, then nested.
fn lookup<'a>(document: &'a Map<String, Value>, namespace: &str, section: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(&format!("{}.{}", namespace, section)) {
        return Some(value);
    }

    let mut current = document.get(namespace)?;
    for segment in section.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Drop a nested copy of the key so a flat write cannot be shadowed or duplicated.
fn remove_nested(document: &mut Map<String, Value>, namespace: &str, section: &str) {
    let Some(Value::Object(current)) = document.get_mut(namespace) else {
        return;
    };
    remove_path(current, &section.split('.').collect::<Vec<_>>());
    if current.is_empty() {
        document.remove(namespace);
    }
}

fn remove_path(map: &mut Map<String, Value>, segments: &[&str]) {
    match segments {
        [] => {}
        [last] => {
            map.remove(*last);
        }
        [first, rest @ ..] => {
            if let Some(Value::Object(child)) = map.get_mut(*first) {
                remove_path(child, rest);
                if child.is_empty() {
                    map.remove(*first);
                }
            }
        }
    }
}

fn load_document(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let source = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_settings_document(path, &source)
}

fn save_document(path: &Path, document: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }

    let text = render_settings_document(path, document)?;

    // Atomic save: write to temp file then rename to prevent corruption on crash
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);
    fs::write(&temp_path, text).map_err(|e| ConfigError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| ConfigError::io(path, e))?;
    Ok(())
}

type EffectiveView = BTreeMap<(Scope, String), Value>;

/// Flatten all layers into `(scope, dotted key) -> value`, higher layers winning.
fn effective_view(layers: &BTreeMap<ConfigTarget, Layer>) -> EffectiveView {
    let mut view = EffectiveView::new();
    for layer in layers.values() {
        for (key, value) in &layer.document {
            match (Scope::from_overlay_section(key), value) {
                (Some(scope), Value::Object(overlay)) => {
                    for (inner_key, inner_value) in overlay {
                        flatten_into(&mut view, &scope, inner_key.clone(), inner_value);
                    }
                }
                _ => flatten_into(&mut view, &Scope::Global, key.clone(), value),
            }
        }
    }
    view
}

fn flatten_into(view: &mut EffectiveView, scope: &Scope, key: String, value: &Value) {
    match value {
        Value::Object(children) if !children.is_empty() => {
            for (child_key, child_value) in children {
                flatten_into(view, scope, format!("{}.{}", key, child_key), child_value);
            }
        }
        _ => {
            view.insert((scope.clone(), key), value.clone());
        }
    }
}

fn diff_views(before: &EffectiveView, after: &EffectiveView) -> ConfigurationChangeEvent {
    let mut event = ConfigurationChangeEvent::new();
    for (scoped_key, value) in before {
        if after.get(scoped_key) != Some(value) {
            event.insert(scoped_key.1.clone());
        }
    }
    for scoped_key in after.keys() {
        if !before.contains_key(scoped_key) {
            event.insert(scoped_key.1.clone());
        }
    }
    event
}
