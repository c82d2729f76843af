//! Shared integration test helpers for termlaunch.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{memory_store, TestWorkspace};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per file.

#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use termlaunch::cli::RuntimeOptions;
use termlaunch_config::paths::workspace_settings_path;
use termlaunch_config::{
    ConfigStore, ConfigTarget, LayeredStore, Schema, Scope, SettingSchema, SettingsRegistry,
};

/// The `app.retryCount` schema used by the numeric scenarios: default 3, range 0..=10.
pub fn retry_count_schema() -> Schema {
    Schema::new().with_setting(
        "app.retryCount",
        SettingSchema::new(3)
            .with_minimum(0)
            .with_maximum(10)
            .with_description("How often to retry"),
    )
}

/// In-memory store whose user layer holds `user`.
pub fn memory_store(user: Value) -> Arc<LayeredStore> {
    Arc::new(LayeredStore::new().with_json(ConfigTarget::User, user))
}

/// Registry over the packaged schema with `user` as the only layer.
pub fn memory_registry(user: Value) -> SettingsRegistry {
    SettingsRegistry::builtin(memory_store(user)).expect("registry over builtin schema")
}

/// Store wrapper counting reads, to observe how often values are resolved.
pub struct CountingStore {
    inner: LayeredStore,
    reads: AtomicUsize,
}

impl CountingStore {
    pub fn new(user: Value) -> Arc<Self> {
        Arc::new(Self {
            inner: LayeredStore::new().with_json(ConfigTarget::User, user),
            reads: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ConfigStore for CountingStore {
    fn read(&self, namespace: &str, section: &str, scope: &Scope) -> Option<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(namespace, section, scope)
    }

    fn write(
        &self,
        namespace: &str,
        section: &str,
        value: Option<Value>,
        target: ConfigTarget,
    ) -> termlaunch_config::Result<()> {
        self.inner.write(namespace, section, value, target)
    }
}

/// Temporary user and workspace settings files.
///
/// The `TempDir` is removed when the workspace is dropped, so keep it alive
/// for the duration of the test.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn user_settings(&self) -> PathBuf {
        self.root().join("user").join("settings.json")
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.root().join("project")
    }

    pub fn workspace_settings(&self) -> PathBuf {
        workspace_settings_path(&self.workspace_dir())
    }

    pub fn terminal_settings(&self) -> PathBuf {
        self.root().join("wt").join("settings.json")
    }

    pub fn write_user(&self, contents: &str) {
        write_file(&self.user_settings(), contents);
    }

    pub fn write_workspace(&self, contents: &str) {
        write_file(&self.workspace_settings(), contents);
    }

    pub fn write_terminal(&self, contents: &str) {
        write_file(&self.terminal_settings(), contents);
    }

    /// Options for a dry-run app over this workspace.
    pub fn options(&self) -> RuntimeOptions {
        RuntimeOptions {
            workspace: Some(self.workspace_dir()),
            user_settings: Some(self.user_settings()),
            dry_run: true,
            ..Default::default()
        }
    }
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create settings dir");
    }
    fs::write(path, contents).expect("Failed to write settings file");
}
