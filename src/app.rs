//! Application state and command execution.
//!
//! [`App`] owns the layered settings store and the registry built over it.
//! Each CLI command is one method; [`App::run`] dispatches and prints.

use crate::cli::{Commands, ConfigCommands, RuntimeOptions};
use crate::launch::{Invocation, LaunchRequest, build_invocation};
use crate::status_bar::StatusBarItem;
use crate::wt_settings::{TerminalProfile, TerminalSettingsFile, resolve_settings_path};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use termlaunch_config::paths::{user_settings_path, workspace_settings_path};
use termlaunch_config::{
    ConfigError, ConfigTarget, LayeredStore, Scope, SettingsRegistry, SettingsWatcher,
};

/// Microsoft Store page of Windows Terminal.
pub const STORE_URL: &str = "https://www.microsoft.com/p/windows-terminal/9n0dx20hk701";

/// Windows Terminal user documentation.
pub const DOCUMENT_URL: &str = "https://github.com/microsoft/terminal/tree/master/doc/user-docs";

/// How often `watch` wakes up to check its deadline.
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct App {
    options: RuntimeOptions,
    store: Arc<LayeredStore>,
    registry: SettingsRegistry,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("options", &self.options)
            .field("layers", &self.store.layer_paths())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Open the settings layers named by `options` and build the registry.
    ///
    /// The user layer always exists; the workspace layer needs `--workspace`
    /// and the workspace-folder layer needs `--settings`.
    pub fn new(options: RuntimeOptions) -> Result<Self> {
        let store = Arc::new(LayeredStore::new());

        let user = options
            .user_settings
            .clone()
            .unwrap_or_else(user_settings_path);
        store.open_layer(ConfigTarget::User, user)?;

        if let Some(workspace) = &options.workspace {
            store.open_layer(ConfigTarget::Workspace, workspace_settings_path(workspace))?;
        }
        if let Some(settings) = &options.settings {
            store.open_layer(ConfigTarget::WorkspaceFolder, settings.clone())?;
        }

        let registry = SettingsRegistry::builtin(store.clone())?;
        Ok(Self::from_parts(options, store, registry))
    }

    /// Assemble an app from an existing store and registry.
    pub fn from_parts(
        options: RuntimeOptions,
        store: Arc<LayeredStore>,
        registry: SettingsRegistry,
    ) -> Self {
        Self {
            options,
            store,
            registry,
        }
    }

    pub fn registry(&self) -> &SettingsRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<LayeredStore> {
        &self.store
    }

    /// Folder used when the editor side of the directory policy has no
    /// `defaultDirectory`: `--workspace`, else the current directory.
    pub fn workspace_folder(&self) -> Option<PathBuf> {
        self.options
            .workspace
            .clone()
            .or_else(|| std::env::current_dir().ok())
    }

    /// Windows Terminal's settings file per `settingsJsonPath`.
    pub fn terminal_settings(&self) -> TerminalSettingsFile {
        let configured = self.registry.settings_json_path.get(&Scope::Global);
        TerminalSettingsFile::new(resolve_settings_path(&configured))
    }

    /// Command line `open` would run.
    pub fn invocation(&self, request: &LaunchRequest, scope: &Scope) -> Invocation {
        let workspace = self.workspace_folder();
        build_invocation(
            &self.registry,
            scope,
            request,
            workspace.as_deref(),
            &self.terminal_settings(),
        )
    }

    /// Launch Windows Terminal, or print the command line under `--dry-run`.
    pub fn open(&self, request: &LaunchRequest, scope: &Scope) -> Result<Invocation> {
        let invocation = self.invocation(request, scope);
        if self.options.dry_run {
            println!("{}", invocation.display());
        } else {
            invocation.spawn()?;
        }
        Ok(invocation)
    }

    /// Launch with the profile named by `selector` in the terminal settings.
    pub fn open_profile(&self, selector: &str, scope: &Scope) -> Result<Invocation> {
        let settings = self.terminal_settings().load()?;
        let profile = settings
            .find_profile(selector)
            .with_context(|| format!("No Windows Terminal profile named {:?}", selector))?;
        let request = LaunchRequest::new().with_profile(profile.launch_id());
        self.open(&request, scope)
    }

    /// Visible profiles, with the default one flagged.
    pub fn profiles(&self) -> Result<Vec<(TerminalProfile, bool)>> {
        let settings = self.terminal_settings().load()?;
        Ok(settings
            .visible_profiles()
            .map(|profile| (profile.clone(), settings.is_default(profile)))
            .collect())
    }

    /// Open Windows Terminal's settings file in the default editor.
    pub fn open_settings(&self) -> Result<PathBuf> {
        let file = self.terminal_settings();
        let path = file
            .path()
            .context("Windows Terminal settings location is unknown")?
            .to_path_buf();
        self.open_target(&path.to_string_lossy())?;
        Ok(path)
    }

    pub fn show_store(&self) -> Result<()> {
        self.open_target(STORE_URL)
    }

    pub fn show_document(&self) -> Result<()> {
        self.open_target(DOCUMENT_URL)
    }

    fn open_target(&self, target: &str) -> Result<()> {
        if self.options.dry_run {
            println!("open {}", target);
            return Ok(());
        }
        log::info!("Opening {}", target);
        open::that(target).with_context(|| format!("Failed to open {}", target))
    }

    pub fn status(&self) -> StatusBarItem {
        StatusBarItem::from_registry(&self.registry)
    }

    /// Resolved value of `key` in `scope`.
    pub fn config_get(&self, key: &str, scope: &Scope) -> Result<Value> {
        let entry = self
            .registry
            .entry(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        Ok(entry.resolved_json(scope))
    }

    /// Write `raw` to `key` in `target`.
    ///
    /// `raw` is parsed as JSON; text that is not JSON, or whose JSON does not
    /// fit the setting's type, is stored as a string.
    pub fn config_set(&self, key: &str, raw: &str, target: ConfigTarget) -> Result<()> {
        let entry = self
            .registry
            .entry(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        if value.is_string() {
            entry.set_json(value, target)?;
            return Ok(());
        }
        match entry.set_json(value, target) {
            Err(rejected @ ConfigError::WriteRejected { .. }) => {
                log::debug!("'{}' rejected as JSON for {}; storing as text", raw, key);
                entry
                    .set_json(Value::String(raw.to_string()), target)
                    .map_err(|_| rejected)?;
            }
            result => result?,
        }
        Ok(())
    }

    pub fn config_reset(&self, key: &str, target: ConfigTarget) -> Result<()> {
        let entry = self
            .registry
            .entry(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        entry.reset(target)?;
        Ok(())
    }

    /// Every registered key with its resolved value.
    pub fn config_list(&self, scope: &Scope) -> Vec<(String, Value)> {
        self.registry
            .entries()
            .into_iter()
            .map(|entry| (entry.key().to_string(), entry.resolved_json(scope)))
            .collect()
    }

    /// Re-read the settings files and invalidate affected entries.
    ///
    /// Returns whether any cached value was dropped.
    pub fn reload(&self) -> Result<bool> {
        let event = self.store.reload()?;
        Ok(self.registry.on_did_change_configuration(&event))
    }

    /// Watch the settings files, printing the status bar item after every
    /// change, until `exit_after` elapses (or forever).
    pub fn watch(&self, debounce_ms: u64, exit_after: Option<Duration>) -> Result<()> {
        let deadline = exit_after
            .map(|d| {
                Instant::now()
                    .checked_add(d)
                    .with_context(|| format!("Watch period of {:?} is too long", d))
            })
            .transpose()?;
        let watcher = SettingsWatcher::new(&self.store.layer_paths(), debounce_ms)?;
        let mut item = self.status();
        println!("{}", item.render());

        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                log::info!("Watch period elapsed");
                return Ok(());
            }
            let Some(event) = watcher.recv_timeout(WATCH_POLL_INTERVAL) else {
                continue;
            };
            log::debug!("Reloading after change to {}", event.path.display());
            match self.reload() {
                Ok(true) => {
                    item.update(&self.registry);
                    println!("{}", item.render());
                }
                Ok(false) => log::debug!("No windowsTerminal settings changed"),
                Err(e) => {
                    log::error!("Settings reload failed: {:#}", e);
                    eprintln!("termlaunch: {:#}", e);
                }
            }
        }
    }

    /// Execute one CLI command.
    pub fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Open {
                profile,
                directory,
                language,
            } => {
                let request = LaunchRequest { directory, profile };
                self.open(&request, &Scope::from_language_id(language.as_deref()))?;
            }
            Commands::OpenProfile { profile, language } => {
                self.open_profile(&profile, &Scope::from_language_id(language.as_deref()))?;
            }
            Commands::Profiles => {
                for (profile, is_default) in self.profiles()? {
                    let marker = if is_default { "*" } else { " " };
                    match &profile.guid {
                        Some(guid) => println!("{} {}  {}", marker, profile.name, guid),
                        None => println!("{} {}", marker, profile.name),
                    }
                }
            }
            Commands::OpenSettings => {
                self.open_settings()?;
            }
            Commands::ShowStore => self.show_store()?,
            Commands::ShowDocument => self.show_document()?,
            Commands::Status => println!("{}", self.status().render()),
            Commands::Config { command } => self.run_config(command)?,
            Commands::Watch {
                debounce_ms,
                exit_after,
            } => {
                let exit_after = exit_after
                    .map(|secs| {
                        Duration::try_from_secs_f64(secs)
                            .with_context(|| format!("Invalid --exit-after value: {}", secs))
                    })
                    .transpose()?;
                self.watch(debounce_ms, exit_after)?;
            }
        }
        Ok(())
    }

    fn run_config(&self, command: ConfigCommands) -> Result<()> {
        match command {
            ConfigCommands::Get { key, language } => {
                let value = self.config_get(&key, &Scope::from_language_id(language.as_deref()))?;
                println!("{}", value);
            }
            ConfigCommands::Set { key, value, target } => {
                let target = ConfigTarget::from(target);
                self.config_set(&key, &value, target)?;
                println!("{} updated in {} settings", key, target.display_name());
            }
            ConfigCommands::Reset { key, target } => {
                let target = ConfigTarget::from(target);
                self.config_reset(&key, target)?;
                println!("{} removed from {} settings", key, target.display_name());
            }
            ConfigCommands::List { language } => {
                for (key, value) in self.config_list(&Scope::from_language_id(language.as_deref())) {
                    println!("{} = {}", key, value);
                }
            }
        }
        Ok(())
    }
}
