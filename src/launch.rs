//! Turning settings into a Windows Terminal command line.
//!
//! The argument vector is `executable [defaultOptions...] [-p profile] [-d dir]`.
//! Profile and directory come from the [`LaunchRequest`] when given, otherwise
//! from the registry, with the directory picked by `directoryOptionPriority`.

use crate::wt_settings::TerminalDirectorySource;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use termlaunch_config::paths::expand_home_dir;
use termlaunch_config::{Scope, SettingsRegistry};

/// Explicit choices for one launch; unset fields fall back to settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchRequest {
    pub directory: Option<String>,
    pub profile: Option<String>,
}

impl LaunchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }
}

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Shell-quoted rendering, for `--dry-run` output and logs.
    pub fn display(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }

    /// Start the terminal. The child is detached; this does not wait for it.
    pub fn spawn(&self) -> Result<()> {
        log::info!("Launching: {}", self.display());
        Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;
        Ok(())
    }
}

/// `-p <profile>` when the profile is non-empty.
pub fn profile_args(profile: Option<&str>) -> Vec<String> {
    match profile.map(str::trim).filter(|p| !p.is_empty()) {
        Some(profile) => vec!["-p".to_string(), profile.to_string()],
        None => Vec::new(),
    }
}

/// `-d <directory>` when the directory is non-empty.
pub fn directory_args(directory: Option<&str>) -> Vec<String> {
    match directory.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directory) => vec!["-d".to_string(), directory.to_string()],
        None => Vec::new(),
    }
}

/// Split `defaultOptions` like a shell would.
///
/// Malformed quoting is reported and the options are ignored.
pub fn split_options(options: &str) -> Vec<String> {
    match shell_words::split(options) {
        Ok(args) => args,
        Err(e) => {
            log::error!(
                "\"windowsTerminal.defaultOptions\" setting value( {} ) is invalid! Please check your settings. ({})",
                options,
                e
            );
            Vec::new()
        }
    }
}

/// Directory the editor side of the policy offers: `defaultDirectory` when
/// set, else the workspace folder.
pub fn editor_directory(
    registry: &SettingsRegistry,
    scope: &Scope,
    workspace_folder: Option<&Path>,
) -> Option<String> {
    let configured = registry.default_directory.get(scope);
    if !configured.trim().is_empty() {
        return Some(expand_home_dir(configured.trim()));
    }
    workspace_folder.map(|folder| folder.to_string_lossy().to_string())
}

/// Profile to launch: the request's, else `defaultProfile`. Empty means none.
pub fn resolve_profile(
    registry: &SettingsRegistry,
    scope: &Scope,
    request: &LaunchRequest,
) -> Option<String> {
    let profile = request
        .profile
        .clone()
        .unwrap_or_else(|| registry.default_profile.get(scope));
    Some(profile.trim().to_string()).filter(|p| !p.is_empty())
}

/// Resolve `request` against settings into a command line.
pub fn build_invocation(
    registry: &SettingsRegistry,
    scope: &Scope,
    request: &LaunchRequest,
    workspace_folder: Option<&Path>,
    terminal: &dyn TerminalDirectorySource,
) -> Invocation {
    let profile = resolve_profile(registry, scope, request);

    let directory = match request.directory.as_deref().map(str::trim) {
        Some(directory) if !directory.is_empty() => Some(expand_home_dir(directory)),
        _ => registry.directory_option_priority.get(scope).resolve(
            || editor_directory(registry, scope, workspace_folder),
            || terminal.profile_starting_directory(profile.as_deref()),
        ),
    };

    let mut args = split_options(&registry.default_options.get(scope));
    args.extend(profile_args(profile.as_deref()));
    args.extend(directory_args(directory.as_deref()));

    let invocation = Invocation {
        program: registry.executable.get(scope),
        args,
    };
    log::debug!("Resolved invocation for {}: {}", scope, invocation.display());
    invocation
}
