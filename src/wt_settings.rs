//! Windows Terminal's own `settings.json`.
//!
//! Only the parts the launcher needs are modelled: the default profile and
//! the profile list with each profile's starting directory. Unknown fields
//! are ignored so newer terminal versions keep parsing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use termlaunch_config::jsonc::parse_jsonc;
use termlaunch_config::paths::expand_home_dir;
use uuid::Uuid;

/// Package directory of the Store build of Windows Terminal under `%LOCALAPPDATA%`.
const PACKAGE_DIR: &str = "Microsoft.WindowsTerminal_8wekyb3d8bbwe";

/// Default location of Windows Terminal's settings file.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| {
        dir.join("Packages")
            .join(PACKAGE_DIR)
            .join("LocalState")
            .join("settings.json")
    })
}

/// The configured path when non-empty, else the default location.
pub fn resolve_settings_path(configured: &str) -> Option<PathBuf> {
    let configured = configured.trim();
    if configured.is_empty() {
        default_settings_path()
    } else {
        Some(PathBuf::from(expand_home_dir(configured)))
    }
}

/// One entry of `profiles.list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalProfile {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub commandline: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub starting_directory: Option<String>,
}

impl TerminalProfile {
    /// Whether `selector` names this profile, by GUID or by name.
    ///
    /// GUIDs are compared as UUIDs so braces and letter case do not matter.
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if selector.is_empty() {
            return false;
        }
        if let Some(guid) = &self.guid {
            if guid == selector {
                return true;
            }
            if let (Some(a), Some(b)) = (parse_guid(guid), parse_guid(selector))
                && a == b
            {
                return true;
            }
        }
        self.name == selector
    }

    /// Identifier to pass to `wt -p`: the GUID when known, else the name.
    pub fn launch_id(&self) -> &str {
        self.guid.as_deref().unwrap_or(&self.name)
    }
}

fn parse_guid(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim().trim_start_matches('{').trim_end_matches('}')).ok()
}

/// `profiles` is either `{ "defaults": {...}, "list": [...] }` or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ProfilesRepr {
    List(Vec<TerminalProfile>),
    Section {
        #[serde(default)]
        list: Vec<TerminalProfile>,
    },
}

impl From<ProfilesRepr> for Vec<TerminalProfile> {
    fn from(repr: ProfilesRepr) -> Self {
        match repr {
            ProfilesRepr::List(list) => list,
            ProfilesRepr::Section { list } => list,
        }
    }
}

fn deserialize_profiles<'de, D>(deserializer: D) -> std::result::Result<Vec<TerminalProfile>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    ProfilesRepr::deserialize(deserializer).map(Into::into)
}

/// The subset of Windows Terminal settings read by the launcher.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalSettings {
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default, deserialize_with = "deserialize_profiles")]
    pub profiles: Vec<TerminalProfile>,
}

impl TerminalSettings {
    /// Parse settings text; whole-line `//` comments are allowed.
    pub fn parse(source: &str) -> Result<Self> {
        let value = parse_jsonc(source).context("Windows Terminal settings are not valid JSON")?;
        serde_json::from_value(value).context("Unexpected Windows Terminal settings layout")
    }

    /// Read and parse the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Profile named by `selector` (GUID or name).
    pub fn find_profile(&self, selector: &str) -> Option<&TerminalProfile> {
        self.profiles.iter().find(|p| p.matches(selector))
    }

    /// The profile marked as `defaultProfile`.
    pub fn default_profile(&self) -> Option<&TerminalProfile> {
        self.default_profile
            .as_deref()
            .and_then(|id| self.find_profile(id))
    }

    /// `startingDirectory` of `profile`, or of the default profile when
    /// `profile` is empty or absent.
    pub fn profile_starting_directory(&self, profile: Option<&str>) -> Option<String> {
        let profile = match profile.map(str::trim).filter(|p| !p.is_empty()) {
            Some(selector) => self.find_profile(selector),
            None => self.default_profile(),
        }?;
        profile
            .starting_directory
            .clone()
            .filter(|dir| !dir.trim().is_empty())
    }

    /// Profiles shown in the picker.
    pub fn visible_profiles(&self) -> impl Iterator<Item = &TerminalProfile> {
        self.profiles.iter().filter(|p| !p.hidden)
    }

    pub fn is_default(&self, profile: &TerminalProfile) -> bool {
        self.default_profile
            .as_deref()
            .is_some_and(|id| profile.matches(id))
    }
}

/// Source of terminal profile directories consulted by the launch policy.
pub trait TerminalDirectorySource {
    fn profile_starting_directory(&self, profile: Option<&str>) -> Option<String>;
}

impl TerminalDirectorySource for TerminalSettings {
    fn profile_starting_directory(&self, profile: Option<&str>) -> Option<String> {
        TerminalSettings::profile_starting_directory(self, profile)
    }
}

/// Settings file read on demand.
///
/// A missing or malformed file is logged and treated as having no profile
/// directories.
#[derive(Debug, Clone)]
pub struct TerminalSettingsFile {
    path: Option<PathBuf>,
}

impl TerminalSettingsFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the file, failing when no location is known.
    pub fn load(&self) -> Result<TerminalSettings> {
        let path = self
            .path
            .as_deref()
            .context("Windows Terminal settings location is unknown")?;
        TerminalSettings::load(path)
    }
}

impl TerminalDirectorySource for TerminalSettingsFile {
    fn profile_starting_directory(&self, profile: Option<&str>) -> Option<String> {
        match self.load() {
            Ok(settings) => settings.profile_starting_directory(profile),
            Err(e) => {
                log::warn!("Ignoring Windows Terminal settings: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
// This file was initially generated by Windows Terminal
{
    "$schema": "https://aka.ms/terminal-profiles-schema",
    "defaultProfile": "{61c54bbd-c2c6-5271-96e7-009a87ff44bf}",
    "profiles": {
        "defaults": {},
        "list": [
            {
                // Make changes here to the powershell.exe profile.
                "guid": "{61c54bbd-c2c6-5271-96e7-009a87ff44bf}",
                "name": "Windows PowerShell",
                "commandline": "powershell.exe",
                "hidden": false,
                "startingDirectory": "C:\\Users\\dev"
            },
            {
                "guid": "{0caa0dad-35be-5f56-a8ff-afceeeaa6101}",
                "name": "Command Prompt",
                "commandline": "cmd.exe",
                "hidden": false
            },
            {
                "guid": "{b453ae62-4e3d-5e58-b989-0a998ec441b8}",
                "name": "Azure Cloud Shell",
                "hidden": true,
                "startingDirectory": "/home/azure"
            }
        ]
    }
}
"#;

    fn settings() -> TerminalSettings {
        TerminalSettings::parse(SETTINGS).expect("sample settings parse")
    }

    #[test]
    fn test_parse_profile_list() {
        let settings = settings();
        assert_eq!(settings.profiles.len(), 3);
        assert_eq!(settings.profiles[1].name, "Command Prompt");
        assert_eq!(settings.profiles[1].starting_directory, None);
    }

    #[test]
    fn test_parse_bare_profile_list() {
        let settings = TerminalSettings::parse(
            r#"{"profiles": [{"guid": "{0caa0dad-35be-5f56-a8ff-afceeeaa6101}", "name": "cmd"}]}"#,
        )
        .expect("bare list parses");
        assert_eq!(settings.profiles.len(), 1);
        assert_eq!(settings.default_profile, None);
    }

    #[test]
    fn test_starting_directory_by_guid_and_name() {
        let settings = settings();
        assert_eq!(
            settings
                .profile_starting_directory(Some("{61C54BBD-C2C6-5271-96E7-009A87FF44BF}"))
                .as_deref(),
            Some("C:\\Users\\dev")
        );
        assert_eq!(
            settings
                .profile_starting_directory(Some("Windows PowerShell"))
                .as_deref(),
            Some("C:\\Users\\dev")
        );
        assert_eq!(settings.profile_starting_directory(Some("Command Prompt")), None);
        assert_eq!(settings.profile_starting_directory(Some("missing")), None);
    }

    #[test]
    fn test_starting_directory_defaults_to_default_profile() {
        let settings = settings();
        assert_eq!(
            settings.profile_starting_directory(None).as_deref(),
            Some("C:\\Users\\dev")
        );
        assert_eq!(
            settings.profile_starting_directory(Some("  ")).as_deref(),
            Some("C:\\Users\\dev")
        );
    }

    #[test]
    fn test_visible_profiles_skip_hidden() {
        let settings = settings();
        let names: Vec<&str> = settings.visible_profiles().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Windows PowerShell", "Command Prompt"]);
        assert!(settings.is_default(&settings.profiles[0]));
        assert!(!settings.is_default(&settings.profiles[1]));
    }

    #[test]
    fn test_launch_id_prefers_guid() {
        let settings = settings();
        assert_eq!(
            settings.profiles[1].launch_id(),
            "{0caa0dad-35be-5f56-a8ff-afceeeaa6101}"
        );
        let nameless = TerminalProfile {
            guid: None,
            name: "Ubuntu".to_string(),
            commandline: None,
            hidden: false,
            starting_directory: None,
        };
        assert_eq!(nameless.launch_id(), "Ubuntu");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(TerminalSettings::parse("{ not json").is_err());
    }

    #[test]
    fn test_settings_file_missing_yields_none() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let file = TerminalSettingsFile::new(Some(temp_dir.path().join("settings.json")));
        assert!(file.load().is_err());
        assert_eq!(
            TerminalDirectorySource::profile_starting_directory(&file, None),
            None
        );
    }

    #[test]
    fn test_resolve_settings_path() {
        assert_eq!(
            resolve_settings_path("/opt/wt/settings.json"),
            Some(PathBuf::from("/opt/wt/settings.json"))
        );
        assert_eq!(resolve_settings_path(""), default_settings_path());
    }
}
