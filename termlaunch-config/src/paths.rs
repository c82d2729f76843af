//! Settings file locations.

use std::path::{Path, PathBuf};

/// Directory name used under the platform config dir and inside workspaces.
const APP_DIR: &str = "termlaunch";

/// Settings file name in every layer.
pub const SETTINGS_FILE: &str = "settings.json";

/// Get the configuration directory path (using XDG convention)
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join(APP_DIR)
        } else {
            PathBuf::from(".")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join(APP_DIR)
        } else {
            PathBuf::from(".")
        }
    }
}

/// User-level settings file: `~/.config/termlaunch/settings.json`.
pub fn user_settings_path() -> PathBuf {
    config_dir().join(SETTINGS_FILE)
}

/// Workspace-level settings file: `<workspace>/.termlaunch/settings.json`.
pub fn workspace_settings_path(workspace: &Path) -> PathBuf {
    workspace.join(format!(".{}", APP_DIR)).join(SETTINGS_FILE)
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home_dir(path: &str) -> String {
    if let Some(suffix) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(suffix).to_string_lossy().to_string();
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_settings_path_ends_with_file() {
        let path = user_settings_path();
        assert!(path.ends_with("termlaunch/settings.json"));
    }

    #[test]
    fn test_workspace_settings_path() {
        let path = workspace_settings_path(Path::new("/work/project"));
        assert_eq!(
            path,
            PathBuf::from("/work/project/.termlaunch/settings.json")
        );
    }

    #[test]
    fn test_expand_home_dir_leaves_plain_paths() {
        assert_eq!(expand_home_dir("/opt/x"), "/opt/x");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home_dir("~/code"),
                home.join("code").to_string_lossy().to_string()
            );
        }
    }
}
