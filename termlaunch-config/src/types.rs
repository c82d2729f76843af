//! Enum-valued settings and the values they map to.

use crate::map_entry::SettingEnum;
use serde::{Deserialize, Serialize};

// ============================================================================
// Status bar
// ============================================================================

/// Stored value of `windowsTerminal.statusBarAlignment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarAlignmentKey {
    /// Hide the status bar item
    None,
    #[default]
    Left,
    Right,
}

impl SettingEnum for StatusBarAlignmentKey {
    fn variants() -> &'static [Self] {
        &[Self::None, Self::Left, Self::Right]
    }
}

/// Side of the status bar the item is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBarAlignment {
    Left,
    Right,
}

impl StatusBarAlignmentKey {
    /// `None` means the item is hidden.
    pub fn alignment(self) -> Option<StatusBarAlignment> {
        match self {
            Self::None => None,
            Self::Left => Some(StatusBarAlignment::Left),
            Self::Right => Some(StatusBarAlignment::Right),
        }
    }
}

/// Stored value of `windowsTerminal.statusBarCommand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize, Default)]
pub enum StatusBarCommand {
    #[default]
    #[serde(rename = "windowsTerminal.open")]
    Open,
    #[serde(rename = "windowsTerminal.openProfile")]
    OpenProfile,
    #[serde(rename = "windowsTerminal.openSettings")]
    OpenSettings,
}

impl SettingEnum for StatusBarCommand {
    fn variants() -> &'static [Self] {
        &[Self::Open, Self::OpenProfile, Self::OpenSettings]
    }
}

impl StatusBarCommand {
    /// Command identifier run on click.
    pub fn command_id(self) -> &'static str {
        match self {
            Self::Open => "windowsTerminal.open",
            Self::OpenProfile => "windowsTerminal.openProfile",
            Self::OpenSettings => "windowsTerminal.openSettings",
        }
    }

    /// Tooltip shown for the command.
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open Windows Terminal",
            Self::OpenProfile => "Open Windows Terminal with Profile",
            Self::OpenSettings => "Open Windows Terminal's settings.json",
        }
    }
}

// ============================================================================
// Starting directory
// ============================================================================

/// Stored value of `windowsTerminal.directoryOptionPriority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize, Default)]
pub enum DirectoryPriorityKey {
    #[serde(rename = "No specified")]
    NoSpecified,
    #[serde(rename = "Prioritize Windows Terminal's settings")]
    PrioritizeTerminal,
    #[default]
    #[serde(rename = "Prioritize VS Code's settings")]
    PrioritizeEditor,
}

impl SettingEnum for DirectoryPriorityKey {
    fn variants() -> &'static [Self] {
        &[
            Self::NoSpecified,
            Self::PrioritizeTerminal,
            Self::PrioritizeEditor,
        ]
    }
}

/// Policy choosing the starting directory passed to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryPriority {
    /// Pass no directory; the terminal profile decides.
    NotSpecified,
    /// Terminal profile's `startingDirectory`, then the editor's directory.
    TerminalFirst,
    /// Editor's directory, then the terminal profile's `startingDirectory`.
    EditorFirst,
}

impl DirectoryPriorityKey {
    pub fn priority(self) -> DirectoryPriority {
        match self {
            Self::NoSpecified => DirectoryPriority::NotSpecified,
            Self::PrioritizeTerminal => DirectoryPriority::TerminalFirst,
            Self::PrioritizeEditor => DirectoryPriority::EditorFirst,
        }
    }
}

impl DirectoryPriority {
    /// Pick a directory from the two sources in policy order.
    ///
    /// Sources are only consulted when needed, so the terminal settings file
    /// is never read under `EditorFirst` when the editor provides a directory.
    pub fn resolve<E, T>(self, editor_directory: E, terminal_directory: T) -> Option<String>
    where
        E: FnOnce() -> Option<String>,
        T: FnOnce() -> Option<String>,
    {
        match self {
            Self::NotSpecified => None,
            Self::TerminalFirst => terminal_directory().or_else(editor_directory),
            Self::EditorFirst => editor_directory().or_else(terminal_directory),
        }
    }
}
