//! Command-line interface for termlaunch.
//!
//! Parses global flags into [`RuntimeOptions`] and the subcommand into
//! [`Commands`]; [`crate::app::App::run`] executes it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use termlaunch_config::ConfigTarget;

/// termlaunch - Open Windows Terminal with the profile and directory from your settings
#[derive(Parser, Debug)]
#[command(name = "termlaunch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace folder; its `.termlaunch/settings.json` is the workspace layer
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Extra settings file with the highest precedence
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// User settings file (default: ~/.config/termlaunch/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub user_settings: Option<PathBuf>,

    /// Print commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Set debug log level (overrides RUST_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Settings layer argument for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TargetArg {
    #[default]
    User,
    Workspace,
    WorkspaceFolder,
}

impl From<TargetArg> for ConfigTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::User => ConfigTarget::User,
            TargetArg::Workspace => ConfigTarget::Workspace,
            TargetArg::WorkspaceFolder => ConfigTarget::WorkspaceFolder,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Open Windows Terminal (the default command)
    Open {
        /// Profile name or GUID (default: windowsTerminal.defaultProfile)
        #[arg(short, long)]
        profile: Option<String>,

        /// Starting directory (default: resolved by directoryOptionPriority)
        #[arg(short, long)]
        directory: Option<String>,

        /// Language id whose overrides apply
        #[arg(long, value_name = "ID")]
        language: Option<String>,
    },

    /// Open Windows Terminal with a profile from its settings.json
    OpenProfile {
        /// Profile name or GUID
        profile: String,

        /// Language id whose overrides apply
        #[arg(long, value_name = "ID")]
        language: Option<String>,
    },

    /// List the visible Windows Terminal profiles
    Profiles,

    /// Open Windows Terminal's settings.json
    OpenSettings,

    /// Open the Windows Terminal page in the Microsoft Store
    ShowStore,

    /// Open the Windows Terminal user documentation
    ShowDocument,

    /// Show the status bar item built from the settings
    Status,

    /// Read or write windowsTerminal.* settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Watch the settings files and report changes until interrupted
    Watch {
        /// Debounce delay for rapid saves
        #[arg(long, value_name = "MS", default_value_t = 100)]
        debounce_ms: u64,

        /// Exit after the specified number of seconds
        #[arg(long, value_name = "SECONDS")]
        exit_after: Option<f64>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the resolved value of a setting
    Get {
        key: String,

        /// Language id whose overrides apply
        #[arg(long = "scope", value_name = "ID")]
        language: Option<String>,
    },

    /// Write a setting; VALUE is JSON, bare words are taken as strings
    Set {
        key: String,
        value: String,

        #[arg(long, value_enum, default_value_t = TargetArg::User)]
        target: TargetArg,
    },

    /// Remove a setting from a layer
    Reset {
        key: String,

        #[arg(long, value_enum, default_value_t = TargetArg::User)]
        target: TargetArg,
    },

    /// Print every setting with its resolved value
    List {
        #[arg(long = "scope", value_name = "ID")]
        language: Option<String>,
    },
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Workspace folder (workspace layer and fallback starting directory)
    pub workspace: Option<PathBuf>,
    /// Highest-precedence settings file
    pub settings: Option<PathBuf>,
    /// User settings file override
    pub user_settings: Option<PathBuf>,
    /// Print instead of spawning or opening
    pub dry_run: bool,
    /// Log level override from CLI
    pub log_level: Option<log::LevelFilter>,
}

impl Cli {
    /// Split into runtime options and the command to run (`open` when none).
    pub fn into_parts(self) -> (RuntimeOptions, Commands) {
        let options = RuntimeOptions {
            workspace: self.workspace,
            settings: self.settings,
            user_settings: self.user_settings,
            dry_run: self.dry_run,
            log_level: self.log_level.map(|l| l.to_level_filter()),
        };
        let command = self.command.unwrap_or(Commands::Open {
            profile: None,
            directory: None,
            language: None,
        });
        (options, command)
    }
}

/// Parse process arguments
pub fn process_cli() -> (RuntimeOptions, Commands) {
    Cli::parse().into_parts()
}
