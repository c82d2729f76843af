// Library exports for testing and potential library use
//
// # Lock Usage
//
// Settings state is sync-only and guarded by `parking_lot` locks inside
// `termlaunch-config` (entry caches, store layers, watcher debounce state).
// No lock is held while a value is computed or a file is written, so a
// producer may read other entries freely.

/// Application version (root crate version).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod cli;
pub mod debug;
pub mod launch;
pub mod status_bar;
pub mod wt_settings;

pub use app::App;
pub use launch::{Invocation, LaunchRequest};
pub use status_bar::StatusBarItem;
pub use wt_settings::{TerminalProfile, TerminalSettings};
