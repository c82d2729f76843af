//! Logging backend for termlaunch.
//!
//! Routes every `log::info!()` etc. to `termlaunch_debug.log` in the temp
//! directory (`/tmp/termlaunch_debug.log` on Unix, `%TEMP%` on Windows).
//! When `RUST_LOG` is set, records are mirrored to stderr as well.
//!
//! Level precedence: the `--log-level` flag, then `RUST_LOG`, then `warn`.

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

const LOG_FILE_NAME: &str = "termlaunch_debug.log";

/// Location of the log file.
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    {
        PathBuf::from("/tmp").join(LOG_FILE_NAME)
    }
    #[cfg(not(unix))]
    {
        std::env::temp_dir().join(LOG_FILE_NAME)
    }
}

struct LogBridge {
    level: LevelFilter,
    file: Mutex<Option<File>>,
    mirror_to_stderr: bool,
}

impl LogBridge {
    fn new(level: LevelFilter, mirror_to_stderr: bool) -> Self {
        let path = log_path();
        // Silently run without a file if it can't be opened
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok();

        let bridge = Self {
            level,
            file: Mutex::new(file),
            mirror_to_stderr,
        };
        bridge.write_raw(&format!(
            "\n{}\ntermlaunch session started at {} (level={})\n{}\n",
            "=".repeat(80),
            timestamp(),
            level,
            "=".repeat(80)
        ));
        bridge
    }

    fn write_raw(&self, msg: &str) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_to_stderr {
            eprint!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Parse a level name as accepted by `RUST_LOG` and `--log-level`.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse::<LevelFilter>().ok()
}

/// Pick the effective level from the flag and `RUST_LOG`.
pub fn effective_level(cli_level: Option<LevelFilter>, rust_log: Option<&str>) -> LevelFilter {
    cli_level
        .or_else(|| rust_log.and_then(parse_level))
        .unwrap_or(LevelFilter::Warn)
}

/// Install the logger. Calling it again has no effect.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let level = effective_level(cli_level, rust_log.as_deref());
    let bridge = BRIDGE.get_or_init(|| LogBridge::new(level, rust_log.is_some()));
    if log::set_logger(bridge).is_ok() {
        log::set_max_level(bridge.level);
    }
}
