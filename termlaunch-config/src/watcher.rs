//! Settings file watcher for automatic reload.
//!
//! Watches the files backing a [`crate::LayeredStore`] and reports changes so
//! the host can call [`crate::LayeredStore::reload`] and forward the resulting
//! event to the registry. Uses debouncing to avoid multiple reloads during
//! rapid saves from editors.

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, PollWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

/// Event indicating a settings file has changed and needs reloading.
#[derive(Debug, Clone)]
pub struct SettingsChangeEvent {
    /// Path of the settings file that changed.
    pub path: PathBuf,
}

/// Watches settings files for changes and sends reload events.
pub struct SettingsWatcher {
    /// The file system watcher (kept alive to maintain watching).
    _watcher: Box<dyn Watcher + Send>,
    /// Receiver for settings change events.
    event_receiver: Receiver<SettingsChangeEvent>,
    watched: Vec<PathBuf>,
}

impl std::fmt::Debug for SettingsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatcher")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

/// Debounce bookkeeping shared by both watcher backends.
///
/// The first event of a burst is sent at once. Later events inside the window
/// only record their path, and a single flush sends the latest one when the
/// window closes, so the final write of a save is never lost.
#[derive(Debug, Default)]
struct DebounceState {
    last_sent: Option<Instant>,
    pending: Option<PathBuf>,
    flush_scheduled: bool,
}

/// Build the event-handler closure shared by both watcher backends.
///
/// Filters events to the watched files, applies debouncing, and sends
/// `SettingsChangeEvent` values on `tx`.
fn make_event_handler(
    files: Arc<Vec<PathBuf>>,
    debounce_delay: Duration,
    tx: Sender<SettingsChangeEvent>,
    state: Arc<Mutex<DebounceState>>,
) -> impl Fn(std::result::Result<Event, notify::Error>) + Send + 'static {
    move |result: std::result::Result<Event, notify::Error>| {
        let Ok(event) = result else {
            return;
        };

        // Create and remove cover atomic saves that replace the file
        if !matches!(
            event.kind,
            notify::EventKind::Modify(_) | notify::EventKind::Create(_) | notify::EventKind::Remove(_)
        ) {
            return;
        }

        let Some(changed) = event
            .paths
            .iter()
            .find_map(|p| files.iter().find(|f| same_file_name(f, p)))
        else {
            return;
        };

        let now = Instant::now();
        let mut guard = state.lock();
        let in_window = guard.flush_scheduled
            || guard
                .last_sent
                .is_some_and(|last| now.duration_since(last) < debounce_delay);
        if !in_window {
            guard.last_sent = Some(now);
            drop(guard);
            send_change(&tx, changed.clone());
            return;
        }

        log::trace!("Debouncing settings reload event");
        guard.pending = Some(changed.clone());
        if guard.flush_scheduled {
            return;
        }
        guard.flush_scheduled = true;
        let wait = guard
            .last_sent
            .and_then(|last| last.checked_add(debounce_delay))
            .map_or(debounce_delay, |end| end.saturating_duration_since(now));
        drop(guard);

        let state = Arc::clone(&state);
        let tx = tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(wait);
            let pending = {
                let mut guard = state.lock();
                guard.flush_scheduled = false;
                guard.last_sent = Some(Instant::now());
                guard.pending.take()
            };
            if let Some(path) = pending {
                send_change(&tx, path);
            }
        });
    }
}

fn send_change(tx: &Sender<SettingsChangeEvent>, path: PathBuf) {
    log::info!("Settings file changed: {}", path.display());
    if let Err(e) = tx.send(SettingsChangeEvent { path }) {
        log::error!("Failed to send settings reload event: {}", e);
    }
}

/// Event paths may be canonical while watched paths are not; compare the
/// parent directory and file name separately.
fn same_file_name(watched: &Path, event_path: &Path) -> bool {
    watched.file_name() == event_path.file_name()
        && match (watched.parent(), event_path.parent()) {
            (Some(a), Some(b)) => a == b || canonical(a) == canonical(b),
            _ => false,
        }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl SettingsWatcher {
    /// Watch every file in `paths`.
    ///
    /// Files need not exist yet, but their parent directory must; a settings
    /// file created later is picked up. Uses the platform's native watcher and
    /// falls back to a `PollWatcher` (500 ms) where that is unavailable.
    ///
    /// # Errors
    /// Returns an error if none of the parent directories exist or watching
    /// fails on both backends.
    pub fn new(paths: &[PathBuf], debounce_delay_ms: u64) -> Result<Self> {
        let files: Vec<PathBuf> = paths
            .iter()
            .filter(|p| p.parent().is_some_and(Path::exists))
            .map(|p| match (p.parent(), p.file_name()) {
                (Some(parent), Some(name)) => canonical(parent).join(name),
                _ => p.clone(),
            })
            .collect();

        if files.is_empty() {
            anyhow::bail!("No settings directory to watch among {:?}", paths);
        }

        let directories: BTreeSet<PathBuf> = files
            .iter()
            .filter_map(|f| f.parent().map(Path::to_path_buf))
            .collect();

        let (tx, rx) = channel::<SettingsChangeEvent>();
        let files = Arc::new(files);
        let mut watcher = Self::create_watcher(
            Arc::clone(&files),
            Duration::from_millis(debounce_delay_ms),
            tx,
        )?;

        for directory in &directories {
            watcher
                .watch(directory, RecursiveMode::NonRecursive)
                .with_context(|| {
                    format!("Failed to watch settings directory: {}", directory.display())
                })?;
            log::info!("Settings hot reload: watching {}", directory.display());
        }

        Ok(Self {
            _watcher: watcher,
            event_receiver: rx,
            watched: (*files).clone(),
        })
    }

    /// Try to create the best available watcher backend.
    fn create_watcher(
        files: Arc<Vec<PathBuf>>,
        debounce_delay: Duration,
        tx: Sender<SettingsChangeEvent>,
    ) -> Result<Box<dyn Watcher + Send>> {
        let state: Arc<Mutex<DebounceState>> = Arc::default();
        let handler = make_event_handler(
            Arc::clone(&files),
            debounce_delay,
            tx.clone(),
            Arc::clone(&state),
        );

        match notify::recommended_watcher(handler) {
            Ok(w) => {
                log::debug!("Settings watcher: using native (RecommendedWatcher) backend");
                Ok(Box::new(w))
            }
            Err(e) => {
                log::warn!(
                    "Settings watcher: native backend unavailable ({}); falling back to PollWatcher",
                    e
                );
                let fallback_handler =
                    make_event_handler(files, debounce_delay, tx, state);
                let poll_watcher = PollWatcher::new(
                    fallback_handler,
                    NotifyConfig::default().with_poll_interval(Duration::from_millis(500)),
                )
                .context("Failed to create fallback PollWatcher")?;
                Ok(Box::new(poll_watcher))
            }
        }
    }

    /// Files being watched (with canonical parent directories).
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Check for pending reload events (non-blocking).
    pub fn try_recv(&self) -> Option<SettingsChangeEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next reload event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SettingsChangeEvent> {
        self.event_receiver.recv_timeout(timeout).ok()
    }
}
