//! Configuration file watcher for hot-reloading.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::platform::spawn_named_thread;

/// Debounce duration for config file changes.
/// Some editors trigger multiple events per save (write to temp, rename, etc.).
const CONFIG_DEBOUNCE_MS: u64 = 200;

/// Watches `config_path` and calls `on_change` after each debounced change.
///
/// The parent directory is watched so that editors which save by renaming a
/// temporary file are still detected. The watcher runs on its own thread
/// until `on_change` returns `false`.
pub fn watch_config_file<F>(config_path: PathBuf, on_change: F)
where F: Fn() -> bool + Send + 'static {
    let config_filename =
        config_path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();

    spawn_named_thread("config-watcher", move || {
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create config watcher");
                return;
            }
        };

        let watch_path = config_path.parent().unwrap_or(&config_path);
        if let Err(err) = watcher.watch(watch_path, RecursiveMode::NonRecursive) {
            tracing::warn!(path = %watch_path.display(), error = %err, "failed to watch config file");
            return;
        }

        tracing::debug!(path = %config_path.display(), "watching configuration file");

        let mut last_event_time: Option<Instant> = None;
        let debounce_duration = Duration::from_millis(CONFIG_DEBOUNCE_MS);

        for result in rx {
            match result {
                Ok(event) => {
                    let affects_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some_and(|name| name == config_filename));
                    if !affects_config {
                        continue;
                    }

                    let now = Instant::now();
                    if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                        continue;
                    }
                    last_event_time = Some(now);

                    tracing::info!("configuration file changed");
                    if !on_change() {
                        break;
                    }
                }
                Err(err) => tracing::warn!(error = %err, "config watch error"),
            }
        }
    });
}
