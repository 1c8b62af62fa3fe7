//! Named background threads.

use std::thread;

use crate::constants::APP_NAME;

/// Spawns a detached thread named `wallspan-<name>`.
///
/// Spawn failures are logged rather than returned; callers treat the thread
/// as optional.
pub fn spawn_named_thread<F>(name: &str, task: F)
where F: FnOnce() + Send + 'static {
    let thread_name = format!("{APP_NAME}-{name}");

    if let Err(err) = thread::Builder::new().name(thread_name.clone()).spawn(task) {
        tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
    }
}
