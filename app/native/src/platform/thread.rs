use std::io;
use std::thread::{self, JoinHandle};

use crate::constants::APP_ID;

/// Spawns a worker thread named `aiwall-<name>`.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be created.
pub fn spawn_named_thread<F, T>(name: &str, task: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let thread_name = format!("{APP_ID}-{name}");

    thread::Builder::new().name(thread_name.clone()).spawn(task).inspect_err(|err| {
        tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
    })
}
