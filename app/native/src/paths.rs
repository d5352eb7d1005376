//! Data and working directory locations.
//!
//! Persistent state lives under `{data_dir}/aiwall/` (falling back to
//! `/tmp/aiwall/` when the platform data directory is unknown). Transient files
//! for a single generation live in a process-scoped work directory under the
//! system temp directory.

use std::path::{Path, PathBuf};

use crate::constants::{
    APP_ID, CREDENTIAL_FILE, CURRENT_WALLPAPER_FILE, ENCRYPTION_KEY_FILE, LIBRARY_DIR, LOCK_FILE,
};

/// Resolved locations for everything aiwall reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Root of persistent state (key, credential, lock, current wallpaper).
    pub data_dir: PathBuf,
    /// Directory holding generated wallpapers and the record file.
    pub library_dir: PathBuf,
    /// Process-scoped directory for transient generation files.
    pub work_dir: PathBuf,
}

impl AppPaths {
    /// Returns the platform default locations.
    ///
    /// `library_override` replaces the default library directory when set.
    #[must_use]
    pub fn default_locations(library_override: Option<PathBuf>) -> Self {
        let data_dir = get_data_dir();
        let library_dir = library_override.unwrap_or_else(|| data_dir.join(LIBRARY_DIR));
        Self { data_dir, library_dir, work_dir: default_work_dir() }
    }

    /// Places every location under `root`. Used for isolated runs and tests.
    #[must_use]
    pub fn rooted_at(root: &Path) -> Self {
        let data_dir = root.join("data");
        Self {
            library_dir: data_dir.join(LIBRARY_DIR),
            data_dir,
            work_dir: root.join("work"),
        }
    }

    #[must_use]
    pub fn key_file(&self) -> PathBuf { self.data_dir.join(ENCRYPTION_KEY_FILE) }

    #[must_use]
    pub fn credential_file(&self) -> PathBuf { self.data_dir.join(CREDENTIAL_FILE) }

    #[must_use]
    pub fn lock_file(&self) -> PathBuf { self.data_dir.join(LOCK_FILE) }

    /// Where the image handed to the OS wallpaper call is written.
    #[must_use]
    pub fn current_wallpaper(&self) -> PathBuf { self.data_dir.join(CURRENT_WALLPAPER_FILE) }
}

/// Returns the root data directory for the application.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(format!("/tmp/{APP_ID}")), |dir| dir.join(APP_ID))
}

/// Returns the work directory owned by the current process.
#[must_use]
pub fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join(format!("{APP_ID}-{}", std::process::id()))
}

/// Removes a work directory and everything in it, or a stray file at its path.
///
/// Best-effort: failures are logged and swallowed.
pub fn purge_work_dir(dir: &Path) {
    if !dir.exists() {
        return;
    }

    let removed = if dir.is_dir() { std::fs::remove_dir_all(dir) } else { std::fs::remove_file(dir) };
    match removed {
        Ok(()) => tracing::debug!(path = %dir.display(), "removed work directory"),
        Err(err) => {
            tracing::warn!(path = %dir.display(), error = %err, "failed to clean work directory");
        }
    }
}

/// Calculates the total size of the files directly inside a directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0u64;

    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.path().is_file() {
                total += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
    }

    Ok(total)
}

/// Formats a byte count as a human-readable string.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Precision loss is acceptable for human-readable output
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
