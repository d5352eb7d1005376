//! Single-instance guard.
//!
//! Commands that touch pipeline state hold an exclusive advisory lock on
//! `<data dir>/aiwall.lock` for as long as they run.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::constants::LOCK_FILE;
use crate::error::AiwallError;

/// Held lock on the instance file. Released on drop.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    file: Option<File>,
}

impl InstanceLock {
    /// Takes the instance lock inside `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::AlreadyRunning`] if another holder has the lock,
    /// or [`AiwallError::Io`] if the lock file cannot be opened.
    pub fn acquire(data_dir: &Path) -> Result<Self, AiwallError> {
        fs::create_dir_all(data_dir).map_err(|err| AiwallError::io(data_dir.display(), &err))?;

        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|err| AiwallError::io(path.display(), &err))?;

        if let Err(err) = file.try_lock_exclusive() {
            if err.kind() == fs2::lock_contended_error().kind() {
                tracing::warn!(path = %path.display(), "instance lock is held by another process");
                return Err(AiwallError::AlreadyRunning);
            }
            return Err(AiwallError::io(path.display(), &err));
        }

        tracing::debug!(path = %path.display(), "acquired instance lock");
        Ok(Self { path, file: Some(file) })
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(err) = FileExt::unlock(&file) {
                tracing::debug!(error = %err, "failed to release instance lock");
            }
        }
    }
}
