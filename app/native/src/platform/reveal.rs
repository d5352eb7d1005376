//! Opening the platform file manager at a file.

use std::path::Path;
use std::process::Command;

use crate::error::AiwallError;

/// Builds the command that shows `path` in the file manager.
///
/// Windows and macOS select the file itself; other platforms open the
/// containing directory.
#[must_use]
pub fn reveal_command(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("explorer");
        cmd.arg(format!("/select,{}", path.display()));
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg("-R").arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path.parent().unwrap_or(path));
        cmd
    }
}

/// Shows `path` in the platform file manager.
///
/// # Errors
///
/// Returns [`AiwallError::NotFound`] if the file does not exist and
/// [`AiwallError::Io`] if the file manager cannot be launched.
pub fn reveal_in_file_manager(path: &Path) -> Result<(), AiwallError> {
    if !path.exists() {
        return Err(AiwallError::NotFound(format!("File not found: {}", path.display())));
    }

    let mut cmd = reveal_command(path);
    tracing::debug!(command = ?cmd, "opening file manager");
    // The file manager outlives us; don't wait on it.
    cmd.spawn().map_err(|err| AiwallError::io("failed to open file manager", &err))?;
    Ok(())
}
