//! Desktop background integration.
//!
//! The OS call is hidden behind [`DesktopSetter`] so the pipeline can run
//! against a fake in tests.

use std::path::Path;

use crate::error::AiwallError;

/// Errors that can occur when setting the wallpaper.
#[derive(Debug)]
pub enum WallpaperError {
    /// The wallpaper file does not exist.
    FileNotFound(String),
    /// The OS rejected the request.
    SetWallpaperFailed(String),
}

impl std::fmt::Display for WallpaperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "Wallpaper file not found: {path}"),
            Self::SetWallpaperFailed(msg) => write!(f, "Failed to set wallpaper: {msg}"),
        }
    }
}

impl std::error::Error for WallpaperError {}

impl From<WallpaperError> for AiwallError {
    fn from(err: WallpaperError) -> Self {
        match err {
            WallpaperError::FileNotFound(path) => Self::NotFound(path),
            WallpaperError::SetWallpaperFailed(msg) => Self::Wallpaper(msg),
        }
    }
}

/// Applies an image file as the desktop background.
pub trait DesktopSetter: Send + Sync {
    /// Sets `path` as the wallpaper on every screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the OS call fails.
    fn set_wallpaper(&self, path: &Path) -> Result<(), WallpaperError>;
}

/// The real desktop, via the `wallpaper` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDesktop;

impl DesktopSetter for SystemDesktop {
    fn set_wallpaper(&self, path: &Path) -> Result<(), WallpaperError> {
        if !path.exists() {
            return Err(WallpaperError::FileNotFound(path.display().to_string()));
        }

        // The OS keeps a reference to the path, so hand it an absolute one.
        let absolute = std::path::absolute(path)
            .map_err(|e| WallpaperError::SetWallpaperFailed(e.to_string()))?;
        let path_str = absolute.display().to_string();

        wallpaper::set_from_path(&path_str)
            .map_err(|e| WallpaperError::SetWallpaperFailed(e.to_string()))?;

        tracing::info!(path = %path_str, "desktop wallpaper updated");
        Ok(())
    }
}
