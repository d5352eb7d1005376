//! Error types for aiwall.
//!
//! This module provides the unified error type used throughout the application.
//! Every pipeline, store, and CLI command reports failures through [`AiwallError`],
//! whose `Display` output is the single human-readable message shown to the user.

use thiserror::Error;

use crate::wallpaper::ProcessingError;

/// Errors that can occur during application execution.
#[derive(Debug, Error)]
pub enum AiwallError {
    /// No API credential has been saved yet.
    #[error("API key not found. Please enter and save your API key.")]
    MissingCredential,
    /// The image generation API rejected the request or could not be reached.
    #[error("API error: {0}")]
    Remote(String),
    /// Local read or write failure.
    #[error("IO error: {0}")]
    Io(String),
    /// The stored credential could not be decrypted with the local key.
    #[error("Failed to decrypt stored API key: {0}")]
    Decryption(String),
    /// The library record file exists but cannot be parsed.
    #[error("Library data is corrupt: {0}")]
    CorruptData(String),
    /// A library selection or the file it references does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Image processing failed.
    #[error("Image processing error: {0}")]
    Processing(#[from] ProcessingError),
    /// The OS refused to change the desktop background.
    #[error("Wallpaper error: {0}")]
    Wallpaper(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// A generation is already running in the single worker slot.
    #[error("A wallpaper generation is already in progress")]
    Busy,
    /// The generation was cancelled between stages.
    #[error("Wallpaper generation was cancelled")]
    Cancelled,
    /// Another aiwall process holds the instance lock.
    #[error("Application is already running!")]
    AlreadyRunning,
}

impl AiwallError {
    /// Builds an [`AiwallError::Io`] that names what was being accessed.
    pub fn io(context: impl std::fmt::Display, err: &std::io::Error) -> Self {
        Self::Io(format!("{context}: {err}"))
    }
}

impl From<std::io::Error> for AiwallError {
    fn from(err: std::io::Error) -> Self { Self::Io(err.to_string()) }
}

impl From<serde_json::Error> for AiwallError {
    fn from(err: serde_json::Error) -> Self { Self::CorruptData(err.to_string()) }
}

impl From<reqwest::Error> for AiwallError {
    fn from(err: reqwest::Error) -> Self { Self::Remote(err.to_string()) }
}
