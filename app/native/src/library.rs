//! Library of previously generated wallpapers.
//!
//! Each saved wallpaper is a processed JPEG inside the library directory plus
//! an entry in `metadata.json`, a JSON object mapping file name to
//! `{prompt, date, path}` in insertion order.
//!
//! The record file is rewritten whole on every save. Writes go through a temp
//! file and a rename, and are serialised by an in-process mutex; only one
//! process may write a given library at a time (the instance lock enforces
//! this for the CLI).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::constants::LIBRARY_RECORD_FILE;
use crate::error::AiwallError;
use crate::wallpaper::WallpaperProcessor;

/// Timestamp format used in file names and the `date` field.
pub const DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Maximum prompt characters shown in a one-line summary.
const SUMMARY_PROMPT_CHARS: usize = 50;

/// A saved wallpaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub file_name: String,
    pub prompt: String,
    pub date: String,
    pub path: PathBuf,
}

impl LibraryEntry {
    /// Parses the stored `date` field.
    #[must_use]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    /// One-line label: `date - first 50 prompt chars...`.
    #[must_use]
    pub fn summary(&self) -> String {
        let prompt: String = self.prompt.chars().take(SUMMARY_PROMPT_CHARS).collect();
        format!("{} - {prompt}...", self.date)
    }

    /// Fails with [`AiwallError::NotFound`] if the image file is gone.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::NotFound`] when the referenced file is missing.
    pub fn require_file(&self) -> Result<&Path, AiwallError> {
        if self.path.is_file() {
            Ok(&self.path)
        } else {
            Err(AiwallError::NotFound(format!("File not found: {}", self.path.display())))
        }
    }
}

/// Shape of one value in the record file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    prompt: String,
    date: String,
    path: String,
}

/// Owns the library directory and its record file.
#[derive(Debug)]
pub struct LibraryStore {
    dir: PathBuf,
    processor: Arc<WallpaperProcessor>,
    write_lock: Mutex<()>,
}

impl LibraryStore {
    #[must_use]
    pub fn new(dir: PathBuf, processor: Arc<WallpaperProcessor>) -> Self {
        Self { dir, processor, write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn dir(&self) -> &Path { &self.dir }

    #[must_use]
    pub fn record_path(&self) -> PathBuf { self.dir.join(LIBRARY_RECORD_FILE) }

    /// Creates the library directory and an empty record file if missing.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Io`] if either cannot be created.
    pub fn ensure(&self) -> Result<(), AiwallError> {
        fs::create_dir_all(&self.dir).map_err(|err| AiwallError::io(self.dir.display(), &err))?;

        let record = self.record_path();
        if !record.exists() {
            fs::write(&record, "{}").map_err(|err| AiwallError::io(record.display(), &err))?;
            tracing::debug!(path = %record.display(), "created library record file");
        }
        Ok(())
    }

    /// Processes `working_file` into the library and records it.
    ///
    /// The file is named `wallpaper_<YYYYMMDD_HHMMSS>.jpg`; a `_2`, `_3`, ...
    /// suffix is added when that name is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::CorruptData`] if the existing record cannot be
    /// parsed, [`AiwallError::Processing`] if the image cannot be processed,
    /// [`AiwallError::Io`] if the record cannot be written (the processed
    /// image is removed again in that case).
    pub fn save(&self, working_file: &Path, prompt: &str) -> Result<PathBuf, AiwallError> {
        self.save_at(working_file, prompt, Local::now())
    }

    fn save_at<Tz>(&self, working_file: &Path, prompt: &str, now: DateTime<Tz>) -> Result<PathBuf, AiwallError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.ensure()?;
        let _guard = self.write_lock.lock();

        let mut record = self.read_record()?;
        let date = now.format(DATE_FORMAT).to_string();
        let file_name = self.unique_file_name(&record, &date);
        let destination = self.dir.join(&file_name);

        self.processor.process_file(working_file, &destination)?;

        let stored = StoredEntry {
            prompt: prompt.to_string(),
            date,
            path: destination.display().to_string(),
        };
        record.insert(file_name.clone(), serde_json::to_value(stored)?);
        if let Err(err) = self.write_record(&record) {
            if let Err(cleanup) = fs::remove_file(&destination) {
                tracing::warn!(file = %file_name, error = %cleanup, "failed to remove unrecorded wallpaper");
            }
            return Err(err);
        }

        tracing::info!(file = %file_name, "saved wallpaper to library");
        Ok(destination)
    }

    /// Returns every entry in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::CorruptData`] if the record file cannot be
    /// parsed, [`AiwallError::Io`] if it cannot be read.
    pub fn list(&self) -> Result<Vec<LibraryEntry>, AiwallError> {
        self.read_record()?
            .into_iter()
            .map(|(file_name, value)| {
                let stored: StoredEntry = serde_json::from_value(value).map_err(|err| {
                    AiwallError::CorruptData(format!("entry '{file_name}': {err}"))
                })?;
                Ok(LibraryEntry {
                    file_name,
                    prompt: stored.prompt,
                    date: stored.date,
                    path: PathBuf::from(stored.path),
                })
            })
            .collect()
    }

    /// Returns the entry at a 0-based position in [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::NotFound`] if `index` is out of range.
    pub fn entry_at(&self, index: usize) -> Result<LibraryEntry, AiwallError> {
        let entries = self.list()?;
        let count = entries.len();
        entries.into_iter().nth(index).ok_or_else(|| {
            AiwallError::NotFound(format!("library entry #{} (library has {count})", index + 1))
        })
    }

    fn read_record(&self) -> Result<Map<String, Value>, AiwallError> {
        let path = self.record_path();
        if !path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&path).map_err(|err| AiwallError::io(path.display(), &err))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content)
            .map_err(|err| AiwallError::CorruptData(format!("{}: {err}", path.display())))
    }

    fn write_record(&self, record: &Map<String, Value>) -> Result<(), AiwallError> {
        let path = self.record_path();
        let json = serde_json::to_string_pretty(record)?;

        let mut tmp =
            NamedTempFile::new_in(&self.dir).map_err(|err| AiwallError::io(self.dir.display(), &err))?;
        tmp.write_all(json.as_bytes()).map_err(|err| AiwallError::io(tmp.path().display(), &err))?;
        tmp.persist(&path).map_err(|err| AiwallError::io(path.display(), &err.error))?;
        Ok(())
    }

    fn unique_file_name(&self, record: &Map<String, Value>, date: &str) -> String {
        let taken = |name: &str| record.contains_key(name) || self.dir.join(name).exists();

        let base = format!("wallpaper_{date}.jpg");
        if !taken(&base) {
            return base;
        }
        (2u32..)
            .map(|n| format!("wallpaper_{date}_{n}.jpg"))
            .find(|name| !taken(name))
            .unwrap_or(base)
    }
}
