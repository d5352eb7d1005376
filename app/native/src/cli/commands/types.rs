//! Shared types for CLI commands.

use std::str::FromStr;

use clap::Args;

use crate::generation::PromptSelection;

/// A 1-based library entry index, as shown by `library list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct LibraryIndex(usize);

impl LibraryIndex {
    /// Creates a new `LibraryIndex` from a 1-based index.
    #[must_use]
    pub const fn new(index: usize) -> Self { Self(index) }

    /// Returns the 0-based index used by the library store.
    #[must_use]
    pub const fn as_zero_based(self) -> usize { self.0.saturating_sub(1) }
}

impl std::fmt::Display for LibraryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

impl FromStr for LibraryIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid library index '{s}'. Expected a positive integer (1 = first entry).");
        match s.trim().trim_start_matches('#').parse::<usize>() {
            Ok(0) | Err(_) => Err(invalid()),
            Ok(index) => Ok(Self(index)),
        }
    }
}

/// Prompt options shared by `generate` and `watch`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptArgs {
    /// Custom prompt text. Overrides the preset.
    #[arg(long, short, value_name = "TEXT", conflicts_with = "preset")]
    pub prompt: Option<String>,

    /// Preset name (see `aiwall presets`), or "Random".
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Do not keep a copy in the library.
    #[arg(long, conflicts_with = "save")]
    pub no_save: bool,

    /// Keep a copy in the library even if `library.saveByDefault` is false.
    #[arg(long)]
    pub save: bool,
}

impl PromptArgs {
    /// Applies the flags on top of the configured selection.
    #[must_use]
    pub fn selection(&self, configured: PromptSelection) -> PromptSelection {
        if let Some(prompt) = &self.prompt {
            return PromptSelection::custom(prompt.clone());
        }
        match &self.preset {
            Some(preset) => PromptSelection::preset(preset.clone()),
            None => configured,
        }
    }

    /// Whether to save to the library, given the configured default.
    #[must_use]
    pub const fn save_to_library(&self, save_by_default: bool) -> bool {
        if self.no_save {
            false
        } else {
            self.save || save_by_default
        }
    }
}
