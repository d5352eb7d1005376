//! Configuration types for aiwall.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::APP_ID;
use crate::platform::path::expand;

/// Default image generation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AiwallConfig {
    /// Image generation API settings.
    pub api: ApiConfig,

    /// Where generated wallpapers are kept.
    pub library: LibraryConfig,

    /// Default prompt selection.
    pub prompts: PromptConfig,

    /// Auto-change schedule.
    pub schedule: ScheduleConfig,
}

/// Image generation API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    /// Generation endpoint URL.
    pub endpoint: String,

    /// Model name sent with the request. Omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Requested image size.
    pub size: String,

    /// Requested image quality.
    pub quality: String,

    /// Timeout in seconds for each HTTP request.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: None,
            size: "1024x1024".to_string(),
            quality: "hd".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

/// Library settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LibraryConfig {
    /// Library directory. Empty uses the platform data directory.
    /// Supports `~` expansion.
    pub path: String,

    /// Whether generated wallpapers are saved to the library by default.
    pub save_by_default: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self { Self { path: String::new(), save_by_default: true } }
}

impl LibraryConfig {
    /// Returns the configured library directory, if any.
    #[must_use]
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if self.path.trim().is_empty() { None } else { Some(expand(&self.path)) }
    }
}

/// Prompt settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    /// Preset name, or "Random".
    pub preset: String,

    /// Custom prompt. Used instead of the preset when non-empty.
    pub custom: String,
}

impl Default for PromptConfig {
    fn default() -> Self { Self { preset: "Random".to_string(), custom: String::new() } }
}

/// Auto-change settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// "never", or a duration such as "30 minutes" or "6 hours".
    pub interval: String,

    /// Price of one generated image in USD, for cost estimates.
    pub price_per_image: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self { Self { interval: "never".to_string(), price_per_image: 0.040 } }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/{APP_ID}/config.jsonc \
                or ~/.{APP_ID}.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/aiwall/config.jsonc` or `config.json`, if set
/// 2. `~/.config/aiwall/config.jsonc` or `config.json`
/// 3. the platform config directory (`dirs::config_dir()`)
/// 4. `~/.aiwall.jsonc` or `~/.aiwall.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    fn push_dir(dir: &Path, paths: &mut Vec<PathBuf>) {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    let mut paths = Vec::new();

    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        push_dir(&PathBuf::from(xdg_config).join(APP_ID), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(&home.join(".config").join(APP_ID), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(&config_dir.join(APP_ID), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{APP_ID}.jsonc")));
        paths.push(home.join(format!(".{APP_ID}.json")));
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or the errors of [`load_config_from_path`].
pub fn load_config() -> Result<(AiwallConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}

/// Loads the configuration from a specific file.
///
/// Comments are stripped before parsing.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read, and
/// `ConfigError::ParseError` if it contains invalid JSON.
pub fn load_config_from_path(path: &Path) -> Result<(AiwallConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: AiwallConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AiwallConfig::default();
        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api.size, "1024x1024");
        assert_eq!(config.api.quality, "hd");
        assert_eq!(config.api.timeout(), Duration::from_secs(120));
        assert!(config.library.save_by_default);
        assert_eq!(config.prompts.preset, "Random");
        assert_eq!(config.schedule.interval, "never");
        assert!((config.schedule.price_per_image - 0.040).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "api": { "quality": "standard" }, "prompts": { "preset": "Beach Vistas" } }"#;
        let config: AiwallConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.api.quality, "standard");
        assert_eq!(config.api.size, "1024x1024");
        assert_eq!(config.prompts.preset, "Beach Vistas");
        assert!(config.prompts.custom.is_empty());
    }

    #[test]
    fn test_load_config_from_path_strips_comments() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.jsonc");
        fs::write(
            &path,
            "{\n  // every hour\n  \"schedule\": { \"interval\": \"1 hour\" /* inline */ }\n}",
        )
        .unwrap();

        let (config, loaded_from) = load_config_from_path(&path).unwrap();
        assert_eq!(config.schedule.interval, "1 hour");
        assert_eq!(loaded_from, path);
    }

    #[test]
    fn test_load_config_from_path_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.jsonc");
        assert!(matches!(load_config_from_path(&missing), Err(ConfigError::NotFound)));

        let broken = tmp.path().join("broken.json");
        fs::write(&broken, "{ \"api\": ").unwrap();
        assert!(matches!(load_config_from_path(&broken), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_library_resolved_path() {
        assert_eq!(LibraryConfig::default().resolved_path(), None);

        let config = LibraryConfig { path: "/walls".to_string(), ..Default::default() };
        assert_eq!(config.resolved_path(), Some(PathBuf::from("/walls")));

        let config = LibraryConfig { path: "~/walls".to_string(), ..Default::default() };
        let resolved = config.resolved_path().unwrap();
        assert!(!resolved.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_config_paths_are_deduplicated() {
        let paths = config_paths();
        for (i, path) in paths.iter().enumerate() {
            assert!(!paths[i + 1..].contains(path), "duplicate path {}", path.display());
        }
    }

    #[test]
    fn test_config_error_display() {
        assert!(ConfigError::NotFound.to_string().contains("No configuration file found"));
    }
}
