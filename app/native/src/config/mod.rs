//! Configuration loading for aiwall.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Loading never fails: a missing file yields defaults (and a commented
//! template is written at the preferred location), an unreadable or invalid
//! file yields defaults with a warning.

pub mod template;
pub mod types;

use std::path::{Path, PathBuf};

pub use types::{
    AiwallConfig, ApiConfig, ConfigError, DEFAULT_ENDPOINT, LibraryConfig, PromptConfig,
    ScheduleConfig, config_paths, load_config, load_config_from_path,
};

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: AiwallConfig,
    /// `None` when defaults are in use.
    pub path: Option<PathBuf>,
}

/// Loads the configuration, from `custom_path` if given.
///
/// When `custom_path` is set and missing, no template is written.
#[must_use]
pub fn load(custom_path: Option<&Path>) -> LoadedConfig {
    let result = custom_path.map_or_else(load_config, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            LoadedConfig { config, path: Some(path) }
        }
        Err(ConfigError::NotFound) => {
            let path = if custom_path.is_none() { create_default_config_file() } else { None };
            LoadedConfig { config: AiwallConfig::default(), path }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            LoadedConfig::default()
        }
    }
}

/// Writes the template to the preferred config path if nothing is there yet.
fn create_default_config_file() -> Option<PathBuf> {
    let Some(config_path) = config_paths().into_iter().next() else {
        tracing::debug!("no config path available for creating template");
        return None;
    };

    if config_path.exists() {
        return None;
    }

    match template::create_config_file(&config_path) {
        Ok(()) => {
            tracing::info!(path = %config_path.display(), "created default configuration file");
            Some(config_path)
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "failed to create default configuration file"
            );
            None
        }
    }
}

/// Returns the JSON Schema of the configuration file, pretty-printed.
#[must_use]
pub fn print_schema() -> String {
    let schema = schemars::schema_for!(AiwallConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_custom_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("aiwall.jsonc");
        std::fs::write(&path, r#"{ "library": { "saveByDefault": false } }"#).unwrap();

        let loaded = load(Some(&path));
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert!(!loaded.config.library.save_by_default);
    }

    #[test]
    fn test_load_missing_custom_path_uses_defaults_without_template() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing.jsonc");

        let loaded = load(Some(&path));
        assert!(loaded.path.is_none());
        assert_eq!(loaded.config, AiwallConfig::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_invalid_custom_path_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.jsonc");
        std::fs::write(&path, "{ nope").unwrap();

        let loaded = load(Some(&path));
        assert!(loaded.path.is_none());
        assert_eq!(loaded.config, AiwallConfig::default());
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = print_schema();
        assert!(schema.contains("\"api\""));
        assert!(schema.contains("\"schedule\""));
        assert!(schema.contains("timeoutSecs"));
    }
}
