//! Application context.
//!
//! Everything a command needs is built once here and passed down explicitly:
//! the loaded configuration, resolved paths, the stores, and the pipeline
//! behind its single-slot runner.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{AiwallConfig, LoadedConfig};
use crate::constants::LIBRARY_DIR;
use crate::error::AiwallError;
use crate::generation::{
    GenerationPipeline, GenerationRunner, HttpImageClient, ImageGenerator, Interval,
    PromptSelection,
};
use crate::library::LibraryStore;
use crate::paths::{AppPaths, default_work_dir};
use crate::secret::SecretStore;
use crate::wallpaper::{DesktopSetter, SystemDesktop, WallpaperProcessor};

/// File written and removed by the startup filesystem check.
const PROBE_FILE: &str = ".aiwall-probe";

/// Resolves where state lives.
///
/// `data_dir` replaces the platform data directory; the configured library
/// path, if any, replaces the default library directory.
#[must_use]
pub fn resolve_paths(config: &AiwallConfig, data_dir: Option<&Path>) -> AppPaths {
    let library_override = config.library.resolved_path();

    match data_dir {
        Some(dir) => AppPaths {
            data_dir: dir.to_path_buf(),
            library_dir: library_override.unwrap_or_else(|| dir.join(LIBRARY_DIR)),
            work_dir: default_work_dir(),
        },
        None => AppPaths::default_locations(library_override),
    }
}

/// Wired-up application state.
#[derive(Debug)]
pub struct AppContext {
    pub config: AiwallConfig,
    /// File the configuration was loaded from, if any.
    pub config_path: Option<PathBuf>,
    pub paths: AppPaths,
    pub secrets: SecretStore,
    pub library: Arc<LibraryStore>,
    pub pipeline: Arc<GenerationPipeline>,
    pub runner: GenerationRunner,
}

impl AppContext {
    /// Builds the context with the real HTTP client and desktop setter.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Remote`] if the HTTP client cannot be built.
    pub fn new(loaded: LoadedConfig, paths: AppPaths) -> Result<Self, AiwallError> {
        let generator = HttpImageClient::new(loaded.config.api.clone())?;
        Ok(Self::with_collaborators(
            loaded,
            paths,
            Arc::new(generator),
            Arc::new(SystemDesktop),
            WallpaperProcessor::standard(),
        ))
    }

    /// Builds the context around the given remote client, desktop setter, and
    /// image processor.
    #[must_use]
    pub fn with_collaborators(
        loaded: LoadedConfig,
        paths: AppPaths,
        generator: Arc<dyn ImageGenerator>,
        desktop: Arc<dyn DesktopSetter>,
        processor: WallpaperProcessor,
    ) -> Self {
        let processor = Arc::new(processor);
        let library = Arc::new(LibraryStore::new(paths.library_dir.clone(), Arc::clone(&processor)));
        let pipeline = Arc::new(GenerationPipeline::new(
            &paths,
            generator,
            Arc::clone(&library),
            processor,
            desktop,
        ));

        Self {
            config: loaded.config,
            config_path: loaded.path,
            secrets: SecretStore::from_paths(&paths),
            runner: GenerationRunner::new(Arc::clone(&pipeline)),
            paths,
            library,
            pipeline,
        }
    }

    /// Verifies the data directory is writable and prepares the key and the
    /// library.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Io`] if any of the directories or files cannot be
    /// created.
    pub fn startup_check(&self) -> Result<(), AiwallError> {
        let data_dir = &self.paths.data_dir;
        fs::create_dir_all(data_dir).map_err(|err| AiwallError::io(data_dir.display(), &err))?;

        let probe = data_dir.join(PROBE_FILE);
        fs::write(&probe, b"ok").map_err(|err| AiwallError::io(probe.display(), &err))?;
        if let Err(err) = fs::remove_file(&probe) {
            tracing::debug!(path = %probe.display(), error = %err, "failed to remove probe file");
        }

        self.secrets.ensure_key()?;
        self.library.ensure()?;
        tracing::debug!(data_dir = %data_dir.display(), "startup check passed");
        Ok(())
    }

    /// Prompt selection from the `prompts` config section.
    #[must_use]
    pub fn default_selection(&self) -> PromptSelection {
        let prompts = &self.config.prompts;
        PromptSelection {
            custom: Some(prompts.custom.clone()).filter(|c| !c.trim().is_empty()),
            preset: prompts.preset.clone(),
        }
    }

    /// Auto-change interval from the `schedule` config section.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Config`] if the configured interval is invalid.
    pub fn configured_interval(&self) -> Result<Interval, AiwallError> {
        self.config
            .schedule
            .interval
            .parse()
            .map_err(|err: AiwallError| AiwallError::Config(format!("schedule.interval: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::{LibraryConfig, PromptConfig, ScheduleConfig};
    use crate::generation::NoopObserver;
    use crate::wallpaper::WallpaperError;

    struct Offline;

    impl ImageGenerator for Offline {
        fn generate(&self, _credential: &str, _prompt: &str) -> Result<String, AiwallError> {
            Err(AiwallError::Remote("offline".to_string()))
        }

        fn download(&self, _url: &str) -> Result<Vec<u8>, AiwallError> {
            Err(AiwallError::Remote("offline".to_string()))
        }
    }

    impl DesktopSetter for Offline {
        fn set_wallpaper(&self, _path: &Path) -> Result<(), WallpaperError> { Ok(()) }
    }

    fn context(tmp: &TempDir, config: AiwallConfig) -> AppContext {
        AppContext::with_collaborators(
            LoadedConfig { config, path: None },
            AppPaths::rooted_at(tmp.path()),
            Arc::new(Offline),
            Arc::new(Offline),
            WallpaperProcessor::with_enhancements(Vec::new()),
        )
    }

    // ========================================================================
    // Paths
    // ========================================================================

    #[test]
    fn test_resolve_paths_with_data_dir() {
        let paths = resolve_paths(&AiwallConfig::default(), Some(Path::new("/srv/aiwall")));
        assert_eq!(paths.data_dir, PathBuf::from("/srv/aiwall"));
        assert_eq!(paths.library_dir, PathBuf::from("/srv/aiwall").join(LIBRARY_DIR));
    }

    #[test]
    fn test_resolve_paths_with_library_override() {
        let config = AiwallConfig {
            library: LibraryConfig { path: "/walls".to_string(), ..Default::default() },
            ..Default::default()
        };
        let paths = resolve_paths(&config, Some(Path::new("/srv/aiwall")));
        assert_eq!(paths.library_dir, PathBuf::from("/walls"));
    }

    // ========================================================================
    // Startup
    // ========================================================================

    #[test]
    fn test_startup_check_prepares_state() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, AiwallConfig::default());

        ctx.startup_check().unwrap();

        assert!(ctx.paths.key_file().is_file());
        assert!(ctx.library.record_path().is_file());
        assert!(!ctx.paths.data_dir.join(PROBE_FILE).exists());
    }

    #[test]
    fn test_startup_check_fails_on_unwritable_data_dir() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("data");
        fs::write(&blocker, b"not a directory").unwrap();

        let ctx = context(&tmp, AiwallConfig::default());
        assert!(matches!(ctx.startup_check(), Err(AiwallError::Io(_))));
    }

    // ========================================================================
    // Config-derived values
    // ========================================================================

    #[test]
    fn test_default_selection_ignores_blank_custom() {
        let tmp = TempDir::new().unwrap();
        let config = AiwallConfig {
            prompts: PromptConfig { preset: "Cityscapes".to_string(), custom: "  ".to_string() },
            ..Default::default()
        };
        let selection = context(&tmp, config).default_selection();
        assert_eq!(selection.custom, None);
        assert_eq!(selection.preset, "Cityscapes");
    }

    #[test]
    fn test_default_selection_uses_custom() {
        let tmp = TempDir::new().unwrap();
        let config = AiwallConfig {
            prompts: PromptConfig { custom: "A red apple on a table".to_string(), ..Default::default() },
            ..Default::default()
        };
        let selection = context(&tmp, config).default_selection();
        assert_eq!(selection.custom.as_deref(), Some("A red apple on a table"));
    }

    #[test]
    fn test_configured_interval() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, AiwallConfig::default());
        assert_eq!(ctx.configured_interval().unwrap(), Interval::Never);

        let config = AiwallConfig {
            schedule: ScheduleConfig { interval: "often".to_string(), ..Default::default() },
            ..Default::default()
        };
        let err = context(&tmp, config).configured_interval().unwrap_err();
        assert!(err.to_string().contains("schedule.interval"));
    }

    #[test]
    fn test_runner_reports_missing_credential() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, AiwallConfig::default());
        ctx.startup_check().unwrap();

        let handle = ctx
            .runner
            .submit(crate::generation::GenerationRequest::new("p", true), Arc::new(NoopObserver))
            .unwrap();
        assert!(matches!(handle.wait(), Err(AiwallError::MissingCredential)));
    }
}
