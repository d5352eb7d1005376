//! The wallpaper generation pipeline.
//!
//! One run walks five stages in order and stops at the first failure:
//!
//! ```text
//! CredentialCheck -> Requesting -> Downloading -> Processing -> Applying
//! ```
//!
//! Completed stages are not rolled back: a wallpaper saved to the library
//! stays there even if applying it fails afterwards. The work directory is
//! removed when the run ends, whatever the outcome.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::api::ImageGenerator;
use crate::constants::SUCCESS_MESSAGE;
use crate::error::AiwallError;
use crate::library::LibraryStore;
use crate::paths::{AppPaths, purge_work_dir};
use crate::secret::SecretStore;
use crate::wallpaper::{DesktopSetter, WallpaperProcessor};

/// Downloaded source image inside the work directory.
const DOWNLOAD_FILE: &str = "wallpaper.png";

/// Processed image inside the work directory.
const UPSCALED_FILE: &str = "upscaled_wallpaper.jpg";

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CredentialCheck,
    Requesting,
    Downloading,
    Processing,
    Applying,
}

impl Stage {
    pub const ALL: [Self; 5] =
        [Self::CredentialCheck, Self::Requesting, Self::Downloading, Self::Processing, Self::Applying];

    /// Progress text shown while the stage runs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CredentialCheck => "🎨 Crafting your custom wallpaper...",
            Self::Requesting => "🌟 AI is bringing your vision to life...",
            Self::Downloading => "📥 Downloading the masterpiece...",
            Self::Processing => "✨ Perfecting the image quality...",
            Self::Applying => "🖼️ Setting as your wallpaper...",
        }
    }

    /// 1-based position of the stage.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Self::CredentialCheck => 1,
            Self::Requesting => 2,
            Self::Downloading => 3,
            Self::Processing => 4,
            Self::Applying => 5,
        }
    }
}

/// Receives progress notifications from a pipeline run.
///
/// Callbacks run on the worker thread.
pub trait ProgressObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage) {}

    fn stage_failed(&self, _stage: Stage, _error: &AiwallError) {}

    /// A new entry was added to the library.
    fn library_changed(&self) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fully resolved prompt text.
    pub prompt: String,
    /// Whether to keep a copy in the library.
    pub save_to_library: bool,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>, save_to_library: bool) -> Self {
        Self { prompt: prompt.into(), save_to_library }
    }
}

/// Removes the work directory when dropped.
struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    const fn claim(path: PathBuf) -> Self { Self { path } }

    fn ensure(&self) -> Result<&Path, AiwallError> {
        fs::create_dir_all(&self.path).map_err(|err| AiwallError::io(self.path.display(), &err))?;
        Ok(&self.path)
    }

    fn file(&self, name: &str) -> PathBuf { self.path.join(name) }
}

impl Drop for WorkDir {
    fn drop(&mut self) { purge_work_dir(&self.path); }
}

/// Everything a generation needs, wired together.
pub struct GenerationPipeline {
    secrets: SecretStore,
    generator: Arc<dyn ImageGenerator>,
    library: Arc<LibraryStore>,
    processor: Arc<WallpaperProcessor>,
    desktop: Arc<dyn DesktopSetter>,
    work_dir: PathBuf,
    current_wallpaper: PathBuf,
}

impl std::fmt::Debug for GenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPipeline")
            .field("library", &self.library.dir())
            .field("work_dir", &self.work_dir)
            .field("current_wallpaper", &self.current_wallpaper)
            .finish_non_exhaustive()
    }
}

impl GenerationPipeline {
    #[must_use]
    pub fn new(
        paths: &AppPaths,
        generator: Arc<dyn ImageGenerator>,
        library: Arc<LibraryStore>,
        processor: Arc<WallpaperProcessor>,
        desktop: Arc<dyn DesktopSetter>,
    ) -> Self {
        Self {
            secrets: SecretStore::from_paths(paths),
            generator,
            library,
            processor,
            desktop,
            work_dir: paths.work_dir.clone(),
            current_wallpaper: paths.current_wallpaper(),
        }
    }

    #[must_use]
    pub fn library(&self) -> &Arc<LibraryStore> { &self.library }

    /// Runs every stage for `request` and returns the success message.
    ///
    /// `cancel` is checked before each stage; a stage that has started
    /// always runs to completion.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage, or
    /// [`AiwallError::Cancelled`].
    pub fn run(
        &self,
        request: &GenerationRequest,
        observer: &dyn ProgressObserver,
        cancel: &AtomicBool,
    ) -> Result<String, AiwallError> {
        let work = WorkDir::claim(self.work_dir.clone());
        let result = self.run_stages(request, observer, cancel, &work);

        match &result {
            Ok(_) => tracing::info!(saved = request.save_to_library, "wallpaper generation finished"),
            Err(AiwallError::Cancelled) => tracing::info!("wallpaper generation cancelled"),
            Err(err) => tracing::error!(error = %err, "wallpaper generation failed"),
        }

        drop(work);
        result
    }

    fn run_stages(
        &self,
        request: &GenerationRequest,
        observer: &dyn ProgressObserver,
        cancel: &AtomicBool,
        work: &WorkDir,
    ) -> Result<String, AiwallError> {
        let credential = stage(Stage::CredentialCheck, observer, cancel, || {
            self.secrets
                .load_credential()?
                .filter(|credential| !credential.trim().is_empty())
                .ok_or(AiwallError::MissingCredential)
        })?;

        let url = stage(Stage::Requesting, observer, cancel, || {
            tracing::debug!(prompt = %request.prompt, "requesting wallpaper");
            self.generator.generate(&credential, &request.prompt)
        })?;
        drop(credential);

        let source = stage(Stage::Downloading, observer, cancel, || {
            let bytes = self.generator.download(&url)?;
            work.ensure()?;
            let source = work.file(DOWNLOAD_FILE);
            fs::write(&source, bytes).map_err(|err| AiwallError::io(source.display(), &err))?;
            Ok(source)
        })?;

        let upscaled = stage(Stage::Processing, observer, cancel, || {
            if request.save_to_library {
                self.library.save(&source, &request.prompt)?;
                observer.library_changed();
            }
            Ok(self.processor.process_file(&source, &work.file(UPSCALED_FILE))?)
        })?;

        stage(Stage::Applying, observer, cancel, || {
            self.apply_file(&upscaled)?;
            Ok(SUCCESS_MESSAGE.to_string())
        })
    }

    /// Copies an already processed image to its stable location and
    /// applies it as the desktop background.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Io`] if the copy fails, or the desktop error.
    pub fn apply_file(&self, upscaled: &Path) -> Result<(), AiwallError> {
        if let Some(parent) = self.current_wallpaper.parent() {
            fs::create_dir_all(parent).map_err(|err| AiwallError::io(parent.display(), &err))?;
        }
        fs::copy(upscaled, &self.current_wallpaper)
            .map_err(|err| AiwallError::io(self.current_wallpaper.display(), &err))?;
        self.desktop.set_wallpaper(&self.current_wallpaper)?;
        Ok(())
    }
}

/// Runs one stage, reporting it to `observer`.
fn stage<T>(
    stage: Stage,
    observer: &dyn ProgressObserver,
    cancel: &AtomicBool,
    body: impl FnOnce() -> Result<T, AiwallError>,
) -> Result<T, AiwallError> {
    if cancel.load(Ordering::SeqCst) {
        return Err(AiwallError::Cancelled);
    }

    observer.stage_started(stage);
    tracing::debug!(stage = ?stage, "stage started");

    match body() {
        Ok(value) => {
            observer.stage_finished(stage);
            Ok(value)
        }
        Err(err) => {
            observer.stage_failed(stage, &err);
            Err(err)
        }
    }
}
