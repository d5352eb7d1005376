//! Single-slot background runner for pipeline runs.
//!
//! At most one generation is in flight at a time; submitting while busy
//! fails with [`AiwallError::Busy`] instead of queueing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use super::pipeline::{GenerationPipeline, GenerationRequest, ProgressObserver};
use crate::error::AiwallError;
use crate::platform::spawn_named_thread;

/// Releases the runner slot when the worker finishes, even on panic.
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) { self.0.store(false, Ordering::SeqCst); }
}

/// Runs pipeline requests on a worker thread, one at a time.
#[derive(Debug, Clone)]
pub struct GenerationRunner {
    pipeline: Arc<GenerationPipeline>,
    busy: Arc<AtomicBool>,
    current: Arc<Mutex<Option<Arc<AtomicBool>>>>,
}

impl GenerationRunner {
    #[must_use]
    pub fn new(pipeline: Arc<GenerationPipeline>) -> Self {
        Self { pipeline, busy: Arc::new(AtomicBool::new(false)), current: Arc::new(Mutex::new(None)) }
    }

    /// Whether a generation is currently running.
    #[must_use]
    pub fn is_busy(&self) -> bool { self.busy.load(Ordering::SeqCst) }

    /// Cancels the in-flight generation, if any, without needing its handle.
    ///
    /// Returns `true` if a running generation was asked to stop.
    pub fn cancel_current(&self) -> bool {
        if !self.is_busy() {
            return false;
        }
        self.current.lock().as_ref().is_some_and(|cancel| {
            cancel.store(true, Ordering::SeqCst);
            true
        })
    }

    /// Starts `request` on a worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Busy`] if a generation is already running and
    /// [`AiwallError::Io`] if the worker thread cannot be spawned.
    pub fn submit(
        &self,
        request: GenerationRequest,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<GenerationHandle, AiwallError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(AiwallError::Busy);
        }

        let slot = SlotGuard(Arc::clone(&self.busy));
        let cancel = Arc::new(AtomicBool::new(false));
        let pipeline = Arc::clone(&self.pipeline);
        let worker_cancel = Arc::clone(&cancel);
        *self.current.lock() = Some(Arc::clone(&cancel));

        let join = spawn_named_thread("generation", move || {
            let _slot = slot;
            pipeline.run(&request, observer.as_ref(), &worker_cancel)
        })
        .map_err(|err| AiwallError::io("failed to start generation worker", &err))?;

        Ok(GenerationHandle { join: Some(join), cancel })
    }
}

/// Handle to one submitted generation.
#[derive(Debug)]
pub struct GenerationHandle {
    join: Option<JoinHandle<Result<String, AiwallError>>>,
    cancel: Arc<AtomicBool>,
}

impl GenerationHandle {
    /// Requests cancellation. Takes effect before the next stage starts.
    pub fn cancel(&self) { self.cancel.store(true, Ordering::SeqCst); }

    /// Whether the worker has finished (or its result was already taken).
    #[must_use]
    pub fn is_finished(&self) -> bool { self.join.as_ref().is_none_or(JoinHandle::is_finished) }

    /// Blocks until the run ends and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error, or [`AiwallError::Cancelled`] if the
    /// result was already taken by [`Self::try_result`].
    pub fn wait(mut self) -> Result<String, AiwallError> {
        self.join.take().map_or(Err(AiwallError::Cancelled), join_worker)
    }

    /// Returns the outcome once the run has ended, without blocking.
    ///
    /// Yields `Some` exactly once.
    pub fn try_result(&mut self) -> Option<Result<String, AiwallError>> {
        if !self.join.as_ref().is_some_and(JoinHandle::is_finished) {
            return None;
        }
        self.join.take().map(join_worker)
    }
}

fn join_worker(join: JoinHandle<Result<String, AiwallError>>) -> Result<String, AiwallError> {
    match join.join() {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;

    use parking_lot::Mutex;
    use tempfile::TempDir;

    use super::*;
    use crate::generation::api::ImageGenerator;
    use crate::generation::pipeline::NoopObserver;
    use crate::library::LibraryStore;
    use crate::paths::AppPaths;
    use crate::secret::SecretStore;
    use crate::wallpaper::{DesktopSetter, WallpaperError, WallpaperProcessor};

    /// Blocks in `generate` until released, then answers with the given result.
    struct GatedGenerator {
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<Result<String, String>>>,
    }

    impl ImageGenerator for GatedGenerator {
        fn generate(&self, _credential: &str, _prompt: &str) -> Result<String, AiwallError> {
            let _ = self.entered.lock().send(());
            match self.release.lock().recv() {
                Ok(Ok(url)) => Ok(url),
                Ok(Err(message)) => Err(AiwallError::Remote(message)),
                Err(_) => Err(AiwallError::Remote("gate dropped".to_string())),
            }
        }

        fn download(&self, _url: &str) -> Result<Vec<u8>, AiwallError> {
            Err(AiwallError::Remote("downloads are not expected here".to_string()))
        }
    }

    struct NoDesktop;

    impl DesktopSetter for NoDesktop {
        fn set_wallpaper(&self, _path: &Path) -> Result<(), WallpaperError> {
            Err(WallpaperError::SetWallpaperFailed("not expected".to_string()))
        }
    }

    struct Gate {
        _tmp: TempDir,
        runner: GenerationRunner,
        entered: Receiver<()>,
        release: Sender<Result<String, String>>,
    }

    fn gated_runner() -> Gate {
        let tmp = TempDir::new().unwrap();
        let paths = AppPaths::rooted_at(tmp.path());
        SecretStore::from_paths(&paths).save_credential("sk-runner-test").unwrap();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let generator = GatedGenerator { entered: Mutex::new(entered_tx), release: Mutex::new(release_rx) };

        let processor = Arc::new(WallpaperProcessor::with_enhancements(Vec::new()));
        let library = Arc::new(LibraryStore::new(paths.library_dir.clone(), Arc::clone(&processor)));
        let pipeline = GenerationPipeline::new(&paths, Arc::new(generator), library, processor, Arc::new(NoDesktop));

        Gate { _tmp: tmp, runner: GenerationRunner::new(Arc::new(pipeline)), entered: entered_rx, release: release_tx }
    }

    fn request() -> GenerationRequest { GenerationRequest::new("A red apple on a table", false) }

    #[test]
    fn test_second_submit_is_busy() {
        let gate = gated_runner();
        let handle = gate.runner.submit(request(), Arc::new(NoopObserver)).unwrap();
        gate.entered.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(gate.runner.is_busy());
        assert!(!handle.is_finished());
        let second = gate.runner.submit(request(), Arc::new(NoopObserver));
        assert!(matches!(second, Err(AiwallError::Busy)));

        gate.release.send(Err("quota exceeded".to_string())).unwrap();
        let err = handle.wait().unwrap_err();
        assert_eq!(err.to_string(), "API error: quota exceeded");
        assert!(!gate.runner.is_busy());
    }

    #[test]
    fn test_slot_is_reusable_after_completion() {
        let gate = gated_runner();
        for _ in 0..2 {
            let handle = gate.runner.submit(request(), Arc::new(NoopObserver)).unwrap();
            gate.entered.recv_timeout(Duration::from_secs(5)).unwrap();
            gate.release.send(Err("nope".to_string())).unwrap();
            assert!(handle.wait().is_err());
        }
    }

    #[test]
    fn test_cancel_takes_effect_at_next_stage() {
        let gate = gated_runner();
        let handle = gate.runner.submit(request(), Arc::new(NoopObserver)).unwrap();
        gate.entered.recv_timeout(Duration::from_secs(5)).unwrap();

        handle.cancel();
        gate.release.send(Ok("https://images.example/x.png".to_string())).unwrap();

        assert!(matches!(handle.wait(), Err(AiwallError::Cancelled)));
    }

    #[test]
    fn test_cancel_current_stops_run_without_handle() {
        let gate = gated_runner();
        assert!(!gate.runner.cancel_current());

        let handle = gate.runner.submit(request(), Arc::new(NoopObserver)).unwrap();
        gate.entered.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(gate.runner.clone().cancel_current());
        gate.release.send(Ok("https://images.example/x.png".to_string())).unwrap();

        assert!(matches!(handle.wait(), Err(AiwallError::Cancelled)));
        assert!(!gate.runner.is_busy());
        assert!(!gate.runner.cancel_current());
    }

    #[test]
    fn test_try_result_yields_once() {
        let gate = gated_runner();
        let mut handle = gate.runner.submit(request(), Arc::new(NoopObserver)).unwrap();
        gate.entered.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(handle.try_result().is_none());

        gate.release.send(Err("boom".to_string())).unwrap();
        let mut result = None;
        for _ in 0..500 {
            result = handle.try_result();
            if result.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(matches!(result, Some(Err(AiwallError::Remote(_)))));
        assert!(handle.is_finished());
        assert!(handle.try_result().is_none());
    }
}
