//! Ctrl+C handling for long-running commands.
//!
//! Once installed, an interrupt no longer kills the process outright: the
//! handler runs instead, so commands can wind down through their normal
//! return path (work dir guards, exit purge).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::spawn_named_thread;
use crate::error::AiwallError;

/// Set once the first interrupt has been handled.
#[derive(Debug, Clone, Default)]
pub struct Interrupted(Arc<AtomicBool>);

impl Interrupted {
    #[must_use]
    pub fn is_set(&self) -> bool { self.0.load(Ordering::SeqCst) }

    fn set(&self) -> bool { !self.0.swap(true, Ordering::SeqCst) }
}

/// Runs `handler` on the first Ctrl+C.
///
/// Later interrupts are logged and ignored while the command winds down.
///
/// # Errors
///
/// Returns [`AiwallError::Io`] if the listener thread or its runtime cannot
/// be created.
pub fn on_interrupt<F>(handler: F) -> Result<Interrupted, AiwallError>
where F: FnOnce() + Send + 'static {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AiwallError::io("failed to start interrupt listener", &err))?;

    let interrupted = Interrupted::default();
    let flag = interrupted.clone();

    spawn_named_thread("interrupt", move || {
        let mut handler = Some(handler);
        runtime.block_on(async {
            loop {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %err, "interrupt listener stopped");
                    return;
                }
                if flag.set() {
                    tracing::info!("interrupted, stopping after the current step");
                    if let Some(handler) = handler.take() {
                        handler();
                    }
                } else {
                    tracing::warn!("already stopping");
                }
            }
        });
    })
    .map_err(|err| AiwallError::io("failed to start interrupt listener", &err))?;

    Ok(interrupted)
}
