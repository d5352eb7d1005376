//! Auto-change interval, monthly cost estimate, and the background changer.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::pipeline::{GenerationRequest, ProgressObserver};
use super::runner::GenerationRunner;
use crate::error::AiwallError;
use crate::platform::spawn_named_thread;

/// Minutes in the 30-day month used for estimates.
const MINUTES_PER_MONTH: f64 = 30.0 * 24.0 * 60.0;

/// Longest accepted interval: one year.
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Interval choices offered to users, in display order.
pub const INTERVAL_CHOICES: &[&str] = &[
    "Never",
    "1 hour",
    "2 hours",
    "3 hours",
    "6 hours",
    "12 hours",
    "24 hours",
    "5 minutes",
    "15 minutes",
    "30 minutes",
    "45 minutes",
    "60 minutes",
];

/// How often the wallpaper changes automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    /// Manual changes only.
    #[default]
    Never,
    /// Every given number of minutes (1 to [`MAX_INTERVAL_MINUTES`]).
    Minutes(u64),
}

impl Interval {
    #[must_use]
    pub const fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::Minutes(minutes) => Some(Duration::from_secs(minutes.saturating_mul(60))),
        }
    }
}

impl FromStr for Interval {
    type Err = AiwallError;

    /// Parses `never`, `N minute(s)`, or `N hour(s)`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AiwallError::InvalidArguments(format!(
                "Invalid interval '{s}'. Use \"never\", \"N minutes\", or \"N hours\""
            ))
        };

        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "never" {
            return Ok(Self::Never);
        }

        let mut parts = normalized.split_whitespace();
        let (Some(count), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let count: u64 = count.parse().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }

        let minutes = match unit {
            "minute" | "minutes" | "min" | "mins" => Some(count),
            "hour" | "hours" | "hr" | "hrs" => count.checked_mul(60),
            _ => return Err(invalid()),
        };
        match minutes {
            Some(minutes) if minutes <= MAX_INTERVAL_MINUTES => Ok(Self::Minutes(minutes)),
            _ => Err(AiwallError::InvalidArguments(format!(
                "Interval '{s}' is too long. The longest interval is 365 days"
            ))),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Never => write!(f, "Never"),
            Self::Minutes(60) => write!(f, "1 hour"),
            Self::Minutes(m) if m % 60 == 0 && m > 60 => write!(f, "{} hours", m / 60),
            Self::Minutes(1) => write!(f, "1 minute"),
            Self::Minutes(m) => write!(f, "{m} minutes"),
        }
    }
}

/// Estimated spend per 30-day month at `price_per_image` USD per generation.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimated_monthly_cost(interval: Interval, price_per_image: f64) -> f64 {
    match interval {
        Interval::Never => 0.0,
        Interval::Minutes(minutes) => MINUTES_PER_MONTH / minutes as f64 * price_per_image,
    }
}

/// Human-readable cost line for an interval.
#[must_use]
pub fn cost_label(interval: Interval, price_per_image: f64) -> String {
    match interval {
        Interval::Never => "Cost: $0/month (Manual only)".to_string(),
        Interval::Minutes(_) => {
            format!("Est. Cost: ${:.2}/month", estimated_monthly_cost(interval, price_per_image))
        }
    }
}

/// Stop flag the changer thread waits on.
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    /// Sleeps for `timeout` unless stopped first. Returns `true` if stopped.
    fn wait(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if !*stopped {
            let _ = self.wake.wait_for(&mut stopped, timeout);
        }
        *stopped
    }

    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }
}

/// Stops an [`AutoChanger`] from another thread.
#[derive(Clone)]
pub struct StopHandle(Arc<StopSignal>);

impl StopHandle {
    /// Ends the changer loop at its next wake-up. Idempotent.
    pub fn stop(&self) { self.0.stop(); }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StopHandle").field(&*self.0.stopped.lock()).finish()
    }
}

/// Periodically submits a new generation to the runner.
pub struct AutoChanger {
    signal: Arc<StopSignal>,
    thread: Option<JoinHandle<()>>,
}

impl fmt::Debug for AutoChanger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoChanger").field("running", &self.is_running()).finish()
    }
}

impl AutoChanger {
    /// Starts ticking every `period`. The first generation happens after one
    /// full period.
    ///
    /// `next_request` is called on every tick; a tick whose request cannot be
    /// built, or that finds the runner busy, is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Io`] if the changer thread cannot be spawned.
    pub fn start<F>(
        runner: GenerationRunner,
        period: Duration,
        next_request: F,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<Self, AiwallError>
    where
        F: Fn() -> Result<GenerationRequest, AiwallError> + Send + 'static,
    {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);

        let thread = spawn_named_thread("auto-change", move || {
            while !thread_signal.wait(period) {
                tick(&runner, &next_request, &observer);
            }
            tracing::debug!("auto-change stopped");
        })
        .map_err(|err| AiwallError::io("failed to start auto-change", &err))?;

        tracing::info!(every = ?period, "auto-change started");
        Ok(Self { signal, thread: Some(thread) })
    }

    /// Handle that stops this changer from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle { StopHandle(Arc::clone(&self.signal)) }

    #[must_use]
    pub fn is_running(&self) -> bool { self.thread.as_ref().is_some_and(|t| !t.is_finished()) }

    /// Stops the changer. A generation already in flight runs to completion.
    pub fn stop(&mut self) {
        self.signal.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Blocks the caller until a [`StopHandle`] stops the changer.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AutoChanger {
    fn drop(&mut self) { self.stop(); }
}

fn tick<F>(runner: &GenerationRunner, next_request: &F, observer: &Arc<dyn ProgressObserver>)
where F: Fn() -> Result<GenerationRequest, AiwallError> {
    let request = match next_request() {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "auto-change skipped: could not build request");
            return;
        }
    };

    match runner.submit(request, Arc::clone(observer)) {
        Ok(handle) => match handle.wait() {
            Ok(message) => tracing::info!(%message, "auto-change applied wallpaper"),
            Err(err) => tracing::warn!(error = %err, "auto-change generation failed"),
        },
        Err(AiwallError::Busy) => tracing::warn!("auto-change skipped: a generation is already running"),
        Err(err) => tracing::warn!(error = %err, "auto-change could not start generation"),
    }
}
