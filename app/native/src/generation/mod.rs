//! Wallpaper generation: remote client, prompt presets, the staged pipeline,
//! the single-slot runner, and the auto-change schedule.

pub mod api;
pub mod pipeline;
pub mod prompts;
pub mod runner;
pub mod schedule;

pub use api::{HttpImageClient, ImageGenerator};
pub use pipeline::{GenerationPipeline, GenerationRequest, NoopObserver, ProgressObserver, Stage};
pub use prompts::PromptSelection;
pub use runner::{GenerationHandle, GenerationRunner};
pub use schedule::{AutoChanger, Interval};
