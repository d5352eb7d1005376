//! aiwall - AI generated 4K desktop wallpapers.
//!
//! A prompt is sent to an image generation API, the result is cropped to
//! 16:9, upscaled to 3840x2160, enhanced, optionally kept in a local library,
//! and set as the desktop background. The `aiwall` binary is a thin CLI over
//! this library.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod generation;
pub mod instance;
pub mod library;
pub mod logging;
pub mod paths;
pub mod platform;
pub mod secret;
pub mod wallpaper;
