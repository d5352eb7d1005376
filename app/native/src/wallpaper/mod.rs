//! Wallpaper image processing and desktop integration.

pub mod desktop;
pub mod enhance;
pub mod processing;

pub use desktop::{DesktopSetter, SystemDesktop, WallpaperError};
pub use enhance::Enhancement;
pub use processing::{ProcessingError, WallpaperProcessor};
