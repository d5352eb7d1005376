//! Application-wide constants.

/// Application identifier used for data, config, and lock file locations.
pub const APP_ID: &str = "aiwall";

/// File holding the raw symmetric key that protects the stored credential.
pub const ENCRYPTION_KEY_FILE: &str = "encryption_key.key";

/// File holding the encrypted API credential.
pub const CREDENTIAL_FILE: &str = "api_key.enc";

/// Default library directory name inside the data directory.
pub const LIBRARY_DIR: &str = "generated_wallpapers";

/// Library record file name inside the library directory.
pub const LIBRARY_RECORD_FILE: &str = "metadata.json";

/// Lock file used to keep a single running instance.
pub const LOCK_FILE: &str = "aiwall.lock";

/// Processed image handed to the OS wallpaper call.
pub const CURRENT_WALLPAPER_FILE: &str = "current_wallpaper.jpg";

/// Output width of every processed wallpaper.
pub const WALLPAPER_WIDTH: u32 = 3840;

/// Output height of every processed wallpaper.
pub const WALLPAPER_HEIGHT: u32 = 2160;

/// JPEG quality used when encoding wallpapers.
pub const JPEG_QUALITY: u8 = 95;

/// Message reported when a wallpaper has been applied.
pub const SUCCESS_MESSAGE: &str = "Wallpaper has been updated successfully!";
