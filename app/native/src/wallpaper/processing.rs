//! Image processing for wallpapers.
//!
//! Turns a generated image into a 3840x2160 JPEG: square sources are
//! center-cropped to 16:9, everything is resized with a Lanczos filter, and
//! the enhancement chain from [`super::enhance`] is applied best-effort.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, RgbImage};

use super::enhance::{self, Enhancement};
use crate::constants::{JPEG_QUALITY, WALLPAPER_HEIGHT, WALLPAPER_WIDTH};

/// Errors that can occur during image processing.
#[derive(Debug)]
pub enum ProcessingError {
    /// Failed to read or decode the source image.
    ImageRead(String),
    /// Failed to encode or write the processed image.
    ImageSave(String),
    /// An enhancement step could not be applied.
    Enhancement { step: &'static str, reason: String },
}

impl std::fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageRead(detail) => write!(f, "Failed to read image: {detail}"),
            Self::ImageSave(detail) => write!(f, "Failed to save processed image: {detail}"),
            Self::Enhancement { step, reason } => {
                write!(f, "Enhancement step '{step}' failed: {reason}")
            }
        }
    }
}

impl std::error::Error for ProcessingError {}

/// Converts source images into finished wallpapers.
pub struct WallpaperProcessor {
    enhancements: Vec<Box<dyn Enhancement>>,
}

impl Default for WallpaperProcessor {
    fn default() -> Self { Self::standard() }
}

impl std::fmt::Debug for WallpaperProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let steps: Vec<_> = self.enhancements.iter().map(|step| step.name()).collect();
        f.debug_struct("WallpaperProcessor").field("enhancements", &steps).finish()
    }
}

impl WallpaperProcessor {
    /// Processor with the fixed enhancement chain.
    #[must_use]
    pub fn standard() -> Self { Self::with_enhancements(enhance::standard_chain()) }

    /// Processor with a custom enhancement chain (empty for a plain resize).
    #[must_use]
    pub fn with_enhancements(enhancements: Vec<Box<dyn Enhancement>>) -> Self {
        Self { enhancements }
    }

    /// Produces a 3840x2160 wallpaper from any source image.
    ///
    /// Enhancement failures are logged and the last good image is kept, so
    /// this never fails.
    #[must_use]
    pub fn upscale(&self, source: &DynamicImage) -> RgbImage {
        let cropped = crop_square_to_widescreen(source);
        let mut current = cropped
            .resize_exact(WALLPAPER_WIDTH, WALLPAPER_HEIGHT, FilterType::Lanczos3)
            .to_rgb8();

        for step in &self.enhancements {
            match step.apply(&current) {
                Ok(next) => current = next,
                Err(err) => {
                    tracing::warn!(step = step.name(), error = %err, "enhancement failed, keeping last good image");
                    break;
                }
            }
        }

        current
    }

    /// Reads `source`, upscales it, and writes a JPEG to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::ImageRead`] if the source cannot be decoded,
    /// [`ProcessingError::ImageSave`] if the output cannot be written.
    pub fn process_file(&self, source: &Path, destination: &Path) -> Result<PathBuf, ProcessingError> {
        let img = load_image(source)?;
        let wallpaper = self.upscale(&img);
        save_jpeg(&wallpaper, destination)?;

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            "processed wallpaper"
        );
        Ok(destination.to_path_buf())
    }
}

/// Loads and decodes an image, guessing the format from its contents.
///
/// # Errors
///
/// Returns [`ProcessingError::ImageRead`] on open or decode failure.
pub fn load_image(path: &Path) -> Result<DynamicImage, ProcessingError> {
    ImageReader::open(path)
        .map_err(|err| ProcessingError::ImageRead(format!("{}: {err}", path.display())))?
        .with_guessed_format()
        .map_err(|err| ProcessingError::ImageRead(format!("{}: {err}", path.display())))?
        .decode()
        .map_err(|err| ProcessingError::ImageRead(format!("{}: {err}", path.display())))
}

/// Center-crops a square image to 16:9. Other images are returned unchanged.
#[must_use]
pub fn crop_square_to_widescreen(img: &DynamicImage) -> DynamicImage {
    let (width, height) = img.dimensions();
    match widescreen_crop(width, height) {
        Some((top, crop_height)) => img.crop_imm(0, top, width, crop_height),
        None => img.clone(),
    }
}

/// Returns `(top, height)` of the 16:9 band for a square image.
#[must_use]
pub const fn widescreen_crop(width: u32, height: u32) -> Option<(u32, u32)> {
    if width != height || width == 0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let crop_height = (width as u64 * 9 / 16) as u32;
    Some(((height - crop_height) / 2, crop_height))
}

/// Writes an RGB image as a quality-95 JPEG, creating parent directories.
fn save_jpeg(image: &RgbImage, destination: &Path) -> Result<(), ProcessingError> {
    let save_err = |err: &dyn std::fmt::Display| {
        ProcessingError::ImageSave(format!("{}: {err}", destination.display()))
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| save_err(&err))?;
    }

    let file = File::create(destination).map_err(|err| save_err(&err))?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
    image.write_with_encoder(encoder).map_err(|err| save_err(&err))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::Rgb;

    use super::*;

    struct FailingStep;

    impl Enhancement for FailingStep {
        fn name(&self) -> &'static str { "failing" }

        fn apply(&self, _image: &RgbImage) -> Result<RgbImage, ProcessingError> {
            Err(ProcessingError::Enhancement { step: "failing", reason: "simulated".to_string() })
        }
    }

    struct CountingStep(Arc<AtomicUsize>);

    impl Enhancement for CountingStep {
        fn name(&self) -> &'static str { "counting" }

        fn apply(&self, image: &RgbImage) -> Result<RgbImage, ProcessingError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(image.clone())
        }
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    fn plain() -> WallpaperProcessor { WallpaperProcessor::with_enhancements(Vec::new()) }

    // ========================================================================
    // Crop tests
    // ========================================================================

    #[test]
    fn test_widescreen_crop_height_and_centering() {
        for side in [16, 100, 101, 999, 1000, 1024] {
            let (top, crop_height) = widescreen_crop(side, side).unwrap();
            assert_eq!(crop_height, side * 9 / 16);
            let bottom = side - top - crop_height;
            assert!(bottom.abs_diff(top) <= 1, "side {side}: top {top} bottom {bottom}");
        }
    }

    #[test]
    fn test_widescreen_crop_for_1024() {
        assert_eq!(widescreen_crop(1024, 1024), Some((224, 576)));
    }

    #[test]
    fn test_non_square_is_not_cropped() {
        assert_eq!(widescreen_crop(1792, 1024), None);
        assert_eq!(widescreen_crop(0, 0), None);

        let img = gradient(30, 20);
        assert_eq!(crop_square_to_widescreen(&img).dimensions(), (30, 20));
    }

    #[test]
    fn test_square_crop_keeps_center_rows() {
        let img = gradient(64, 64);
        let cropped = crop_square_to_widescreen(&img);
        assert_eq!(cropped.dimensions(), (64, 36));
        // first kept row is row 14 of the source
        assert_eq!(cropped.to_rgb8().get_pixel(0, 0)[1], 14);
    }

    // ========================================================================
    // Upscale tests
    // ========================================================================

    #[test]
    fn test_upscale_output_is_always_4k() {
        for (w, h) in [(32, 32), (50, 20), (7, 90)] {
            let out = plain().upscale(&gradient(w, h));
            assert_eq!(out.dimensions(), (WALLPAPER_WIDTH, WALLPAPER_HEIGHT));
        }
    }

    #[test]
    fn test_upscale_with_standard_chain_is_4k() {
        let out = WallpaperProcessor::standard().upscale(&gradient(48, 48));
        assert_eq!(out.dimensions(), (3840, 2160));
    }

    #[test]
    fn test_failing_enhancement_still_yields_wallpaper() {
        let counter = Arc::new(AtomicUsize::new(0));
        let processor = WallpaperProcessor::with_enhancements(vec![
            Box::new(FailingStep),
            Box::new(CountingStep(Arc::clone(&counter))),
        ]);

        let source = gradient(40, 40);
        let out = processor.upscale(&source);

        assert_eq!(out.dimensions(), (3840, 2160));
        // remaining steps are skipped after a failure
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(out, plain().upscale(&source));
    }

    #[test]
    fn test_steps_after_success_run_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let processor = WallpaperProcessor::with_enhancements(vec![
            Box::new(CountingStep(Arc::clone(&counter))),
            Box::new(CountingStep(Arc::clone(&counter))),
            Box::new(FailingStep),
        ]);

        let _ = processor.upscale(&gradient(10, 10));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    // ========================================================================
    // File tests
    // ========================================================================

    #[test]
    fn test_process_file_writes_4k_jpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("wallpaper.png");
        gradient(64, 64).save(&source).unwrap();

        let dest = tmp.path().join("out/upscaled_wallpaper.jpg");
        let written = plain().process_file(&source, &dest).unwrap();

        assert_eq!(written, dest);
        let reloaded = load_image(&dest).unwrap();
        assert_eq!(reloaded.dimensions(), (3840, 2160));
    }

    #[test]
    fn test_process_file_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = plain()
            .process_file(&tmp.path().join("missing.png"), &tmp.path().join("out.jpg"))
            .unwrap_err();
        assert!(matches!(err, ProcessingError::ImageRead(_)));
    }

    #[test]
    fn test_process_file_rejects_non_image() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("wallpaper.png");
        fs::write(&source, b"<html>not an image</html>").unwrap();

        let err = plain().process_file(&source, &tmp.path().join("out.jpg")).unwrap_err();
        assert!(err.to_string().contains("Failed to read image"));
    }

    // ========================================================================
    // ProcessingError tests
    // ========================================================================

    #[test]
    fn test_processing_error_display() {
        let err = ProcessingError::ImageSave("/library/out.jpg: disk full".to_string());
        assert!(err.to_string().contains("Failed to save processed image"));

        let err = ProcessingError::Enhancement { step: "color", reason: "bad".to_string() };
        assert_eq!(err.to_string(), "Enhancement step 'color' failed: bad");
    }

    #[test]
    fn test_processor_debug_lists_steps() {
        let debug = format!("{:?}", WallpaperProcessor::standard());
        assert!(debug.contains("sharpness"));
        assert!(debug.contains("brightness"));
    }
}
