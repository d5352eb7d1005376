//! Post-resize enhancement steps.
//!
//! Each step blends the image with a "degenerate" version of itself:
//! `out = degenerate + factor * (image - degenerate)`. A factor of `1.0`
//! leaves the image unchanged, larger values push it away from the degenerate
//! image (sharper, more saturated, more contrast, brighter).

use image::{Rgb, RgbImage};

use super::processing::ProcessingError;

/// A single image enhancement.
///
/// Steps never mutate their input so a failed chain can fall back to the
/// image it started from.
pub trait Enhancement: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Produces the enhanced image.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::Enhancement`] if the step cannot be applied.
    fn apply(&self, image: &RgbImage) -> Result<RgbImage, ProcessingError>;
}

/// Returns the fixed enhancement chain applied to every wallpaper.
///
/// Order matters: sharpen, unsharp mask, saturation, contrast, brightness.
#[must_use]
pub fn standard_chain() -> Vec<Box<dyn Enhancement>> {
    vec![
        Box::new(Sharpness { factor: 1.3 }),
        Box::new(UnsharpMask { radius: 2.0, percent: 150, threshold: 3 }),
        Box::new(Color { factor: 1.1 }),
        Box::new(Contrast { factor: 1.1 }),
        Box::new(Brightness { factor: 1.05 }),
    ]
}

/// Sharpens by blending away from a 3x3 smoothed copy.
#[derive(Debug, Clone, Copy)]
pub struct Sharpness {
    pub factor: f32,
}

/// Smoothing kernel (center weight 5, neighbours 1), pre-normalized.
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

impl Enhancement for Sharpness {
    fn name(&self) -> &'static str { "sharpness" }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, ProcessingError> {
        check_input(self.name(), image, self.factor)?;
        let smoothed = image::imageops::filter3x3(image, &SMOOTH_KERNEL);
        Ok(blend_with(image, self.factor, |x, y, _| *smoothed.get_pixel(x, y)))
    }
}

/// Unsharp mask: adds back `percent`% of the difference to a Gaussian blur
/// wherever that difference reaches `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct UnsharpMask {
    pub radius: f32,
    pub percent: u32,
    pub threshold: u8,
}

impl Enhancement for UnsharpMask {
    fn name(&self) -> &'static str { "unsharp-mask" }

    #[allow(clippy::cast_possible_wrap)]
    fn apply(&self, image: &RgbImage) -> Result<RgbImage, ProcessingError> {
        check_input(self.name(), image, self.radius)?;
        if self.radius <= 0.0 {
            return Err(ProcessingError::Enhancement {
                step: self.name(),
                reason: format!("radius must be positive, got {}", self.radius),
            });
        }

        let blurred = image::imageops::blur(image, self.radius);
        let percent = self.percent as i32;
        let threshold = i32::from(self.threshold);

        let mut out = image.clone();
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            let soft = blurred.get_pixel(x, y);
            for channel in 0..3 {
                let value = i32::from(pixel[channel]);
                let diff = value - i32::from(soft[channel]);
                if diff.abs() >= threshold {
                    pixel[channel] = clamp_channel(value + diff * percent / 100);
                }
            }
        }
        Ok(out)
    }
}

/// Saturation: blends away from the grayscale image.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub factor: f32,
}

impl Enhancement for Color {
    fn name(&self) -> &'static str { "color" }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, ProcessingError> {
        check_input(self.name(), image, self.factor)?;
        Ok(blend_with(image, self.factor, |_, _, pixel| {
            let l = luma(pixel);
            Rgb([l, l, l])
        }))
    }
}

/// Contrast: blends away from the mean gray level.
#[derive(Debug, Clone, Copy)]
pub struct Contrast {
    pub factor: f32,
}

impl Enhancement for Contrast {
    fn name(&self) -> &'static str { "contrast" }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn apply(&self, image: &RgbImage) -> Result<RgbImage, ProcessingError> {
        check_input(self.name(), image, self.factor)?;
        let total: u64 = image.pixels().map(|p| u64::from(luma(p))).sum();
        let count = u64::from(image.width()) * u64::from(image.height());
        let mean = ((total as f64 / count as f64) + 0.5) as u8;
        Ok(blend_with(image, self.factor, |_, _, _| Rgb([mean, mean, mean])))
    }
}

/// Brightness: blends away from black.
#[derive(Debug, Clone, Copy)]
pub struct Brightness {
    pub factor: f32,
}

impl Enhancement for Brightness {
    fn name(&self) -> &'static str { "brightness" }

    fn apply(&self, image: &RgbImage) -> Result<RgbImage, ProcessingError> {
        check_input(self.name(), image, self.factor)?;
        Ok(blend_with(image, self.factor, |_, _, _| Rgb([0, 0, 0])))
    }
}

fn check_input(step: &'static str, image: &RgbImage, factor: f32) -> Result<(), ProcessingError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ProcessingError::Enhancement { step, reason: "image is empty".to_string() });
    }
    if !factor.is_finite() || factor < 0.0 {
        return Err(ProcessingError::Enhancement {
            step,
            reason: format!("invalid strength {factor}"),
        });
    }
    Ok(())
}

/// ITU-R 601-2 luma, matching the usual RGB to L conversion.
#[allow(clippy::cast_possible_truncation)]
fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}

fn blend_with<F>(image: &RgbImage, factor: f32, degenerate: F) -> RgbImage
where F: Fn(u32, u32, &Rgb<u8>) -> Rgb<u8> {
    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let base = degenerate(x, y, pixel);
        for channel in 0..3 {
            let d = f32::from(base[channel]);
            let v = f32::from(pixel[channel]);
            pixel[channel] = clamp_channel_f(factor.mul_add(v - d, d));
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn clamp_channel(value: i32) -> u8 {
    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_channel_f(value: f32) -> u8 { value.round().clamp(0.0, 255.0) as u8 }
