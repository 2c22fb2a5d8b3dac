//! Image preparation: decode, fit to the bed, threshold.
//!
//! The engine only accepts a bilevel raster and spreads it over the whole
//! canvas. Everything that turns a photo or scan into one lives here,
//! outside the engine, including padding so the image keeps its aspect
//! ratio on the bed.

use image::imageops::FilterType;
use image::{GrayImage, Luma};
use inkplot_engine::Canvas;

/// Default gray level separating ink from paper.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// How to turn a decoded image into a bilevel raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepOptions {
    /// Gray values strictly above this are paper; the rest are ink.
    pub threshold: u8,

    /// Draw the image this many millimeters wide. `None` fits the canvas.
    pub width_mm: Option<f64>,

    /// Raster resolution.
    pub pixels_per_mm: f64,

    /// Bed the raster covers.
    pub canvas: Canvas,
}

/// Decode image bytes and produce a black-and-white raster of the whole
/// bed at `pixels_per_mm`.
///
/// The image is scaled to `width_mm` (or the largest size that fits the
/// canvas), keeping its aspect ratio, and placed at the bed's top-left
/// corner. The rest of the bed is paper.
///
/// # Errors
///
/// Returns the decoder's error if the bytes are not a supported image.
pub fn prepare(bytes: &[u8], options: &PrepOptions) -> Result<GrayImage, image::ImageError> {
    let gray = image::load_from_memory(bytes)?.to_luma8();

    let (bed_width, bed_height) = bed_size(options.canvas, options.pixels_per_mm);
    let width_mm = options.width_mm.unwrap_or(options.canvas.width_mm);
    if width_mm > options.canvas.width_mm {
        tracing::warn!(
            width_mm,
            canvas_width_mm = options.canvas.width_mm,
            "image wider than the canvas, shrinking to fit"
        );
    }
    let max_width = px(width_mm, options.pixels_per_mm).min(bed_width);
    let (width, height) = fit_size(gray.width(), gray.height(), max_width, bed_height);

    let gray = if (width, height) == gray.dimensions() {
        gray
    } else {
        tracing::debug!(
            from_width = gray.width(),
            from_height = gray.height(),
            width,
            height,
            "resizing image"
        );
        image::imageops::resize(&gray, width, height, FilterType::Triangle)
    };
    let ink = threshold(&gray, options.threshold);

    if ink.dimensions() == (bed_width, bed_height) {
        return Ok(ink);
    }
    let mut bed = GrayImage::from_pixel(bed_width, bed_height, Luma([255]));
    image::imageops::replace(&mut bed, &ink, 0, 0);
    Ok(bed)
}

/// Raster size of the whole canvas. Never smaller than 1x1.
#[must_use]
pub fn bed_size(canvas: Canvas, pixels_per_mm: f64) -> (u32, u32) {
    (
        px(canvas.width_mm, pixels_per_mm),
        px(canvas.height_mm, pixels_per_mm),
    )
}

/// Largest size with the aspect ratio of `width` x `height` that fits in
/// `max_width` x `max_height`. Never smaller than 1x1.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }
    let factor = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height));
    let fitted = |side: u32, max: u32| {
        ((f64::from(side) * factor).round().max(1.0) as u32).min(max.max(1))
    };
    (fitted(width, max_width), fitted(height, max_height))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn px(mm: f64, pixels_per_mm: f64) -> u32 {
    (mm * pixels_per_mm).round().max(1.0) as u32
}

/// Map every pixel to pure black (ink) or pure white (paper).
#[must_use]
pub fn threshold(gray: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
