//! Bilevel raster input and ink point extraction.
//!
//! The engine consumes an already-thresholded image: one byte per pixel,
//! `0` meaning ink and anything else meaning paper. Loading, resizing and
//! thresholding happen upstream.

use std::collections::HashSet;

use image::GrayImage;

use crate::types::{Dimensions, EngineError, PixelPoint};

/// Pixel value that marks ink.
pub const INK: u8 = 0;

/// A bilevel raster stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wrap a row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRaster`] if `pixels.len()` is not
    /// `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, EngineError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(EngineError::InvalidRaster {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a raster where `is_ink(x, y)` decides each pixel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut is_ink: impl FnMut(u32, u32) -> bool) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(if is_ink(x, y) { INK } else { u8::MAX });
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Take a thresholded grayscale image as-is (black pixels are ink).
    #[must_use]
    pub fn from_gray_image(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.as_raw().clone(),
        }
    }

    /// Raster size in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the pixel at `(x, y)` is ink. Out-of-bounds is paper.
    #[must_use]
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[y as usize * self.width as usize + x as usize] == INK
    }

    /// Iterate over ink pixels in row-major order.
    pub fn ink_pixels(&self) -> impl Iterator<Item = PixelPoint> + '_ {
        let width = self.width as usize;
        self.pixels
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == INK)
            .filter_map(move |(i, _)| {
                let x = u32::try_from(i % width).ok()?;
                let y = u32::try_from(i / width).ok()?;
                Some(PixelPoint::new(x, y))
            })
    }
}

/// The ink points of one synthesis run, in discovery order.
///
/// Immutable once built. Indices into a `PointSet` identify points
/// throughout the traversal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointSet(Vec<PixelPoint>);

impl PointSet {
    /// Extract every ink pixel of `bitmap`, scanning row-major.
    #[must_use]
    pub fn from_bitmap(bitmap: &Bitmap) -> Self {
        Self(bitmap.ink_pixels().collect())
    }

    /// Collect points in the given order, keeping only the first
    /// occurrence of each coordinate.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = PixelPoint>) -> Self {
        let mut seen = HashSet::new();
        Self(points.into_iter().filter(|p| seen.insert(*p)).collect())
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no ink points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All points in order.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.0
    }

    /// The point at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<PixelPoint> {
        self.0.get(index).copied()
    }
}
