//! Dense binary region masks.

use crate::rasterize::Coverage;
use crate::viewport::{PixelRect, PixelSize};
use image::{GrayImage, Luma, RgbaImage};

const SET: Luma<u8> = Luma([255]);

/// One byte per surface pixel, 0 (clear) or 255 (set).
///
/// Masks are ephemeral: produced by a flood fill or a stroke rasterization,
/// traced into an outline, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMask {
    pixels: GrayImage,
}

impl RegionMask {
    /// An all-clear mask.
    pub fn new(size: PixelSize) -> Self {
        Self {
            pixels: GrayImage::new(size.width, size.height),
        }
    }

    /// Pixels whose alpha is strictly above `threshold`.
    pub fn from_alpha(image: &RgbaImage, threshold: u8) -> Self {
        let mut mask = Self::new(PixelSize::new(image.width(), image.height()));
        for (x, y, px) in image.enumerate_pixels() {
            if px[3] > threshold {
                mask.pixels.put_pixel(x, y, SET);
            }
        }
        mask
    }

    /// Place `coverage` into a surface-sized mask.
    pub fn from_coverage(coverage: &Coverage, size: PixelSize) -> Self {
        let mut mask = Self::new(size);
        let area = coverage.area();
        for (lx, ly, px) in coverage.local().enumerate_pixels() {
            let (x, y) = (lx + area.x, ly + area.y);
            if px[0] != 0 && x < size.width && y < size.height {
                mask.pixels.put_pixel(x, y, SET);
            }
        }
        mask
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.pixels.width(), self.pixels.height())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.pixels.get_pixel(x, y)[0] != 0
    }

    pub fn set(&mut self, x: u32, y: u32) {
        if x < self.width() && y < self.height() {
            self.pixels.put_pixel(x, y, SET);
        }
    }

    /// Clear every set pixel for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(u32, u32) -> bool) {
        for (x, y, px) in self.pixels.enumerate_pixels_mut() {
            if px[0] != 0 && !keep(x, y) {
                px[0] = 0;
            }
        }
    }

    /// Set the inclusive span `x0..=x1` on row `y`.
    pub fn set_span(&mut self, y: u32, x0: u32, x1: u32) {
        for x in x0..=x1 {
            self.set(x, y);
        }
    }

    pub fn count(&self) -> usize {
        self.pixels.pixels().filter(|p| p[0] != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.pixels().all(|p| p[0] == 0)
    }

    /// Leftmost and rightmost set pixel on row `y`.
    pub fn row_extent(&self, y: u32) -> Option<(u32, u32)> {
        if y >= self.height() {
            return None;
        }
        let set = |x: &u32| self.pixels.get_pixel(*x, y)[0] != 0;
        let left = (0..self.width()).find(set)?;
        let right = (0..self.width()).rev().find(set)?;
        Some((left, right))
    }

    /// Tight bounding box of the set pixels.
    pub fn bounds(&self) -> Option<PixelRect> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut any = false;
        for (x, y, px) in self.pixels.enumerate_pixels() {
            if px[0] != 0 {
                any = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
        any.then(|| PixelRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// True when every pixel set here is also set in `other`.
    pub fn is_subset_of(&self, other: &RegionMask) -> bool {
        self.size() == other.size()
            && self
                .pixels
                .pixels()
                .zip(other.pixels.pixels())
                .all(|(a, b)| a[0] == 0 || b[0] != 0)
    }

    /// Intersection over union of the set pixels. Two empty masks agree fully.
    pub fn agreement(&self, other: &RegionMask) -> f64 {
        let mut both = 0usize;
        let mut either = 0usize;
        for (a, b) in self.pixels.pixels().zip(other.pixels.pixels()) {
            let (a, b) = (a[0] != 0, b[0] != 0);
            both += (a && b) as usize;
            either += (a || b) as usize;
        }
        if either == 0 {
            1.0
        } else {
            both as f64 / either as f64
        }
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn into_gray(self) -> GrayImage {
        self.pixels
    }
}
