//! Sobel gradient magnitudes for magnetic-lasso snapping.

use crate::viewport::Viewport;
use image::{GrayImage, RgbaImage};
use kurbo::Point;
use rayon::prelude::*;

/// Pixel radius searched around the cursor.
pub const SNAP_RADIUS: u32 = 8;

/// Weakest gradient that still attracts the cursor.
pub const MIN_EDGE_STRENGTH: u8 = 30;

/// Outcome of a snap query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Scene point to use, snapped or raw.
    pub point: Point,
    pub snapped: bool,
    /// Strongest magnitude found in the window.
    pub strength: u8,
}

impl SnapResult {
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped: false,
            strength: 0,
        }
    }
}

/// Per-pixel gradient magnitude (0-255), built once per gesture.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    magnitudes: GrayImage,
}

fn luminance(px: &[u8]) -> u8 {
    (0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64).round() as u8
}

impl EdgeMap {
    /// 3x3 Sobel over the luminance of `image`. The one-pixel border stays 0.
    pub fn build(image: &RgbaImage) -> Self {
        let w = image.width() as usize;
        let h = image.height() as usize;
        let luma: Vec<u8> = image.as_raw().chunks_exact(4).map(luminance).collect();
        let mut out = vec![0u8; w * h];

        if w >= 3 && h >= 3 {
            out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
                if y == 0 || y == h - 1 {
                    return;
                }
                let at = |x: usize, y: usize| luma[y * w + x] as i32;
                for x in 1..w - 1 {
                    let gx = -at(x - 1, y - 1) + at(x + 1, y - 1) - 2 * at(x - 1, y) + 2 * at(x + 1, y)
                        - at(x - 1, y + 1)
                        + at(x + 1, y + 1);
                    let gy = -at(x - 1, y - 1) - 2 * at(x, y - 1) - at(x + 1, y - 1)
                        + at(x - 1, y + 1)
                        + 2 * at(x, y + 1)
                        + at(x + 1, y + 1);
                    let mag = ((gx * gx + gy * gy) as f64).sqrt();
                    row[x] = mag.min(255.0) as u8;
                }
            });
        }

        let magnitudes = GrayImage::from_raw(w as u32, h as u32, out)
            .unwrap_or_else(|| GrayImage::new(w as u32, h as u32));
        log::debug!("Edge map built for {}x{}", w, h);
        Self { magnitudes }
    }

    pub fn width(&self) -> u32 {
        self.magnitudes.width()
    }

    pub fn height(&self) -> u32 {
        self.magnitudes.height()
    }

    /// Magnitude at a pixel, 0 outside the map.
    pub fn magnitude(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return 0;
        }
        self.magnitudes.get_pixel(x as u32, y as u32)[0]
    }

    /// Strongest pixel within `radius` of `(cx, cy)`. Equal magnitudes go to
    /// the pixel nearest the centre.
    pub fn strongest_near(&self, cx: i64, cy: i64, radius: u32) -> Option<((i64, i64), u8)> {
        let r = radius as i64;
        let mut best: Option<((i64, i64), u8, i64)> = None;
        for y in (cy - r).max(0)..=(cy + r).min(self.height() as i64 - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(self.width() as i64 - 1) {
                let m = self.magnitude(x, y);
                let d2 = (x - cx).pow(2) + (y - cy).pow(2);
                if best.is_none_or(|(_, b, bd)| m > b || (m == b && d2 < bd)) {
                    best = Some(((x, y), m, d2));
                }
            }
        }
        best.map(|(p, m, _)| (p, m))
    }

    /// Snap a scene point to the strongest nearby edge.
    pub fn snap(&self, point: Point, viewport: Viewport) -> SnapResult {
        self.snap_with(point, viewport, SNAP_RADIUS, MIN_EDGE_STRENGTH)
    }

    pub fn snap_with(&self, point: Point, viewport: Viewport, radius: u32, min_strength: u8) -> SnapResult {
        let (px, py) = viewport.scene_to_pixel(point);
        match self.strongest_near(px, py, radius) {
            Some(((x, y), strength)) if strength >= min_strength => SnapResult {
                point: viewport.pixel_to_scene(x as f64, y as f64),
                snapped: true,
                strength,
            },
            Some((_, strength)) => SnapResult {
                strength,
                ..SnapResult::none(point)
            },
            None => SnapResult::none(point),
        }
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.magnitudes
    }
}
