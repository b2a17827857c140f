//! Scanline flood fill producing region masks.

use crate::mask::RegionMask;
use crate::viewport::PixelSize;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// How colour distance to the seed pixel is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMetric {
    /// Sum of absolute R, G, B differences, compared against `3 * tolerance`.
    /// Alpha is ignored.
    #[default]
    Rgb,
    /// Sum of absolute R, G, B, A differences, compared against `4 * tolerance`.
    Rgba,
}

impl ColorMetric {
    /// Whether `candidate` is within `tolerance` of `seed`.
    pub fn matches(self, seed: Rgba<u8>, candidate: Rgba<u8>, tolerance: u8) -> bool {
        let diff = |i: usize| (seed[i] as i32 - candidate[i] as i32).unsigned_abs();
        let t = tolerance as u32;
        match self {
            ColorMetric::Rgb => diff(0) + diff(1) + diff(2) <= t * 3,
            ColorMetric::Rgba => diff(0) + diff(1) + diff(2) + diff(3) <= t * 4,
        }
    }
}

/// Work counters for one fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Spans pushed onto the work stack.
    pub spans: usize,
    /// Pixels marked.
    pub pixels: usize,
    /// Deepest the work stack got.
    pub max_stack: usize,
}

/// A horizontal run `x0..=x1` on row `y`.
#[derive(Debug, Clone, Copy)]
struct Span {
    y: u32,
    x0: u32,
    x1: u32,
}

struct SpanFiller<'a> {
    image: &'a RgbaImage,
    seed: Rgba<u8>,
    tolerance: u8,
    metric: ColorMetric,
    mask: RegionMask,
    stack: Vec<Span>,
    stats: FillStats,
}

impl<'a> SpanFiller<'a> {
    fn new(image: &'a RgbaImage, seed: Rgba<u8>, tolerance: u8, metric: ColorMetric) -> Self {
        Self {
            image,
            seed,
            tolerance,
            metric,
            mask: RegionMask::new(PixelSize::new(image.width(), image.height())),
            stack: Vec::new(),
            stats: FillStats::default(),
        }
    }

    fn fillable(&self, x: u32, y: u32) -> bool {
        !self.mask.is_set(x, y)
            && self
                .metric
                .matches(self.seed, *self.image.get_pixel(x, y), self.tolerance)
    }

    /// Grow a span from `(x, y)` as far left and right as the predicate holds,
    /// mark it and queue it.
    fn claim(&mut self, x: u32, y: u32) -> u32 {
        let mut x0 = x;
        while x0 > 0 && self.fillable(x0 - 1, y) {
            x0 -= 1;
        }
        let mut x1 = x;
        while x1 + 1 < self.image.width() && self.fillable(x1 + 1, y) {
            x1 += 1;
        }
        self.mask.set_span(y, x0, x1);
        self.stats.pixels += (x1 - x0 + 1) as usize;
        self.stats.spans += 1;
        self.stack.push(Span { y, x0, x1 });
        self.stats.max_stack = self.stats.max_stack.max(self.stack.len());
        x1
    }

    /// Claim every fillable run on row `y` that touches `x0..=x1`.
    fn scan_row(&mut self, y: u32, x0: u32, x1: u32) {
        let mut x = x0;
        while x <= x1 {
            if self.fillable(x, y) {
                x = self.claim(x, y) + 1;
            } else {
                x += 1;
            }
        }
    }

    fn run(mut self, seed_x: u32, seed_y: u32) -> (RegionMask, FillStats) {
        self.claim(seed_x, seed_y);
        let height = self.image.height();
        while let Some(span) = self.stack.pop() {
            if span.y > 0 {
                self.scan_row(span.y - 1, span.x0, span.x1);
            }
            if span.y + 1 < height {
                self.scan_row(span.y + 1, span.x0, span.x1);
            }
        }
        (self.mask, self.stats)
    }
}

/// Mask of all pixels 4-connected to `seed` whose colour is within
/// `tolerance` of the seed pixel.
///
/// A seed outside the image yields an all-clear mask.
pub fn flood_fill(image: &RgbaImage, seed: (i64, i64), tolerance: u8, metric: ColorMetric) -> RegionMask {
    flood_fill_with_stats(image, seed, tolerance, metric).0
}

/// [`flood_fill`] that also reports how much work was done.
pub fn flood_fill_with_stats(
    image: &RgbaImage,
    seed: (i64, i64),
    tolerance: u8,
    metric: ColorMetric,
) -> (RegionMask, FillStats) {
    let size = PixelSize::new(image.width(), image.height());
    let (sx, sy) = seed;
    if !size.contains(sx, sy) {
        log::debug!("Flood fill seed ({}, {}) outside {}x{}", sx, sy, size.width, size.height);
        return (RegionMask::new(size), FillStats::default());
    }
    let (sx, sy) = (sx as u32, sy as u32);
    let seed_color = *image.get_pixel(sx, sy);
    let (mask, stats) = SpanFiller::new(image, seed_color, tolerance, metric).run(sx, sy);
    log::debug!(
        "Flood fill from ({}, {}) tol {}: {} px in {} spans (stack peak {})",
        sx,
        sy,
        tolerance,
        stats.pixels,
        stats.spans,
        stats.max_stack
    );
    (mask, stats)
}
