//! Edge-blend synthesis for content-aware fill.
//!
//! Not texture synthesis: every interior pixel is a bilinear mix of patch
//! averages taken just outside the selection box on each side, smoothed and
//! feathered back into the original pixels near the border.

use crate::rasterize::Coverage;
use crate::viewport::PixelRect;
use image::{Rgba, RgbaImage};

const SMOOTHING_PASSES: usize = 3;

/// Context margin read around the selection box.
pub fn padding(bbox: PixelRect) -> u32 {
    bbox.width.max(bbox.height).max(30)
}

/// Side length of the averaging patch used for edge samples.
pub fn patch_size(bbox: PixelRect) -> u32 {
    (bbox.width.min(bbox.height) / 4).clamp(3, 7)
}

/// Width of the feathered band, in pixels.
pub fn feather_radius(bbox: PixelRect) -> u32 {
    (bbox.width.min(bbox.height) / 8).clamp(3, 8)
}

type Sample = [f64; 4];

/// Read-only view of the context pixels in screen coordinates.
struct Context<'a> {
    pixels: &'a RgbaImage,
    area: PixelRect,
}

impl Context<'_> {
    /// Mean over a `size` x `size` patch centred on `(cx, cy)`, restricted to
    /// context pixels outside `exclude`. `None` when no such pixel exists.
    fn patch_mean(&self, cx: i64, cy: i64, size: u32, exclude: PixelRect) -> Option<Sample> {
        let half = (size / 2) as i64;
        let mut sum = [0.0; 4];
        let mut n = 0usize;
        for y in cy - half..=cy + half {
            for x in cx - half..=cx + half {
                if x < self.area.x as i64
                    || y < self.area.y as i64
                    || x >= self.area.right() as i64
                    || y >= self.area.bottom() as i64
                {
                    continue;
                }
                let (ux, uy) = (x as u32, y as u32);
                if exclude.contains(ux, uy) {
                    continue;
                }
                let px = self.pixels.get_pixel(ux - self.area.x, uy - self.area.y);
                for c in 0..4 {
                    sum[c] += px[c] as f64;
                }
                n += 1;
            }
        }
        (n > 0).then(|| sum.map(|s| s / n as f64))
    }
}

fn lerp(a: Sample, b: Sample, t: f64) -> Sample {
    [0, 1, 2, 3].map(|c| a[c] * (1.0 - t) + b[c] * t)
}

fn mix(a: Option<Sample>, b: Option<Sample>, t: f64) -> Option<Sample> {
    match (a, b) {
        (Some(a), Some(b)) => Some(lerp(a, b, t)),
        (a, b) => a.or(b),
    }
}

fn to_pixel(s: Sample) -> Rgba<u8> {
    Rgba(s.map(|v| v.round().clamp(0.0, 255.0) as u8))
}

fn to_sample(px: &Rgba<u8>) -> Sample {
    [0, 1, 2, 3].map(|c| px[c] as f64)
}

/// Chessboard distance from each covered pixel to the nearest uncovered
/// pixel, counting everything outside the box as uncovered.
fn border_distance(coverage: &Coverage) -> Vec<u32> {
    let mask = coverage.local();
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let mut dist = vec![0u32; w * h];
    let inf = u32::MAX / 2;
    for y in 0..h {
        for x in 0..w {
            if mask.get_pixel(x as u32, y as u32)[0] != 0 {
                dist[y * w + x] = inf;
            }
        }
    }
    let at = |d: &[u32], x: isize, y: isize| -> u32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            d[y as usize * w + x as usize]
        }
    };
    for y in 0..h as isize {
        for x in 0..w as isize {
            let i = y as usize * w + x as usize;
            if dist[i] == 0 {
                continue;
            }
            let best = [(-1, -1), (0, -1), (1, -1), (-1, 0)]
                .iter()
                .map(|(dx, dy)| at(&dist, x + dx, y + dy))
                .min()
                .unwrap_or(0);
            dist[i] = dist[i].min(best + 1);
        }
    }
    for y in (0..h as isize).rev() {
        for x in (0..w as isize).rev() {
            let i = y as usize * w + x as usize;
            if dist[i] == 0 {
                continue;
            }
            let best = [(1, 1), (0, 1), (-1, 1), (1, 0)]
                .iter()
                .map(|(dx, dy)| at(&dist, x + dx, y + dy))
                .min()
                .unwrap_or(0);
            dist[i] = dist[i].min(best + 1);
        }
    }
    dist
}

/// Fill the covered pixels of `bbox` from the surrounding `context`.
///
/// `source` holds the pixels of `context` (screen coordinates). The result is
/// `bbox`-sized: uncovered pixels are copied through unchanged.
pub fn synthesize(source: &RgbaImage, context: PixelRect, bbox: PixelRect, coverage: &Coverage) -> RgbaImage {
    let ctx = Context {
        pixels: source,
        area: context,
    };
    let patch = patch_size(bbox);
    let (w, h) = (bbox.width as usize, bbox.height as usize);
    let covered = |x: usize, y: usize| coverage.local().get_pixel(x as u32, y as u32)[0] != 0;

    let original: Vec<Sample> = (0..w * h)
        .map(|i| {
            let (x, y) = ((i % w) as u32 + bbox.x, (i / w) as u32 + bbox.y);
            to_sample(source.get_pixel(x - context.x, y - context.y))
        })
        .collect();

    let (top, bottom) = (bbox.y as i64 - 1, bbox.bottom() as i64);
    let (left, right) = (bbox.x as i64 - 1, bbox.right() as i64);
    let mut work = original.clone();
    for y in 0..h {
        let rel_y = if h > 1 { y as f64 / (h - 1) as f64 } else { 0.5 };
        let sy = bbox.y as i64 + y as i64;
        let left_sample = ctx.patch_mean(left, sy, patch, bbox);
        let right_sample = ctx.patch_mean(right, sy, patch, bbox);
        for x in 0..w {
            if !covered(x, y) {
                continue;
            }
            let rel_x = if w > 1 { x as f64 / (w - 1) as f64 } else { 0.5 };
            let sx = bbox.x as i64 + x as i64;
            let vertical = mix(
                ctx.patch_mean(sx, top, patch, bbox),
                ctx.patch_mean(sx, bottom, patch, bbox),
                rel_y,
            );
            let horizontal = mix(left_sample, right_sample, rel_x);
            if let Some(s) = mix(vertical, horizontal, 0.5) {
                work[y * w + x] = s;
            }
        }
    }

    for _ in 0..SMOOTHING_PASSES {
        let prev = work.clone();
        for y in 0..h {
            for x in 0..w {
                if !covered(x, y) {
                    continue;
                }
                let mut sum = [0.0; 4];
                let mut n = 0.0;
                for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                        let s = prev[ny * w + nx];
                        for c in 0..4 {
                            sum[c] += s[c];
                        }
                        n += 1.0;
                    }
                }
                work[y * w + x] = sum.map(|v| v / n);
            }
        }
    }

    let radius = feather_radius(bbox) as f64;
    let dist = border_distance(coverage);
    let mut out = RgbaImage::new(bbox.width, bbox.height);
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let px = if covered(x, y) {
                let t = (dist[i] as f64 / radius).min(1.0);
                lerp(original[i], work[i], t)
            } else {
                original[i]
            };
            out.put_pixel(x as u32, y as u32, to_pixel(px));
        }
    }
    log::debug!(
        "Content-aware fill {}x{}: patch {}, feather {}, context {:?}",
        w,
        h,
        patch,
        radius,
        context
    );
    out
}
