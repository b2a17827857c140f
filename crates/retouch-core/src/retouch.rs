//! Pixel brushes that respect the active selection.
//!
//! When a selection exists only pixels inside its clip region change. Each
//! tool produces a [`RasterPatch`] that is committed like any region
//! operation.

use crate::color::PixelColor;
use crate::compose::{ComposeError, ComposeResult, Compositor, PatchBlend, PatchKind, RasterPatch};
use crate::flood_fill::{ColorMetric, flood_fill};
use crate::outline::Outline;
use crate::raster::{OverlayHidden, RasterSurface};
use crate::rasterize::Coverage;
use crate::viewport::{PixelRect, PixelSize, Viewport};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Box-blur kernel radius; the kernel is 5x5.
pub const BLUR_KERNEL_RADIUS: i64 = 2;

/// Coverage of the selection over the canvas, if there is one.
fn selection_clip(selection: Option<&Outline>, viewport: Viewport, canvas: PixelSize) -> Option<Coverage> {
    selection.map(|outline| {
        let area = outline.pixel_bounds(viewport, canvas);
        outline.to_clip_region(viewport).coverage(area)
    })
}

fn allowed(clip: Option<&Coverage>, x: u32, y: u32) -> bool {
    clip.is_none_or(|c| c.contains(x, y))
}

/// Flood-fill recolouring from a seed point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintBucket {
    pub tolerance: u8,
    pub metric: ColorMetric,
    /// Fill colour; its alpha is the fill opacity.
    pub color: PixelColor,
}

impl Default for PaintBucket {
    fn default() -> Self {
        Self {
            tolerance: 30,
            metric: ColorMetric::Rgb,
            color: PixelColor::BLACK,
        }
    }
}

impl PaintBucket {
    /// Fill the region connected to `seed` (a scene point). The patch covers
    /// the bounding box of the filled pixels.
    pub fn fill(
        &self,
        surface: &mut dyn RasterSurface,
        seed: Point,
        viewport: Viewport,
        selection: Option<&Outline>,
    ) -> ComposeResult<RasterPatch> {
        let canvas = surface.size();
        let (sx, sy) = viewport.scene_to_pixel(seed);
        if !canvas.contains(sx, sy) {
            log::warn!("Paint bucket skipped: seed ({}, {}) off canvas", sx, sy);
            return Err(ComposeError::OutsideCanvas);
        }
        let overlay = OverlayHidden::new(surface, true);
        let mut pixels = overlay.surface().read_all();
        drop(overlay);

        let mut mask = flood_fill(&pixels, (sx, sy), self.tolerance, self.metric);
        if let Some(clip) = selection_clip(selection, viewport, canvas) {
            mask.retain(|x, y| clip.contains(x, y));
        }
        let bbox = mask.bounds().ok_or_else(|| {
            log::warn!("Paint bucket skipped: nothing to fill inside the selection");
            ComposeError::EmptyRegion
        })?;
        for (x, y, px) in pixels.enumerate_pixels_mut() {
            if mask.is_set(x, y) {
                *px = self.color.composite_over(*px);
            }
        }
        let region = image::imageops::crop_imm(&pixels, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
        Ok(Compositor::new(viewport).patch(PatchKind::PaintBucket, region, bbox, PatchBlend::Replace))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DodgeBurnMode {
    /// Lighten: `c + (255 - c) * e`.
    #[default]
    Dodge,
    /// Darken: `c - c * e`.
    Burn,
}

/// Which tones a dodge or burn dab affects most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneRange {
    Shadows,
    #[default]
    Midtones,
    Highlights,
}

impl ToneRange {
    /// Exposure weight for a luminance in `0..=255`.
    pub fn weight(self, luminance: f64) -> f64 {
        let l = luminance / 255.0;
        match self {
            ToneRange::Shadows => (1.0 - l * 4.0).max(0.0),
            ToneRange::Midtones => 1.0 - (l - 0.5).abs() * 2.0,
            ToneRange::Highlights => (l * 4.0 - 3.0).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DodgeBurn {
    pub mode: DodgeBurnMode,
    pub range: ToneRange,
    /// Strength in `0.0..=1.0`.
    pub exposure: f64,
    /// Dab radius in screen pixels.
    pub size: u32,
}

impl Default for DodgeBurn {
    fn default() -> Self {
        Self {
            mode: DodgeBurnMode::Dodge,
            range: ToneRange::Midtones,
            exposure: 0.3,
            size: 20,
        }
    }
}

impl DodgeBurn {
    fn apply(&self, px: Rgba<u8>) -> Rgba<u8> {
        let luminance = px[0] as f64 * 0.299 + px[1] as f64 * 0.587 + px[2] as f64 * 0.114;
        let e = self.exposure * self.range.weight(luminance);
        let channel = |c: u8| {
            let c = c as f64;
            let v = match self.mode {
                DodgeBurnMode::Dodge => c + (255.0 - c) * e,
                DodgeBurnMode::Burn => c - c * e,
            };
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgba([channel(px[0]), channel(px[1]), channel(px[2]), px[3]])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurBrush {
    /// Blend towards the box average, `0.0..=1.0`.
    pub strength: f64,
    /// Dab radius in screen pixels.
    pub size: u32,
}

impl Default for BlurBrush {
    fn default() -> Self {
        Self { strength: 0.5, size: 20 }
    }
}

/// A brush that works in dabs over a working snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetouchBrush {
    DodgeBurn(DodgeBurn),
    Blur(BlurBrush),
}

impl RetouchBrush {
    pub fn size(&self) -> u32 {
        match self {
            RetouchBrush::DodgeBurn(b) => b.size,
            RetouchBrush::Blur(b) => b.size,
        }
    }

    pub fn kind(&self) -> PatchKind {
        match self {
            RetouchBrush::DodgeBurn(_) => PatchKind::DodgeBurn,
            RetouchBrush::Blur(_) => PatchKind::Blur,
        }
    }
}

/// One press-drag-release of a retouch brush.
///
/// Dabs read and write the same snapshot, so overlapping dabs accumulate.
#[derive(Debug, Clone)]
pub struct RetouchStroke {
    brush: RetouchBrush,
    viewport: Viewport,
    working: RgbaImage,
    touched: GrayImage,
    clip: Option<Coverage>,
    dabs: usize,
}

impl RetouchStroke {
    /// Snapshot the surface and lay down the first dab at `start`.
    pub fn begin(
        brush: RetouchBrush,
        surface: &mut dyn RasterSurface,
        viewport: Viewport,
        selection: Option<&Outline>,
        start: Point,
    ) -> Self {
        let canvas = surface.size();
        let overlay = OverlayHidden::new(surface, true);
        let working = overlay.surface().read_all();
        drop(overlay);
        let mut stroke = Self {
            brush,
            viewport,
            touched: GrayImage::new(working.width(), working.height()),
            working,
            clip: selection_clip(selection, viewport, canvas),
            dabs: 0,
        };
        stroke.dab(start);
        stroke
    }

    pub fn brush(&self) -> RetouchBrush {
        self.brush
    }

    /// Current state of the snapshot, for live preview.
    pub fn working(&self) -> &RgbaImage {
        &self.working
    }

    pub fn dab_count(&self) -> usize {
        self.dabs
    }

    /// Apply one circular dab centred on the scene point `at`.
    pub fn dab(&mut self, at: Point) {
        self.dabs += 1;
        let (cx, cy) = self.viewport.scene_to_pixel(at);
        let size = self.brush.size() as i64;
        let canvas = PixelSize::new(self.working.width(), self.working.height());
        let area = PixelRect::from_edges_clamped(cx - size, cy - size, cx + size, cy + size, canvas);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let (dx, dy) = (x as i64 - cx, y as i64 - cy);
                if dx * dx + dy * dy > size * size || !allowed(self.clip.as_ref(), x, y) {
                    continue;
                }
                let out = match &self.brush {
                    RetouchBrush::DodgeBurn(b) => b.apply(*self.working.get_pixel(x, y)),
                    RetouchBrush::Blur(b) => self.blurred(x, y, b.strength),
                };
                self.working.put_pixel(x, y, out);
                self.touched.put_pixel(x, y, Luma([255]));
            }
        }
    }

    fn blurred(&self, x: u32, y: u32, strength: f64) -> Rgba<u8> {
        let (w, h) = (self.working.width() as i64, self.working.height() as i64);
        let mut sum = [0.0; 4];
        let mut n = 0.0;
        for ky in -BLUR_KERNEL_RADIUS..=BLUR_KERNEL_RADIUS {
            for kx in -BLUR_KERNEL_RADIUS..=BLUR_KERNEL_RADIUS {
                let (sx, sy) = (x as i64 + kx, y as i64 + ky);
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                let px = self.working.get_pixel(sx as u32, sy as u32);
                for c in 0..4 {
                    sum[c] += px[c] as f64;
                }
                n += 1.0;
            }
        }
        let orig = self.working.get_pixel(x, y);
        Rgba([0, 1, 2, 3].map(|c| {
            let o = orig[c] as f64;
            (o + (sum[c] / n - o) * strength).round().clamp(0.0, 255.0) as u8
        }))
    }

    /// End the stroke. The patch replaces the whole canvas with the snapshot.
    pub fn finish(self) -> ComposeResult<RasterPatch> {
        if self.touched.pixels().all(|p| p[0] == 0) {
            log::warn!("{} stroke changed no pixels", self.brush.kind().label());
            return Err(ComposeError::EmptyRegion);
        }
        log::debug!("{} stroke finished after {} dabs", self.brush.kind().label(), self.dabs);
        let area = PixelRect::new(0, 0, self.working.width(), self.working.height());
        Ok(Compositor::new(self.viewport).patch(self.brush.kind(), self.working, area, PatchBlend::Replace))
    }
}
