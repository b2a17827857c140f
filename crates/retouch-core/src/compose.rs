//! Clip-and-compose region operations.
//!
//! Every operation restricts its pixels to the active outline and returns a
//! [`RasterPatch`]; nothing here writes to the surface. Patches are applied
//! later, in order, by the commit queue.

use crate::clipboard::{Clipboard, ClipboardRecord};
use crate::color::{PixelColor, blend_over};
use crate::content_fill;
use crate::outline::{ClipRegion, Outline};
use crate::raster::{OverlayHidden, RasterSurface};
use crate::rasterize::Coverage;
use crate::viewport::{PixelRect, PixelSize, Viewport};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Regions narrower or shorter than this (in pixels) are rejected.
pub const MIN_REGION_SIZE: u32 = 2;

/// Scene-unit nudge applied to pasted pixels.
pub const PASTE_OFFSET: f64 = 10.0;

/// Reasons a region operation did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("No active selection")]
    NoSelection,
    #[error("Selection too small: {width}x{height} px")]
    SelectionTooSmall { width: u32, height: u32 },
    #[error("Clipboard is empty")]
    ClipboardEmpty,
    #[error("Selection lies outside the canvas")]
    OutsideCanvas,
    #[error("Selection covers no pixels")]
    EmptyRegion,
}

impl ComposeError {
    /// Advisory text for the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ComposeError::NoSelection => "Please select a region first",
            ComposeError::SelectionTooSmall { .. } => "Selection too small",
            ComposeError::ClipboardEmpty => "Nothing to paste",
            ComposeError::OutsideCanvas | ComposeError::EmptyRegion => "Selection does not cover any pixels",
        }
    }
}

/// Result type for region operations.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Which operation produced a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    Fill,
    Delete,
    Stroke,
    Extract,
    Paste,
    ContentAwareFill,
    PaintBucket,
    DodgeBurn,
    Blur,
}

impl PatchKind {
    pub fn label(&self) -> &'static str {
        match self {
            PatchKind::Fill => "Fill",
            PatchKind::Delete => "Delete",
            PatchKind::Stroke => "Stroke",
            PatchKind::Extract => "Extract",
            PatchKind::Paste => "Paste",
            PatchKind::ContentAwareFill => "Content-aware fill",
            PatchKind::PaintBucket => "Paint bucket",
            PatchKind::DodgeBurn => "Dodge/Burn",
            PatchKind::Blur => "Blur",
        }
    }
}

/// How a patch lands on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchBlend {
    /// Overwrite the covered rectangle.
    Replace,
    /// Straight-alpha source-over.
    SourceOver,
}

/// A computed pixel buffer and where it goes.
#[derive(Debug, Clone)]
pub struct RasterPatch {
    pub kind: PatchKind,
    pub pixels: RgbaImage,
    /// Screen pixel of the top-left corner. May lie off-canvas.
    pub origin: (i64, i64),
    /// Scene position of the top-left corner.
    pub scene_origin: Point,
    /// Scene units per pixel.
    pub scene_scale: Vec2,
    pub blend: PatchBlend,
}

impl RasterPatch {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Write the patch onto `surface`, dropping anything off-canvas.
    pub fn apply_to(&self, surface: &mut dyn RasterSurface) {
        let (ox, oy) = self.origin;
        match self.blend {
            PatchBlend::Replace => surface.write_region(ox, oy, &self.pixels),
            PatchBlend::SourceOver => {
                let target = PixelRect::from_edges_clamped(
                    ox,
                    oy,
                    ox + self.width() as i64,
                    oy + self.height() as i64,
                    surface.size(),
                );
                if target.is_empty() {
                    return;
                }
                let mut dst = surface.read_region(target);
                for (x, y, px) in dst.enumerate_pixels_mut() {
                    let sx = (target.x as i64 + x as i64 - ox) as u32;
                    let sy = (target.y as i64 + y as i64 - oy) as u32;
                    *px = blend_over(*px, *self.pixels.get_pixel(sx, sy));
                }
                surface.write_region(target.x as i64, target.y as i64, &dst);
            }
        }
    }
}

/// Clip region of the active outline, resolved against the canvas.
struct Region {
    clip: ClipRegion,
    bbox: PixelRect,
    coverage: Coverage,
}

/// Runs region operations against one viewport snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    viewport: Viewport,
    paste_offset: Vec2,
}

impl Compositor {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            paste_offset: Vec2::new(PASTE_OFFSET, PASTE_OFFSET),
        }
    }

    pub fn with_paste_offset(mut self, offset: f64) -> Self {
        self.paste_offset = Vec2::new(offset, offset);
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn region(&self, outline: Option<&Outline>, canvas: PixelSize) -> ComposeResult<Region> {
        let outline = outline.ok_or(ComposeError::NoSelection)?;
        let clip = outline.to_clip_region(self.viewport);
        let screen = clip.bounds();
        let min = MIN_REGION_SIZE as f64;
        if screen.width() < min || screen.height() < min {
            return Err(ComposeError::SelectionTooSmall {
                width: screen.width().round() as u32,
                height: screen.height().round() as u32,
            });
        }
        let bbox = outline.pixel_bounds(self.viewport, canvas);
        if bbox.is_empty() {
            return Err(ComposeError::OutsideCanvas);
        }
        if bbox.width < MIN_REGION_SIZE || bbox.height < MIN_REGION_SIZE {
            return Err(ComposeError::SelectionTooSmall {
                width: bbox.width,
                height: bbox.height,
            });
        }
        let coverage = clip.coverage(bbox);
        if coverage.is_empty() {
            return Err(ComposeError::EmptyRegion);
        }
        Ok(Region { clip, bbox, coverage })
    }

    pub(crate) fn patch(&self, kind: PatchKind, pixels: RgbaImage, at: PixelRect, blend: PatchBlend) -> RasterPatch {
        log::info!("{} patch {}x{} at ({}, {})", kind.label(), at.width, at.height, at.x, at.y);
        RasterPatch {
            kind,
            pixels,
            origin: (at.x as i64, at.y as i64),
            scene_origin: self.viewport.pixel_to_scene(at.x as f64, at.y as f64),
            scene_scale: self.viewport.pixel_scale(),
            blend,
        }
    }

    /// Flat-fill the selection interior with `color`.
    pub fn fill(&self, surface: &mut dyn RasterSurface, outline: Option<&Outline>, color: PixelColor) -> ComposeResult<RasterPatch> {
        self.flat(PatchKind::Fill, surface, outline, color)
    }

    /// Paint the selection interior with the background colour. The
    /// selection stays active.
    pub fn delete(&self, surface: &mut dyn RasterSurface, outline: Option<&Outline>, background: PixelColor) -> ComposeResult<RasterPatch> {
        self.flat(PatchKind::Delete, surface, outline, background)
    }

    fn flat(&self, kind: PatchKind, surface: &mut dyn RasterSurface, outline: Option<&Outline>, color: PixelColor) -> ComposeResult<RasterPatch> {
        let (region, mut pixels) = self
            .sample(surface, outline)
            .inspect_err(|e| log::warn!("{} skipped: {}", kind.label(), e))?;
        paint_over(&mut pixels, &region.coverage, color);
        Ok(self.patch(kind, pixels, region.bbox, PatchBlend::Replace))
    }

    /// Stroke the outline with `color`. `width` is in scene units.
    pub fn stroke(
        &self,
        surface: &mut dyn RasterSurface,
        outline: Option<&Outline>,
        color: PixelColor,
        width: f64,
    ) -> ComposeResult<RasterPatch> {
        let canvas = surface.size();
        let region = self
            .region(outline, canvas)
            .inspect_err(|e| log::warn!("Stroke skipped: {}", e))?;
        let width_px = width * self.viewport.scale_x.abs();
        if width_px.is_nan() || width_px <= 0.0 {
            log::warn!("Stroke skipped: width {}", width);
            return Err(ComposeError::EmptyRegion);
        }
        let grow = (width_px / 2.0).ceil() as u32 + 1;
        let area = region.bbox.inflate(grow, canvas);
        let overlay = OverlayHidden::new(surface, true);
        let mut pixels = overlay.surface().read_region(area);
        drop(overlay);
        let coverage = Coverage::stroke(&region.clip.to_path(), width_px, area);
        paint_over(&mut pixels, &coverage, color);
        Ok(self.patch(PatchKind::Stroke, pixels, area, PatchBlend::Replace))
    }

    /// The visible raster under the region's box, read with the overlay
    /// hidden.
    fn sample(&self, surface: &mut dyn RasterSurface, outline: Option<&Outline>) -> ComposeResult<(Region, RgbaImage)> {
        let region = self.region(outline, surface.size())?;
        let overlay = OverlayHidden::new(surface, true);
        let pixels = overlay.surface().read_region(region.bbox);
        Ok((region, pixels))
    }

    /// Pixels strictly inside the clip region; the rest of the box is
    /// transparent.
    fn capture(&self, surface: &mut dyn RasterSurface, outline: Option<&Outline>) -> ComposeResult<(PixelRect, RgbaImage)> {
        let (region, pixels) = self.sample(surface, outline)?;
        Ok((region.bbox, lift(&region.coverage, pixels)))
    }

    /// Copy the selection's pixels into `clipboard`.
    pub fn copy(
        &self,
        surface: &mut dyn RasterSurface,
        outline: Option<&Outline>,
        clipboard: &mut Clipboard,
    ) -> ComposeResult<ClipboardRecord> {
        let (bbox, pixels) = self
            .capture(surface, outline)
            .inspect_err(|e| log::warn!("Copy skipped: {}", e))?;
        let record = ClipboardRecord {
            pixels,
            scene_rect: self.viewport.pixel_rect_to_scene(bbox),
        };
        clipboard.set(record.clone());
        Ok(record)
    }

    /// Cut: copy the selection into `clipboard`, then paint its interior
    /// with `background`. The selection stays active.
    pub fn extract(
        &self,
        surface: &mut dyn RasterSurface,
        outline: Option<&Outline>,
        clipboard: &mut Clipboard,
        background: PixelColor,
    ) -> ComposeResult<RasterPatch> {
        let (region, source) = self
            .sample(surface, outline)
            .inspect_err(|e| log::warn!("Extract skipped: {}", e))?;
        let mut pixels = source.clone();
        clipboard.set(ClipboardRecord {
            pixels: lift(&region.coverage, source),
            scene_rect: self.viewport.pixel_rect_to_scene(region.bbox),
        });
        paint_over(&mut pixels, &region.coverage, background);
        Ok(self.patch(PatchKind::Extract, pixels, region.bbox, PatchBlend::Replace))
    }

    /// Re-insert the clipboard, nudged from where it was copied.
    pub fn paste(&self, clipboard: &Clipboard) -> ComposeResult<RasterPatch> {
        let record = clipboard.get().ok_or_else(|| {
            log::warn!("Paste skipped: clipboard is empty");
            ComposeError::ClipboardEmpty
        })?;
        let scene_origin = record.scene_rect.origin() + self.paste_offset;
        let width = (record.scene_rect.width() * self.viewport.scale_x.abs()).round().max(1.0) as u32;
        let height = (record.scene_rect.height() * self.viewport.scale_y.abs()).round().max(1.0) as u32;
        let pixels = if record.pixels.dimensions() == (width, height) {
            record.pixels.clone()
        } else {
            imageops::resize(&record.pixels, width, height, FilterType::Triangle)
        };
        let origin = self.viewport.scene_to_pixel(scene_origin);
        log::info!("Paste patch {}x{} at {:?}", width, height, origin);
        Ok(RasterPatch {
            kind: PatchKind::Paste,
            pixels,
            origin,
            scene_origin,
            scene_scale: self.viewport.pixel_scale(),
            blend: PatchBlend::SourceOver,
        })
    }

    /// Synthesize the selection interior from its surroundings.
    pub fn content_aware_fill(&self, surface: &mut dyn RasterSurface, outline: Option<&Outline>) -> ComposeResult<RasterPatch> {
        let canvas = surface.size();
        let region = self
            .region(outline, canvas)
            .inspect_err(|e| log::warn!("Content-aware fill skipped: {}", e))?;
        let overlay = OverlayHidden::new(surface, true);
        let context = region.bbox.inflate(content_fill::padding(region.bbox), canvas);
        let source = overlay.surface().read_region(context);
        let pixels = content_fill::synthesize(&source, context, region.bbox, &region.coverage);
        drop(overlay);
        Ok(self.patch(PatchKind::ContentAwareFill, pixels, region.bbox, PatchBlend::Replace))
    }
}

/// Composite `color` over every covered pixel of `pixels`, which spans the
/// coverage area.
fn paint_over(pixels: &mut RgbaImage, coverage: &Coverage, color: PixelColor) {
    for (x, y, px) in pixels.enumerate_pixels_mut() {
        if coverage.local().get_pixel(x, y)[0] != 0 {
            *px = color.composite_over(*px);
        }
    }
}

/// Clear everything outside the coverage.
fn lift(coverage: &Coverage, mut pixels: RgbaImage) -> RgbaImage {
    for (x, y, px) in pixels.enumerate_pixels_mut() {
        if coverage.local().get_pixel(x, y)[0] == 0 {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
    pixels
}
