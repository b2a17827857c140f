//! Quick mask: paint a selection with the brush.
//!
//! While active, brush strokes are collected as mask strokes instead of
//! artwork. Leaving the mode rasterizes them offscreen and traces the result
//! into the new selection outline.

use crate::color::PixelColor;
use crate::contour::{MAX_SAMPLE_ROWS, trace_outline_with_budget};
use crate::mask::RegionMask;
use crate::outline::{Outline, PathOutline};
use crate::rasterize::Coverage;
use crate::selection::SelectionStore;
use crate::tools::ToolKind;
use crate::viewport::{PixelRect, PixelSize, Viewport};
use image::RgbaImage;

/// Paint colour forced while the mode is active: translucent red.
pub const MASK_MARKER: PixelColor = PixelColor::new(255, 0, 0, 128);

/// Offscreen pixels with alpha strictly above this become selected.
pub const MASK_ALPHA_THRESHOLD: u8 = 128;

/// Narrowest stroke rasterized, in screen pixels.
pub const MIN_MASK_STROKE_WIDTH: f64 = 2.0;

/// Foreground colour and tool, saved on entry and restored on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintState {
    pub foreground: PixelColor,
    pub tool: ToolKind,
}

/// A brush stroke painted while the mode was active.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskStroke {
    /// Stroke geometry in its own local frame.
    pub outline: PathOutline,
    /// Stroke width in local units.
    pub width: f64,
}

/// What leaving the mode did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickMaskOutcome {
    /// No strokes were painted; the selection was left alone.
    Unchanged,
    /// The traced mask replaced the selection.
    Replaced,
    /// The strokes covered nothing traceable; the selection was cleared.
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickMaskExit {
    pub restored: PaintState,
    pub outcome: QuickMaskOutcome,
}

#[derive(Debug, Clone)]
pub struct QuickMask {
    saved: Option<PaintState>,
    strokes: Vec<MaskStroke>,
    threshold: u8,
    contour_rows: u32,
}

impl Default for QuickMask {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickMask {
    pub fn new() -> Self {
        Self {
            saved: None,
            strokes: Vec::new(),
            threshold: MASK_ALPHA_THRESHOLD,
            contour_rows: MAX_SAMPLE_ROWS,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_contour_rows(mut self, rows: u32) -> Self {
        self.contour_rows = rows;
        self
    }

    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Enter the mode and return the paint state the host must switch to.
    ///
    /// Entering again while active keeps the state saved the first time.
    pub fn enter(&mut self, current: PaintState) -> PaintState {
        if self.saved.is_none() {
            log::info!("Quick mask on");
            self.saved = Some(current);
        }
        PaintState {
            foreground: MASK_MARKER,
            tool: ToolKind::Brush,
        }
    }

    /// Tag a stroke as a mask stroke. Returns false when the mode is off and
    /// the stroke is ordinary artwork.
    pub fn record_stroke(&mut self, stroke: MaskStroke) -> bool {
        if !self.is_active() {
            return false;
        }
        self.strokes.push(stroke);
        true
    }

    pub fn strokes(&self) -> &[MaskStroke] {
        &self.strokes
    }

    /// Paint every mask stroke, stroked and then filled, onto a transparent
    /// canvas-sized buffer.
    pub fn rasterize(&self, viewport: Viewport, canvas: PixelSize) -> RgbaImage {
        let area = PixelRect::from_size(canvas);
        let mut coverage = Coverage::empty(area);
        for stroke in &self.strokes {
            let path = stroke.outline.screen_path(viewport);
            let scale = (stroke.outline.frame().scale.x * viewport.scale_x).abs();
            let width = (stroke.width * scale).max(MIN_MASK_STROKE_WIDTH);
            coverage.union_with(&Coverage::stroke(&path, width, area));
            coverage.union_with(&Coverage::fill(&path, area));
        }
        let ink = MASK_MARKER.with_alpha(255).to_rgba();
        let mut buffer = RgbaImage::new(canvas.width, canvas.height);
        for (x, y, px) in coverage.local().enumerate_pixels() {
            if px[0] != 0 {
                buffer.put_pixel(x, y, ink);
            }
        }
        buffer
    }

    /// Leave the mode. Returns `None` when it was not active.
    pub fn exit(&mut self, viewport: Viewport, canvas: PixelSize, store: &mut SelectionStore) -> Option<QuickMaskExit> {
        let restored = self.saved?;
        let outcome = if self.strokes.is_empty() {
            QuickMaskOutcome::Unchanged
        } else {
            let buffer = self.rasterize(viewport, canvas);
            let mask = RegionMask::from_alpha(&buffer, self.threshold);
            log::debug!("Quick mask: {} strokes, {} px", self.strokes.len(), mask.count());
            match trace_outline_with_budget(&mask, viewport, self.contour_rows) {
                Some(path) => {
                    store.set_shape(Outline::Path(path));
                    QuickMaskOutcome::Replaced
                }
                None => {
                    store.clear();
                    QuickMaskOutcome::Cleared
                }
            }
        };
        self.saved = None;
        self.strokes.clear();
        log::info!("Quick mask off: {:?}", outcome);
        Some(QuickMaskExit { restored, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::LocalFrame;
    use crate::selection::SelectionChange;
    use kurbo::{BezPath, Point, Rect, Vec2};

    fn painting() -> PaintState {
        PaintState {
            foreground: PixelColor::rgb(0, 0, 255),
            tool: ToolKind::Eraser,
        }
    }

    fn square_stroke() -> MaskStroke {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((20.0, 0.0));
        path.line_to((20.0, 20.0));
        path.line_to((0.0, 20.0));
        path.close_path();
        let frame = LocalFrame {
            origin: Vec2::new(10.0, 10.0),
            ..LocalFrame::identity()
        };
        MaskStroke {
            outline: PathOutline::new(path, frame),
            width: 4.0,
        }
    }

    #[test]
    fn test_enter_forces_brush_and_marker() {
        let mut qm = QuickMask::new();
        let forced = qm.enter(painting());
        assert!(qm.is_active());
        assert_eq!(forced.tool, ToolKind::Brush);
        assert_eq!(forced.foreground, MASK_MARKER);
        // a second enter must not overwrite the saved state
        qm.enter(forced);
        let mut store = SelectionStore::new();
        let exit = qm.exit(Viewport::identity(), PixelSize::new(10, 10), &mut store).unwrap();
        assert_eq!(exit.restored, painting());
        assert!(!qm.is_active());
    }

    #[test]
    fn test_strokes_only_recorded_while_active() {
        let mut qm = QuickMask::new();
        assert!(!qm.record_stroke(square_stroke()));
        qm.enter(painting());
        assert!(qm.record_stroke(square_stroke()));
        assert_eq!(qm.strokes().len(), 1);
    }

    #[test]
    fn test_exit_when_inactive() {
        let mut store = SelectionStore::new();
        assert!(QuickMask::new().exit(Viewport::identity(), PixelSize::new(4, 4), &mut store).is_none());
    }

    #[test]
    fn test_exit_replaces_selection_only_then() {
        let mut store = SelectionStore::new();
        store.set_shape(Outline::Rect(Rect::new(60.0, 60.0, 70.0, 70.0)));
        store.poll_events();

        let mut qm = QuickMask::new();
        qm.enter(painting());
        qm.record_stroke(square_stroke());
        // entering kept the prior selection
        assert_eq!(store.shape(), Some(&Outline::Rect(Rect::new(60.0, 60.0, 70.0, 70.0))));

        let exit = qm.exit(Viewport::identity(), PixelSize::new(80, 80), &mut store).unwrap();
        assert_eq!(exit.outcome, QuickMaskOutcome::Replaced);
        let bounds = store.shape().unwrap().scene_bounds();
        // square 10..30 grown by half the stroke width
        assert_eq!(bounds.x0, 8.0);
        assert_eq!(bounds.x1, 31.0);
        assert_eq!(store.poll_events()[0].kind, SelectionChange::Replaced);
        assert!(qm.strokes().is_empty());
    }

    #[test]
    fn test_exit_without_strokes_keeps_selection() {
        let mut store = SelectionStore::new();
        store.set_shape(Outline::Rect(Rect::new(0.0, 0.0, 5.0, 5.0)));
        let mut qm = QuickMask::new();
        qm.enter(painting());
        let exit = qm.exit(Viewport::identity(), PixelSize::new(10, 10), &mut store).unwrap();
        assert_eq!(exit.outcome, QuickMaskOutcome::Unchanged);
        assert!(store.has_selection());
    }

    #[test]
    fn test_thin_strokes_get_minimum_width() {
        let mut path = BezPath::new();
        path.move_to(Point::new(0.0, 10.0));
        path.line_to(Point::new(30.0, 10.0));
        let mut qm = QuickMask::new();
        qm.enter(painting());
        qm.record_stroke(MaskStroke {
            outline: PathOutline::new(path, LocalFrame::identity()),
            width: 0.1,
        });
        let buffer = qm.rasterize(Viewport::identity(), PixelSize::new(40, 20));
        assert_eq!(buffer.get_pixel(15, 9)[3], 255);
        assert_eq!(buffer.get_pixel(15, 10)[3], 255);
        assert_eq!(buffer.get_pixel(15, 12)[3], 0);
    }

    #[test]
    fn test_strokes_follow_zoom() {
        let mut qm = QuickMask::new();
        qm.enter(painting());
        qm.record_stroke(square_stroke());
        let vp = Viewport::new(Vec2::new(2.0, 2.0), Vec2::ZERO);
        let buffer = qm.rasterize(vp, PixelSize::new(80, 80));
        assert_eq!(buffer.get_pixel(40, 40)[3], 255);
        assert_eq!(buffer.get_pixel(70, 70)[3], 0);
    }
}
