//! Editor root: owns the selection, clipboard, commit queue and tools.

use crate::clipboard::{Clipboard, ClipboardRecord};
use crate::color::PixelColor;
use crate::commit::{CommitQueue, CommitTicket, Committed};
use crate::compose::{ComposeError, ComposeResult, Compositor, RasterPatch};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::outline::{Outline, SelectionOutline};
use crate::quick_mask::{MaskStroke, PaintState, QuickMask, QuickMaskOutcome};
use crate::raster::RasterSurface;
use crate::retouch::{PaintBucket, RetouchBrush, RetouchStroke};
use crate::selection::{SelectionEvent, SelectionStore};
use crate::tools::{GestureOutcome, SelectionToolManager, ToolContext, ToolKind};
use crate::viewport::{PixelRect, PixelSize, Viewport};
use kurbo::Point;

/// What a pointer event on the editor led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Routed to the selection tools.
    Gesture(GestureOutcome),
    /// A retouch stroke is in progress.
    Stroking,
    /// A patch was computed and queued.
    Queued(CommitTicket),
    /// The operation had nothing to do.
    Skipped(ComposeError),
    /// The active tool does not handle pointer events here.
    Ignored,
}

/// Editing state for one canvas.
///
/// The host owns the raster surface and passes it to each call. The viewport
/// is read at the start of every operation.
#[derive(Debug)]
pub struct Editor {
    pub config: EditorConfig,
    /// Current scene-to-screen transform.
    pub viewport: Viewport,
    pub selection: SelectionStore,
    pub clipboard: Clipboard,
    pub commits: CommitQueue,
    pub document: Document,
    pub tools: SelectionToolManager,
    pub quick_mask: QuickMask,
    active_tool: ToolKind,
    paint: PaintState,
    stroke: Option<RetouchStroke>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with the given configuration.
    pub fn new(config: EditorConfig) -> Self {
        let quick_mask = QuickMask::new()
            .with_threshold(config.quick_mask_threshold)
            .with_contour_rows(config.contour_rows);
        Self {
            tools: SelectionToolManager::new(config.tool_options()),
            paint: PaintState {
                foreground: config.foreground,
                tool: ToolKind::Move,
            },
            config,
            viewport: Viewport::identity(),
            selection: SelectionStore::new(),
            clipboard: Clipboard::new(),
            commits: CommitQueue::new(),
            document: Document::new(),
            quick_mask,
            active_tool: ToolKind::Move,
            stroke: None,
        }
    }

    fn compositor(&self) -> Compositor {
        Compositor::new(self.viewport).with_paste_offset(self.config.paste_offset)
    }

    // --- selection -------------------------------------------------------

    /// Set or replace the active outline.
    pub fn set_outline(&mut self, outline: SelectionOutline) {
        self.selection.set(outline);
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.selection.shape()
    }

    /// Clear the active outline. Returns false if there was none.
    pub fn clear_outline(&mut self) -> bool {
        self.selection.clear()
    }

    /// Drain pending selection notifications.
    pub fn poll_events(&mut self) -> Vec<SelectionEvent> {
        self.selection.poll_events()
    }

    /// Select the whole canvas.
    pub fn select_all(&mut self, canvas: PixelSize) {
        let rect = self.viewport.pixel_rect_to_scene(PixelRect::from_size(canvas));
        self.selection.set_shape(Outline::Rect(rect));
    }

    // --- tools -----------------------------------------------------------

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn paint_state(&self) -> PaintState {
        self.paint
    }

    pub fn set_foreground(&mut self, color: PixelColor) {
        self.paint.foreground = color;
    }

    /// Switch tools. Any gesture or stroke in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.stroke.take().is_some() {
            log::debug!("Tool switch drops the retouch stroke in progress");
        }
        match tool.selection() {
            Some(kind) => self.tools.set_tool(kind),
            None => {
                self.tools.cancel();
            }
        }
        self.active_tool = tool;
        self.paint.tool = tool;
    }

    /// Whether a selection gesture or retouch stroke is in progress.
    pub fn is_busy(&self) -> bool {
        self.tools.is_drawing() || self.stroke.is_some()
    }

    /// Pointer pressed at the scene point `point`.
    ///
    /// Pending commits are flushed first so the new gesture sees every
    /// earlier result.
    pub fn pointer_down(&mut self, point: Point, surface: &mut dyn RasterSurface) -> PointerOutcome {
        if !self.is_busy() {
            self.flush_commits(surface);
        }
        let viewport = self.viewport;
        match self.active_tool {
            ToolKind::Selection(_) => {
                let ctx = ToolContext::new(viewport, &*surface);
                PointerOutcome::Gesture(self.tools.pointer_down(point, ctx, &mut self.selection))
            }
            ToolKind::PaintBucket => {
                let bucket = PaintBucket {
                    tolerance: self.config.wand_tolerance,
                    metric: self.config.color_metric,
                    color: self.paint.foreground,
                };
                let patch = bucket.fill(surface, point, viewport, self.selection.shape());
                self.queue(patch)
            }
            ToolKind::DodgeBurn | ToolKind::BlurBrush => {
                if self.stroke.is_none() {
                    let brush = match self.active_tool {
                        ToolKind::DodgeBurn => RetouchBrush::DodgeBurn(self.config.dodge_burn),
                        _ => RetouchBrush::Blur(self.config.blur),
                    };
                    self.stroke = Some(RetouchStroke::begin(brush, surface, viewport, self.selection.shape(), point));
                }
                PointerOutcome::Stroking
            }
            ToolKind::Move | ToolKind::Brush | ToolKind::Eraser => PointerOutcome::Ignored,
        }
    }

    /// Pointer moved to `point`.
    pub fn pointer_move(&mut self, point: Point, surface: &dyn RasterSurface) -> PointerOutcome {
        if let Some(stroke) = &mut self.stroke {
            stroke.dab(point);
            return PointerOutcome::Stroking;
        }
        match self.active_tool {
            ToolKind::Selection(_) => {
                let ctx = ToolContext::new(self.viewport, surface);
                PointerOutcome::Gesture(self.tools.pointer_move(point, ctx))
            }
            _ => PointerOutcome::Ignored,
        }
    }

    /// Pointer released at `point`.
    pub fn pointer_up(&mut self, point: Point) -> PointerOutcome {
        if let Some(mut stroke) = self.stroke.take() {
            stroke.dab(point);
            return self.queue(stroke.finish());
        }
        match self.active_tool {
            ToolKind::Selection(_) => PointerOutcome::Gesture(self.tools.pointer_up(point, &mut self.selection)),
            _ => PointerOutcome::Ignored,
        }
    }

    /// Explicitly close the open polygon.
    pub fn finish_gesture(&mut self) -> GestureOutcome {
        self.tools.finish(&mut self.selection)
    }

    /// Abandon the gesture or stroke in progress without writing anything.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        if self.stroke.take().is_some() {
            return GestureOutcome::Cancelled;
        }
        self.tools.cancel()
    }

    /// Live outline of the gesture in progress.
    pub fn preview(&self) -> Option<SelectionOutline> {
        self.tools.preview()
    }

    fn queue(&mut self, patch: ComposeResult<RasterPatch>) -> PointerOutcome {
        match patch {
            Ok(patch) => PointerOutcome::Queued(self.commits.submit(patch)),
            Err(e) => PointerOutcome::Skipped(e),
        }
    }

    // --- region operations -----------------------------------------------

    /// Fill the selection with the foreground colour.
    pub fn fill(&mut self, surface: &mut dyn RasterSurface) -> ComposeResult<CommitTicket> {
        self.flush_commits(surface);
        let patch = self.compositor().fill(surface, self.selection.shape(), self.paint.foreground)?;
        Ok(self.commits.submit(patch))
    }

    /// Paint the selection with the background colour.
    pub fn delete(&mut self, surface: &mut dyn RasterSurface) -> ComposeResult<CommitTicket> {
        self.flush_commits(surface);
        let patch = self.compositor().delete(surface, self.selection.shape(), self.config.background)?;
        Ok(self.commits.submit(patch))
    }

    /// Stroke the selection edge with the foreground colour, `width` in scene
    /// units.
    pub fn stroke(&mut self, surface: &mut dyn RasterSurface, width: f64) -> ComposeResult<CommitTicket> {
        self.flush_commits(surface);
        let patch = self
            .compositor()
            .stroke(surface, self.selection.shape(), self.paint.foreground, width)?;
        Ok(self.commits.submit(patch))
    }

    pub fn copy(&mut self, surface: &mut dyn RasterSurface) -> ComposeResult<ClipboardRecord> {
        self.flush_commits(surface);
        let compositor = self.compositor();
        compositor.copy(surface, self.selection.shape(), &mut self.clipboard)
    }

    /// Cut the selection to the clipboard, leaving the background colour.
    pub fn extract(&mut self, surface: &mut dyn RasterSurface) -> ComposeResult<CommitTicket> {
        self.flush_commits(surface);
        let compositor = self.compositor();
        let patch = compositor.extract(surface, self.selection.shape(), &mut self.clipboard, self.config.background)?;
        Ok(self.commits.submit(patch))
    }

    pub fn paste(&mut self) -> ComposeResult<CommitTicket> {
        let patch = self.compositor().paste(&self.clipboard)?;
        Ok(self.commits.submit(patch))
    }

    pub fn content_aware_fill(&mut self, surface: &mut dyn RasterSurface) -> ComposeResult<CommitTicket> {
        self.flush_commits(surface);
        let patch = self.compositor().content_aware_fill(surface, self.selection.shape())?;
        Ok(self.commits.submit(patch))
    }

    /// Write every queued patch to the surface and the document.
    pub fn flush_commits(&mut self, surface: &mut dyn RasterSurface) -> Vec<Committed> {
        if self.commits.is_idle() {
            return Vec::new();
        }
        self.commits.flush(surface, &mut self.document)
    }

    // --- quick mask ------------------------------------------------------

    /// Enter quick-mask mode. The active selection is kept until exit.
    pub fn enter_quick_mask(&mut self) -> PaintState {
        self.cancel_gesture();
        let forced = self.quick_mask.enter(self.paint);
        self.active_tool = forced.tool;
        self.paint = forced;
        forced
    }

    /// Tag a brush stroke as mask paint. False when quick mask is off.
    pub fn record_mask_stroke(&mut self, stroke: MaskStroke) -> bool {
        self.quick_mask.record_stroke(stroke)
    }

    /// Leave quick-mask mode, replacing the selection with the painted mask
    /// and restoring the previous tool and colour.
    pub fn exit_quick_mask(&mut self, canvas: PixelSize) -> Option<QuickMaskOutcome> {
        let exit = self.quick_mask.exit(self.viewport, canvas, &mut self.selection)?;
        self.set_tool(exit.restored.tool);
        self.paint = exit.restored;
        Some(exit.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::PatchKind;
    use crate::outline::{LocalFrame, PathOutline};
    use crate::raster::ImageSurface;
    use crate::selection::SelectionChange;
    use crate::tools::SelectionToolKind;
    use image::Rgba;
    use kurbo::{BezPath, Rect};

    const GREY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn canvas() -> ImageSurface {
        ImageSurface::filled(100, 80, GREY)
    }

    fn with_rect() -> Editor {
        let mut editor = Editor::default();
        editor.set_outline(SelectionOutline::new(Outline::Rect(Rect::new(10.0, 10.0, 50.0, 50.0))));
        editor
    }

    #[test]
    fn test_clear_outline_is_idempotent() {
        let mut editor = with_rect();
        assert!(editor.clear_outline());
        assert!(!editor.clear_outline());
        let events = editor.poll_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, SelectionChange::Cleared);
        assert!(!events[1].has_selection);
    }

    #[test]
    fn test_fill_without_selection_queues_nothing() {
        let mut editor = Editor::default();
        let mut surface = canvas();
        assert_eq!(editor.fill(&mut surface).unwrap_err(), ComposeError::NoSelection);
        assert!(editor.commits.is_idle());
    }

    #[test]
    fn test_fill_commits_and_keeps_selection() {
        let mut editor = with_rect();
        editor.set_foreground(PixelColor::rgb(255, 0, 0));
        let mut surface = canvas();
        editor.fill(&mut surface).unwrap();
        assert_eq!(surface.image().get_pixel(20, 20), &GREY);

        let done = editor.flush_commits(&mut surface);
        assert_eq!(done.len(), 1);
        assert_eq!(surface.image().get_pixel(20, 20), &Rgba([255, 0, 0, 255]));
        assert_eq!(editor.document.objects()[0].kind, PatchKind::Fill);
        assert!(editor.outline().is_some());
    }

    #[test]
    fn test_new_gesture_sees_pending_commits() {
        let mut editor = with_rect();
        editor.set_foreground(PixelColor::rgb(0, 0, 255));
        let mut surface = canvas();
        editor.fill(&mut surface).unwrap();

        editor.set_tool(ToolKind::Selection(SelectionToolKind::MagicWand));
        let outcome = editor.pointer_down(Point::new(20.0, 20.0), &mut surface);
        assert_eq!(outcome, PointerOutcome::Gesture(GestureOutcome::Closed));
        assert_eq!(editor.document.len(), 1);
        let bounds = editor.outline().unwrap().scene_bounds();
        assert_eq!((bounds.x0, bounds.y0, bounds.x1, bounds.y1), (10.0, 10.0, 49.0, 49.0));
    }

    #[test]
    fn test_delete_uses_background() {
        let mut editor = with_rect();
        let mut surface = canvas();
        editor.delete(&mut surface).unwrap();
        editor.flush_commits(&mut surface);
        assert_eq!(surface.image().get_pixel(30, 30), &Rgba([255, 255, 255, 255]));
        assert!(editor.outline().is_some());
    }

    #[test]
    fn test_extract_cuts_with_configured_background() {
        let mut editor = with_rect();
        editor.config.background = PixelColor::rgb(0, 0, 0);
        let mut surface = canvas();
        editor.extract(&mut surface).unwrap();
        assert_eq!(editor.clipboard.get().unwrap().pixels.get_pixel(20, 20), &GREY);
        editor.flush_commits(&mut surface);
        assert_eq!(surface.image().get_pixel(30, 30), &Rgba([0, 0, 0, 255]));
        assert_eq!(surface.image().get_pixel(70, 30), &GREY);
        assert_eq!(editor.document.objects()[0].kind, PatchKind::Extract);
        assert!(editor.outline().is_some());
    }

    #[test]
    fn test_copy_paste_through_editor() {
        let mut editor = with_rect();
        let mut surface = canvas();
        assert_eq!(editor.paste().unwrap_err(), ComposeError::ClipboardEmpty);
        let record = editor.copy(&mut surface).unwrap();
        assert_eq!(record.pixels.dimensions(), (40, 40));
        editor.paste().unwrap();
        let done = editor.flush_commits(&mut surface);
        assert_eq!(done.len(), 1);
        assert_eq!(editor.document.objects()[0].kind, PatchKind::Paste);
    }

    #[test]
    fn test_select_all_under_zoom() {
        let mut editor = Editor::default();
        editor.viewport = Viewport::new(kurbo::Vec2::new(2.0, 2.0), kurbo::Vec2::ZERO);
        editor.select_all(PixelSize::new(100, 80));
        assert_eq!(editor.outline().unwrap().scene_bounds(), Rect::new(0.0, 0.0, 50.0, 40.0));
    }

    #[test]
    fn test_paint_bucket_pointer_queues_patch() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::PaintBucket);
        let mut surface = canvas();
        let outcome = editor.pointer_down(Point::new(5.0, 5.0), &mut surface);
        assert!(matches!(outcome, PointerOutcome::Queued(_)));
        editor.flush_commits(&mut surface);
        assert_eq!(surface.image().get_pixel(99, 79), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_retouch_stroke_queues_on_release() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::DodgeBurn);
        let mut surface = canvas();
        assert_eq!(editor.pointer_down(Point::new(30.0, 30.0), &mut surface), PointerOutcome::Stroking);
        assert_eq!(editor.pointer_move(Point::new(35.0, 30.0), &surface), PointerOutcome::Stroking);
        assert!(matches!(editor.pointer_up(Point::new(40.0, 30.0)), PointerOutcome::Queued(_)));
        assert!(!editor.is_busy());
        editor.flush_commits(&mut surface);
        assert!(surface.image().get_pixel(35, 30)[0] > 128);
        assert_eq!(editor.document.objects()[0].kind, PatchKind::DodgeBurn);
    }

    #[test]
    fn test_cancel_drops_retouch_stroke() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::BlurBrush);
        let mut surface = canvas();
        editor.pointer_down(Point::new(30.0, 30.0), &mut surface);
        assert_eq!(editor.cancel_gesture(), GestureOutcome::Cancelled);
        assert_eq!(editor.pointer_up(Point::new(30.0, 30.0)), PointerOutcome::Ignored);
        assert!(editor.commits.is_idle());
    }

    #[test]
    fn test_quick_mask_round_trip() {
        let mut editor = with_rect();
        editor.set_tool(ToolKind::Eraser);
        editor.set_foreground(PixelColor::rgb(1, 2, 3));
        let forced = editor.enter_quick_mask();
        assert_eq!(editor.active_tool(), ToolKind::Brush);
        assert_eq!(forced.foreground, crate::quick_mask::MASK_MARKER);
        assert!(editor.outline().is_some());

        let mut path = BezPath::new();
        path.move_to((60.0, 20.0));
        path.line_to((90.0, 20.0));
        path.line_to((90.0, 60.0));
        path.line_to((60.0, 60.0));
        path.close_path();
        assert!(editor.record_mask_stroke(MaskStroke {
            outline: PathOutline::new(path, LocalFrame::identity()),
            width: 2.0,
        }));

        let outcome = editor.exit_quick_mask(PixelSize::new(100, 80));
        assert_eq!(outcome, Some(QuickMaskOutcome::Replaced));
        assert_eq!(editor.active_tool(), ToolKind::Eraser);
        assert_eq!(editor.paint_state().foreground, PixelColor::rgb(1, 2, 3));
        let bounds = editor.outline().unwrap().scene_bounds();
        assert!(bounds.x0 >= 58.0 && bounds.x1 <= 91.0);
    }

    #[test]
    fn test_set_tool_cancels_selection_gesture() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Selection(SelectionToolKind::Polygon));
        let mut surface = canvas();
        editor.pointer_down(Point::new(10.0, 10.0), &mut surface);
        assert!(editor.is_busy());
        editor.set_tool(ToolKind::Move);
        assert!(!editor.is_busy());
        assert!(editor.preview().is_none());
    }
}
