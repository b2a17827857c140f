//! Tool system for selection gestures.

pub mod lasso;
pub mod magic_wand;
pub mod marquee;
pub mod polygon;

use crate::edge_map::EdgeMap;
use crate::flood_fill::ColorMetric;
use crate::outline::{Outline, SelectionOutline};
use crate::raster::RasterSurface;
use crate::selection::SelectionStore;
use crate::viewport::Viewport;
use kurbo::Point;
use lasso::FreehandLasso;
use magic_wand::MagicWand;
use marquee::{Marquee, MarqueeShape};
use polygon::{PolygonClick, PolygonLasso, PolygonSettings};
use serde::{Deserialize, Serialize};

/// Available selection tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionToolKind {
    #[default]
    Rectangle,
    Ellipse,
    Lasso,
    Polygon,
    Magnetic,
    MagicWand,
}

/// Every tool the editor can have active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Move,
    Brush,
    Eraser,
    PaintBucket,
    DodgeBurn,
    BlurBrush,
    Selection(SelectionToolKind),
}

impl ToolKind {
    pub fn selection(&self) -> Option<SelectionToolKind> {
        match self {
            ToolKind::Selection(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// What a pointer or key event did to the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Event had no effect (no gesture, or not meaningful for this tool).
    Ignored,
    /// A gesture is in progress.
    Drawing,
    /// An outline was committed to the store.
    Closed,
    /// The gesture ended without committing anything.
    Cancelled,
    /// A one-shot tool ran but produced no region.
    NoSelection,
}

/// Snapshot handed to every pointer event.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub viewport: Viewport,
    pub surface: &'a dyn RasterSurface,
}

impl<'a> ToolContext<'a> {
    pub fn new(viewport: Viewport, surface: &'a dyn RasterSurface) -> Self {
        Self { viewport, surface }
    }
}

/// Tunables shared by the selection tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionToolOptions {
    pub tolerance: u8,
    pub metric: ColorMetric,
    pub polygon: PolygonSettings,
    pub contour_rows: u32,
}

impl Default for SelectionToolOptions {
    fn default() -> Self {
        let wand = MagicWand::default();
        Self {
            tolerance: wand.tolerance,
            metric: wand.metric,
            polygon: PolygonSettings::default(),
            contour_rows: wand.contour_rows,
        }
    }
}

/// In-progress gesture state.
#[derive(Debug, Clone)]
enum Gesture {
    Marquee(Marquee),
    Lasso(FreehandLasso),
    Polygon(PolygonLasso),
}

/// Routes pointer events to the current selection tool.
///
/// At most one gesture exists at a time; switching tools cancels it.
#[derive(Debug, Clone, Default)]
pub struct SelectionToolManager {
    /// Currently selected tool.
    current_tool: SelectionToolKind,
    /// Tool settings.
    pub options: SelectionToolOptions,
    gesture: Option<Gesture>,
}

impl SelectionToolManager {
    /// Create a new tool manager.
    pub fn new(options: SelectionToolOptions) -> Self {
        Self {
            current_tool: SelectionToolKind::default(),
            options,
            gesture: None,
        }
    }

    pub fn current_tool(&self) -> SelectionToolKind {
        self.current_tool
    }

    /// Set the current tool, cancelling any gesture in progress.
    pub fn set_tool(&mut self, tool: SelectionToolKind) {
        if self.gesture.is_some() {
            log::debug!("Tool switch to {:?} cancels the active gesture", tool);
        }
        self.gesture = None;
        self.current_tool = tool;
    }

    /// Check if a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.gesture.is_some()
    }

    /// Pointer pressed at the scene point `point`.
    ///
    /// While idle this starts a gesture (clearing the committed selection
    /// first). While a polygon is open it adds or closes a vertex.
    pub fn pointer_down(&mut self, point: Point, ctx: ToolContext<'_>, store: &mut SelectionStore) -> GestureOutcome {
        if let Some(gesture) = &mut self.gesture {
            return match gesture {
                Gesture::Polygon(lasso) => match lasso.click(point, ctx.viewport) {
                    PolygonClick::Added => GestureOutcome::Drawing,
                    PolygonClick::Closed(outline) => {
                        self.gesture = None;
                        commit(store, outline)
                    }
                },
                // no second gesture while one is drawing
                Gesture::Marquee(_) | Gesture::Lasso(_) => GestureOutcome::Ignored,
            };
        }

        store.clear();
        let settings = self.options.polygon;
        self.gesture = match self.current_tool {
            SelectionToolKind::Rectangle => Some(Gesture::Marquee(Marquee::begin(MarqueeShape::Rect, point))),
            SelectionToolKind::Ellipse => Some(Gesture::Marquee(Marquee::begin(MarqueeShape::Ellipse, point))),
            SelectionToolKind::Lasso => Some(Gesture::Lasso(FreehandLasso::begin(point))),
            SelectionToolKind::Polygon => Some(Gesture::Polygon(PolygonLasso::polygonal(point, settings))),
            SelectionToolKind::Magnetic => {
                let edges = EdgeMap::build(&ctx.surface.read_all());
                Some(Gesture::Polygon(PolygonLasso::magnetic(point, edges, ctx.viewport, settings)))
            }
            SelectionToolKind::MagicWand => {
                let wand = MagicWand {
                    tolerance: self.options.tolerance,
                    metric: self.options.metric,
                    contour_rows: self.options.contour_rows,
                };
                return match wand.select(point, ctx.viewport, ctx.surface) {
                    Some(outline) => commit(store, outline),
                    None => GestureOutcome::NoSelection,
                };
            }
        };
        GestureOutcome::Drawing
    }

    /// Pointer moved to `point`.
    pub fn pointer_move(&mut self, point: Point, ctx: ToolContext<'_>) -> GestureOutcome {
        match &mut self.gesture {
            Some(Gesture::Marquee(m)) => m.update(point),
            Some(Gesture::Lasso(l)) => l.add_point(point),
            Some(Gesture::Polygon(p)) => p.hover(point, ctx.viewport),
            None => return GestureOutcome::Ignored,
        }
        GestureOutcome::Drawing
    }

    /// Pointer released at `point`. Polygons stay open until closed by a
    /// click near the first vertex or by [`finish`](Self::finish).
    pub fn pointer_up(&mut self, point: Point, store: &mut SelectionStore) -> GestureOutcome {
        let result = match self.gesture.take() {
            Some(Gesture::Marquee(m)) => m.finish(point),
            Some(Gesture::Lasso(l)) => l.finish(point),
            Some(polygon @ Gesture::Polygon(_)) => {
                self.gesture = Some(polygon);
                return GestureOutcome::Drawing;
            }
            None => return GestureOutcome::Ignored,
        };
        match result {
            Some(outline) => commit(store, outline),
            None => {
                log::debug!("Gesture discarded: degenerate geometry");
                GestureOutcome::Cancelled
            }
        }
    }

    /// Explicit close (double-click or Enter). Polygons with fewer than three
    /// vertices are cancelled.
    pub fn finish(&mut self, store: &mut SelectionStore) -> GestureOutcome {
        match self.gesture.take() {
            Some(Gesture::Polygon(p)) => match p.finish() {
                Some(outline) => commit(store, outline),
                None => GestureOutcome::Cancelled,
            },
            Some(other) => {
                self.gesture = Some(other);
                GestureOutcome::Ignored
            }
            None => GestureOutcome::Ignored,
        }
    }

    /// Cancel the current gesture (Escape). Nothing is committed.
    pub fn cancel(&mut self) -> GestureOutcome {
        match self.gesture.take() {
            Some(_) => GestureOutcome::Cancelled,
            None => GestureOutcome::Ignored,
        }
    }

    /// Live preview of the gesture in progress.
    pub fn preview(&self) -> Option<SelectionOutline> {
        let shape = match self.gesture.as_ref()? {
            Gesture::Marquee(m) => m.outline(),
            Gesture::Lasso(l) => l.preview()?,
            Gesture::Polygon(p) => p.preview()?,
        };
        Some(SelectionOutline::preview(shape))
    }
}

fn commit(store: &mut SelectionStore, outline: Outline) -> GestureOutcome {
    store.set_shape(outline);
    GestureOutcome::Closed
}
