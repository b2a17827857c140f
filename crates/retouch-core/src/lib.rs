//! Retouch Core Library
//!
//! Selection construction and clip-and-compose pixel operations for the
//! retouch image editor. The host owns the rendered canvas and exposes it
//! through [`RasterSurface`].

pub mod clipboard;
pub mod color;
pub mod commit;
pub mod compose;
pub mod config;
pub mod content_fill;
pub mod contour;
pub mod document;
pub mod edge_map;
pub mod editor;
pub mod flood_fill;
pub mod mask;
pub mod outline;
pub mod quick_mask;
pub mod raster;
pub mod rasterize;
pub mod retouch;
pub mod selection;
pub mod tools;
pub mod viewport;

pub use clipboard::{Clipboard, ClipboardRecord};
pub use color::{ColorParseError, PixelColor};
pub use commit::{CommitQueue, CommitTicket, Committed};
pub use compose::{ComposeError, ComposeResult, Compositor, PatchBlend, PatchKind, RasterPatch};
pub use config::{ConfigError, EditorConfig};
pub use contour::{trace_outline, trace_outline_with_budget};
pub use document::{Document, ObjectId, RasterObject};
pub use edge_map::{EdgeMap, SnapResult};
pub use editor::{Editor, PointerOutcome};
pub use flood_fill::{ColorMetric, flood_fill};
pub use mask::RegionMask;
pub use outline::{ClipRegion, LocalFrame, Outline, OutlineStyle, PathOutline, SelectionOutline};
pub use quick_mask::{MaskStroke, PaintState, QuickMask, QuickMaskOutcome};
pub use raster::{ImageSurface, OverlayHidden, RasterSurface};
pub use retouch::{BlurBrush, DodgeBurn, DodgeBurnMode, PaintBucket, RetouchBrush, RetouchStroke, ToneRange};
pub use selection::{SelectionChange, SelectionEvent, SelectionStore};
pub use tools::{GestureOutcome, SelectionToolKind, SelectionToolManager, ToolContext, ToolKind};
pub use viewport::{PixelRect, PixelSize, Viewport};
