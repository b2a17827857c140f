//! Row-scan contour tracing: region mask to closed outline.
//!
//! Each sampled row contributes its leftmost and rightmost set pixel. The
//! outline walks the left extremes top to bottom and the right extremes back
//! up. Rows with several disjoint runs collapse to their outer extremes, so
//! holes, concavities across a row and separate blobs on the same row are not
//! represented.

use crate::mask::RegionMask;
use crate::outline::PathOutline;
use crate::viewport::Viewport;
use kurbo::Point;

/// Upper bound on sampled rows, independent of mask height.
pub const MAX_SAMPLE_ROWS: u32 = 300;

/// Trace `mask` with the default row budget.
pub fn trace_outline(mask: &RegionMask, viewport: Viewport) -> Option<PathOutline> {
    trace_outline_with_budget(mask, viewport, MAX_SAMPLE_ROWS)
}

/// Trace `mask` into a scene-space outline sampling at most about
/// `max_rows` rows.
///
/// Returns `None` for an empty mask or when fewer than two rows could be
/// sampled.
pub fn trace_outline_with_budget(mask: &RegionMask, viewport: Viewport, max_rows: u32) -> Option<PathOutline> {
    let bounds = mask.bounds()?;
    let top = bounds.y;
    let bottom = bounds.bottom() - 1;
    let stride = ((bottom - top) / max_rows.max(1)).max(1);

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut sample = |y: u32| {
        if let Some((l, r)) = mask.row_extent(y) {
            left.push(viewport.pixel_to_scene(l as f64, y as f64));
            right.push(viewport.pixel_to_scene(r as f64, y as f64));
        }
    };

    let mut y = top;
    let mut last = None;
    while y <= bottom {
        sample(y);
        last = Some(y);
        y += stride;
    }
    if last != Some(bottom) {
        sample(bottom);
    }

    if left.len() < 2 {
        log::debug!("Contour trace: {} sample rows, no outline", left.len());
        return None;
    }
    log::debug!(
        "Contour trace: {} sample rows at stride {} over {:?}",
        left.len(),
        stride,
        bounds
    );

    let points: Vec<Point> = left.into_iter().chain(right.into_iter().rev()).collect();
    PathOutline::from_polygon(&points)
}
