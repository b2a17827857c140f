//! Selection outlines and the clip regions built from them.

use crate::color::PixelColor;
use crate::rasterize::Coverage;
use crate::viewport::{PixelRect, PixelSize, Viewport};
use kurbo::{Affine, BezPath, Ellipse, PathEl, Point, Rect, Shape, Stroke, Vec2};
use peniko::Color;

/// Tolerance used when a parametric outline is turned into a path.
const PATH_TOLERANCE: f64 = 0.1;

/// Placement of an outline-local path in the scene.
///
/// A point `p` in outline-local space lands at
/// `origin + scale * (p - anchor)` in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// Object position in the scene.
    pub origin: Vec2,
    /// Offset of the path inside its object.
    pub anchor: Vec2,
    /// Object scale.
    pub scale: Vec2,
}

impl Default for LocalFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl LocalFrame {
    pub const fn identity() -> Self {
        Self {
            origin: Vec2::ZERO,
            anchor: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
        }
    }

    pub fn to_scene(&self) -> Affine {
        Affine::translate(self.origin)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.anchor)
    }
}

/// A free-form outline: an outline-local path plus its scene placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutline {
    path: BezPath,
    frame: LocalFrame,
}

impl PathOutline {
    pub fn new(path: BezPath, frame: LocalFrame) -> Self {
        Self { path, frame }
    }

    /// A closed polygon through scene-space `points`. Needs at least three.
    ///
    /// The closing edge is emitted explicitly so the last vertex equals the
    /// first before the close marker.
    pub fn from_polygon(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        if points.len() < 3 {
            return None;
        }
        let mut path = BezPath::new();
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        if rest.last() != Some(first) {
            path.line_to(*first);
        }
        path.close_path();
        Some(Self::new(path, LocalFrame::identity()))
    }

    pub fn local_path(&self) -> &BezPath {
        &self.path
    }

    pub fn frame(&self) -> LocalFrame {
        self.frame
    }

    pub fn scene_path(&self) -> BezPath {
        self.frame.to_scene() * self.path.clone()
    }

    /// Replay the path segment by segment into screen pixels.
    pub fn screen_path(&self, viewport: Viewport) -> BezPath {
        let map = viewport.transform() * self.frame.to_scene();
        let mut out = BezPath::new();
        for el in self.path.elements() {
            out.push(match *el {
                PathEl::MoveTo(p) => PathEl::MoveTo(map * p),
                PathEl::LineTo(p) => PathEl::LineTo(map * p),
                PathEl::QuadTo(p1, p2) => PathEl::QuadTo(map * p1, map * p2),
                PathEl::CurveTo(p1, p2, p3) => PathEl::CurveTo(map * p1, map * p2, map * p3),
                PathEl::ClosePath => PathEl::ClosePath,
            });
        }
        out
    }

    /// Segment end points in scene space, including the closing vertex.
    pub fn vertices(&self) -> Vec<Point> {
        let map = self.frame.to_scene();
        self.path
            .elements()
            .iter()
            .filter_map(|el| el.end_point())
            .map(|p| map * p)
            .collect()
    }

    /// Closed when the path ends with a close marker and its last vertex
    /// coincides with the first.
    pub fn is_closed(&self) -> bool {
        let closes = matches!(self.path.elements().last(), Some(PathEl::ClosePath));
        let ends = self.path.elements().iter().filter_map(|el| el.end_point());
        let first = ends.clone().next();
        let last = ends.last();
        closes && first.is_some() && first == last
    }
}

/// The active selection's geometry in scene space.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Rect(Rect),
    Ellipse(Ellipse),
    Path(PathOutline),
}

impl Outline {
    pub fn scene_bounds(&self) -> Rect {
        match self {
            Outline::Rect(r) => r.abs(),
            Outline::Ellipse(e) => e.bounding_box(),
            Outline::Path(p) => p.scene_path().bounding_box(),
        }
    }

    /// Bounds in sub-pixel screen space.
    pub fn screen_bounds(&self, viewport: Viewport) -> Rect {
        self.to_clip_region(viewport).bounds()
    }

    /// Integer screen-pixel bounds, rounded and clamped to the canvas.
    pub fn pixel_bounds(&self, viewport: Viewport, canvas: PixelSize) -> PixelRect {
        viewport.scene_rect_to_pixel_rect(self.scene_bounds(), canvas)
    }

    /// Screen-space clip region. Rectangles and ellipses stay native.
    pub fn to_clip_region(&self, viewport: Viewport) -> ClipRegion {
        let vt = viewport.transform();
        match self {
            Outline::Rect(r) => ClipRegion::Rect(vt.transform_rect_bbox(r.abs())),
            Outline::Ellipse(e) => ClipRegion::Ellipse(vt * *e),
            Outline::Path(p) => ClipRegion::Path(p.screen_path(viewport)),
        }
    }

    /// Closed scene-space path for this outline.
    pub fn to_scene_path(&self) -> BezPath {
        match self {
            Outline::Rect(r) => r.abs().to_path(PATH_TOLERANCE),
            Outline::Ellipse(e) => e.to_path(PATH_TOLERANCE),
            Outline::Path(p) => p.scene_path(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Outline::Rect(_) | Outline::Ellipse(_) => true,
            Outline::Path(p) => p.is_closed(),
        }
    }
}

/// Screen-space region that restricts where an operation may write.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipRegion {
    Rect(Rect),
    Ellipse(Ellipse),
    Path(BezPath),
}

impl ClipRegion {
    pub fn bounds(&self) -> Rect {
        match self {
            ClipRegion::Rect(r) => *r,
            ClipRegion::Ellipse(e) => e.bounding_box(),
            ClipRegion::Path(p) => p.bounding_box(),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            ClipRegion::Rect(r) => r.to_path(PATH_TOLERANCE),
            ClipRegion::Ellipse(e) => e.to_path(PATH_TOLERANCE),
            ClipRegion::Path(p) => p.clone(),
        }
    }

    /// Pixels of `area` whose centres lie inside the region.
    pub fn coverage(&self, area: PixelRect) -> Coverage {
        Coverage::fill(&self.to_path(), area)
    }
}

/// How the dashed selection overlay is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineStyle {
    pub fill_color: PixelColor,
    pub stroke_color: PixelColor,
    pub stroke: Stroke,
}

impl OutlineStyle {
    /// Style of a committed selection.
    pub fn committed() -> Self {
        Self {
            fill_color: PixelColor::new(0, 120, 212, 26),
            stroke_color: PixelColor::rgb(0, 120, 212),
            stroke: Stroke::new(1.0).with_dashes(0.0, [4.0, 4.0]),
        }
    }

    /// Style of an in-progress gesture.
    pub fn preview() -> Self {
        Self {
            fill_color: PixelColor::TRANSPARENT,
            ..Self::committed()
        }
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Color {
        self.fill_color.into()
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke_paint(&self) -> Color {
        self.stroke_color.into()
    }
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self::committed()
    }
}

/// Outline plus overlay style.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutline {
    pub shape: Outline,
    pub style: OutlineStyle,
}

impl SelectionOutline {
    pub fn new(shape: Outline) -> Self {
        Self {
            shape,
            style: OutlineStyle::committed(),
        }
    }

    pub fn preview(shape: Outline) -> Self {
        Self {
            shape,
            style: OutlineStyle::preview(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> PathOutline {
        PathOutline::from_polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_polygon_needs_three_points() {
        assert!(PathOutline::from_polygon(&[]).is_none());
        assert!(PathOutline::from_polygon(&[Point::ZERO, Point::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_polygon_is_closed() {
        let tri = triangle();
        assert!(tri.is_closed());
        let v = tri.vertices();
        assert_eq!(v.len(), 4);
        assert_eq!(v.first(), v.last());
    }

    #[test]
    fn test_polygon_already_closed_not_doubled() {
        let p = PathOutline::from_polygon(&[
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(p.vertices().len(), 4);
        assert!(p.is_closed());
    }

    #[test]
    fn test_local_frame_mapping() {
        let frame = LocalFrame {
            origin: Vec2::new(100.0, 50.0),
            anchor: Vec2::new(5.0, 5.0),
            scale: Vec2::new(2.0, 3.0),
        };
        let p = frame.to_scene() * Point::new(6.0, 7.0);
        assert!((p.x - 102.0).abs() < 1e-12);
        assert!((p.y - 56.0).abs() < 1e-12);
    }

    #[test]
    fn test_screen_path_applies_frame_and_viewport() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.quad_to((1.0, 0.0), (1.0, 1.0));
        path.curve_to((1.0, 2.0), (0.0, 2.0), (0.0, 1.0));
        path.close_path();
        let frame = LocalFrame {
            origin: Vec2::new(10.0, 10.0),
            anchor: Vec2::ZERO,
            scale: Vec2::new(2.0, 2.0),
        };
        let outline = PathOutline::new(path, frame);
        let vp = Viewport::new(Vec2::new(2.0, 2.0), Vec2::new(5.0, 0.0));
        let screen = outline.screen_path(vp);
        assert_eq!(screen.elements().len(), 4);
        match screen.elements()[1] {
            PathEl::QuadTo(c, e) => {
                // scene (12, 10) -> screen (29, 20)
                assert!((c.x - 29.0).abs() < 1e-12 && (c.y - 20.0).abs() < 1e-12);
                assert!((e.x - 29.0).abs() < 1e-12 && (e.y - 24.0).abs() < 1e-12);
            }
            ref other => panic!("expected quad, got {other:?}"),
        }
    }

    #[test]
    fn test_rect_clip_and_bounds() {
        let outline = Outline::Rect(Rect::new(50.0, 50.0, 10.0, 10.0));
        assert_eq!(outline.scene_bounds(), Rect::new(10.0, 10.0, 50.0, 50.0));
        let vp = Viewport::new(Vec2::new(2.0, 2.0), Vec2::new(1.0, 1.0));
        assert_eq!(outline.screen_bounds(vp), Rect::new(21.0, 21.0, 101.0, 101.0));
        assert!(outline.is_closed());
    }

    #[test]
    fn test_ellipse_clip_is_transformed() {
        let outline = Outline::Ellipse(Ellipse::from_rect(Rect::new(0.0, 0.0, 20.0, 10.0)));
        let vp = Viewport::new(Vec2::new(2.0, 2.0), Vec2::ZERO);
        match outline.to_clip_region(vp) {
            ClipRegion::Ellipse(e) => {
                let b = e.bounding_box();
                assert!((b.x1 - 40.0).abs() < 1e-9 && (b.y1 - 20.0).abs() < 1e-9);
            }
            other => panic!("expected ellipse clip, got {other:?}"),
        }
    }

    #[test]
    fn test_committed_style() {
        let style = OutlineStyle::committed();
        assert_eq!(style.stroke.width, 1.0);
        assert_eq!(style.stroke.dash_pattern.as_slice(), &[4.0, 4.0]);
        assert_eq!(PixelColor::from(style.stroke_paint()), PixelColor::rgb(0, 120, 212));
        assert_eq!(OutlineStyle::preview().fill_color.a, 0);
    }
}
