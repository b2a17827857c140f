//! Polygonal and magnetic lasso gestures.
//!
//! Both are click-to-add-vertex polygons. The magnetic variant snaps every
//! vertex and the live cursor to the strongest nearby edge, and inserts
//! vertices on its own as the pointer travels.

use crate::edge_map::EdgeMap;
use crate::outline::{LocalFrame, Outline, PathOutline};
use crate::viewport::Viewport;
use kurbo::{BezPath, Point};

/// Distances are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonSettings {
    /// A click closer than this to the first vertex closes the polygon.
    pub close_threshold: f64,
    /// Magnetic only: distance from the last vertex to the snapped cursor
    /// that triggers an automatic vertex.
    pub auto_vertex_distance: f64,
    pub snap_radius: u32,
    pub min_edge_strength: u8,
}

impl Default for PolygonSettings {
    fn default() -> Self {
        Self {
            close_threshold: 10.0,
            auto_vertex_distance: 15.0,
            snap_radius: crate::edge_map::SNAP_RADIUS,
            min_edge_strength: crate::edge_map::MIN_EDGE_STRENGTH,
        }
    }
}

/// Result of a click on an open polygon.
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonClick {
    Added,
    Closed(Outline),
}

#[derive(Debug, Clone)]
pub struct PolygonLasso {
    vertices: Vec<Point>,
    cursor: Option<Point>,
    edges: Option<EdgeMap>,
    settings: PolygonSettings,
}

impl PolygonLasso {
    /// Start a polygonal lasso with its first vertex.
    pub fn polygonal(first: Point, settings: PolygonSettings) -> Self {
        Self {
            vertices: vec![first],
            cursor: None,
            edges: None,
            settings,
        }
    }

    /// Start a magnetic lasso. The first vertex is snapped too.
    pub fn magnetic(first: Point, edges: EdgeMap, viewport: Viewport, settings: PolygonSettings) -> Self {
        let mut lasso = Self {
            vertices: Vec::new(),
            cursor: None,
            edges: Some(edges),
            settings,
        };
        let first = lasso.snap(first, viewport);
        lasso.vertices.push(first);
        lasso
    }

    pub fn is_magnetic(&self) -> bool {
        self.edges.is_some()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    fn snap(&self, point: Point, viewport: Viewport) -> Point {
        match &self.edges {
            Some(edges) => {
                edges
                    .snap_with(point, viewport, self.settings.snap_radius, self.settings.min_edge_strength)
                    .point
            }
            None => point,
        }
    }

    /// Add a vertex, or close when clicking near the first vertex of a
    /// polygon that already has three.
    pub fn click(&mut self, point: Point, viewport: Viewport) -> PolygonClick {
        if self.vertices.len() >= 3
            && let Some(first) = self.vertices.first()
            && viewport.screen_distance(point, *first) < self.settings.close_threshold
        {
            if let Some(outline) = self.finish() {
                return PolygonClick::Closed(outline);
            }
        }
        let vertex = self.snap(point, viewport);
        self.vertices.push(vertex);
        self.cursor = None;
        PolygonClick::Added
    }

    /// Track the pointer for the preview segment.
    pub fn hover(&mut self, point: Point, viewport: Viewport) {
        let snapped = self.snap(point, viewport);
        self.cursor = Some(snapped);
        if !self.is_magnetic() {
            return;
        }
        let Some(last) = self.vertices.last() else {
            return;
        };
        if viewport.screen_distance(snapped, *last) > self.settings.auto_vertex_distance {
            self.vertices.push(snapped);
        }
    }

    /// Close the polygon if it has at least three vertices.
    pub fn finish(&self) -> Option<Outline> {
        PathOutline::from_polygon(&self.vertices).map(Outline::Path)
    }

    /// Open polyline through the vertices and on to the cursor.
    pub fn preview(&self) -> Option<Outline> {
        let (first, rest) = self.vertices.split_first()?;
        let mut path = BezPath::new();
        path.move_to(*first);
        for p in rest.iter().chain(self.cursor.iter()) {
            path.line_to(*p);
        }
        Some(Outline::Path(PathOutline::new(path, LocalFrame::identity())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn square(lasso: &mut PolygonLasso, vp: Viewport) {
        assert_eq!(lasso.click(Point::new(50.0, 0.0), vp), PolygonClick::Added);
        assert_eq!(lasso.click(Point::new(50.0, 50.0), vp), PolygonClick::Added);
        assert_eq!(lasso.click(Point::new(0.0, 50.0), vp), PolygonClick::Added);
    }

    #[test]
    fn test_click_near_first_closes() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::polygonal(Point::new(0.0, 0.0), PolygonSettings::default());
        square(&mut lasso, vp);
        match lasso.click(Point::new(4.0, 3.0), vp) {
            PolygonClick::Closed(outline) => {
                assert!(outline.is_closed());
                let b = outline.scene_bounds();
                assert_eq!((b.x0, b.y0, b.x1, b.y1), (0.0, 0.0, 50.0, 50.0));
            }
            other => panic!("expected close, got {other:?}"),
        }
    }

    #[test]
    fn test_close_threshold_is_in_screen_pixels() {
        // At 4x zoom a 3 scene-unit miss is 12 screen px: too far to close.
        let vp = Viewport::new(kurbo::Vec2::new(4.0, 4.0), kurbo::Vec2::ZERO);
        let mut lasso = PolygonLasso::polygonal(Point::new(0.0, 0.0), PolygonSettings::default());
        square(&mut lasso, vp);
        assert_eq!(lasso.click(Point::new(3.0, 0.0), vp), PolygonClick::Added);
        assert_eq!(lasso.vertices().len(), 5);
    }

    #[test]
    fn test_near_first_with_two_vertices_adds() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::polygonal(Point::new(0.0, 0.0), PolygonSettings::default());
        lasso.click(Point::new(50.0, 0.0), vp);
        assert_eq!(lasso.click(Point::new(1.0, 1.0), vp), PolygonClick::Added);
    }

    #[test]
    fn test_finish_needs_three() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::polygonal(Point::new(0.0, 0.0), PolygonSettings::default());
        lasso.click(Point::new(10.0, 0.0), vp);
        assert!(lasso.finish().is_none());
        lasso.click(Point::new(10.0, 10.0), vp);
        assert!(lasso.finish().unwrap().is_closed());
    }

    #[test]
    fn test_preview_follows_cursor() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::polygonal(Point::new(0.0, 0.0), PolygonSettings::default());
        lasso.hover(Point::new(7.0, 9.0), vp);
        let preview = lasso.preview().unwrap();
        let b = preview.scene_bounds();
        assert_eq!((b.x1, b.y1), (7.0, 9.0));
        assert!(!preview.is_closed());
    }

    fn edge_image() -> EdgeMap {
        EdgeMap::build(&RgbaImage::from_fn(100, 100, |x, _| {
            if x < 40 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        }))
    }

    #[test]
    fn test_magnetic_snaps_vertices() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::magnetic(Point::new(35.0, 20.0), edge_image(), vp, PolygonSettings::default());
        assert!(lasso.is_magnetic());
        assert!((lasso.vertices()[0].x - 39.0).abs() < 1e-12);
        lasso.click(Point::new(44.0, 60.0), vp);
        assert!((lasso.vertices()[1].x - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_magnetic_auto_inserts_vertices() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::magnetic(Point::new(39.0, 10.0), edge_image(), vp, PolygonSettings::default());
        lasso.hover(Point::new(39.0, 20.0), vp);
        assert_eq!(lasso.vertices().len(), 1);
        lasso.hover(Point::new(39.0, 30.0), vp);
        assert_eq!(lasso.vertices().len(), 2);
    }

    #[test]
    fn test_auto_vertex_distance_uses_snapped_cursor() {
        let vp = Viewport::identity();
        // raw travel 14, snapped travel 17
        let mut lasso = PolygonLasso::magnetic(Point::new(22.0, 10.0), edge_image(), vp, PolygonSettings::default());
        assert_eq!(lasso.vertices()[0], Point::new(22.0, 10.0));
        lasso.hover(Point::new(36.0, 10.0), vp);
        assert_eq!(lasso.vertices(), &[Point::new(22.0, 10.0), Point::new(39.0, 10.0)]);

        // raw travel about 16.1, snapped travel about 14.0
        let mut lasso = PolygonLasso::magnetic(Point::new(39.0, 10.0), edge_image(), vp, PolygonSettings::default());
        lasso.hover(Point::new(47.0, 24.0), vp);
        assert_eq!(lasso.vertices().len(), 1);
        assert_eq!(lasso.cursor, Some(Point::new(40.0, 24.0)));
    }

    #[test]
    fn test_click_at_close_threshold_adds_vertex() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::polygonal(Point::new(0.0, 0.0), PolygonSettings::default());
        square(&mut lasso, vp);
        assert_eq!(lasso.click(Point::new(6.0, 8.0), vp), PolygonClick::Added);
        assert_eq!(lasso.vertices().len(), 5);
    }

    #[test]
    fn test_polygonal_never_auto_inserts() {
        let vp = Viewport::identity();
        let mut lasso = PolygonLasso::polygonal(Point::new(0.0, 0.0), PolygonSettings::default());
        lasso.hover(Point::new(90.0, 90.0), vp);
        assert_eq!(lasso.vertices().len(), 1);
    }
}
