//! Freehand lasso gesture.

use crate::outline::{LocalFrame, Outline, PathOutline};
use kurbo::{BezPath, Point};

/// A freehand point list captured while the pointer is down.
#[derive(Debug, Clone, Default)]
pub struct FreehandLasso {
    points: Vec<Point>,
}

impl FreehandLasso {
    /// Start a new lasso at `point`.
    pub fn begin(point: Point) -> Self {
        Self { points: vec![point] }
    }

    /// Append a point. Repeats of the last point are dropped.
    pub fn add_point(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Open polyline through the captured points.
    pub fn preview(&self) -> Option<Outline> {
        let (first, rest) = self.points.split_first()?;
        let mut path = BezPath::new();
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        Some(Outline::Path(PathOutline::new(path, LocalFrame::identity())))
    }

    /// Close back to the first point. Fewer than three points is discarded.
    pub fn finish(mut self, point: Point) -> Option<Outline> {
        self.add_point(point);
        PathOutline::from_polygon(&self.points).map(Outline::Path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closes_with_three_points() {
        let mut lasso = FreehandLasso::begin(Point::new(0.0, 0.0));
        lasso.add_point(Point::new(10.0, 0.0));
        let outline = lasso.finish(Point::new(5.0, 8.0)).unwrap();
        assert!(outline.is_closed());
    }

    #[test]
    fn test_two_points_discarded() {
        let mut lasso = FreehandLasso::begin(Point::new(0.0, 0.0));
        lasso.add_point(Point::new(0.0, 0.0));
        assert_eq!(lasso.len(), 1);
        assert!(lasso.finish(Point::new(4.0, 4.0)).is_none());
    }

    #[test]
    fn test_preview_is_open() {
        let mut lasso = FreehandLasso::begin(Point::new(0.0, 0.0));
        lasso.add_point(Point::new(3.0, 0.0));
        lasso.add_point(Point::new(3.0, 3.0));
        let preview = lasso.preview().unwrap();
        assert!(!preview.is_closed());
    }
}
