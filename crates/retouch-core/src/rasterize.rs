//! Scanline coverage of flattened paths.
//!
//! This is the rasterizer behind clip regions and quick-mask strokes. Paths are
//! in screen-pixel space; a pixel is covered when its centre is inside.

use crate::viewport::PixelRect;
use image::{GrayImage, Luma};
use kurbo::{BezPath, PathEl, Point};

/// Flattening tolerance in pixels.
const FLATTEN_TOLERANCE: f64 = 0.1;

const SET: Luma<u8> = Luma([255]);

/// Binary coverage over a pixel area, stored area-local.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    area: PixelRect,
    mask: GrayImage,
}

impl Coverage {
    pub fn empty(area: PixelRect) -> Self {
        Self {
            area,
            mask: GrayImage::new(area.width, area.height),
        }
    }

    /// Nonzero-winding fill of `path` (subpaths implicitly closed).
    pub fn fill(path: &BezPath, area: PixelRect) -> Self {
        let mut coverage = Self::empty(area);
        let edges = polylines(path)
            .into_iter()
            .flat_map(|line| closed_edges(&line.points))
            .collect::<Vec<_>>();
        coverage.fill_edges(&edges);
        coverage
    }

    /// Pixels within `width / 2` of any segment of `path`.
    pub fn stroke(path: &BezPath, width: f64, area: PixelRect) -> Self {
        let mut coverage = Self::empty(area);
        let half = (width / 2.0).max(0.5);
        for line in polylines(path) {
            let mut points = line.points.clone();
            if line.closed && points.len() > 1 {
                points.push(points[0]);
            }
            if points.len() == 1 {
                coverage.stroke_segment(points[0], points[0], half);
            }
            for pair in points.windows(2) {
                coverage.stroke_segment(pair[0], pair[1], half);
            }
        }
        coverage
    }

    pub fn area(&self) -> PixelRect {
        self.area
    }

    /// Area-local coverage buffer (255 = covered).
    pub fn local(&self) -> &GrayImage {
        &self.mask
    }

    /// Whether the screen pixel `(x, y)` is covered.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.area.contains(x, y) && self.mask.get_pixel(x - self.area.x, y - self.area.y)[0] != 0
    }

    pub fn count(&self) -> usize {
        self.mask.pixels().filter(|p| p[0] != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.pixels().all(|p| p[0] == 0)
    }

    /// Add every covered pixel of `other` that lies inside this area.
    pub fn union_with(&mut self, other: &Coverage) {
        for (lx, ly, px) in other.mask.enumerate_pixels() {
            if px[0] == 0 {
                continue;
            }
            let (x, y) = (lx + other.area.x, ly + other.area.y);
            if self.area.contains(x, y) {
                self.mask.put_pixel(x - self.area.x, y - self.area.y, SET);
            }
        }
    }

    fn fill_edges(&mut self, edges: &[(Point, Point)]) {
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for ly in 0..self.area.height {
            let yc = (self.area.y + ly) as f64 + 0.5;
            crossings.clear();
            for &(a, b) in edges {
                if a.y == b.y {
                    continue;
                }
                let (top, bottom, dir) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
                if yc < top.y || yc >= bottom.y {
                    continue;
                }
                let t = (yc - top.y) / (bottom.y - top.y);
                crossings.push((top.x + t * (bottom.x - top.x), dir));
            }
            if crossings.is_empty() {
                continue;
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for i in 0..crossings.len() - 1 {
                winding += crossings[i].1;
                if winding == 0 {
                    continue;
                }
                self.fill_span(ly, crossings[i].0, crossings[i + 1].0);
            }
        }
    }

    /// Cover pixels on local row `ly` whose centres fall in `[x0, x1)`.
    fn fill_span(&mut self, ly: u32, x0: f64, x1: f64) {
        let origin = self.area.x as f64;
        let start = (x0 - origin - 0.5).ceil().max(0.0);
        let end = (x1 - origin - 0.5).ceil().min(self.area.width as f64);
        if start >= end {
            return;
        }
        for lx in start as u32..end as u32 {
            self.mask.put_pixel(lx, ly, SET);
        }
    }

    fn stroke_segment(&mut self, a: Point, b: Point, half: f64) {
        let area = self.area;
        let left = (a.x.min(b.x) - half).floor() as i64;
        let top = (a.y.min(b.y) - half).floor() as i64;
        let right = (a.x.max(b.x) + half).ceil() as i64 + 1;
        let bottom = (a.y.max(b.y) + half).ceil() as i64 + 1;
        let x0 = left.max(area.x as i64);
        let y0 = top.max(area.y as i64);
        let x1 = right.min(area.right() as i64);
        let y1 = bottom.min(area.bottom() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                let c = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if distance_to_segment(c, a, b) <= half {
                    self.mask
                        .put_pixel(x as u32 - area.x, y as u32 - area.y, SET);
                }
            }
        }
    }
}

struct Polyline {
    points: Vec<Point>,
    closed: bool,
}

/// Flatten `path` into one polyline per subpath.
fn polylines(path: &BezPath) -> Vec<Polyline> {
    let mut lines: Vec<Polyline> = Vec::new();
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => lines.push(Polyline {
            points: vec![p],
            closed: false,
        }),
        PathEl::LineTo(p) => match lines.last_mut() {
            Some(line) if !line.closed => line.points.push(p),
            _ => lines.push(Polyline {
                points: vec![p],
                closed: false,
            }),
        },
        PathEl::ClosePath => {
            if let Some(line) = lines.last_mut() {
                line.closed = true;
            }
        }
        // flatten only emits move/line/close
        PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
    });
    lines
}

fn closed_edges(points: &[Point]) -> Vec<(Point, Point)> {
    if points.len() < 2 {
        return Vec::new();
    }
    let mut edges: Vec<_> = points.windows(2).map(|w| (w[0], w[1])).collect();
    edges.push((points[points.len() - 1], points[0]));
    edges
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}
