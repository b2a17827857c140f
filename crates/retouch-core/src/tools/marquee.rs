//! Rectangle and ellipse marquee gestures.

use crate::outline::Outline;
use kurbo::{Ellipse, Point, Rect};

/// Which parametric shape a marquee draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarqueeShape {
    Rect,
    Ellipse,
}

/// A drag from an anchor to the current pointer.
#[derive(Debug, Clone)]
pub struct Marquee {
    shape: MarqueeShape,
    anchor: Point,
    current: Point,
}

impl Marquee {
    /// Start a marquee at `anchor`.
    pub fn begin(shape: MarqueeShape, anchor: Point) -> Self {
        Self {
            shape,
            anchor,
            current: anchor,
        }
    }

    /// Move the free corner.
    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    /// Bounds normalised for drag direction (never negative).
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.anchor, self.current)
    }

    /// Live geometry.
    pub fn outline(&self) -> Outline {
        let rect = self.bounds();
        match self.shape {
            MarqueeShape::Rect => Outline::Rect(rect),
            MarqueeShape::Ellipse => Outline::Ellipse(Ellipse::from_rect(rect)),
        }
    }

    /// Finish at `point`. A zero-area drag produces nothing.
    pub fn finish(mut self, point: Point) -> Option<Outline> {
        self.update(point);
        let rect = self.bounds();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return None;
        }
        Some(self.outline())
    }
}
