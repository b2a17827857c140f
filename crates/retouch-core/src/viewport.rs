//! Viewport transform between scene space and screen pixels.
//!
//! A [`Viewport`] is a snapshot of the host's pan/zoom state. Operations take
//! one by value when they start and never re-read it, so a pan in the middle
//! of a multi-step operation cannot tear its coordinate math.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Size of a raster surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }
}

/// Integer rectangle in screen-pixel (or mask-local) space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The rectangle covering a whole surface.
    pub const fn from_size(size: PixelSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Build from signed edges, clamping to `canvas`.
    pub fn from_edges_clamped(left: i64, top: i64, right: i64, bottom: i64, canvas: PixelSize) -> Self {
        let cw = canvas.width as i64;
        let ch = canvas.height as i64;
        let l = left.clamp(0, cw);
        let t = top.clamp(0, ch);
        let r = right.clamp(0, cw).max(l);
        let b = bottom.clamp(0, ch).max(t);
        Self::new(l as u32, t as u32, (r - l) as u32, (b - t) as u32)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Grow by `amount` pixels on every side, clamped to `canvas`.
    pub fn inflate(&self, amount: u32, canvas: PixelSize) -> Self {
        let a = amount as i64;
        Self::from_edges_clamped(
            self.x as i64 - a,
            self.y as i64 - a,
            self.right() as i64 + a,
            self.bottom() as i64 + a,
            canvas,
        )
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Self::new(x, y, r - x, b - y)
    }
}

/// Affine viewport transform restricted to scale and translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

impl Viewport {
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    pub fn new(scale: Vec2, translation: Vec2) -> Self {
        Self {
            scale_x: scale.x,
            scale_y: scale.y,
            translate_x: translation.x,
            translate_y: translation.y,
        }
    }

    /// Read the scale/translate components of a 6-element `[a b c d e f]` matrix.
    /// Skew components are ignored.
    pub fn from_affine_coeffs(coeffs: [f64; 6]) -> Self {
        Self {
            scale_x: coeffs[0],
            scale_y: coeffs[3],
            translate_x: coeffs[4],
            translate_y: coeffs[5],
        }
    }

    /// Scene-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::new([
            self.scale_x,
            0.0,
            0.0,
            self.scale_y,
            self.translate_x,
            self.translate_y,
        ])
    }

    /// Screen-to-scene transform.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point::new(
            scene.x * self.scale_x + self.translate_x,
            scene.y * self.scale_y + self.translate_y,
        )
    }

    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale_x,
            (screen.y - self.translate_y) / self.scale_y,
        )
    }

    /// Nearest raster pixel for a scene point.
    pub fn scene_to_pixel(&self, scene: Point) -> (i64, i64) {
        let s = self.scene_to_screen(scene);
        (s.x.round() as i64, s.y.round() as i64)
    }

    /// Scene position of a pixel address (no rounding).
    pub fn pixel_to_scene(&self, x: f64, y: f64) -> Point {
        self.screen_to_scene(Point::new(x, y))
    }

    /// Distance between two scene points measured in screen pixels.
    pub fn screen_distance(&self, a: Point, b: Point) -> f64 {
        let dx = (a.x - b.x) * self.scale_x;
        let dy = (a.y - b.y) * self.scale_y;
        dx.hypot(dy)
    }

    /// Scene units covered by one screen pixel on each axis.
    pub fn pixel_scale(&self) -> Vec2 {
        Vec2::new(1.0 / self.scale_x, 1.0 / self.scale_y)
    }

    /// Map a scene rectangle to integer pixels, rounded and clamped to `canvas`.
    pub fn scene_rect_to_pixel_rect(&self, rect: Rect, canvas: PixelSize) -> PixelRect {
        let a = self.scene_to_screen(Point::new(rect.x0, rect.y0));
        let b = self.scene_to_screen(Point::new(rect.x1, rect.y1));
        PixelRect::from_edges_clamped(
            a.x.min(b.x).round() as i64,
            a.y.min(b.y).round() as i64,
            a.x.max(b.x).round() as i64,
            a.y.max(b.y).round() as i64,
            canvas,
        )
    }

    /// Scene rectangle covered by a pixel rectangle.
    pub fn pixel_rect_to_scene(&self, rect: PixelRect) -> Rect {
        let a = self.pixel_to_scene(rect.x as f64, rect.y as f64);
        let b = self.pixel_to_scene(rect.right() as f64, rect.bottom() as f64);
        Rect::from_points(a, b)
    }
}
