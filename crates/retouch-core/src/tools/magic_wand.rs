//! Magic wand: flood fill from a click, traced into an outline.

use crate::contour::{MAX_SAMPLE_ROWS, trace_outline_with_budget};
use crate::flood_fill::{ColorMetric, flood_fill};
use crate::outline::Outline;
use crate::raster::RasterSurface;
use crate::viewport::Viewport;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagicWand {
    pub tolerance: u8,
    pub metric: ColorMetric,
    pub contour_rows: u32,
}

impl Default for MagicWand {
    fn default() -> Self {
        Self {
            tolerance: 30,
            metric: ColorMetric::Rgb,
            contour_rows: MAX_SAMPLE_ROWS,
        }
    }
}

impl MagicWand {
    /// Select the region connected to the scene point `point`.
    ///
    /// Returns `None` when the click is off-canvas or the region is too thin
    /// to trace.
    pub fn select(&self, point: Point, viewport: Viewport, surface: &dyn RasterSurface) -> Option<Outline> {
        let pixels = surface.read_all();
        let seed = viewport.scene_to_pixel(point);
        let mask = flood_fill(&pixels, seed, self.tolerance, self.metric);
        if mask.is_empty() {
            log::info!("Magic wand at {:?}: nothing selected", seed);
            return None;
        }
        trace_outline_with_budget(&mask, viewport, self.contour_rows).map(Outline::Path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ImageSurface;
    use image::{Rgba, RgbaImage};

    fn two_color() -> ImageSurface {
        ImageSurface::new(RgbaImage::from_fn(100, 60, |x, _| {
            if x < 50 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
        }))
    }

    #[test]
    fn test_selects_left_half() {
        let wand = MagicWand {
            tolerance: 10,
            ..MagicWand::default()
        };
        let outline = wand.select(Point::new(10.0, 10.0), Viewport::identity(), &two_color()).unwrap();
        assert!(outline.is_closed());
        let b = outline.scene_bounds();
        assert!(b.x0.abs() <= 1.0 && (b.x1 - 50.0).abs() <= 1.0);
        assert!(b.y0.abs() <= 1.0 && (b.y1 - 60.0).abs() <= 1.0);
    }

    #[test]
    fn test_off_canvas_click() {
        let wand = MagicWand::default();
        assert!(wand.select(Point::new(-5.0, 10.0), Viewport::identity(), &two_color()).is_none());
    }

    #[test]
    fn test_respects_viewport() {
        let wand = MagicWand::default();
        // Scene x 40 lands on pixel 80 at 2x zoom: the blue half.
        let vp = Viewport::new(kurbo::Vec2::new(2.0, 1.0), kurbo::Vec2::ZERO);
        let outline = wand.select(Point::new(40.0, 10.0), vp, &two_color()).unwrap();
        let b = outline.scene_bounds();
        assert!((b.x0 - 25.0).abs() <= 1.0);
    }
}
