//! Host raster surface seam.
//!
//! The editor never owns the rendered canvas. It reads and writes rectangular
//! regions of it through [`RasterSurface`], always addressed in screen pixels.

use crate::viewport::{PixelRect, PixelSize};
use image::{RgbaImage, imageops};

/// A rendered raster surface the editor can sample and write back to.
pub trait RasterSurface {
    /// Surface dimensions in pixels.
    fn size(&self) -> PixelSize;

    /// Copy a region out as a dense RGBA buffer. The rect is clamped to the
    /// surface; pixels outside it are not returned.
    fn read_region(&self, rect: PixelRect) -> RgbaImage;

    /// Write `pixels` with its top-left corner at `(x, y)`. Parts falling
    /// outside the surface are dropped.
    fn write_region(&mut self, x: i64, y: i64, pixels: &RgbaImage);

    /// Show or hide the live selection overlay. Surfaces without an overlay
    /// ignore this.
    fn set_overlay_visible(&mut self, _visible: bool) {}

    /// Whether the selection overlay is currently drawn.
    fn overlay_visible(&self) -> bool {
        false
    }

    /// Read the whole surface.
    fn read_all(&self) -> RgbaImage {
        self.read_region(PixelRect::from_size(self.size()))
    }
}

/// In-memory surface backed by an [`RgbaImage`].
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
    overlay_visible: bool,
    /// Every overlay visibility change, in order.
    overlay_log: Vec<bool>,
}

impl ImageSurface {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            overlay_visible: true,
            overlay_log: Vec::new(),
        }
    }

    /// A surface filled with one colour.
    pub fn filled(width: u32, height: u32, pixel: image::Rgba<u8>) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, pixel))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn overlay_log(&self) -> &[bool] {
        &self.overlay_log
    }
}

impl RasterSurface for ImageSurface {
    fn size(&self) -> PixelSize {
        PixelSize::new(self.image.width(), self.image.height())
    }

    fn read_region(&self, rect: PixelRect) -> RgbaImage {
        let size = self.size();
        let clamped = PixelRect::from_edges_clamped(
            rect.x as i64,
            rect.y as i64,
            rect.right() as i64,
            rect.bottom() as i64,
            size,
        );
        imageops::crop_imm(&self.image, clamped.x, clamped.y, clamped.width, clamped.height).to_image()
    }

    fn write_region(&mut self, x: i64, y: i64, pixels: &RgbaImage) {
        imageops::replace(&mut self.image, pixels, x, y);
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        if self.overlay_visible != visible {
            self.overlay_visible = visible;
            self.overlay_log.push(visible);
        }
    }

    fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }
}

/// Hides the selection overlay for as long as it lives.
///
/// The overlay is restored on drop only if it was visible when the guard was
/// taken and `restore` was left on.
pub struct OverlayHidden<'a, S: RasterSurface + ?Sized> {
    surface: &'a mut S,
    restore: bool,
}

impl<'a, S: RasterSurface + ?Sized> OverlayHidden<'a, S> {
    pub fn new(surface: &'a mut S, restore: bool) -> Self {
        let was_visible = surface.overlay_visible();
        surface.set_overlay_visible(false);
        Self {
            surface,
            restore: restore && was_visible,
        }
    }

    pub fn surface(&self) -> &S {
        self.surface
    }
}

impl<S: RasterSurface + ?Sized> Drop for OverlayHidden<'_, S> {
    fn drop(&mut self) {
        if self.restore {
            self.surface.set_overlay_visible(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_read_region_is_clamped() {
        let surface = ImageSurface::filled(20, 10, Rgba([1, 2, 3, 255]));
        let region = surface.read_region(PixelRect::new(15, 5, 10, 10));
        assert_eq!(region.dimensions(), (5, 5));
    }

    #[test]
    fn test_write_region_drops_outside() {
        let mut surface = ImageSurface::filled(4, 4, Rgba([0, 0, 0, 255]));
        let patch = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));
        surface.write_region(-1, -1, &patch);
        assert_eq!(surface.image().get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
        assert_eq!(surface.image().get_pixel(1, 1), &Rgba([9, 9, 9, 255]));
        assert_eq!(surface.image().get_pixel(2, 2), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_overlay_guard_restores() {
        let mut surface = ImageSurface::filled(2, 2, Rgba([0, 0, 0, 255]));
        {
            let guard = OverlayHidden::new(&mut surface, true);
            assert!(!guard.surface().overlay_visible());
        }
        assert!(surface.overlay_visible());
        assert_eq!(surface.overlay_log(), &[false, true]);
    }

    #[test]
    fn test_overlay_guard_without_restore() {
        let mut surface = ImageSurface::filled(2, 2, Rgba([0, 0, 0, 255]));
        drop(OverlayHidden::new(&mut surface, false));
        assert!(!surface.overlay_visible());
    }
}
