//! In-memory clipboard for region copies.

use image::RgbaImage;
use kurbo::Rect;

/// Pixels captured from inside a selection, with their scene placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardRecord {
    /// Captured pixels; everything outside the clip region is transparent.
    pub pixels: RgbaImage,
    /// Where the pixels sat in the scene when copied.
    pub scene_rect: Rect,
}

impl ClipboardRecord {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Clipboard service owned by the editor and handed to region operations.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    record: Option<ClipboardRecord>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, record: ClipboardRecord) {
        log::info!(
            "Clipboard holds {}x{} px from {:?}",
            record.width(),
            record.height(),
            record.scene_rect
        );
        self.record = Some(record);
    }

    pub fn get(&self) -> Option<&ClipboardRecord> {
        self.record.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_none()
    }

    pub fn clear(&mut self) {
        self.record = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut clipboard = Clipboard::new();
        assert!(clipboard.is_empty());
        clipboard.set(ClipboardRecord {
            pixels: RgbaImage::new(3, 2),
            scene_rect: Rect::new(0.0, 0.0, 3.0, 2.0),
        });
        assert_eq!(clipboard.get().map(|r| (r.width(), r.height())), Some((3, 2)));
        clipboard.clear();
        assert!(clipboard.get().is_none());
    }
}
