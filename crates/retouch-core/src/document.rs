//! Committed raster objects.

use crate::compose::PatchKind;
use image::RgbaImage;
use kurbo::{Point, Rect, Vec2};
use uuid::Uuid;

/// Unique identifier for raster objects.
pub type ObjectId = Uuid;

/// A committed patch, kept so the host can layer and undo it.
#[derive(Debug, Clone)]
pub struct RasterObject {
    pub id: ObjectId,
    pub kind: PatchKind,
    pub pixels: RgbaImage,
    /// Scene position of the top-left pixel.
    pub scene_origin: Point,
    /// Scene units per pixel on each axis.
    pub scene_scale: Vec2,
}

impl RasterObject {
    /// Scene rectangle covered by the pixels.
    pub fn scene_bounds(&self) -> Rect {
        let size = Vec2::new(
            self.pixels.width() as f64 * self.scene_scale.x,
            self.pixels.height() as f64 * self.scene_scale.y,
        );
        Rect::from_points(self.scene_origin, self.scene_origin + size)
    }
}

/// Raster objects in z-order (back to front).
#[derive(Debug, Clone, Default)]
pub struct Document {
    objects: Vec<RasterObject>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object on top.
    pub fn push(&mut self, object: RasterObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&RasterObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<RasterObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn objects(&self) -> &[RasterObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
