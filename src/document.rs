use egui::{Color32, Pos2};

use crate::error::{EditorError, EditorResult};
use crate::pixels::PixelBuffer;
use crate::shape::Shape;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
pub const MAX_CANVAS_SIDE: u32 = 16384;

/// Logical canvas size and background, as stored in project files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMeta {
    pub width: u32,
    pub height: u32,
    /// `None` means a transparent background
    pub background: Option<Color32>,
}

impl CanvasMeta {
    pub fn validate(&self) -> EditorResult<()> {
        let valid = |side: u32| (1..=MAX_CANVAS_SIDE).contains(&side);
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(EditorError::InvalidCanvasSize {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl Default for CanvasMeta {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: Some(Color32::WHITE),
        }
    }
}

/// The drawing: canvas metadata, shapes in z-order and the bucket-fill
/// raster layer. All edits go through its methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    meta: CanvasMeta,
    shapes: Vec<Shape>,
    /// Bucket-fill results; `None` until the first raster fill.
    raster: Option<PixelBuffer>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            meta: CanvasMeta::default(),
            shapes: Vec::new(),
            raster: None,
        }
    }
}

impl Document {
    pub fn new(width: u32, height: u32, background: Option<Color32>) -> EditorResult<Self> {
        Self::with_meta(CanvasMeta {
            width,
            height,
            background,
        })
    }

    pub fn with_meta(meta: CanvasMeta) -> EditorResult<Self> {
        meta.validate()?;
        Ok(Self {
            meta,
            shapes: Vec::new(),
            raster: None,
        })
    }

    pub(crate) fn from_parts(
        meta: CanvasMeta,
        shapes: Vec<Shape>,
        raster: Option<PixelBuffer>,
    ) -> Self {
        Self {
            meta,
            shapes,
            raster,
        }
    }

    pub fn meta(&self) -> CanvasMeta {
        self.meta
    }

    pub fn width(&self) -> u32 {
        self.meta.width
    }

    pub fn height(&self) -> u32 {
        self.meta.height
    }

    pub fn background(&self) -> Option<Color32> {
        self.meta.background
    }

    pub fn set_background(&mut self, background: Option<Color32>) {
        self.meta.background = background;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub(crate) fn shape_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    /// Append a shape on top; returns its z-order index.
    pub fn add_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn remove_last_shape(&mut self) -> EditorResult<Shape> {
        self.shapes.pop().ok_or(EditorError::EmptyDocument)
    }

    pub fn raster_layer(&self) -> Option<&PixelBuffer> {
        self.raster.as_ref()
    }

    /// The raster layer, allocated transparent at the logical size on first use.
    pub(crate) fn raster_layer_mut(&mut self) -> &mut PixelBuffer {
        let (w, h) = (self.meta.width, self.meta.height);
        let layer = self.raster.get_or_insert_with(|| PixelBuffer::new(w, h));
        if layer.width() != w || layer.height() != h {
            *layer = layer.resized(w, h);
        }
        layer
    }

    pub fn has_content(&self) -> bool {
        !self.shapes.is_empty() || self.raster.is_some()
    }

    /// Start over with a new size and background, dropping all content.
    pub fn reset(&mut self, width: u32, height: u32, background: Option<Color32>) -> EditorResult<()> {
        *self = Self::new(width, height, background)?;
        Ok(())
    }

    /// Drop shapes and fills but keep size and background.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.raster = None;
    }

    /// Change the logical size keeping content. Shapes keep their
    /// coordinates; the raster layer is rescaled nearest-neighbour.
    pub fn resize_in_place(&mut self, width: u32, height: u32) -> EditorResult<()> {
        let meta = CanvasMeta {
            width,
            height,
            ..self.meta
        };
        meta.validate()?;
        self.meta = meta;
        if let Some(layer) = &mut self.raster {
            *layer = layer.resized(width, height);
        }
        Ok(())
    }

    /// Whether a logical point lies on the canvas.
    pub fn contains_point(&self, point: Pos2) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.meta.width as f32
            && point.y < self.meta.height as f32
    }

    /// Topmost shape under `point`, by z-order index.
    pub fn shape_at(&self, point: Pos2, tolerance: f32) -> Option<usize> {
        self.shapes
            .iter()
            .rposition(|shape| shape.hit_test(point, tolerance))
    }
}
