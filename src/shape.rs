use egui::{Color32, Pos2, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::geometry::{self, SegmentHit};

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 20;

/// Stable identity of a shape, assigned when it is created.
///
/// Unlike the z-order index, the id survives undo/redo and save/load, so a
/// rendered element can always be traced back to its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry of a drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Freehand pen stroke, at least two points
    Stroke(Vec<Pos2>),
    Line { start: Pos2, end: Pos2 },
    /// Axis-aligned rectangle spanned by two opposite corners
    Rectangle { a: Pos2, b: Pos2 },
    /// Ellipse inscribed in the rectangle spanned by two corners
    Ellipse { a: Pos2, b: Pos2 },
}

impl ShapeKind {
    /// Tag used in project files
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Stroke(_) => "pen",
            ShapeKind::Line { .. } => "line",
            ShapeKind::Rectangle { .. } => "rect",
            ShapeKind::Ellipse { .. } => "oval",
        }
    }

    fn points(&self) -> Vec<Pos2> {
        match self {
            ShapeKind::Stroke(points) => points.clone(),
            ShapeKind::Line { start, end } => vec![*start, *end],
            ShapeKind::Rectangle { a, b } | ShapeKind::Ellipse { a, b } => vec![*a, *b],
        }
    }
}

/// One committed drawing primitive.
///
/// Shapes are immutable once committed except for the fill color of
/// rectangles and ellipses, which the bucket tool may replace.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    stroke: Color32,
    width: u32,
    fill: Option<Color32>,
}

impl Shape {
    /// Create a validated shape with a fresh id.
    pub fn new(
        kind: ShapeKind,
        stroke: Color32,
        width: u32,
        fill: Option<Color32>,
    ) -> EditorResult<Self> {
        Self::with_id(ShapeId::new(), kind, stroke, width, fill)
    }

    /// Create a validated shape keeping an existing id (used when loading).
    pub fn with_id(
        id: ShapeId,
        kind: ShapeKind,
        stroke: Color32,
        width: u32,
        fill: Option<Color32>,
    ) -> EditorResult<Self> {
        if !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&width) {
            return Err(EditorError::InvalidGeometry(format!(
                "stroke width {width} outside {MIN_STROKE_WIDTH}..={MAX_STROKE_WIDTH}"
            )));
        }
        let points = kind.points();
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(EditorError::InvalidGeometry(
                "coordinates must be finite".to_string(),
            ));
        }
        if let ShapeKind::Stroke(points) = &kind {
            if points.len() < 2 {
                return Err(EditorError::InvalidGeometry(format!(
                    "pen stroke needs at least 2 points, got {}",
                    points.len()
                )));
            }
        }
        let mut shape = Self {
            id,
            kind,
            stroke,
            width,
            fill: None,
        };
        shape.set_fill(fill)?;
        Ok(shape)
    }

    pub fn stroke_path(points: Vec<Pos2>, color: Color32, width: u32) -> EditorResult<Self> {
        Self::new(ShapeKind::Stroke(points), color, width, None)
    }

    pub fn line(start: Pos2, end: Pos2, color: Color32, width: u32) -> EditorResult<Self> {
        Self::new(ShapeKind::Line { start, end }, color, width, None)
    }

    pub fn rectangle(
        a: Pos2,
        b: Pos2,
        color: Color32,
        width: u32,
        fill: Option<Color32>,
    ) -> EditorResult<Self> {
        Self::new(ShapeKind::Rectangle { a, b }, color, width, fill)
    }

    pub fn ellipse(
        a: Pos2,
        b: Pos2,
        color: Color32,
        width: u32,
        fill: Option<Color32>,
    ) -> EditorResult<Self> {
        Self::new(ShapeKind::Ellipse { a, b }, color, width, fill)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn stroke_color(&self) -> Color32 {
        self.stroke
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn fill(&self) -> Option<Color32> {
        self.fill
    }

    /// Rectangles and ellipses enclose an area and may carry a vector fill.
    pub fn is_closed(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Rectangle { .. } | ShapeKind::Ellipse { .. }
        )
    }

    /// Replace the vector fill. Only closed shapes can be filled.
    pub fn set_fill(&mut self, fill: Option<Color32>) -> EditorResult<()> {
        if fill.is_some() && !self.is_closed() {
            return Err(EditorError::InvalidGeometry(format!(
                "a {} cannot carry a fill",
                self.kind.tag()
            )));
        }
        self.fill = fill;
        Ok(())
    }

    /// Geometry as flat `x, y` pairs, in drawing order.
    pub fn coords(&self) -> Vec<f32> {
        self.kind
            .points()
            .iter()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Polyline for open shapes; empty for rectangles and ellipses.
    pub fn polyline(&self) -> &[Pos2] {
        match &self.kind {
            ShapeKind::Stroke(points) => points,
            _ => &[],
        }
    }

    /// Normalized corner rectangle of a closed shape.
    pub fn corner_rect(&self) -> Option<Rect> {
        match self.kind {
            ShapeKind::Rectangle { a, b } | ShapeKind::Ellipse { a, b } => {
                Some(Rect::from_two_pos(a, b))
            }
            _ => None,
        }
    }

    /// Axis-aligned bounds of every pixel the shape can touch.
    pub fn bounding_box(&self) -> Rect {
        match &self.kind {
            ShapeKind::Stroke(points) => {
                geometry::calculate_bounds(points, self.width as f32 / 2.0)
            }
            ShapeKind::Line { start, end } => {
                geometry::calculate_bounds(&[*start, *end], self.width as f32 / 2.0)
            }
            ShapeKind::Rectangle { a, b } | ShapeKind::Ellipse { a, b } => {
                Rect::from_two_pos(*a, *b)
            }
        }
    }

    /// Point containment for closed shapes (open shapes contain nothing).
    ///
    /// Rectangles use inclusive normalized bounds; ellipses use the ellipse
    /// equation. The rasterizer and the fill engine use this same test.
    pub fn contains(&self, point: Pos2) -> bool {
        match self.kind {
            ShapeKind::Rectangle { a, b } => Rect::from_two_pos(a, b).contains(point),
            ShapeKind::Ellipse { a, b } => {
                geometry::ellipse_contains(Rect::from_two_pos(a, b), point)
            }
            _ => false,
        }
    }

    /// Distance from an inside point to the shape's border (closed shapes only).
    pub(crate) fn inner_border_distance(&self, point: Pos2) -> Option<f32> {
        match self.kind {
            ShapeKind::Rectangle { a, b } => Some(geometry::rect_inner_distance(
                Rect::from_two_pos(a, b),
                point,
            )),
            ShapeKind::Ellipse { a, b } => Some(-geometry::ellipse_signed_distance(
                Rect::from_two_pos(a, b),
                point,
            )),
            _ => None,
        }
    }

    /// Nearest point on the shape's path for strokes and lines.
    pub fn nearest_segment(&self, point: Pos2) -> Option<SegmentHit> {
        match &self.kind {
            ShapeKind::Stroke(points) => geometry::nearest_segment(point, points),
            ShapeKind::Line { start, end } => geometry::nearest_segment(point, &[*start, *end]),
            _ => None,
        }
    }

    /// Hit test used for picking: inside a closed shape, or within
    /// `tolerance` of an open shape's visible stroke.
    pub fn hit_test(&self, point: Pos2, tolerance: f32) -> bool {
        if self.is_closed() {
            return self.contains(point);
        }
        match self.nearest_segment(point) {
            Some(hit) => hit.distance <= self.width as f32 / 2.0 + tolerance,
            None => self
                .polyline()
                .first()
                .is_some_and(|p| p.distance(point) <= self.width as f32 / 2.0 + tolerance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_stroke_needs_two_points() {
        let err = Shape::stroke_path(vec![pos2(1.0, 1.0)], Color32::BLACK, 2).unwrap_err();
        assert!(matches!(err, EditorError::InvalidGeometry(_)));
    }

    #[test]
    fn test_width_range() {
        assert!(Shape::line(pos2(0.0, 0.0), pos2(1.0, 1.0), Color32::BLACK, 0).is_err());
        assert!(Shape::line(pos2(0.0, 0.0), pos2(1.0, 1.0), Color32::BLACK, 21).is_err());
        assert!(Shape::line(pos2(0.0, 0.0), pos2(1.0, 1.0), Color32::BLACK, 20).is_ok());
    }

    #[test]
    fn test_open_shapes_reject_fill() {
        let mut line = Shape::line(pos2(0.0, 0.0), pos2(5.0, 5.0), Color32::BLACK, 1).unwrap();
        assert!(line.set_fill(Some(Color32::RED)).is_err());
        assert!(line.set_fill(None).is_ok());
    }

    #[test]
    fn test_rectangle_contains_uses_normalized_corners() {
        let rect = Shape::rectangle(pos2(100.0, 100.0), pos2(10.0, 10.0), Color32::BLACK, 2, None)
            .unwrap();
        assert!(rect.contains(pos2(10.0, 10.0)));
        assert!(rect.contains(pos2(55.0, 70.0)));
        assert!(!rect.contains(pos2(101.0, 50.0)));
    }

    #[test]
    fn test_ellipse_contains_is_stricter_than_bounds() {
        let oval = Shape::ellipse(pos2(0.0, 0.0), pos2(100.0, 100.0), Color32::BLACK, 2, None)
            .unwrap();
        assert!(oval.contains(pos2(50.0, 50.0)));
        assert!(!oval.contains(pos2(3.0, 3.0)));
        assert!(oval.bounding_box().contains(pos2(3.0, 3.0)));
    }

    #[test]
    fn test_hit_test_line_tolerance() {
        let line = Shape::line(pos2(0.0, 0.0), pos2(100.0, 0.0), Color32::BLACK, 2).unwrap();
        assert!(line.hit_test(pos2(50.0, 3.0), 3.0));
        assert!(!line.hit_test(pos2(50.0, 10.0), 3.0));
    }

    #[test]
    fn test_coords_are_flat_pairs() {
        let pen = Shape::stroke_path(
            vec![pos2(1.0, 2.0), pos2(3.0, 4.0), pos2(5.0, 6.0)],
            Color32::BLACK,
            3,
        )
        .unwrap();
        assert_eq!(pen.coords(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(pen.kind().tag(), "pen");
    }
}
