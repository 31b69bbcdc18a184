use egui::Pos2;

use crate::command::Command;
use crate::shape::{Shape, ShapeKind};
use crate::tools::{Brush, Tool};

/// Make the rectangle spanned by `start` and `end` a square: the side is the
/// larger of the two extents and `end` keeps its direction from `start`.
pub fn constrain_square(start: Pos2, end: Pos2) -> Pos2 {
    let side = (end.x - start.x).abs().max((end.y - start.y).abs());
    let x = if end.x >= start.x { start.x + side } else { start.x - side };
    let y = if end.y >= start.y { start.y + side } else { start.y - side };
    Pos2::new(x, y)
}

/// A shape being dragged out with the pen, line, rectangle or ellipse tool.
#[derive(Debug, Clone)]
pub struct ShapeGesture {
    tool: Tool,
    brush: Brush,
    /// Pen: every sampled point. Other tools: start and current point.
    points: Vec<Pos2>,
}

impl ShapeGesture {
    /// Start a gesture; `None` for tools that do not drag out shapes.
    pub fn begin(tool: Tool, brush: Brush, at: Pos2) -> Option<Self> {
        if !tool.draws_shapes() {
            return None;
        }
        let points = match tool {
            Tool::Pen => vec![at],
            _ => vec![at, at],
        };
        Some(Self {
            tool,
            brush,
            points,
        })
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Follow the pointer. `constrain` (shift held) squares rectangles and
    /// ellipses; it has no effect on pens and lines.
    pub fn drag(&mut self, to: Pos2, constrain: bool) {
        match self.tool {
            Tool::Pen => {
                if self.points.last() != Some(&to) {
                    self.points.push(to);
                }
            }
            Tool::Line => self.points[1] = to,
            Tool::Rectangle | Tool::Ellipse => {
                self.points[1] = if constrain {
                    constrain_square(self.points[0], to)
                } else {
                    to
                };
            }
            Tool::Fill => {}
        }
    }

    /// Finish at `at`. Degenerate gestures (a pen click, a zero-length line,
    /// a rectangle or ellipse with no extent) produce nothing.
    pub fn release(mut self, at: Pos2, constrain: bool) -> Option<Command> {
        self.drag(at, constrain);
        let shape = self.build()?;
        Some(Command::AddShape(shape))
    }

    /// The shape as it would be committed right now.
    pub fn preview(&self) -> Option<Shape> {
        self.build()
    }

    fn build(&self) -> Option<Shape> {
        let Brush {
            stroke,
            width,
            shape_fill,
            ..
        } = self.brush;
        let kind = match (self.tool, self.points.as_slice()) {
            (Tool::Pen, points) if points.len() >= 2 => ShapeKind::Stroke(points.to_vec()),
            (Tool::Line, &[start, end]) if start != end => ShapeKind::Line { start, end },
            (Tool::Rectangle, &[a, b]) if a != b => ShapeKind::Rectangle { a, b },
            (Tool::Ellipse, &[a, b]) if a != b => ShapeKind::Ellipse { a, b },
            _ => return None,
        };
        let fill = if matches!(kind, ShapeKind::Rectangle { .. } | ShapeKind::Ellipse { .. }) {
            shape_fill
        } else {
            None
        };
        Shape::new(kind, stroke, width, fill)
            .inspect_err(|err| log::warn!("discarding {} gesture: {}", self.tool.name(), err))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, Color32};

    fn added(command: Option<Command>) -> Shape {
        match command {
            Some(Command::AddShape(shape)) => shape,
            other => panic!("expected AddShape, got {other:?}"),
        }
    }

    #[test]
    fn test_constrain_square_keeps_direction() {
        assert_eq!(constrain_square(pos2(10.0, 10.0), pos2(30.0, 15.0)), pos2(30.0, 30.0));
        assert_eq!(constrain_square(pos2(10.0, 10.0), pos2(5.0, -20.0)), pos2(-20.0, -20.0));
        assert_eq!(constrain_square(pos2(0.0, 0.0), pos2(-4.0, 2.0)), pos2(-4.0, 4.0));
    }

    #[test]
    fn test_shift_ellipse_is_circle() {
        let mut gesture = ShapeGesture::begin(Tool::Ellipse, Brush::default(), pos2(0.0, 0.0)).unwrap();
        gesture.drag(pos2(10.0, 4.0), true);
        let shape = added(gesture.release(pos2(20.0, 6.0), true));
        assert_eq!(shape.coords(), vec![0.0, 0.0, 20.0, 20.0]);
    }

    #[test]
    fn test_pen_collects_points() {
        let mut gesture = ShapeGesture::begin(Tool::Pen, Brush::default(), pos2(0.0, 0.0)).unwrap();
        gesture.drag(pos2(1.0, 1.0), false);
        gesture.drag(pos2(1.0, 1.0), false);
        gesture.drag(pos2(2.0, 3.0), false);
        let shape = added(gesture.release(pos2(2.0, 3.0), false));
        assert_eq!(shape.coords(), vec![0.0, 0.0, 1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_degenerate_gestures_yield_nothing() {
        let pen = ShapeGesture::begin(Tool::Pen, Brush::default(), pos2(5.0, 5.0)).unwrap();
        assert!(pen.release(pos2(5.0, 5.0), false).is_none());
        let line = ShapeGesture::begin(Tool::Line, Brush::default(), pos2(5.0, 5.0)).unwrap();
        assert!(line.release(pos2(5.0, 5.0), false).is_none());
        assert!(ShapeGesture::begin(Tool::Fill, Brush::default(), pos2(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_shape_fill_only_on_closed_shapes() {
        let brush = Brush {
            shape_fill: Some(Color32::GREEN),
            ..Brush::default()
        };
        let rect = ShapeGesture::begin(Tool::Rectangle, brush, pos2(0.0, 0.0)).unwrap();
        assert_eq!(added(rect.release(pos2(5.0, 5.0), false)).fill(), Some(Color32::GREEN));
        let line = ShapeGesture::begin(Tool::Line, brush, pos2(0.0, 0.0)).unwrap();
        assert_eq!(added(line.release(pos2(5.0, 5.0), false)).fill(), None);
    }

    #[test]
    fn test_preview_tracks_drag() {
        let mut gesture = ShapeGesture::begin(Tool::Line, Brush::default(), pos2(0.0, 0.0)).unwrap();
        assert!(gesture.preview().is_none());
        gesture.drag(pos2(3.0, 0.0), false);
        assert_eq!(gesture.preview().unwrap().coords(), vec![0.0, 0.0, 3.0, 0.0]);
    }
}
