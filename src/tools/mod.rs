use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::shape::Shape;

mod draw_shape_tool;
pub use draw_shape_tool::{constrain_square, ShapeGesture};

/// The drawing tools offered in the tool bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Pen,
    Line,
    Rectangle,
    Ellipse,
    /// Bucket fill
    Fill,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Pen,
        Tool::Line,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Fill,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pen => "Pen",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Ellipse => "Ellipse",
            Tool::Fill => "Fill",
        }
    }

    /// Whether the tool draws by dragging out a shape
    pub fn draws_shapes(&self) -> bool {
        !matches!(self, Tool::Fill)
    }
}

/// Colors and width a new shape (or fill) is made with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub stroke: Color32,
    pub width: u32,
    /// Fill given to new rectangles and ellipses
    pub shape_fill: Option<Color32>,
    /// Color used by the bucket
    pub bucket: Color32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            stroke: Color32::from_rgb(0x22, 0x22, 0x22),
            width: 2,
            shape_fill: None,
            bucket: Color32::from_rgb(0xff, 0x00, 0x00),
        }
    }
}

/// Turns pointer input for the active tool into commands.
#[derive(Debug, Default)]
pub struct ToolController {
    tool: Tool,
    gesture: Option<ShapeGesture>,
}

impl ToolController {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            gesture: None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools, dropping any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            self.cancel();
            self.tool = tool;
        }
    }

    /// Pointer pressed at a document point. The fill tool acts immediately.
    pub fn press(&mut self, at: Pos2, brush: Brush) -> Option<Command> {
        if self.tool == Tool::Fill {
            return Some(Command::Fill {
                at,
                color: brush.bucket,
            });
        }
        self.gesture = ShapeGesture::begin(self.tool, brush, at);
        None
    }

    pub fn drag(&mut self, to: Pos2, constrain: bool) {
        if let Some(gesture) = &mut self.gesture {
            gesture.drag(to, constrain);
        }
    }

    /// Pointer released: finish the gesture, yielding the shape to add.
    pub fn release(&mut self, at: Pos2, constrain: bool) -> Option<Command> {
        self.gesture.take()?.release(at, constrain)
    }

    /// Pointer released, `at` being `None` when the pointer is off the
    /// canvas. A gesture released off the canvas is abandoned.
    pub fn release_at(&mut self, at: Option<Pos2>, constrain: bool) -> Option<Command> {
        match at {
            Some(at) => self.release(at, constrain),
            None => {
                self.cancel();
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        if self.gesture.take().is_some() {
            log::debug!("{} gesture cancelled", self.tool.name());
        }
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Shape under construction, drawn on top of the document but never
    /// part of it.
    pub fn preview(&self) -> Option<Shape> {
        self.gesture.as_ref().and_then(ShapeGesture::preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_fill_tool_acts_on_press() {
        let mut tools = ToolController::new(Tool::Fill);
        let brush = Brush::default();
        let command = tools.press(pos2(3.0, 4.0), brush);
        assert_eq!(
            command,
            Some(Command::Fill {
                at: pos2(3.0, 4.0),
                color: brush.bucket
            })
        );
        assert!(!tools.is_active());
    }

    #[test]
    fn test_switching_tool_cancels_gesture() {
        let mut tools = ToolController::new(Tool::Line);
        tools.press(pos2(0.0, 0.0), Brush::default());
        assert!(tools.is_active());
        tools.set_tool(Tool::Rectangle);
        assert!(!tools.is_active());
        assert!(tools.release(pos2(9.0, 9.0), false).is_none());
    }

    #[test]
    fn test_release_off_canvas_abandons_gesture() {
        let mut tools = ToolController::new(Tool::Rectangle);
        tools.press(pos2(10.0, 10.0), Brush::default());
        tools.drag(pos2(40.0, 30.0), false);
        assert!(tools.release_at(None, false).is_none());
        assert!(!tools.is_active());
        assert!(tools.preview().is_none());

        tools.press(pos2(10.0, 10.0), Brush::default());
        assert!(matches!(
            tools.release_at(Some(pos2(40.0, 30.0)), false),
            Some(Command::AddShape(_))
        ));
    }
}
