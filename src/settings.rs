use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::document::CanvasMeta;
use crate::fill::{FillOptions, ShapeFillMode, NEAR_PATH_TOLERANCE, NUDGE_DISTANCE};
use crate::history::DEFAULT_CAPACITY;
use crate::shape::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use crate::tools::{Brush, Tool};

/// User preferences, persisted between runs by the desktop app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub tool: Tool,
    pub stroke_color: Color32,
    /// Bucket color; `None` falls back to white
    pub fill_color: Option<Color32>,
    /// Give new rectangles and ellipses the fill color
    pub fill_new_shapes: bool,
    pub stroke_width: u32,

    pub canvas_width: u32,
    pub canvas_height: u32,
    /// `None` creates transparent canvases
    pub canvas_background: Option<Color32>,

    pub history_capacity: usize,
    pub near_path_tolerance: f32,
    pub nudge_distance: f32,
    pub shape_fill_mode: ShapeFillMode,

    /// Fill seed / nudge overlay (F12)
    pub debug_overlay: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let canvas = CanvasMeta::default();
        let brush = Brush::default();
        Self {
            tool: Tool::default(),
            stroke_color: brush.stroke,
            fill_color: Some(brush.bucket),
            fill_new_shapes: false,
            stroke_width: brush.width,
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            canvas_background: canvas.background,
            history_capacity: DEFAULT_CAPACITY,
            near_path_tolerance: NEAR_PATH_TOLERANCE,
            nudge_distance: NUDGE_DISTANCE,
            shape_fill_mode: ShapeFillMode::default(),
            debug_overlay: false,
        }
    }
}

impl EditorSettings {
    /// Clamp values that may have been hand-edited or stored by an older build.
    pub fn sanitized(mut self) -> Self {
        self.stroke_width = self.stroke_width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
        if self.new_canvas().validate().is_err() {
            let canvas = CanvasMeta::default();
            self.canvas_width = canvas.width;
            self.canvas_height = canvas.height;
        }
        if !self.near_path_tolerance.is_finite() || self.near_path_tolerance < 0.0 {
            self.near_path_tolerance = NEAR_PATH_TOLERANCE;
        }
        if !self.nudge_distance.is_finite() || self.nudge_distance <= 0.0 {
            self.nudge_distance = NUDGE_DISTANCE;
        }
        self
    }

    pub fn brush(&self) -> Brush {
        Brush {
            stroke: self.stroke_color,
            width: self.stroke_width,
            shape_fill: if self.fill_new_shapes {
                self.fill_color
            } else {
                None
            },
            bucket: self.fill_color.unwrap_or(Color32::WHITE),
        }
    }

    pub fn fill_options(&self) -> FillOptions {
        FillOptions {
            shape_mode: self.shape_fill_mode,
            near_path_tolerance: self.near_path_tolerance,
            nudge_distance: self.nudge_distance,
        }
    }

    pub fn new_canvas(&self) -> CanvasMeta {
        CanvasMeta {
            width: self.canvas_width,
            height: self.canvas_height,
            background: self.canvas_background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings: EditorSettings = serde_json::from_str(r#"{"stroke_width": 7}"#).unwrap();
        assert_eq!(settings.stroke_width, 7);
        assert_eq!(settings.history_capacity, DEFAULT_CAPACITY);
        assert_eq!(settings.shape_fill_mode, ShapeFillMode::FilledShapes);
    }

    #[test]
    fn test_sanitized_clamps() {
        let settings = EditorSettings {
            stroke_width: 99,
            canvas_width: 0,
            nudge_distance: -1.0,
            ..EditorSettings::default()
        }
        .sanitized();
        assert_eq!(settings.stroke_width, MAX_STROKE_WIDTH);
        assert_eq!(settings.canvas_width, CanvasMeta::default().width);
        assert_eq!(settings.nudge_distance, NUDGE_DISTANCE);
    }

    #[test]
    fn test_brush_fill_follows_toggle() {
        let mut settings = EditorSettings::default();
        assert_eq!(settings.brush().shape_fill, None);
        settings.fill_new_shapes = true;
        assert_eq!(settings.brush().shape_fill, settings.fill_color);
        settings.fill_color = None;
        assert_eq!(settings.brush().bucket, Color32::WHITE);
    }
}
