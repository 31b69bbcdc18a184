use egui::{Color32, Pos2};
use log::info;

use crate::document::Document;
use crate::error::EditorResult;
use crate::fill::{self, FillOptions, FillOutcome};
use crate::shape::Shape;

/// Edits the user can make to a document. Each one that changes the
/// document becomes exactly one undo step.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append a finished shape on top of the z-order
    AddShape(Shape),

    /// Bucket fill at a logical document point
    Fill { at: Pos2, color: Color32 },

    /// Change the canvas background; `None` is transparent
    SetBackground(Option<Color32>),

    /// Change the canvas size keeping the drawing
    ResizeInPlace { width: u32, height: u32 },

    /// Remove every shape and fill, keeping size and background
    Clear,
}

/// What executing a command did.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub changed: bool,
    /// Set for [`Command::Fill`]
    pub fill: Option<FillOutcome>,
}

impl Applied {
    fn changed(changed: bool) -> Self {
        Self {
            changed,
            fill: None,
        }
    }
}

impl Command {
    /// Apply the command to `document`.
    ///
    /// Errors leave the document untouched.
    pub fn execute(&self, document: &mut Document, options: &FillOptions) -> EditorResult<Applied> {
        match self {
            Command::AddShape(shape) => {
                document.add_shape(shape.clone());
                Ok(Applied::changed(true))
            }

            Command::Fill { at, color } => {
                let outcome = fill::fill_at(document, *at, *color, options);
                Ok(Applied {
                    changed: outcome.changed(),
                    fill: Some(outcome),
                })
            }

            Command::SetBackground(background) => {
                if document.background() == *background {
                    return Ok(Applied::changed(false));
                }
                document.set_background(*background);
                Ok(Applied::changed(true))
            }

            Command::ResizeInPlace { width, height } => {
                if (document.width(), document.height()) == (*width, *height) {
                    return Ok(Applied::changed(false));
                }
                document.resize_in_place(*width, *height)?;
                info!("canvas resized to {}x{}", width, height);
                Ok(Applied::changed(true))
            }

            Command::Clear => {
                let had_content = document.has_content();
                document.clear();
                Ok(Applied::changed(had_content))
            }
        }
    }

    /// Short label for menus and logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddShape(_) => "Add shape",
            Command::Fill { .. } => "Fill",
            Command::SetBackground(_) => "Set background",
            Command::ResizeInPlace { .. } => "Resize canvas",
            Command::Clear => "Clear",
        }
    }
}
