#![warn(clippy::all, rust_2018_idioms)]

pub mod color;
pub mod command;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod fill;
pub mod geometry;
pub mod history;
pub mod persistence;
pub mod pixels;
pub mod rasterizer;
pub mod session;
pub mod settings;
pub mod shape;
pub mod tools;
pub mod view_transform;

#[cfg(not(target_arch = "wasm32"))]
pub mod app;
#[cfg(not(target_arch = "wasm32"))]
pub mod dialogs;

#[cfg(not(target_arch = "wasm32"))]
pub use app::PaintApp;
pub use command::Command;
pub use document::{CanvasMeta, Document};
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use fill::{fill_at, FillOptions, FillOutcome, NoFillReason, ShapeFillMode};
pub use history::History;
pub use session::{Confirm, Confirmation, FileDialogs, Session};
pub use settings::EditorSettings;
pub use shape::{Shape, ShapeId, ShapeKind};
pub use tools::{Brush, Tool, ToolController};
