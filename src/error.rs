use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the editor core.
///
/// Every variant is recoverable: the UI shows a message (or ignores the
/// no-op variants) and the document stays usable.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("the document has no shapes")]
    EmptyDocument,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("failed to parse project: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("project file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot export to {path}: {reason}")]
    ExportTargetUnavailable { path: PathBuf, reason: String },

    #[error("{0} is not available in this build")]
    OptionalDependencyMissing(&'static str),

    #[error("unsupported export format: {0:?}")]
    UnsupportedExportFormat(String),
}

impl EditorError {
    /// True for the "nothing happened" errors the UI should treat as a silent no-op.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::EmptyDocument | Self::NothingToUndo | Self::NothingToRedo
        )
    }
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
