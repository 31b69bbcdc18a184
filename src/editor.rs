use std::path::Path;

use log::{debug, info};

use crate::command::Command;
use crate::document::{CanvasMeta, Document};
use crate::error::EditorResult;
use crate::export;
use crate::fill::{FillOptions, FillOutcome};
use crate::history::{History, DEFAULT_CAPACITY};
use crate::persistence;

/// Document plus its undo history. Every state change goes through here so
/// history always matches the document.
pub struct Editor {
    document: Document,
    history: History,
    fill_options: FillOptions,
    last_fill: Option<FillOutcome>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self::with_options(document, DEFAULT_CAPACITY, FillOptions::default())
    }

    pub fn with_options(document: Document, history_capacity: usize, fill_options: FillOptions) -> Self {
        let history = History::with_capacity(&document, history_capacity);
        Self {
            document,
            history,
            fill_options,
            last_fill: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn fill_options(&self) -> &FillOptions {
        &self.fill_options
    }

    pub fn set_fill_options(&mut self, options: FillOptions) {
        self.fill_options = options;
    }

    /// Outcome of the most recent fill command, for the debug overlay.
    pub fn last_fill(&self) -> Option<&FillOutcome> {
        self.last_fill.as_ref()
    }

    /// Apply `command`, committing one history entry if it changed the
    /// document. Returns whether it did.
    pub fn execute(&mut self, command: &Command) -> EditorResult<bool> {
        let applied = command.execute(&mut self.document, &self.fill_options)?;
        if let Some(outcome) = applied.fill {
            self.last_fill = Some(outcome);
        }
        if applied.changed {
            self.history.commit(&self.document);
        } else {
            debug!("{} left the document unchanged", command.name());
        }
        Ok(applied.changed)
    }

    pub fn undo(&mut self) -> EditorResult<()> {
        self.history.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> EditorResult<()> {
        self.history.redo(&mut self.document)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the drawing with a blank canvas. History starts over.
    pub fn new_document(&mut self, meta: CanvasMeta) -> EditorResult<()> {
        let document = Document::with_meta(meta)?;
        info!(
            "new document {}x{} background {:?}",
            meta.width, meta.height, meta.background
        );
        self.replace_document(document);
        Ok(())
    }

    /// Load a project from JSON text. On error the current document and
    /// history are untouched.
    pub fn load_project(&mut self, text: &str) -> EditorResult<()> {
        let document = persistence::from_json(text, self.document.meta())?;
        self.replace_document(document);
        Ok(())
    }

    pub fn open_project(&mut self, path: &Path) -> EditorResult<()> {
        let document = persistence::load_project(path, self.document.meta())?;
        self.replace_document(document);
        Ok(())
    }

    pub fn project_json(&self) -> EditorResult<String> {
        persistence::to_json(&self.document)
    }

    pub fn save_project(&self, path: &Path) -> EditorResult<()> {
        persistence::save_project(&self.document, path)
    }

    pub fn export(&self, path: &Path) -> EditorResult<()> {
        export::export_document(&self.document, path)
    }

    fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.history.reset(&self.document);
        self.last_fill = None;
    }
}
