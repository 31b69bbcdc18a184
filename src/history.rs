use std::collections::VecDeque;

use log::trace;

use crate::document::{CanvasMeta, Document};
use crate::error::{EditorError, EditorResult};
use crate::pixels::PixelBuffer;
use crate::shape::Shape;

pub const DEFAULT_CAPACITY: usize = 200;
const MIN_CAPACITY: usize = 2;

/// Deep copy of everything undo has to bring back: shapes, raster layer and
/// canvas metadata. Vector and raster state are restored together.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    shapes: Vec<Shape>,
    raster: Option<PixelBuffer>,
    meta: CanvasMeta,
}

impl Snapshot {
    pub fn capture(document: &Document) -> Self {
        Self {
            shapes: document.shapes().to_vec(),
            raster: document.raster_layer().cloned(),
            meta: document.meta(),
        }
    }

    pub fn to_document(&self) -> Document {
        Document::from_parts(self.meta, self.shapes.clone(), self.raster.clone())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

/// Snapshot-per-commit undo/redo.
///
/// The top of the undo stack always mirrors the live document after a
/// commit; the bottom entry is the sentinel that can never be undone.
pub struct History {
    /// Past states, oldest first. Never empty.
    undo_stack: VecDeque<Snapshot>,
    /// Undone states, most recently undone last
    redo_stack: Vec<Snapshot>,
    capacity: usize,
}

impl History {
    /// Creates a history whose sentinel is the current document state
    pub fn new(document: &Document) -> Self {
        Self::with_capacity(document, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(document: &Document, capacity: usize) -> Self {
        let mut undo_stack = VecDeque::new();
        undo_stack.push_back(Snapshot::capture(document));
        Self {
            undo_stack,
            redo_stack: Vec::new(),
            capacity: capacity.max(MIN_CAPACITY),
        }
    }

    /// Forget everything and start again from `document` (new/load).
    pub fn reset(&mut self, document: &Document) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push_back(Snapshot::capture(document));
    }

    /// Record the document's current state. Clears the redo stack.
    pub fn commit(&mut self, document: &Document) {
        self.undo_stack.push_back(Snapshot::capture(document));
        self.redo_stack.clear();
        self.evict();
        trace!(
            "history commit: {} past, {} future",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
    }

    /// Step back one commit, restoring `document` from the previous state.
    pub fn undo(&mut self, document: &mut Document) -> EditorResult<()> {
        if self.undo_stack.len() <= 1 {
            return Err(EditorError::NothingToUndo);
        }
        if let Some(current) = self.undo_stack.pop_back() {
            self.redo_stack.push(current);
        }
        let previous = self.undo_stack.back().ok_or(EditorError::NothingToUndo)?;
        *document = previous.to_document();
        trace!(
            "history undo: {} past, {} future",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Ok(())
    }

    /// Re-apply the most recently undone state.
    pub fn redo(&mut self, document: &mut Document) -> EditorResult<()> {
        let next = self.redo_stack.pop().ok_or(EditorError::NothingToRedo)?;
        *document = next.to_document();
        self.undo_stack.push_back(next);
        self.evict();
        trace!(
            "history redo: {} past, {} future",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries on the undo stack, sentinel included
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// State at the top of the undo stack.
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.back()
    }

    fn evict(&mut self) {
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }
}
