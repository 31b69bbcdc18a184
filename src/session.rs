//! File workflow around an [`Editor`]: current project path, unsaved
//! changes, and the "save before discarding?" prompts.

use std::path::{Path, PathBuf};

use log::info;

use crate::command::Command;
use crate::document::CanvasMeta;
use crate::editor::Editor;
use crate::error::EditorResult;
use crate::fill::FillOptions;

pub const PROJECT_EXTENSION: &str = "json";

/// Answer to a yes/no/cancel question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Cancel,
}

/// Asks the user a yes/no/cancel question.
pub trait Confirm {
    fn ask(&mut self, title: &str, message: &str) -> Confirmation;
}

/// Picks file paths. `None` means the user cancelled.
pub trait FileDialogs {
    fn open_project(&mut self) -> Option<PathBuf>;
    fn save_project(&mut self, current: Option<&Path>) -> Option<PathBuf>;
    fn export_image(&mut self) -> Option<PathBuf>;
}

pub struct Session {
    editor: Editor,
    path: Option<PathBuf>,
    dirty: bool,
    /// Bumped on every document change, so views know when to re-render
    revision: u64,
}

impl Session {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            path: None,
            dirty: false,
            revision: 0,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Window title: file name plus a marker for unsaved changes.
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        if self.dirty {
            format!("{name} *")
        } else {
            name
        }
    }

    pub fn set_fill_options(&mut self, options: FillOptions) {
        self.editor.set_fill_options(options);
    }

    pub fn execute(&mut self, command: &Command) -> EditorResult<bool> {
        let changed = self.editor.execute(command)?;
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    pub fn undo(&mut self) -> EditorResult<()> {
        self.editor.undo()?;
        self.touch();
        Ok(())
    }

    pub fn redo(&mut self) -> EditorResult<()> {
        self.editor.redo()?;
        self.touch();
        Ok(())
    }

    /// Start a blank canvas. Returns `false` if the user backed out.
    pub fn new_document(
        &mut self,
        meta: CanvasMeta,
        confirm: &mut dyn Confirm,
        dialogs: &mut dyn FileDialogs,
    ) -> EditorResult<bool> {
        meta.validate()?;
        if !self.confirm_discard(confirm, dialogs)? {
            return Ok(false);
        }
        self.editor.new_document(meta)?;
        self.path = None;
        self.dirty = false;
        self.revision += 1;
        Ok(true)
    }

    /// Ask for a project file and load it. Returns `false` if the user
    /// backed out at any prompt.
    pub fn open(
        &mut self,
        confirm: &mut dyn Confirm,
        dialogs: &mut dyn FileDialogs,
    ) -> EditorResult<bool> {
        if !self.confirm_discard(confirm, dialogs)? {
            return Ok(false);
        }
        let Some(path) = dialogs.open_project() else {
            return Ok(false);
        };
        self.open_path(&path)?;
        Ok(true)
    }

    pub fn open_path(&mut self, path: &Path) -> EditorResult<()> {
        self.editor.open_project(path)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        self.revision += 1;
        Ok(())
    }

    /// Save to the current path, asking for one if there is none yet.
    pub fn save(&mut self, dialogs: &mut dyn FileDialogs) -> EditorResult<bool> {
        match self.path.clone() {
            Some(path) => {
                self.save_to(path)?;
                Ok(true)
            }
            None => self.save_as(dialogs),
        }
    }

    pub fn save_as(&mut self, dialogs: &mut dyn FileDialogs) -> EditorResult<bool> {
        let Some(mut path) = dialogs.save_project(self.path.as_deref()) else {
            return Ok(false);
        };
        if path.extension().is_none() {
            path.set_extension(PROJECT_EXTENSION);
        }
        self.save_to(path)?;
        Ok(true)
    }

    /// Export a flattened image. Returns the written path, or `None` if
    /// the user cancelled.
    pub fn export(&mut self, dialogs: &mut dyn FileDialogs) -> EditorResult<Option<PathBuf>> {
        let Some(path) = dialogs.export_image() else {
            return Ok(None);
        };
        self.editor.export(&path)?;
        Ok(Some(path))
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    fn save_to(&mut self, path: PathBuf) -> EditorResult<()> {
        self.editor.save_project(&path)?;
        self.path = Some(path);
        self.dirty = false;
        Ok(())
    }

    /// Ask before throwing the drawing away. "No" saves first.
    fn confirm_discard(
        &mut self,
        confirm: &mut dyn Confirm,
        dialogs: &mut dyn FileDialogs,
    ) -> EditorResult<bool> {
        if !self.editor.document().has_content() {
            return Ok(true);
        }
        match confirm.ask(
            "Discard drawing?",
            "The canvas has content. Discard it?\n\nYes: discard\nNo: save first\nCancel: go back",
        ) {
            Confirmation::Yes => Ok(true),
            Confirmation::No => {
                let saved = self.save(dialogs)?;
                if !saved {
                    info!("save cancelled, keeping the current drawing");
                }
                Ok(saved)
            }
            Confirmation::Cancel => Ok(false),
        }
    }
}
