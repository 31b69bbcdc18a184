use std::path::{Path, PathBuf};

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::export::ExportFormat;
use crate::session::{Confirm, Confirmation, FileDialogs, PROJECT_EXTENSION};

/// Native file pickers and message boxes.
#[derive(Debug, Default)]
pub struct NativeDialogs;

impl FileDialogs for NativeDialogs {
    fn open_project(&mut self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title("Open project")
            .add_filter("Project", &[PROJECT_EXTENSION])
            .add_filter("All files", &["*"])
            .pick_file()
    }

    fn save_project(&mut self, current: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Save project")
            .add_filter("Project", &[PROJECT_EXTENSION]);
        if let Some(current) = current {
            if let Some(dir) = current.parent() {
                dialog = dialog.set_directory(dir);
            }
            if let Some(name) = current.file_name() {
                dialog = dialog.set_file_name(name.to_string_lossy());
            }
        }
        dialog.save_file()
    }

    fn export_image(&mut self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new().set_title("Export image");
        for format in ExportFormat::ALL {
            let label = format!("{format:?}");
            dialog = match format {
                ExportFormat::Jpeg => dialog.add_filter(label, &["jpg", "jpeg"]),
                _ => dialog.add_filter(label, &[format.extension()]),
            };
        }
        dialog.set_file_name("drawing.png").save_file()
    }
}

impl Confirm for NativeDialogs {
    fn ask(&mut self, title: &str, message: &str) -> Confirmation {
        let answer = MessageDialog::new()
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNoCancel)
            .set_level(MessageLevel::Warning)
            .show();
        match answer {
            MessageDialogResult::Yes => Confirmation::Yes,
            MessageDialogResult::No => Confirmation::No,
            _ => Confirmation::Cancel,
        }
    }
}

/// Show an error message box.
pub fn show_error(title: &str, message: &str) {
    MessageDialog::new()
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .set_level(MessageLevel::Error)
        .show();
}
