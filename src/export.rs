//! Flattened image export (PNG, JPEG, BMP).

use std::path::Path;

use log::{info, warn};

use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::pixels::PixelBuffer;
use crate::rasterizer::{self, Composition};

const JPEG_QUALITY: u8 = 92;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> EditorResult<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            _ => Err(EditorError::UnsupportedExportFormat(ext)),
        }
    }

    /// Only PNG output carries an alpha channel.
    pub fn keeps_alpha(self) -> bool {
        matches!(self, Self::Png)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    pub const ALL: [ExportFormat; 3] = [Self::Png, Self::Jpeg, Self::Bmp];
}

/// The picture an export of `format` would contain, at the document's
/// logical size.
pub fn flatten(document: &Document, format: ExportFormat) -> PixelBuffer {
    rasterizer::render(
        document,
        Composition::Export {
            keep_alpha: format.keeps_alpha(),
        },
    )
}

/// Write the flattened document to `path`, format chosen by extension.
pub fn export_document(document: &Document, path: &Path) -> EditorResult<()> {
    let format = ExportFormat::from_path(path)?;
    let image = flatten(document, format);
    encode(&image, path, format).inspect_err(|err| warn!("export failed: {}", err))?;
    info!(
        "exported {}x{} {:?} to {}",
        image.width(),
        image.height(),
        format,
        path.display()
    );
    Ok(())
}

#[cfg(feature = "image_support")]
fn encode(image: &PixelBuffer, path: &Path, format: ExportFormat) -> EditorResult<()> {
    use image::codecs::bmp::BmpEncoder;
    use image::codecs::jpeg::JpegEncoder;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};
    use std::fs::File;
    use std::io::{BufWriter, Write};

    let unavailable = |reason: String| EditorError::ExportTargetUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::create(path).map_err(|err| unavailable(err.to_string()))?;
    let mut writer = BufWriter::new(file);
    let (w, h) = (image.width(), image.height());

    let result = match format {
        ExportFormat::Png => PngEncoder::new(&mut writer).write_image(
            image.as_raw(),
            w,
            h,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            let rgb = image.to_rgb(egui::Color32::WHITE);
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).write_image(
                &rgb,
                w,
                h,
                ExtendedColorType::Rgb8,
            )
        }
        ExportFormat::Bmp => {
            let rgb = image.to_rgb(egui::Color32::WHITE);
            BmpEncoder::new(&mut writer).write_image(&rgb, w, h, ExtendedColorType::Rgb8)
        }
    };
    result.map_err(|err| unavailable(err.to_string()))?;
    writer.flush().map_err(|err| unavailable(err.to_string()))
}

#[cfg(not(feature = "image_support"))]
fn encode(_image: &PixelBuffer, _path: &Path, _format: ExportFormat) -> EditorResult<()> {
    Err(EditorError::OptionalDependencyMissing("image export"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.PNG")).unwrap(), ExportFormat::Png);
        assert_eq!(ExportFormat::from_path(Path::new("a.jpeg")).unwrap(), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(Path::new("a.jpg")).unwrap(), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(Path::new("a.bmp")).unwrap(), ExportFormat::Bmp);
        assert!(matches!(
            ExportFormat::from_path(Path::new("a.gif")),
            Err(EditorError::UnsupportedExportFormat(ext)) if ext == "gif"
        ));
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_flatten_alpha_by_format() {
        let doc = Document::new(3, 3, None).unwrap();
        assert_eq!(flatten(&doc, ExportFormat::Png).get(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(
            flatten(&doc, ExportFormat::Jpeg).get(1, 1),
            Some(Color32::WHITE.to_srgba_unmultiplied())
        );
    }
}
