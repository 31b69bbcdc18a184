//! JSON project files.
//!
//! The raster paint layer is not part of the format: bucket fills are lost
//! on save/reload, exactly as in every earlier release of the file format.

use egui::{Color32, Pos2};
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::color::{parse_color, to_hex};
use crate::document::{CanvasMeta, Document};
use crate::error::{EditorError, EditorResult};
use crate::shape::{Shape, ShapeId, ShapeKind};

/// One shape as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(rename = "type")]
    pub kind: String,
    /// Flat `x, y` pairs
    pub coords: Vec<f32>,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_width", deserialize_with = "lenient_width")]
    pub width: u32,
    /// `""` (or null) means no fill
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct MetaRecord {
    w: u32,
    h: u32,
    bg: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProjectRecord<'a> {
    meta: MetaRecord,
    shapes: &'a [ShapeRecord],
}

/// Meta block as read: every key is optional and falls back to the
/// currently open canvas.
#[derive(Debug, Default, Deserialize)]
struct PartialMeta {
    w: Option<u32>,
    h: Option<u32>,
    #[serde(default, deserialize_with = "double_option")]
    bg: Option<Option<String>>,
}

/// `shapes` is required so that an arbitrary JSON object is not taken for
/// an empty drawing.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedProject {
    #[serde(default)]
    meta: PartialMeta,
    shapes: Vec<ShapeRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectData {
    Wrapped(WrappedProject),
    /// Bare shape list written by the first releases
    Legacy(Vec<ShapeRecord>),
}

fn default_stroke() -> String {
    "#000000".to_string()
}

fn default_width() -> u32 {
    2
}

fn lenient_width<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(de)?;
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!("invalid width {value}")));
    }
    Ok(value.round() as u32)
}

fn empty_as_none<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(de)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn double_option<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(de).map(Some)
}

fn parse_background(text: Option<&str>) -> EditorResult<Option<Color32>> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("transparent") || s.eq_ignore_ascii_case("none") => {
            Ok(None)
        }
        Some(s) => parse_color(s).map(Some),
    }
}

impl From<&Shape> for ShapeRecord {
    fn from(shape: &Shape) -> Self {
        Self {
            kind: shape.kind().tag().to_string(),
            coords: shape.coords(),
            stroke: to_hex(shape.stroke_color()),
            width: shape.width(),
            fill: shape.fill().map(to_hex),
            id: Some(shape.id().as_uuid()),
        }
    }
}

impl TryFrom<&ShapeRecord> for Shape {
    type Error = EditorError;

    fn try_from(record: &ShapeRecord) -> EditorResult<Shape> {
        if record.coords.len() % 2 != 0 {
            return Err(EditorError::InvalidGeometry(format!(
                "{} has an odd number of coordinates",
                record.kind
            )));
        }
        let points: Vec<Pos2> = record
            .coords
            .chunks_exact(2)
            .map(|xy| Pos2::new(xy[0], xy[1]))
            .collect();
        let two_points = || match points.as_slice() {
            [a, b] => Ok((*a, *b)),
            _ => Err(EditorError::InvalidGeometry(format!(
                "{} needs exactly 2 points, got {}",
                record.kind,
                points.len()
            ))),
        };
        let kind = match record.kind.as_str() {
            "pen" => ShapeKind::Stroke(points.clone()),
            "line" => {
                let (start, end) = two_points()?;
                ShapeKind::Line { start, end }
            }
            "rect" => {
                let (a, b) = two_points()?;
                ShapeKind::Rectangle { a, b }
            }
            "oval" => {
                let (a, b) = two_points()?;
                ShapeKind::Ellipse { a, b }
            }
            other => {
                return Err(EditorError::InvalidGeometry(format!(
                    "unknown shape type {other:?}"
                )));
            }
        };
        let stroke = parse_color(&record.stroke)?;
        // Older files store "" or a fill on open shapes; only closed shapes keep it.
        let fill = match &record.fill {
            Some(text) if matches!(kind, ShapeKind::Rectangle { .. } | ShapeKind::Ellipse { .. }) => {
                Some(parse_color(text)?)
            }
            _ => None,
        };
        let id = record.id.map(ShapeId::from_uuid).unwrap_or_default();
        Shape::with_id(id, kind, stroke, record.width, fill)
    }
}

/// Serialize the document (without its raster layer) as pretty JSON.
pub fn to_json(document: &Document) -> EditorResult<String> {
    let shapes: Vec<ShapeRecord> = document.shapes().iter().map(ShapeRecord::from).collect();
    let record = ProjectRecord {
        meta: MetaRecord {
            w: document.width(),
            h: document.height(),
            bg: document.background().map(to_hex),
        },
        shapes: &shapes,
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Parse a project. Missing metadata (including the legacy bare-list
/// format) falls back to `current`. Nothing is returned unless the whole
/// file is valid.
pub fn from_json(text: &str, current: CanvasMeta) -> EditorResult<Document> {
    let data: ProjectData = serde_json::from_str(text)?;
    let (meta, records) = match data {
        ProjectData::Legacy(shapes) => (current, shapes),
        ProjectData::Wrapped(project) => {
            let background = match project.meta.bg {
                Some(bg) => parse_background(bg.as_deref())?,
                None => current.background,
            };
            let meta = CanvasMeta {
                width: project.meta.w.unwrap_or(current.width),
                height: project.meta.h.unwrap_or(current.height),
                background,
            };
            (meta, project.shapes)
        }
    };

    let mut document = Document::with_meta(meta)?;
    for record in &records {
        document.add_shape(Shape::try_from(record)?);
    }
    Ok(document)
}

pub fn save_project(document: &Document, path: &Path) -> EditorResult<()> {
    let json = to_json(document)?;
    fs::write(path, json)?;
    info!("saved project to {}", path.display());
    Ok(())
}

pub fn load_project(path: &Path, current: CanvasMeta) -> EditorResult<Document> {
    let text = fs::read_to_string(path)?;
    let document = from_json(&text, current).inspect_err(|err| {
        warn!("failed to load {}: {}", path.display(), err);
    })?;
    info!(
        "loaded project {} ({}x{}, {} shapes)",
        path.display(),
        document.width(),
        document.height(),
        document.shapes().len()
    );
    Ok(document)
}
