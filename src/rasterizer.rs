//! Software rasterizer for the shape list.
//!
//! Output is aliased and fully deterministic: the same document always
//! produces the same bytes. Pixel `(x, y)` samples the logical point
//! `(x, y)`.

use egui::{Color32, Pos2, Rect};

use crate::document::Document;
use crate::geometry;
use crate::pixels::PixelBuffer;
use crate::shape::{Shape, ShapeKind};

/// Which consumer a render is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// Scene as seen by the flood fill: every vector fill first, then every
    /// outline on top so outlines stay intact walls.
    FillSource,
    /// Flattened picture: shapes in z-order, each fill then outline.
    /// With `keep_alpha` an unset background stays transparent, otherwise
    /// it is flattened to white.
    Export { keep_alpha: bool },
}

/// Render `document` at its logical size.
pub fn render(document: &Document, composition: Composition) -> PixelBuffer {
    let (w, h) = (document.width(), document.height());
    let background = match (document.background(), composition) {
        (Some(color), _) => color,
        (None, Composition::Export { keep_alpha: false }) => Color32::WHITE,
        (None, _) => Color32::TRANSPARENT,
    };

    let mut buf = PixelBuffer::filled(w, h, background);
    if let Some(layer) = document.raster_layer() {
        buf.composite(layer);
    }

    match composition {
        Composition::FillSource => {
            for shape in document.shapes() {
                paint_fill(&mut buf, shape);
            }
            for shape in document.shapes() {
                paint_outline(&mut buf, shape);
            }
        }
        Composition::Export { .. } => {
            for shape in document.shapes() {
                paint_fill(&mut buf, shape);
                paint_outline(&mut buf, shape);
            }
        }
    }
    buf
}

/// Render at an arbitrary pixel size (nearest-neighbour from the logical render).
pub fn render_at(
    document: &Document,
    width: u32,
    height: u32,
    composition: Composition,
) -> PixelBuffer {
    let buf = render(document, composition);
    if buf.width() == width && buf.height() == height {
        buf
    } else {
        buf.resized(width, height)
    }
}

/// Inclusive pixel range covered by `rect`, clamped to the buffer.
fn pixel_span(buf: &PixelBuffer, rect: Rect) -> Option<(u32, u32, u32, u32)> {
    if buf.width() == 0 || buf.height() == 0 || !rect.is_finite() {
        return None;
    }
    let x0 = rect.min.x.floor().max(0.0);
    let y0 = rect.min.y.floor().max(0.0);
    let x1 = rect.max.x.ceil().min((buf.width() - 1) as f32);
    let y1 = rect.max.y.ceil().min((buf.height() - 1) as f32);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

fn paint_fill(buf: &mut PixelBuffer, shape: &Shape) {
    let (Some(fill), Some(bounds)) = (shape.fill(), shape.corner_rect()) else {
        return;
    };
    let rgba = fill.to_srgba_unmultiplied();
    let Some((x0, y0, x1, y1)) = pixel_span(buf, bounds) else {
        return;
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            if shape.contains(Pos2::new(x as f32, y as f32)) {
                buf.blend(x, y, rgba);
            }
        }
    }
}

fn paint_outline(buf: &mut PixelBuffer, shape: &Shape) {
    let rgba = shape.stroke_color().to_srgba_unmultiplied();
    match shape.kind() {
        ShapeKind::Stroke(points) => paint_polyline(buf, points, shape.width(), rgba),
        ShapeKind::Line { start, end } => paint_polyline(buf, &[*start, *end], shape.width(), rgba),
        ShapeKind::Rectangle { .. } | ShapeKind::Ellipse { .. } => {
            paint_closed_outline(buf, shape, rgba)
        }
    }
}

/// Thick polyline as a union of capsules.
fn paint_polyline(buf: &mut PixelBuffer, points: &[Pos2], width: u32, rgba: [u8; 4]) {
    // Never thinner than half a pixel, or diagonal lines would leak.
    let radius = (width as f32 / 2.0).max(0.5);
    let segments: Vec<(Pos2, Pos2)> = match points {
        [] => return,
        [single] => vec![(*single, *single)],
        _ => points.windows(2).map(|pair| (pair[0], pair[1])).collect(),
    };
    for (a, b) in segments {
        let bounds = Rect::from_two_pos(a, b).expand(radius);
        let Some((x0, y0, x1, y1)) = pixel_span(buf, bounds) else {
            continue;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Pos2::new(x as f32, y as f32);
                if geometry::distance_to_line_segment(p, a, b) <= radius {
                    buf.blend(x, y, rgba);
                }
            }
        }
    }
}

/// Outline drawn inward from the bounds. Any inside pixel with a 4-neighbour
/// outside the shape is part of the outline, so the wall is always closed
/// for a 4-connected fill.
fn paint_closed_outline(buf: &mut PixelBuffer, shape: &Shape, rgba: [u8; 4]) {
    let Some(bounds) = shape.corner_rect() else {
        return;
    };
    let width = shape.width() as f32;
    let Some((x0, y0, x1, y1)) = pixel_span(buf, bounds) else {
        return;
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            let (fx, fy) = (x as f32, y as f32);
            let p = Pos2::new(fx, fy);
            if !shape.contains(p) {
                continue;
            }
            let near_border = shape
                .inner_border_distance(p)
                .is_some_and(|d| d < width);
            let on_edge = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)]
                .iter()
                .any(|(dx, dy)| !shape.contains(Pos2::new(fx + dx, fy + dy)));
            if near_border || on_edge {
                buf.blend(x, y, rgba);
            }
        }
    }
}
