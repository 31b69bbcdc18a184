//! Bucket fill over the hybrid vector + raster scene.
//!
//! One entry point, [`fill_at`], decides between recoloring a closed
//! primitive and flooding the raster paint layer, so callers never need to
//! know which path ran.

use egui::{Color32, Pos2};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::geometry::SegmentHit;
use crate::pixels::{FillMask, PixelBuffer};
use crate::rasterizer::{self, Composition};
use crate::shape::Shape;

pub const NEAR_PATH_TOLERANCE: f32 = 6.0;
pub const NUDGE_DISTANCE: f32 = 4.0;

/// When a click inside a rectangle or ellipse recolors the primitive itself
/// instead of flooding the raster layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeFillMode {
    /// Always flood the raster layer.
    RasterOnly,
    /// Recolor the topmost primitive under the click that already has a
    /// vector fill. Unfilled primitives are flooded like any other region.
    #[default]
    FilledShapes,
    /// Recolor the topmost rectangle or ellipse under the click.
    AllShapes,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillOptions {
    pub shape_mode: ShapeFillMode,
    /// Clicks this close to a pen stroke or line count as "near the path"
    pub near_path_tolerance: f32,
    /// How far past the stroke edge a seed sitting on a path is moved
    pub nudge_distance: f32,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            shape_mode: ShapeFillMode::default(),
            near_path_tolerance: NEAR_PATH_TOLERANCE,
            nudge_distance: NUDGE_DISTANCE,
        }
    }
}

/// Seed relocation applied when the click landed on a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nudge {
    pub clicked: Pos2,
    /// Nearest point on the path
    pub projection: Pos2,
    /// Effective seed used for the flood
    pub seed: Pos2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoFillReason {
    OutsideDocument,
    /// The region (or primitive) already has the fill color
    AlreadyFilled,
    /// The click sat on a path and neither side of it is on the canvas
    SeedOnWall,
}

/// What a fill did to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum FillOutcome {
    /// A rectangle or ellipse got a new vector fill
    ShapeFilled { index: usize },
    /// Pixels were painted into the raster layer
    Raster {
        seed: (u32, u32),
        painted: usize,
        nudge: Option<Nudge>,
    },
    Unchanged(NoFillReason),
}

impl FillOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, FillOutcome::Unchanged(_))
    }
}

/// Bucket-fill at a logical document point.
pub fn fill_at(
    document: &mut Document,
    at: Pos2,
    color: Color32,
    options: &FillOptions,
) -> FillOutcome {
    if !document.contains_point(at) {
        debug!("fill at {:?} ignored: outside the document", at);
        return FillOutcome::Unchanged(NoFillReason::OutsideDocument);
    }
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    let fill_rgba = [r, g, b, 255];
    let opaque = Color32::from_rgb(r, g, b);

    if let Some(index) = shape_target(document, at, options.shape_mode) {
        return fill_shape(document, index, opaque);
    }

    let scene = rasterizer::render(document, Composition::FillSource);

    let mut nudge = None;
    // The flood samples the pixel under the click, so a click just past the
    // stroke edge can still land on a stroke pixel.
    let seed_point = match near_path(document, at, options.near_path_tolerance) {
        Some((shape, hit, radius)) if hit.distance <= radius || covers_pixel(shape, at, radius) => {
            let Some(seed) = nudged_seed(&scene, at, &hit, radius, options.nudge_distance) else {
                debug!("fill at {:?} sits on a path with no room on either side", at);
                return FillOutcome::Unchanged(NoFillReason::SeedOnWall);
            };
            debug!(
                "fill seed nudged from {:?} to {:?} (projection {:?})",
                at, seed, hit.projection
            );
            nudge = Some(Nudge {
                clicked: at,
                projection: hit.projection,
                seed,
            });
            seed
        }
        _ => at,
    };

    let seed = (seed_point.x.floor() as u32, seed_point.y.floor() as u32);
    let Some(mask) = flood_mask(&scene, seed, fill_rgba) else {
        debug!("fill at {:?} is a no-op: region already has the fill color", seed);
        return FillOutcome::Unchanged(NoFillReason::AlreadyFilled);
    };

    let painted = mask.count();
    document.raster_layer_mut().paint_mask(&mask, opaque);
    debug!("raster fill from {:?} painted {} pixels", seed, painted);
    FillOutcome::Raster {
        seed,
        painted,
        nudge,
    }
}

/// Topmost rectangle/ellipse the click should recolor, if any.
fn shape_target(document: &Document, at: Pos2, mode: ShapeFillMode) -> Option<usize> {
    let candidates = document
        .shapes()
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, shape)| shape.is_closed() && shape.contains(at));
    match mode {
        ShapeFillMode::RasterOnly => None,
        ShapeFillMode::AllShapes => candidates.map(|(index, _)| index).next(),
        ShapeFillMode::FilledShapes => candidates
            .filter(|(_, shape)| shape.fill().is_some())
            .map(|(index, _)| index)
            .next(),
    }
}

fn fill_shape(document: &mut Document, index: usize, color: Color32) -> FillOutcome {
    let Some(shape) = document.shape_mut(index) else {
        return FillOutcome::Unchanged(NoFillReason::OutsideDocument);
    };
    if shape.fill() == Some(color) {
        return FillOutcome::Unchanged(NoFillReason::AlreadyFilled);
    }
    if shape.set_fill(Some(color)).is_err() {
        // Only closed shapes reach here.
        return FillOutcome::Unchanged(NoFillReason::SeedOnWall);
    }
    debug!("filled {} #{} directly", shape.kind().tag(), index);
    FillOutcome::ShapeFilled { index }
}

/// Nearest pen stroke or line segment within `tolerance`, with the
/// rasterized half-width of that path.
fn near_path(document: &Document, at: Pos2, tolerance: f32) -> Option<(&Shape, SegmentHit, f32)> {
    document
        .shapes()
        .iter()
        .filter(|shape| !shape.is_closed())
        .filter_map(|shape| {
            let hit = shape.nearest_segment(at)?;
            let radius = (shape.width() as f32 / 2.0).max(0.5);
            Some((shape, hit, radius))
        })
        .filter(|(_, hit, _)| hit.distance <= tolerance)
        .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
}

/// Whether `shape`'s rasterized path covers the pixel sampled for `point`.
/// Uses the same capsule rule as the rasterizer.
fn covers_pixel(shape: &Shape, point: Pos2, radius: f32) -> bool {
    let pixel = Pos2::new(point.x.floor(), point.y.floor());
    shape
        .nearest_segment(pixel)
        .is_some_and(|hit| hit.distance <= radius)
}

/// Move a seed that sits on a path off to one side of it, along the
/// segment normal. The side the click leans towards is tried first.
fn nudged_seed(
    scene: &PixelBuffer,
    clicked: Pos2,
    hit: &SegmentHit,
    radius: f32,
    nudge_distance: f32,
) -> Option<Pos2> {
    let normal = hit.normal();
    let side = if (clicked - hit.projection).dot(normal) < 0.0 {
        -1.0
    } else {
        1.0
    };
    let offset = nudge_distance.max(radius + 1.0);
    [side, -side].into_iter().find_map(|sign| {
        let seed = hit.projection + normal * (offset * sign);
        scene
            .in_bounds(seed.x.floor() as i64, seed.y.floor() as i64)
            .then_some(seed)
    })
}

/// 4-connected flood from `seed` over pixels equal to the seed's color.
///
/// Returns `None` when the seed is off the buffer or already has
/// `fill_rgba` (a fill there would change nothing).
pub fn flood_mask(scene: &PixelBuffer, seed: (u32, u32), fill_rgba: [u8; 4]) -> Option<FillMask> {
    let (w, h) = (scene.width(), scene.height());
    let target = scene.get(seed.0, seed.1)?;
    if target == fill_rgba {
        return None;
    }

    let mut mask = FillMask::new(w, h);
    // Explicit stack: regions can be the size of the whole canvas.
    let mut stack: Vec<(u32, u32)> = Vec::with_capacity(4096);
    mask.insert(seed.0, seed.1);
    stack.push(seed);

    while let Some((x, y)) = stack.pop() {
        let mut visit = |nx: u32, ny: u32| {
            if !mask.contains(nx, ny) && scene.get(nx, ny) == Some(target) {
                mask.insert(nx, ny);
                stack.push((nx, ny));
            }
        };
        if x > 0 {
            visit(x - 1, y);
        }
        if x + 1 < w {
            visit(x + 1, y);
        }
        if y > 0 {
            visit(x, y - 1);
        }
        if y + 1 < h {
            visit(x, y + 1);
        }
    }
    Some(mask)
}
