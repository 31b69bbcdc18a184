use egui::{Pos2, Rect, Vec2};

/// Closest point on a segment to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Index of the segment within its polyline
    pub segment: usize,
    /// Projection of the query point onto the segment
    pub projection: Pos2,
    /// Direction of the segment (end - start), not normalized
    pub direction: Vec2,
    /// Distance from the query point to the projection
    pub distance: f32,
}

impl SegmentHit {
    /// Unit normal of the segment, `(-dy, dx) / len`.
    pub fn normal(&self) -> Vec2 {
        let len = self.direction.length();
        Vec2::new(-self.direction.y / len, self.direction.x / len)
    }
}

/// Project `point` onto segment `a`-`b`. Zero-length segments have no projection.
pub fn project_onto_segment(point: Pos2, a: Pos2, b: Pos2) -> Option<(Pos2, f32)> {
    let dir = b - a;
    let len_sq = dir.length_sq();
    if len_sq == 0.0 {
        return None;
    }
    let t = ((point - a).dot(dir) / len_sq).clamp(0.0, 1.0);
    let projection = a + dir * t;
    Some((projection, point.distance(projection)))
}

/// Calculate distance from a point to a line segment
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    project_onto_segment(point, line_start, line_end)
        .map(|(_, distance)| distance)
        .unwrap_or_else(|| point.distance(line_start))
}

/// Nearest segment of a polyline, skipping degenerate segments.
pub fn nearest_segment(point: Pos2, polyline: &[Pos2]) -> Option<SegmentHit> {
    let mut best: Option<SegmentHit> = None;
    for (segment, pair) in polyline.windows(2).enumerate() {
        let Some((projection, distance)) = project_onto_segment(point, pair[0], pair[1]) else {
            continue;
        };
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(SegmentHit {
                segment,
                projection,
                direction: pair[1] - pair[0],
                distance,
            });
        }
    }
    best
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Inclusive containment in the ellipse inscribed in `bounds`.
pub fn ellipse_contains(bounds: Rect, point: Pos2) -> bool {
    let rx = bounds.width() / 2.0;
    let ry = bounds.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        // Degenerate ellipses collapse onto their bounding segment.
        return bounds.contains(point);
    }
    let c = bounds.center();
    let nx = (point.x - c.x) / rx;
    let ny = (point.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Approximate distance from an inside point to the border of `bounds`.
pub fn rect_inner_distance(bounds: Rect, point: Pos2) -> f32 {
    let dx = (point.x - bounds.min.x).min(bounds.max.x - point.x);
    let dy = (point.y - bounds.min.y).min(bounds.max.y - point.y);
    dx.min(dy)
}

/// Approximate signed distance to the ellipse inscribed in `bounds`
/// (negative inside).
pub fn ellipse_signed_distance(bounds: Rect, point: Pos2) -> f32 {
    let rx = bounds.width() / 2.0;
    let ry = bounds.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return -rect_inner_distance(bounds, point);
    }
    let c = bounds.center();
    let px = point.x - c.x;
    let py = point.y - c.y;
    let nx = px / rx;
    let ny = py / ry;
    let len = (nx * nx + ny * ny).sqrt();
    if len < 1e-8 {
        return -rx.min(ry);
    }
    // Normalize to circle space, then scale by the gradient length.
    let scale = (rx * rx * ny * ny + ry * ry * nx * nx).sqrt() / (rx * ry * len);
    (len - 1.0) / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_distance_to_segment() {
        let d = distance_to_line_segment(pos2(50.0, 3.0), pos2(0.0, 0.0), pos2(100.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5);

        // Beyond the end point the distance is to the end point.
        let d = distance_to_line_segment(pos2(103.0, 4.0), pos2(0.0, 0.0), pos2(100.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_segment_skips_degenerate() {
        let polyline = [pos2(0.0, 0.0), pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(10.0, 10.0)];
        let hit = nearest_segment(pos2(12.0, 5.0), &polyline).unwrap();
        assert_eq!(hit.segment, 2);
        assert_eq!(hit.projection, pos2(10.0, 5.0));
        assert!((hit.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_normal_is_unit_and_perpendicular() {
        let hit = nearest_segment(pos2(5.0, 1.0), &[pos2(0.0, 0.0), pos2(10.0, 0.0)]).unwrap();
        let n = hit.normal();
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.dot(hit.direction).abs() < 1e-5);
    }

    #[test]
    fn test_ellipse_contains_excludes_corners() {
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 50.0));
        assert!(ellipse_contains(bounds, pos2(50.0, 25.0)));
        assert!(ellipse_contains(bounds, pos2(0.0, 25.0)));
        assert!(!ellipse_contains(bounds, pos2(2.0, 2.0)));
    }

    #[test]
    fn test_ellipse_signed_distance_sign() {
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(ellipse_signed_distance(bounds, pos2(50.0, 50.0)) < 0.0);
        assert!((ellipse_signed_distance(bounds, pos2(50.0, 5.0)) + 5.0).abs() < 0.5);
        assert!(ellipse_signed_distance(bounds, pos2(1.0, 1.0)) > 0.0);
    }
}
