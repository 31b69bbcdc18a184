use egui::{Pos2, Rect, Vec2};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 16.0;

/// Maps logical document coordinates to screen points and back.
/// Offset plus uniform scale; no rotation or flipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen position of the document's top-left corner
    pub origin: Pos2,
    zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn new(origin: Pos2, zoom: f32) -> Self {
        Self {
            origin,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Screen point to document coordinates
    pub fn to_document(&self, screen: Pos2) -> Pos2 {
        Pos2::ZERO + (screen - self.origin) / self.zoom
    }

    /// Document coordinates to screen point
    pub fn to_screen(&self, document: Pos2) -> Pos2 {
        self.origin + document.to_vec2() * self.zoom
    }

    /// Screen rectangle covered by a document of `size`.
    pub fn document_rect(&self, size: Vec2) -> Rect {
        Rect::from_min_size(self.origin, size * self.zoom)
    }

    /// Scale by `factor` keeping the document point under `screen_center`
    /// in the same spot on screen.
    ///
    /// Returns how far the origin moved. A view whose origin is owned by a
    /// scroll container must scroll its content by this much.
    pub fn zoom_about(&mut self, screen_center: Pos2, factor: f32) -> Vec2 {
        let anchor = self.to_document(screen_center);
        let before = self.origin;
        self.set_zoom(self.zoom * factor);
        self.origin = screen_center - anchor.to_vec2() * self.zoom;
        self.origin - before
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.origin += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn test_round_trip() {
        let view = ViewTransform::new(pos2(30.0, -12.0), 2.5);
        let p = pos2(17.0, 4.0);
        let back = view.to_document(view.to_screen(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewTransform::default();
        view.set_zoom(100.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.set_zoom(0.0);
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_about_keeps_anchor() {
        let mut view = ViewTransform::new(pos2(10.0, 10.0), 1.0);
        let center = pos2(110.0, 60.0);
        let before = view.to_document(center);
        view.zoom_about(center, 2.0);
        assert_eq!(view.zoom(), 2.0);
        assert!((view.to_document(center) - before).length() < 1e-4);
        assert_eq!(view.document_rect(vec2(10.0, 10.0)).width(), 20.0);
    }

    #[test]
    fn test_zoom_shift_restores_anchor_after_relayout() {
        let mut view = ViewTransform::new(pos2(10.0, 10.0), 1.0);
        let layout_origin = view.origin;
        let center = pos2(110.0, 60.0);
        let anchor = view.to_document(center);

        let shift = view.zoom_about(center, 2.0);
        assert_eq!(shift, vec2(-100.0, -50.0));

        // Next frame the layout puts the canvas back at its old spot; the
        // scroll container moves it by the shift.
        view.origin = layout_origin + shift;
        assert!((view.to_document(center) - anchor).length() < 1e-4);

        // At the zoom limit nothing moves.
        let mut max = ViewTransform::new(pos2(0.0, 0.0), MAX_ZOOM);
        assert_eq!(max.zoom_about(center, 2.0), Vec2::ZERO);
    }
}
