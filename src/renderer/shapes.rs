//! Quad generation and field-to-screen mapping

use glam::Vec2;

use super::vertex::Vertex;
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::sim::Aabb;

/// Maps field coordinates (top-left origin, y down) into normalized device
/// coordinates, letterboxing so the field keeps its aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Fraction of the NDC extent the field covers on each axis
    scale: Vec2,
}

impl Letterbox {
    pub fn new(width: u32, height: u32) -> Self {
        let viewport_aspect = width.max(1) as f32 / height.max(1) as f32;
        let field_aspect = FIELD_WIDTH / FIELD_HEIGHT;
        let scale = if viewport_aspect > field_aspect {
            // Wider than the field: bars left and right
            Vec2::new(field_aspect / viewport_aspect, 1.0)
        } else {
            // Taller: bars top and bottom
            Vec2::new(1.0, viewport_aspect / field_aspect)
        };
        Self { scale }
    }

    pub fn to_ndc(&self, p: Vec2) -> [f32; 2] {
        let x = (p.x / FIELD_WIDTH) * 2.0 - 1.0;
        let y = 1.0 - (p.y / FIELD_HEIGHT) * 2.0;
        [x * self.scale.x, y * self.scale.y]
    }
}

/// Two triangles covering `rect`, optionally mirrored
pub fn quad(rect: &Aabb, color: [f32; 4], flip_x: bool, letterbox: &Letterbox) -> [Vertex; 6] {
    let min = rect.min;
    let max = rect.max();
    let (u0, u1) = if flip_x { (1.0, 0.0) } else { (0.0, 1.0) };

    let tl = Vertex::new(letterbox.to_ndc(min), [u0, 0.0], color);
    let tr = Vertex::new(letterbox.to_ndc(Vec2::new(max.x, min.y)), [u1, 0.0], color);
    let bl = Vertex::new(letterbox.to_ndc(Vec2::new(min.x, max.y)), [u0, 1.0], color);
    let br = Vertex::new(letterbox.to_ndc(max), [u1, 1.0], color);

    [tl, bl, tr, tr, bl, br]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5
    }

    #[test]
    fn test_exact_aspect_fills_screen() {
        let lb = Letterbox::new(400, 800);
        assert!(close(lb.to_ndc(Vec2::ZERO), [-1.0, 1.0]));
        assert!(close(lb.to_ndc(Vec2::new(FIELD_WIDTH, FIELD_HEIGHT)), [1.0, -1.0]));
    }

    #[test]
    fn test_wide_viewport_pillarboxes() {
        let lb = Letterbox::new(1600, 800);
        // Field is a quarter of the width
        assert!(close(lb.to_ndc(Vec2::ZERO), [-0.25, 1.0]));
        assert!(close(lb.to_ndc(Vec2::new(FIELD_WIDTH, FIELD_HEIGHT)), [0.25, -1.0]));
    }

    #[test]
    fn test_tall_viewport_letterboxes() {
        let lb = Letterbox::new(400, 1600);
        assert!(close(lb.to_ndc(Vec2::ZERO), [-1.0, 0.5]));
    }

    #[test]
    fn test_zero_size_viewport_is_finite() {
        let lb = Letterbox::new(0, 0);
        let p = lb.to_ndc(Vec2::new(100.0, 100.0));
        assert!(p[0].is_finite() && p[1].is_finite());
    }

    #[test]
    fn test_flipped_quad_swaps_u() {
        let lb = Letterbox::new(400, 800);
        let rect = Aabb::new(10.0, 600.0, 50.0, 50.0);
        let plain = quad(&rect, [1.0; 4], false, &lb);
        let flipped = quad(&rect, [1.0; 4], true, &lb);
        assert_eq!(plain[0].uv, [0.0, 0.0]);
        assert_eq!(flipped[0].uv, [1.0, 0.0]);
        assert_eq!(plain[0].position, flipped[0].position);
    }
}
