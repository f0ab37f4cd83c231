//! Axis-aligned bounding-box overlap
//!
//! The only physics in the game. Touching edges do not count as a hit, so a
//! blade that grazes the ninja's outline is a near miss, not a death.

use glam::Vec2;

/// Axis-aligned box, top-left origin (field y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// True when every coordinate is finite and the extents are not negative
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.size.is_finite() && self.size.x >= 0.0 && self.size.y >= 0.0
    }

    /// Strict overlap test (shared edges are not an overlap)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }
}

/// Overlap test that tolerates a malformed operand
///
/// A box with non-finite or negative geometry is reported and counted as a
/// miss; it never stalls the tick.
pub fn hit_test(a: &Aabb, b: &Aabb) -> bool {
    if !a.is_valid() || !b.is_valid() {
        log::warn!("Ignoring collision with malformed bounds: {:?} vs {:?}", a, b);
        return false;
    }
    a.overlaps(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Aabb::new(0.0, 0.0, 50.0, 50.0);
        let b = Aabb::new(40.0, 40.0, 40.0, 40.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::new(0.0, 0.0, 50.0, 50.0);
        let right = Aabb::new(50.0, 0.0, 40.0, 40.0);
        let below = Aabb::new(0.0, 50.0, 40.0, 40.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_separated() {
        let ninja = Aabb::new(10.0, 600.0, 50.0, 50.0);
        let blade = Aabb::new(360.0, 600.0, 40.0, 40.0);
        assert!(!ninja.overlaps(&blade));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = Aabb::new(0.0, 0.0, 100.0, 100.0);
        let inner = Aabb::new(10.0, 10.0, 5.0, 5.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_malformed_operand_is_a_miss() {
        let a = Aabb::new(0.0, 0.0, 50.0, 50.0);
        let nan = Aabb::new(f32::NAN, 0.0, 50.0, 50.0);
        let inverted = Aabb::new(0.0, 0.0, -10.0, 50.0);
        assert!(hit_test(&a, &a));
        assert!(!hit_test(&a, &nan));
        assert!(!hit_test(&inverted, &a));
        let infinite = Aabb::new(0.0, f32::INFINITY, 50.0, 50.0);
        assert!(!hit_test(&infinite, &a));
    }
}
