//! Axis-aligned bounds for vertex sets.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any included point will replace.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// Bounds of a point set, or a zero box when empty.
    pub fn from_points(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let mut bounds = Self::empty();
        for &p in points {
            bounds.include_point(p);
        }
        bounds
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Express `point` in box-relative coordinates (min = 0, max = 1).
    ///
    /// Flat axes (zero extent) map to 0.
    pub fn normalize_point(&self, point: Vec3) -> Vec3 {
        let size = self.size();
        let rel = point - self.min;
        Vec3::new(
            if size.x > 0.0 { rel.x / size.x } else { 0.0 },
            if size.y > 0.0 { rel.y / size.y } else { 0.0 },
            if size.z > 0.0 { rel.z / size.z } else { 0.0 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bounds = Aabb::from_points(&[
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, -2.0, 0.0),
        ]);
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 0.0, 2.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, -1.0, 1.0));
        assert!(bounds.contains_point(Vec3::new(0.0, -1.0, 1.0)));
        assert!(!bounds.contains_point(Vec3::new(4.0, -1.0, 1.0)));
    }

    #[test]
    fn test_empty_points_give_zero_box() {
        assert_eq!(Aabb::from_points(&[]), Aabb::default());
    }

    #[test]
    fn test_normalize_point_flat_axis() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 4.0));
        let p = bounds.normalize_point(Vec3::new(1.0, 0.0, 1.0));
        assert!((p - Vec3::new(0.5, 0.0, 0.25)).length() < 1e-6);
    }
}
