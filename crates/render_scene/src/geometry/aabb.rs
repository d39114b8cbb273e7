//! Axis-aligned bounding boxes

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its min and max corners
    pub fn from_points(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from a center and half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents of the box
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The box enclosing this box after an affine transform.
    ///
    /// The center moves through the full matrix; the extents grow by the
    /// absolute values of the linear part, which keeps the result tight
    /// for rotation-free transforms and conservative otherwise.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let center = self.center();
        let half = self.half_extents();

        let new_center = m.transform_point(&Point3::from(center));
        let new_half = Vec3::new(
            half.x * m[(0, 0)].abs() + half.y * m[(0, 1)].abs() + half.z * m[(0, 2)].abs(),
            half.x * m[(1, 0)].abs() + half.y * m[(1, 1)].abs() + half.z * m[(1, 2)].abs(),
            half.x * m[(2, 0)].abs() + half.y * m[(2, 1)].abs() + half.z * m[(2, 2)].abs(),
        );

        Self::from_center_half_extents(new_center.coords, new_half)
    }
}
