use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box stored as center + half-extents.
///
/// The center/extents form is what the plane test consumes directly, so
/// no min/max round trip happens on the hot path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    /// Half-size along each axis. Zero is allowed and degrades to a point.
    pub extents: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(center: Vec3, extents: Vec3) -> Self {
        Self { center, extents }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// `[-0.5, 0.5]³`, the bounds of a unit cube mesh.
    pub const fn unit_cube() -> Self {
        Self::new(Vec3::ZERO, Vec3::splat(0.5))
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// World-space box enclosing this local box under the affine `m`.
    ///
    /// The center goes through the full matrix. Each extent axis goes
    /// through the upper 3×3 only; summing the absolute components of the
    /// three transformed axes gives extents that always enclose the rotated
    /// and scaled box, at the cost of being looser than an exact fit.
    #[inline]
    pub fn transformed(&self, m: &Mat4) -> Self {
        let ax = (m.x_axis.truncate() * self.extents.x).abs();
        let ay = (m.y_axis.truncate() * self.extents.y).abs();
        let az = (m.z_axis.truncate() * self.extents.z).abs();
        Self {
            center: m.transform_point3(self.center),
            extents: ax + ay + az,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn min_max_round_trip() {
        let b = Aabb::from_min_max(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 6.0));
        assert_eq!(b.center, Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(b.extents, Vec3::splat(2.0));
        assert_eq!(b.min(), Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(b.max(), Vec3::new(3.0, 4.0, 6.0));
    }

    #[test]
    fn translation_and_scale() {
        let m = Mat4::from_scale_rotation_translation(Vec3::new(2.0, 1.0, 3.0), Quat::IDENTITY, Vec3::new(10.0, 0.0, 0.0));
        let w = Aabb::unit_cube().transformed(&m);
        assert!((w.center - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-6);
        assert!((w.extents - Vec3::new(1.0, 0.5, 1.5)).length() < 1e-6);
    }

    #[test]
    fn rotation_encloses_every_corner() {
        let local = Aabb::new(Vec3::new(0.5, 0.0, -1.0), Vec3::new(1.0, 2.0, 0.5));
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(1.5, 0.5, 2.0),
            Quat::from_euler(glam::EulerRot::XYZ, 0.3, 1.1, -0.7),
            Vec3::new(-4.0, 2.0, 9.0),
        );
        let w = local.transformed(&m);
        for i in 0..8 {
            let sign = Vec3::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            let corner = m.transform_point3(local.center + local.extents * sign);
            assert!(corner.cmpge(w.min() - 1e-4).all() && corner.cmple(w.max() + 1e-4).all());
        }
    }

    #[test]
    fn zero_extent_stays_a_point() {
        let m = Mat4::from_rotation_z(0.8) * Mat4::from_translation(Vec3::ONE);
        let w = Aabb::new(Vec3::ZERO, Vec3::ZERO).transformed(&m);
        assert_eq!(w.extents, Vec3::ZERO);
    }
}
