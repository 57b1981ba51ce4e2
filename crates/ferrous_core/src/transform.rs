//! World-space transform: position, rotation (quaternion), scale.
//!
//! Placement code builds one `Transform` per instance and hands the result
//! of [`Transform::matrix`] to the instance store.

use glam::{Mat4, Quat, Vec3};

/// Position / rotation / scale triple.
///
/// # Example
/// ```rust,ignore
/// use ferrous_core::Transform;
/// use glam::Vec3;
///
/// let t = Transform::from_position(Vec3::new(4.0, 0.0, 2.0)).with_uniform_scale(0.5);
/// store.set_instance(mesh, cell, t.matrix());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Unit quaternion.
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Pose at `position` whose forward axis (`−Z`) points at `target`.
    ///
    /// Falls back to the identity rotation when `target == position`.
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let dir = (target - position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return Self::from_position(position);
        }
        // look_at_rh builds world → view; its inverse rotation is the pose.
        let (_, view_rot, _) = Mat4::look_at_rh(position, target, up).to_scale_rotation_translation();
        Self::from_position_rotation(position, view_rot.inverse())
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, s: f32) -> Self {
        self.with_scale(Vec3::splat(s))
    }

    /// `T * R * S` world matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate by `angle` radians around a world-space axis.
    pub fn rotate_axis(&mut self, axis: Vec3, angle: f32) {
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.rotate_axis(Vec3::Y, angle);
    }

    /// `−Z` rotated into world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        assert!(Transform::default().matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn trs_order_scales_before_translating() {
        let t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0)).with_uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn looking_at_points_forward_at_target() {
        let t = Transform::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::Y);
        assert!((t.forward() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn looking_at_self_keeps_identity() {
        let t = Transform::looking_at(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(t.rotation, Quat::IDENTITY);
    }
}
