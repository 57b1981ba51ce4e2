use glam::{Mat4, Quat, Vec3};

use crate::transform::Transform;

/// Perspective camera: a world-space pose plus projection parameters.
///
/// The pose is kept as position + quaternion rather than eye/target so that
/// consumers can cheaply detect whether the camera moved or rotated between
/// frames by comparing the two fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // --- pose -------------------------------------------------------------
    pub transform: Transform,
    // --- projection -------------------------------------------------------
    /// Vertical field of view in radians.
    pub fovy: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            fovy: 60.0f32.to_radians(),
            aspect: 16.0 / 9.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    /// Camera at `eye` facing `target`, default projection.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            transform: Transform::looking_at(eye, target, Vec3::Y),
            ..Self::default()
        }
    }

    pub fn with_projection(mut self, fovy: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        self.fovy = fovy;
        self.aspect = aspect;
        self.znear = znear;
        self.zfar = zfar;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// World → view. Scale on the camera transform is ignored.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.transform.rotation, self.transform.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Combined `projection * view`.
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update aspect ratio after a viewport resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Place the camera on a circle of `radius` around `center` at `height`,
    /// `angle` radians from `+X`, facing `center`.
    pub fn orbit(&mut self, center: Vec3, radius: f32, height: f32, angle: f32) {
        let eye = center + Vec3::new(radius * angle.cos(), height, radius * angle.sin());
        self.transform = Transform::looking_at(eye, center, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ahead_lands_in_clip_volume() {
        let cam = Camera::looking_at(Vec3::ZERO, Vec3::Z);
        let clip = cam.build_view_projection_matrix() * Vec3::new(0.0, 0.0, 50.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn orbit_faces_center() {
        let mut cam = Camera::default();
        cam.orbit(Vec3::ZERO, 10.0, 0.0, 0.0);
        assert!((cam.position() - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
        assert!((cam.transform.forward() - Vec3::NEG_X).length() < 1e-5);
    }
}
