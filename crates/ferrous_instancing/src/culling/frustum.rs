//! Frustum planes from a view-projection matrix, plus a tracker that only
//! re-extracts them when the camera pose changes.
//!
//! ## Algorithm
//!
//! For a combined `view_proj` matrix `M` with rows `r0..r3`, a world-space
//! point `p` is inside the clip volume when each of `r3 ± r0`, `r3 ± r1`
//! and `r3 ± r2` dotted with `(p, 1)` is non-negative (Gribb-Hartmann).
//! Each combination is a plane `(nx, ny, nz, d)`; dividing by `|n|` makes
//! `dot(n, p) + d` a metric signed distance comparable to box extents.

use ferrous_core::Camera;
use glam::{Mat4, Quat, Vec3, Vec4};

use crate::culling::Aabb;

/// `dot(normal, p) + distance >= 0` on the visible side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plane {
    /// Unit length after [`Plane::from_coefficients`].
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    #[inline]
    pub const fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Normalises raw `(a, b, c, d)` coefficients by the normal's length.
    ///
    /// A zero normal yields non-finite components; such a plane compares
    /// false against everything and therefore never culls.
    #[inline]
    pub fn from_coefficients(v: Vec4) -> Self {
        let inv_len = v.truncate().length_recip();
        Self {
            normal: v.truncate() * inv_len,
            distance: v.w * inv_len,
        }
    }

    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// `true` if the whole box lies strictly on the negative side.
    #[inline]
    pub fn rejects(&self, aabb: &Aabb) -> bool {
        let projected_extent = (aabb.extents * self.normal).abs().element_sum();
        self.signed_distance(aabb.center) + projected_extent < 0.0
    }
}

/// Six world-space planes: left, right, bottom, top, near, far.
///
/// The default frustum has all-zero planes and rejects nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    /// Extracted as `r3 + r2`. glam projections map depth to [0, 1], so this
    /// plane sits at about `znear / 2` and the near test is looser than the
    /// true near plane.
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;

    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// `false` only if some plane has the entire box on its negative side.
    ///
    /// Conservative: boxes straddling a frustum corner outside the volume
    /// may still report visible.
    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        // Early-out on the first rejecting plane.
        !self.planes.iter().any(|p| p.rejects(aabb))
    }

    /// Index of the first plane that rejects `aabb`, if any.
    pub fn rejecting_plane(&self, aabb: &Aabb) -> Option<usize> {
        self.planes.iter().position(|p| p.rejects(aabb))
    }
}

// ── Camera seam ──────────────────────────────────────────────────────────────

/// What the orchestrator needs from the scene's active camera.
pub trait CameraSource {
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn view_projection(&self) -> Mat4;
}

impl CameraSource for Camera {
    fn position(&self) -> Vec3 {
        Camera::position(self)
    }

    fn rotation(&self) -> Quat {
        Camera::rotation(self)
    }

    fn view_projection(&self) -> Mat4 {
        self.build_view_projection_matrix()
    }
}

// ── Tracker ──────────────────────────────────────────────────────────────────

/// Caches the frustum together with the camera pose it was built from.
#[derive(Debug, Clone, Default)]
pub struct FrustumTracker {
    frustum: Frustum,
    pose: Option<(Vec3, Quat)>,
}

impl FrustumTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Re-extracts the planes if the camera moved or rotated since the last
    /// refresh (or if none happened yet). Returns whether it recomputed.
    ///
    /// Projection-only changes such as a new aspect ratio do not alter the
    /// pose; call [`invalidate`](Self::invalidate) after those.
    pub fn refresh<C: CameraSource + ?Sized>(&mut self, camera: &C) -> bool {
        let pose = (camera.position(), camera.rotation());
        if self.pose == Some(pose) {
            return false;
        }
        self.frustum = Frustum::from_view_projection(&camera.view_projection());
        self.pose = Some(pose);
        log::trace!("frustum re-extracted at {:?}", pose.0);
        true
    }

    /// Forces the next [`refresh`](Self::refresh) to recompute.
    pub fn invalidate(&mut self) {
        self.pose = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_camera() -> Camera {
        // Origin, looking down +Z, 90° vertical FOV, far plane at 500.
        Camera::looking_at(Vec3::ZERO, Vec3::Z).with_projection(90f32.to_radians(), 1.0, 0.1, 500.0)
    }

    #[test]
    fn plane_normalization() {
        let p = Plane::from_coefficients(Vec4::new(3.0, 4.0, 0.0, 10.0));
        assert!((p.normal - Vec3::new(0.6, 0.8, 0.0)).length() < 1e-6);
        assert!((p.distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn extracted_normals_are_unit_length() {
        let f = Frustum::from_view_projection(&forward_camera().build_view_projection_matrix());
        for p in &f.planes {
            assert!((p.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn box_ahead_is_visible() {
        let f = Frustum::from_view_projection(&forward_camera().build_view_projection_matrix());
        let b = Aabb::new(Vec3::new(0.0, 0.0, 100.0), Vec3::ONE);
        assert!(f.intersects_aabb(&b));
        assert_eq!(f.rejecting_plane(&b), None);
    }

    #[test]
    fn box_far_to_the_side_is_culled_by_a_side_plane() {
        let f = Frustum::from_view_projection(&forward_camera().build_view_projection_matrix());
        let b = Aabb::new(Vec3::new(1000.0, 0.0, 50.0), Vec3::ONE);
        assert!(!f.intersects_aabb(&b));
        let plane = f.rejecting_plane(&b).unwrap();
        assert!(plane == Frustum::LEFT || plane == Frustum::RIGHT);
    }

    #[test]
    fn each_face_rejects_with_its_own_plane() {
        let cam = forward_camera();
        let f = Frustum::from_view_projection(&cam.build_view_projection_matrix());
        let eye = cam.position();
        let ahead = eye + cam.transform.forward() * 50.0;
        let right = cam.transform.right() * 1000.0;
        let up = cam.transform.up() * 1000.0;
        let point = |p: Vec3| Aabb::new(p, Vec3::ZERO);

        assert_eq!(f.rejecting_plane(&point(ahead - right)), Some(Frustum::LEFT));
        assert_eq!(f.rejecting_plane(&point(ahead + right)), Some(Frustum::RIGHT));
        assert_eq!(f.rejecting_plane(&point(ahead - up)), Some(Frustum::BOTTOM));
        assert_eq!(f.rejecting_plane(&point(ahead + up)), Some(Frustum::TOP));
        // In front of the eye but short of znear / 2.
        assert_eq!(
            f.rejecting_plane(&point(eye + cam.transform.forward() * 0.01)),
            Some(Frustum::NEAR)
        );
        assert_eq!(
            f.rejecting_plane(&point(eye + cam.transform.forward() * 900.0)),
            Some(Frustum::FAR)
        );
    }

    #[test]
    fn box_behind_and_beyond_far_are_culled() {
        let f = Frustum::from_view_projection(&forward_camera().build_view_projection_matrix());
        assert!(!f.intersects_aabb(&Aabb::new(Vec3::new(0.0, 0.0, -50.0), Vec3::ONE)));
        assert_eq!(
            f.rejecting_plane(&Aabb::new(Vec3::new(0.0, 0.0, 900.0), Vec3::ONE)),
            Some(Frustum::FAR)
        );
    }

    #[test]
    fn box_straddling_a_plane_is_kept() {
        let f = Frustum::from_view_projection(&forward_camera().build_view_projection_matrix());
        // Center just past the far plane, extents reaching back inside.
        assert!(f.intersects_aabb(&Aabb::new(Vec3::new(0.0, 0.0, 505.0), Vec3::splat(10.0))));
    }

    #[test]
    fn default_frustum_rejects_nothing() {
        let f = Frustum::default();
        assert!(f.intersects_aabb(&Aabb::new(Vec3::splat(1e6), Vec3::ZERO)));
    }

    #[test]
    fn degenerate_plane_never_culls() {
        let p = Plane::from_coefficients(Vec4::ZERO);
        assert!(!p.rejects(&Aabb::new(Vec3::new(5.0, -3.0, 2.0), Vec3::ONE)));
    }

    #[test]
    fn tracker_reuses_planes_until_pose_changes() {
        let mut cam = forward_camera();
        let mut tracker = FrustumTracker::new();
        assert!(tracker.refresh(&cam));
        let first = *tracker.frustum();
        assert!(!tracker.refresh(&cam));
        assert_eq!(*tracker.frustum(), first);

        cam.transform.translate(Vec3::new(0.0, 0.0, 5.0));
        assert!(tracker.refresh(&cam));
        assert_ne!(*tracker.frustum(), first);

        cam.transform.rotate_y(0.25);
        assert!(tracker.refresh(&cam));
    }

    #[test]
    fn invalidate_forces_recompute() {
        let mut cam = forward_camera();
        let mut tracker = FrustumTracker::new();
        tracker.refresh(&cam);
        cam.set_aspect(0.25);
        assert!(!tracker.refresh(&cam));
        tracker.invalidate();
        assert!(tracker.refresh(&cam));
    }
}
