//! Per-instance visibility test and the data-parallel pass over one mesh
//! segment.
//!
//! Instances are independent, so the segment is split across the rayon
//! pool in chunks of at least `batch_size`; visible matrices are appended
//! to a shared [`VisibleList`] without ordering. The call returns only
//! once every chunk has finished.

use glam::Mat4;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::culling::{Aabb, Frustum, VisibleList};

/// `true` unless the instance's world box is fully outside some plane.
#[inline]
pub fn is_instance_visible(local_bounds: &Aabb, matrix: &Mat4, frustum: &Frustum) -> bool {
    frustum.intersects_aabb(&local_bounds.transformed(matrix))
}

/// Appends every visible matrix of `matrices` to `out`; returns how many.
///
/// # Panics
/// If `out` has less room left than `matrices.len()` (the worst case).
pub fn cull_segment(
    local_bounds: &Aabb,
    matrices: &[Mat4],
    frustum: &Frustum,
    batch_size: usize,
    out: &mut VisibleList,
) -> usize {
    if matrices.is_empty() {
        return 0;
    }
    assert!(
        out.remaining() >= matrices.len(),
        "visible list has room for {} of {} instances",
        out.remaining(),
        matrices.len()
    );

    let before = out.len();
    {
        let writer = out.writer();

        #[cfg(not(target_arch = "wasm32"))]
        matrices
            .par_iter()
            .with_min_len(batch_size.max(1))
            .for_each(|m| {
                if is_instance_visible(local_bounds, m, frustum) {
                    writer.push(*m);
                }
            });

        // No thread pool in the browser; same test, one thread.
        #[cfg(target_arch = "wasm32")]
        {
            let _ = batch_size;
            for m in matrices {
                if is_instance_visible(local_bounds, m, frustum) {
                    writer.push(*m);
                }
            }
        }
    }
    out.len() - before
}
