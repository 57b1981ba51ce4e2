//! CPU frustum culling for instanced meshes.
//!
//! | File         | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | `aabb.rs`    | Center/extents box + conservative affine transform        |
//! | `frustum.rs` | Plane extraction, `CameraSource`, pose-cached tracker     |
//! | `visible.rs` | Pre-sized append buffer shared by culling workers         |
//! | `kernel.rs`  | Per-instance test and the data-parallel segment pass      |

mod aabb;
mod frustum;
mod kernel;
mod visible;

pub use aabb::Aabb;
pub use frustum::{CameraSource, Frustum, FrustumTracker, Plane};
pub use kernel::{cull_segment, is_instance_visible};
pub use visible::{VisibleList, VisibleWriter};
