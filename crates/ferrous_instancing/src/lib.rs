/// `ferrous_instancing` — fixed-capacity GPU instance management with
/// per-frame parallel frustum culling.
///
/// # Module layout
///
/// | Module     | Responsibility                                              |
/// |------------|-------------------------------------------------------------|
/// | `ids`      | `MeshId`, `CellId`, `MeshHandle`, `MaterialHandle`          |
/// | `config`   | `InstancingConfig` + `RenderParams` (serde)                 |
/// | `error`    | `InstanceError`, `ConfigError`                              |
/// | `store`    | `InstanceStore` — arena + bidirectional cell/slot maps      |
/// | `culling`  | `Aabb`, `Frustum`, `FrustumTracker`, `VisibleList`, kernel  |
/// | `backend`  | `DrawRequest` + `RenderBackend` seam to the GPU side        |
/// | `renderer` | `InstanceRenderer` — per-frame orchestration (`tick`)       |
///
/// # Frame flow
///
/// ```text
/// tick ─► FrustumTracker::refresh (only if the camera pose changed)
///      └► for each mesh with active instances:
///            cull_segment (rayon) ─► VisibleList ─► RenderBackend::draw_instanced
/// ```
pub mod backend;
pub mod config;
pub mod culling;
pub mod error;
pub mod ids;
pub mod renderer;
pub mod store;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use backend::{DrawRequest, RecordingBackend, RecordedDraw, RenderBackend};
pub use config::{InstancingConfig, RenderParams, ShadowCasting};
pub use culling::{cull_segment, Aabb, CameraSource, Frustum, FrustumTracker, Plane, VisibleList};
pub use error::{ConfigError, InstanceError};
pub use ids::{CellId, MaterialHandle, MeshHandle, MeshId};
pub use renderer::{FrameStats, InstanceRenderer, MeshEntry, RendererStats};
pub use store::InstanceStore;

pub use glam;
