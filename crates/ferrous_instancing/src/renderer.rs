//! Per-frame driver tying the instance store, frustum tracker and culling
//! kernel together.
//!
//! ## Lifecycle
//!
//! ```text
//! init ─► (set_instance / remove_instance)* interleaved with tick per frame ─► shutdown
//! ```
//!
//! All buffers (arena, index maps, visible list) are allocated in `init`;
//! `tick` performs no allocation of its own.
//!
//! ## Threading
//!
//! `InstanceRenderer` lives on the control thread. Mutations take
//! `&mut self`, and so does `tick`, so the borrow checker already rules
//! out edits racing an in-flight culling pass. Inside `tick` the kernel
//! fans out over rayon and joins before the draw request is emitted.

use glam::Mat4;

use crate::backend::{DrawRequest, RenderBackend};
use crate::config::InstancingConfig;
use crate::culling::{cull_segment, Aabb, CameraSource, Frustum, FrustumTracker, VisibleList};
use crate::error::{ConfigError, InstanceError};
use crate::ids::{CellId, MaterialHandle, MeshHandle, MeshId};
use crate::store::InstanceStore;

/// Registry entry for one mesh type, indexed by [`MeshId`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshEntry {
    pub mesh: MeshHandle,
    /// Local-space bounds from the mesh asset.
    pub bounds: Aabb,
}

impl MeshEntry {
    pub fn new(mesh: MeshHandle, bounds: Aabb) -> Self {
        Self { mesh, bounds }
    }
}

/// What one [`InstanceRenderer::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frustum_refreshed: bool,
    /// Meshes with at least one active instance.
    pub meshes_culled: usize,
    pub instances_tested: usize,
    pub instances_visible: usize,
    pub draw_calls: usize,
}

/// Running totals since `init`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub frames: u64,
    pub frustum_refreshes: u64,
    pub draw_calls: u64,
    pub instances_tested: u64,
    pub instances_visible: u64,
    /// Active instances when the stats were read.
    pub live_instances: usize,
}

pub struct InstanceRenderer {
    config: InstancingConfig,
    meshes: Vec<MeshEntry>,
    material: MaterialHandle,
    store: InstanceStore,
    tracker: FrustumTracker,
    visible: VisibleList,
    last_frame: FrameStats,
    totals: RendererStats,
}

impl InstanceRenderer {
    /// Validates `config`, then allocates every buffer the renderer will
    /// ever use. `meshes[i]` describes `MeshId(i)`.
    pub fn init(
        config: InstancingConfig,
        meshes: Vec<MeshEntry>,
        material: MaterialHandle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if meshes.len() != config.mesh_count {
            return Err(ConfigError::RegistryMismatch {
                registered: meshes.len(),
                configured: config.mesh_count,
            });
        }

        let store = InstanceStore::new(
            config.mesh_count,
            config.per_mesh_capacity,
            config.effective_cell_capacity(),
        );
        let visible = VisibleList::with_capacity(config.per_mesh_capacity);

        log::info!(
            "instance renderer: {} meshes x {} slots ({} KiB arena), {} cells",
            config.mesh_count,
            config.per_mesh_capacity,
            config.arena_len() * std::mem::size_of::<Mat4>() / 1024,
            store.cell_capacity(),
        );

        Ok(Self {
            config,
            meshes,
            material,
            store,
            tracker: FrustumTracker::new(),
            visible,
            last_frame: FrameStats::default(),
            totals: RendererStats::default(),
        })
    }

    /// Releases all buffers and returns the lifetime totals.
    pub fn shutdown(self) -> RendererStats {
        let stats = self.stats();
        log::info!(
            "instance renderer shut down after {} frames, releasing {} instances",
            stats.frames,
            stats.live_instances
        );
        stats
    }

    // ── Instance management ───────────────────────────────────────────────────

    /// See [`InstanceStore::set_instance`].
    ///
    /// # Panics
    /// If `mesh` is full or either id is out of range.
    #[inline]
    pub fn set_instance(&mut self, mesh: MeshId, cell: CellId, matrix: Mat4) {
        self.store.set_instance(mesh, cell, matrix);
    }

    #[inline]
    pub fn try_set_instance(&mut self, mesh: MeshId, cell: CellId, matrix: Mat4) -> Result<usize, InstanceError> {
        self.store.try_set_instance(mesh, cell, matrix)
    }

    /// See [`InstanceStore::remove_instance`].
    ///
    /// # Panics
    /// If `cell` has no active instance.
    #[inline]
    pub fn remove_instance(&mut self, cell: CellId) {
        self.store.remove_instance(cell);
    }

    #[inline]
    pub fn try_remove_instance(&mut self, cell: CellId) -> Result<Mat4, InstanceError> {
        self.store.try_remove_instance(cell)
    }

    #[inline]
    pub fn active_count(&self, mesh: MeshId) -> usize {
        self.store.active_count(mesh)
    }

    /// Read-only view of the arena and index maps.
    #[inline]
    pub fn store(&self) -> &InstanceStore {
        &self.store
    }

    pub fn config(&self) -> &InstancingConfig {
        &self.config
    }

    pub fn mesh_entry(&self, mesh: MeshId) -> Option<&MeshEntry> {
        self.meshes.get(mesh.index())
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    /// Culls every populated mesh against the camera and emits at most one
    /// draw per mesh, in mesh-id order.
    pub fn tick<C, B>(&mut self, camera: &C, backend: &mut B) -> FrameStats
    where
        C: CameraSource + ?Sized,
        B: RenderBackend + ?Sized,
    {
        let mut frame = FrameStats {
            frustum_refreshed: self.tracker.refresh(camera),
            ..FrameStats::default()
        };
        let frustum = self.tracker.frustum();

        for (index, entry) in self.meshes.iter().enumerate() {
            let mesh_id = MeshId(index as u32);
            let segment = self.store.active_matrices(mesh_id);
            if segment.is_empty() {
                continue;
            }

            frame.meshes_culled += 1;
            frame.instances_tested += segment.len();

            let visible = cull_segment(&entry.bounds, segment, frustum, self.config.batch_size, &mut self.visible);
            if visible > 0 {
                backend.draw_instanced(DrawRequest {
                    mesh_id,
                    mesh: entry.mesh,
                    material: self.material,
                    params: &self.config.render,
                    matrices: self.visible.as_slice(),
                });
                frame.draw_calls += 1;
                frame.instances_visible += visible;
            }
            self.visible.clear();
        }

        log::trace!(
            "frame: {}/{} instances visible, {} draws",
            frame.instances_visible,
            frame.instances_tested,
            frame.draw_calls
        );

        self.totals.frames += 1;
        self.totals.frustum_refreshes += u64::from(frame.frustum_refreshed);
        self.totals.draw_calls += frame.draw_calls as u64;
        self.totals.instances_tested += frame.instances_tested as u64;
        self.totals.instances_visible += frame.instances_visible as u64;
        self.last_frame = frame;
        frame
    }

    /// Forces the next `tick` to rebuild the frustum, e.g. after the
    /// camera's projection changed without the pose moving.
    pub fn invalidate_frustum(&mut self) {
        self.tracker.invalidate();
    }

    pub fn frustum(&self) -> &Frustum {
        self.tracker.frustum()
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_frame
    }

    pub fn stats(&self) -> RendererStats {
        RendererStats {
            live_instances: self.store.total_active(),
            ..self.totals
        }
    }
}
