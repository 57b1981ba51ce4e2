//! Boundary to the GPU submission layer.
//!
//! The orchestrator never talks to a graphics API. Once per mesh with
//! visible instances it hands a [`DrawRequest`] to a [`RenderBackend`],
//! which owns the actual instanced draw call.

use glam::Mat4;

use crate::config::RenderParams;
use crate::ids::{MaterialHandle, MeshHandle, MeshId};

/// One batched instanced draw.
///
/// `matrices` borrows the renderer's visible list and is only valid for
/// the duration of the call; backends that defer submission must copy it.
#[derive(Debug, Clone, Copy)]
pub struct DrawRequest<'a> {
    pub mesh_id: MeshId,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub params: &'a RenderParams,
    /// Column-major world matrices, unordered. Never empty.
    pub matrices: &'a [Mat4],
}

impl DrawRequest<'_> {
    #[inline]
    pub fn instance_count(&self) -> usize {
        self.matrices.len()
    }

    /// Matrices as raw bytes, ready for an instance-buffer upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.matrices)
    }
}

/// Receives the batched draws of a frame, in mesh-id order.
pub trait RenderBackend {
    fn draw_instanced(&mut self, request: DrawRequest<'_>);
}

impl<F> RenderBackend for F
where
    F: FnMut(DrawRequest<'_>),
{
    fn draw_instanced(&mut self, request: DrawRequest<'_>) {
        self(request)
    }
}

/// Owned copy of a [`DrawRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub mesh_id: MeshId,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub params: RenderParams,
    pub matrices: Vec<Mat4>,
}

/// Headless backend that keeps a copy of every request.
///
/// Used by tests and tools that need to inspect what would have been drawn.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub draws: Vec<RecordedDraw>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
    }

    pub fn total_instances(&self) -> usize {
        self.draws.iter().map(|d| d.matrices.len()).sum()
    }
}

impl RenderBackend for RecordingBackend {
    fn draw_instanced(&mut self, request: DrawRequest<'_>) {
        self.draws.push(RecordedDraw {
            mesh_id: request.mesh_id,
            mesh: request.mesh,
            material: request.material,
            params: *request.params,
            matrices: request.matrices.to_vec(),
        });
    }
}
