use thiserror::Error;

use crate::ids::{CellId, MeshId};

/// Contract violations on the instance store.
///
/// The checked `try_*` methods return these; the plain methods panic with
/// the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("mesh {mesh} out of range (mesh count {count})")]
    MeshOutOfRange { mesh: MeshId, count: usize },

    #[error("{cell} out of range (cell capacity {capacity})")]
    CellOutOfRange { cell: CellId, capacity: usize },

    #[error("mesh {mesh} is full ({capacity} instances)")]
    CapacityExceeded { mesh: MeshId, capacity: usize },

    #[error("{0} has no active instance")]
    CellNotMapped(CellId),
}

/// Rejected [`InstancingConfig`](crate::InstancingConfig) or mesh registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("mesh_count must be at least 1")]
    NoMeshes,

    #[error("per_mesh_capacity must be at least 1")]
    ZeroCapacity,

    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("arena of {meshes} x {capacity} slots exceeds 32-bit slot indices")]
    ArenaTooLarge { meshes: usize, capacity: usize },

    #[error("cell_capacity {0} exceeds 32-bit cell ids")]
    CellSpaceTooLarge(usize),

    #[error("mesh registry has {registered} entries but mesh_count is {configured}")]
    RegistryMismatch { registered: usize, configured: usize },
}
