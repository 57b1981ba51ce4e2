//! Static configuration for an [`InstanceRenderer`](crate::InstanceRenderer).
//!
//! Capacities are fixed for the renderer's lifetime: the arena, both index
//! maps and the visible-list buffer are sized once in `init` and never
//! grown. Loaded from the `[instancing]` table of the host's TOML file.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How instances participate in shadow passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowCasting {
    Off,
    #[default]
    On,
    TwoSided,
    ShadowsOnly,
}

/// Per-draw render state forwarded untouched with every [`DrawRequest`](crate::DrawRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    pub shadow_casting: ShadowCasting,
    pub receive_shadows: bool,
    /// Static instances never move between frames, so this is off by default.
    pub motion_vectors: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            shadow_casting: ShadowCasting::On,
            receive_shadows: true,
            motion_vectors: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancingConfig {
    /// Number of mesh types; one arena segment each.
    pub mesh_count: usize,
    /// Slots per mesh segment.
    pub per_mesh_capacity: usize,
    /// Size of the cell-id space. `None` means `mesh_count * per_mesh_capacity`.
    pub cell_capacity: Option<usize>,
    /// Minimum number of instances handed to one culling work item.
    pub batch_size: usize,
    pub render: RenderParams,
}

impl Default for InstancingConfig {
    fn default() -> Self {
        Self {
            mesh_count: 1,
            per_mesh_capacity: 4096,
            cell_capacity: None,
            batch_size: 1024,
            render: RenderParams::default(),
        }
    }
}

impl InstancingConfig {
    pub fn new(mesh_count: usize, per_mesh_capacity: usize) -> Self {
        Self {
            mesh_count,
            per_mesh_capacity,
            ..Self::default()
        }
    }

    pub fn with_cell_capacity(mut self, cells: usize) -> Self {
        self.cell_capacity = Some(cells);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Total slots across all mesh segments.
    pub fn arena_len(&self) -> usize {
        self.mesh_count.saturating_mul(self.per_mesh_capacity)
    }

    pub fn effective_cell_capacity(&self) -> usize {
        self.cell_capacity.unwrap_or_else(|| self.arena_len())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mesh_count == 0 {
            return Err(ConfigError::NoMeshes);
        }
        if self.per_mesh_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        // Slot indices and cell ids are stored as u32.
        let arena = self.mesh_count.checked_mul(self.per_mesh_capacity);
        if !matches!(arena, Some(n) if n <= u32::MAX as usize) {
            return Err(ConfigError::ArenaTooLarge {
                meshes: self.mesh_count,
                capacity: self.per_mesh_capacity,
            });
        }
        let cells = self.effective_cell_capacity();
        if cells > u32::MAX as usize {
            return Err(ConfigError::CellSpaceTooLarge(cells));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(InstancingConfig::default().validate(), Ok(()));
    }

    #[test]
    fn cell_capacity_defaults_to_arena_len() {
        let cfg = InstancingConfig::new(3, 100);
        assert_eq!(cfg.effective_cell_capacity(), 300);
        assert_eq!(cfg.with_cell_capacity(10).effective_cell_capacity(), 10);
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert_eq!(InstancingConfig::new(0, 8).validate(), Err(ConfigError::NoMeshes));
        assert_eq!(InstancingConfig::new(2, 0).validate(), Err(ConfigError::ZeroCapacity));
        assert_eq!(
            InstancingConfig::new(2, 8).with_batch_size(0).validate(),
            Err(ConfigError::ZeroBatchSize)
        );
        assert!(matches!(
            InstancingConfig::new(1 << 20, 1 << 20).validate(),
            Err(ConfigError::ArenaTooLarge { .. })
        ));
    }

    #[test]
    fn parses_partial_toml() {
        let cfg: InstancingConfig = toml::from_str(
            r#"
            mesh_count = 4
            per_mesh_capacity = 256

            [render]
            shadow_casting = "two_sided"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mesh_count, 4);
        assert_eq!(cfg.per_mesh_capacity, 256);
        assert_eq!(cfg.batch_size, 1024);
        assert_eq!(cfg.cell_capacity, None);
        assert_eq!(cfg.render.shadow_casting, ShadowCasting::TwoSided);
        assert!(cfg.render.receive_shadows);
    }
}
