//! Fixed-capacity instance arena with swap-remove slot management.
//!
//! ## Layout
//!
//! One contiguous `Mat4` arena is split into `mesh_count` segments of
//! `per_mesh_capacity` slots; mesh `m` owns `[m * cap, (m + 1) * cap)`.
//! Within a segment the occupied slots always form the prefix
//! `[0, active_count(m))`, so a segment's live matrices are a plain slice
//! that the culling kernel can fan out over.
//!
//! ```text
//!  arena:        | m0 s0 | m0 s1 | m0 --  | m1 s0 | m1 -- | m1 -- |
//!  slot_to_cell: |  c7   |  c2   |   -    |  c4   |   -   |   -   |
//!  cell_to_slot: c2 → 1, c4 → 3, c7 → 0, everything else unmapped
//! ```
//!
//! Both maps store *arena* indices, so a cell resolves to its mesh with one
//! division. Every operation is O(1) and none allocates.
//!
//! ## Invariants
//!
//! 1. `slot_to_cell[s] == Some(c)` ⇒ `cell_to_slot[c] == Some(s)` for every
//!    active slot `s`.
//! 2. Active slots of a mesh are the contiguous prefix of its segment.
//! 3. `cell_to_slot[c]` is `None` iff `c` has no active instance.
//! 4. `active_count(m) <= per_mesh_capacity`.

use glam::Mat4;

use crate::error::InstanceError;
use crate::ids::{CellId, MeshId};

pub struct InstanceStore {
    matrices: Box<[Mat4]>,
    /// Arena index → cell. Meaningful only inside each mesh's active prefix.
    slot_to_cell: Box<[Option<CellId>]>,
    /// Cell → arena index.
    cell_to_slot: Box<[Option<u32>]>,
    active: Box<[usize]>,
    per_mesh_capacity: usize,
}

impl InstanceStore {
    /// Allocates the arena and both maps.
    ///
    /// Sizes are expected to have passed
    /// [`InstancingConfig::validate`](crate::InstancingConfig::validate):
    /// `mesh_count * per_mesh_capacity` and `cell_capacity` fit in `u32`.
    pub fn new(mesh_count: usize, per_mesh_capacity: usize, cell_capacity: usize) -> Self {
        let arena_len = mesh_count * per_mesh_capacity;
        Self {
            matrices: vec![Mat4::IDENTITY; arena_len].into_boxed_slice(),
            slot_to_cell: vec![None; arena_len].into_boxed_slice(),
            cell_to_slot: vec![None; cell_capacity].into_boxed_slice(),
            active: vec![0; mesh_count].into_boxed_slice(),
            per_mesh_capacity,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn per_mesh_capacity(&self) -> usize {
        self.per_mesh_capacity
    }

    #[inline]
    pub fn cell_capacity(&self) -> usize {
        self.cell_to_slot.len()
    }

    /// Number of live instances of `mesh`.
    ///
    /// Panics if `mesh` is out of range.
    #[inline]
    pub fn active_count(&self, mesh: MeshId) -> usize {
        self.active[mesh.index()]
    }

    /// Live instances across all meshes.
    pub fn total_active(&self) -> usize {
        self.active.iter().sum()
    }

    #[inline]
    pub fn is_full(&self, mesh: MeshId) -> bool {
        self.active_count(mesh) == self.per_mesh_capacity
    }

    #[inline]
    pub fn is_mapped(&self, cell: CellId) -> bool {
        matches!(self.cell_to_slot.get(cell.index()), Some(Some(_)))
    }

    /// Mesh and in-segment slot currently holding `cell`.
    pub fn slot_of(&self, cell: CellId) -> Option<(MeshId, usize)> {
        let arena = (*self.cell_to_slot.get(cell.index())?)? as usize;
        Some(self.split(arena))
    }

    /// Current world matrix of `cell`.
    pub fn matrix(&self, cell: CellId) -> Option<&Mat4> {
        let arena = (*self.cell_to_slot.get(cell.index())?)? as usize;
        Some(&self.matrices[arena])
    }

    /// Live matrices of `mesh`, in slot order.
    #[inline]
    pub fn active_matrices(&self, mesh: MeshId) -> &[Mat4] {
        let start = self.segment_start(mesh);
        &self.matrices[start..start + self.active_count(mesh)]
    }

    /// Cells of `mesh`, in slot order.
    pub fn active_cells(&self, mesh: MeshId) -> impl Iterator<Item = CellId> + '_ {
        let start = self.segment_start(mesh);
        self.slot_to_cell[start..start + self.active_count(mesh)]
            .iter()
            .filter_map(|c| *c)
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    /// Places `cell` under `mesh` or overwrites its matrix in place.
    ///
    /// An unmapped cell is appended at slot `active_count(mesh)`; a mapped
    /// cell keeps its slot, and its matrix is overwritten there even when
    /// `mesh` names a different segment. Returns the in-segment slot.
    /// Nothing is modified when an error is returned.
    pub fn try_set_instance(
        &mut self,
        mesh: MeshId,
        cell: CellId,
        matrix: Mat4,
    ) -> Result<usize, InstanceError> {
        self.check_mesh(mesh)?;
        self.check_cell(cell)?;

        if let Some(arena) = self.cell_to_slot[cell.index()] {
            let (owner, slot) = self.split(arena as usize);
            if owner != mesh {
                log::warn!("{cell} is placed under mesh {owner}; updating it there instead of mesh {mesh}");
            }
            self.matrices[arena as usize] = matrix;
            return Ok(slot);
        }

        let slot = self.active[mesh.index()];
        if slot == self.per_mesh_capacity {
            return Err(InstanceError::CapacityExceeded {
                mesh,
                capacity: self.per_mesh_capacity,
            });
        }
        let arena = self.segment_start(mesh) + slot;
        self.matrices[arena] = matrix;
        self.slot_to_cell[arena] = Some(cell);
        self.cell_to_slot[cell.index()] = Some(arena as u32);
        self.active[mesh.index()] += 1;
        Ok(slot)
    }

    /// [`try_set_instance`](Self::try_set_instance) for callers that size
    /// capacities correctly.
    ///
    /// # Panics
    /// On any [`InstanceError`]: a full segment or an out-of-range mesh
    /// or cell.
    pub fn set_instance(&mut self, mesh: MeshId, cell: CellId, matrix: Mat4) -> usize {
        match self.try_set_instance(mesh, cell, matrix) {
            Ok(slot) => slot,
            Err(e) => panic!("set_instance: {e}"),
        }
    }

    /// Removes `cell`, moving the mesh's last live instance into the freed
    /// slot. Returns the removed matrix. Nothing is modified when an error
    /// is returned.
    pub fn try_remove_instance(&mut self, cell: CellId) -> Result<Mat4, InstanceError> {
        self.check_cell(cell)?;
        let arena = self.cell_to_slot[cell.index()].ok_or(InstanceError::CellNotMapped(cell))? as usize;
        let (mesh, _) = self.split(arena);
        let last = self.segment_start(mesh) + self.active[mesh.index()] - 1;
        let removed = self.matrices[arena];

        if arena != last {
            let moved = self.slot_to_cell[last].expect("active slot without a cell");
            self.matrices[arena] = self.matrices[last];
            self.slot_to_cell[arena] = Some(moved);
            self.cell_to_slot[moved.index()] = Some(arena as u32);
        }

        self.slot_to_cell[last] = None;
        self.cell_to_slot[cell.index()] = None;
        self.active[mesh.index()] -= 1;
        Ok(removed)
    }

    /// [`try_remove_instance`](Self::try_remove_instance) for callers that
    /// never remove twice.
    ///
    /// # Panics
    /// If `cell` is out of range or has no active instance.
    pub fn remove_instance(&mut self, cell: CellId) -> Mat4 {
        match self.try_remove_instance(cell) {
            Ok(m) => m,
            Err(e) => panic!("remove_instance: {e}"),
        }
    }

    /// Drops every instance. Capacity is kept.
    pub fn clear(&mut self) {
        for mesh in 0..self.active.len() {
            let start = mesh * self.per_mesh_capacity;
            for arena in start..start + self.active[mesh] {
                if let Some(cell) = self.slot_to_cell[arena].take() {
                    self.cell_to_slot[cell.index()] = None;
                }
            }
            self.active[mesh] = 0;
        }
    }

    /// Checks invariants 1–4 over the whole store.
    ///
    /// O(arena + cells); meant for tests and debug tooling.
    ///
    /// # Panics
    /// With a description of the first violated invariant.
    pub fn assert_invariants(&self) {
        let mut mapped = 0usize;
        for (m, &count) in self.active.iter().enumerate() {
            assert!(
                count <= self.per_mesh_capacity,
                "mesh {m}: active count {count} exceeds capacity {}",
                self.per_mesh_capacity
            );
            let start = m * self.per_mesh_capacity;
            for arena in start..start + self.per_mesh_capacity {
                match (arena < start + count, self.slot_to_cell[arena]) {
                    (true, Some(cell)) => {
                        assert_eq!(
                            self.cell_to_slot[cell.index()],
                            Some(arena as u32),
                            "mesh {m}: slot {} holds {cell} but the cell maps elsewhere",
                            arena - start
                        );
                        mapped += 1;
                    }
                    (true, None) => panic!("mesh {m}: hole at slot {} below active count", arena - start),
                    (false, Some(cell)) => {
                        panic!("mesh {m}: stale {cell} at inactive slot {}", arena - start)
                    }
                    (false, None) => {}
                }
            }
        }
        let cells = self.cell_to_slot.iter().filter(|s| s.is_some()).count();
        assert_eq!(cells, mapped, "{cells} mapped cells but {mapped} active slots");
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    #[inline]
    fn segment_start(&self, mesh: MeshId) -> usize {
        mesh.index() * self.per_mesh_capacity
    }

    #[inline]
    fn split(&self, arena: usize) -> (MeshId, usize) {
        (
            MeshId((arena / self.per_mesh_capacity) as u32),
            arena % self.per_mesh_capacity,
        )
    }

    fn check_mesh(&self, mesh: MeshId) -> Result<(), InstanceError> {
        if mesh.index() < self.active.len() {
            Ok(())
        } else {
            Err(InstanceError::MeshOutOfRange {
                mesh,
                count: self.active.len(),
            })
        }
    }

    fn check_cell(&self, cell: CellId) -> Result<(), InstanceError> {
        if cell.index() < self.cell_to_slot.len() {
            Ok(())
        } else {
            Err(InstanceError::CellOutOfRange {
                cell,
                capacity: self.cell_to_slot.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const M0: MeshId = MeshId(0);
    const M1: MeshId = MeshId(1);

    fn at(x: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn append_assigns_dense_slots() {
        let mut store = InstanceStore::new(2, 4, 16);
        assert_eq!(store.set_instance(M0, CellId(5), at(5.0)), 0);
        assert_eq!(store.set_instance(M0, CellId(9), at(9.0)), 1);
        assert_eq!(store.set_instance(M1, CellId(3), at(3.0)), 0);
        assert_eq!(store.active_count(M0), 2);
        assert_eq!(store.active_count(M1), 1);
        assert_eq!(store.slot_of(CellId(9)), Some((M0, 1)));
        assert_eq!(store.active_matrices(M0), &[at(5.0), at(9.0)]);
        store.assert_invariants();
    }

    #[test]
    fn update_is_idempotent() {
        let mut store = InstanceStore::new(1, 4, 4);
        store.set_instance(M0, CellId(1), at(1.0));
        store.set_instance(M0, CellId(1), at(7.0));
        store.set_instance(M0, CellId(1), at(7.0));
        assert_eq!(store.active_count(M0), 1);
        assert_eq!(store.matrix(CellId(1)), Some(&at(7.0)));
        store.assert_invariants();
    }

    #[test]
    fn update_under_another_mesh_stays_in_place() {
        let mut store = InstanceStore::new(2, 4, 8);
        store.set_instance(M0, CellId(3), at(1.0));
        assert_eq!(store.set_instance(M1, CellId(3), at(2.0)), 0);
        assert_eq!(store.slot_of(CellId(3)), Some((M0, 0)));
        assert_eq!(store.matrix(CellId(3)), Some(&at(2.0)));
        assert_eq!(store.active_count(M0), 1);
        assert_eq!(store.active_count(M1), 0);
        store.assert_invariants();
    }

    #[test]
    fn swap_remove_moves_last_into_hole() {
        let mut store = InstanceStore::new(1, 4, 4);
        store.set_instance(M0, CellId(0), at(0.0)); // A, slot 0
        store.set_instance(M0, CellId(1), at(1.0)); // B, slot 1
        assert_eq!(store.remove_instance(CellId(0)), at(0.0));
        assert_eq!(store.active_count(M0), 1);
        assert_eq!(store.slot_of(CellId(1)), Some((M0, 0)));
        assert!(!store.is_mapped(CellId(0)));
        assert_eq!(store.active_matrices(M0), &[at(1.0)]);
        store.assert_invariants();
    }

    #[test]
    fn removing_last_slot_does_not_swap() {
        let mut store = InstanceStore::new(1, 4, 4);
        store.set_instance(M0, CellId(2), at(2.0));
        store.set_instance(M0, CellId(3), at(3.0));
        store.remove_instance(CellId(3));
        assert_eq!(store.slot_of(CellId(2)), Some((M0, 0)));
        assert_eq!(store.active_cells(M0).collect::<Vec<_>>(), vec![CellId(2)]);
        store.assert_invariants();
    }

    #[test]
    fn set_then_remove_restores_state() {
        let mut store = InstanceStore::new(2, 4, 8);
        store.set_instance(M0, CellId(0), at(0.0));
        store.set_instance(M1, CellId(1), at(1.0));
        let before: Vec<_> = (0..8).map(|c| store.slot_of(CellId(c))).collect();

        store.set_instance(M0, CellId(6), at(6.0));
        store.remove_instance(CellId(6));

        let after: Vec<_> = (0..8).map(|c| store.slot_of(CellId(c))).collect();
        assert_eq!(before, after);
        assert_eq!(store.active_count(M0), 1);
        assert_eq!(store.active_count(M1), 1);
        store.assert_invariants();
    }

    #[test]
    fn capacity_boundary_is_reported() {
        let mut store = InstanceStore::new(2, 3, 16);
        for c in 0..3 {
            store.set_instance(M0, CellId(c), at(c as f32));
        }
        assert!(store.is_full(M0));
        assert_eq!(
            store.try_set_instance(M0, CellId(3), at(3.0)),
            Err(InstanceError::CapacityExceeded { mesh: M0, capacity: 3 })
        );
        // The other segment is unaffected, and updates on a full mesh still work.
        assert_eq!(store.try_set_instance(M1, CellId(3), at(3.0)), Ok(0));
        assert_eq!(store.try_set_instance(M0, CellId(1), at(-1.0)), Ok(1));
        assert!(!store.is_mapped(CellId(4)));
        store.assert_invariants();
    }

    #[test]
    #[should_panic(expected = "is full")]
    fn overflow_is_fatal() {
        let mut store = InstanceStore::new(1, 2, 8);
        store.set_instance(M0, CellId(0), Mat4::IDENTITY);
        store.set_instance(M0, CellId(1), Mat4::IDENTITY);
        store.set_instance(M0, CellId(2), Mat4::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "has no active instance")]
    fn double_remove_is_fatal() {
        let mut store = InstanceStore::new(1, 2, 8);
        store.set_instance(M0, CellId(4), Mat4::IDENTITY);
        store.remove_instance(CellId(4));
        store.remove_instance(CellId(4));
    }

    #[test]
    fn checked_errors_leave_state_untouched() {
        let mut store = InstanceStore::new(2, 2, 4);
        store.set_instance(M0, CellId(0), at(0.0));
        assert_eq!(
            store.try_remove_instance(CellId(1)),
            Err(InstanceError::CellNotMapped(CellId(1)))
        );
        assert_eq!(
            store.try_set_instance(MeshId(2), CellId(1), at(1.0)),
            Err(InstanceError::MeshOutOfRange { mesh: MeshId(2), count: 2 })
        );
        assert_eq!(
            store.try_set_instance(M0, CellId(4), at(1.0)),
            Err(InstanceError::CellOutOfRange { cell: CellId(4), capacity: 4 })
        );
        assert_eq!(store.total_active(), 1);
        assert_eq!(store.matrix(CellId(0)), Some(&at(0.0)));
        store.assert_invariants();
    }

    #[test]
    fn churn_keeps_maps_bijective() {
        // Deterministic interleaving of inserts, updates and removals.
        let mut store = InstanceStore::new(3, 32, 96);
        let mut live = vec![false; 96];
        let mut seed = 0x2545_f491u32;
        for _ in 0..2000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let cell = CellId(seed % 96);
            let mesh = MeshId(cell.0 % 3);
            if live[cell.index()] && seed & 0x100 != 0 {
                store.remove_instance(cell);
                live[cell.index()] = false;
            } else {
                store.set_instance(mesh, cell, at(seed as f32));
                live[cell.index()] = true;
            }
        }
        store.assert_invariants();
        assert_eq!(store.total_active(), live.iter().filter(|l| **l).count());
    }

    #[test]
    fn clear_unmaps_everything() {
        let mut store = InstanceStore::new(2, 4, 8);
        store.set_instance(M0, CellId(1), at(1.0));
        store.set_instance(M1, CellId(2), at(2.0));
        store.clear();
        assert_eq!(store.total_active(), 0);
        assert!(!store.is_mapped(CellId(1)));
        assert!(!store.is_mapped(CellId(2)));
        store.assert_invariants();
    }
}
