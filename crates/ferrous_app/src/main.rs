//! `instancing_demo [config.toml]`
//!
//! Scatters instances over a flat grid, churns a few of them every frame and
//! orbits the camera around the field. Draws go to a backend that only
//! counts them; the totals are logged on exit.

use anyhow::Context;
use ferrous_app::{logging, App, AppConfig, AppContext, FerrousApp};
use ferrous_core::glam::{Mat4, Quat, Vec3};
use ferrous_instancing::{Aabb, CellId, DrawRequest, FrameStats, InstanceError, MeshEntry, MeshHandle, MeshId};

const SPACING: f32 = 4.0;
const MAX_CELLS: usize = 256 * 256;
const CHURN_PER_FRAME: usize = 32;

/// Grid of cells, each hosting at most one instance.
struct GridField {
    mesh_count: usize,
    side: usize,
    cells: usize,
    cursor: usize,
    rejected: usize,
}

impl GridField {
    fn new(config: &AppConfig) -> Self {
        let inst = &config.instancing;
        let cells = inst.effective_cell_capacity().min(inst.arena_len()).min(MAX_CELLS);
        let side = (cells as f32).sqrt().ceil().max(1.0) as usize;
        Self {
            mesh_count: inst.mesh_count,
            side,
            cells,
            cursor: 0,
            rejected: 0,
        }
    }

    fn mesh_for(&self, cell: usize, generation: u64) -> MeshId {
        let hash = (cell as u64 ^ generation.wrapping_mul(0x9e37_79b9)).wrapping_mul(2_654_435_761);
        MeshId((hash % self.mesh_count as u64) as u32)
    }

    fn matrix_for(&self, cell: usize, generation: u64) -> Mat4 {
        let half = self.side as f32 * SPACING * 0.5;
        let x = (cell % self.side) as f32 * SPACING - half;
        let z = (cell / self.side) as f32 * SPACING - half;
        let yaw = (cell as f32 * 0.37 + generation as f32 * 0.11) % std::f32::consts::TAU;
        let scale = Vec3::splat(1.0 + (cell % 3) as f32 * 0.25);
        Mat4::from_scale_rotation_translation(scale, Quat::from_rotation_y(yaw), Vec3::new(x, 0.0, z))
    }

    fn place(&mut self, ctx: &mut AppContext, cell: usize, generation: u64) {
        let mesh = self.mesh_for(cell, generation);
        match ctx.renderer.try_set_instance(mesh, CellId(cell as u32), self.matrix_for(cell, generation)) {
            Ok(_) => {}
            Err(InstanceError::CapacityExceeded { .. }) => self.rejected += 1,
            Err(e) => log::warn!("cannot place {}: {e}", CellId(cell as u32)),
        }
    }
}

impl FerrousApp for GridField {
    fn meshes(&self) -> Vec<MeshEntry> {
        (0..self.mesh_count)
            .map(|i| {
                let half_height = 0.5 + i as f32 * 0.5;
                let bounds = Aabb::new(Vec3::new(0.0, half_height, 0.0), Vec3::new(0.5, half_height, 0.5));
                MeshEntry::new(MeshHandle(i as u64), bounds)
            })
            .collect()
    }

    fn setup(&mut self, ctx: &mut AppContext) {
        for cell in 0..self.cells {
            self.place(ctx, cell, 0);
        }
        log::info!(
            "placed {} instances on a {}x{} grid ({} rejected by full meshes)",
            ctx.renderer.store().total_active(),
            self.side,
            self.side,
            self.rejected
        );
    }

    fn update(&mut self, ctx: &mut AppContext) {
        let radius = self.side as f32 * SPACING * 0.6;
        ctx.camera.orbit(Vec3::ZERO, radius, radius * 0.25, ctx.time.elapsed as f32 * 0.3);

        if self.cells == 0 {
            return;
        }
        for _ in 0..CHURN_PER_FRAME.min(self.cells) {
            let cell = self.cursor;
            self.cursor = (self.cursor + 1) % self.cells;
            if ctx.renderer.store().is_mapped(CellId(cell as u32)) {
                ctx.renderer.remove_instance(CellId(cell as u32));
            }
            self.place(ctx, cell, ctx.time.frame + 1);
        }
    }

    fn after_render(&mut self, frame: &FrameStats, _ctx: &mut AppContext) {
        if frame.draw_calls == 0 && frame.instances_tested > 0 {
            log::debug!("nothing visible this frame");
        }
    }
}

#[derive(Default)]
struct CountingBackend {
    draws: u64,
    instances: u64,
    bytes: u64,
}

impl CountingBackend {
    fn record(&mut self, request: DrawRequest<'_>) {
        self.draws += 1;
        self.instances += request.instance_count() as u64;
        self.bytes += request.as_bytes().len() as u64;
    }
}

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig {
            title: "instancing_demo".to_string(),
            frames: 600,
            ..AppConfig::default()
        },
    };
    logging::init_logger(logging::parse_level(&config.log_level)?)?;

    let field = GridField::new(&config);
    let mut backend = CountingBackend::default();
    let stats = App::new(field)
        .with_config(config)
        .run(&mut |request: DrawRequest<'_>| backend.record(request))
        .context("demo run failed")?;

    log::info!(
        "backend saw {} draws, {} instances, {} KiB of instance data; {} live at exit",
        backend.draws,
        backend.instances,
        backend.bytes / 1024,
        stats.live_instances
    );
    Ok(())
}
