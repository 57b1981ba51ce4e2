use ferrous_instancing::{FrameStats, MaterialHandle, MeshEntry};

use crate::context::AppContext;

/// Callbacks a hosted application implements.
///
/// Only [`meshes`](Self::meshes) is required; everything else defaults to
/// doing nothing.
///
/// ```rust,ignore
/// impl FerrousApp for Forest {
///     fn meshes(&self) -> Vec<MeshEntry> { self.registry.clone() }
///
///     fn update(&mut self, ctx: &mut AppContext) {
///         ctx.camera.orbit(Vec3::ZERO, 80.0, 20.0, ctx.time.elapsed as f32 * 0.2);
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait FerrousApp {
    /// Mesh registry; entry `i` describes `MeshId(i)`. Its length must
    /// match `mesh_count` in the instancing config.
    fn meshes(&self) -> Vec<MeshEntry>;

    /// Material shared by every instanced draw.
    fn material(&self) -> MaterialHandle {
        MaterialHandle(0)
    }

    /// Called once after the renderer is initialised, before the first frame.
    ///
    /// Place the initial instance population here.
    fn setup(&mut self, ctx: &mut AppContext) {}

    /// Called every frame before culling. Placement edits and camera
    /// movement go here.
    fn update(&mut self, ctx: &mut AppContext) {}

    /// Called every frame after the draws for that frame were emitted.
    fn after_render(&mut self, frame: &FrameStats, ctx: &mut AppContext) {}

    /// Called once before the renderer is shut down.
    fn teardown(&mut self, ctx: &mut AppContext) {}
}
