use ferrous_core::{Camera, Time};
use ferrous_instancing::InstanceRenderer;

/// Per-frame context passed to every [`FerrousApp`](crate::FerrousApp) callback.
///
/// ```rust,ignore
/// fn update(&mut self, ctx: &mut AppContext) {
///     if let Some(cell) = self.pending_removals.pop() {
///         ctx.renderer.remove_instance(cell);
///     }
///     if ctx.time.frame == 600 {
///         ctx.request_exit();
///     }
/// }
/// ```
pub struct AppContext<'a> {
    // ── Read-only ──────────────────────────────────────────────────────────
    pub time: Time,

    // ── Read-write ─────────────────────────────────────────────────────────
    /// The single active camera. Moving it invalidates the cached frustum
    /// automatically; projection edits need
    /// [`InstanceRenderer::invalidate_frustum`].
    pub camera: &'a mut Camera,

    /// Instance placement goes through here.
    pub renderer: &'a mut InstanceRenderer,

    pub(crate) exit_requested: bool,
}

impl<'a> AppContext<'a> {
    pub(crate) fn new(time: Time, camera: &'a mut Camera, renderer: &'a mut InstanceRenderer) -> Self {
        Self {
            time,
            camera,
            renderer,
            exit_requested: false,
        }
    }

    /// Stop the frame loop after the current frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Update the camera aspect ratio and make the next frame re-extract
    /// its frustum.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
        self.renderer.invalidate_frustum();
    }
}
