use anyhow::Context;
use ferrous_core::{Camera, TimeClock};
use ferrous_instancing::{InstanceRenderer, RenderBackend, RendererStats};

use crate::builder::AppConfig;
use crate::context::AppContext;
use crate::traits::FerrousApp;

const STATS_LOG_INTERVAL: u64 = 120;

pub(crate) fn run_internal<A, B>(config: AppConfig, app: A, backend: &mut B) -> anyhow::Result<RendererStats>
where
    A: FerrousApp,
    B: RenderBackend + ?Sized,
{
    run_returning(config, app, backend).map(|(_, stats)| stats)
}

pub(crate) fn run_returning<A, B>(config: AppConfig, app: A, backend: &mut B) -> anyhow::Result<(A, RendererStats)>
where
    A: FerrousApp,
    B: RenderBackend + ?Sized,
{
    let mut runner = Runner::new(config, app)?;
    runner.setup();
    while runner.frame(backend) {}
    Ok(runner.finish())
}

/// Owns the renderer, camera and clock for the lifetime of one run.
struct Runner<A: FerrousApp> {
    config: AppConfig,
    app: A,
    renderer: InstanceRenderer,
    camera: Camera,
    clock: TimeClock,
}

impl<A: FerrousApp> Runner<A> {
    fn new(config: AppConfig, app: A) -> anyhow::Result<Self> {
        let renderer = InstanceRenderer::init(config.instancing.clone(), app.meshes(), app.material())
            .with_context(|| format!("cannot start `{}`", config.title))?;
        let mut camera = Camera::default();
        config.camera.apply(&mut camera);
        log::info!("starting `{}` ({} frames)", config.title, frame_label(config.frames));
        Ok(Self {
            config,
            app,
            renderer,
            camera,
            clock: TimeClock::new(),
        })
    }

    fn setup(&mut self) {
        let mut ctx = AppContext::new(self.clock.peek(), &mut self.camera, &mut self.renderer);
        self.app.setup(&mut ctx);
    }

    /// Runs one frame; returns `false` once the loop should stop.
    fn frame<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        let time = self.clock.tick();

        let mut ctx = AppContext::new(time, &mut self.camera, &mut self.renderer);
        self.app.update(&mut ctx);
        let mut exit = ctx.exit_requested;

        let frame = self.renderer.tick(&self.camera, backend);

        let mut ctx = AppContext::new(time, &mut self.camera, &mut self.renderer);
        self.app.after_render(&frame, &mut ctx);
        exit |= ctx.exit_requested;

        if time.frame % STATS_LOG_INTERVAL == 0 {
            log::debug!(
                "frame {}: {:.0} fps, {}/{} visible, {} draws",
                time.frame,
                time.fps(),
                frame.instances_visible,
                frame.instances_tested,
                frame.draw_calls
            );
        }

        let limit_reached = self.config.frames != 0 && self.clock.frames() >= self.config.frames;
        !(exit || limit_reached)
    }

    fn finish(mut self) -> (A, RendererStats) {
        let mut ctx = AppContext::new(self.clock.peek(), &mut self.camera, &mut self.renderer);
        self.app.teardown(&mut ctx);
        let stats = self.renderer.shutdown();
        log::info!(
            "`{}` finished after {} frames: {} draws, {} of {} instances visible",
            self.config.title,
            stats.frames,
            stats.draw_calls,
            stats.instances_visible,
            stats.instances_tested
        );
        (self.app, stats)
    }
}

fn frame_label(frames: u64) -> String {
    if frames == 0 {
        "unbounded".to_string()
    } else {
        frames.to_string()
    }
}
