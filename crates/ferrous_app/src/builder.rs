use std::path::Path;

use anyhow::Context;
use ferrous_core::Camera;
use ferrous_instancing::{InstancingConfig, RenderBackend, RendererStats};
use serde::{Deserialize, Serialize};

use crate::traits::FerrousApp;

/// Projection parameters for the host camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl CameraConfig {
    /// Applies the projection to `camera`, leaving its pose alone.
    pub fn apply(&self, camera: &mut Camera) {
        camera.fovy = self.fov_degrees.to_radians();
        camera.aspect = self.aspect;
        camera.znear = self.znear;
        camera.zfar = self.zfar;
    }
}

/// Host configuration, usually read from a TOML file:
///
/// ```toml
/// title = "forest"
/// frames = 600
/// log_level = "debug"
///
/// [instancing]
/// mesh_count = 3
/// per_mesh_capacity = 10000
/// batch_size = 2048
///
/// [instancing.render]
/// shadow_casting = "two_sided"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Frames to run; `0` runs until the app calls
    /// [`AppContext::request_exit`](crate::AppContext::request_exit).
    pub frames: u64,
    pub log_level: String,
    pub camera: CameraConfig,
    pub instancing: InstancingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Ferrous Instancing".to_string(),
            frames: 0,
            log_level: "info".to_string(),
            camera: CameraConfig::default(),
            instancing: InstancingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(source).context("malformed configuration")?;
        config.instancing.validate().context("invalid [instancing] table")?;
        crate::logging::parse_level(&config.log_level)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("while loading {}", path.display()))
    }
}

/// Entry point. Configure with the builder methods, then [`run`](Self::run)
/// against a backend.
pub struct App<A: FerrousApp> {
    config: AppConfig,
    app_state: A,
}

impl<A: FerrousApp> App<A> {
    pub fn new(app_state: A) -> Self {
        Self {
            config: AppConfig::default(),
            app_state,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config.title = title.to_string();
        self
    }

    pub fn with_frames(mut self, frames: u64) -> Self {
        self.config.frames = frames;
        self
    }

    pub fn with_instancing(mut self, instancing: InstancingConfig) -> Self {
        self.config.instancing = instancing;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the frame loop to completion and returns the renderer's
    /// lifetime counters. Does not install a logger.
    pub fn run<B: RenderBackend + ?Sized>(self, backend: &mut B) -> anyhow::Result<RendererStats> {
        crate::runner::run_internal(self.config, self.app_state, backend)
    }

    /// Like [`run`](Self::run), but returns the app state too.
    pub fn run_returning<B: RenderBackend + ?Sized>(self, backend: &mut B) -> anyhow::Result<(A, RendererStats)> {
        crate::runner::run_returning(self.config, self.app_state, backend)
    }
}
