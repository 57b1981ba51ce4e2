//! Headless host for the Ferrous instancing pipeline.
//!
//! Plays the roles the instancing crate leaves to its collaborators: loads
//! configuration, installs the logger, owns the camera, drives placement
//! through [`FerrousApp`] callbacks and calls
//! [`InstanceRenderer::tick`](ferrous_instancing::InstanceRenderer::tick)
//! exactly once per frame.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ferrous_app::{App, AppContext, FerrousApp};
//! use ferrous_instancing::{Aabb, CellId, MeshEntry, MeshHandle, MeshId, RecordingBackend};
//!
//! struct OneCube;
//!
//! impl FerrousApp for OneCube {
//!     fn meshes(&self) -> Vec<MeshEntry> {
//!         vec![MeshEntry::new(MeshHandle(0), Aabb::unit_cube())]
//!     }
//!
//!     fn setup(&mut self, ctx: &mut AppContext) {
//!         ctx.renderer.set_instance(MeshId(0), CellId(0), glam::Mat4::IDENTITY);
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut backend = RecordingBackend::new();
//!     App::new(OneCube).with_frames(60).run(&mut backend)?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod logging;
mod runner;
pub mod traits;

pub use builder::{App, AppConfig, CameraConfig};
pub use context::AppContext;
pub use traits::FerrousApp;

pub use ferrous_core::{Camera, Time, TimeClock, Transform};
pub use ferrous_core::glam::{Mat4, Quat, Vec3};
