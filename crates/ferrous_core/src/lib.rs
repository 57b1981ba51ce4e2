//! `ferrous_core` — math-side primitives shared by the instancing pipeline
//! and the host application.
//!
//! | Module      | Responsibility                                         |
//! |-------------|--------------------------------------------------------|
//! | `transform` | TRS transform → world matrix                           |
//! | `camera`    | Camera pose + perspective → view-projection            |
//! | `time`      | Per-frame timing snapshots (`Time`, `TimeClock`)        |

pub mod camera;
pub mod time;
pub mod transform;

pub use camera::Camera;
pub use time::{Time, TimeClock};
pub use transform::Transform;

pub use glam;
