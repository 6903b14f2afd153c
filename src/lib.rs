//! # neondrift
//!
//! A procedurally generated neon-city flythrough: a static instanced skyline
//! with glowing windows and decorations, a fixed-size pool of rain streaks,
//! and a camera that drifts down the central road forever.
//!
//! The CPU core is three small pieces, run in a fixed per-frame order:
//!
//! | Piece | When | What |
//! |-------|------|------|
//! | [`city::generate`] | once at startup | buildings, windows, decorations as flat instance lists |
//! | [`rain::RainPool::advance`] | every frame | per-streak fall + in-place respawn below ground |
//! | [`flight::compute_pose`] | every frame | z-step with wraparound, sinusoidal sway/bob |
//!
//! Everything else is the wgpu rendering collaborator ([`gpu`]) and the winit
//! shell ([`app`]). The core modules never import the renderer; they hand it
//! buffers.
//!
//! ## Quick start
//!
//! ```ignore
//! use neondrift::prelude::*;
//!
//! let scene = Scene::new(SceneConfig::default(), None)?;
//! neondrift::run(scene)?;
//! ```
//!
//! ## Determinism
//!
//! All randomness flows through [`sampler::Sampler`]. Pass a seed to
//! [`scene::Scene::new`] and generation plus every rain respawn replays
//! bit-for-bit; pass `None` for an entropy-seeded session.
//!
//! ## Motion model
//!
//! Rain fall and the camera z-step are constant displacements per frame, not
//! delta-time scaled: speed varies with display refresh rate. That is the
//! intended behavior, not an oversight; `Time::delta` only feeds shader
//! uniforms.

pub mod app;
pub mod city;
pub mod config;
pub mod error;
pub mod flight;
pub mod gpu;
pub mod rain;
pub mod sampler;
pub mod scene;
pub mod time;

pub use city::{BuildingSpec, City, Instance, WindowSpec};
pub use config::{CameraConfig, CityConfig, RainConfig, SceneConfig, Span};
pub use error::{AppError, ConfigError, GpuError};
pub use flight::{CameraPose, FlightPath};
pub use glam::{Vec2, Vec3};
pub use rain::RainPool;
pub use sampler::Sampler;
pub use scene::Scene;
pub use time::Time;

use winit::event_loop::{ControlFlow, EventLoop};

/// Run a scene in a window until it is closed. Blocks.
pub fn run(scene: Scene) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(scene);
    event_loop.run_app(&mut app)?;
    Ok(())
}

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::{CameraConfig, CityConfig, RainConfig, SceneConfig, Span};
    pub use crate::flight::CameraPose;
    pub use crate::sampler::Sampler;
    pub use crate::scene::Scene;
    pub use crate::{Vec2, Vec3};
}
