//! World orchestration: assembles camera, renderer, scene content, orbit
//! controls and debug GUI, then drives them from a per-frame loop.
//!
//! # Invariants
//! - Each frame runs background polling, then controls update, then render.
//! - A missing helper or background never fails construction; a missing
//!   renderer always does.
//! - The world's phase only moves forward.

mod animation;
mod config;
pub mod world;

pub use animation::AnimationLoop;
pub use config::{
    AmbientConfig, BackgroundConfig, CameraConfig, ConfigError, ControlsConfig, DirectionalConfig,
    FloorConfig, WorldConfig,
};
pub use world::{Phase, SceneHandles, World, WorldError};
