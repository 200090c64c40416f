//! wgpu render backend for the world scene.
//!
//! Draws visible box meshes with ambient, directional and environment
//! lighting, directional light helpers as lines, and an equirectangular
//! HDR background behind everything.
//!
//! # Invariants
//! - Renderer never mutates the scene or camera.
//! - The background texture is re-uploaded only when its id changes.

mod frame;
mod gpu;
mod shaders;

pub use gpu::{RenderedFrame, WgpuRenderer};
