//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate either.
//! - Output buffer size always matches the last size given by the resizer.
//!
//! The trait is stable; the wgpu backend and the debug text renderer both
//! implement it, so the world orchestrator never names a concrete backend.

mod renderer;
mod resize;

pub use renderer::{DebugTextRenderer, OutputSurface, RenderError, RenderSettings, Renderer};
pub use resize::{HeadlessContainer, HostContainer, Resizer};

pub fn crate_info() -> &'static str {
    "worldscene-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
