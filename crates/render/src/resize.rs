use crate::renderer::{OutputSurface, Renderer};
use worldscene_scene::PerspectiveCamera;

/// The drawable element a world renders into: a window, a canvas, or a
/// headless stand-in.
pub trait HostContainer {
    /// Current size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Insert a renderer's output surface into the container.
    fn append(&mut self, surface: OutputSurface);
}

/// In-memory container for tests and headless tools.
#[derive(Debug, Clone, Default)]
pub struct HeadlessContainer {
    width: u32,
    height: u32,
    surfaces: Vec<OutputSurface>,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            surfaces: Vec::new(),
        }
    }

    pub fn surfaces(&self) -> &[OutputSurface] {
        &self.surfaces
    }
}

impl HostContainer for HeadlessContainer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn append(&mut self, surface: OutputSurface) {
        self.surfaces.push(surface);
    }
}

/// Keeps camera projection and renderer output in step with the container.
///
/// Applies the container's size once on creation and again on every change,
/// mapping one output pixel to one container pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resizer {
    width: u32,
    height: u32,
}

impl Resizer {
    pub fn new<R: Renderer>(
        container: &impl HostContainer,
        camera: &mut PerspectiveCamera,
        renderer: &mut R,
    ) -> Self {
        let mut resizer = Self::default();
        let (width, height) = container.size();
        resizer.resize(width, height, camera, renderer);
        resizer
    }

    /// Apply a new container size. Zero-sized updates are ignored.
    pub fn resize<R: Renderer>(
        &mut self,
        width: u32,
        height: u32,
        camera: &mut PerspectiveCamera,
        renderer: &mut R,
    ) -> bool {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring zero-sized resize");
            return false;
        }
        camera.aspect = width as f32 / height as f32;
        camera.update_projection_matrix();
        renderer.set_size(width, height);
        self.width = width;
        self.height = height;
        tracing::debug!(width, height, aspect = camera.aspect, "resized");
        true
    }

    /// Last applied size, `(0, 0)` if none has been applied yet.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DebugTextRenderer, RenderSettings};

    #[test]
    fn initial_size_applied() {
        let container = HeadlessContainer::new(800, 600);
        let mut camera = PerspectiveCamera::default();
        let mut renderer = DebugTextRenderer::new(RenderSettings::default());
        let resizer = Resizer::new(&container, &mut camera, &mut renderer);

        assert_eq!(resizer.size(), (800, 600));
        assert_eq!(renderer.size(), (800, 600));
        assert_eq!(camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn resize_matches_container_for_many_sizes() {
        let container = HeadlessContainer::new(1, 1);
        let mut camera = PerspectiveCamera::default();
        let mut renderer = DebugTextRenderer::default();
        let mut resizer = Resizer::new(&container, &mut camera, &mut renderer);

        for (w, h) in [(1, 1), (1920, 1080), (7, 3000), (4096, 2), (333, 333)] {
            assert!(resizer.resize(w, h, &mut camera, &mut renderer));
            assert_eq!(camera.aspect, w as f32 / h as f32);
            assert_eq!(renderer.size(), (w, h));
            assert_eq!(
                camera.projection_matrix(),
                glam::Mat4::perspective_rh(
                    camera.fov.to_radians(),
                    w as f32 / h as f32,
                    camera.near,
                    camera.far
                )
            );
        }
    }

    #[test]
    fn zero_size_ignored() {
        let container = HeadlessContainer::new(640, 480);
        let mut camera = PerspectiveCamera::default();
        let mut renderer = DebugTextRenderer::default();
        let mut resizer = Resizer::new(&container, &mut camera, &mut renderer);

        assert!(!resizer.resize(0, 480, &mut camera, &mut renderer));
        assert_eq!(renderer.size(), (640, 480));
        assert_eq!(camera.aspect, 640.0 / 480.0);
    }

    #[test]
    fn headless_container_collects_surfaces() {
        let mut container = HeadlessContainer::new(10, 10);
        let renderer = DebugTextRenderer::default();
        container.append(renderer.output_surface());
        assert_eq!(container.surfaces().len(), 1);
        assert_eq!(container.surfaces()[0].label, "debug-text");
    }
}
