use serde::{Deserialize, Serialize};
use std::fmt::Write;
use worldscene_common::Color;
use worldscene_scene::{NodeKind, PerspectiveCamera, Scene};

/// Baseline quality settings every backend honours where it can.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub antialias: bool,
    pub shadows: bool,
    /// Color drawn where no background texture covers the frame.
    pub clear_color: Color,
    pub tone_mapping_exposure: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            shadows: true,
            clear_color: Color::from_hex(0x1a1a26),
            tone_mapping_exposure: 1.0,
        }
    }
}

/// Description of a renderer's output surface, handed to the host container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSurface {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

/// Errors from renderer creation and frame submission.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("failed to create rendering surface: {0}")]
    Surface(String),
    #[error("failed to create graphics device: {0}")]
    Device(String),
    #[error("frame acquisition failed: {0}")]
    Frame(String),
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a camera, then produces output. It never
/// mutates either; scene truth is owned by the world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    fn settings(&self) -> &RenderSettings;

    /// The surface the host container should display.
    fn output_surface(&self) -> OutputSurface;

    /// Resize the output buffer to exactly `width` x `height` pixels.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Headless renderer producing a human-readable dump of each frame.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    settings: RenderSettings,
    width: u32,
    height: u32,
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            width: 0,
            height: 0,
            frames: 0,
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn output_surface(&self) -> OutputSurface {
        OutputSurface {
            label: "debug-text".into(),
            width: self.width,
            height: self.height,
        }
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        self.frames += 1;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{}) ===",
            self.frames, self.width, self.height
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov,
            camera.aspect,
        );
        match &scene.background {
            Some(tex) => {
                let _ = writeln!(
                    out,
                    "Background: {} {}x{} {:?}",
                    tex.name, tex.width, tex.height, tex.mapping
                );
            }
            None => {
                let _ = writeln!(out, "Background: clear {}", self.settings.clear_color);
            }
        }
        let _ = writeln!(out, "Environment: {}", scene.environment.is_some());
        let _ = writeln!(out, "Nodes: {}", scene.graph.len());

        let graph = &scene.graph;
        for id in graph.traverse() {
            let Some(node) = graph.get(id) else {
                continue;
            };
            let depth = graph.ancestors(id).len();
            let p = graph.world_position(id);
            let detail = match &node.kind {
                NodeKind::Mesh(m) => {
                    format!(" box={:.1}x{:.1}x{:.1}", m.width, m.height, m.depth)
                }
                NodeKind::AmbientLight(l) => {
                    format!(" color={} intensity={:.2}", l.color, l.intensity())
                }
                NodeKind::DirectionalLight(d) => format!(
                    " color={} intensity={:.2}",
                    d.params.color,
                    d.params.intensity()
                ),
                NodeKind::DirectionalLightHelper(h) => format!(
                    " plane={} cone={}",
                    h.light_plane.visible, h.cone.visible
                ),
                NodeKind::Root | NodeKind::Group => String::new(),
            };
            let _ = writeln!(
                out,
                "{:indent$}[{}] {} pos=({:.2}, {:.2}, {:.2}){}{}",
                "",
                node.role,
                node.name,
                p.x,
                p.y,
                p.z,
                detail,
                if graph.is_effectively_visible(id) { "" } else { " (hidden)" },
                indent = depth * 2,
            );
        }

        tracing::trace!(frame = self.frames, "debug frame rendered");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use worldscene_assets::Texture;
    use worldscene_scene::{Floor, Light, Node};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::create();
        let camera = PerspectiveCamera::default();
        let mut renderer = DebugTextRenderer::new(RenderSettings::default());
        renderer.set_size(640, 480);
        let output = renderer.render(&scene, &camera);

        assert!(output.contains("Frame 1 (640x480)"));
        assert!(output.contains("Nodes: 1"));
        assert!(output.contains("Background: clear"));
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn debug_renderer_lists_nodes() {
        let mut scene = Scene::create();
        let group = scene.add(Node::group("main")).unwrap();
        scene
            .graph
            .add(group, Floor::create_box_floor(7.0, 7.0, 0.4))
            .unwrap();
        scene
            .graph
            .add(group, Light::create_ambient_light(Default::default(), 0.5))
            .unwrap();

        let mut renderer = DebugTextRenderer::default();
        let output = renderer.render(&scene, &PerspectiveCamera::default());
        assert!(output.contains("Nodes: 4"));
        assert!(output.contains("[floor] floor"));
        assert!(output.contains("box=7.0x0.4x7.0"));
        assert!(output.contains("[ambient-light]"));
    }

    #[test]
    fn debug_renderer_reports_background() {
        let mut scene = Scene::create();
        let tex = Arc::new(Texture::from_rgb32f("sky.hdr", 1, 1, vec![1.0, 1.0, 1.0]).unwrap());
        scene.background = Some(tex.clone());
        scene.environment = Some(tex);
        let output = DebugTextRenderer::default().render(&scene, &PerspectiveCamera::default());
        assert!(output.contains("Background: sky.hdr 1x1"));
        assert!(output.contains("Environment: true"));
    }

    #[test]
    fn render_settings_default() {
        let settings = RenderSettings::default();
        assert!(settings.antialias);
        assert!(settings.shadows);
        assert_eq!(settings.tone_mapping_exposure, 1.0);
    }
}
