use glam::Vec3;
use worldscene_common::{Color, NodeId};
use worldscene_input::OrbitControls;
use worldscene_scene::{NodeKind, PerspectiveCamera, Scene};

/// Everything the GUI may edit, borrowed for the duration of one draw or apply.
pub struct GuiTargets<'a> {
    pub scene: &'a mut Scene,
    pub camera: &'a mut PerspectiveCamera,
    pub controls: &'a mut OrbitControls,
}

/// One GUI folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Scene,
    /// Camera projection and pose together with its orbit controls.
    Camera,
    /// A light node, with an optional helper attached to it.
    Light { node: NodeId, helper: Option<NodeId> },
}

/// A single value change made through the GUI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuiEdit {
    BackgroundIntensity(f32),
    EnvironmentIntensity(f32),
    CameraFov(f32),
    CameraNear(f32),
    CameraFar(f32),
    CameraPosition(Vec3),
    ControlsEnabled(bool),
    ControlsDamping(bool),
    ControlsDampingFactor(f32),
    ControlsRotateSpeed(f32),
    ControlsZoomSpeed(f32),
    ControlsPanSpeed(f32),
    ControlsTarget(Vec3),
    LightColor { node: NodeId, color: Color },
    LightIntensity { node: NodeId, intensity: f32 },
    LightPosition { node: NodeId, position: Vec3 },
    HelperVisible { node: NodeId, visible: bool },
    HelperLightPlane { node: NodeId, visible: bool },
    HelperCone { node: NodeId, visible: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuiError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is not a light")]
    NotALight(NodeId),
    #[error("node {0:?} is not a light helper")]
    NotAHelper(NodeId),
}

/// Debug GUI: a side panel of collapsible folders bound to scene state by handle.
#[derive(Debug, Clone)]
pub struct GuiControls {
    folders: Vec<Folder>,
    visible: bool,
}

impl Default for GuiControls {
    fn default() -> Self {
        Self::new()
    }
}

impl GuiControls {
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            visible: true,
        }
    }

    pub fn add_scene_folder(&mut self) {
        self.folders.push(Folder::Scene);
    }

    pub fn add_camera_folder(&mut self) {
        self.folders.push(Folder::Camera);
    }

    pub fn add_light_folder(&mut self, node: NodeId, helper: Option<NodeId>) {
        self.folders.push(Folder::Light { node, helper });
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    /// Draw the panel and apply every edit made this frame.
    ///
    /// Returns the edits that were applied.
    pub fn show(&self, ctx: &egui::Context, targets: &mut GuiTargets<'_>) -> Vec<GuiEdit> {
        if !self.visible {
            return Vec::new();
        }
        let mut edits = Vec::new();
        egui::SidePanel::right("debug_gui")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Controls");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for folder in &self.folders {
                        draw_folder(ui, *folder, &*targets, &mut edits);
                    }
                });
            });

        edits.retain(|edit| match apply(*edit, targets) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("gui edit rejected: {e}");
                false
            }
        });
        edits
    }
}

/// Apply one edit to its target.
pub fn apply(edit: GuiEdit, targets: &mut GuiTargets<'_>) -> Result<(), GuiError> {
    let GuiTargets {
        scene,
        camera,
        controls,
    } = targets;
    match edit {
        GuiEdit::BackgroundIntensity(v) => scene.background_intensity = v.max(0.0),
        GuiEdit::EnvironmentIntensity(v) => scene.environment_intensity = v.max(0.0),
        GuiEdit::CameraFov(v) => {
            camera.fov = v.clamp(1.0, 179.0);
            camera.update_projection_matrix();
        }
        GuiEdit::CameraNear(v) => {
            camera.near = v.max(1e-4).min(camera.far - 1e-4);
            camera.update_projection_matrix();
        }
        GuiEdit::CameraFar(v) => {
            camera.far = v.max(camera.near + 1e-4);
            camera.update_projection_matrix();
        }
        GuiEdit::CameraPosition(p) => camera.position = p,
        GuiEdit::ControlsEnabled(on) => controls.enabled = on,
        GuiEdit::ControlsDamping(on) => controls.enable_damping = on,
        GuiEdit::ControlsDampingFactor(v) => controls.damping_factor = v.clamp(0.0, 1.0),
        GuiEdit::ControlsRotateSpeed(v) => controls.rotate_speed = v.max(0.0),
        GuiEdit::ControlsZoomSpeed(v) => controls.zoom_speed = v.max(0.0),
        GuiEdit::ControlsPanSpeed(v) => controls.pan_speed = v.max(0.0),
        GuiEdit::ControlsTarget(t) => {
            controls.target = t;
            camera.look_at(t);
        }
        GuiEdit::LightColor { node, color } => light_params(scene, node)?.color = color,
        GuiEdit::LightIntensity { node, intensity } => {
            light_params(scene, node)?.set_intensity(intensity)
        }
        GuiEdit::LightPosition { node, position } => {
            let n = scene
                .graph
                .get_mut(node)
                .ok_or(GuiError::NodeNotFound(node))?;
            n.transform.position = position;
        }
        GuiEdit::HelperVisible { node, visible } => {
            scene
                .graph
                .get_mut(node)
                .ok_or(GuiError::NodeNotFound(node))?
                .visible = visible;
        }
        GuiEdit::HelperLightPlane { node, visible } => {
            helper(scene, node)?.light_plane.visible = visible;
        }
        GuiEdit::HelperCone { node, visible } => {
            helper(scene, node)?.cone.visible = visible;
        }
    }
    tracing::debug!(?edit, "gui edit applied");
    Ok(())
}

fn light_params(
    scene: &mut Scene,
    node: NodeId,
) -> Result<&mut worldscene_scene::LightParams, GuiError> {
    scene
        .graph
        .get_mut(node)
        .ok_or(GuiError::NodeNotFound(node))?
        .light_params_mut()
        .ok_or(GuiError::NotALight(node))
}

fn helper(
    scene: &mut Scene,
    node: NodeId,
) -> Result<&mut worldscene_scene::DirectionalLightHelper, GuiError> {
    scene
        .graph
        .get_mut(node)
        .ok_or(GuiError::NodeNotFound(node))?
        .as_helper_mut()
        .ok_or(GuiError::NotAHelper(node))
}

fn draw_folder(
    ui: &mut egui::Ui,
    folder: Folder,
    targets: &GuiTargets<'_>,
    edits: &mut Vec<GuiEdit>,
) {
    match folder {
        Folder::Scene => {
            egui::CollapsingHeader::new("Scene")
                .default_open(true)
                .show(ui, |ui| scene_folder(ui, &*targets.scene, edits));
        }
        Folder::Camera => {
            egui::CollapsingHeader::new("Camera")
                .default_open(true)
                .show(ui, |ui| {
                    camera_folder(ui, &*targets.camera, &*targets.controls, edits)
                });
        }
        Folder::Light { node, helper } => {
            let title = targets
                .scene
                .graph
                .get(node)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| format!("light {}", node.short()));
            egui::CollapsingHeader::new(title)
                .id_salt(node.0)
                .default_open(false)
                .show(ui, |ui| light_folder(ui, &*targets.scene, node, helper, edits));
        }
    }
}

fn scene_folder(ui: &mut egui::Ui, scene: &Scene, edits: &mut Vec<GuiEdit>) {
    match &scene.background {
        Some(tex) => ui.label(format!("Background: {} ({}x{})", tex.name, tex.width, tex.height)),
        None => ui.label("Background: none"),
    };

    let mut background = scene.background_intensity;
    if ui
        .add(egui::Slider::new(&mut background, 0.0..=3.0).text("background intensity"))
        .changed()
    {
        edits.push(GuiEdit::BackgroundIntensity(background));
    }

    let mut environment = scene.environment_intensity;
    if ui
        .add(egui::Slider::new(&mut environment, 0.0..=3.0).text("environment intensity"))
        .changed()
    {
        edits.push(GuiEdit::EnvironmentIntensity(environment));
    }
}

fn camera_folder(
    ui: &mut egui::Ui,
    camera: &PerspectiveCamera,
    controls: &OrbitControls,
    edits: &mut Vec<GuiEdit>,
) {
    let mut fov = camera.fov;
    if ui
        .add(egui::Slider::new(&mut fov, 10.0..=120.0).text("fov"))
        .changed()
    {
        edits.push(GuiEdit::CameraFov(fov));
    }
    let mut near = camera.near;
    if ui
        .add(egui::DragValue::new(&mut near).prefix("near: ").speed(0.01))
        .changed()
    {
        edits.push(GuiEdit::CameraNear(near));
    }
    let mut far = camera.far;
    if ui
        .add(egui::DragValue::new(&mut far).prefix("far: ").speed(1.0))
        .changed()
    {
        edits.push(GuiEdit::CameraFar(far));
    }
    ui.label("Position:");
    if let Some(p) = vec3_row(ui, camera.position) {
        edits.push(GuiEdit::CameraPosition(p));
    }

    ui.separator();
    ui.label("Orbit controls");
    let mut enabled = controls.enabled;
    if ui.checkbox(&mut enabled, "enabled").changed() {
        edits.push(GuiEdit::ControlsEnabled(enabled));
    }
    let mut damping = controls.enable_damping;
    if ui.checkbox(&mut damping, "damping").changed() {
        edits.push(GuiEdit::ControlsDamping(damping));
    }
    let mut factor = controls.damping_factor;
    if ui
        .add(egui::Slider::new(&mut factor, 0.01..=1.0).text("damping factor"))
        .changed()
    {
        edits.push(GuiEdit::ControlsDampingFactor(factor));
    }
    let mut rotate = controls.rotate_speed;
    if ui
        .add(egui::Slider::new(&mut rotate, 0.0..=5.0).text("rotate speed"))
        .changed()
    {
        edits.push(GuiEdit::ControlsRotateSpeed(rotate));
    }
    let mut zoom = controls.zoom_speed;
    if ui
        .add(egui::Slider::new(&mut zoom, 0.0..=5.0).text("zoom speed"))
        .changed()
    {
        edits.push(GuiEdit::ControlsZoomSpeed(zoom));
    }
    let mut pan = controls.pan_speed;
    if ui
        .add(egui::Slider::new(&mut pan, 0.0..=5.0).text("pan speed"))
        .changed()
    {
        edits.push(GuiEdit::ControlsPanSpeed(pan));
    }
    ui.label("Target:");
    if let Some(t) = vec3_row(ui, controls.target) {
        edits.push(GuiEdit::ControlsTarget(t));
    }
}

fn light_folder(
    ui: &mut egui::Ui,
    scene: &Scene,
    node: NodeId,
    helper: Option<NodeId>,
    edits: &mut Vec<GuiEdit>,
) {
    let Some(light) = scene.graph.get(node) else {
        ui.label("(removed)");
        return;
    };
    let Some(params) = light.light_params() else {
        ui.label("(not a light)");
        return;
    };

    let mut rgb = params.color.to_array();
    ui.horizontal(|ui| {
        ui.label("color");
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            edits.push(GuiEdit::LightColor {
                node,
                color: Color::from_array(rgb),
            });
        }
    });
    let mut intensity = params.intensity();
    if ui
        .add(egui::Slider::new(&mut intensity, 0.0..=5.0).text("intensity"))
        .changed()
    {
        edits.push(GuiEdit::LightIntensity { node, intensity });
    }

    if matches!(light.kind, NodeKind::DirectionalLight(_)) {
        ui.label("Position:");
        if let Some(position) = vec3_row(ui, light.transform.position) {
            edits.push(GuiEdit::LightPosition { node, position });
        }
    }

    let Some(helper_id) = helper else {
        return;
    };
    let Some(helper_node) = scene.graph.get(helper_id) else {
        return;
    };
    ui.separator();
    let mut visible = helper_node.visible;
    if ui.checkbox(&mut visible, "helper").changed() {
        edits.push(GuiEdit::HelperVisible {
            node: helper_id,
            visible,
        });
    }
    if let NodeKind::DirectionalLightHelper(parts) = &helper_node.kind {
        let mut plane = parts.light_plane.visible;
        if ui.checkbox(&mut plane, "light plane").changed() {
            edits.push(GuiEdit::HelperLightPlane {
                node: helper_id,
                visible: plane,
            });
        }
        let mut cone = parts.cone.visible;
        if ui.checkbox(&mut cone, "cone").changed() {
            edits.push(GuiEdit::HelperCone {
                node: helper_id,
                visible: cone,
            });
        }
    }
}

/// Three drag values; `Some` with the new vector if any changed.
fn vec3_row(ui: &mut egui::Ui, value: Vec3) -> Option<Vec3> {
    let mut v = value.to_array();
    let old = v;
    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(&mut v[0]).prefix("X: ").speed(0.1));
        ui.add(egui::DragValue::new(&mut v[1]).prefix("Y: ").speed(0.1));
        ui.add(egui::DragValue::new(&mut v[2]).prefix("Z: ").speed(0.1));
    });
    (v != old).then(|| Vec3::from_array(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldscene_scene::{Light, Node, StandardHelpers};

    struct Fixture {
        scene: Scene,
        camera: PerspectiveCamera,
        controls: OrbitControls,
        ambient: NodeId,
        directional: NodeId,
        helper: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = Scene::create();
            let ambient = scene
                .add(Light::create_ambient_light(Color::WHITE, 0.5))
                .unwrap();
            let light = Light::create_directional_light(0.0, 5.0, 0.0, Color::from_hex(0xff0000), 0.5);
            let helper_node =
                Light::create_directional_light_helper(&StandardHelpers, &light, 1.0).unwrap();
            let directional = scene.add(light).unwrap();
            let helper = scene.add(helper_node).unwrap();
            let camera = PerspectiveCamera::default();
            let controls = OrbitControls::new(&camera);
            Self {
                scene,
                camera,
                controls,
                ambient,
                directional,
                helper,
            }
        }

        fn targets(&mut self) -> GuiTargets<'_> {
            GuiTargets {
                scene: &mut self.scene,
                camera: &mut self.camera,
                controls: &mut self.controls,
            }
        }
    }

    #[test]
    fn folders_are_recorded_in_order() {
        let fx = Fixture::new();
        let mut gui = GuiControls::new();
        gui.add_scene_folder();
        gui.add_camera_folder();
        gui.add_light_folder(fx.ambient, None);
        gui.add_light_folder(fx.directional, Some(fx.helper));

        assert_eq!(gui.folders().len(), 4);
        assert_eq!(gui.folders()[0], Folder::Scene);
        assert_eq!(
            gui.folders()[3],
            Folder::Light {
                node: fx.directional,
                helper: Some(fx.helper)
            }
        );
    }

    #[test]
    fn light_edits_reach_the_scene() {
        let mut fx = Fixture::new();
        let (ambient, directional) = (fx.ambient, fx.directional);
        let mut targets = fx.targets();

        apply(
            GuiEdit::LightIntensity {
                node: ambient,
                intensity: 2.0,
            },
            &mut targets,
        )
        .unwrap();
        apply(
            GuiEdit::LightColor {
                node: directional,
                color: Color::from_hex(0x00ff00),
            },
            &mut targets,
        )
        .unwrap();
        apply(
            GuiEdit::LightPosition {
                node: directional,
                position: Vec3::new(1.0, 2.0, 3.0),
            },
            &mut targets,
        )
        .unwrap();

        let graph = &fx.scene.graph;
        assert_eq!(graph.get(ambient).unwrap().light_params().unwrap().intensity(), 2.0);
        let light = graph.get(directional).unwrap();
        assert_eq!(light.light_params().unwrap().color.to_hex(), 0x00ff00);
        assert_eq!(light.transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn negative_intensity_is_clamped() {
        let mut fx = Fixture::new();
        let ambient = fx.ambient;
        apply(
            GuiEdit::LightIntensity {
                node: ambient,
                intensity: -1.0,
            },
            &mut fx.targets(),
        )
        .unwrap();
        assert_eq!(
            fx.scene.graph.get(ambient).unwrap().light_params().unwrap().intensity(),
            0.0
        );
    }

    #[test]
    fn helper_toggles() {
        let mut fx = Fixture::new();
        let helper = fx.helper;
        let mut targets = fx.targets();
        apply(GuiEdit::HelperCone { node: helper, visible: false }, &mut targets).unwrap();
        apply(GuiEdit::HelperVisible { node: helper, visible: false }, &mut targets).unwrap();

        let node = fx.scene.graph.get(helper).unwrap();
        assert!(!node.visible);
        let NodeKind::DirectionalLightHelper(h) = &node.kind else {
            panic!("expected helper");
        };
        assert!(!h.cone.visible);
        assert!(h.light_plane.visible);
    }

    #[test]
    fn wrong_node_kind_is_rejected() {
        let mut fx = Fixture::new();
        let (ambient, helper) = (fx.ambient, fx.helper);
        let mut targets = fx.targets();
        assert_eq!(
            apply(GuiEdit::HelperCone { node: ambient, visible: true }, &mut targets),
            Err(GuiError::NotAHelper(ambient))
        );
        assert_eq!(
            apply(GuiEdit::LightIntensity { node: helper, intensity: 1.0 }, &mut targets),
            Err(GuiError::NotALight(helper))
        );
        let missing = NodeId::new();
        assert_eq!(
            apply(GuiEdit::HelperVisible { node: missing, visible: true }, &mut targets),
            Err(GuiError::NodeNotFound(missing))
        );
    }

    #[test]
    fn camera_edits_refresh_projection() {
        let mut fx = Fixture::new();
        apply(GuiEdit::CameraFov(60.0), &mut fx.targets()).unwrap();
        assert_eq!(fx.camera.fov, 60.0);
        assert_eq!(
            fx.camera.projection_matrix(),
            glam::Mat4::perspective_rh(60.0_f32.to_radians(), fx.camera.aspect, 0.1, 100.0)
        );
    }

    #[test]
    fn controls_target_moves_camera_focus() {
        let mut fx = Fixture::new();
        let mut targets = fx.targets();
        apply(GuiEdit::ControlsDamping(true), &mut targets).unwrap();
        apply(GuiEdit::ControlsTarget(Vec3::new(0.0, 1.0, 0.0)), &mut targets).unwrap();
        assert!(fx.controls.enable_damping);
        assert_eq!(fx.controls.target, Vec3::Y);
        assert_eq!(fx.camera.target, Vec3::Y);
    }

    #[test]
    fn headless_show_without_input_makes_no_edits() {
        let mut fx = Fixture::new();
        let mut gui = GuiControls::new();
        gui.add_scene_folder();
        gui.add_camera_folder();
        gui.add_light_folder(fx.ambient, None);
        gui.add_light_folder(fx.directional, Some(fx.helper));
        let group = fx.scene.add(Node::group("unused")).unwrap();
        gui.add_light_folder(group, None);

        let ctx = egui::Context::default();
        let mut applied = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            applied = gui.show(ctx, &mut fx.targets());
        });
        assert!(applied.is_empty());
        assert_eq!(fx.camera.fov, 35.0);
    }

    #[test]
    fn hidden_gui_draws_nothing() {
        let mut fx = Fixture::new();
        let mut gui = GuiControls::new();
        gui.add_scene_folder();
        gui.toggle_visible();
        assert!(!gui.is_visible());

        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            assert!(gui.show(ctx, &mut fx.targets()).is_empty());
        });
    }
}
