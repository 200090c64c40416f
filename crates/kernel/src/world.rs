use crate::animation::AnimationLoop;
use crate::config::{ConfigError, WorldConfig};
use std::sync::Arc;
use worldscene_assets::{LoadStatus, PendingTexture, Texture, TextureLoader, TextureMapping};
use worldscene_common::NodeId;
use worldscene_input::{InputEvent, OrbitControls};
use worldscene_render::{HostContainer, RenderError, RenderSettings, Renderer, Resizer};
use worldscene_scene::{Floor, HelperFactory, Light, Node, PerspectiveCamera, Scene, SceneError};
use worldscene_tools::{GuiControls, GuiEdit, GuiTargets};

/// Errors that abort world construction.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("renderer unavailable: {0}")]
    Render(#[from] RenderError),
    #[error("scene assembly failed: {0}")]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Lifecycle of a world. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Constructing,
    /// Assembled; the render loop has not started yet.
    AssetsPending,
    /// The render loop has been started. The background may still be loading.
    Ready,
}

/// Handles to the nodes the world attaches during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub group: NodeId,
    pub floor: NodeId,
    pub ambient: NodeId,
    pub directional: NodeId,
    pub helper: Option<NodeId>,
}

/// A complete interactive 3D scene: camera, renderer, lights, floor, HDR
/// background, orbit controls, debug GUI and the render loop that ties them
/// together.
///
/// Several worlds may exist at once; each owns its own state.
pub struct World<R: Renderer> {
    camera: PerspectiveCamera,
    renderer: R,
    controls: OrbitControls,
    resizer: Resizer,
    scene: Scene,
    gui: GuiControls,
    handles: SceneHandles,
    background: Option<PendingTexture>,
    animation: AnimationLoop,
    phase: Phase,
}

impl<R: Renderer> World<R> {
    /// Assemble a world inside `container`.
    ///
    /// `create_renderer` receives the render settings and the container size.
    /// Its error is fatal and returned unchanged. A helper factory returning
    /// `None` only means the world has no light helper. The background is
    /// requested from `loader` and installed by a later `tick`.
    pub fn new<C, F>(
        container: &mut C,
        config: &WorldConfig,
        create_renderer: F,
        loader: &mut dyn TextureLoader,
        helpers: &dyn HelperFactory,
    ) -> Result<Self, WorldError>
    where
        C: HostContainer,
        F: FnOnce(&RenderSettings, (u32, u32)) -> Result<R, RenderError>,
    {
        let span = tracing::info_span!("world_assembly");
        let _enter = span.enter();
        config.validate()?;

        let cam = &config.camera;
        let mut camera = PerspectiveCamera::create(cam.fov, cam.near, cam.far, cam.position);
        let mut renderer = create_renderer(&config.render, container.size())?;

        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = config.controls.enable_damping;
        controls.damping_factor = config.controls.damping_factor;
        if config.controls.listen_to_keys {
            controls.listen_to_key_events();
        }

        container.append(renderer.output_surface());
        let resizer = Resizer::new(&*container, &mut camera, &mut renderer);
        controls.set_viewport_height(resizer.size().1);

        let mut scene = Scene::create();
        let group = scene.add(Node::group("world"))?;

        let f = &config.floor;
        let floor = scene
            .graph
            .add(group, Floor::create_box_floor(f.width, f.depth, f.height))?;
        tracing::debug!(width = f.width, depth = f.depth, height = f.height, "floor attached");

        let a = &config.ambient;
        let ambient = scene
            .graph
            .add(group, Light::create_ambient_light(a.color, a.intensity))?;
        tracing::debug!(color = %a.color, intensity = a.intensity, "ambient light attached");

        let d = &config.directional;
        let light = Light::create_directional_light(
            d.position.x,
            d.position.y,
            d.position.z,
            d.color,
            d.intensity,
        );
        let helper_node = Light::create_directional_light_helper(helpers, &light, d.helper_size);
        let directional = scene.graph.add(group, light)?;
        tracing::debug!(color = %d.color, intensity = d.intensity, "directional light attached");
        let helper = match helper_node {
            Some(node) => Some(scene.graph.add(group, node)?),
            None => {
                tracing::debug!("helper factory produced no helper");
                None
            }
        };

        let handles = SceneHandles {
            group,
            floor,
            ambient,
            directional,
            helper,
        };

        let background = if config.background.enabled {
            let pending = loader.load(&config.background.file);
            tracing::info!(file = pending.name(), "background load requested");
            Some(pending)
        } else {
            None
        };
        let phase = Phase::AssetsPending;

        let mut gui = GuiControls::new();
        gui.add_scene_folder();
        gui.add_camera_folder();
        gui.add_light_folder(ambient, None);
        gui.add_light_folder(directional, helper);

        tracing::info!(
            nodes = scene.graph.len(),
            helper = helper.is_some(),
            ?phase,
            "world assembled"
        );

        Ok(Self {
            camera,
            renderer,
            controls,
            resizer,
            scene,
            gui,
            handles,
            background,
            animation: AnimationLoop::new(),
            phase,
        })
    }

    /// Start the render loop and enter [`Phase::Ready`]. Each subsequent
    /// `tick` renders one frame, whether or not the background has arrived.
    pub fn render(&mut self) {
        self.animation.start();
        if self.phase < Phase::Ready {
            self.phase = Phase::Ready;
            tracing::info!(
                background_pending = self.background_pending(),
                "world ready"
            );
        }
    }

    /// Halt the render loop; `tick` becomes a no-op until `render` is called again.
    pub fn stop(&mut self) {
        self.animation.stop();
    }

    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    /// Run one frame: install a finished background, advance the controls,
    /// then render. Returns `None` while the loop is stopped.
    pub fn tick(&mut self) -> Option<R::Output> {
        if !self.animation.is_running() {
            return None;
        }
        self.poll_background();
        self.controls.update(&mut self.camera);
        let output = self.renderer.render(&self.scene, &self.camera);
        self.animation.record_frame();
        tracing::trace!(frame = self.animation.frames(), "frame rendered");
        Some(output)
    }

    /// Block until the background load resolves and install it.
    ///
    /// For headless drivers; interactive hosts let `tick` poll instead.
    pub fn wait_for_assets(&mut self) {
        if let Some(pending) = self.background.take() {
            match pending.wait() {
                Ok(texture) => self.install_background(texture),
                Err(e) => self.background_failed(&e),
            }
        }
    }

    fn poll_background(&mut self) {
        let Some(pending) = self.background.as_mut() else {
            return;
        };
        match pending.poll() {
            LoadStatus::Pending => {}
            LoadStatus::Loaded(texture) => {
                self.background = None;
                self.install_background(texture);
            }
            LoadStatus::Failed(e) => {
                self.background = None;
                self.background_failed(&e);
            }
        }
    }

    fn install_background(&mut self, mut texture: Texture) {
        texture.mapping = TextureMapping::EquirectangularReflection;
        tracing::info!(
            name = %texture.name,
            width = texture.width,
            height = texture.height,
            "background installed"
        );
        let texture = Arc::new(texture);
        self.scene.background = Some(Arc::clone(&texture));
        self.scene.environment = Some(texture);
    }

    fn background_failed(&mut self, error: &worldscene_assets::AssetError) {
        tracing::warn!("background unavailable, continuing without it: {error}");
    }

    /// Feed host input to the orbit controls.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.controls.handle_event(event)
    }

    /// Apply a container size change to camera, renderer and controls.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let applied = self
            .resizer
            .resize(width, height, &mut self.camera, &mut self.renderer);
        if applied {
            self.controls.set_viewport_height(height);
        }
        applied
    }

    /// Draw the debug GUI and apply its edits.
    pub fn show_gui(&mut self, ctx: &egui::Context) -> Vec<GuiEdit> {
        let mut targets = GuiTargets {
            scene: &mut self.scene,
            camera: &mut self.camera,
            controls: &mut self.controls,
        };
        self.gui.show(ctx, &mut targets)
    }

    /// Apply a GUI edit without drawing anything.
    pub fn apply_edit(&mut self, edit: GuiEdit) -> Result<(), worldscene_tools::GuiError> {
        let mut targets = GuiTargets {
            scene: &mut self.scene,
            camera: &mut self.camera,
            controls: &mut self.controls,
        };
        worldscene_tools::apply(edit, &mut targets)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a requested background has neither loaded nor failed.
    pub fn background_pending(&self) -> bool {
        self.background.is_some()
    }

    pub fn handles(&self) -> &SceneHandles {
        &self.handles
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn gui(&self) -> &GuiControls {
        &self.gui
    }

    pub fn gui_mut(&mut self) -> &mut GuiControls {
        &mut self.gui
    }

    pub fn frames(&self) -> u64 {
        self.animation.frames()
    }
}
