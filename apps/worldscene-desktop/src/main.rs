use anyhow::{Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};
use worldscene_input::{InputEvent, Key, PointerButton};
use worldscene_kernel::{World, WorldConfig};
use worldscene_render::{HostContainer, OutputSurface, Renderer};
use worldscene_render_wgpu::WgpuRenderer;
use worldscene_scene::StandardHelpers;

/// Pixels per wheel "line" for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Parser)]
#[command(name = "worldscene-desktop", about = "Interactive worldscene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON world config; defaults to the stock scene
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background HDR file, overriding the config
    #[arg(long)]
    background: Option<PathBuf>,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,
}

/// The window as the world's host container.
struct WindowContainer {
    window: Arc<Window>,
}

impl HostContainer for WindowContainer {
    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn append(&mut self, surface: OutputSurface) {
        tracing::debug!(
            label = %surface.label,
            width = surface.width,
            height = surface.height,
            "renderer surface attached to window"
        );
    }
}

fn map_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn map_key(key: KeyCode) -> Key {
    match key {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        _ => Key::Other,
    }
}

/// Positive when scrolling down, towards the user.
fn wheel_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) / PIXELS_PER_LINE,
    }
}

struct Gui {
    winit: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    config: WorldConfig,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    world: Option<World<WgpuRenderer>>,
    egui_ctx: EguiContext,
    gui: Option<Gui>,
    cursor: Vec2,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: WorldConfig, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            config,
            initial_size,
            window: None,
            world: None,
            egui_ctx: EguiContext::default(),
            gui: None,
            cursor: Vec2::ZERO,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("World Scene")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let mut container = WindowContainer {
            window: window.clone(),
        };
        let mut loader = self.config.background.loader();
        let surface_target = window.clone();
        let mut world = World::new(
            &mut container,
            &self.config,
            move |settings, (width, height)| {
                WgpuRenderer::create(surface_target, width, height, settings.clone())
            },
            &mut loader,
            &StandardHelpers,
        )?;

        let renderer = world.renderer();
        let gui = Gui {
            winit: egui_winit::State::new(
                self.egui_ctx.clone(),
                egui::ViewportId::ROOT,
                &window,
                Some(window.scale_factor() as f32),
                None,
                None,
            ),
            renderer: egui_wgpu::Renderer::new(
                renderer.device(),
                renderer.surface_format(),
                None,
                1,
                false,
            ),
        };

        world.render();
        self.world = Some(world);
        self.gui = Some(gui);
        self.window = Some(window);
        Ok(())
    }

    fn handle_input(&mut self, event: &WindowEvent) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let input = match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                InputEvent::PointerMove {
                    position: self.cursor,
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_button(*button) else {
                    return;
                };
                match state {
                    ElementState::Pressed => InputEvent::PointerDown {
                        button,
                        position: self.cursor,
                    },
                    ElementState::Released => InputEvent::PointerUp { button },
                }
            }
            WindowEvent::MouseWheel { delta, .. } => InputEvent::Wheel {
                delta: wheel_delta(*delta),
            },
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if *code == KeyCode::F1 && *state == ElementState::Pressed {
                    world.gui_mut().toggle_visible();
                    return;
                }
                InputEvent::Key {
                    key: map_key(*code),
                    pressed: *state == ElementState::Pressed,
                }
            }
            _ => return,
        };
        world.handle_input(&input);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(world), Some(window), Some(gui)) =
            (self.world.as_mut(), self.window.as_ref(), self.gui.as_mut())
        else {
            return;
        };

        let frame = match world.tick() {
            None | Some(Ok(None)) => return,
            Some(Ok(Some(frame))) => frame,
            Some(Err(e)) => {
                let error = anyhow!(e).context("rendering frame");
                self.fail(event_loop, error);
                return;
            }
        };

        let raw_input = gui.winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            for edit in world.show_gui(ctx) {
                tracing::debug!(?edit, "gui edit");
            }
        });
        gui.winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = world.renderer().size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = world.renderer().device();
        let queue = world.renderer().queue();
        for (id, image_delta) in &full_output.textures_delta.set {
            gui.renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        gui.renderer
            .update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gui.renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gui.renderer.free_texture(id);
        }

        frame.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e.context("starting world"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(gui), Some(window)) = (self.gui.as_mut(), self.window.as_ref()) {
            if gui.winit.on_window_event(window, &event).consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(world) = self.world.as_mut() {
                    world.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(world) = self.world.as_mut() {
                    world.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => self.handle_input(&other),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => WorldConfig::from_file(path)?,
        None => WorldConfig::default(),
    };
    if let Some(path) = &cli.background {
        config.background.set_path(path);
    }

    tracing::info!("worldscene-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_map_to_orbit_roles() {
        assert_eq!(map_button(MouseButton::Left), Some(PointerButton::Primary));
        assert_eq!(map_button(MouseButton::Right), Some(PointerButton::Secondary));
        assert_eq!(map_button(MouseButton::Middle), Some(PointerButton::Middle));
        assert_eq!(map_button(MouseButton::Back), None);
    }

    #[test]
    fn arrows_map_to_keys() {
        assert_eq!(map_key(KeyCode::ArrowLeft), Key::ArrowLeft);
        assert_eq!(map_key(KeyCode::KeyW), Key::Other);
    }

    #[test]
    fn wheel_down_is_positive() {
        assert_eq!(wheel_delta(MouseScrollDelta::LineDelta(0.0, -1.0)), 1.0);
        let pixels = MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, 80.0));
        assert_eq!(wheel_delta(pixels), -2.0);
    }
}
