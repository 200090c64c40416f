//! Orbit controls for rotating, zooming and panning a camera around a target.

use crate::event::{InputEvent, Key, PointerButton};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};
use worldscene_scene::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// What a held pointer button is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
    Dolly,
}

/// Pending angular change, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Camera position relative to the target in spherical form.
/// `phi` is the polar angle from +Y, `theta` the azimuth around Y from +Z.
#[derive(Debug, Clone, Copy)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit controls: the camera circles `target`, always looking at it.
///
/// Primary drag rotates, secondary drag pans, middle drag and the wheel zoom,
/// and arrow keys pan once `listen_to_key_events` has been called.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Point the camera orbits and looks at.
    pub target: Vec3,
    pub enabled: bool,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Pixels panned per arrow key press.
    pub key_pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, 0 = looking straight down.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Keep easing after input stops.
    pub enable_damping: bool,
    /// Fraction of the remaining motion applied each frame when damping.
    pub damping_factor: f32,
    listen_to_keys: bool,
    viewport_height: f32,
    drag: Drag,
    last_pointer: Option<Vec2>,
    spherical_delta: SphericalDelta,
    scale: f32,
    pan_pixels: Vec2,
    pan_offset: Vec3,
    saved: Option<(Vec3, Vec3)>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            key_pan_speed: 7.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enable_damping: false,
            damping_factor: 0.05,
            listen_to_keys: false,
            viewport_height: 600.0,
            drag: Drag::None,
            last_pointer: None,
            spherical_delta: SphericalDelta::default(),
            scale: 1.0,
            pan_pixels: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            saved: None,
        }
    }
}

impl OrbitControls {
    /// Controls orbiting whatever the camera currently looks at.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let mut controls = Self {
            target: camera.target,
            ..Self::default()
        };
        controls.save_state(camera);
        controls
    }

    /// Start reacting to arrow keys.
    pub fn listen_to_key_events(&mut self) {
        self.listen_to_keys = true;
    }

    pub fn is_listening_to_keys(&self) -> bool {
        self.listen_to_keys
    }

    /// Height of the input surface in pixels; converts drag distance to angles.
    pub fn set_viewport_height(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    /// Feed one input event. Returns true if the event was used.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        if !self.enabled {
            return false;
        }
        match *event {
            InputEvent::PointerDown { button, position } => {
                self.drag = match button {
                    PointerButton::Primary if self.enable_rotate => Drag::Rotate,
                    PointerButton::Secondary if self.enable_pan => Drag::Pan,
                    PointerButton::Middle if self.enable_zoom => Drag::Dolly,
                    _ => Drag::None,
                };
                self.last_pointer = Some(position);
                self.drag != Drag::None
            }
            InputEvent::PointerMove { position } => {
                let Some(last) = self.last_pointer else {
                    return false;
                };
                self.last_pointer = Some(position);
                let delta = position - last;
                match self.drag {
                    Drag::Rotate => {
                        self.rotate_left(TAU * delta.x / self.viewport_height * self.rotate_speed);
                        self.rotate_up(TAU * delta.y / self.viewport_height * self.rotate_speed);
                        true
                    }
                    Drag::Pan => {
                        self.pan_pixels += delta * self.pan_speed;
                        true
                    }
                    Drag::Dolly => {
                        if delta.y > 0.0 {
                            self.dolly_out(self.zoom_scale());
                        } else if delta.y < 0.0 {
                            self.dolly_in(self.zoom_scale());
                        }
                        true
                    }
                    Drag::None => false,
                }
            }
            InputEvent::PointerUp { .. } => {
                let was_dragging = self.drag != Drag::None;
                self.drag = Drag::None;
                self.last_pointer = None;
                was_dragging
            }
            InputEvent::Wheel { delta } => {
                if !self.enable_zoom || delta == 0.0 {
                    return false;
                }
                if delta < 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else {
                    self.dolly_out(self.zoom_scale());
                }
                true
            }
            InputEvent::Key { key, pressed } => {
                if !self.listen_to_keys || !self.enable_pan || !pressed {
                    return false;
                }
                let step = self.key_pan_speed;
                let pan = match key {
                    Key::ArrowUp => Vec2::new(0.0, step),
                    Key::ArrowDown => Vec2::new(0.0, -step),
                    Key::ArrowLeft => Vec2::new(step, 0.0),
                    Key::ArrowRight => Vec2::new(-step, 0.0),
                    Key::Other => return false,
                };
                self.pan_pixels += pan;
                true
            }
        }
    }

    /// Apply accumulated input to the camera. Returns true if it moved.
    ///
    /// Call exactly once per frame, before rendering.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.pan_pixels != Vec2::ZERO {
            self.pan_offset += self.pan_to_world(camera, spherical.radius);
            self.pan_pixels = Vec2::ZERO;
        }

        let step = if self.enable_damping {
            self.damping_factor.clamp(0.0, 1.0)
        } else {
            1.0
        };

        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        let min_phi = self.min_polar_angle.max(EPS);
        let max_phi = self.max_polar_angle.min(PI - EPS);
        spherical.phi = spherical.phi.clamp(min_phi, max_phi.max(min_phi));

        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.min_distance, self.max_distance.max(self.min_distance));

        self.target += self.pan_offset * step;

        let new_position = self.target + spherical.to_offset();
        let moved = new_position.distance_squared(camera.position) > EPS * EPS
            || camera.target.distance_squared(self.target) > EPS * EPS;
        camera.position = new_position;
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - step;
            self.spherical_delta.phi *= 1.0 - step;
            self.pan_offset *= 1.0 - step;
        } else {
            self.spherical_delta = SphericalDelta::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        if moved {
            tracing::trace!(
                x = camera.position.x,
                y = camera.position.y,
                z = camera.position.z,
                "orbit camera moved"
            );
        }
        moved
    }

    /// Remember the camera pose for a later `reset`.
    pub fn save_state(&mut self, camera: &PerspectiveCamera) {
        self.saved = Some((self.target, camera.position));
    }

    /// Return the camera to the saved pose and drop pending input.
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) {
        if let Some((target, position)) = self.saved {
            self.target = target;
            camera.position = position;
            camera.look_at(target);
        }
        self.drag = Drag::None;
        self.last_pointer = None;
        self.spherical_delta = SphericalDelta::default();
        self.scale = 1.0;
        self.pan_pixels = Vec2::ZERO;
        self.pan_offset = Vec3::ZERO;
    }

    /// Current azimuth of the camera around the target, in radians.
    pub fn azimuthal_angle(&self, camera: &PerspectiveCamera) -> f32 {
        Spherical::from_offset(camera.position - self.target).theta
    }

    /// Current polar angle of the camera, in radians from +Y.
    pub fn polar_angle(&self, camera: &PerspectiveCamera) -> f32 {
        Spherical::from_offset(camera.position - self.target).phi
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn dolly_in(&mut self, scale: f32) {
        self.scale *= scale;
    }

    fn dolly_out(&mut self, scale: f32) {
        self.scale /= scale;
    }

    /// Convert a pixel pan into a world-space target offset at the current distance.
    fn pan_to_world(&self, camera: &PerspectiveCamera, distance: f32) -> Vec3 {
        let half_fov = (camera.fov.to_radians() / 2.0).tan();
        let world_per_pixel = 2.0 * distance * half_fov / self.viewport_height;

        let forward = camera.forward();
        let right = forward.cross(camera.up).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);

        right * (-self.pan_pixels.x * world_per_pixel) + up * (self.pan_pixels.y * world_per_pixel)
    }
}
