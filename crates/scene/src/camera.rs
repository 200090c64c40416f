use glam::{Mat4, Vec3};

/// Perspective camera looking from `position` towards `target`.
///
/// The projection matrix is cached; call `update_projection_matrix` after
/// changing `fov`, `aspect`, `near` or `far`.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::create(35.0, 0.1, 100.0, Vec3::new(0.0, 4.0, 12.0))
    }
}

impl PerspectiveCamera {
    /// Build a camera. The aspect ratio starts at 1.0 until the first resize.
    pub fn create(fov: f32, near: f32, far: f32, position: Vec3) -> Self {
        let mut camera = Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov,
            aspect: 1.0,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    pub fn distance_to_target(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.fov, 35.0);
        assert_eq!(cam.aspect, 1.0);
        assert!(cam.position.y > 0.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn projection_tracks_aspect_after_update() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.projection_matrix();
        cam.aspect = 2.0;
        assert_eq!(cam.projection_matrix(), before);
        cam.update_projection_matrix();
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(35.0_f32.to_radians(), 2.0, 0.1, 100.0)
        );
    }

    #[test]
    fn forward_points_at_target() {
        let cam = PerspectiveCamera::create(50.0, 0.1, 10.0, Vec3::new(0.0, 0.0, 5.0));
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert_eq!(cam.distance_to_target(), 5.0);
    }
}
