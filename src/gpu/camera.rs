//! Fixed perspective camera looking down -Z at the particle field.

use glam::{Mat4, Vec3};

/// Vertical field of view in degrees; narrow, so the field reads almost flat.
pub const FOV_DEGREES: f32 = 15.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Perspective camera on the +Z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Distance from the origin along +Z.
    pub distance: f32,
    /// Viewport width over height.
    pub aspect: f32,
}

impl Camera {
    pub fn new(distance: f32, aspect: f32) -> Self {
        Self { distance, aspect }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// Perspective projection for the current aspect ratio.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_DEGREES.to_radians(), self.aspect, NEAR, FAR)
    }

    /// Update the aspect ratio after a resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_screen_center() {
        let camera = Camera::new(15.0, 16.0 / 9.0);
        let clip = camera.projection_matrix() * camera.view_matrix() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_view_distance() {
        let camera = Camera::new(15.0, 1.0);
        let view_pos = camera.view_matrix() * Vec3::ZERO.extend(1.0);
        assert!((view_pos.truncate().length() - 15.0).abs() < 1e-4);
    }
}
