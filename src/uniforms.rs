//! Per-frame uniform block.
//!
//! Mirrors `struct Uniforms` in `particles.wgsl` field for field. The layout
//! follows WGSL uniform rules: three 64-byte matrices, four scalars, then
//! 8-byte aligned pairs, padded to a 16-byte multiple.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Vec2, Vec3};

use crate::config::ParticleSystemConfig;
use crate::gpu::camera::Camera;
use crate::viewport::ViewportState;

/// GPU uniform data shared by both shader stages.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub time: f32,
    pub spread: f32,
    pub base_size: f32,
    pub size_randomness: f32,
    pub mouse: [f32; 2],
    pub hover_factor: f32,
    /// 1.0 for soft alpha discs, 0.0 for hard opaque ones.
    pub alpha_particles: f32,
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

/// Mutable per-frame state owned by the render loop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    /// Accumulated `delta * speed`, in seconds.
    pub elapsed: f32,
    /// Pointer in normalized surface coordinates, `[-1, 1]` on both axes.
    pub pointer: Vec2,
    /// Whole-field rotation angles (x, y, z) in radians.
    pub rotation: Vec3,
}

impl FrameState {
    /// Model matrix for the current rotation (Euler order YXZ).
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }
}

impl Uniforms {
    /// Assemble the uniform block for one draw.
    pub fn new(
        config: &ParticleSystemConfig,
        frame: &FrameState,
        camera: &Camera,
        viewport: &ViewportState,
    ) -> Self {
        Self {
            model: frame.model_matrix().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            time: frame.elapsed,
            spread: config.spread,
            base_size: config.base_size,
            size_randomness: config.size_randomness,
            mouse: frame.pointer.to_array(),
            hover_factor: config.hover_factor(),
            alpha_particles: if config.alpha_particles { 1.0 } else { 0.0 },
            viewport: [viewport.width as f32, viewport.height as f32],
            _padding: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_is_16_byte_multiple() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 240);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn test_identity_model_without_rotation() {
        let frame = FrameState::default();
        assert!(frame.model_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_uniforms_carry_config() {
        let config = ParticleSystemConfig {
            alpha_particles: false,
            hover: None,
            ..Default::default()
        };
        let camera = Camera::new(config.camera_distance, 4.0 / 3.0);
        let frame = FrameState {
            elapsed: 1.5,
            pointer: Vec2::new(0.25, -0.5),
            rotation: Vec3::ZERO,
        };
        let viewport = ViewportState::new(800, 600);
        let u = Uniforms::new(&config, &frame, &camera, &viewport);

        assert_eq!(u.time, 1.5);
        assert_eq!(u.spread, 10.0);
        assert_eq!(u.mouse, [0.25, -0.5]);
        assert_eq!(u.hover_factor, 0.0);
        assert_eq!(u.alpha_particles, 0.0);
        assert_eq!(u.viewport, [800.0, 600.0]);
    }
}
