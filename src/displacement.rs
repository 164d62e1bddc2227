//! CPU evaluation of the particle shader math.
//!
//! Every function here matches a step of `particles.wgsl` expression for
//! expression, so motion and masking can be checked without a GPU.

use glam::{Mat4, Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

use crate::uniforms::Uniforms;

/// Depth axis stretch applied on top of the spread.
pub const DEPTH_STRETCH: f32 = 10.0;
/// Idle drift amplitude at seed 0.
pub const MIN_AMPLITUDE: f32 = 0.1;
/// Idle drift amplitude at seed 1.
pub const MAX_AMPLITUDE: f32 = 1.5;
/// Seed-to-phase scale (the shader's approximation of 2π).
pub const PHASE_SCALE: f32 = 6.28;

/// WGSL/GLSL `smoothstep`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Drift amplitude for a seed component, linear between the bounds.
pub fn amplitude(seed: f32) -> f32 {
    MIN_AMPLITUDE + (MAX_AMPLITUDE - MIN_AMPLITUDE) * seed
}

/// Base position scaled into spread space.
pub fn spread_position(position: Vec3, spread: f32) -> Vec3 {
    let pos = position * spread;
    Vec3::new(pos.x, pos.y, pos.z * DEPTH_STRETCH)
}

/// Idle oscillation offset at time `t`.
pub fn idle_offset(random: Vec4, t: f32) -> Vec3 {
    Vec3::new(
        (t * random.z + PHASE_SCALE * random.w).sin() * amplitude(random.x),
        (t * random.y + PHASE_SCALE * random.x).sin() * amplitude(random.w),
        (t * random.w + PHASE_SCALE * random.y).sin() * amplitude(random.z),
    )
}

/// Planar push away from the pointer.
///
/// `pointer` is in normalized surface coordinates; it is mapped into spread
/// space before measuring. Zero whenever `hover_factor` is zero.
pub fn repulsion(xy: Vec2, pointer: Vec2, spread: f32, hover_factor: f32) -> Vec2 {
    let away = xy - pointer * spread * 2.0;
    let dist = away.length();
    let radius = (spread * 0.5).max(1e-5);
    let effect = smoothstep(0.0, 1.0, 1.0 - dist / radius);
    if dist > 1e-6 {
        away / dist * effect * hover_factor
    } else {
        Vec2::ZERO
    }
}

/// World-space particle position for one frame.
pub fn displaced_position(position: Vec3, random: Vec4, uniforms: &Uniforms) -> Vec3 {
    let model = Mat4::from_cols_array_2d(&uniforms.model);
    let pos = spread_position(position, uniforms.spread);
    let mut m_pos = (model * pos.extend(1.0)).xyz();
    m_pos += idle_offset(random, uniforms.time);

    let push = repulsion(
        m_pos.xy(),
        Vec2::from_array(uniforms.mouse),
        uniforms.spread,
        uniforms.hover_factor,
    );
    m_pos + push.extend(0.0)
}

/// Point size in pixels for a particle at `view_distance` from the camera.
pub fn point_size(base_size: f32, size_randomness: f32, seed: f32, view_distance: f32) -> f32 {
    base_size * (1.0 + size_randomness * (seed - 0.5)) / (1.0 + view_distance)
}

/// Base color plus the animated shift; `uv` is point-sprite space `[0, 1]²`.
pub fn shimmer(color: Vec3, uv: Vec2, time: f32, seed: f32) -> Vec3 {
    let phase = time + seed * PHASE_SCALE;
    let swizzled = Vec3::new(uv.y, uv.x, uv.x) + Vec3::splat(phase);
    color + 0.2 * Vec3::new(swizzled.x.sin(), swizzled.y.sin(), swizzled.z.sin())
}

/// Coverage of a sprite pixel; `None` means the pixel is discarded.
pub fn disc_alpha(uv: Vec2, alpha_particles: bool) -> Option<f32> {
    let d = (uv - Vec2::splat(0.5)).length();
    if alpha_particles {
        Some((1.0 - smoothstep(0.4, 0.5, d)) * 0.8)
    } else if d > 0.5 {
        None
    } else {
        Some(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticleSystemConfig;
    use crate::gpu::camera::Camera;
    use crate::uniforms::FrameState;
    use crate::viewport::ViewportState;

    fn uniforms(config: &ParticleSystemConfig, frame: FrameState) -> Uniforms {
        let camera = Camera::new(config.camera_distance, 1.0);
        Uniforms::new(config, &frame, &camera, &ViewportState::new(800, 800))
    }

    #[test]
    fn test_amplitude_law() {
        assert!((amplitude(0.0) - 0.1).abs() < 1e-6);
        assert!((amplitude(1.0) - 1.5).abs() < 1e-6);
        assert!((amplitude(0.5) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_depth_stretch() {
        let p = spread_position(Vec3::new(0.5, -0.5, 0.1), 10.0);
        assert_eq!(p, Vec3::new(5.0, -5.0, 10.0));
    }

    #[test]
    fn test_idle_offset_bounded_by_amplitude() {
        let random = Vec4::new(0.2, 0.9, 0.4, 0.7);
        for step in 0..200 {
            let o = idle_offset(random, step as f32 * 0.37);
            assert!(o.x.abs() <= amplitude(random.x) + 1e-6);
            assert!(o.y.abs() <= amplitude(random.w) + 1e-6);
            assert!(o.z.abs() <= amplitude(random.z) + 1e-6);
        }
    }

    #[test]
    fn test_repulsion_zero_without_hover() {
        for &(x, y) in &[(0.0, 0.0), (1.0, 2.0), (-3.0, 0.5), (10.0, -10.0)] {
            for &(px, py) in &[(0.0, 0.0), (0.05, 0.1), (-1.0, 1.0)] {
                let push = repulsion(Vec2::new(x, y), Vec2::new(px, py), 10.0, 0.0);
                assert_eq!(push, Vec2::ZERO);
            }
        }
    }

    #[test]
    fn test_repulsion_pushes_away_within_radius() {
        // Pointer at (0.05, 0) maps to (1, 0) in spread 10 space.
        let push = repulsion(Vec2::new(2.0, 0.0), Vec2::new(0.05, 0.0), 10.0, 2.0);
        assert!(push.x > 0.0);
        assert!(push.y.abs() < 1e-6);
        assert!(push.length() <= 2.0 + 1e-6);
    }

    #[test]
    fn test_repulsion_zero_beyond_threshold() {
        // Threshold is spread * 0.5 = 5 units.
        let push = repulsion(Vec2::new(6.0, 0.0), Vec2::ZERO, 10.0, 2.0);
        assert_eq!(push, Vec2::ZERO);
    }

    #[test]
    fn test_pointer_ignored_when_hover_disabled() {
        let config = ParticleSystemConfig {
            hover: None,
            ..Default::default()
        };
        let random = Vec4::new(0.3, 0.6, 0.1, 0.8);
        let position = Vec3::new(0.01, -0.02, 0.0);
        let at_origin = displaced_position(position, random, &uniforms(&config, FrameState::default()));
        for pointer in [Vec2::new(0.0, 0.0), Vec2::new(0.01, -0.01), Vec2::new(-1.0, 1.0)] {
            let frame = FrameState {
                pointer,
                ..Default::default()
            };
            let moved = displaced_position(position, random, &uniforms(&config, frame));
            assert_eq!(moved, at_origin);
        }
    }

    #[test]
    fn test_point_size_falls_off_with_distance() {
        let near = point_size(80.0, 0.8, 0.5, 5.0);
        let far = point_size(80.0, 0.8, 0.5, 50.0);
        assert!(near > far);
        assert!((point_size(80.0, 0.8, 0.5, 0.0) - 80.0).abs() < 1e-6);
        // Randomness scales around 1.0
        assert!((point_size(80.0, 0.8, 1.0, 0.0) - 80.0 * 1.4).abs() < 1e-4);
        assert!((point_size(80.0, 0.8, 0.0, 0.0) - 80.0 * 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_disc_masks() {
        let center = Vec2::splat(0.5);
        let corner = Vec2::ZERO;
        assert_eq!(disc_alpha(center, false), Some(1.0));
        assert_eq!(disc_alpha(corner, false), None);
        assert!((disc_alpha(center, true).unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(disc_alpha(corner, true), Some(0.0));
    }

    #[test]
    fn test_shimmer_stays_near_base_color() {
        let base = Vec3::new(0.2, 0.4, 0.9);
        for step in 0..50 {
            let c = shimmer(base, Vec2::new(0.3, 0.7), step as f32 * 0.1, 0.25);
            assert!((c - base).abs().max_element() <= 0.2 + 1e-6);
        }
    }
}
