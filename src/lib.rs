//! # Particle Field
//!
//! A GPU-rendered field of drifting, color-varied particles for decorative
//! backgrounds.
//!
//! Each particle keeps a fixed random seed. Every frame the vertex shader
//! combines that seed with elapsed time to produce a smooth drift, an optional
//! repulsion away from the pointer, and a perspective-scaled sprite size. The
//! fragment shader draws the sprite as a soft or hard-edged disc with a slight
//! color shimmer. The whole field rotates slowly around the origin.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_field::prelude::*;
//!
//! fn main() -> Result<(), FieldError> {
//!     ParticleField::new()
//!         .with_particle_count(5000)
//!         .with_colors(&["#3b82f6", "#6366f1", "#8b5cf6"])
//!         .with_hover(true, 2.0)
//!         .run()
//! }
//! ```
//!
//! ## Layout
//!
//! - [`config`]: user-facing settings and their validated form
//! - [`spawn`]: per-particle attribute generation
//! - [`controller`]: the frame loop state machine, independent of any window
//! - [`gpu`]: the wgpu backend and camera
//! - [`displacement`]: CPU mirror of the shader math, for tests and tooling
//! - [`ParticleField`]: hosts everything in a winit window
//!
//! Hosts other than the built-in window can drive [`RenderLoop`] directly with
//! their own [`FrameRenderer`] and call [`RenderLoop::tick`] from whatever
//! refresh callback they have.

pub mod color;
pub mod config;
pub mod controller;
pub mod displacement;
pub mod error;
pub mod gpu;
pub mod input;
pub mod shader;
mod simulation;
pub mod spawn;
pub mod time;
pub mod uniforms;
pub mod viewport;

pub use config::{ParticleSystemConfig, ParticlesConfig, DEFAULT_COLORS};
pub use controller::{FrameRenderer, LoopState, RenderLoop};
pub use error::{ColorError, ConfigError, FieldError, GpuError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::GpuRenderer;
pub use simulation::ParticleField;
pub use spawn::ParticleBuffers;
pub use uniforms::{FrameState, Uniforms};
pub use viewport::ViewportState;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{hex_to_rgb, rgb_to_hex};
    pub use crate::config::{ParticleSystemConfig, ParticlesConfig};
    pub use crate::controller::{FrameRenderer, LoopState, RenderLoop};
    pub use crate::error::{ConfigError, FieldError, GpuError};
    pub use crate::simulation::ParticleField;
    pub use crate::time::FrameClock;
    pub use crate::viewport::ViewportState;
    pub use crate::{Vec2, Vec3, Vec4};
}
