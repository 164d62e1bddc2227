//! Render loop controller.
//!
//! Owns the per-frame state and drives a [`FrameRenderer`] through three
//! states:
//!
//! ```text
//! Uninitialized --start()--> Running --stop()/context lost--> Disposed
//!                              |  ^
//!                              +--+ tick(delta)
//! ```
//!
//! The host decides when frames happen and calls [`RenderLoop::tick`] with
//! the wall-clock delta; nothing here schedules itself. That keeps the
//! animation math independent of any windowing system and lets tests feed
//! synthetic deltas.

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::config::ParticleSystemConfig;
use crate::error::GpuError;
use crate::gpu::camera::Camera;
use crate::input::{LatestReader, PointerAdapter};
use crate::spawn::ParticleBuffers;
use crate::uniforms::{FrameState, Uniforms};
use crate::viewport::ViewportState;

/// Idle spin around Z per frame, before the speed multiplier.
const Z_SPIN_PER_FRAME: f32 = 0.001;

/// Backend the render loop draws through.
///
/// [`GpuRenderer`](crate::gpu::GpuRenderer) is the wgpu implementation;
/// tests use a recording fake.
pub trait FrameRenderer {
    /// Upload the static particle attributes. Called once, from `start`.
    fn upload(&mut self, buffers: &ParticleBuffers) -> Result<(), GpuError>;

    /// The drawing surface changed size.
    fn resize(&mut self, viewport: ViewportState);

    /// Issue one draw of the whole field.
    ///
    /// [`GpuError::FrameSkipped`] drops this frame only; any other error is
    /// treated as loss of the drawing context.
    fn draw(&mut self, uniforms: &Uniforms) -> Result<(), GpuError>;

    /// Release GPU resources. Called at most once.
    fn release(&mut self);

    /// Largest particle count `upload` accepts.
    fn max_particles(&self) -> u32 {
        u32::MAX
    }
}

/// Lifecycle of a [`RenderLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Created, nothing allocated yet.
    Uninitialized,
    /// Buffers uploaded, accepting ticks.
    Running,
    /// Resources released; terminal.
    Disposed,
}

/// Drives the particle field frame by frame.
pub struct RenderLoop<R: FrameRenderer> {
    config: ParticleSystemConfig,
    renderer: R,
    camera: Camera,
    viewport: ViewportState,
    frame: FrameState,
    pointer: Option<LatestReader<Vec2>>,
    state: LoopState,
    draw_count: u64,
    /// Physical pixels per logical pixel; point sizes are in logical pixels.
    pixel_ratio: f32,
}

impl<R: FrameRenderer> RenderLoop<R> {
    pub fn new(config: ParticleSystemConfig, renderer: R, viewport: ViewportState) -> Self {
        let camera = Camera::new(config.camera_distance, viewport.aspect());
        Self {
            config,
            renderer,
            camera,
            viewport,
            frame: FrameState::default(),
            pointer: None,
            state: LoopState::Uninitialized,
            draw_count: 0,
            pixel_ratio: 1.0,
        }
    }

    /// Set the display scale factor. Non-finite or non-positive ratios are
    /// ignored.
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() && ratio > 0.0 {
            self.pixel_ratio = ratio;
        }
    }

    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Create the pointer adapter feeding this loop.
    ///
    /// Returns `None` when the configuration ignores the pointer; in that
    /// case the pointer uniform stays at the origin for the whole session.
    pub fn pointer_adapter(&mut self) -> Option<PointerAdapter> {
        if self.config.hover.is_none() || self.state == LoopState::Disposed {
            return None;
        }
        let (adapter, reader) = PointerAdapter::new(self.viewport);
        self.pointer = Some(reader);
        Some(adapter)
    }

    /// Generate particle buffers from the config and start.
    ///
    /// The count is checked against the renderer's limit before anything is
    /// generated, so an oversized field never allocates its buffers.
    pub fn start(&mut self) -> Result<(), GpuError> {
        if self.state != LoopState::Uninitialized {
            debug!(state = ?self.state, "ignoring start on a loop that already started");
            return Ok(());
        }
        self.check_capacity(self.config.particle_count as usize)?;
        let buffers = ParticleBuffers::from_config(&self.config);
        self.start_with_buffers(&buffers)
    }

    /// Start with caller-provided buffers.
    ///
    /// Only valid from [`LoopState::Uninitialized`]; later calls are ignored.
    /// An oversized field or an upload failure disposes the loop.
    pub fn start_with_buffers(&mut self, buffers: &ParticleBuffers) -> Result<(), GpuError> {
        if self.state != LoopState::Uninitialized {
            debug!(state = ?self.state, "ignoring start on a loop that already started");
            return Ok(());
        }
        self.check_capacity(buffers.len())?;

        if let Err(e) = self.renderer.upload(buffers) {
            self.fail_start();
            return Err(e);
        }
        self.state = LoopState::Running;
        self.apply_viewport(self.viewport);

        debug!(
            particles = buffers.len(),
            width = self.viewport.width,
            height = self.viewport.height,
            "particle field started"
        );
        Ok(())
    }

    fn check_capacity(&mut self, count: usize) -> Result<(), GpuError> {
        let limit = self.renderer.max_particles();
        if count as u64 > u64::from(limit) {
            self.fail_start();
            return Err(GpuError::TooManyParticles {
                count: count as u64,
                limit: u64::from(limit),
            });
        }
        Ok(())
    }

    fn fail_start(&mut self) {
        self.state = LoopState::Disposed;
        self.pointer = None;
    }

    /// Resize adapter: record the new surface size and update the camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state == LoopState::Disposed {
            return;
        }
        self.apply_viewport(ViewportState::new(width, height));
    }

    fn apply_viewport(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        if self.state == LoopState::Running {
            self.renderer.resize(viewport);
        }
    }

    /// Advance by `delta` wall-clock seconds and draw one frame.
    ///
    /// Returns whether the loop is still running, i.e. whether the host
    /// should schedule another tick.
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.state != LoopState::Running {
            return false;
        }

        let speed = self.config.speed;
        self.frame.elapsed += delta.max(0.0) * speed;
        if let Some(pointer) = &self.pointer {
            self.frame.pointer = pointer.latest();
        }
        if self.config.rotation {
            let t = self.frame.elapsed;
            self.frame.rotation.x = (t * 0.5).sin() * 0.1;
            self.frame.rotation.y = (t * 0.3).cos() * 0.15;
            self.frame.rotation.z += Z_SPIN_PER_FRAME * speed;
        }

        let mut uniforms = Uniforms::new(&self.config, &self.frame, &self.camera, &self.viewport);
        uniforms.base_size *= self.pixel_ratio;
        match self.renderer.draw(&uniforms) {
            Ok(()) => self.draw_count += 1,
            Err(GpuError::FrameSkipped(reason)) => {
                trace!(%reason, "frame skipped");
            }
            Err(e) => {
                warn!(error = %e, "particle field stopped");
                self.stop();
            }
        }

        self.state == LoopState::Running
    }

    /// Tear down. Idempotent: only the first call releases anything.
    pub fn stop(&mut self) {
        match self.state {
            LoopState::Running => {
                self.pointer = None;
                self.renderer.release();
                self.state = LoopState::Disposed;
                debug!(frames = self.draw_count, "particle field disposed");
            }
            LoopState::Uninitialized => {
                self.pointer = None;
                self.state = LoopState::Disposed;
            }
            LoopState::Disposed => {}
        }
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Current per-frame state.
    #[inline]
    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    #[inline]
    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    /// Successful draws so far.
    #[inline]
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: FrameRenderer> Drop for RenderLoop<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        uploads: usize,
        draws: usize,
        releases: usize,
    }

    impl FrameRenderer for Counting {
        fn upload(&mut self, _buffers: &ParticleBuffers) -> Result<(), GpuError> {
            self.uploads += 1;
            Ok(())
        }
        fn resize(&mut self, _viewport: ViewportState) {}
        fn draw(&mut self, _uniforms: &Uniforms) -> Result<(), GpuError> {
            self.draws += 1;
            Ok(())
        }
        fn release(&mut self) {
            self.releases += 1;
        }
    }

    fn looped(config: ParticleSystemConfig) -> RenderLoop<Counting> {
        RenderLoop::new(config, Counting::default(), ViewportState::new(800, 600))
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let mut rl = looped(ParticleSystemConfig::default());
        assert!(!rl.tick(0.016));
        assert_eq!(rl.renderer().draws, 0);
        assert_eq!(rl.state(), LoopState::Uninitialized);
    }

    #[test]
    fn test_elapsed_scales_with_speed() {
        let mut rl = looped(ParticleSystemConfig {
            speed: 0.5,
            ..Default::default()
        });
        rl.start().unwrap();
        rl.tick(0.0);
        rl.tick(1.0);
        rl.tick(1.0);
        assert!((rl.frame().elapsed - 1.0).abs() < 1e-6);
        assert_eq!(rl.draw_count(), 3);
    }

    #[test]
    fn test_negative_delta_does_not_rewind() {
        let mut rl = looped(ParticleSystemConfig::default());
        rl.start().unwrap();
        rl.tick(1.0);
        let before = rl.frame().elapsed;
        rl.tick(-5.0);
        assert_eq!(rl.frame().elapsed, before);
    }

    #[test]
    fn test_rotation_law() {
        let mut rl = looped(ParticleSystemConfig {
            speed: 1.0,
            ..Default::default()
        });
        rl.start().unwrap();
        rl.tick(2.0);
        let r = rl.frame().rotation;
        assert!((r.x - (1.0f32).sin() * 0.1).abs() < 1e-6);
        assert!((r.y - (0.6f32).cos() * 0.15).abs() < 1e-6);
        assert!((r.z - 0.001).abs() < 1e-7);
        rl.tick(0.0);
        assert!((rl.frame().rotation.z - 0.002).abs() < 1e-7);
    }

    #[test]
    fn test_rotation_disabled() {
        let mut rl = looped(ParticleSystemConfig {
            rotation: false,
            ..Default::default()
        });
        rl.start().unwrap();
        for _ in 0..10 {
            rl.tick(0.1);
        }
        assert_eq!(rl.frame().rotation, glam::Vec3::ZERO);
    }

    #[test]
    fn test_no_pointer_adapter_without_hover() {
        let mut rl = looped(ParticleSystemConfig {
            hover: None,
            ..Default::default()
        });
        assert!(rl.pointer_adapter().is_none());
    }

    #[test]
    fn test_second_start_is_ignored() {
        let mut rl = looped(ParticleSystemConfig::default());
        rl.start().unwrap();
        rl.start().unwrap();
        assert_eq!(rl.renderer().uploads, 1);
    }

    #[test]
    fn test_stop_releases_once() {
        let mut rl = looped(ParticleSystemConfig::default());
        rl.start().unwrap();
        rl.stop();
        rl.stop();
        assert_eq!(rl.renderer().releases, 1);
        assert_eq!(rl.state(), LoopState::Disposed);
        assert!(!rl.tick(0.016));
    }

    #[test]
    fn test_stop_before_start_releases_nothing() {
        let mut rl = looped(ParticleSystemConfig::default());
        rl.stop();
        assert_eq!(rl.renderer().releases, 0);
        assert_eq!(rl.state(), LoopState::Disposed);
        rl.start().unwrap();
        assert_eq!(rl.renderer().uploads, 0);
    }
}
