//! Particle field builder and window host.

use std::sync::Arc;

use tracing::{debug, error, trace, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{ParticleSystemConfig, ParticlesConfig};
use crate::controller::RenderLoop;
use crate::error::FieldError;
use crate::gpu::GpuRenderer;
use crate::input::PointerAdapter;
use crate::time::FrameClock;
use crate::viewport::ViewportState;

/// A particle field builder.
///
/// Use method chaining to configure, then call `.run()` to open a window
/// and animate until it is closed.
///
/// ```ignore
/// ParticleField::new()
///     .with_particle_count(5000)
///     .with_colors(&["#3b82f6", "#6366f1", "#8b5cf6"])
///     .run()?;
/// ```
pub struct ParticleField {
    config: ParticlesConfig,
    title: String,
    width: u32,
    height: u32,
}

impl ParticleField {
    /// Create a field with the default configuration.
    pub fn new() -> Self {
        Self::from_config(ParticlesConfig::default())
    }

    /// Create a field from an existing configuration.
    pub fn from_config(config: ParticlesConfig) -> Self {
        Self {
            config,
            title: "Particle Field".to_string(),
            width: 1280,
            height: 720,
        }
    }

    /// The configuration as built so far.
    pub fn config(&self) -> &ParticlesConfig {
        &self.config
    }

    /// Set the number of particles. Negative counts are rejected by `run`.
    pub fn with_particle_count(mut self, count: i64) -> Self {
        self.config.particle_count = count;
        self
    }

    /// Set the lateral spread radius.
    pub fn with_spread(mut self, spread: f32) -> Self {
        self.config.particle_spread = spread;
        self
    }

    /// Set the animation speed multiplier.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.config.speed = speed;
        self
    }

    /// Set the palette as `#rrggbb` strings.
    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.config.particle_colors = colors.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Enable pointer repulsion with the given strength, or disable it.
    pub fn with_hover(mut self, enabled: bool, factor: f32) -> Self {
        self.config.move_particles_on_hover = enabled;
        self.config.particle_hover_factor = factor;
        self
    }

    /// Soft alpha-blended discs (`true`) or hard opaque ones (`false`).
    pub fn with_alpha_particles(mut self, alpha: bool) -> Self {
        self.config.alpha_particles = alpha;
        self
    }

    /// Set the base point size in logical pixels.
    pub fn with_base_size(mut self, size: f32) -> Self {
        self.config.particle_base_size = size;
        self
    }

    /// Set per-particle size variation in `[0, 1]`.
    pub fn with_size_randomness(mut self, randomness: f32) -> Self {
        self.config.size_randomness = randomness;
        self
    }

    /// Set the camera distance from the origin.
    pub fn with_camera_distance(mut self, distance: f32) -> Self {
        self.config.camera_distance = distance;
        self
    }

    /// Turn the idle rotation off.
    pub fn with_rotation_disabled(mut self, disabled: bool) -> Self {
        self.config.disable_rotation = disabled;
        self
    }

    /// Fix the RNG seed used to generate particles.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the clear color as `#rrggbb`.
    pub fn with_background(mut self, hex: &str) -> Self {
        self.config.background = hex.to_string();
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Validate the configuration, open a window and animate until closed.
    ///
    /// Configuration and event-loop errors are returned. GPU failures are not:
    /// the window stays up without the effect.
    pub fn run(self) -> Result<(), FieldError> {
        let settings = self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(settings, self.title, self.width, self.height);
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    settings: ParticleSystemConfig,
    title: String,
    width: u32,
    height: u32,
    window: Option<Arc<Window>>,
    render_loop: Option<RenderLoop<GpuRenderer>>,
    pointer: Option<PointerAdapter>,
    clock: FrameClock,
}

impl App {
    fn new(settings: ParticleSystemConfig, title: String, width: u32, height: u32) -> Self {
        Self {
            settings,
            title,
            width,
            height,
            window: None,
            render_loop: None,
            pointer: None,
            clock: FrameClock::new(),
        }
    }

    fn start_field(&mut self, window: Arc<Window>) {
        let size = window.inner_size();
        let viewport = ViewportState::new(size.width, size.height);

        let renderer =
            match pollster::block_on(GpuRenderer::new(window.clone(), self.settings.background)) {
                Ok(renderer) => renderer,
                Err(e) => {
                    warn!(error = %e, "GPU unavailable, particle field disabled");
                    return;
                }
            };

        let mut render_loop = RenderLoop::new(self.settings.clone(), renderer, viewport);
        render_loop.set_pixel_ratio(window.scale_factor() as f32);
        self.pointer = render_loop.pointer_adapter();
        if let Err(e) = render_loop.start() {
            warn!(error = %e, "failed to start particle field");
            self.pointer = None;
            return;
        }

        self.render_loop = Some(render_loop);
        window.request_redraw();
    }

    fn teardown(&mut self) {
        if let Some(render_loop) = &mut self.render_loop {
            render_loop.stop();
        }
        self.pointer = None;
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.width, self.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(error = %e, "failed to create window");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());
        self.start_field(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(render_loop) = &mut self.render_loop {
                    render_loop.resize(physical_size.width, physical_size.height);
                }
                if let Some(pointer) = &mut self.pointer {
                    pointer.set_viewport(ViewportState::new(
                        physical_size.width,
                        physical_size.height,
                    ));
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(render_loop) = &mut self.render_loop {
                    render_loop.set_pixel_ratio(scale_factor as f32);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(pointer) = &self.pointer {
                    pointer.on_pointer_move(position.x, position.y);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(render_loop) = &mut self.render_loop else {
                    return;
                };

                let delta = self.clock.tick();
                if !render_loop.tick(delta) {
                    debug!("render loop stopped, no further frames");
                    self.pointer = None;
                    return;
                }
                if self.clock.frame() % 600 == 0 {
                    trace!(fps = self.clock.fps(), "frame rate");
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}
