//! Error types for the particle field.
//!
//! Failures fall into three groups: invalid configuration (rejected before
//! anything is created), GPU setup or loss (the effect is dropped, the host
//! keeps running), and host/window failures surfaced by [`ParticleField::run`].
//!
//! [`ParticleField::run`]: crate::ParticleField::run

use thiserror::Error;

/// Errors produced while parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The string (after stripping `#`) was not exactly six characters.
    #[error("color {0:?} must have exactly 6 hex digits")]
    Length(String),
    /// The string contained a non-hex character.
    #[error("color {0:?} contains non-hex characters")]
    Digits(String),
}

/// Errors produced when validating or loading a particle configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Particle count below zero.
    #[error("particle count must be non-negative, got {0}")]
    NegativeParticleCount(i64),
    /// Particle count does not fit the GPU instance range.
    #[error("particle count {0} exceeds the maximum of {max}", max = u32::MAX)]
    TooManyParticles(i64),
    /// No colors to pick from.
    #[error("particle color list must not be empty")]
    EmptyColors,
    /// A color entry failed to parse.
    #[error("invalid particle color at index {index}: {source}")]
    InvalidColor {
        index: usize,
        #[source]
        source: ColorError,
    },
    /// The background color failed to parse.
    #[error("invalid background color: {0}")]
    InvalidBackground(#[source] ColorError),
    /// A numeric field is NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    /// A numeric field that must be non-negative is negative.
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    /// Camera sits on the origin it looks at.
    #[error("camera distance must be greater than zero, got {0}")]
    CameraDistance(f32),
    /// Size randomness outside `[0, 1]`.
    #[error("size randomness must lie in [0, 1], got {0}")]
    SizeRandomness(f32),
    /// Reading a config file failed.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// A config file was not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during GPU initialization or rendering.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface or device was invalidated by the host.
    #[error("drawing context lost")]
    ContextLost,
    /// More particles than the backend's attribute buffers can hold.
    #[error("{count} particles exceed this device's limit of {limit}")]
    TooManyParticles { count: u64, limit: u64 },
    /// The surface could not supply a frame this time; the next one may succeed.
    #[error("frame skipped: {0}")]
    FrameSkipped(String),
}

/// Errors that stop [`ParticleField::run`] before or while the window runs.
///
/// [`ParticleField::run`]: crate::ParticleField::run
#[derive(Debug, Error)]
pub enum FieldError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Failed to create or run the event loop.
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
