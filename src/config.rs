//! Particle field configuration.
//!
//! [`ParticlesConfig`] is what a host hands over: every field optional, JSON
//! friendly, defaults matching the hero background. [`ParticlesConfig::validate`]
//! turns it into the immutable [`ParticleSystemConfig`] the renderer runs on,
//! rejecting anything that cannot be drawn instead of coercing it.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::hex_to_rgb;
use crate::error::ConfigError;

/// Blue, indigo, purple.
pub const DEFAULT_COLORS: [&str; 3] = ["#3b82f6", "#6366f1", "#8b5cf6"];

/// Host-facing particle configuration.
///
/// Keys are snake_case; the camelCase names used by web hosts are accepted
/// as aliases so an existing props object can be loaded unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticlesConfig {
    #[serde(alias = "particleCount")]
    pub particle_count: i64,
    #[serde(alias = "particleSpread")]
    pub particle_spread: f32,
    pub speed: f32,
    #[serde(alias = "particleColors")]
    pub particle_colors: Vec<String>,
    #[serde(alias = "moveParticlesOnHover")]
    pub move_particles_on_hover: bool,
    #[serde(alias = "particleHoverFactor")]
    pub particle_hover_factor: f32,
    #[serde(alias = "alphaParticles")]
    pub alpha_particles: bool,
    #[serde(alias = "particleBaseSize")]
    pub particle_base_size: f32,
    #[serde(alias = "sizeRandomness")]
    pub size_randomness: f32,
    #[serde(alias = "cameraDistance")]
    pub camera_distance: f32,
    #[serde(alias = "disableRotation")]
    pub disable_rotation: bool,
    /// Fixed RNG seed for reproducible buffers; random per run when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Clear color behind the particles.
    pub background: String,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            particle_count: 200,
            particle_spread: 10.0,
            speed: 0.2,
            particle_colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            move_particles_on_hover: true,
            particle_hover_factor: 2.0,
            alpha_particles: true,
            particle_base_size: 80.0,
            size_randomness: 0.8,
            camera_distance: 15.0,
            disable_rotation: false,
            seed: None,
            background: "#172554".to_string(),
        }
    }
}

impl ParticlesConfig {
    /// Parse a config from a JSON string. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field and produce the immutable system configuration.
    pub fn validate(&self) -> Result<ParticleSystemConfig, ConfigError> {
        if self.particle_count < 0 {
            return Err(ConfigError::NegativeParticleCount(self.particle_count));
        }
        let particle_count = u32::try_from(self.particle_count)
            .map_err(|_| ConfigError::TooManyParticles(self.particle_count))?;

        if self.particle_colors.is_empty() {
            return Err(ConfigError::EmptyColors);
        }
        let colors = self
            .particle_colors
            .iter()
            .enumerate()
            .map(|(index, hex)| {
                hex_to_rgb(hex).map_err(|source| ConfigError::InvalidColor { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let background = hex_to_rgb(&self.background).map_err(ConfigError::InvalidBackground)?;

        let spread = non_negative("particle_spread", self.particle_spread)?;
        let speed = non_negative("speed", self.speed)?;
        let hover_factor = non_negative("particle_hover_factor", self.particle_hover_factor)?;
        let base_size = non_negative("particle_base_size", self.particle_base_size)?;

        let size_randomness = finite("size_randomness", self.size_randomness)?;
        if !(0.0..=1.0).contains(&size_randomness) {
            return Err(ConfigError::SizeRandomness(size_randomness));
        }

        let camera_distance = finite("camera_distance", self.camera_distance)?;
        if camera_distance <= 0.0 {
            return Err(ConfigError::CameraDistance(camera_distance));
        }

        Ok(ParticleSystemConfig {
            particle_count,
            spread,
            speed,
            colors,
            hover: self.move_particles_on_hover.then_some(hover_factor),
            alpha_particles: self.alpha_particles,
            base_size,
            size_randomness,
            camera_distance,
            rotation: !self.disable_rotation,
            seed: self.seed,
            background,
        })
    }
}

impl TryFrom<&ParticlesConfig> for ParticleSystemConfig {
    type Error = ConfigError;

    fn try_from(config: &ParticlesConfig) -> Result<Self, Self::Error> {
        config.validate()
    }
}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(value)
}

/// Validated, immutable configuration captured when the field starts.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSystemConfig {
    /// Number of particles.
    pub particle_count: u32,
    /// Lateral spread radius; depth is stretched 10x on top of this.
    pub spread: f32,
    /// Multiplier applied to wall-clock time.
    pub speed: f32,
    /// Palette particles pick from (normalized RGB, never empty).
    pub colors: Vec<Vec3>,
    /// Pointer repulsion strength, `None` when the field ignores the pointer.
    pub hover: Option<f32>,
    /// Soft alpha-blended discs instead of hard opaque ones.
    pub alpha_particles: bool,
    /// Point size in pixels before randomization and depth falloff.
    pub base_size: f32,
    /// Per-particle size variation in `[0, 1]`.
    pub size_randomness: f32,
    /// Camera distance from the origin along +Z.
    pub camera_distance: f32,
    /// Slow idle rotation of the whole cloud.
    pub rotation: bool,
    /// Optional RNG seed for buffer generation.
    pub seed: Option<u64>,
    /// Clear color.
    pub background: Vec3,
}

impl ParticleSystemConfig {
    /// Pointer repulsion strength as uploaded to the shader (zero when disabled).
    pub fn hover_factor(&self) -> f32 {
        self.hover.unwrap_or(0.0)
    }
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        ParticlesConfig::default()
            .validate()
            .unwrap_or_else(|e| unreachable!("default particle config is valid: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParticleSystemConfig::default();
        assert_eq!(config.particle_count, 200);
        assert_eq!(config.spread, 10.0);
        assert_eq!(config.speed, 0.2);
        assert_eq!(config.colors.len(), 3);
        assert_eq!(config.hover, Some(2.0));
        assert!(config.alpha_particles);
        assert_eq!(config.base_size, 80.0);
        assert_eq!(config.size_randomness, 0.8);
        assert_eq!(config.camera_distance, 15.0);
        assert!(config.rotation);
    }

    #[test]
    fn test_negative_count_rejected() {
        let config = ParticlesConfig {
            particle_count: -1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeParticleCount(-1))
        ));
    }

    #[test]
    fn test_huge_count_rejected() {
        let config = ParticlesConfig {
            particle_count: i64::from(u32::MAX) + 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TooManyParticles(_))));
    }

    #[test]
    fn test_empty_colors_rejected() {
        let config = ParticlesConfig {
            particle_colors: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyColors)));
    }

    #[test]
    fn test_bad_color_reports_index() {
        let config = ParticlesConfig {
            particle_colors: vec!["#000000".into(), "blue".into()],
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidColor { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidColor, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_checks() {
        let nan_speed = ParticlesConfig {
            speed: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan_speed.validate(),
            Err(ConfigError::NonFinite { field: "speed", .. })
        ));

        let negative_spread = ParticlesConfig {
            particle_spread: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            negative_spread.validate(),
            Err(ConfigError::Negative { field: "particle_spread", .. })
        ));

        let wild_size = ParticlesConfig {
            size_randomness: 1.5,
            ..Default::default()
        };
        assert!(matches!(wild_size.validate(), Err(ConfigError::SizeRandomness(_))));

        let camera_on_origin = ParticlesConfig {
            camera_distance: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            camera_on_origin.validate(),
            Err(ConfigError::CameraDistance(_))
        ));
    }

    #[test]
    fn test_hover_disabled_zeroes_factor() {
        let config = ParticlesConfig {
            move_particles_on_hover: false,
            particle_hover_factor: 5.0,
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.hover, None);
        assert_eq!(config.hover_factor(), 0.0);
    }

    #[test]
    fn test_json_accepts_camel_case_and_fills_defaults() {
        let config = ParticlesConfig::from_json_str(
            r##"{ "particleCount": 5000, "particleColors": ["#000000"], "disableRotation": true }"##,
        )
        .unwrap();
        assert_eq!(config.particle_count, 5000);
        assert_eq!(config.particle_colors, vec!["#000000".to_string()]);
        assert!(config.disable_rotation);
        assert_eq!(config.particle_spread, 10.0);

        let validated = config.validate().unwrap();
        assert_eq!(validated.colors, vec![Vec3::ZERO]);
        assert!(!validated.rotation);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ParticlesConfig {
            seed: Some(7),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(ParticlesConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_json_negative_count_is_a_validation_error() {
        let config = ParticlesConfig::from_json_str(r#"{ "particle_count": -10 }"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeParticleCount(-10))
        ));
    }
}
