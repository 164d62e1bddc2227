//! Particle attribute generation.
//!
//! Builds the three per-particle attribute arrays once, when the field starts.
//! Nothing here touches the GPU; [`ParticleBuffers`] is uploaded by the
//! renderer and never changes afterwards.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::ParticleSystemConfig;

/// Static per-particle attributes, one entry per particle in each array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffers {
    /// Unit-cube position, each component uniform in `[-1, 1]`.
    pub positions: Vec<[f32; 3]>,
    /// Phase/frequency seeds, each component uniform in `[0, 1]`.
    pub randoms: Vec<[f32; 4]>,
    /// Base color, one of the configured palette entries.
    pub colors: Vec<[f32; 3]>,
}

impl ParticleBuffers {
    /// Generate `count` particles picking colors from `palette`.
    ///
    /// An empty palette yields black particles; validated configs never
    /// have one.
    pub fn generate<R: Rng>(count: u32, palette: &[Vec3], rng: &mut R) -> Self {
        let n = count as usize;
        let mut buffers = Self {
            positions: Vec::with_capacity(n),
            randoms: Vec::with_capacity(n),
            colors: Vec::with_capacity(n),
        };

        for _ in 0..n {
            buffers.positions.push([
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ]);
            buffers.randoms.push([rng.gen(), rng.gen(), rng.gen(), rng.gen()]);

            let color = if palette.is_empty() {
                Vec3::ZERO
            } else {
                palette[rng.gen_range(0..palette.len())]
            };
            buffers.colors.push(color.to_array());
        }

        buffers
    }

    /// Generate buffers for a validated config, seeded from `config.seed`
    /// when present.
    pub fn from_config(config: &ParticleSystemConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::generate(config.particle_count, &config.colors, &mut rng)
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no particles at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
