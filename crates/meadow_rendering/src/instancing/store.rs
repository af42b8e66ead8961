//! Instance attribute store.
//!
//! Owns the static attributes (blue-noise position, rotation basis,
//! phase, written once at initialize) and the dynamic attributes (sway,
//! rewritten in place every frame). The store never reallocates in
//! steady state; `update` is a data-parallel map in which each instance
//! reads only its own position and the shared time scalar and writes
//! only its own slot, so no locking is needed.

use meadow_procedural::{BestCandidateSampler, FieldSeed, GradientNoise};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::instance_data::{DynamicInstance, StaticInstance};
use crate::error::{FieldError, FieldResult};

/// Sub-seed purposes, so placement, noise, and jitter draw from
/// independent streams.
const SEED_SAMPLER: u64 = 1;
const SEED_NOISE: u64 = 2;
const SEED_JITTER: u64 = 3;

/// Spatial and temporal frequencies of the displacement field.
///
/// Fixed configuration, not runtime state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    /// Spatial frequency along x.
    pub freq_x: f32,
    /// Spatial frequency along y.
    pub freq_y: f32,
    /// Temporal frequency: how fast the field drifts.
    pub freq_t: f32,
    /// Peak displacement in world units.
    pub amplitude: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            freq_x: 0.08,
            freq_y: 0.08,
            freq_t: 0.35,
            amplitude: 0.6,
        }
    }
}

/// Startup configuration for the field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Number of instances. Zero is valid and produces an empty field.
    pub instance_count: usize,
    /// Side length of the square placement domain ("meadow size").
    /// Must be strictly positive.
    pub domain_size: f32,
    /// Candidate pool size for best-candidate sampling. Must be at
    /// least 1; larger values spread points more evenly.
    pub candidates_per_sample: usize,
    /// Displacement field tuning.
    pub noise: NoiseParams,
    /// Optional seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            instance_count: 10_000,
            domain_size: 100.0,
            candidates_per_sample: 10,
            noise: NoiseParams::default(),
            seed: None,
        }
    }
}

/// Per-instance attribute storage.
///
/// Lifecycle: created once at startup (runs the sampling pass), updated
/// once per rendered frame, dropped at shutdown.
pub struct InstanceStore {
    /// Immutable after construction.
    statics: Vec<StaticInstance>,
    /// Overwritten in place by `update`.
    dynamics: Vec<DynamicInstance>,
    noise: GradientNoise,
    params: NoiseParams,
}

impl InstanceStore {
    /// Runs the one-time placement pass and allocates both attribute
    /// arrays.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidConfig`] for a non-positive
    /// `domain_size` or an empty candidate pool. No device resource is
    /// touched here, so a rejected configuration leaves nothing behind.
    pub fn new(config: &FieldConfig) -> FieldResult<Self> {
        if !config.domain_size.is_finite() || config.domain_size <= 0.0 {
            return Err(FieldError::InvalidConfig {
                reason: format!("domain_size must be positive, got {}", config.domain_size),
            });
        }

        let seed = FieldSeed::new(config.seed.unwrap_or_else(rand::random));

        let mut sampler = BestCandidateSampler::new(Some(seed.derive(SEED_SAMPLER).value()));
        let positions = sampler.generate(config.instance_count, config.candidates_per_sample)?;

        let mut jitter = ChaCha8Rng::seed_from_u64(seed.derive(SEED_JITTER).value());
        let statics = positions
            .iter()
            .map(|p| {
                let angle = jitter.gen::<f32>() * std::f32::consts::TAU;
                let scale = 0.7 + jitter.gen::<f32>() * 0.6;
                let phase = jitter.gen::<f32>() * std::f32::consts::TAU;
                StaticInstance::new(
                    [p[0] * config.domain_size, p[1] * config.domain_size],
                    angle,
                    scale,
                    phase,
                )
            })
            .collect();

        Ok(Self {
            statics,
            dynamics: vec![DynamicInstance::default(); config.instance_count],
            noise: GradientNoise::new(seed.derive(SEED_NOISE)),
            params: config.noise,
        })
    }

    /// Recomputes every dynamic slot for the given time.
    ///
    /// Each slot is a pure function of `(position, global_time)`; there
    /// is no dependency on the previous frame, so repeated calls with
    /// the same time are bit-identical and the map parallelizes freely.
    /// Returns a view valid until the next `update`.
    pub fn update(&mut self, global_time: f32) -> &[DynamicInstance] {
        let params = self.params;
        let noise = &self.noise;
        let statics = &self.statics;
        let drift = global_time * params.freq_t;

        self.dynamics
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| {
                let [px, py] = statics[i].position;
                let u = px * params.freq_x + drift;
                let v = py * params.freq_y + drift;
                // Swapped coordinate order decorrelates the two channels.
                slot.sway = [
                    params.amplitude * noise.evaluate(u, v),
                    params.amplitude * noise.evaluate(v, u),
                ];
            });

        &self.dynamics
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statics.len()
    }

    /// True when the field holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statics.is_empty()
    }

    /// The immutable static attributes.
    #[must_use]
    pub fn statics(&self) -> &[StaticInstance] {
        &self.statics
    }

    /// The dynamic attributes as of the last `update`.
    #[must_use]
    pub fn dynamics(&self) -> &[DynamicInstance] {
        &self.dynamics
    }

    /// Static attributes as bytes for the one-time device upload.
    #[must_use]
    pub fn static_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.statics)
    }

    /// Dynamic attributes as bytes for the per-frame device upload.
    #[must_use]
    pub fn dynamic_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.dynamics)
    }

    /// Byte length of the dynamic array (device buffer size).
    #[must_use]
    pub fn dynamic_byte_len(&self) -> u64 {
        (self.dynamics.len() * DynamicInstance::SIZE) as u64
    }

    /// The displacement-field tuning in effect.
    #[must_use]
    pub const fn params(&self) -> NoiseParams {
        self.params
    }
}
