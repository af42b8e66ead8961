//! # Meadow Procedural
//!
//! Deterministic placement and animation mathematics for the instanced
//! field renderer.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: the same seed always produces the same points and
//!    the same displacement field
//! 2. **Pure**: no error paths in the numeric hot loops, no shared mutable
//!    state, safe to sample from any number of threads
//! 3. **Startup-heavy, frame-light**: blue-noise placement runs once; only
//!    noise evaluation runs per frame
//!
//! ## Core Components
//!
//! - [`GradientNoise`]: smooth 2D coherent noise in roughly [-1, 1]
//! - [`BestCandidateSampler`]: blue-noise point generation in [0,1)²
//! - [`FieldSeed`]: seed newtype with independent derived sub-streams
//!
//! ## Example
//!
//! ```rust
//! use meadow_procedural::{BestCandidateSampler, FieldSeed, GradientNoise};
//!
//! let noise = GradientNoise::new(FieldSeed::new(42));
//! let value = noise.evaluate(10.5, 3.25);
//! assert!(value.abs() <= 1.0 + 1e-4);
//!
//! let mut sampler = BestCandidateSampler::new(Some(42));
//! let points = sampler.generate(128, 16).unwrap();
//! assert_eq!(points.len(), 128);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod noise;
pub mod sampler;

pub use noise::{FieldSeed, GradientNoise};
pub use sampler::{BestCandidateSampler, SampleError};
