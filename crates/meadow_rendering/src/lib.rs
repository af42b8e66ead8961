//! # Meadow Rendering
//!
//! Instanced field core: places tens of thousands of repeated elements
//! with blue-noise sampling and animates them every frame with a
//! coherent displacement field streamed to the device.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        FRAME PIPELINE                          │
//! ├────────────────────────────────────────────────────────────────┤
//! │  startup:  BestCandidateSampler → InstanceStore (static)       │
//! │                                        ↓                       │
//! │  per tick: update(time)  →  StreamingUploader  →  one draw     │
//! │            (noise pass,      (dynamic buffer      (instanced,  │
//! │             data-parallel)    push)                count N)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The device sits behind the [`FieldSurface`] seam: the core needs only
//! "allocate two buffers", "write the dynamic region", and "submit one
//! instanced draw". [`WgpuFieldRenderer`] is the production
//! implementation; [`RecordingSurface`] is the test double.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod instancing;
pub mod pipeline;

pub use error::{FieldError, FieldResult};
pub use instancing::{
    CameraUniform, DynamicInstance, FieldConfig, FieldSurface, InstanceStore, NoiseParams,
    RecordingSurface, StaticInstance, StreamingUploader, WgpuFieldRenderer,
};
pub use pipeline::{FieldStats, FramePhase, FrameStats, MeadowField};
