//! Instanced field data path.
//!
//! ## Key Concepts
//!
//! - **Static attributes**: blue-noise position, rotation basis, phase.
//!   Uploaded once at initialize, never touched again.
//! - **Dynamic attributes**: the sway vector, recomputed every frame
//!   from `(position, time)` and streamed to the device before the draw.
//! - **Surface seam**: the core reaches the device only through
//!   [`FieldSurface`]; tests use [`RecordingSurface`] in its place.

mod instance_data;
mod renderer;
mod store;
mod surface;
mod uploader;

pub use instance_data::{
    CameraUniform, DynamicInstance, MeshVertex, StaticInstance, BLADE_MESH,
};
pub use renderer::WgpuFieldRenderer;
pub use store::{FieldConfig, InstanceStore, NoiseParams};
pub use surface::{FieldSurface, RecordingSurface};
pub use uploader::StreamingUploader;
