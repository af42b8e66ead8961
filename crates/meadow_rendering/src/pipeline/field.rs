//! The field core's inbound interface.
//!
//! The surrounding application calls [`MeadowField::initialize`] once at
//! startup and [`MeadowField::tick`] once per rendered frame with the
//! current time and the camera's view-projection matrix. Each tick runs
//! the fixed phase sequence
//!
//! ```text
//! Idle → Updating (noise pass) → Uploading (dynamic push) → Drawing → Idle
//! ```
//!
//! Uploading never starts before the frame's own update completes, and a
//! failed upload aborts the frame before Drawing so the device never
//! observes a partially updated dynamic buffer. The loop may stop at any
//! frame boundary; no phase holds a device acquisition across a return.

use std::time::Instant;

use crate::error::FieldResult;
use crate::instancing::{
    CameraUniform, FieldConfig, FieldSurface, InstanceStore, StreamingUploader,
};
use crate::pipeline::stats::{FieldStats, FrameStats};

/// Where a tick currently is in the per-frame sequence.
///
/// Ticks are synchronous, so outside of `tick` this is always `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePhase {
    /// Between frames; safe to abort the loop.
    #[default]
    Idle,
    /// Recomputing the dynamic attribute array.
    Updating,
    /// Pushing the dynamic array to the device.
    Uploading,
    /// Submitting the instanced draw.
    Drawing,
}

/// The procedural instanced field.
///
/// Owns the attribute store and the upload discipline; talks to the
/// device only through a [`FieldSurface`].
pub struct MeadowField {
    store: InstanceStore,
    uploader: StreamingUploader,
    phase: FramePhase,
    frame_count: u64,
    stats: FieldStats,
}

impl MeadowField {
    /// Creates the field: one blue-noise placement pass, then both
    /// device buffers.
    ///
    /// The configuration is validated and the attribute arrays are built
    /// before any device resource is requested, so a failure at either
    /// stage leaves nothing allocated.
    ///
    /// # Errors
    ///
    /// [`crate::FieldError::InvalidConfig`] for rejected parameters,
    /// [`crate::FieldError::OutOfDeviceMemory`] if buffer allocation
    /// fails.
    pub fn initialize<S: FieldSurface>(config: &FieldConfig, surface: &mut S) -> FieldResult<Self> {
        let store = InstanceStore::new(config)?;
        surface.allocate_instance_buffers(store.static_bytes(), store.dynamic_byte_len())?;

        tracing::info!(
            instances = store.len(),
            domain_size = config.domain_size,
            "meadow field initialized"
        );

        Ok(Self {
            store,
            uploader: StreamingUploader::new(),
            phase: FramePhase::Idle,
            frame_count: 0,
            stats: FieldStats::default(),
        })
    }

    /// Runs one frame: update, upload, draw.
    ///
    /// # Errors
    ///
    /// [`crate::FieldError::DeviceBusy`] when the dynamic push could not
    /// complete within the frame budget; the frame is aborted before
    /// drawing and the caller should retry on the next tick.
    pub fn tick<S: FieldSurface>(
        &mut self,
        surface: &mut S,
        global_time: f32,
        view_proj: [[f32; 4]; 4],
    ) -> FieldResult<FrameStats> {
        let frame_start = Instant::now();
        self.frame_count += 1;

        self.phase = FramePhase::Updating;
        let update_start = Instant::now();
        self.store.update(global_time);
        let update_us = elapsed_us(update_start);

        self.phase = FramePhase::Uploading;
        let upload_start = Instant::now();
        if let Err(err) = self.uploader.push(surface, self.store.dynamics()) {
            self.stats.upload_failures += 1;
            self.phase = FramePhase::Idle;
            return Err(err);
        }
        let upload_us = elapsed_us(upload_start);

        self.phase = FramePhase::Drawing;
        let camera = CameraUniform::new(view_proj);
        if let Err(err) = surface.draw_instanced(self.store.len() as u32, &camera) {
            self.phase = FramePhase::Idle;
            return Err(err);
        }
        self.phase = FramePhase::Idle;

        let frame_us = elapsed_us(frame_start);
        self.stats.total_frames += 1;
        if frame_us > self.stats.worst_frame_us {
            self.stats.worst_frame_us = frame_us;
        }

        Ok(FrameStats {
            frame_number: self.frame_count,
            instances: self.store.len() as u32,
            update_us,
            upload_us,
            frame_us,
        })
    }

    /// Releases the device-side buffers and consumes the field.
    pub fn destroy<S: FieldSurface>(self, surface: &mut S) {
        surface.release_instance_buffers();
    }

    /// The attribute store.
    #[must_use]
    pub fn store(&self) -> &InstanceStore {
        &self.store
    }

    /// Current phase; `Idle` whenever no tick is running.
    #[must_use]
    pub const fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Ticks attempted so far, including aborted ones.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Lifetime statistics.
    #[must_use]
    pub const fn stats(&self) -> FieldStats {
        self.stats
    }
}

fn elapsed_us(start: Instant) -> u32 {
    u32::try_from(start.elapsed().as_micros()).unwrap_or(u32::MAX)
}
