//! Streaming upload of the dynamic attribute array.
//!
//! One push per rendered frame, always between the update pass and the
//! draw. A busy device is recoverable (the caller retries next frame),
//! but two consecutive busy frames indicate the upload is outrunning
//! the device and are surfaced as a performance warning.

use super::instance_data::DynamicInstance;
use super::surface::FieldSurface;
use crate::error::{FieldError, FieldResult};

/// Pushes the freshly computed dynamic array to the device each frame.
#[derive(Debug, Default)]
pub struct StreamingUploader {
    consecutive_failures: u32,
}

impl StreamingUploader {
    /// Creates an uploader with a clean contention history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            consecutive_failures: 0,
        }
    }

    /// Copies the full dynamic array into device memory.
    ///
    /// An empty array is a no-op. The write target is sized to exactly
    /// the byte length of the array; the surface releases any staging
    /// acquisition on every exit path.
    ///
    /// # Errors
    ///
    /// Propagates [`FieldError::DeviceBusy`] from the surface. The
    /// caller may retry next frame; the frame must not draw after a
    /// failed push.
    pub fn push<S: FieldSurface>(
        &mut self,
        surface: &mut S,
        dynamics: &[DynamicInstance],
    ) -> FieldResult<()> {
        if dynamics.is_empty() {
            self.consecutive_failures = 0;
            return Ok(());
        }

        match surface.write_dynamic(0, bytemuck::cast_slice(dynamics)) {
            Ok(()) => {
                self.consecutive_failures = 0;
                Ok(())
            }
            Err(FieldError::DeviceBusy) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= 2 {
                    tracing::warn!(
                        consecutive_failures = self.consecutive_failures,
                        "dynamic upload contended for consecutive frames; \
                         the device is not keeping up with the update rate"
                    );
                }
                Err(FieldError::DeviceBusy)
            }
            Err(other) => Err(other),
        }
    }

    /// Number of busy frames since the last successful push.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instancing::surface::RecordingSurface;

    fn dynamics(n: usize) -> Vec<DynamicInstance> {
        (0..n)
            .map(|i| DynamicInstance {
                sway: [i as f32, -(i as f32)],
            })
            .collect()
    }

    #[test]
    fn test_push_copies_full_array() {
        let mut surface = RecordingSurface::new();
        let data = dynamics(16);
        surface
            .allocate_instance_buffers(&[], (data.len() * DynamicInstance::SIZE) as u64)
            .unwrap();

        let mut uploader = StreamingUploader::new();
        uploader.push(&mut surface, &data).unwrap();

        assert_eq!(surface.writes, 1);
        assert_eq!(surface.dynamic_data, bytemuck::cast_slice::<_, u8>(&data));
    }

    #[test]
    fn test_empty_push_is_noop() {
        let mut surface = RecordingSurface::new();
        let mut uploader = StreamingUploader::new();

        uploader.push(&mut surface, &[]).unwrap();
        assert_eq!(surface.writes, 0, "nothing to upload for an empty field");
    }

    #[test]
    fn test_busy_failures_counted_and_reset() {
        let mut surface = RecordingSurface::new();
        let data = dynamics(4);
        surface
            .allocate_instance_buffers(&[], (data.len() * DynamicInstance::SIZE) as u64)
            .unwrap();
        surface.busy_writes = 2;

        let mut uploader = StreamingUploader::new();

        assert_eq!(
            uploader.push(&mut surface, &data),
            Err(FieldError::DeviceBusy)
        );
        assert_eq!(uploader.consecutive_failures(), 1);

        // Second consecutive failure crosses the warning threshold.
        assert_eq!(
            uploader.push(&mut surface, &data),
            Err(FieldError::DeviceBusy)
        );
        assert_eq!(uploader.consecutive_failures(), 2);

        // Recovery clears the streak.
        uploader.push(&mut surface, &data).unwrap();
        assert_eq!(uploader.consecutive_failures(), 0);
    }
}
