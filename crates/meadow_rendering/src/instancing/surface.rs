//! The device seam.
//!
//! The core talks to the graphics layer through exactly three
//! operations: allocate the two fixed-size instance buffers, write the
//! dynamic region, and submit one instanced draw. Everything else about
//! the device (window, swapchain, shaders) stays behind this trait.
//!
//! [`RecordingSurface`] is the test double used by the core's own test
//! suites; it can also simulate write contention and allocation failure.

use super::instance_data::CameraUniform;
use crate::error::{FieldError, FieldResult};

/// Operations the field core needs from the graphics layer.
pub trait FieldSurface {
    /// Allocates the static and dynamic instance buffers.
    ///
    /// Called exactly once during initialize. `static_data` is the full
    /// static attribute array (uploaded here, never touched again);
    /// `dynamic_len` is the byte size of the dynamic buffer. The
    /// implementation must allocate both buffers or neither.
    ///
    /// # Errors
    ///
    /// [`FieldError::OutOfDeviceMemory`] on allocation failure.
    fn allocate_instance_buffers(&mut self, static_data: &[u8], dynamic_len: u64)
        -> FieldResult<()>;

    /// Writes a region of the dynamic buffer.
    ///
    /// Called once per frame. Any staging acquisition must be scoped and
    /// released on every exit path, including failure.
    ///
    /// # Errors
    ///
    /// [`FieldError::DeviceBusy`] when the write target cannot be
    /// acquired within the frame budget.
    fn write_dynamic(&mut self, offset: u64, data: &[u8]) -> FieldResult<()>;

    /// Submits one instanced draw covering `instance_count` repetitions
    /// of the base mesh, bound to the supplied camera matrix.
    ///
    /// Drawing zero instances is a no-op, not an error, and must submit
    /// nothing to the device.
    ///
    /// # Errors
    ///
    /// Device-specific submission failures.
    fn draw_instanced(&mut self, instance_count: u32, camera: &CameraUniform) -> FieldResult<()>;

    /// Releases both instance buffers at shutdown.
    fn release_instance_buffers(&mut self);
}

/// Recording test double for [`FieldSurface`].
///
/// Keeps byte-for-byte copies of everything the core uploads and records
/// every draw submission, so tests can assert on exactly what the device
/// would have observed.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// The static upload, if allocation has happened.
    pub static_data: Option<Vec<u8>>,
    /// Current contents of the simulated dynamic buffer.
    pub dynamic_data: Vec<u8>,
    /// Number of successful dynamic writes.
    pub writes: u32,
    /// Instance counts of submitted draws (zero-instance draws submit
    /// nothing and are not recorded).
    pub draws: Vec<u32>,
    /// Camera bound by the most recent draw.
    pub last_camera: Option<CameraUniform>,
    /// Whether the buffers have been released.
    pub released: bool,
    /// When set, the next allocation fails with out-of-memory.
    pub fail_allocation: bool,
    /// Fail this many upcoming writes with `DeviceBusy`.
    pub busy_writes: u32,
}

impl RecordingSurface {
    /// Creates an empty recording surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldSurface for RecordingSurface {
    fn allocate_instance_buffers(
        &mut self,
        static_data: &[u8],
        dynamic_len: u64,
    ) -> FieldResult<()> {
        if self.fail_allocation {
            return Err(FieldError::OutOfDeviceMemory(
                "simulated allocation failure".to_owned(),
            ));
        }
        self.static_data = Some(static_data.to_vec());
        self.dynamic_data = vec![0; dynamic_len as usize];
        Ok(())
    }

    fn write_dynamic(&mut self, offset: u64, data: &[u8]) -> FieldResult<()> {
        if self.busy_writes > 0 {
            self.busy_writes -= 1;
            return Err(FieldError::DeviceBusy);
        }
        let start = offset as usize;
        let end = start + data.len();
        assert!(
            end <= self.dynamic_data.len(),
            "write of {} bytes at offset {start} overruns the {}-byte dynamic buffer",
            data.len(),
            self.dynamic_data.len()
        );
        self.dynamic_data[start..end].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn draw_instanced(&mut self, instance_count: u32, camera: &CameraUniform) -> FieldResult<()> {
        if instance_count == 0 {
            return Ok(());
        }
        self.draws.push(instance_count);
        self.last_camera = Some(*camera);
        Ok(())
    }

    fn release_instance_buffers(&mut self) {
        self.static_data = None;
        self.dynamic_data.clear();
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_instance_draw_submits_nothing() {
        let mut surface = RecordingSurface::new();
        surface
            .draw_instanced(0, &CameraUniform::IDENTITY)
            .expect("zero-instance draw must not error");
        assert!(surface.draws.is_empty(), "no submission may reach the device");
    }

    #[test]
    fn test_busy_writes_then_recover() {
        let mut surface = RecordingSurface::new();
        surface.allocate_instance_buffers(&[], 8).unwrap();
        surface.busy_writes = 1;

        assert_eq!(
            surface.write_dynamic(0, &[1; 8]),
            Err(FieldError::DeviceBusy)
        );
        surface.write_dynamic(0, &[2; 8]).unwrap();
        assert_eq!(surface.dynamic_data, vec![2; 8]);
    }

    #[test]
    fn test_failed_allocation_leaves_nothing() {
        let mut surface = RecordingSurface::new();
        surface.fail_allocation = true;

        let result = surface.allocate_instance_buffers(&[1, 2, 3], 16);
        assert!(matches!(result, Err(FieldError::OutOfDeviceMemory(_))));
        assert!(surface.static_data.is_none());
        assert!(surface.dynamic_data.is_empty());
    }
}
