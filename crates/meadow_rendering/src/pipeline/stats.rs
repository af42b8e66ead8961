//! Frame and lifetime statistics for performance monitoring.

/// Result of a single tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame_number: u64,
    /// Instances updated and drawn.
    pub instances: u32,
    /// Time spent in the noise update pass (microseconds).
    pub update_us: u32,
    /// Time spent pushing the dynamic buffer (microseconds).
    pub upload_us: u32,
    /// Total tick time (microseconds).
    pub frame_us: u32,
}

/// Accumulated statistics over the field's lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldStats {
    /// Total successful frames.
    pub total_frames: u64,
    /// Worst tick time observed (microseconds).
    pub worst_frame_us: u32,
    /// Ticks aborted because the device write target was busy.
    pub upload_failures: u64,
}
