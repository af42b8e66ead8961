//! Per-frame orchestration: the tick sequence and its statistics.

mod field;
mod stats;

pub use field::{FramePhase, MeadowField};
pub use stats::{FieldStats, FrameStats};
