//! # Field Error Types
//!
//! All failure surfaces sit at the resource boundary (`initialize`,
//! `push`, `draw`). Sampling and noise evaluation are pure numeric
//! functions and never fail.

use meadow_procedural::SampleError;
use thiserror::Error;

/// Errors that can occur in the field core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Startup parameters were rejected before any device resource was
    /// allocated. Fatal to the core.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// The device-side write target could not be acquired within the
    /// frame budget. Recoverable; retry on the next frame.
    #[error("device write target busy, retry next frame")]
    DeviceBusy,

    /// Device buffer allocation failed at initialize. Fatal; the core
    /// guarantees nothing was partially initialized.
    #[error("device out of memory: {0}")]
    OutOfDeviceMemory(String),
}

impl From<SampleError> for FieldError {
    fn from(err: SampleError) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

/// Result type for field operations.
pub type FieldResult<T> = Result<T, FieldError>;
