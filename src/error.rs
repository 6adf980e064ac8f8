//! Typed failures at the hardware and image boundaries.
//!
//! Application plumbing (config, sources, binaries) stays on `anyhow`. These
//! types exist where callers must tell failure modes apart: a missing PWM chip
//! is recovered by the mock drive line, while a failed write on a present chip
//! must reach the operator.

use std::path::PathBuf;

use thiserror::Error;

/// The frame could not be decoded, or the capture device returned nothing.
#[derive(Debug, Error)]
#[error("image unavailable from {source_name}: {reason}")]
pub struct ImageUnavailable {
    pub source_name: String,
    pub reason: String,
}

impl ImageUnavailable {
    pub fn new(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// No PWM-capable drive line is present on this machine.
#[derive(Debug, Error)]
#[error("actuator unavailable: {reason}")]
pub struct ActuatorUnavailable {
    pub reason: String,
}

/// A drive write failed on a device that is present.
#[derive(Debug, Error)]
pub enum HardwareFault {
    #[error("pwm write to {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("pwm channel {channel} on chip {chip} did not appear after export")]
    ChannelUnavailable { chip: u32, channel: u32 },
    #[error("duty cycle {0}% outside 0..=100")]
    InvalidDuty(f32),
    #[error("pwm frequency must be non-zero")]
    InvalidFrequency,
}

impl HardwareFault {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
