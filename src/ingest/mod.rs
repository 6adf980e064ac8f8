//! Frame sources.
//!
//! - Still image files (JPEG/PNG), re-read on every request
//! - USB/V4L2 cameras (feature: ingest-v4l2)
//! - Synthetic `stub://` scenes for tests and bench runs
//!
//! A source owns its device lifecycle (open, read, release). The controller
//! only ever asks for the next frame and drops it after classification.

pub mod file;
#[cfg(feature = "ingest-v4l2")]
mod normalize;
mod synthetic;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

use anyhow::{anyhow, Result};

use crate::frame::Frame;

pub use file::{FileConfig, FileSource};
pub use synthetic::Scene;
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::{V4l2Config, V4l2Source};

/// Anything that can hand out still frames on demand.
pub trait FrameSource {
    /// Capture (or load) the next frame.
    fn next_frame(&mut self) -> Result<Frame>;

    /// Check if the source is healthy.
    fn is_healthy(&self) -> bool {
        true
    }

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame> {
        (**self).next_frame()
    }

    fn is_healthy(&self) -> bool {
        (**self).is_healthy()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

pub(crate) fn is_stub(path: &str) -> bool {
    path.starts_with("stub://")
}

/// Open the first candidate that comes up, in order.
///
/// Failures are logged and the next candidate is tried; the error for the
/// last one is returned when none open.
pub fn open_first<S>(
    candidates: &[&str],
    mut open: impl FnMut(&str) -> Result<S>,
) -> Result<S> {
    let mut last_err = anyhow!("no capture device configured");
    for candidate in candidates {
        match open(candidate) {
            Ok(source) => {
                log::info!("using capture device {}", candidate);
                return Ok(source);
            }
            Err(err) => {
                log::warn!("capture device {} unavailable: {:#}", candidate, err);
                last_err = err.context(format!("opening {candidate}"));
            }
        }
    }
    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_next_device() {
        let mut tried = Vec::new();
        let opened = open_first(&["/dev/video1", "/dev/video0"], |device| {
            tried.push(device.to_string());
            if device == "/dev/video1" {
                Err(anyhow!("no such device"))
            } else {
                Ok(device.to_string())
            }
        })
        .unwrap();
        assert_eq!(opened, "/dev/video0");
        assert_eq!(tried, vec!["/dev/video1", "/dev/video0"]);
    }

    #[test]
    fn first_working_device_wins() {
        let mut calls = 0;
        let opened = open_first(&["/dev/video1", "/dev/video0"], |device| {
            calls += 1;
            Ok(device.to_string())
        })
        .unwrap();
        assert_eq!(opened, "/dev/video1");
        assert_eq!(calls, 1);
    }

    #[test]
    fn reports_last_failure_when_none_open() {
        let err = open_first::<()>(&["/dev/video1", "/dev/video0"], |device| {
            Err(anyhow!("{device} busy"))
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("/dev/video0 busy"));
        assert!(open_first::<()>(&[], |_| Ok(())).is_err());
    }
}
