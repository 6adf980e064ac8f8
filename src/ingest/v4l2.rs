//! V4L2 frame source.
//!
//! This module provides `V4l2Source` for pulling still frames from a local
//! camera (e.g. `/dev/video0`). The device is opened on `connect()` and
//! released when the source is dropped. Frames are normalized to RGB24.
//!
//! `stub://<scene>` devices return a fixed synthetic scene; `stub://cycle`
//! walks night, golden hour, day and dusk.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;
use std::time::{Duration, Instant};

use super::normalize::{normalize_to_rgb, PixelFormat};
use super::synthetic::Scene;
use super::{is_stub, FrameSource};
use crate::frame::Frame;

/// Frames per scene for `stub://cycle`.
const CYCLE_FRAMES_PER_SCENE: u64 = 30;

/// Configuration for a V4L2 source.
#[derive(Clone, Debug)]
pub struct V4l2Config {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Target frame rate requested from the driver.
    pub target_fps: u32,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
}

impl Default for V4l2Config {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            target_fps: 30,
            width: 320,
            height: 240,
        }
    }
}

/// V4L2 frame source.
pub struct V4l2Source {
    backend: V4l2Backend,
}

enum V4l2Backend {
    Synthetic(SyntheticV4l2Source),
    Device(DeviceV4l2Source),
}

impl V4l2Source {
    pub fn new(config: V4l2Config) -> Result<Self> {
        if is_stub(&config.device) {
            Ok(Self {
                backend: V4l2Backend::Synthetic(SyntheticV4l2Source::new(config)?),
            })
        } else {
            Ok(Self {
                backend: V4l2Backend::Device(DeviceV4l2Source::new(config)),
            })
        }
    }

    /// Open the device and start streaming.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            V4l2Backend::Synthetic(source) => source.connect(),
            V4l2Backend::Device(source) => source.connect(),
        }
    }

    pub fn frames_captured(&self) -> u64 {
        match &self.backend {
            V4l2Backend::Synthetic(source) => source.frame_count,
            V4l2Backend::Device(source) => source.frame_count,
        }
    }
}

impl FrameSource for V4l2Source {
    fn next_frame(&mut self) -> Result<Frame> {
        match &mut self.backend {
            V4l2Backend::Synthetic(source) => source.next_frame(),
            V4l2Backend::Device(source) => source.next_frame(),
        }
    }

    fn is_healthy(&self) -> bool {
        match &self.backend {
            V4l2Backend::Synthetic(_) => true,
            V4l2Backend::Device(source) => source.is_healthy(),
        }
    }

    fn describe(&self) -> String {
        match &self.backend {
            V4l2Backend::Synthetic(source) => format!("camera {} (synthetic)", source.config.device),
            V4l2Backend::Device(source) => format!("camera {}", source.config.device),
        }
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests
// ----------------------------------------------------------------------------

struct SyntheticV4l2Source {
    config: V4l2Config,
    /// `None` cycles through the day.
    scene: Option<Scene>,
    frame_count: u64,
}

impl SyntheticV4l2Source {
    fn new(config: V4l2Config) -> Result<Self> {
        let name = config.device.trim_start_matches("stub://");
        let scene = match name {
            "" | "cycle" => None,
            other => Some(Scene::parse(other)?),
        };
        Ok(Self {
            config,
            scene,
            frame_count: 0,
        })
    }

    fn connect(&mut self) -> Result<()> {
        log::info!(
            "V4l2Source: connected to {} (synthetic)",
            self.config.device
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let scene = self.scene.unwrap_or_else(|| {
            let index = (self.frame_count / CYCLE_FRAMES_PER_SCENE) as usize % Scene::CYCLE.len();
            Scene::CYCLE[index]
        });
        self.frame_count += 1;
        Ok(scene.render(self.config.width, self.config.height))
    }
}

// ----------------------------------------------------------------------------
// Production V4L2 source using libv4l
// ----------------------------------------------------------------------------

struct DeviceV4l2Source {
    config: V4l2Config,
    state: Option<DeviceV4l2State>,
    frame_count: u64,
    last_frame_at: Option<Instant>,
    last_error: Option<String>,
    active_width: u32,
    active_height: u32,
    active_format: PixelFormat,
}

#[self_referencing]
struct DeviceV4l2State {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl DeviceV4l2Source {
    fn new(config: V4l2Config) -> Self {
        Self {
            active_width: config.width,
            active_height: config.height,
            active_format: PixelFormat::Rgb24,
            config,
            state: None,
            frame_count: 0,
            last_frame_at: None,
            last_error: None,
        }
    }

    fn connect(&mut self) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&self.config.device)
            .with_context(|| format!("open v4l2 device {}", self.config.device))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = self.config.width;
        format.height = self.config.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "V4l2Source: RGB3 rejected by {}: {}; trying YUYV",
                    self.config.device,
                    err
                );
                format.fourcc = v4l::FourCC::new(b"YUYV");
                device
                    .set_format(&format)
                    .or_else(|_| device.format())
                    .context("read v4l2 format after set failure")?
            }
        };
        let pixel_format = PixelFormat::from_fourcc(&format.fourcc.repr).ok_or_else(|| {
            anyhow!(
                "unsupported v4l2 pixel format {} on {}",
                format.fourcc,
                self.config.device
            )
        })?;

        if self.config.target_fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(self.config.target_fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!(
                    "V4l2Source: failed to set fps on {}: {}",
                    self.config.device,
                    err
                );
            }
        }

        self.active_width = format.width;
        self.active_height = format.height;
        self.active_format = pixel_format;
        self.last_error = None;

        let state = DeviceV4l2StateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()
        .map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;
        self.state = Some(state);

        log::info!(
            "V4l2Source: connected to {} ({}x{} {:?})",
            self.config.device,
            self.active_width,
            self.active_height,
            self.active_format
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        use v4l::io::traits::CaptureStream;

        let state = self.state.as_mut().context("v4l2 device not connected")?;
        let (width, height, format) = (self.active_width, self.active_height, self.active_format);
        let captured = state.with_mut(|fields| {
            fields
                .stream
                .next()
                .map_err(|err| anyhow::Error::new(err).context("capture v4l2 frame"))
                .and_then(|(buf, _meta)| normalize_to_rgb(buf, width, height, format))
        });
        let rgb = captured.map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;

        self.frame_count += 1;
        self.last_frame_at = Some(Instant::now());
        self.last_error = None;

        Frame::from_rgb(rgb, width, height)
    }

    fn is_healthy(&self) -> bool {
        if self.last_error.is_some() {
            return false;
        }
        let Some(last_frame_at) = self.last_frame_at else {
            return true;
        };
        last_frame_at.elapsed() <= self.health_grace()
    }

    fn health_grace(&self) -> Duration {
        let base_ms = if self.config.target_fps == 0 {
            2_000
        } else {
            (1000 / self.config.target_fps).saturating_mul(6)
        };
        Duration::from_millis(base_ms.max(2_000) as u64)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, Prediction};

    fn stub_config(device: &str) -> V4l2Config {
        V4l2Config {
            device: device.to_string(),
            target_fps: 10,
            width: 64,
            height: 48,
        }
    }

    #[test]
    fn v4l2_stub_produces_frames() -> Result<()> {
        let mut source = V4l2Source::new(stub_config("stub://day"))?;
        source.connect()?;

        let frame = source.next_frame()?;
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(source.frames_captured(), 1);
        Ok(())
    }

    #[test]
    fn v4l2_stub_cycle_walks_through_the_day() -> Result<()> {
        let mut source = V4l2Source::new(stub_config("stub://cycle"))?;
        source.connect()?;

        let first = source.next_frame()?;
        assert_eq!(classify(&first, 80.0).prediction, Prediction::Night);
        for _ in 1..CYCLE_FRAMES_PER_SCENE {
            source.next_frame()?;
        }
        let next = source.next_frame()?;
        assert_eq!(classify(&next, 80.0).prediction, Prediction::GoldenHour);
        Ok(())
    }

    #[test]
    fn unconnected_device_reports_error() -> Result<()> {
        let mut source = V4l2Source::new(stub_config("/dev/video-missing"))?;
        assert!(source.next_frame().is_err());
        Ok(())
    }
}
