//! Still-image frame source.
//!
//! `FileSource` decodes the configured image on every `next_frame` call, so
//! an external snapshot job can keep overwriting the file. Paths of the form
//! `stub://<scene>` produce synthetic frames instead (see [`Scene`]).
//!
//! Only local paths are accepted; URL schemes are rejected up front.

use anyhow::{anyhow, Result};

use super::synthetic::{SYNTHETIC_HEIGHT, SYNTHETIC_WIDTH};
use super::{is_stub, FrameSource, Scene};
use crate::frame::Frame;

/// Configuration for a still-image source.
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path (e.g., "/var/lib/coop/snapshot.jpg") or `stub://day`.
    pub path: String,
}

/// Still-image frame source.
pub struct FileSource {
    config: FileConfig,
    backend: FileBackend,
    frames_loaded: u64,
    last_error: Option<String>,
}

enum FileBackend {
    Synthetic(Scene),
    Disk,
}

impl FileSource {
    pub fn new(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(
                "file source only supports local paths (no URL schemes): {}",
                config.path
            ));
        }
        let backend = match config.path.strip_prefix("stub://") {
            Some(scene) => FileBackend::Synthetic(Scene::parse(scene)?),
            None => FileBackend::Disk,
        };
        Ok(Self {
            config,
            backend,
            frames_loaded: 0,
            last_error: None,
        })
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }

    pub fn frames_loaded(&self) -> u64 {
        self.frames_loaded
    }
}

impl FrameSource for FileSource {
    fn next_frame(&mut self) -> Result<Frame> {
        let frame = match self.backend {
            FileBackend::Synthetic(scene) => scene.render(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT),
            FileBackend::Disk => match Frame::open(&self.config.path) {
                Ok(frame) => frame,
                Err(err) => {
                    self.last_error = Some(err.to_string());
                    return Err(err.into());
                }
            },
        };
        self.frames_loaded += 1;
        self.last_error = None;
        Ok(frame)
    }

    fn is_healthy(&self) -> bool {
        self.last_error.is_none()
    }

    fn describe(&self) -> String {
        format!("image {}", self.config.path)
    }
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if is_stub(path) {
        return true;
    }
    !path.contains("://")
}
