//! Still-frame container.
//!
//! A `Frame` is an RGB raster (height x width x 3, 8-bit). Pixels are private
//! and read-only once constructed; there is no `Clone` and no mutable accessor.
//! Whoever produced the frame owns it and drops it after classification.

use std::path::Path;

use anyhow::{anyhow, Result};
use image::DynamicImage;

use crate::error::ImageUnavailable;

/// Immutable RGB frame.
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Build a frame from packed RGB bytes.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("frame dimensions must be non-zero"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Frame filled with a single colour. Used by synthetic sources and tests.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixel_count = width.max(1) as usize * height.max(1) as usize;
        let mut data = Vec::with_capacity(pixel_count * 3);
        for _ in 0..pixel_count {
            data.extend_from_slice(&rgb);
        }
        Self {
            data,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn from_image(image: DynamicImage) -> Result<Self> {
        let rgb = image.into_rgb8();
        let (width, height) = rgb.dimensions();
        Self::from_rgb(rgb.into_raw(), width, height)
    }

    /// Decode an encoded image (JPEG, PNG).
    pub fn decode(bytes: &[u8], source_name: &str) -> Result<Self, ImageUnavailable> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| ImageUnavailable::new(source_name, e))?;
        Self::from_image(image).map_err(|e| ImageUnavailable::new(source_name, e))
    }

    /// Load and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageUnavailable> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let image = image::open(path).map_err(|e| ImageUnavailable::new(&name, e))?;
        Self::from_image(image).map_err(|e| ImageUnavailable::new(&name, e))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / 3
    }

    /// Iterate pixels as `[r, g, b]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|px| [px[0], px[1], px[2]])
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb_validates_length() {
        assert!(Frame::from_rgb(vec![0; 12], 2, 2).is_ok());
        assert!(Frame::from_rgb(vec![0; 11], 2, 2).is_err());
        assert!(Frame::from_rgb(vec![], 0, 2).is_err());
    }

    #[test]
    fn filled_frame_repeats_colour() {
        let frame = Frame::filled(3, 2, [10, 20, 30]);
        assert_eq!(frame.pixel_count(), 6);
        assert!(frame.pixels().all(|px| px == [10, 20, 30]));
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = Frame::decode(b"not an image", "memory").unwrap_err();
        assert_eq!(err.source_name, "memory");
    }

    #[test]
    fn open_round_trips_png() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dawn.png");
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 100, 50]));
        img.save(&path)?;

        let frame = Frame::open(&path)?;
        assert_eq!((frame.width(), frame.height()), (4, 3));
        assert!(frame.pixels().all(|px| px == [200, 100, 50]));
        Ok(())
    }

    #[test]
    fn open_missing_file_is_image_unavailable() {
        let err = Frame::open("/definitely/not/here.jpg").unwrap_err();
        assert!(err.to_string().contains("image unavailable"));
    }
}
