//! Fixed-rule light classifier.
//!
//! Dark scenes are night. Bright scenes are morning, split into golden hour
//! when the red channel clearly dominates blue, and plain day otherwise.

use std::path::Path;

use crate::classify::backend::SceneClassifier;
use crate::classify::result::{ClassificationResult, LightMetrics, Prediction};
use crate::frame::Frame;

pub const DEFAULT_BRIGHTNESS_THRESHOLD: f32 = 80.0;

/// Red must exceed blue by this factor to count as warm light.
const WARM_RATIO_FACTOR: f32 = 1.2;

/// Brightness + colour-temperature classifier.
#[derive(Clone, Copy, Debug)]
pub struct LightClassifier {
    threshold: f32,
}

impl LightClassifier {
    /// Thresholds below 1 (or non-finite) are raised to 1 so the night
    /// confidence never divides by zero.
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(1.0, 255.0)
        } else {
            DEFAULT_BRIGHTNESS_THRESHOLD
        };
        Self { threshold }
    }
}

impl Default for LightClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BRIGHTNESS_THRESHOLD)
    }
}

impl SceneClassifier for LightClassifier {
    fn name(&self) -> &'static str {
        "light"
    }

    fn threshold(&self) -> f32 {
        self.threshold
    }

    fn classify(&self, frame: &Frame) -> ClassificationResult {
        classify(frame, self.threshold)
    }
}

/// Classify a frame against a brightness threshold (0..=255).
pub fn classify(frame: &Frame, brightness_threshold: f32) -> ClassificationResult {
    let threshold = brightness_threshold;
    let stats = ChannelMeans::of(frame);
    let brightness = stats.luma;
    let (red_ratio, blue_ratio) = stats.ratios();

    let (prediction, confidence) = if brightness < threshold {
        (Prediction::Night, (threshold - brightness) / threshold)
    } else if red_ratio > blue_ratio * WARM_RATIO_FACTOR {
        (Prediction::GoldenHour, 0.7 + (red_ratio - blue_ratio) * 0.3)
    } else {
        (
            Prediction::Day,
            0.6 + (brightness - threshold) / 255.0 * 0.4,
        )
    };

    let result = ClassificationResult {
        prediction,
        confidence: clamp_unit(confidence),
        metrics: LightMetrics {
            brightness,
            red_ratio,
            blue_ratio,
            threshold,
        },
    };
    log::debug!(
        "classified {}x{}: {} conf={:.2} brightness={:.1} red={:.3} blue={:.3}",
        frame.width(),
        frame.height(),
        result.prediction,
        result.confidence,
        brightness,
        red_ratio,
        blue_ratio
    );
    result
}

/// Decode and classify an image file. Undecodable sources give the
/// `Unknown` sentinel.
pub fn classify_path(path: impl AsRef<Path>, brightness_threshold: f32) -> ClassificationResult {
    match Frame::open(path) {
        Ok(frame) => classify(&frame, brightness_threshold),
        Err(err) => {
            log::warn!("{}", err);
            ClassificationResult::unknown(brightness_threshold)
        }
    }
}

/// 8-bit luminance of one pixel, fixed-point BT.601 weights.
pub(crate) fn luma([r, g, b]: [u8; 3]) -> u8 {
    let y = r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13);
    (y >> 14).min(255) as u8
}

struct ChannelMeans {
    luma: f32,
    red: f64,
    green: f64,
    blue: f64,
}

impl ChannelMeans {
    fn of(frame: &Frame) -> Self {
        let (mut y, mut r, mut g, mut b) = (0u64, 0u64, 0u64, 0u64);
        for px in frame.pixels() {
            y += luma(px) as u64;
            r += px[0] as u64;
            g += px[1] as u64;
            b += px[2] as u64;
        }
        let n = frame.pixel_count().max(1) as f64;
        Self {
            luma: (y as f64 / n) as f32,
            red: r as f64 / n,
            green: g as f64 / n,
            blue: b as f64 / n,
        }
    }

    /// Share of red and blue in the summed channel means; zero when the
    /// frame is black.
    fn ratios(&self) -> (f32, f32) {
        let total = self.red + self.green + self.blue;
        if total <= 0.0 {
            return (0.0, 0.0);
        }
        ((self.red / total) as f32, (self.blue / total) as f32)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
