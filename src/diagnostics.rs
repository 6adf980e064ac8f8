//! Diagnostic report for the display panel.
//!
//! The panel draws a brightness histogram with the mean brightness and the
//! decision threshold marked. This module only produces the numbers; the
//! renderer is someone else's problem.

use serde::Serialize;

use crate::classify::{luma, ClassificationResult, Prediction};
use crate::frame::Frame;

pub const HISTOGRAM_BINS: usize = 256;

/// Everything needed to redraw the "Light Detection Visualization" plot.
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticReport {
    pub prediction: Prediction,
    pub label: &'static str,
    pub confidence: f32,
    pub brightness_marker: f32,
    pub threshold_marker: f32,
    pub red_ratio: f32,
    pub blue_ratio: f32,
    pub width: u32,
    pub height: u32,
    /// Pixel count per luminance value.
    pub histogram: Vec<u32>,
}

impl DiagnosticReport {
    pub fn new(frame: &Frame, result: &ClassificationResult) -> Self {
        Self {
            prediction: result.prediction,
            label: result.prediction.label(),
            confidence: result.confidence,
            brightness_marker: result.metrics.brightness,
            threshold_marker: result.metrics.threshold,
            red_ratio: result.metrics.red_ratio,
            blue_ratio: result.metrics.blue_ratio,
            width: frame.width(),
            height: frame.height(),
            histogram: luminance_histogram(frame),
        }
    }

    /// Placeholder for when no image could be read.
    pub fn unavailable(threshold: f32) -> Self {
        Self {
            prediction: Prediction::Unknown,
            label: "Image not found",
            confidence: 0.0,
            brightness_marker: 0.0,
            threshold_marker: threshold,
            red_ratio: 0.0,
            blue_ratio: 0.0,
            width: 0,
            height: 0,
            histogram: vec![0; HISTOGRAM_BINS],
        }
    }

    pub fn is_available(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        writeln!(f, "MORNING vs NIGHT DETECTION RESULTS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Prediction: {}", self.label)?;
        writeln!(f, "Confidence: {:.2}", self.confidence)?;
        writeln!(f)?;
        writeln!(f, "Metrics:")?;
        writeln!(f, "  Average Brightness: {:.1}/255", self.brightness_marker)?;
        writeln!(f, "  Red Ratio: {:.3}", self.red_ratio)?;
        writeln!(f, "  Blue Ratio: {:.3}", self.blue_ratio)?;
        write!(f, "  Brightness Threshold: {}", self.threshold_marker)
    }
}

/// 256-bin histogram of per-pixel luminance.
pub fn luminance_histogram(frame: &Frame) -> Vec<u32> {
    let mut bins = vec![0u32; HISTOGRAM_BINS];
    for px in frame.pixels() {
        bins[luma(px) as usize] += 1;
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    #[test]
    fn histogram_counts_every_pixel() {
        let frame = Frame::filled(5, 4, [128, 128, 128]);
        let bins = luminance_histogram(&frame);
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins[128], 20);
        assert_eq!(bins.iter().sum::<u32>(), 20);
    }

    #[test]
    fn report_carries_markers() {
        let frame = Frame::filled(10, 10, [0, 0, 0]);
        let result = classify(&frame, 80.0);
        let report = DiagnosticReport::new(&frame, &result);
        assert!(report.is_available());
        assert_eq!(report.label, "Night");
        assert_eq!(report.brightness_marker, 0.0);
        assert_eq!(report.threshold_marker, 80.0);
        assert_eq!(report.histogram[0], 100);
    }

    #[test]
    fn report_renders_text_and_json() -> anyhow::Result<()> {
        let frame = Frame::filled(2, 2, [200, 100, 50]);
        let result = classify(&frame, 80.0);
        let report = DiagnosticReport::new(&frame, &result);

        let text = report.to_string();
        assert!(text.contains("Prediction: Morning/Golden Hour"));
        assert!(text.contains("Red Ratio: 0.571"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json()?)?;
        assert_eq!(json["prediction"], "GoldenHour");
        assert_eq!(json["histogram"].as_array().map(Vec::len), Some(256));
        Ok(())
    }

    #[test]
    fn unavailable_report_is_flagged() {
        let report = DiagnosticReport::unavailable(80.0);
        assert!(!report.is_available());
        assert_eq!(report.prediction, Prediction::Unknown);
    }
}
