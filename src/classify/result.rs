use serde::Serialize;

/// Time-of-day label produced by a scene classifier.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Prediction {
    Night,
    /// Bright and warm: sunrise/sunset light.
    GoldenHour,
    Day,
    /// No usable frame.
    Unknown,
}

impl Prediction {
    pub fn label(self) -> &'static str {
        match self {
            Prediction::Night => "Night",
            Prediction::GoldenHour => "Morning/Golden Hour",
            Prediction::Day => "Day/Morning",
            Prediction::Unknown => "Unknown",
        }
    }

    /// Both bright labels count as morning for the door.
    pub fn is_morning(self) -> bool {
        matches!(self, Prediction::GoldenHour | Prediction::Day)
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Measurements the decision was based on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LightMetrics {
    /// Mean luminance, 0..=255.
    pub brightness: f32,
    pub red_ratio: f32,
    pub blue_ratio: f32,
    pub threshold: f32,
}

/// Result of classifying one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub prediction: Prediction,
    /// Always within 0..=1.
    pub confidence: f32,
    pub metrics: LightMetrics,
}

impl ClassificationResult {
    /// Sentinel returned when no frame could be analysed.
    pub fn unknown(threshold: f32) -> Self {
        Self {
            prediction: Prediction::Unknown,
            confidence: 0.0,
            metrics: LightMetrics {
                threshold,
                ..LightMetrics::default()
            },
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.prediction == Prediction::Unknown
    }
}
