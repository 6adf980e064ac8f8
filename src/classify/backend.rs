use crate::classify::result::ClassificationResult;
use crate::frame::Frame;

/// Scene classifier trait.
///
/// Implementations are pure: the same pixels always give the same result and
/// nothing is retained between calls. `&self` plus `Sync` lets callers
/// classify several frames in parallel without locking.
pub trait SceneClassifier: Send + Sync {
    /// Classifier identifier.
    fn name(&self) -> &'static str;

    /// Brightness threshold the decision is made against.
    fn threshold(&self) -> f32;

    /// Classify a single frame.
    fn classify(&self, frame: &Frame) -> ClassificationResult;

    /// Result to use when no frame was available.
    fn unavailable(&self) -> ClassificationResult {
        ClassificationResult::unknown(self.threshold())
    }
}
