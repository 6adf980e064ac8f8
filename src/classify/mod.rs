mod backend;
mod light;
mod result;

pub use backend::SceneClassifier;
pub(crate) use light::luma;
pub use light::{classify, classify_path, LightClassifier, DEFAULT_BRIGHTNESS_THRESHOLD};
pub use result::{ClassificationResult, LightMetrics, Prediction};
