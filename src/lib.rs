//! Coop door controller.
//!
//! Looks at the coop camera, decides whether it is night or morning, and
//! drives a servo to close or open the door.
//!
//! # Module Structure
//!
//! - `frame`: Immutable RGB still frame
//! - `ingest`: Frame sources (image files, V4L2 cameras, synthetic scenes)
//! - `classify`: Brightness + colour-temperature classifier
//! - `diagnostics`: Histogram and markers for the display panel
//! - `actuator`: Door state machine, servo drive lines, debounce gate
//! - `controller`: Timed evaluation binding classifier to actuator
//! - `config`: JSON file + environment configuration
//!
//! The classifier is pure and may run on several frames at once. Everything
//! that touches the servo goes through one `DoorActuator`.

pub mod actuator;
pub mod classify;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod ingest;

pub use actuator::{
    probe_drive_line, DoorActuator, DoorPosition, DoorState, DriveKind, DriveLine, RateGate,
    ServoProfile,
};
pub use classify::{
    classify, classify_path, ClassificationResult, LightClassifier, LightMetrics, Prediction,
    SceneClassifier,
};
pub use config::{CoopConfig, ServoSettings};
pub use controller::{DoorController, DoorStatus, Evaluation};
pub use diagnostics::DiagnosticReport;
pub use error::{ActuatorUnavailable, HardwareFault, ImageUnavailable};
pub use frame::Frame;
pub use ingest::{open_first, FileConfig, FileSource, FrameSource};
#[cfg(feature = "ingest-v4l2")]
pub use ingest::{V4l2Config, V4l2Source};
