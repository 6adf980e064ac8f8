//! Decision-to-action binding.
//!
//! `DoorController` is what the periodic timer calls. Each evaluation passes
//! the debounce gate, pulls one frame, classifies it and hands the result to
//! the shared `DoorActuator`. Frame failures degrade to `Unknown` and leave
//! the door alone; only a drive failure is returned to the caller.

use std::sync::Arc;
use std::time::Instant;

use crate::actuator::{DoorActuator, DoorPosition, RateGate};
use crate::classify::{ClassificationResult, SceneClassifier};
use crate::diagnostics::DiagnosticReport;
use crate::error::HardwareFault;
use crate::ingest::FrameSource;

/// Door label shown on the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DoorStatus {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl From<DoorPosition> for DoorStatus {
    fn from(position: DoorPosition) -> Self {
        match position {
            DoorPosition::Open => DoorStatus::Open,
            DoorPosition::Closed => DoorStatus::Closed,
        }
    }
}

impl std::fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoorStatus::Open => f.write_str("Open"),
            DoorStatus::Closed => f.write_str("Closed"),
            DoorStatus::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Outcome of one evaluation request.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluation {
    /// Dropped by the debounce gate; nothing was captured or driven.
    Skipped,
    Evaluated {
        result: ClassificationResult,
        action: Option<DoorPosition>,
    },
}

pub struct DoorController<S, C> {
    source: S,
    classifier: C,
    gate: RateGate,
    actuator: Arc<DoorActuator>,
    status: DoorStatus,
    last_result: Option<ClassificationResult>,
    last_report: Option<DiagnosticReport>,
}

impl<S: FrameSource, C: SceneClassifier> DoorController<S, C> {
    pub fn new(source: S, classifier: C, gate: RateGate, actuator: Arc<DoorActuator>) -> Self {
        Self {
            source,
            classifier,
            gate,
            actuator,
            status: DoorStatus::Unknown,
            last_result: None,
            last_report: None,
        }
    }

    /// Timed evaluation, subject to the debounce gate.
    pub fn evaluate(&mut self) -> Result<Evaluation, HardwareFault> {
        self.evaluate_at(Instant::now())
    }

    /// Evaluation at `now`. The debounce window restarts only when a frame
    /// was actually classified, so a failed capture does not delay the next
    /// decision.
    pub fn evaluate_at(&mut self, now: Instant) -> Result<Evaluation, HardwareFault> {
        if !self.gate.is_open(now) {
            log::trace!(
                "evaluation dropped, {:?} left in debounce window",
                self.gate.remaining(now)
            );
            return Ok(Evaluation::Skipped);
        }
        let (result, report) = self.capture();
        if !result.is_unknown() {
            self.gate.commit(now);
        }
        self.act(result, report)
    }

    /// Manual refresh. Bypasses the debounce gate.
    pub fn refresh(&mut self) -> Result<Evaluation, HardwareFault> {
        let (result, report) = self.capture();
        self.act(result, report)
    }

    /// Pull and classify one frame; a failed capture yields `Unknown`.
    fn capture(&mut self) -> (ClassificationResult, DiagnosticReport) {
        match self.source.next_frame() {
            Ok(frame) => {
                let result = self.classifier.classify(&frame);
                let report = DiagnosticReport::new(&frame, &result);
                (result, report)
            }
            Err(err) => {
                log::warn!(
                    "no frame from {}: {:#}; door left {}",
                    self.source.describe(),
                    err,
                    self.actuator.position()
                );
                let threshold = self.classifier.threshold();
                (
                    ClassificationResult::unknown(threshold),
                    DiagnosticReport::unavailable(threshold),
                )
            }
        }
    }

    fn act(
        &mut self,
        result: ClassificationResult,
        report: DiagnosticReport,
    ) -> Result<Evaluation, HardwareFault> {
        self.last_result = Some(result);
        self.last_report = Some(report);

        let action = self.actuator.evaluate_and_act(&result)?;
        self.status = match action {
            Some(position) => position.into(),
            None => DoorStatus::Unknown,
        };
        Ok(Evaluation::Evaluated { result, action })
    }

    /// Manual open, shares the actuator's serialization point.
    pub fn open_door(&mut self) -> Result<(), HardwareFault> {
        self.actuator.open_door()?;
        self.status = DoorStatus::Open;
        Ok(())
    }

    pub fn close_door(&mut self) -> Result<(), HardwareFault> {
        self.actuator.close_door()?;
        self.status = DoorStatus::Closed;
        Ok(())
    }

    pub fn status(&self) -> DoorStatus {
        self.status
    }

    pub fn last_result(&self) -> Option<&ClassificationResult> {
        self.last_result.as_ref()
    }

    /// Diagnostics for the most recent evaluation.
    pub fn last_report(&self) -> Option<&DiagnosticReport> {
        self.last_report.as_ref()
    }

    pub fn actuator(&self) -> &Arc<DoorActuator> {
        &self.actuator
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
