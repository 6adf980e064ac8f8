//! Door actuation.
//!
//! `DoorActuator` owns the door's logical state and the servo drive line.
//! Both sit behind one mutex, so a manual command and a timed evaluation can
//! never have two duty writes in flight at once.
//!
//! The door is a two-state machine, `Closed` at startup:
//!
//! ```text
//!   Closed --open--> Open
//!   Open --close--> Closed
//! ```
//!
//! Self-transitions are legal and re-assert the PWM signal. There is no
//! position feedback: the logical position is the last command whose drive
//! write succeeded.

mod debounce;
mod drive;
mod mock;
mod sysfs;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::classify::{ClassificationResult, Prediction};
use crate::error::HardwareFault;

pub use debounce::{RateGate, DEFAULT_DEBOUNCE};
pub use drive::{
    angle_to_duty, probe_drive_line, DriveKind, DriveLine, ServoProfile, CLOSED_DUTY_PERCENT,
    OPEN_DUTY_PERCENT, SERVO_FREQUENCY_HZ,
};
pub use mock::{DriveCommand, DriveRecorder, MockDriveLine};
pub use sysfs::{PhysicalDriveLine, DEFAULT_SYSFS_ROOT};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DoorPosition {
    Open,
    #[default]
    Closed,
}

impl std::fmt::Display for DoorPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoorPosition::Open => f.write_str("Open"),
            DoorPosition::Closed => f.write_str("Closed"),
        }
    }
}

/// Snapshot of the door as software tracks it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoorState {
    pub position: DoorPosition,
    pub last_classification_at: Option<Instant>,
    pub last_actuated_at: Option<Instant>,
}

struct Inner {
    state: DoorState,
    drive: Box<dyn DriveLine>,
    released: bool,
}

pub struct DoorActuator {
    profile: ServoProfile,
    kind: DriveKind,
    inner: Mutex<Inner>,
}

impl DoorActuator {
    pub fn new(drive: Box<dyn DriveLine>, profile: ServoProfile) -> Self {
        let kind = drive.kind();
        log::info!(
            "door actuator ready: {} drive, pin {}, open={}% closed={}% @ {} Hz",
            kind,
            profile.pin,
            profile.open_duty,
            profile.closed_duty,
            profile.frequency_hz
        );
        Self {
            profile,
            kind,
            inner: Mutex::new(Inner {
                state: DoorState::default(),
                drive,
                released: false,
            }),
        }
    }

    /// Actuator on a fresh mock line; returns the recorder for inspection.
    pub fn with_mock(profile: ServoProfile) -> (Self, DriveRecorder) {
        let line = MockDriveLine::new();
        let recorder = line.recorder();
        (Self::new(Box::new(line), profile), recorder)
    }

    pub fn open_door(&self) -> Result<(), HardwareFault> {
        let mut inner = self.lock();
        self.drive_to(&mut inner, DoorPosition::Open)
    }

    pub fn close_door(&self) -> Result<(), HardwareFault> {
        let mut inner = self.lock();
        self.drive_to(&mut inner, DoorPosition::Closed)
    }

    /// Map a classification onto the door.
    ///
    /// Morning labels open, night closes, anything else leaves the door
    /// alone. Confidence is reported but does not gate the action. Returns
    /// the commanded position, if any.
    pub fn evaluate_and_act(
        &self,
        result: &ClassificationResult,
    ) -> Result<Option<DoorPosition>, HardwareFault> {
        let mut inner = self.lock();
        inner.state.last_classification_at = Some(Instant::now());

        let target = match result.prediction {
            p if p.is_morning() => DoorPosition::Open,
            Prediction::Night => DoorPosition::Closed,
            other => {
                log::info!("prediction {} maps to no door action", other);
                return Ok(None);
            }
        };
        log::info!(
            "{} (confidence {:.2}) -> {} door",
            result.prediction,
            result.confidence,
            if target == DoorPosition::Open {
                "open"
            } else {
                "close"
            }
        );
        self.drive_to(&mut inner, target)?;
        Ok(Some(target))
    }

    /// Release the drive line. Safe to call repeatedly; never fails.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        if inner.released {
            return;
        }
        inner.released = true;
        if let Err(e) = inner.drive.release(self.profile.pin) {
            log::warn!("servo release failed during shutdown: {}", e);
        } else {
            log::info!("servo pin {} released", self.profile.pin);
        }
    }

    pub fn state(&self) -> DoorState {
        self.lock().state
    }

    pub fn position(&self) -> DoorPosition {
        self.lock().state.position
    }

    pub fn drive_kind(&self) -> DriveKind {
        self.kind
    }

    pub fn profile(&self) -> ServoProfile {
        self.profile
    }

    fn drive_to(&self, inner: &mut Inner, target: DoorPosition) -> Result<(), HardwareFault> {
        let duty = self.profile.duty_for(target);
        // Any write attempt may claim the channel, even one that fails.
        inner.released = false;
        if let Err(e) = inner
            .drive
            .set_duty_cycle(self.profile.pin, self.profile.frequency_hz, duty)
        {
            log::error!(
                "servo write for {} failed, door stays {}: {}",
                target,
                inner.state.position,
                e
            );
            return Err(e);
        }

        let previous = inner.state.position;
        inner.state.position = target;
        inner.state.last_actuated_at = Some(Instant::now());
        if previous != target {
            log::info!("door {} -> {} ({:.1}% duty)", previous, target, duty);
        } else {
            log::debug!("door already {}, signal re-asserted", target);
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State is only written after a successful drive, so a poisoned
        // guard still holds a consistent snapshot.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DoorActuator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
