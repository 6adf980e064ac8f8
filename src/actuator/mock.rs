//! No-hardware drive line.
//!
//! Logs the duty it would have written and records it, so the decision logic
//! runs the same on a laptop as on the coop's board.

use std::sync::{Arc, Mutex, PoisonError};

use crate::actuator::drive::{validate_command, DriveKind, DriveLine};
use crate::error::HardwareFault;

#[derive(Clone, Debug, PartialEq)]
pub enum DriveCommand {
    SetDuty {
        pin: u32,
        frequency_hz: u32,
        duty_percent: f32,
    },
    Release {
        pin: u32,
    },
}

/// Shared view of the commands a `MockDriveLine` received.
#[derive(Clone, Debug, Default)]
pub struct DriveRecorder {
    commands: Arc<Mutex<Vec<DriveCommand>>>,
}

impl DriveRecorder {
    fn push(&self, command: DriveCommand) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }

    pub fn commands(&self) -> Vec<DriveCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Duty values written, in order.
    pub fn duties(&self) -> Vec<f32> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                DriveCommand::SetDuty { duty_percent, .. } => Some(duty_percent),
                DriveCommand::Release { .. } => None,
            })
            .collect()
    }

    pub fn release_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, DriveCommand::Release { .. }))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct MockDriveLine {
    recorder: DriveRecorder,
}

impl MockDriveLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> DriveRecorder {
        self.recorder.clone()
    }
}

impl DriveLine for MockDriveLine {
    fn kind(&self) -> DriveKind {
        DriveKind::Mock
    }

    fn set_duty_cycle(
        &mut self,
        pin: u32,
        frequency_hz: u32,
        duty_percent: f32,
    ) -> Result<(), HardwareFault> {
        validate_command(frequency_hz, duty_percent)?;
        log::info!(
            "[mock servo] pin {} -> {:.1}% duty @ {} Hz",
            pin,
            duty_percent,
            frequency_hz
        );
        self.recorder.push(DriveCommand::SetDuty {
            pin,
            frequency_hz,
            duty_percent,
        });
        Ok(())
    }

    fn release(&mut self, pin: u32) -> Result<(), HardwareFault> {
        log::info!("[mock servo] pin {} released", pin);
        self.recorder.push(DriveCommand::Release { pin });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_records_commands() {
        let mut line = MockDriveLine::new();
        let recorder = line.recorder();

        line.set_duty_cycle(17, 50, 2.0).unwrap();
        line.set_duty_cycle(17, 50, 8.0).unwrap();
        line.release(17).unwrap();

        assert_eq!(recorder.duties(), vec![2.0, 8.0]);
        assert_eq!(recorder.release_count(), 1);
        assert_eq!(
            recorder.commands()[0],
            DriveCommand::SetDuty {
                pin: 17,
                frequency_hz: 50,
                duty_percent: 2.0
            }
        );
    }

    #[test]
    fn mock_still_validates_duty() {
        let mut line = MockDriveLine::new();
        assert!(line.set_duty_cycle(0, 50, 150.0).is_err());
        assert!(line.recorder().commands().is_empty());
    }
}
