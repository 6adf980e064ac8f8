use crate::actuator::mock::MockDriveLine;
use crate::actuator::sysfs::PhysicalDriveLine;
use crate::actuator::DoorPosition;
use crate::config::ServoSettings;
use crate::error::HardwareFault;

/// Which drive line variant is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveKind {
    Physical,
    Mock,
}

impl std::fmt::Display for DriveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriveKind::Physical => f.write_str("physical"),
            DriveKind::Mock => f.write_str("mock"),
        }
    }
}

/// Duty-cycle output driving the door servo.
///
/// A drive line owns its PWM output exclusively. Callers serialize access;
/// implementations do not lock internally.
pub trait DriveLine: Send {
    fn kind(&self) -> DriveKind;

    /// Drive `pin` at `frequency_hz` with `duty_percent` (0..=100).
    fn set_duty_cycle(
        &mut self,
        pin: u32,
        frequency_hz: u32,
        duty_percent: f32,
    ) -> Result<(), HardwareFault>;

    /// Stop driving `pin` and hand the line back to the system.
    fn release(&mut self, pin: u32) -> Result<(), HardwareFault>;
}

/// Servo wiring and calibration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServoProfile {
    pub pin: u32,
    pub frequency_hz: u32,
    pub open_duty: f32,
    pub closed_duty: f32,
}

pub const SERVO_FREQUENCY_HZ: u32 = 50;
pub const OPEN_DUTY_PERCENT: f32 = 2.0;
pub const CLOSED_DUTY_PERCENT: f32 = 8.0;

impl Default for ServoProfile {
    fn default() -> Self {
        Self {
            pin: 0,
            frequency_hz: SERVO_FREQUENCY_HZ,
            open_duty: OPEN_DUTY_PERCENT,
            closed_duty: CLOSED_DUTY_PERCENT,
        }
    }
}

impl ServoProfile {
    pub fn from_settings(settings: &ServoSettings) -> Self {
        Self {
            pin: settings.channel,
            frequency_hz: settings.frequency_hz,
            open_duty: settings.open_duty,
            closed_duty: settings.closed_duty,
        }
    }

    pub fn duty_for(&self, position: DoorPosition) -> f32 {
        match position {
            DoorPosition::Open => self.open_duty,
            DoorPosition::Closed => self.closed_duty,
        }
    }
}

/// SG90-style mapping: 0..=180 degrees onto 2..=12 % duty at 50 Hz.
pub fn angle_to_duty(angle_degrees: f32) -> f32 {
    2.0 + angle_degrees.clamp(0.0, 180.0) / 18.0
}

pub(crate) fn validate_command(frequency_hz: u32, duty_percent: f32) -> Result<(), HardwareFault> {
    if frequency_hz == 0 {
        return Err(HardwareFault::InvalidFrequency);
    }
    if !(0.0..=100.0).contains(&duty_percent) {
        return Err(HardwareFault::InvalidDuty(duty_percent));
    }
    Ok(())
}

/// Pick the drive line once at startup.
///
/// A present PWM chip gives the physical line; anything else (no chip, mock
/// forced by configuration) falls back to the logging mock.
pub fn probe_drive_line(settings: &ServoSettings) -> Box<dyn DriveLine> {
    if settings.force_mock {
        log::info!("servo: mock drive line forced by configuration");
        return Box::new(MockDriveLine::new());
    }
    match PhysicalDriveLine::probe(&settings.sysfs_root, settings.pwm_chip) {
        Ok(line) => {
            log::info!(
                "servo: using pwmchip{} channel {} under {}",
                settings.pwm_chip,
                settings.channel,
                settings.sysfs_root.display()
            );
            Box::new(line)
        }
        Err(unavailable) => {
            log::warn!("{}; falling back to mock drive line", unavailable);
            Box::new(MockDriveLine::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_mapping_matches_sg90() {
        assert_eq!(angle_to_duty(0.0), 2.0);
        assert_eq!(angle_to_duty(90.0), 7.0);
        assert_eq!(angle_to_duty(180.0), 12.0);
        assert_eq!(angle_to_duty(-30.0), 2.0);
        assert_eq!(angle_to_duty(400.0), 12.0);
    }

    #[test]
    fn default_profile_duties() {
        let profile = ServoProfile::default();
        assert_eq!(profile.frequency_hz, 50);
        assert_eq!(profile.duty_for(DoorPosition::Open), 2.0);
        assert_eq!(profile.duty_for(DoorPosition::Closed), 8.0);
    }

    #[test]
    fn validate_command_rejects_out_of_range() {
        assert!(validate_command(50, 2.0).is_ok());
        assert!(matches!(
            validate_command(0, 2.0),
            Err(HardwareFault::InvalidFrequency)
        ));
        assert!(matches!(
            validate_command(50, 101.0),
            Err(HardwareFault::InvalidDuty(_))
        ));
        assert!(matches!(
            validate_command(50, f32::NAN),
            Err(HardwareFault::InvalidDuty(_))
        ));
    }

    #[test]
    fn probe_falls_back_to_mock_without_chip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = ServoSettings {
            sysfs_root: dir.path().to_path_buf(),
            ..ServoSettings::default()
        };
        assert_eq!(probe_drive_line(&settings).kind(), DriveKind::Mock);
    }

    #[test]
    fn probe_honours_force_mock() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("pwmchip0")).expect("chip dir");
        std::fs::write(dir.path().join("pwmchip0/export"), "").expect("export");
        let mut settings = ServoSettings {
            sysfs_root: dir.path().to_path_buf(),
            ..ServoSettings::default()
        };
        assert_eq!(probe_drive_line(&settings).kind(), DriveKind::Physical);
        settings.force_mock = true;
        assert_eq!(probe_drive_line(&settings).kind(), DriveKind::Mock);
    }
}
