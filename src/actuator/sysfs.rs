//! Linux sysfs PWM drive line.
//!
//! Layout under the sysfs root (normally `/sys/class/pwm`):
//!
//! ```text
//! pwmchipN/export          write channel number to claim
//! pwmchipN/unexport        write channel number to hand back
//! pwmchipN/pwmM/period     nanoseconds
//! pwmchipN/pwmM/duty_cycle nanoseconds, must not exceed period
//! pwmchipN/pwmM/enable     0 | 1
//! ```
//!
//! Channels are exported on the first write and unexported on `release`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::actuator::drive::{validate_command, DriveKind, DriveLine};
use crate::error::{ActuatorUnavailable, HardwareFault};

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/pwm";

const NANOS_PER_SEC: u64 = 1_000_000_000;

pub struct PhysicalDriveLine {
    chip: u32,
    chip_dir: PathBuf,
    /// Exported channels and the period last written to each.
    exported: HashMap<u32, Option<u64>>,
}

impl PhysicalDriveLine {
    /// Check that the PWM chip exists. Nothing is claimed yet.
    pub fn probe(sysfs_root: &Path, chip: u32) -> Result<Self, ActuatorUnavailable> {
        let chip_dir = sysfs_root.join(format!("pwmchip{chip}"));
        if !chip_dir.join("export").exists() {
            return Err(ActuatorUnavailable {
                reason: format!("no pwm chip at {}", chip_dir.display()),
            });
        }
        Ok(Self {
            chip,
            chip_dir,
            exported: HashMap::new(),
        })
    }

    fn channel_dir(&self, channel: u32) -> PathBuf {
        self.chip_dir.join(format!("pwm{channel}"))
    }

    fn ensure_exported(&mut self, channel: u32) -> Result<(), HardwareFault> {
        if self.exported.contains_key(&channel) {
            return Ok(());
        }
        if !self.channel_dir(channel).exists() {
            write_attr(&self.chip_dir.join("export"), channel)?;
            if !self.channel_dir(channel).exists() {
                return Err(HardwareFault::ChannelUnavailable {
                    chip: self.chip,
                    channel,
                });
            }
        }
        log::debug!("pwmchip{}: channel {} exported", self.chip, channel);
        self.exported.insert(channel, None);
        Ok(())
    }
}

impl DriveLine for PhysicalDriveLine {
    fn kind(&self) -> DriveKind {
        DriveKind::Physical
    }

    fn set_duty_cycle(
        &mut self,
        pin: u32,
        frequency_hz: u32,
        duty_percent: f32,
    ) -> Result<(), HardwareFault> {
        validate_command(frequency_hz, duty_percent)?;
        self.ensure_exported(pin)?;

        let dir = self.channel_dir(pin);
        let period_ns = NANOS_PER_SEC / frequency_hz as u64;
        let duty_ns = (period_ns as f64 * duty_percent as f64 / 100.0).round() as u64;

        if self.exported.get(&pin).copied().flatten() != Some(period_ns) {
            // Kernel rejects a period shorter than the current duty.
            write_attr(&dir.join("duty_cycle"), 0)?;
            write_attr(&dir.join("period"), period_ns)?;
            self.exported.insert(pin, Some(period_ns));
        }
        write_attr(&dir.join("duty_cycle"), duty_ns)?;
        write_attr(&dir.join("enable"), 1)?;
        log::debug!(
            "pwmchip{}/pwm{}: period={}ns duty={}ns",
            self.chip,
            pin,
            period_ns,
            duty_ns
        );
        Ok(())
    }

    fn release(&mut self, pin: u32) -> Result<(), HardwareFault> {
        if !self.exported.contains_key(&pin) {
            return Ok(());
        }
        // Stays tracked until both writes land, so a later release retries.
        write_attr(&self.channel_dir(pin).join("enable"), 0)?;
        write_attr(&self.chip_dir.join("unexport"), pin)?;
        self.exported.remove(&pin);
        log::debug!("pwmchip{}: channel {} unexported", self.chip, pin);
        Ok(())
    }
}

fn write_attr(path: &Path, value: impl ToString) -> Result<(), HardwareFault> {
    std::fs::write(path, value.to_string()).map_err(|e| HardwareFault::io(path, e))
}
