use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::actuator::{
    CLOSED_DUTY_PERCENT, DEFAULT_DEBOUNCE, DEFAULT_SYSFS_ROOT, OPEN_DUTY_PERCENT,
    SERVO_FREQUENCY_HZ,
};
use crate::classify::DEFAULT_BRIGHTNESS_THRESHOLD;

const DEFAULT_IMAGE_PATH: &str = "day1.jpg";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Deserialize, Default)]
struct CoopConfigFile {
    image_path: Option<String>,
    camera_device: Option<String>,
    brightness_threshold: Option<f32>,
    debounce_secs: Option<u64>,
    poll_interval_ms: Option<u64>,
    servo: Option<ServoConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ServoConfigFile {
    pwm_chip: Option<u32>,
    channel: Option<u32>,
    sysfs_root: Option<PathBuf>,
    frequency_hz: Option<u32>,
    open_duty: Option<f32>,
    closed_duty: Option<f32>,
    force_mock: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CoopConfig {
    /// Still image classified when no camera is configured.
    pub image_path: String,
    /// Live capture device (e.g. `/dev/video0`); takes precedence over `image_path`.
    /// A comma-separated list is tried in order, e.g. `/dev/video1,/dev/video0`
    /// for an external camera with the built-in one as fallback.
    pub camera_device: Option<String>,
    pub brightness_threshold: f32,
    pub debounce: Duration,
    pub poll_interval: Duration,
    pub servo: ServoSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServoSettings {
    pub pwm_chip: u32,
    pub channel: u32,
    pub sysfs_root: PathBuf,
    pub frequency_hz: u32,
    pub open_duty: f32,
    pub closed_duty: f32,
    pub force_mock: bool,
}

impl Default for ServoSettings {
    fn default() -> Self {
        Self {
            pwm_chip: 0,
            channel: 0,
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            frequency_hz: SERVO_FREQUENCY_HZ,
            open_duty: OPEN_DUTY_PERCENT,
            closed_duty: CLOSED_DUTY_PERCENT,
            force_mock: false,
        }
    }
}

impl Default for CoopConfig {
    fn default() -> Self {
        Self {
            image_path: DEFAULT_IMAGE_PATH.to_string(),
            camera_device: None,
            brightness_threshold: DEFAULT_BRIGHTNESS_THRESHOLD,
            debounce: DEFAULT_DEBOUNCE,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            servo: ServoSettings::default(),
        }
    }
}

impl CoopConfig {
    /// Defaults, then the JSON file named by `COOP_CONFIG`, then `COOP_*`
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("COOP_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CoopConfigFile) -> Self {
        let defaults = Self::default();
        let servo_defaults = ServoSettings::default();
        let servo = file.servo.unwrap_or_default();
        Self {
            image_path: file.image_path.unwrap_or(defaults.image_path),
            camera_device: file.camera_device.filter(|d| !d.trim().is_empty()),
            brightness_threshold: file
                .brightness_threshold
                .unwrap_or(defaults.brightness_threshold),
            debounce: file
                .debounce_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.debounce),
            poll_interval: file
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            servo: ServoSettings {
                pwm_chip: servo.pwm_chip.unwrap_or(servo_defaults.pwm_chip),
                channel: servo.channel.unwrap_or(servo_defaults.channel),
                sysfs_root: servo.sysfs_root.unwrap_or(servo_defaults.sysfs_root),
                frequency_hz: servo.frequency_hz.unwrap_or(servo_defaults.frequency_hz),
                open_duty: servo.open_duty.unwrap_or(servo_defaults.open_duty),
                closed_duty: servo.closed_duty.unwrap_or(servo_defaults.closed_duty),
                force_mock: servo.force_mock.unwrap_or(servo_defaults.force_mock),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("COOP_IMAGE_PATH") {
            if !path.trim().is_empty() {
                self.image_path = path;
            }
        }
        if let Ok(device) = std::env::var("COOP_CAMERA_DEVICE") {
            if !device.trim().is_empty() {
                self.camera_device = Some(device);
            }
        }
        if let Ok(threshold) = std::env::var("COOP_BRIGHTNESS_THRESHOLD") {
            self.brightness_threshold = threshold
                .trim()
                .parse()
                .map_err(|_| anyhow!("COOP_BRIGHTNESS_THRESHOLD must be a number"))?;
        }
        if let Ok(secs) = std::env::var("COOP_DEBOUNCE_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                anyhow!("COOP_DEBOUNCE_SECS must be an integer number of seconds")
            })?;
            self.debounce = Duration::from_secs(secs);
        }
        if let Ok(ms) = std::env::var("COOP_POLL_INTERVAL_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                anyhow!("COOP_POLL_INTERVAL_MS must be an integer number of milliseconds")
            })?;
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Ok(chip) = std::env::var("COOP_PWM_CHIP") {
            self.servo.pwm_chip = chip
                .trim()
                .parse()
                .map_err(|_| anyhow!("COOP_PWM_CHIP must be an integer"))?;
        }
        if let Ok(channel) = std::env::var("COOP_PWM_CHANNEL") {
            self.servo.channel = channel
                .trim()
                .parse()
                .map_err(|_| anyhow!("COOP_PWM_CHANNEL must be an integer"))?;
        }
        if let Ok(flag) = std::env::var("COOP_FORCE_MOCK") {
            self.servo.force_mock = parse_flag(&flag)
                .ok_or_else(|| anyhow!("COOP_FORCE_MOCK must be true/false/1/0"))?;
        }
        Ok(())
    }

    /// Configured capture devices in the order they should be tried.
    pub fn camera_devices(&self) -> Vec<&str> {
        self.camera_device
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        let threshold = self.brightness_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 255.0 {
            return Err(anyhow!(
                "brightness_threshold must be in (0, 255], got {}",
                threshold
            ));
        }
        if self.debounce.is_zero() {
            return Err(anyhow!("debounce must be greater than zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(anyhow!("poll_interval must be greater than zero"));
        }
        if self.servo.frequency_hz == 0 {
            return Err(anyhow!("servo frequency_hz must be greater than zero"));
        }
        for (name, duty) in [
            ("open_duty", self.servo.open_duty),
            ("closed_duty", self.servo.closed_duty),
        ] {
            if !(0.0..=100.0).contains(&duty) {
                return Err(anyhow!("servo {} must be within 0..=100, got {}", name, duty));
            }
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<CoopConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
