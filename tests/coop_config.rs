use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use coop_door::config::CoopConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "COOP_CONFIG",
        "COOP_IMAGE_PATH",
        "COOP_CAMERA_DEVICE",
        "COOP_BRIGHTNESS_THRESHOLD",
        "COOP_DEBOUNCE_SECS",
        "COOP_POLL_INTERVAL_MS",
        "COOP_PWM_CHIP",
        "COOP_PWM_CHANNEL",
        "COOP_FORCE_MOCK",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_defaults_without_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let cfg = CoopConfig::load().expect("load defaults");
    assert_eq!(cfg.image_path, "day1.jpg");
    assert!(cfg.camera_device.is_none());
    assert_eq!(cfg.brightness_threshold, 80.0);
    assert_eq!(cfg.debounce, Duration::from_secs(10));
    assert_eq!(cfg.servo.frequency_hz, 50);
    assert!(!cfg.servo.force_mock);
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "image_path": "/var/lib/coop/snapshot.jpg",
        "camera_device": "/dev/video1",
        "brightness_threshold": 70,
        "debounce_secs": 30,
        "poll_interval_ms": 250,
        "servo": {
            "pwm_chip": 2,
            "channel": 1,
            "sysfs_root": "/tmp/pwm",
            "open_duty": 2.5,
            "closed_duty": 7.5
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("COOP_CONFIG", file.path());
    std::env::set_var("COOP_BRIGHTNESS_THRESHOLD", "95.5");
    std::env::set_var("COOP_PWM_CHANNEL", "3");
    std::env::set_var("COOP_FORCE_MOCK", "yes");

    let cfg = CoopConfig::load().expect("load config");

    assert_eq!(cfg.image_path, "/var/lib/coop/snapshot.jpg");
    assert_eq!(cfg.camera_device.as_deref(), Some("/dev/video1"));
    assert_eq!(cfg.brightness_threshold, 95.5);
    assert_eq!(cfg.debounce, Duration::from_secs(30));
    assert_eq!(cfg.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.servo.pwm_chip, 2);
    assert_eq!(cfg.servo.channel, 3);
    assert_eq!(cfg.servo.sysfs_root, std::path::PathBuf::from("/tmp/pwm"));
    assert_eq!(cfg.servo.frequency_hz, 50);
    assert_eq!(cfg.servo.open_duty, 2.5);
    assert_eq!(cfg.servo.closed_duty, 7.5);
    assert!(cfg.servo.force_mock);

    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    std::env::set_var("COOP_BRIGHTNESS_THRESHOLD", "300");
    assert!(CoopConfig::load().is_err());
    clear_env();

    std::env::set_var("COOP_DEBOUNCE_SECS", "0");
    assert!(CoopConfig::load().is_err());
    clear_env();

    std::env::set_var("COOP_FORCE_MOCK", "sometimes");
    assert!(CoopConfig::load().is_err());
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, b"{ not json").expect("write config");
    std::env::set_var("COOP_CONFIG", file.path());
    let err = CoopConfig::load().unwrap_err();
    assert!(err.to_string().contains("invalid config file"));
    clear_env();
}
