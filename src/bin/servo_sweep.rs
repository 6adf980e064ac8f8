//! servo_sweep - move the door servo through open, middle and closed.
//!
//! Used to calibrate the linkage after mounting. Each step drives the angle's
//! duty briefly, then drops the duty to zero so the horn does not jitter.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::time::Duration;

use coop_door::actuator::angle_to_duty;
use coop_door::{probe_drive_line, CoopConfig, DriveLine};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sweep the door servo 0° -> 90° -> 180°")]
struct Args {
    /// Pause between positions, milliseconds.
    #[arg(long, default_value_t = 2000)]
    pause_ms: u64,
    /// How long each position is driven before the signal is dropped.
    #[arg(long, default_value_t = 500)]
    hold_ms: u64,
    /// Never touch PWM hardware.
    #[arg(long)]
    mock: bool,
}

const STEPS: [(f32, &str); 3] = [(0.0, "Open"), (90.0, "Middle"), (180.0, "Closed")];

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = CoopConfig::load()?;
    cfg.servo.force_mock |= args.mock;
    let mut line = probe_drive_line(&cfg.servo);
    let pin = cfg.servo.channel;
    let frequency_hz = cfg.servo.frequency_hz;

    let (tx, rx) = std::sync::mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let outcome = sweep(&mut *line, pin, frequency_hz, &args, &rx);
    if let Err(e) = line.release(pin) {
        log::warn!("servo release failed: {}", e);
    }
    outcome
}

fn sweep(
    line: &mut dyn DriveLine,
    pin: u32,
    frequency_hz: u32,
    args: &Args,
    stop: &std::sync::mpsc::Receiver<()>,
) -> Result<()> {
    for (angle, label) in STEPS {
        let duty = angle_to_duty(angle);
        println!("Rotating to {angle}° ({label}), duty {duty:.1}%");
        line.set_duty_cycle(pin, frequency_hz, duty)?;
        std::thread::sleep(Duration::from_millis(args.hold_ms));
        line.set_duty_cycle(pin, frequency_hz, 0.0)?;

        if stop.recv_timeout(Duration::from_millis(args.pause_ms)).is_ok() {
            println!("Program stopped manually");
            return Ok(());
        }
    }
    Ok(())
}
