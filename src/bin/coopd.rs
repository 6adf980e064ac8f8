//! coopd - coop door daemon
//!
//! This daemon:
//! 1. Probes for a PWM drive line (falls back to a logging mock)
//! 2. Pulls frames from a still image or camera on a fixed poll interval
//! 3. Classifies each frame as night or morning, rate-limited by the debounce window
//! 4. Opens or closes the door accordingly
//! 5. Accepts manual `open`, `close`, `refresh`, `status` commands on stdin
//! 6. Releases the servo line on Ctrl-C or `quit`

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use coop_door::{
    open_first, probe_drive_line, CoopConfig, DoorActuator, DoorController, Evaluation, FileConfig,
    FileSource, FrameSource, LightClassifier, RateGate, ServoProfile,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Open and close the coop door from camera light levels")]
struct Args {
    /// Still image to classify (overrides config / COOP_IMAGE_PATH).
    #[arg(long)]
    image: Option<String>,
    /// Camera device, e.g. /dev/video0 (requires the ingest-v4l2 feature).
    /// Repeat to list fallbacks, tried in order.
    #[arg(long = "device")]
    devices: Vec<String>,
    /// Brightness threshold, 0-255.
    #[arg(long)]
    threshold: Option<f32>,
    /// Minimum seconds between automatic evaluations.
    #[arg(long)]
    debounce_secs: Option<u64>,
    /// Poll interval in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Never touch PWM hardware.
    #[arg(long)]
    mock: bool,
}

enum Command {
    Open,
    Close,
    Refresh,
    Status,
    Shutdown,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = CoopConfig::load()?;
    if let Some(image) = args.image {
        cfg.image_path = image;
        cfg.camera_device = None;
    }
    if !args.devices.is_empty() {
        cfg.camera_device = Some(args.devices.join(","));
    }
    if let Some(threshold) = args.threshold {
        if !(threshold > 0.0 && threshold <= 255.0) {
            return Err(anyhow!("--threshold must be in (0, 255]"));
        }
        cfg.brightness_threshold = threshold;
    }
    if let Some(secs) = args.debounce_secs {
        cfg.debounce = Duration::from_secs(secs.max(1));
    }
    if let Some(ms) = args.interval_ms {
        cfg.poll_interval = Duration::from_millis(ms.max(1));
    }
    cfg.servo.force_mock |= args.mock;

    let drive = probe_drive_line(&cfg.servo);
    let actuator = Arc::new(DoorActuator::new(drive, ServoProfile::from_settings(&cfg.servo)));

    let source = open_source(&cfg)?;
    log::info!("coopd running. source: {}", source.describe());
    log::info!(
        "threshold={} debounce={}s poll={}ms drive={}",
        cfg.brightness_threshold,
        cfg.debounce.as_secs(),
        cfg.poll_interval.as_millis(),
        actuator.drive_kind()
    );

    let mut controller = DoorController::new(
        source,
        LightClassifier::new(cfg.brightness_threshold),
        RateGate::new(cfg.debounce),
        Arc::clone(&actuator),
    );

    let (tx, rx) = mpsc::channel();
    let signal_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = signal_tx.send(Command::Shutdown);
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;
    spawn_stdin_reader(tx);

    let outcome = run_loop(&mut controller, &rx, cfg.poll_interval);

    log::info!("shutting down, door left {}", actuator.position());
    actuator.shutdown();
    outcome
}

fn run_loop(
    controller: &mut DoorController<Box<dyn FrameSource>, LightClassifier>,
    rx: &mpsc::Receiver<Command>,
    poll_interval: Duration,
) -> Result<()> {
    loop {
        if let Err(e) = controller.evaluate().map(log_evaluation) {
            log::error!("door actuation failed: {}", e);
        }

        match rx.recv_timeout(poll_interval) {
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
            Ok(command) => handle_command(controller, command),
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

fn handle_command(
    controller: &mut DoorController<Box<dyn FrameSource>, LightClassifier>,
    command: Command,
) {
    let outcome = match command {
        Command::Open => controller.open_door(),
        Command::Close => controller.close_door(),
        Command::Refresh => controller.refresh().map(log_evaluation),
        Command::Status => {
            print_status(controller);
            Ok(())
        }
        Command::Shutdown => Ok(()),
    };
    match outcome {
        Ok(()) => println!("door: {}", controller.status()),
        Err(e) => log::error!("door command failed: {}", e),
    }
}

fn print_status(controller: &DoorController<Box<dyn FrameSource>, LightClassifier>) {
    let state = controller.actuator().state();
    println!(
        "status={} position={} source_healthy={}",
        controller.status(),
        state.position,
        controller.source().is_healthy()
    );
    if let Some(report) = controller.last_report() {
        println!("{report}");
    }
}

fn log_evaluation(evaluation: Evaluation) {
    if let Evaluation::Evaluated { result, action } = evaluation {
        log::info!(
            "prediction={} confidence={:.2} brightness={:.1} action={}",
            result.prediction,
            result.confidence,
            result.metrics.brightness,
            action.map_or_else(|| "none".to_string(), |p| p.to_string())
        );
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let command = match line.trim().to_ascii_lowercase().as_str() {
                "" => continue,
                "open" => Command::Open,
                "close" => Command::Close,
                "refresh" => Command::Refresh,
                "status" => Command::Status,
                "quit" | "exit" => Command::Shutdown,
                other => {
                    log::warn!("unknown command '{}' (open|close|refresh|status|quit)", other);
                    continue;
                }
            };
            if tx.send(command).is_err() {
                return;
            }
        }
        log::debug!("stdin closed; manual commands disabled");
    });
}

fn open_source(cfg: &CoopConfig) -> Result<Box<dyn FrameSource>> {
    let devices = cfg.camera_devices();
    if devices.is_empty() {
        return Ok(Box::new(FileSource::new(FileConfig {
            path: cfg.image_path.clone(),
        })?));
    }
    open_first(&devices, open_camera)
}

#[cfg(feature = "ingest-v4l2")]
fn open_camera(device: &str) -> Result<Box<dyn FrameSource>> {
    let mut source = coop_door::V4l2Source::new(coop_door::V4l2Config {
        device: device.to_string(),
        ..coop_door::V4l2Config::default()
    })?;
    source.connect()?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "ingest-v4l2"))]
fn open_camera(device: &str) -> Result<Box<dyn FrameSource>> {
    Err(anyhow!(
        "camera {} requested but coopd was built without the ingest-v4l2 feature",
        device
    ))
}
