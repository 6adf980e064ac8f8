//! light_detect - classify one image as night or morning and print the metrics.

use anyhow::{Context, Result};
use clap::Parser;

use coop_door::{classify, DiagnosticReport, Frame};

#[derive(Parser, Debug)]
#[command(author, version, about = "Morning vs night detection for a single image")]
struct Args {
    /// Image to analyse.
    #[arg(default_value = "day1.jpg")]
    image: String,
    /// Brightness threshold, 0-255.
    #[arg(long, env = "COOP_BRIGHTNESS_THRESHOLD", default_value_t = 80.0)]
    threshold: f32,
    /// Emit the full diagnostic report (with histogram) as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let frame = Frame::open(&args.image)
        .with_context(|| format!("could not analyse {}", args.image))?;
    let result = classify(&frame, args.threshold);
    let report = DiagnosticReport::new(&frame, &result);

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("Image: {}", args.image);
        println!("{report}");
    }
    Ok(())
}
