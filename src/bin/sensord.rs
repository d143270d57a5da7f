//! sensord - sensor loop daemon
//!
//! This daemon:
//! 1. Loads `SensorConfig` (SENSOR_CONFIG file + environment overrides)
//! 2. Sets up the configured sensor algorithm
//! 3. Feeds synthetic frames at the configured rate until Ctrl-C or `--frames`
//! 4. Logs detection results

use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use sensor_kernel::config::SensorConfig;
use sensor_kernel::{Dispatcher, OutArgs, SyntheticSource};

/// Results are logged at info once per this many frames.
const REPORT_EVERY: u64 = 30;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Stop after this many frames (runs until Ctrl-C when omitted).
    #[arg(long)]
    frames: Option<u64>,
    /// Seed for the synthetic source.
    #[arg(long, env = "SENSOR_SEED", default_value_t = 1)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = SensorConfig::load()?;
    let geometry = config.geometry;
    log::info!(
        "sensord starting: {} at {}x{}, {} fps",
        config.algorithm,
        geometry.width,
        geometry.height,
        config.target_fps
    );

    let mut dispatcher = Dispatcher::new(geometry);
    dispatcher
        .init(config.algorithm)
        .map_err(|e| anyhow!("cannot start {}: {}", config.algorithm, e))?;

    let mut source = SyntheticSource::new(geometry, args.seed);
    let mut input = vec![0u8; geometry.input_len()];
    let mut output = vec![0u8; geometry.output_len()];
    let mut out_args = OutArgs::default();

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let frame_interval = Duration::from_secs(1) / config.target_fps;
    let mut frames = 0u64;
    let started = Instant::now();
    loop {
        if rx.try_recv().is_ok() {
            log::info!("shutdown signal received");
            break;
        }
        if args.frames.is_some_and(|limit| frames >= limit) {
            break;
        }

        let tick = Instant::now();
        source.fill_next(&mut input)?;
        dispatcher.run(config.algorithm, &input, &mut output, &config.args, &mut out_args)?;
        frames += 1;

        if frames % REPORT_EVERY == 0 {
            log::info!(
                "frame {}: target ({}, {}) mass {}%{}",
                frames,
                out_args.target_x,
                out_args.target_y,
                out_args.target_mass,
                if out_args.cross_detected { " cross" } else { "" }
            );
        }

        if let Some(rest) = frame_interval.checked_sub(tick.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    log::info!(
        "sensord stopped after {} frames ({:.1} fps)",
        frames,
        if elapsed > 0.0 { frames as f64 / elapsed } else { 0.0 }
    );
    Ok(())
}
