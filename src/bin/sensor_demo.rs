//! sensor_demo - run every sensor algorithm over the same synthetic frames
//!
//! Prints the last detection record of each algorithm and a digest of its
//! last output frame, so two runs (or two builds) can be compared.

use anyhow::{anyhow, Result};
use clap::Parser;

use sensor_kernel::{frame_digest, AlgorithmId, Dispatcher, FrameGeometry, InArgs, OutArgs, SyntheticSource};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Frames per algorithm.
    #[arg(long, default_value_t = 8)]
    frames: u64,
    #[arg(long, default_value_t = 320)]
    width: usize,
    #[arg(long, default_value_t = 240)]
    height: usize,
    /// Seed for the synthetic source.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Only run this algorithm (motion, edge-line, object, line, mxn).
    #[arg(long)]
    algorithm: Option<AlgorithmId>,
    /// Derive the object colour window from the frame centre.
    #[arg(long)]
    auto_hsv: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if args.frames == 0 {
        return Err(anyhow!("frames must be >= 1"));
    }

    let geometry = FrameGeometry::new(args.width, args.height);
    let in_args = InArgs {
        auto_detect_hsv: args.auto_hsv,
        ..InArgs::default()
    };
    let selected: Vec<AlgorithmId> = match args.algorithm {
        Some(id) => vec![id],
        None => AlgorithmId::ALL.to_vec(),
    };

    let mut dispatcher = Dispatcher::new(geometry);
    let mut input = vec![0u8; geometry.input_len()];
    let mut output = vec![0u8; geometry.output_len()];

    for id in selected {
        stage(&format!("{} ({} frames)", id, args.frames));
        if let Err(e) = dispatcher.init(id) {
            println!("{:<10} skipped: {}", id.name(), e);
            continue;
        }

        let mut source = SyntheticSource::new(geometry, args.seed);
        let mut out_args = OutArgs::default();
        for _ in 0..args.frames {
            source.fill_next(&mut input)?;
            dispatcher.run(id, &input, &mut output, &in_args, &mut out_args)?;
        }

        println!(
            "{:<10} x={:>4} y={:>4} mass={:>3}% cross={} digest={}",
            id.name(),
            out_args.target_x,
            out_args.target_y,
            out_args.target_mass,
            out_args.cross_detected,
            frame_digest(&output)
        );
        if id == AlgorithmId::Object && in_args.auto_detect_hsv {
            println!(
                "{:<10} hsv window h={}..{} s={}..{} v={}..{}",
                "",
                out_args.detected_hue_from,
                out_args.detected_hue_to,
                out_args.detected_sat_from,
                out_args.detected_sat_to,
                out_args.detected_val_from,
                out_args.detected_val_to
            );
        }
        if id == AlgorithmId::Mxn {
            let cells = (in_args.mxn_cols as usize) * (in_args.mxn_rows as usize);
            let colours: Vec<String> = out_args.mxn_colors[..cells]
                .iter()
                .map(|c| format!("{:06x}", c))
                .collect();
            println!("{:<10} cells {}", "", colours.join(" "));
        }
    }
    Ok(())
}

fn stage(msg: &str) {
    eprintln!("sensor_demo: {}", msg);
}
