//! Quadruped locomotion preview from the command line.
//!
//! Builds the demo quadruped, reduces its standing pose, previews a gait
//! schedule under a nominal forward-walking control and prints telemetry.
//! The full reduced trajectory can be dumped as JSON.
//!
//! Run: `cargo run -p stride-demos --bin quadruped_preview -- --gait trot`
//! Logging: `RUST_LOG=stride_preview=trace` for per-phase progress.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stride_core::config::PreviewConfig;
use stride_demos::{
    DemoError, GaitCommand, PreviewSummary, quadruped_engine, quadruped_model, run_preview,
    stand_config, standing_whole_body_state, trot_config,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Gait {
    Stand,
    Trot,
}

#[derive(Debug, Parser)]
#[command(about = "Preview quadruped locomotion over a gait schedule")]
struct Args {
    /// TOML engine config; overrides --gait and --cycles.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "trot")]
    gait: Gait,

    /// Number of gait cycles (trot only).
    #[arg(long, default_value_t = 2)]
    cycles: usize,

    /// Forward speed in m/s.
    #[arg(long, default_value_t = 0.3)]
    velocity: f64,

    /// Override the preview sample time in seconds.
    #[arg(long)]
    sample_time: Option<f64>,

    /// Write the reduced trajectory as JSON to this file.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), DemoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match (&args.config, args.gait) {
        (Some(path), _) => PreviewConfig::from_file(path)?,
        (None, Gait::Stand) => stand_config(0.5),
        (None, Gait::Trot) => trot_config(0.25, 0.05, args.cycles),
    };
    if let Some(sample_time) = args.sample_time {
        config.sample_time = sample_time;
    }

    let mut engine = quadruped_engine(&config)?;
    info!(
        phases = engine.number_of_phases(),
        sample_time = engine.sample_time(),
        "engine ready"
    );

    let full_state = standing_whole_body_state(&quadruped_model());
    let command = GaitCommand {
        forward_velocity: args.velocity,
        ..GaitCommand::default()
    };
    let run = run_preview(&mut engine, &full_state, command)?;

    match PreviewSummary::new(&run.initial, &run.trajectory) {
        Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
        None => println!("empty preview"),
    }

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string(&run.trajectory)?)?;
        info!(path = %path.display(), "trajectory written");
    }

    Ok(())
}
