use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tools::{Scenario, load_config, replay};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replays viewport application-state scenarios headlessly")]
struct Args {
    /// Scenario JSON: { "viewport": [w, h], "steps": [{ "state", "actions", "frames" }] }
    #[arg(long)]
    scenario: PathBuf,

    /// Viewport configuration JSON (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let scenario = Scenario::load(&args.scenario)?;
    info!(steps = scenario.steps.len(), fps = args.fps, "replaying scenario");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = replay(&scenario, config, args.fps, &mut out)?;
    out.flush()?;
    info!(frames = summary.frames, "replay finished");
    Ok(())
}
