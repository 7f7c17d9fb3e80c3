//! Grid ABM runner
//!
//! Runs one of the bundled models and prints its end-of-run report, or the
//! full history as JSON.

use abm_core::setup::summarize;
use abm_core::{SimConfig, Simulation};
use clap::{Parser, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Ticks between progress log lines
const PROGRESS_INTERVAL: u64 = 20;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    Epidemic,
    Wealth,
}

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "abm_sim")]
#[command(about = "Grid-based agent simulation: SIR epidemic or wealth exchange")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in preset, used when no config file is given
    #[arg(long, value_enum, default_value_t = Model::Epidemic)]
    model: Model,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Record a grid frame every tick (included in JSON output)
    #[arg(long)]
    frames: bool,

    /// Print history and summary as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn resolve_config(args: &Args) -> Result<SimConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => match args.model {
            Model::Epidemic => SimConfig::epidemic(),
            Model::Wealth => SimConfig::wealth(),
        },
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
    config.simulation.record_frames |= args.frames;
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&args)?;
    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut sim = Simulation::from_config(&config)?;
    let ticks = config.simulation.ticks;
    // records snapshot 0 even when no ticks follow
    sim.run(0)?;
    for _ in 0..ticks {
        sim.step()?;
        let tick = sim.tick();
        if tick % PROGRESS_INTERVAL == 0 {
            info!(tick, of = ticks, "progress");
        }
    }
    let summary = summarize(&mut sim, &config.model)?;
    if args.json {
        let output = serde_json::json!({
            "config": config,
            "summary": summary,
            "history": sim.history(),
            "frames": sim.frames(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
