use anyhow::{Context, Result};
use clap::Parser;
use ledgerguard_sim::{Simulation, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Anti-gaming simulation: honest and sybil nodes trading through the
/// trust walk and the greylisting broadcast protocol.
#[derive(Parser, Debug)]
#[command(name = "ledgerguard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (TOML, YAML or JSON). LEDGERGUARD_* env vars override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of honest nodes
    #[arg(long)]
    honest: Option<usize>,

    /// Number of sybil nodes
    #[arg(long)]
    sybils: Option<usize>,

    /// Number of interaction rounds
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Fix the random seed. Runs are otherwise not reproducible.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = SimulationConfig::load(cli.config.as_deref())
        .context("failed to load simulation config")?;
    if let Some(honest) = cli.honest {
        config.honest_nodes = honest;
    }
    if let Some(sybils) = cli.sybils {
        config.sybil_nodes = sybils;
    }
    if let Some(rounds) = cli.rounds {
        config.rounds = rounds;
    }

    info!(
        honest = config.honest_nodes,
        sybils = config.sybil_nodes,
        rounds = config.rounds,
        seed = ?cli.seed,
        "Starting simulation"
    );

    let started = Instant::now();
    let report = match cli.seed {
        Some(seed) => Simulation::with_rng(config, StdRng::seed_from_u64(seed))?.run()?,
        None => Simulation::new(config)?.run()?,
    };
    let elapsed = started.elapsed();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
        println!("Simulation completed in {:.2} seconds", elapsed.as_secs_f64());
    }

    Ok(())
}
