use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use host::{load_settings, Driver, RunState, Simulation};
use sim_core::SimStats;
use types::{PaletteMode, Settings};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Headless runner for the Living Numbers simulation.
#[derive(Debug, Parser)]
#[command(name = "living-numbers", version, about)]
struct Cli {
    /// Settings JSON; missing fields use defaults.
    #[arg(long, env = "LIVING_NUMBERS_SETTINGS")]
    settings: Option<PathBuf>,

    /// Stop after this many generations.
    #[arg(long, default_value_t = 500)]
    generations: u64,

    /// RNG seed, overrides the settings file.
    #[arg(long)]
    seed: Option<u64>,

    /// Palette mode (Original, Rainbow, Ocean, Fire), overrides the settings file.
    #[arg(long, value_parser = parse_palette)]
    palette: Option<PaletteMode>,

    /// Print every generation's stats as one JSON line.
    #[arg(long)]
    json: bool,
}

fn parse_palette(name: &str) -> Result<PaletteMode, String> {
    PaletteMode::from_name(name).ok_or_else(|| {
        let known: Vec<_> = PaletteMode::ALL.iter().map(|m| m.name()).collect();
        format!("unknown palette '{name}', expected one of {}", known.join(", "))
    })
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    if cli.seed.is_some() {
        settings.rng_seed = cli.seed;
    }
    if let Some(mode) = cli.palette {
        settings.palette_mode = mode;
    }

    let sim = Simulation::new(settings).context("building simulation")?;
    let mut driver = Driver::spawn(sim).context("spawning simulation worker")?;
    let stats_rx = driver.take_stats().context("stats stream already taken")?;
    let handle = driver.handle();
    handle.start()?;
    info!(generations = cli.generations, "running headless");

    let mut seen_generation = false;
    loop {
        match stats_rx.recv_timeout(POLL_INTERVAL) {
            Ok(stats) => {
                seen_generation = true;
                report(&stats, cli.json)?;
                if stats.generation >= cli.generations {
                    handle.stop()?;
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        match handle.latest_frame().map(|frame| frame.state) {
            Some(RunState::Completed) => {
                // The filling generation may still be queued.
                for stats in stats_rx.try_iter() {
                    report(&stats, cli.json)?;
                }
                break;
            }
            Some(RunState::Idle) if seen_generation => {
                warn!("simulation stopped unexpectedly");
                break;
            }
            _ => {}
        }
    }

    let sim = driver.shutdown().context("simulation worker panicked")?;
    println!("{}", sim.status());
    println!("{}", host::stats_summary(sim.stats()));
    for (label, color) in sim.palette().legend() {
        println!("{label}: #{:02x}{:02x}{:02x}", color.r, color.g, color.b);
    }
    for event in sim.events().recent(3) {
        println!("{event}");
    }
    Ok(())
}

fn report(stats: &SimStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(stats)?);
    } else {
        info!(
            generation = stats.generation,
            population = stats.population,
            density = stats.density,
            avg_age = stats.avg_age,
            entropy = stats.entropy,
            "generation"
        );
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
