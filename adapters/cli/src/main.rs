#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Wave Defence match.

mod summary;

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use glam::Vec2;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wave_defence_core::PlayerId;
use wave_defence_simulation::{MatchConfig, Simulation, SimulationHost};

use crate::summary::{EventTally, MatchSummary};

/// Distance between a tower and the path segment it guards.
const TOWER_OFFSET: f32 = 4.0;

/// Runs a Wave Defence match without a renderer and prints the outcome.
#[derive(Debug, Parser)]
#[command(name = "wave-defence", version, about)]
struct Args {
    /// TOML match configuration; the built-in match is used when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of players joining the match.
    #[arg(long, value_name = "N", default_value_t = 2)]
    players: u64,
    /// Simulated match length in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    duration: u64,
    /// Tick length in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 50)]
    tick_ms: u64,
    /// Drive the match through the threaded host in real time instead of
    /// fast-forwarding.
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be greater than zero");

    let config = match &args.config {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("failed to load match configuration {}", path.display()))?,
        None => MatchConfig::default(),
    };
    let mut simulation =
        Simulation::new(&config).context("match configuration cannot drive a simulation")?;

    let (sender, receiver) = crossbeam_channel::unbounded();
    simulation.subscribe(sender);

    let players: Vec<PlayerId> = (1..=args.players).map(PlayerId::new).collect();
    for &player in &players {
        simulation.setup_player(player);
    }
    place_towers(&mut simulation, &players);

    let duration = Duration::from_secs(args.duration);
    let tick = Duration::from_millis(args.tick_ms);
    let simulation = if args.realtime {
        run_realtime(simulation, duration, tick)?
    } else {
        run_headless(simulation, duration, tick)
    };

    let tally = EventTally::from_events(receiver.try_iter());
    print!("{}", MatchSummary::new(&simulation, tally));
    Ok(())
}

/// Gives every player one tower beside an evenly spaced point on the path,
/// cycling through the catalog's archetypes.
fn place_towers(simulation: &mut Simulation, players: &[PlayerId]) {
    let archetypes: Vec<String> = simulation
        .catalog()
        .towers()
        .map(|(name, _)| name.to_owned())
        .collect();
    if archetypes.is_empty() {
        return;
    }
    let length = simulation.path().length();
    let slots = players.len() as f32 + 1.0;

    for (index, &player) in players.iter().enumerate() {
        let archetype = &archetypes[index % archetypes.len()];
        let Some(anchor) = simulation
            .path()
            .point_at(length * (index as f32 + 1.0) / slots)
        else {
            return;
        };
        let position = anchor + Vec2::new(0.0, TOWER_OFFSET);

        if simulation.place_tower(player, archetype, position) {
            info!(
                player = player.get(),
                archetype = %archetype,
                x = position.x,
                y = position.y,
                "tower placed"
            );
        } else {
            warn!(player = player.get(), archetype = %archetype, "tower placement rejected");
        }
    }
}

fn run_headless(mut simulation: Simulation, duration: Duration, tick: Duration) -> Simulation {
    let _ = simulation.start_waves();
    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        let dt = tick.min(duration - elapsed);
        simulation.tick(dt);
        elapsed += dt;
    }
    simulation.stop_waves();
    simulation
}

fn run_realtime(simulation: Simulation, duration: Duration, tick: Duration) -> Result<Simulation> {
    let host = SimulationHost::spawn(simulation, tick).context("failed to start simulation host")?;
    let _ = host.start_waves().context("simulation host stopped early")?;
    info!(seconds = duration.as_secs(), "match running in real time");
    thread::sleep(duration);
    host.shutdown().context("simulation host failed during shutdown")
}
