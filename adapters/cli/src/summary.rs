//! End-of-match report printed by the CLI.

use std::{fmt, time::Duration};

use wave_defence_core::{Event, PlayerSnapshot, WaveSnapshot};
use wave_defence_simulation::Simulation;

/// Counts of notable events observed during a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct EventTally {
    pub(crate) spawned: u32,
    pub(crate) killed: u32,
    pub(crate) breached: u32,
    pub(crate) defeated: u32,
}

impl EventTally {
    pub(crate) fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut tally = Self::default();
        for event in events {
            let counter = match event {
                Event::EnemySpawned { .. } => &mut tally.spawned,
                Event::EnemyKilled { .. } => &mut tally.killed,
                Event::EnemyBreached { .. } => &mut tally.breached,
                Event::PlayerDefeated { .. } => &mut tally.defeated,
                _ => continue,
            };
            *counter = counter.saturating_add(1);
        }
        tally
    }
}

/// Snapshot of a finished match ready for display.
#[derive(Clone, Debug)]
pub(crate) struct MatchSummary {
    clock: Duration,
    wave: WaveSnapshot,
    live_enemies: usize,
    players: Vec<PlayerSnapshot>,
    tally: EventTally,
}

impl MatchSummary {
    pub(crate) fn new(simulation: &Simulation, tally: EventTally) -> Self {
        Self {
            clock: simulation.clock(),
            wave: simulation.wave(),
            live_enemies: simulation.enemies().len(),
            players: simulation.players(),
            tally,
        }
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "match ended after {:.1}s at wave {} (difficulty {:.2})",
            self.clock.as_secs_f32(),
            self.wave.number,
            self.wave.difficulty
        )?;
        writeln!(
            f,
            "enemies: {} spawned, {} killed, {} breached, {} still alive",
            self.tally.spawned, self.tally.killed, self.tally.breached, self.live_enemies
        )?;
        if self.tally.defeated > 0 {
            writeln!(f, "players defeated: {}", self.tally.defeated)?;
        }
        for player in &self.players {
            let status = if player.health == 0 { "defeated" } else { "standing" };
            writeln!(
                f,
                "player {}: {status}, health {}, coins {}, spent {}, earned {}, kills {}, towers {}, highest wave {}",
                player.id.get(),
                player.health,
                player.coins,
                player.total_spent,
                player.total_earned,
                player.kills,
                player.towers.len(),
                player.highest_wave
            )?;
        }
        Ok(())
    }
}
