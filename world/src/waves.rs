//! Wave sequencing state and enemy spawning.

use tracing::{debug, info, warn};
use wave_defence_core::{Event, WaveError, WaveSnapshot};

use crate::World;

/// Wave number, in-progress flag and difficulty multiplier.
///
/// Only `BeginWave` and `EndWave` commands mutate this state, and only the
/// wave director issues those.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WaveState {
    number: u32,
    in_progress: bool,
    difficulty: f32,
    spawned: u32,
}

impl WaveState {
    pub(crate) const fn new() -> Self {
        Self {
            number: 0,
            in_progress: false,
            difficulty: 0.0,
            spawned: 0,
        }
    }

    pub(crate) fn snapshot(&self) -> WaveSnapshot {
        WaveSnapshot {
            number: self.number,
            in_progress: self.in_progress,
            difficulty: self.difficulty,
            spawned: self.spawned,
        }
    }
}

impl World {
    pub(crate) fn begin_wave(&mut self, wave: u32, out_events: &mut Vec<Event>) {
        let rejection = if self.wave.in_progress {
            Some(WaveError::AlreadyInProgress)
        } else if Some(wave) != self.wave.number.checked_add(1) {
            Some(WaveError::OutOfSequence)
        } else {
            None
        };
        if let Some(reason) = rejection {
            debug!(wave, ?reason, "wave start rejected");
            out_events.push(Event::WaveStartRejected { wave, reason });
            return;
        }

        self.wave.number = wave;
        self.wave.in_progress = true;
        self.wave.spawned = 0;
        self.wave.difficulty += self.rules.difficulty_increment;

        for account in self.ledger.accounts_mut() {
            account.highest_wave = account.highest_wave.max(wave);
        }

        let enemy_count = self.rules.enemies_in_wave(wave);
        info!(
            wave,
            difficulty = self.wave.difficulty,
            enemy_count,
            "wave started"
        );
        out_events.push(Event::WaveStarted {
            wave,
            difficulty: self.wave.difficulty,
            enemy_count,
        });
    }

    pub(crate) fn end_wave(&mut self, wave: u32, out_events: &mut Vec<Event>) {
        if !self.wave.in_progress || self.wave.number != wave {
            return;
        }
        self.wave.in_progress = false;
        info!(wave, spawned = self.wave.spawned, "wave ended");
        out_events.push(Event::WaveEnded { wave });
    }

    pub(crate) fn spawn_enemy(&mut self, archetype: &str, out_events: &mut Vec<Event>) {
        let Some(base) = self.catalog.enemy(archetype) else {
            warn!(archetype, "spawn requested for unknown enemy archetype");
            return;
        };
        let Some(start) = self.path.start() else {
            return;
        };

        let stats = base.scaled(self.wave.difficulty);
        let enemy = self.registry.add_enemy(archetype, stats, start);
        if self.wave.in_progress {
            self.wave.spawned = self.wave.spawned.saturating_add(1);
        }
        debug!(enemy = enemy.get(), archetype, health = stats.health, "enemy spawned");
        out_events.push(Event::EnemySpawned {
            enemy,
            archetype: archetype.to_owned(),
            health: stats.health,
        });
    }
}
