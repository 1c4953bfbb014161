#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director responsible for sequencing waves and spawns.
//!
//! The director is a state machine suspended on the simulated clock. It waits
//! between waves, opens a wave with `Command::BeginWave`, emits one
//! `Command::SpawnEnemy` per spawn interval (the first immediately) and closes
//! the wave with `Command::EndWave` one interval after the last spawn.

use std::time::Duration;

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wave_defence_core::{Command, Event};

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    wave_delay: Duration,
    enemies_per_wave: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// Wave `n` spawns `enemies_per_wave * n` enemies.
    #[must_use]
    pub const fn new(
        spawn_interval: Duration,
        wave_delay: Duration,
        enemies_per_wave: u32,
        rng_seed: u64,
    ) -> Self {
        Self {
            spawn_interval,
            wave_delay,
            enemies_per_wave,
            rng_seed,
        }
    }

    fn enemies_in_wave(&self, wave: u32) -> u32 {
        self.enemies_per_wave.saturating_mul(wave)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Stopped,
    Idle {
        wait: Duration,
    },
    Spawning {
        wave: u32,
        remaining: u32,
        wait: Duration,
    },
}

/// Pure system that emits wave sequencing and spawn commands.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    phase: Phase,
    next_wave: u32,
    rng: ChaCha8Rng,
}

impl WaveDirector {
    /// Creates a stopped wave director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Stopped,
            next_wave: 1,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Starts sequencing waves after `current_wave`.
    ///
    /// The next wave begins on the following call to [`WaveDirector::handle`],
    /// even if no time elapsed. Returns `false` without side effects when the
    /// director is already running.
    pub fn start(&mut self, current_wave: u32) -> bool {
        if self.is_running() {
            return false;
        }

        self.next_wave = current_wave.saturating_add(1);
        self.phase = Phase::Idle {
            wait: Duration::ZERO,
        };
        true
    }

    /// Stops the director, cancelling pending spawns and timers.
    ///
    /// A wave that is still spawning is closed with `Command::EndWave`.
    pub fn stop(&mut self, out: &mut Vec<Command>) {
        if let Phase::Spawning { wave, .. } = self.phase {
            out.push(Command::EndWave { wave });
        }
        self.phase = Phase::Stopped;
    }

    /// Reports whether the director is sequencing waves.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase != Phase::Stopped
    }

    /// Number of the wave the director will open next.
    #[must_use]
    pub fn next_wave(&self) -> u32 {
        self.next_wave
    }

    /// Consumes clock events and emits the commands that fall due.
    ///
    /// Enemy archetypes are drawn from `enemy_names` with the seeded
    /// generator, so identical inputs always produce identical commands.
    pub fn handle(&mut self, events: &[Event], enemy_names: &[String], out: &mut Vec<Command>) {
        let mut budget = elapsed_time(events);

        loop {
            match self.phase {
                Phase::Stopped => return,
                Phase::Idle { wait } => {
                    if wait > budget {
                        self.phase = Phase::Idle {
                            wait: wait - budget,
                        };
                        return;
                    }
                    budget -= wait;

                    let wave = self.next_wave;
                    self.next_wave = wave.saturating_add(1);
                    out.push(Command::BeginWave { wave });
                    self.phase = Phase::Spawning {
                        wave,
                        remaining: self.config.enemies_in_wave(wave),
                        wait: Duration::ZERO,
                    };
                }
                Phase::Spawning {
                    wave,
                    remaining,
                    wait,
                } => {
                    if wait > budget {
                        self.phase = Phase::Spawning {
                            wave,
                            remaining,
                            wait: wait - budget,
                        };
                        return;
                    }
                    budget -= wait;

                    if remaining == 0 {
                        out.push(Command::EndWave { wave });
                        self.phase = Phase::Idle {
                            wait: self.config.wave_delay,
                        };
                        // A cycle that consumes no time would never yield.
                        if self.config.wave_delay.is_zero()
                            && self.config.spawn_interval.is_zero()
                        {
                            return;
                        }
                        continue;
                    }

                    if let Some(archetype) = enemy_names.choose(&mut self.rng) {
                        out.push(Command::SpawnEnemy {
                            archetype: archetype.clone(),
                        });
                    }
                    self.phase = Phase::Spawning {
                        wave,
                        remaining: remaining - 1,
                        wait: self.config.spawn_interval,
                    };
                }
            }
        }
    }
}

fn elapsed_time(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt, .. } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}
