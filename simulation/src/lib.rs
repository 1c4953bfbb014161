#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match orchestration for Wave Defence.
//!
//! [`Simulation`] owns a [`World`] together with the pure systems and runs
//! them in a fixed order on every tick: movement first, then targeting and
//! combat against the post-movement state, then the wave director. Every
//! event produced along the way is delivered to the registered observers.
//! [`SimulationHost`] moves a simulation onto its own thread and serializes
//! access from any number of callers.

use std::time::Duration;

use glam::Vec2;
use tracing::{debug, info};
use wave_defence_core::{
    Catalog, Command, EnemySnapshot, Event, Path, PlayerId, PlayerSnapshot, TowerId,
    TowerSnapshot, TowerTarget, WaveSnapshot,
};
use wave_defence_system_movement::Movement;
use wave_defence_system_tower_combat::TowerCombat;
use wave_defence_system_tower_targeting::TowerTargeting;
use wave_defence_system_wave_director::{Config as DirectorConfig, WaveDirector};
use wave_defence_world::{self as world, query, World};

mod config;
mod host;
mod observer;

pub use config::{EnemyConfig, MatchConfig, MatchConfigError, RulesConfig, TowerConfig};
pub use host::{HostError, SimulationHost};
pub use observer::{EventLog, EventObserver};

/// A single match: the world, its systems and its observers.
pub struct Simulation {
    world: World,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    director: WaveDirector,
    enemy_names: Vec<String>,
    observers: Vec<Box<dyn EventObserver>>,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("director", &self.director)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a match from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MatchConfigError::Invalid`] when the catalog, path or rules
    /// cannot drive a match.
    pub fn new(config: &MatchConfig) -> Result<Self, MatchConfigError> {
        let catalog = config.catalog()?;
        let rules = config.rules();
        let world = World::new(catalog, config.path(), rules)?;

        let enemy_names = query::catalog(&world).enemy_names();
        info!(
            towers = query::catalog(&world).towers().count(),
            enemies = enemy_names.len(),
            waypoints = query::path(&world).len(),
            seed = config.seed,
            "match configured"
        );

        Ok(Self {
            movement: Movement::new(rules.arrival_threshold),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            director: WaveDirector::new(DirectorConfig::new(
                rules.spawn_interval,
                rules.wave_delay,
                rules.enemies_per_wave,
                config.seed,
            )),
            enemy_names,
            observers: Vec::new(),
            targets: Vec::new(),
            commands: Vec::new(),
            world,
        })
    }

    /// Registers an observer that receives every subsequent event.
    pub fn subscribe(&mut self, observer: impl EventObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Opens an account for `player`. Repeated setups are ignored.
    pub fn setup_player(&mut self, player: PlayerId) {
        let _ = self.execute(Command::SetupPlayer { player });
    }

    /// Removes `player`, their account and every tower they own.
    pub fn cleanup_player(&mut self, player: PlayerId) {
        let _ = self.execute(Command::CleanupPlayer { player });
    }

    /// Places a tower for `player`, reporting whether it was built.
    pub fn place_tower(&mut self, player: PlayerId, archetype: &str, position: Vec2) -> bool {
        self.execute(Command::PlaceTower {
            player,
            archetype: archetype.to_owned(),
            position,
        })
        .iter()
        .any(|event| matches!(event, Event::TowerPlaced { .. }))
    }

    /// Upgrades `tower` on behalf of `player`, reporting whether it succeeded.
    pub fn upgrade_tower(&mut self, player: PlayerId, tower: TowerId) -> bool {
        self.execute(Command::UpgradeTower { player, tower })
            .iter()
            .any(|event| matches!(event, Event::TowerUpgraded { .. }))
    }

    /// Removes `tower` on behalf of `player`, reporting whether it succeeded.
    pub fn remove_tower(&mut self, player: PlayerId, tower: TowerId) -> bool {
        self.execute(Command::RemoveTower { player, tower })
            .iter()
            .any(|event| matches!(event, Event::TowerRemoved { .. }))
    }

    /// Starts the wave director. The first wave begins immediately.
    ///
    /// Returns `false` when waves are already running.
    pub fn start_waves(&mut self) -> bool {
        if !self.director.start(query::wave(&self.world).number) {
            debug!("wave director already running");
            return false;
        }
        info!(next_wave = self.director.next_wave(), "wave director started");

        let mut events = Vec::new();
        self.director.handle(&[], &self.enemy_names, &mut self.commands);
        self.apply_pending(&mut events);
        self.publish(&events);
        true
    }

    /// Stops the wave director, closing any wave that is still spawning.
    pub fn stop_waves(&mut self) {
        if !self.director.is_running() {
            return;
        }
        self.director.stop(&mut self.commands);
        info!("wave director stopped");

        let mut events = Vec::new();
        self.apply_pending(&mut events);
        self.publish(&events);
    }

    /// Advances the match by `dt` of simulated time.
    pub fn tick(&mut self, dt: Duration) {
        let mut clock_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut clock_events);
        let mut events = clock_events.clone();

        self.movement.handle(
            &clock_events,
            &query::enemy_view(&self.world),
            query::path(&self.world),
            &mut self.commands,
        );
        self.apply_pending(&mut events);

        let now = query::clock(&self.world);
        let towers = query::tower_view(&self.world);
        self.targeting.handle(
            now,
            &towers,
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        self.combat
            .handle(now, &towers, &self.targets, &mut self.commands);
        self.apply_pending(&mut events);

        self.director
            .handle(&clock_events, &self.enemy_names, &mut self.commands);
        self.apply_pending(&mut events);

        self.publish(&events);
    }

    /// Captures the state of `player`, if they are in the match.
    #[must_use]
    pub fn player_data(&self, player: PlayerId) -> Option<PlayerSnapshot> {
        query::player(&self.world, player)
    }

    /// Captures every player in identifier order.
    #[must_use]
    pub fn players(&self) -> Vec<PlayerSnapshot> {
        query::players(&self.world)
    }

    /// Captures every live enemy in registration order.
    #[must_use]
    pub fn enemies(&self) -> Vec<EnemySnapshot> {
        query::enemy_view(&self.world).into_vec()
    }

    /// Captures every tower in registration order.
    #[must_use]
    pub fn towers(&self) -> Vec<TowerSnapshot> {
        query::tower_view(&self.world).into_vec()
    }

    /// Captures the wave sequencing state.
    #[must_use]
    pub fn wave(&self) -> WaveSnapshot {
        query::wave(&self.world)
    }

    /// Reports whether the wave director is running.
    #[must_use]
    pub fn waves_running(&self) -> bool {
        self.director.is_running()
    }

    /// Simulated time elapsed since the match began.
    #[must_use]
    pub fn clock(&self) -> Duration {
        query::clock(&self.world)
    }

    /// Archetypes available in this match.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        query::catalog(&self.world)
    }

    /// Path enemies follow in this match.
    #[must_use]
    pub fn path(&self) -> &Path {
        query::path(&self.world)
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.publish(&events);
        events
    }

    fn apply_pending(&mut self, events: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }

    fn publish(&mut self, events: &[Event]) {
        for observer in &mut self.observers {
            for event in events {
                observer.on_event(event);
            }
        }
    }
}
