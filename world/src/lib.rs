#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Wave Defence.
//!
//! The [`World`] owns every piece of mutable match state: the entity registry,
//! the per-player economy ledger, the wave state and the simulation clock.
//! It is mutated exclusively through [`apply`] and observed through the
//! [`query`] module.

use std::time::Duration;

use thiserror::Error;
use wave_defence_core::{Catalog, Command, Event, Path, Rules};

mod combat;
mod commands;
mod economy;
mod registry;
mod waves;

use economy::EconomyLedger;
use registry::EntityRegistry;
use waves::WaveState;

/// Reasons a match configuration is unusable.
///
/// These are only produced while constructing a [`World`]; a world that
/// exists always has a usable catalog and path.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The catalog defines no tower archetypes.
    #[error("catalog defines no tower archetypes")]
    NoTowerArchetypes,
    /// The catalog defines no enemy archetypes.
    #[error("catalog defines no enemy archetypes")]
    NoEnemyArchetypes,
    /// A tower archetype carries an unusable stat.
    #[error("tower archetype `{name}` has invalid {field}")]
    InvalidTowerArchetype {
        /// Name of the offending archetype.
        name: String,
        /// Stat that failed validation.
        field: &'static str,
    },
    /// An enemy archetype carries an unusable stat.
    #[error("enemy archetype `{name}` has invalid {field}")]
    InvalidEnemyArchetype {
        /// Name of the offending archetype.
        name: String,
        /// Stat that failed validation.
        field: &'static str,
    },
    /// The path cannot lead an enemy anywhere.
    #[error("path needs at least two waypoints, found {waypoints}")]
    PathTooShort {
        /// Number of waypoints supplied.
        waypoints: usize,
    },
    /// A waypoint has a non-finite coordinate.
    #[error("waypoint {index} is not a finite position")]
    InvalidWaypoint {
        /// Index of the offending waypoint.
        index: usize,
    },
    /// A rule value would stall or break the simulation.
    #[error("rule `{0}` is out of range")]
    InvalidRule(&'static str),
}

/// Represents the authoritative Wave Defence match state.
#[derive(Debug)]
pub struct World {
    catalog: Catalog,
    path: Path,
    rules: Rules,
    clock: Duration,
    registry: EntityRegistry,
    ledger: EconomyLedger,
    wave: WaveState,
}

impl World {
    /// Creates a new world for the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the catalog, the path or the rules
    /// cannot drive a simulation.
    pub fn new(catalog: Catalog, path: Path, rules: Rules) -> Result<Self, ConfigError> {
        validate(&catalog, &path, &rules)?;
        Ok(Self {
            catalog,
            path,
            rules,
            clock: Duration::ZERO,
            registry: EntityRegistry::new(),
            ledger: EconomyLedger::new(),
            wave: WaveState::new(),
        })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                now: world.clock,
            });
        }
        Command::SetupPlayer { player } => world.setup_player(player, out_events),
        Command::CleanupPlayer { player } => world.cleanup_player(player, out_events),
        Command::PlaceTower {
            player,
            archetype,
            position,
        } => world.place_tower(player, archetype, position, out_events),
        Command::UpgradeTower { player, tower } => world.upgrade_tower(player, tower, out_events),
        Command::RemoveTower { player, tower } => world.remove_tower(player, tower, out_events),
        Command::BeginWave { wave } => world.begin_wave(wave, out_events),
        Command::EndWave { wave } => world.end_wave(wave, out_events),
        Command::SpawnEnemy { archetype } => world.spawn_enemy(&archetype, out_events),
        Command::MoveEnemy {
            enemy,
            position,
            waypoint,
        } => world.move_enemy(enemy, position, waypoint, out_events),
        Command::BreachEnemy { enemy } => world.breach_enemy(enemy, out_events),
        Command::AttackEnemy { tower, enemy } => world.attack_enemy(tower, enemy, out_events),
    }
}

fn validate(catalog: &Catalog, path: &Path, rules: &Rules) -> Result<(), ConfigError> {
    if catalog.towers().next().is_none() {
        return Err(ConfigError::NoTowerArchetypes);
    }
    if catalog.enemies().next().is_none() {
        return Err(ConfigError::NoEnemyArchetypes);
    }

    for (name, tower) in catalog.towers() {
        let invalid = |field| ConfigError::InvalidTowerArchetype {
            name: name.to_owned(),
            field,
        };
        if !(tower.range.is_finite() && tower.range > 0.0) {
            return Err(invalid("range"));
        }
        if !(tower.damage.is_finite() && tower.damage > 0.0) {
            return Err(invalid("damage"));
        }
    }

    for (name, enemy) in catalog.enemies() {
        let invalid = |field| ConfigError::InvalidEnemyArchetype {
            name: name.to_owned(),
            field,
        };
        if !(enemy.health.is_finite() && enemy.health > 0.0) {
            return Err(invalid("health"));
        }
        if !(enemy.speed.is_finite() && enemy.speed > 0.0) {
            return Err(invalid("speed"));
        }
        if !(enemy.reward.is_finite() && enemy.reward >= 0.0) {
            return Err(invalid("reward"));
        }
    }

    if path.len() < 2 {
        return Err(ConfigError::PathTooShort {
            waypoints: path.len(),
        });
    }
    if let Some(index) = path
        .waypoints()
        .iter()
        .position(|waypoint| !waypoint.is_finite())
    {
        return Err(ConfigError::InvalidWaypoint { index });
    }

    if rules.max_level == 0 {
        return Err(ConfigError::InvalidRule("max_level"));
    }
    if rules.wave_delay.is_zero() {
        return Err(ConfigError::InvalidRule("wave_delay"));
    }
    if rules.enemies_per_wave == 0 {
        return Err(ConfigError::InvalidRule("enemies_per_wave"));
    }
    if !(rules.difficulty_increment.is_finite() && rules.difficulty_increment >= 0.0) {
        return Err(ConfigError::InvalidRule("difficulty_increment"));
    }
    if !(rules.arrival_threshold.is_finite() && rules.arrival_threshold > 0.0) {
        return Err(ConfigError::InvalidRule("arrival_threshold"));
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use wave_defence_core::{
        Catalog, EnemyView, Path, PlayerId, PlayerSnapshot, Rules, TowerId, TowerSnapshot,
        TowerView, WaveSnapshot,
    };

    /// Current simulation clock.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Provides read-only access to the archetype catalog.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Provides read-only access to the enemy path.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Provides read-only access to the match rules.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Captures the account of a single player.
    #[must_use]
    pub fn player(world: &World, player: PlayerId) -> Option<PlayerSnapshot> {
        world.ledger.account(player).map(|account| account.snapshot())
    }

    /// Captures every active player account in identifier order.
    #[must_use]
    pub fn players(world: &World) -> Vec<PlayerSnapshot> {
        world
            .ledger
            .accounts()
            .map(|account| account.snapshot())
            .collect()
    }

    /// Captures a single tower.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world.registry.tower(tower).map(|state| state.snapshot())
    }

    /// Captures a read-only view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.registry.towers().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .registry
                .live_enemies()
                .map(|enemy| enemy.snapshot())
                .collect(),
        )
    }

    /// Captures the wave sequencing state.
    #[must_use]
    pub fn wave(world: &World) -> WaveSnapshot {
        world.wave.snapshot()
    }
}
