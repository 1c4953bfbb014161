//! Immutable match configuration: archetypes, the enemy path and tuning rules.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;

use crate::Coins;

/// Base statistics shared by every tower built from the same archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerArchetype {
    /// Price debited from the owner when the tower is placed.
    pub cost: Coins,
    /// Euclidean targeting radius measured in world units.
    pub range: f32,
    /// Health removed from the target by a single attack.
    pub damage: f32,
    /// Minimum simulated time between two attacks.
    pub cooldown: Duration,
}

/// Base statistics for an enemy kind before difficulty scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyArchetype {
    /// Starting health.
    pub health: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Coins credited to the owner of the tower that lands the killing blow.
    pub reward: f32,
}

impl EnemyArchetype {
    /// Applies the difficulty multiplier: every stat becomes `base * (1 + difficulty)`.
    #[must_use]
    pub fn scaled(&self, difficulty: f32) -> Self {
        let factor = 1.0 + difficulty;
        Self {
            health: self.health * factor,
            speed: self.speed * factor,
            reward: self.reward * factor,
        }
    }
}

/// Named archetypes available to a match.
///
/// Archetypes are kept in name order so that iteration, and therefore any
/// seeded selection over them, is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    towers: BTreeMap<String, TowerArchetype>,
    enemies: BTreeMap<String, EnemyArchetype>,
}

impl Catalog {
    /// Creates a catalog from the provided archetype tables.
    #[must_use]
    pub fn new(
        towers: BTreeMap<String, TowerArchetype>,
        enemies: BTreeMap<String, EnemyArchetype>,
    ) -> Self {
        Self { towers, enemies }
    }

    /// Looks up a tower archetype by name.
    #[must_use]
    pub fn tower(&self, name: &str) -> Option<&TowerArchetype> {
        self.towers.get(name)
    }

    /// Looks up an enemy archetype by name.
    #[must_use]
    pub fn enemy(&self, name: &str) -> Option<&EnemyArchetype> {
        self.enemies.get(name)
    }

    /// Iterates tower archetypes in name order.
    pub fn towers(&self) -> impl Iterator<Item = (&str, &TowerArchetype)> {
        self.towers.iter().map(|(name, archetype)| (name.as_str(), archetype))
    }

    /// Iterates enemy archetypes in name order.
    pub fn enemies(&self) -> impl Iterator<Item = (&str, &EnemyArchetype)> {
        self.enemies
            .iter()
            .map(|(name, archetype)| (name.as_str(), archetype))
    }

    /// Names of the enemy archetypes in name order.
    #[must_use]
    pub fn enemy_names(&self) -> Vec<String> {
        self.enemies.keys().cloned().collect()
    }
}

/// Ordered sequence of waypoints that enemies follow from spawn to breach.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Creates a path visiting the provided waypoints in order.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Returns the waypoint at `index`, if the path is that long.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Number of waypoints on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Location where new enemies appear.
    #[must_use]
    pub fn start(&self) -> Option<Vec2> {
        self.waypoints.first().copied()
    }

    /// Total travel distance from the first to the last waypoint.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    /// Position reached after travelling `distance` along the path.
    ///
    /// Distances past the end clamp to the last waypoint.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> Option<Vec2> {
        let mut remaining = distance.max(0.0);
        for pair in self.waypoints.windows(2) {
            let segment = pair[0].distance(pair[1]);
            if remaining <= segment && segment > 0.0 {
                return Some(pair[0].lerp(pair[1], remaining / segment));
            }
            remaining -= segment;
        }
        self.waypoints.last().copied()
    }
}

/// Tuning constants that govern economy, upgrades, breaches and wave pacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rules {
    /// Balance granted to a player when they join.
    pub starting_coins: Coins,
    /// Shared team health granted to a player when they join.
    pub starting_health: u32,
    /// Health removed from every player when an enemy breaches.
    pub breach_penalty: u32,
    /// Highest level a tower can be upgraded to.
    pub max_level: u32,
    /// Upgrade price per current level; upgrading from level `n` costs `n` times this.
    pub upgrade_base_cost: Coins,
    /// Range added by each upgrade.
    pub range_per_level: f32,
    /// Damage added by each upgrade.
    pub damage_per_level: f32,
    /// Cooldown removed by each upgrade.
    pub cooldown_step: Duration,
    /// Cooldown never drops below this value through upgrades.
    pub cooldown_floor: Duration,
    /// Minimum simulated time between two placements by the same player.
    pub placement_cooldown: Duration,
    /// Difficulty added at the start of every wave.
    pub difficulty_increment: f32,
    /// Wave `n` spawns `n` times this many enemies.
    pub enemies_per_wave: u32,
    /// Simulated time between two spawns within a wave.
    pub spawn_interval: Duration,
    /// Simulated time spent idle between two waves.
    pub wave_delay: Duration,
    /// Distance below which an enemy counts as having reached its waypoint.
    pub arrival_threshold: f32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_coins: Coins::from_whole(100),
            starting_health: 100,
            breach_penalty: 10,
            max_level: 5,
            upgrade_base_cost: Coins::from_whole(50),
            range_per_level: 5.0,
            damage_per_level: 2.0,
            cooldown_step: Duration::from_millis(100),
            cooldown_floor: Duration::from_millis(500),
            placement_cooldown: Duration::from_secs(1),
            difficulty_increment: 0.05,
            enemies_per_wave: 3,
            spawn_interval: Duration::from_secs(1),
            wave_delay: Duration::from_secs(10),
            arrival_threshold: 0.5,
        }
    }
}

impl Rules {
    /// Number of enemies spawned by wave `wave`.
    #[must_use]
    pub const fn enemies_in_wave(&self, wave: u32) -> u32 {
        self.enemies_per_wave.saturating_mul(wave)
    }

    /// Price of upgrading a tower that currently sits at `level`.
    #[must_use]
    pub const fn upgrade_cost(&self, level: u32) -> Coins {
        self.upgrade_base_cost.saturating_mul(level)
    }

    /// Cooldown after one upgrade step, clamped to the floor.
    ///
    /// A cooldown already below the floor is left untouched so upgrades never
    /// make a tower slower.
    #[must_use]
    pub fn upgraded_cooldown(&self, cooldown: Duration) -> Duration {
        if cooldown <= self.cooldown_floor {
            return cooldown;
        }
        cooldown
            .saturating_sub(self.cooldown_step)
            .max(self.cooldown_floor)
    }
}
