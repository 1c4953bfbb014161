//! TOML match configuration.
//!
//! Every field is optional; anything omitted falls back to the built-in
//! match. Supplying a `[towers]` or `[enemies]` table replaces the built-in
//! archetypes of that kind entirely.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path as FsPath, PathBuf},
    time::Duration,
};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wave_defence_core::{Catalog, Coins, EnemyArchetype, Path, Rules, TowerArchetype};
use wave_defence_world::ConfigError;

/// Errors raised while loading a [`MatchConfig`].
#[derive(Debug, Error)]
pub enum MatchConfigError {
    /// The configuration file could not be read.
    #[error("failed to read match configuration at {}", path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse match configuration")]
    Parse(#[from] toml::de::Error),
    /// The configuration parsed but cannot drive a match.
    #[error("invalid match configuration")]
    Invalid(#[from] ConfigError),
}

/// Complete description of a match: rules, archetypes, path and seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Seed for the wave director's archetype selection.
    pub seed: u64,
    /// Tunable match rules.
    pub rules: RulesConfig,
    /// Waypoints enemies follow, as `[x, y]` pairs.
    pub path: Vec<[f32; 2]>,
    /// Tower archetypes keyed by name.
    pub towers: BTreeMap<String, TowerConfig>,
    /// Enemy archetypes keyed by name.
    pub enemies: BTreeMap<String, EnemyConfig>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        let towers = [
            ("Basic", TowerConfig::new(25.0, 20.0, 5.0, 1_000)),
            ("Rapid", TowerConfig::new(40.0, 15.0, 2.0, 250)),
            ("Sniper", TowerConfig::new(60.0, 45.0, 18.0, 3_000)),
        ];
        let enemies = [
            ("Brute", EnemyConfig::new(60.0, 2.0, 25.0)),
            ("Grunt", EnemyConfig::new(20.0, 4.0, 10.0)),
            ("Runner", EnemyConfig::new(10.0, 8.0, 8.0)),
        ];

        Self {
            seed: 0x5741_5645,
            rules: RulesConfig::default(),
            path: vec![[0.0, 0.0], [60.0, 0.0], [60.0, 40.0], [100.0, 40.0]],
            towers: towers
                .into_iter()
                .map(|(name, tower)| (name.to_owned(), tower))
                .collect(),
            enemies: enemies
                .into_iter()
                .map(|(name, enemy)| (name.to_owned(), enemy))
                .collect(),
        }
    }
}

impl MatchConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`MatchConfigError::Parse`] when the text does not match the
    /// schema.
    pub fn from_toml_str(contents: &str) -> Result<Self, MatchConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchConfigError::Io`] when the file cannot be read and
    /// [`MatchConfigError::Parse`] when its contents are malformed.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, MatchConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| MatchConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Builds the archetype catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a tower cost is negative or not finite.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        let mut towers = BTreeMap::new();
        for (name, tower) in &self.towers {
            if !(tower.cost.is_finite() && tower.cost >= 0.0) {
                return Err(ConfigError::InvalidTowerArchetype {
                    name: name.clone(),
                    field: "cost",
                });
            }
            let _ = towers.insert(name.clone(), tower.archetype());
        }

        let enemies = self
            .enemies
            .iter()
            .map(|(name, enemy)| (name.clone(), enemy.archetype()))
            .collect();

        Ok(Catalog::new(towers, enemies))
    }

    /// Builds the enemy path.
    #[must_use]
    pub fn path(&self) -> Path {
        Path::new(
            self.path
                .iter()
                .map(|&[x, y]| Vec2::new(x, y))
                .collect(),
        )
    }

    /// Builds the match rules.
    #[must_use]
    pub fn rules(&self) -> Rules {
        self.rules.to_rules()
    }
}

/// Tower archetype as written in the configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TowerConfig {
    /// Placement cost in coins.
    pub cost: f32,
    /// Base targeting radius.
    pub range: f32,
    /// Base damage per attack.
    pub damage: f32,
    /// Base minimum time between attacks, in milliseconds.
    pub cooldown_ms: u64,
}

impl TowerConfig {
    const fn new(cost: f32, range: f32, damage: f32, cooldown_ms: u64) -> Self {
        Self {
            cost,
            range,
            damage,
            cooldown_ms,
        }
    }

    fn archetype(&self) -> TowerArchetype {
        TowerArchetype {
            cost: Coins::from_f32(self.cost),
            range: self.range,
            damage: self.damage,
            cooldown: Duration::from_millis(self.cooldown_ms),
        }
    }
}

/// Enemy archetype as written in the configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyConfig {
    /// Base health.
    pub health: f32,
    /// Base speed in world units per second.
    pub speed: f32,
    /// Base kill reward in coins.
    pub reward: f32,
}

impl EnemyConfig {
    const fn new(health: f32, speed: f32, reward: f32) -> Self {
        Self {
            health,
            speed,
            reward,
        }
    }

    fn archetype(&self) -> EnemyArchetype {
        EnemyArchetype {
            health: self.health,
            speed: self.speed,
            reward: self.reward,
        }
    }
}

/// Match rules as written in the configuration file.
///
/// Coin amounts are whole coins and durations are milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Coins granted to each player on setup.
    pub starting_coins: u64,
    /// Health granted to each player on setup.
    pub starting_health: u32,
    /// Health every player loses when an enemy breaches.
    pub breach_penalty: u32,
    /// Highest level a tower can be upgraded to.
    pub max_level: u32,
    /// Upgrade cost per current level.
    pub upgrade_base_cost: u64,
    /// Range gained per upgrade.
    pub range_per_level: f32,
    /// Damage gained per upgrade.
    pub damage_per_level: f32,
    /// Cooldown removed per upgrade.
    pub cooldown_step_ms: u64,
    /// Cooldown an upgrade never reduces below.
    pub cooldown_floor_ms: u64,
    /// Minimum time between two placements by the same player.
    pub placement_cooldown_ms: u64,
    /// Difficulty added at each wave start.
    pub difficulty_increment: f32,
    /// Wave `n` spawns `enemies_per_wave * n` enemies.
    pub enemies_per_wave: u32,
    /// Time between consecutive spawns within a wave.
    pub spawn_interval_ms: u64,
    /// Time between the end of a wave and the start of the next.
    pub wave_delay_ms: u64,
    /// Distance under which a waypoint counts as reached.
    pub arrival_threshold: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::from_rules(&Rules::default())
    }
}

impl RulesConfig {
    fn from_rules(rules: &Rules) -> Self {
        Self {
            starting_coins: rules.starting_coins.hundredths() / 100,
            starting_health: rules.starting_health,
            breach_penalty: rules.breach_penalty,
            max_level: rules.max_level,
            upgrade_base_cost: rules.upgrade_base_cost.hundredths() / 100,
            range_per_level: rules.range_per_level,
            damage_per_level: rules.damage_per_level,
            cooldown_step_ms: millis(rules.cooldown_step),
            cooldown_floor_ms: millis(rules.cooldown_floor),
            placement_cooldown_ms: millis(rules.placement_cooldown),
            difficulty_increment: rules.difficulty_increment,
            enemies_per_wave: rules.enemies_per_wave,
            spawn_interval_ms: millis(rules.spawn_interval),
            wave_delay_ms: millis(rules.wave_delay),
            arrival_threshold: rules.arrival_threshold,
        }
    }

    fn to_rules(self) -> Rules {
        Rules {
            starting_coins: Coins::from_whole(self.starting_coins),
            starting_health: self.starting_health,
            breach_penalty: self.breach_penalty,
            max_level: self.max_level,
            upgrade_base_cost: Coins::from_whole(self.upgrade_base_cost),
            range_per_level: self.range_per_level,
            damage_per_level: self.damage_per_level,
            cooldown_step: Duration::from_millis(self.cooldown_step_ms),
            cooldown_floor: Duration::from_millis(self.cooldown_floor_ms),
            placement_cooldown: Duration::from_millis(self.placement_cooldown_ms),
            difficulty_increment: self.difficulty_increment,
            enemies_per_wave: self.enemies_per_wave,
            spawn_interval: Duration::from_millis(self.spawn_interval_ms),
            wave_delay: Duration::from_millis(self.wave_delay_ms),
            arrival_threshold: self.arrival_threshold,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
