#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wave Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod catalog;
mod coins;

pub use catalog::{Catalog, EnemyArchetype, Path, Rules, TowerArchetype};
pub use coins::Coins;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Creates an account for a player joining the match.
    SetupPlayer {
        /// Identity token supplied by the session layer.
        player: PlayerId,
    },
    /// Destroys a player's account together with every tower they own.
    CleanupPlayer {
        /// Identity token of the departing player.
        player: PlayerId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests construction of a tower on behalf of a player.
    PlaceTower {
        /// Player paying for the tower.
        player: PlayerId,
        /// Name of the tower archetype to build.
        archetype: String,
        /// World position of the tower.
        position: Vec2,
    },
    /// Requests a single level upgrade of an owned tower.
    UpgradeTower {
        /// Player requesting the upgrade.
        player: PlayerId,
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Requests removal of an owned tower.
    RemoveTower {
        /// Player requesting the removal.
        player: PlayerId,
        /// Tower to remove.
        tower: TowerId,
    },
    /// Opens the provided wave, raising the difficulty.
    BeginWave {
        /// Number of the wave being opened; must follow the current wave.
        wave: u32,
    },
    /// Closes the provided wave, returning the match to idle.
    EndWave {
        /// Number of the wave being closed.
        wave: u32,
    },
    /// Spawns an enemy of the named archetype at the start of the path.
    SpawnEnemy {
        /// Name of the enemy archetype.
        archetype: String,
    },
    /// Moves a live enemy to a new location along the path.
    MoveEnemy {
        /// Enemy being moved.
        enemy: EnemyId,
        /// Location after the move.
        position: Vec2,
        /// Index of the next waypoint the enemy is heading toward.
        waypoint: usize,
    },
    /// Reports that an enemy travelled past the final waypoint.
    BreachEnemy {
        /// Enemy that breached.
        enemy: EnemyId,
    },
    /// Requests that a tower attack an enemy.
    AttackEnemy {
        /// Attacking tower.
        tower: TowerId,
        /// Enemy selected as the target.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation clock after the advance.
        now: Duration,
    },
    /// Confirms that a player account was created.
    PlayerJoined {
        /// Player that joined.
        player: PlayerId,
    },
    /// Confirms that a player account was destroyed.
    PlayerLeft {
        /// Player that left.
        player: PlayerId,
    },
    /// Reports that a player lost health to a breach.
    PlayerDamaged {
        /// Player that lost health.
        player: PlayerId,
        /// Health remaining after the penalty.
        health: u32,
    },
    /// Reports that a player's health reached zero.
    PlayerDefeated {
        /// Player whose health was exhausted.
        player: PlayerId,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Player that owns the tower.
        owner: PlayerId,
        /// Archetype the tower was built from.
        archetype: String,
        /// World position of the tower.
        position: Vec2,
        /// Coins debited from the owner.
        cost: Coins,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Player that requested the placement.
        player: PlayerId,
        /// Archetype requested for placement.
        archetype: String,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u32,
        /// Coins debited from the owner.
        cost: Coins,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Player that requested the upgrade.
        player: PlayerId,
        /// Tower targeted by the upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was removed from the world.
    TowerRemoved {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Player that owned the tower.
        owner: PlayerId,
    },
    /// Reports that a tower removal request was rejected.
    TowerRemovalRejected {
        /// Player that requested the removal.
        player: PlayerId,
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Announces that a wave opened.
    WaveStarted {
        /// Number of the wave.
        wave: u32,
        /// Difficulty multiplier in force for the wave.
        difficulty: f32,
        /// Number of enemies the wave will spawn.
        enemy_count: u32,
    },
    /// Reports that a wave could not be opened.
    WaveStartRejected {
        /// Wave number that was requested.
        wave: u32,
        /// Specific reason the request failed.
        reason: WaveError,
    },
    /// Announces that a wave finished spawning and the match is idle.
    WaveEnded {
        /// Number of the wave.
        wave: u32,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype the enemy was built from.
        archetype: String,
        /// Health after difficulty scaling.
        health: f32,
    },
    /// Reports that an enemy arrived at a waypoint and turned toward the next.
    EnemyReachedWaypoint {
        /// Enemy that arrived.
        enemy: EnemyId,
        /// Index of the waypoint the enemy now heads toward.
        waypoint: usize,
    },
    /// Reports that a tower hit an enemy without killing it.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Tower that attacked.
        tower: TowerId,
        /// Damage applied.
        damage: f32,
        /// Health remaining after the hit.
        health: f32,
    },
    /// Reports that an enemy was killed by a tower.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Tower that landed the killing blow.
        tower: TowerId,
        /// Player credited with the kill, when the tower's owner is present.
        owner: Option<PlayerId>,
        /// Coins credited to the owner.
        reward: Coins,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyBreached {
        /// Enemy that breached.
        enemy: EnemyId,
        /// Health removed from every player.
        penalty: u32,
    },
}

/// Unique identifier assigned to a player by the session layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u64);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers are allocated in spawn order and never reused, so ordering by
/// identifier is ordering by registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requesting player has no account.
    UnknownPlayer,
    /// The player placed a tower too recently.
    RateLimited,
    /// The requested archetype is not in the catalog.
    UnknownArchetype,
    /// The player cannot afford the tower.
    InsufficientFunds,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The tower belongs to another player.
    NotOwner,
    /// The tower already sits at the maximum level.
    MaxLevel,
    /// The player cannot afford the upgrade.
    InsufficientFunds,
}

/// Reasons a tower removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The tower belongs to another player.
    NotOwner,
}

/// Reasons a wave could not be opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveError {
    /// Another wave is still in progress.
    AlreadyInProgress,
    /// The requested wave does not directly follow the current wave.
    OutOfSequence,
}

/// Immutable representation of a player account used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Identity of the player.
    pub id: PlayerId,
    /// Remaining team health.
    pub health: u32,
    /// Current balance.
    pub coins: Coins,
    /// Cumulative coins spent on placements and upgrades.
    pub total_spent: Coins,
    /// Cumulative coins earned from kills.
    pub total_earned: Coins,
    /// Number of enemies killed by the player's towers.
    pub kills: u32,
    /// Highest wave the player was present for.
    pub highest_wave: u32,
    /// Towers owned by the player in identifier order.
    pub towers: Vec<TowerId>,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Player that owns the tower.
    pub owner: PlayerId,
    /// Archetype the tower was built from.
    pub archetype: String,
    /// World position of the tower.
    pub position: Vec2,
    /// Current targeting radius.
    pub range: f32,
    /// Current damage per attack.
    pub damage: f32,
    /// Current minimum time between attacks.
    pub cooldown: Duration,
    /// Simulation time of the most recent attack, if any.
    pub last_attack: Option<Duration>,
    /// Current upgrade level.
    pub level: u32,
    /// Enemies killed by this tower.
    pub kills: u32,
}

impl TowerSnapshot {
    /// Reports whether the tower's cooldown has elapsed at simulation time `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_attack {
            Some(last) => now.saturating_sub(last) >= self.cooldown,
            None => true,
        }
    }
}

/// Read-only snapshot describing all towers in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for `tower`, if any.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single live enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype the enemy was built from.
    pub archetype: String,
    /// Current location.
    pub position: Vec2,
    /// Index of the next waypoint the enemy is heading toward.
    pub waypoint: usize,
    /// Remaining health.
    pub health: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Coins credited when the enemy is killed.
    pub reward: Coins,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of the wave sequencing state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaveSnapshot {
    /// Number of the current (or most recent) wave; zero before the first wave.
    pub number: u32,
    /// Indicates whether a wave is currently spawning.
    pub in_progress: bool,
    /// Difficulty multiplier applied to newly spawned enemies.
    pub difficulty: f32,
    /// Enemies spawned so far during the current wave.
    pub spawned: u32,
}

/// Target assignment computed for a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower performing the attack.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Euclidean distance between the tower and the enemy.
    pub distance: f32,
}
