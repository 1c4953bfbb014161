//! Authoritative entity storage and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use wave_defence_core::{
    Coins, EnemyArchetype, EnemyId, EnemySnapshot, PlayerId, TowerArchetype, TowerId,
    TowerSnapshot,
};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) owner: PlayerId,
    pub(crate) archetype: String,
    pub(crate) position: Vec2,
    pub(crate) range: f32,
    pub(crate) damage: f32,
    pub(crate) cooldown: Duration,
    pub(crate) last_attack: Option<Duration>,
    pub(crate) level: u32,
    pub(crate) kills: u32,
}

impl TowerState {
    pub(crate) fn is_ready(&self, now: Duration) -> bool {
        self.last_attack
            .map_or(true, |last| now.saturating_sub(last) >= self.cooldown)
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            owner: self.owner,
            archetype: self.archetype.clone(),
            position: self.position,
            range: self.range,
            damage: self.damage,
            cooldown: self.cooldown,
            last_attack: self.last_attack,
            level: self.level,
            kills: self.kills,
        }
    }
}

/// Live enemy stored inside the world.
///
/// Presence in the registry is what makes an enemy alive: both terminal
/// transitions remove the entry in the same step that decides them.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) archetype: String,
    pub(crate) position: Vec2,
    pub(crate) waypoint: usize,
    pub(crate) health: f32,
    pub(crate) speed: f32,
    pub(crate) reward: Coins,
}

impl EnemyState {
    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            archetype: self.archetype.clone(),
            position: self.position,
            waypoint: self.waypoint,
            health: self.health,
            speed: self.speed,
            reward: self.reward,
        }
    }
}

/// Registry that stores towers and enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    towers: BTreeMap<TowerId, TowerState>,
    enemies: BTreeMap<EnemyId, EnemyState>,
    next_tower_id: TowerId,
    next_enemy_id: EnemyId,
}

impl EntityRegistry {
    /// Creates an empty registry with reset identifier counters.
    pub(crate) fn new() -> Self {
        Self {
            towers: BTreeMap::new(),
            enemies: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn add_tower(
        &mut self,
        owner: PlayerId,
        archetype: &str,
        base: &TowerArchetype,
        position: Vec2,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let previous = self.towers.insert(
            id,
            TowerState {
                id,
                owner,
                archetype: archetype.to_owned(),
                position,
                range: base.range,
                damage: base.damage,
                cooldown: base.cooldown,
                last_attack: None,
                level: 1,
                kills: 0,
            },
        );
        debug_assert!(previous.is_none(), "tower identifiers are never reused");
        id
    }

    pub(crate) fn add_enemy(&mut self, archetype: &str, stats: EnemyArchetype, at: Vec2) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let previous = self.enemies.insert(
            id,
            EnemyState {
                id,
                archetype: archetype.to_owned(),
                position: at,
                waypoint: 1,
                health: stats.health,
                speed: stats.speed,
                reward: Coins::from_f32(stats.reward),
            },
        );
        debug_assert!(previous.is_none(), "enemy identifiers are never reused");
        id
    }

    /// Removes a tower; removing an unknown identifier is a no-op.
    pub(crate) fn remove_tower(&mut self, id: TowerId) -> Option<TowerState> {
        self.towers.remove(&id)
    }

    /// Removes an enemy; removing an unknown identifier is a no-op.
    pub(crate) fn remove_enemy(&mut self, id: EnemyId) -> Option<EnemyState> {
        self.enemies.remove(&id)
    }

    pub(crate) fn tower(&self, id: TowerId) -> Option<&TowerState> {
        self.towers.get(&id)
    }

    pub(crate) fn tower_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.towers.get_mut(&id)
    }

    pub(crate) fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.enemies.get_mut(&id)
    }

    /// Towers in registration order.
    pub(crate) fn towers(&self) -> impl Iterator<Item = &TowerState> {
        self.towers.values()
    }

    /// Live enemies in registration order.
    pub(crate) fn live_enemies(&self) -> impl Iterator<Item = &EnemyState> {
        self.enemies.values()
    }
}
