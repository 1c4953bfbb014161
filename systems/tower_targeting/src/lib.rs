#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use std::time::Duration;

use glam::Vec2;
use wave_defence_core::{EnemyId, EnemyView, TowerId, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Only towers whose cooldown has elapsed at `now` are considered. Each
    /// ready tower selects the nearest live enemy within its range, preferring
    /// the lower enemy identifier when distances match. The output buffer is
    /// cleared before populating it with the latest assignments, which appear
    /// in tower identifier order.
    pub fn handle(
        &mut self,
        now: Duration,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(now, towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            let max_distance_sq = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = tower.position.distance_squared(candidate.position);
                if distance_sq > max_distance_sq {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    distance: best_candidate.distance_sq.sqrt(),
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, now: Duration, towers: &TowerView) {
        self.tower_workspace.clear();
        self.tower_workspace.reserve(towers.len());

        for snapshot in towers.iter() {
            if !snapshot.is_ready(now) {
                continue;
            }

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.range,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}
