//! Enemy movement, breaches and attack resolution.
//!
//! Kill and breach are the only terminal transitions for an enemy and both
//! remove it from the registry immediately, so a command that names an enemy
//! which already died this tick finds nothing and does nothing.

use glam::Vec2;
use tracing::{debug, info};
use wave_defence_core::{Coins, EnemyId, Event, TowerId};

use crate::World;

impl World {
    pub(crate) fn move_enemy(
        &mut self,
        enemy: EnemyId,
        position: Vec2,
        waypoint: usize,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.registry.enemy_mut(enemy) else {
            return;
        };
        state.position = position;
        if state.waypoint != waypoint {
            state.waypoint = waypoint;
            out_events.push(Event::EnemyReachedWaypoint { enemy, waypoint });
        }
    }

    pub(crate) fn breach_enemy(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        if self.registry.remove_enemy(enemy).is_none() {
            return;
        }

        let penalty = self.rules.breach_penalty;
        info!(enemy = enemy.get(), penalty, "enemy breached");
        out_events.push(Event::EnemyBreached { enemy, penalty });

        for account in self.ledger.accounts_mut() {
            let was_standing = account.health > 0;
            account.health = account.health.saturating_sub(penalty);
            out_events.push(Event::PlayerDamaged {
                player: account.id,
                health: account.health,
            });
            if was_standing && account.health == 0 {
                info!(player = account.id.get(), "player defeated");
                out_events.push(Event::PlayerDefeated { player: account.id });
            }
        }
    }

    pub(crate) fn attack_enemy(
        &mut self,
        tower: TowerId,
        enemy: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let now = self.clock;
        let Some(attacker) = self.registry.tower(tower) else {
            return;
        };
        if !attacker.is_ready(now) {
            return;
        }
        let (owner, damage, range, origin) = (
            attacker.owner,
            attacker.damage,
            attacker.range,
            attacker.position,
        );

        let Some(target) = self.registry.enemy_mut(enemy) else {
            debug!(tower = tower.get(), enemy = enemy.get(), "target already dead, skipping");
            return;
        };
        if target.position.distance(origin) > range {
            return;
        }

        target.health -= damage;
        let remaining = target.health;
        let reward = target.reward;

        if let Some(attacker) = self.registry.tower_mut(tower) {
            attacker.last_attack = Some(now);
        }

        if remaining > 0.0 {
            out_events.push(Event::EnemyDamaged {
                enemy,
                tower,
                damage,
                health: remaining,
            });
            return;
        }

        let _ = self.registry.remove_enemy(enemy);
        if let Some(attacker) = self.registry.tower_mut(tower) {
            attacker.kills = attacker.kills.saturating_add(1);
        }

        let credited = self.ledger.reward(owner, reward);
        if let Some(account) = self.ledger.account_mut(owner) {
            account.kills = account.kills.saturating_add(1);
        }
        debug!(
            enemy = enemy.get(),
            tower = tower.get(),
            owner = owner.get(),
            reward = %reward,
            credited,
            "enemy killed"
        );
        out_events.push(Event::EnemyKilled {
            enemy,
            tower,
            owner: credited.then_some(owner),
            reward: if credited { reward } else { Coins::ZERO },
        });
    }
}
