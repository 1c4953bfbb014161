//! Player-issued commands: account lifecycle, placement, upgrades and removal.
//!
//! Every handler validates fully before mutating, so a rejected command leaves
//! the world exactly as it found it.

use glam::Vec2;
use tracing::{debug, info};
use wave_defence_core::{
    Coins, Event, PlacementError, PlayerId, RemovalError, TowerId, UpgradeError,
};

use crate::World;

impl World {
    pub(crate) fn setup_player(&mut self, player: PlayerId, out_events: &mut Vec<Event>) {
        if !self.ledger.open(player, &self.rules) {
            debug!(player = player.get(), "player already has an account");
            return;
        }
        info!(player = player.get(), "player joined");
        out_events.push(Event::PlayerJoined { player });
    }

    pub(crate) fn cleanup_player(&mut self, player: PlayerId, out_events: &mut Vec<Event>) {
        let Some(account) = self.ledger.close(player) else {
            return;
        };

        for tower in account.towers {
            if self.registry.remove_tower(tower).is_some() {
                out_events.push(Event::TowerRemoved {
                    tower,
                    owner: player,
                });
            }
        }
        info!(player = player.get(), "player left");
        out_events.push(Event::PlayerLeft { player });
    }

    pub(crate) fn place_tower(
        &mut self,
        player: PlayerId,
        archetype: String,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        match self.try_place_tower(player, &archetype, position) {
            Ok((tower, cost)) => {
                out_events.push(Event::TowerPlaced {
                    tower,
                    owner: player,
                    archetype,
                    position,
                    cost,
                });
            }
            Err(reason) => {
                debug!(player = player.get(), %archetype, ?reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected {
                    player,
                    archetype,
                    reason,
                });
            }
        }
    }

    fn try_place_tower(
        &mut self,
        player: PlayerId,
        archetype: &str,
        position: Vec2,
    ) -> Result<(TowerId, Coins), PlacementError> {
        let now = self.clock;
        let account = self
            .ledger
            .account(player)
            .ok_or(PlacementError::UnknownPlayer)?;

        if let Some(last) = account.last_placement {
            if now.saturating_sub(last) < self.rules.placement_cooldown {
                return Err(PlacementError::RateLimited);
            }
        }

        let base = *self
            .catalog
            .tower(archetype)
            .ok_or(PlacementError::UnknownArchetype)?;

        if !self.ledger.charge(player, base.cost) {
            return Err(PlacementError::InsufficientFunds);
        }

        let tower = self.registry.add_tower(player, archetype, &base, position);
        if let Some(account) = self.ledger.account_mut(player) {
            let _ = account.towers.insert(tower);
            account.last_placement = Some(now);
            info!(
                player = player.get(),
                tower = tower.get(),
                archetype,
                x = position.x,
                y = position.y,
                remaining = %account.coins(),
                "tower placed"
            );
        }
        Ok((tower, base.cost))
    }

    pub(crate) fn upgrade_tower(
        &mut self,
        player: PlayerId,
        tower: TowerId,
        out_events: &mut Vec<Event>,
    ) {
        match self.try_upgrade_tower(player, tower) {
            Ok((level, cost)) => out_events.push(Event::TowerUpgraded { tower, level, cost }),
            Err(reason) => {
                debug!(player = player.get(), tower = tower.get(), ?reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected {
                    player,
                    tower,
                    reason,
                });
            }
        }
    }

    fn try_upgrade_tower(
        &mut self,
        player: PlayerId,
        tower: TowerId,
    ) -> Result<(u32, Coins), UpgradeError> {
        let state = self.registry.tower(tower).ok_or(UpgradeError::MissingTower)?;
        if state.owner != player {
            return Err(UpgradeError::NotOwner);
        }
        if state.level >= self.rules.max_level {
            return Err(UpgradeError::MaxLevel);
        }

        let cost = self.rules.upgrade_cost(state.level);
        if !self.ledger.charge(player, cost) {
            return Err(UpgradeError::InsufficientFunds);
        }

        let rules = self.rules;
        let state = self
            .registry
            .tower_mut(tower)
            .ok_or(UpgradeError::MissingTower)?;
        state.level += 1;
        state.range += rules.range_per_level;
        state.damage += rules.damage_per_level;
        state.cooldown = rules.upgraded_cooldown(state.cooldown);

        info!(
            player = player.get(),
            tower = tower.get(),
            level = state.level,
            cost = %cost,
            "tower upgraded"
        );
        Ok((state.level, cost))
    }

    pub(crate) fn remove_tower(
        &mut self,
        player: PlayerId,
        tower: TowerId,
        out_events: &mut Vec<Event>,
    ) {
        let reason = match self.registry.tower(tower) {
            None => Some(RemovalError::MissingTower),
            Some(state) if state.owner != player => Some(RemovalError::NotOwner),
            Some(_) => None,
        };

        if let Some(reason) = reason {
            debug!(player = player.get(), tower = tower.get(), ?reason, "tower removal rejected");
            out_events.push(Event::TowerRemovalRejected {
                player,
                tower,
                reason,
            });
            return;
        }

        let _ = self.registry.remove_tower(tower);
        if let Some(account) = self.ledger.account_mut(player) {
            let _ = account.towers.remove(&tower);
        }
        info!(player = player.get(), tower = tower.get(), "tower removed");
        out_events.push(Event::TowerRemoved {
            tower,
            owner: player,
        });
    }
}
