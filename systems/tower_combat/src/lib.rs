#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits attack commands from targeting data.

use std::time::Duration;

use wave_defence_core::{Command, TowerTarget, TowerView};

/// Tower combat system that queues attack commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AttackEnemy` entries for towers ready to attack at `now`.
    ///
    /// Targets naming towers missing from the view or still cooling down are
    /// skipped. Commands preserve the order of `tower_targets`.
    pub fn handle(
        &mut self,
        now: Duration,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() || towers.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            if let Some(snapshot) = towers.get(target.tower) {
                if snapshot.is_ready(now) {
                    self.scratch.push(Command::AttackEnemy {
                        tower: target.tower,
                        enemy: target.enemy,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
