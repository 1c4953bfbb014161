#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies along the path.

use std::time::Duration;

use glam::Vec2;
use wave_defence_core::{Command, EnemySnapshot, EnemyView, Event, Path};

/// Pure system that reacts to clock advances and emits movement commands.
#[derive(Clone, Copy, Debug)]
pub struct Movement {
    arrival_threshold: f32,
}

impl Movement {
    /// Creates a movement system that treats a waypoint as reached once an
    /// enemy is closer than `arrival_threshold`.
    #[must_use]
    pub const fn new(arrival_threshold: f32) -> Self {
        Self { arrival_threshold }
    }

    /// Consumes world events and the live enemy view to emit movement commands.
    ///
    /// Enemies are processed in registration order. Each enemy either moves
    /// (`Command::MoveEnemy`) or, once it has passed the final waypoint,
    /// breaches (`Command::BreachEnemy`). Nothing is emitted when no time
    /// elapsed.
    pub fn handle(
        &self,
        events: &[Event],
        enemies: &EnemyView,
        path: &Path,
        out: &mut Vec<Command>,
    ) {
        let elapsed = elapsed_time(events);
        if elapsed.is_zero() {
            return;
        }

        for enemy in enemies.iter() {
            out.push(self.advance(enemy, path, elapsed.as_secs_f32()));
        }
    }

    fn advance(&self, enemy: &EnemySnapshot, path: &Path, seconds: f32) -> Command {
        let mut position = enemy.position;
        let mut waypoint = enemy.waypoint;
        let mut budget = enemy.speed * seconds;

        loop {
            let Some(target) = path.waypoint(waypoint) else {
                return Command::BreachEnemy { enemy: enemy.id };
            };

            let distance = position.distance(target);
            if distance < self.arrival_threshold {
                waypoint += 1;
                continue;
            }
            if budget <= 0.0 {
                break;
            }

            let step = budget.min(distance);
            position = step_toward(position, target, step, distance);
            budget -= step;
        }

        Command::MoveEnemy {
            enemy: enemy.id,
            position,
            waypoint,
        }
    }
}

fn elapsed_time(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt, .. } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}

fn step_toward(from: Vec2, to: Vec2, step: f32, distance: f32) -> Vec2 {
    if step >= distance {
        return to;
    }
    from + (to - from) * (step / distance)
}
