use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use wave_defence_core::{
    Catalog, Coins, Command, EnemyArchetype, Event, Path, PlayerId, Rules, TowerArchetype,
};
use wave_defence_system_movement::Movement;
use wave_defence_world::{self as world, query, World};

fn new_world() -> World {
    let mut towers = BTreeMap::new();
    let _ = towers.insert(
        "Basic".to_owned(),
        TowerArchetype {
            cost: Coins::from_whole(25),
            range: 20.0,
            damage: 5.0,
            cooldown: Duration::from_secs(1),
        },
    );
    let mut enemies = BTreeMap::new();
    let _ = enemies.insert(
        "Grunt".to_owned(),
        EnemyArchetype {
            health: 20.0,
            speed: 5.0,
            reward: 10.0,
        },
    );
    World::new(
        Catalog::new(towers, enemies),
        Path::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
        ]),
        Rules::default(),
    )
    .expect("valid configuration")
}

fn step(world: &mut World, movement: &Movement, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let mut commands = Vec::new();
    movement.handle(
        &events,
        &query::enemy_view(world),
        query::path(world),
        &mut commands,
    );

    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

#[test]
fn enemy_walks_path_and_breaches() {
    let mut world = new_world();
    let movement = Movement::new(query::rules(&world).arrival_threshold);
    let mut events = Vec::new();
    for player in [PlayerId::new(1), PlayerId::new(2)] {
        world::apply(&mut world, Command::SetupPlayer { player }, &mut events);
    }
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            archetype: "Grunt".to_owned(),
        },
        &mut events,
    );

    let produced = step(&mut world, &movement, Duration::from_secs(2));
    assert!(
        produced.iter().any(|event| matches!(
            event,
            Event::EnemyReachedWaypoint { waypoint: 2, .. }
        )),
        "enemy should turn the first corner after ten units"
    );
    let enemy = query::enemy_view(&world).into_vec().remove(0);
    assert_eq!(enemy.position, Vec2::new(10.0, 0.0));

    let produced = step(&mut world, &movement, Duration::from_secs(1));
    assert!(produced.is_empty(), "mid-segment moves are silent");
    assert_eq!(
        query::enemy_view(&world).into_vec()[0].position,
        Vec2::new(10.0, 5.0)
    );

    let produced = step(&mut world, &movement, Duration::from_secs(1));
    assert!(matches!(
        produced.first(),
        Some(Event::EnemyBreached { penalty: 10, .. })
    ));
    assert!(query::enemy_view(&world).is_empty());
    for player in query::players(&world) {
        assert_eq!(player.health, 90);
        assert_eq!(player.coins, Coins::from_whole(100));
    }
}

#[test]
fn enemies_are_moved_in_registration_order() {
    let mut world = new_world();
    let movement = Movement::new(0.5);
    let mut events = Vec::new();
    for _ in 0..3 {
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                archetype: "Grunt".to_owned(),
            },
            &mut events,
        );
    }

    let mut tick_events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut tick_events,
    );
    let mut commands = Vec::new();
    movement.handle(
        &tick_events,
        &query::enemy_view(&world),
        query::path(&world),
        &mut commands,
    );

    let ids: Vec<u32> = commands
        .iter()
        .filter_map(|command| match command {
            Command::MoveEnemy { enemy, .. } => Some(enemy.get()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![0, 1, 2]);
}
