use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use wave_defence_core::{
    Catalog, Coins, Command, EnemyArchetype, EnemyId, Event, Path, PlacementError, PlayerId,
    RemovalError, Rules, TowerArchetype, TowerId, UpgradeError, WaveError,
};
use wave_defence_world::{self as world, query, World};

const ALICE: PlayerId = PlayerId::new(1);
const BOB: PlayerId = PlayerId::new(2);

fn catalog() -> Catalog {
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
    let _ = towers.insert(
        "Cannon".to_owned(),
        TowerArchetype {
            cost: Coins::from_whole(25),
            range: 20.0,
            damage: 12.0,
            cooldown: Duration::from_secs(2),
        },
    );
    let mut enemies = BTreeMap::new();
    let _ = enemies.insert(
        "Grunt".to_owned(),
        EnemyArchetype {
            health: 20.0,
            speed: 4.0,
            reward: 10.0,
        },
    );
    Catalog::new(towers, enemies)
}

fn new_world() -> World {
    World::new(
        catalog(),
        Path::new(vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]),
        Rules::default(),
    )
    .expect("valid configuration")
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, millis: u64) {
    let _ = run(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    );
}

fn place(world: &mut World, player: PlayerId, archetype: &str, position: Vec2) -> Vec<Event> {
    run(
        world,
        Command::PlaceTower {
            player,
            archetype: archetype.to_owned(),
            position,
        },
    )
}

fn placed_tower(events: &[Event]) -> TowerId {
    events
        .iter()
        .find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("placement succeeded")
}

fn spawned_enemy(events: &[Event]) -> EnemyId {
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("enemy spawned")
}

fn joined_world(players: &[PlayerId]) -> World {
    let mut world = new_world();
    for player in players {
        let _ = run(&mut world, Command::SetupPlayer { player: *player });
    }
    world
}

#[test]
fn placing_a_tower_debits_its_cost() {
    let mut world = joined_world(&[ALICE]);

    let tower = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::new(5.0, 5.0)));

    let account = query::player(&world, ALICE).expect("alice has an account");
    assert_eq!(account.coins, Coins::from_whole(75));
    assert_eq!(account.total_spent, Coins::from_whole(25));
    assert_eq!(account.towers, vec![tower]);

    let snapshot = query::tower(&world, tower).expect("tower registered");
    assert_eq!(snapshot.level, 1);
    assert_eq!(snapshot.owner, ALICE);
}

#[test]
fn placements_are_rate_limited() {
    let mut world = joined_world(&[ALICE]);
    let _ = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));

    tick(&mut world, 500);
    let events = place(&mut world, ALICE, "Basic", Vec2::ZERO);
    assert_eq!(
        events,
        vec![Event::TowerPlacementRejected {
            player: ALICE,
            archetype: "Basic".to_owned(),
            reason: PlacementError::RateLimited,
        }]
    );
    assert_eq!(
        query::player(&world, ALICE).expect("account").coins,
        Coins::from_whole(75),
        "a rejected placement must not charge"
    );

    tick(&mut world, 500);
    let _ = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));
}

#[test]
fn unknown_archetypes_and_players_are_rejected() {
    let mut world = joined_world(&[ALICE]);

    let events = place(&mut world, ALICE, "Laser", Vec2::ZERO);
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::UnknownArchetype,
            ..
        }]
    ));

    let events = place(&mut world, BOB, "Basic", Vec2::ZERO);
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::UnknownPlayer,
            ..
        }]
    ));
    assert!(query::tower_view(&world).is_empty());
}

#[test]
fn placement_fails_without_funds() {
    let mut world = joined_world(&[ALICE]);
    for _ in 0..4 {
        let _ = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));
        tick(&mut world, 1_000);
    }

    let events = place(&mut world, ALICE, "Basic", Vec2::ZERO);
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::InsufficientFunds,
            ..
        }]
    ));
    let account = query::player(&world, ALICE).expect("account");
    assert_eq!(account.coins, Coins::ZERO);
    assert_eq!(account.towers.len(), 4);
}

#[test]
fn upgrade_improves_stats_and_charges_by_level() {
    let mut world = joined_world(&[ALICE]);
    let tower = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));

    let events = run(
        &mut world,
        Command::UpgradeTower {
            player: ALICE,
            tower,
        },
    );
    assert_eq!(
        events,
        vec![Event::TowerUpgraded {
            tower,
            level: 2,
            cost: Coins::from_whole(50),
        }]
    );

    let snapshot = query::tower(&world, tower).expect("tower");
    assert_eq!(snapshot.level, 2);
    assert!((snapshot.range - 25.0).abs() < f32::EPSILON);
    assert!((snapshot.damage - 7.0).abs() < f32::EPSILON);
    assert_eq!(snapshot.cooldown, Duration::from_millis(900));

    let account = query::player(&world, ALICE).expect("account");
    assert_eq!(account.coins, Coins::from_whole(25));
    assert_eq!(account.total_spent, Coins::from_whole(75));

    let events = run(
        &mut world,
        Command::UpgradeTower {
            player: ALICE,
            tower,
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerUpgradeRejected {
            reason: UpgradeError::InsufficientFunds,
            ..
        }]
    ));
    assert_eq!(query::tower(&world, tower).expect("tower").level, 2);
}

#[test]
fn upgrades_stop_at_max_level_and_cooldown_floor() {
    let rules = Rules {
        starting_coins: Coins::from_whole(10_000),
        ..Rules::default()
    };
    let mut world = World::new(
        catalog(),
        Path::new(vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]),
        rules,
    )
    .expect("valid configuration");
    let _ = run(&mut world, Command::SetupPlayer { player: ALICE });
    let tower = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));

    let mut last_cooldown = Duration::MAX;
    for expected_level in 2..=rules.max_level {
        let events = run(
            &mut world,
            Command::UpgradeTower {
                player: ALICE,
                tower,
            },
        );
        assert!(matches!(
            events.as_slice(),
            [Event::TowerUpgraded { level, .. }] if *level == expected_level
        ));
        let cooldown = query::tower(&world, tower).expect("tower").cooldown;
        assert!(cooldown <= last_cooldown);
        assert!(cooldown >= rules.cooldown_floor);
        last_cooldown = cooldown;
    }

    let events = run(
        &mut world,
        Command::UpgradeTower {
            player: ALICE,
            tower,
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerUpgradeRejected {
            reason: UpgradeError::MaxLevel,
            ..
        }]
    ));
}

#[test]
fn only_owners_may_upgrade_or_remove() {
    let mut world = joined_world(&[ALICE, BOB]);
    let tower = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));

    let events = run(&mut world, Command::UpgradeTower { player: BOB, tower });
    assert!(matches!(
        events.as_slice(),
        [Event::TowerUpgradeRejected {
            reason: UpgradeError::NotOwner,
            ..
        }]
    ));

    let events = run(&mut world, Command::RemoveTower { player: BOB, tower });
    assert_eq!(
        events,
        vec![Event::TowerRemovalRejected {
            player: BOB,
            tower,
            reason: RemovalError::NotOwner,
        }]
    );

    let events = run(
        &mut world,
        Command::RemoveTower {
            player: ALICE,
            tower,
        },
    );
    assert_eq!(
        events,
        vec![Event::TowerRemoved {
            tower,
            owner: ALICE,
        }]
    );
    assert!(query::player(&world, ALICE).expect("account").towers.is_empty());

    let events = run(
        &mut world,
        Command::RemoveTower {
            player: ALICE,
            tower,
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerRemovalRejected {
            reason: RemovalError::MissingTower,
            ..
        }]
    ));
}

#[test]
fn cleanup_removes_account_and_towers() {
    let mut world = joined_world(&[ALICE, BOB]);
    let tower = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));
    let _ = placed_tower(&place(&mut world, BOB, "Basic", Vec2::ZERO));

    let events = run(&mut world, Command::CleanupPlayer { player: ALICE });
    assert_eq!(
        events,
        vec![
            Event::TowerRemoved {
                tower,
                owner: ALICE,
            },
            Event::PlayerLeft { player: ALICE },
        ]
    );
    assert!(query::player(&world, ALICE).is_none());
    assert_eq!(query::tower_view(&world).len(), 1);
    assert!(run(&mut world, Command::CleanupPlayer { player: ALICE }).is_empty());
}

#[test]
fn wave_start_raises_difficulty_and_stamps_players() {
    let mut world = joined_world(&[ALICE, BOB]);

    let events = run(&mut world, Command::BeginWave { wave: 1 });
    assert!(matches!(
        events.as_slice(),
        [Event::WaveStarted {
            wave: 1,
            enemy_count: 3,
            ..
        }]
    ));
    let wave = query::wave(&world);
    assert!(wave.in_progress);
    assert!((wave.difficulty - 0.05).abs() < 1e-6);
    for player in query::players(&world) {
        assert_eq!(player.highest_wave, 1);
    }

    let events = run(&mut world, Command::BeginWave { wave: 2 });
    assert_eq!(
        events,
        vec![Event::WaveStartRejected {
            wave: 2,
            reason: WaveError::AlreadyInProgress,
        }]
    );
    assert!((query::wave(&world).difficulty - 0.05).abs() < 1e-6);

    let events = run(&mut world, Command::EndWave { wave: 1 });
    assert_eq!(events, vec![Event::WaveEnded { wave: 1 }]);

    let events = run(&mut world, Command::BeginWave { wave: 3 });
    assert_eq!(
        events,
        vec![Event::WaveStartRejected {
            wave: 3,
            reason: WaveError::OutOfSequence,
        }]
    );

    let _ = run(&mut world, Command::BeginWave { wave: 2 });
    let wave = query::wave(&world);
    assert_eq!(wave.number, 2);
    assert!((wave.difficulty - 0.10).abs() < 1e-6);
}

#[test]
fn killing_blow_rewards_exactly_once() {
    let mut world = joined_world(&[ALICE, BOB]);
    let basic = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::new(0.0, 5.0)));
    let cannon = placed_tower(&place(&mut world, BOB, "Cannon", Vec2::new(0.0, -5.0)));
    let _ = run(&mut world, Command::BeginWave { wave: 1 });
    let enemy = spawned_enemy(&run(
        &mut world,
        Command::SpawnEnemy {
            archetype: "Grunt".to_owned(),
        },
    ));

    let health = query::enemy_view(&world).iter().next().expect("enemy").health;
    assert!((health - 21.0).abs() < 1e-4);

    let _ = run(&mut world, Command::AttackEnemy { tower: basic, enemy });
    tick(&mut world, 1_000);
    let _ = run(&mut world, Command::AttackEnemy { tower: basic, enemy });
    let health = query::enemy_view(&world).iter().next().expect("enemy").health;
    assert!((health - 11.0).abs() < 1e-4, "two hits leave the enemy alive");

    let events = run(&mut world, Command::AttackEnemy { tower: cannon, enemy });
    assert_eq!(
        events,
        vec![Event::EnemyKilled {
            enemy,
            tower: cannon,
            owner: Some(BOB),
            reward: Coins::from_hundredths(1050),
        }]
    );
    assert!(query::enemy_view(&world).is_empty());

    tick(&mut world, 1_000);
    assert!(run(&mut world, Command::AttackEnemy { tower: basic, enemy }).is_empty());

    let bob = query::player(&world, BOB).expect("bob");
    assert_eq!(bob.coins, Coins::from_hundredths(8550));
    assert_eq!(bob.total_earned, Coins::from_hundredths(1050));
    assert_eq!(bob.kills, 1);
    let alice = query::player(&world, ALICE).expect("alice");
    assert_eq!(alice.kills, 0);
    assert_eq!(alice.total_earned, Coins::ZERO);
    assert_eq!(query::tower(&world, cannon).expect("cannon").kills, 1);
}

#[test]
fn attacks_respect_cooldown() {
    let mut world = joined_world(&[ALICE]);
    let tower = placed_tower(&place(&mut world, ALICE, "Basic", Vec2::ZERO));
    let enemy = spawned_enemy(&run(
        &mut world,
        Command::SpawnEnemy {
            archetype: "Grunt".to_owned(),
        },
    ));

    assert_eq!(
        run(&mut world, Command::AttackEnemy { tower, enemy }).len(),
        1,
        "fresh tower fires immediately"
    );
    tick(&mut world, 999);
    assert!(
        run(&mut world, Command::AttackEnemy { tower, enemy }).is_empty(),
        "tower must wait for its cooldown"
    );
    tick(&mut world, 1);
    assert_eq!(run(&mut world, Command::AttackEnemy { tower, enemy }).len(), 1);
}

#[test]
fn breach_penalises_every_player_without_reward() {
    let mut world = joined_world(&[ALICE, BOB]);
    let enemy = spawned_enemy(&run(
        &mut world,
        Command::SpawnEnemy {
            archetype: "Grunt".to_owned(),
        },
    ));

    let events = run(&mut world, Command::BreachEnemy { enemy });
    assert_eq!(
        events,
        vec![
            Event::EnemyBreached { enemy, penalty: 10 },
            Event::PlayerDamaged {
                player: ALICE,
                health: 90,
            },
            Event::PlayerDamaged {
                player: BOB,
                health: 90,
            },
        ]
    );
    assert!(query::enemy_view(&world).is_empty());
    for player in query::players(&world) {
        assert_eq!(player.coins, Coins::from_whole(100));
        assert_eq!(player.total_earned, Coins::ZERO);
    }

    assert!(
        run(&mut world, Command::BreachEnemy { enemy }).is_empty(),
        "a removed enemy cannot breach twice"
    );
}

#[test]
fn exhausted_health_reports_defeat_once() {
    let rules = Rules {
        starting_health: 15,
        ..Rules::default()
    };
    let mut world = World::new(
        catalog(),
        Path::new(vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]),
        rules,
    )
    .expect("valid configuration");
    let _ = run(&mut world, Command::SetupPlayer { player: ALICE });

    let mut defeats = 0;
    for _ in 0..3 {
        let enemy = spawned_enemy(&run(
            &mut world,
            Command::SpawnEnemy {
                archetype: "Grunt".to_owned(),
            },
        ));
        defeats += run(&mut world, Command::BreachEnemy { enemy })
            .iter()
            .filter(|event| matches!(event, Event::PlayerDefeated { .. }))
            .count();
    }

    assert_eq!(defeats, 1);
    assert_eq!(query::player(&world, ALICE).expect("account").health, 0);
}
