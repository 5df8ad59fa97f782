use std::time::Duration;

use mine_squad_core::{
    ActorId, BeaconOutcome, Command, Direction, EnemyId, EnemySpawn, Event, Health, InputDevice,
    LevelConfig, LevelLayout, LevelStatus, MineCell, MovementKind, Pickup, PickupKind,
    PlayerSnapshot, TileCoord, TileKind,
};
use mine_squad_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(16);

fn level(armed_mines: u32, player_spawn: TileCoord) -> LevelConfig {
    LevelConfig {
        armed_mines,
        beacons: 4,
        ammo: 3,
        player_spawn,
        seed: 0x5eed,
        enemies: Vec::new(),
        pickups: Vec::new(),
        score_pickups: false,
    }
}

fn enemy(kind: MovementKind, spawn: TileCoord, health: u32) -> EnemySpawn {
    EnemySpawn {
        kind,
        spawn,
        health: Health::new(health),
        move_duration: 8,
    }
}

fn tick(world: &mut World, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    events
}

fn command(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn move_player(direction: Direction) -> Command {
    Command::MovePlayer {
        direction,
        device: InputDevice::Keyboard,
    }
}

/// 3x4 map whose only eligible mine tile is (1, 1).
fn single_mine_layout() -> LevelLayout {
    let mut layout = LevelLayout::open(3, 4);
    for tile in [
        TileCoord::new(0, 0),
        TileCoord::new(1, 0),
        TileCoord::new(2, 0),
        TileCoord::new(0, 1),
        TileCoord::new(2, 1),
    ] {
        layout.set(tile, TileKind::Obstacle);
    }
    layout
}

fn mine_layer(world: &World) -> Vec<Option<MineCell>> {
    let grid = query::grid(world);
    (0..grid.rows())
        .flat_map(|row| (0..grid.columns()).map(move |column| TileCoord::new(column, row)))
        .map(|tile| grid.mine_cell(tile))
        .collect()
}

#[test]
fn seeded_generation_is_reproducible() {
    let spawn = TileCoord::new(5, 9);
    let first = World::load(LevelLayout::open(10, 10), level(10, spawn)).expect("valid level");
    let second = World::load(LevelLayout::open(10, 10), level(10, spawn)).expect("valid level");

    assert_eq!(mine_layer(&first), mine_layer(&second));
    assert_eq!(
        query::grid(&first).armed_tiles().collect::<Vec<_>>(),
        query::grid(&second).armed_tiles().collect::<Vec<_>>()
    );
}

#[test]
fn every_seed_places_exact_count_away_from_spawn() {
    for seed in 0..16 {
        let mut config = level(10, TileCoord::new(5, 0));
        config.seed = seed;
        let world = World::load(LevelLayout::open(10, 10), config).expect("valid level");
        let armed: Vec<_> = query::grid(&world).armed_tiles().collect();

        assert_eq!(armed.len(), 10, "seed {seed}");
        assert!(armed.iter().all(|tile| tile.row() >= 2), "seed {seed}");
    }
}

#[test]
fn too_many_mines_aborts_the_load() {
    let result = World::load(single_mine_layout(), level(2, TileCoord::new(1, 3)));
    assert!(matches!(
        result,
        Err(world::LevelError::TooManyMines {
            requested: 2,
            eligible: 1,
        })
    ));
}

#[test]
fn queries_are_idempotent() {
    let world = World::load(LevelLayout::open(8, 8), level(12, TileCoord::new(0, 7)))
        .expect("valid level");
    let grid = query::grid(&world);
    for y in -1..9 {
        for x in -1..9 {
            assert_eq!(grid.get_tile_type(x, y), grid.get_tile_type(x, y));
            assert_eq!(grid.query_mine_state(x, y), grid.query_mine_state(x, y));
        }
    }
}

#[test]
fn correct_beacon_defuses_the_mine_ahead() {
    let mut world =
        World::load(single_mine_layout(), level(1, TileCoord::new(1, 2))).expect("valid level");
    assert_eq!(query::grid(&world).get_tile_type(1, 1), TileKind::Hazard);

    let events = command(&mut world, Command::PlaceBeacon);

    assert_eq!(
        events,
        vec![Event::BeaconPlaced {
            tile: Some(TileCoord::new(1, 1)),
            outcome: BeaconOutcome::CorrectFlag,
        }]
    );
    assert_eq!(query::remaining_armed_count(&world), 0);
    assert_eq!(query::remaining_beacons(&world), 3);
    assert_eq!(query::grid(&world).get_tile_type(1, 1), TileKind::NoAction);
    assert_eq!(query::level_status(&world), LevelStatus::Cleared);

    let again = command(&mut world, Command::PlaceBeacon);
    assert_eq!(
        again,
        vec![Event::BeaconPlaced {
            tile: Some(TileCoord::new(1, 1)),
            outcome: BeaconOutcome::AlreadyFlagged,
        }]
    );
    assert_eq!(query::remaining_beacons(&world), 3);
}

#[test]
fn stepping_on_a_mine_detonates_it() {
    let mut world =
        World::load(single_mine_layout(), level(1, TileCoord::new(1, 2))).expect("valid level");

    let started = command(&mut world, move_player(Direction::Up));
    assert_eq!(
        started,
        vec![Event::MoveStarted {
            actor: ActorId::Player,
            from: TileCoord::new(1, 2),
            to: TileCoord::new(1, 1),
        }]
    );

    let mut events = Vec::new();
    for _ in 0..8 {
        events.extend(tick(&mut world, FRAME));
    }

    assert!(events.contains(&Event::MineDetonated {
        tile: TileCoord::new(1, 1),
    }));
    assert!(events.contains(&Event::PlayerDamaged {
        amount: 7,
        energy: 3,
    }));
    let player = query::player(&world);
    assert_eq!(player.tile, TileCoord::new(1, 1));
    assert!(player.invincible);
    assert_eq!(query::remaining_armed_count(&world), 0);
    assert_eq!(
        query::grid(&world).mine_cell(TileCoord::new(1, 1)),
        Some(MineCell::Free(0))
    );
}

#[test]
fn obstacle_moves_never_shift_the_player() {
    let mut world =
        World::load(single_mine_layout(), level(0, TileCoord::new(0, 2))).expect("valid level");

    let blocked = command(&mut world, move_player(Direction::Up));
    assert_eq!(
        blocked,
        vec![Event::MoveBlocked {
            actor: ActorId::Player,
            direction: Direction::Up,
        }]
    );
    for _ in 0..10 {
        let _ = tick(&mut world, FRAME);
    }
    let player = query::player(&world);
    assert_eq!(player.tile, TileCoord::new(0, 2));
    assert!(!player.moving);
}

#[test]
fn completed_move_lands_on_destination_and_reveals() {
    let mut world = World::load(LevelLayout::open(6, 6), level(0, TileCoord::new(0, 5)))
        .expect("valid level");
    let _ = command(&mut world, move_player(Direction::Up));

    for step in 1..8 {
        let events = tick(&mut world, FRAME);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::MoveCompleted { .. })),
            "completed early at tick {step}"
        );
        assert_eq!(query::player(&world).tile, TileCoord::new(0, 5));
    }

    let events = tick(&mut world, FRAME);
    assert!(events.contains(&Event::MoveCompleted {
        actor: ActorId::Player,
        tile: TileCoord::new(0, 4),
    }));
    assert!(events.contains(&Event::TilesRevealed {
        center: TileCoord::new(0, 4),
    }));
    let player = query::player(&world);
    assert_eq!(player.tile, TileCoord::new(0, 4));
    assert_eq!(player.render_position.y, 64.0);
    assert!(query::grid(&world).is_revealed(TileCoord::new(1, 3)));
}

#[test]
fn joystick_turns_take_longer() {
    let mut world = World::load(LevelLayout::open(6, 6), level(0, TileCoord::new(2, 2)))
        .expect("valid level");
    let joystick = Command::MovePlayer {
        direction: Direction::Right,
        device: InputDevice::Joystick,
    };

    let mut started_after = None;
    for frame in 0..10 {
        let events = command(&mut world, joystick.clone());
        if events
            .iter()
            .any(|event| matches!(event, Event::MoveStarted { .. }))
        {
            started_after = Some(frame);
            break;
        }
        let _ = tick(&mut world, FRAME);
    }

    assert_eq!(started_after, Some(6));
}

#[test]
fn fragile_enemy_dies_and_stops_colliding() {
    let mut config = level(0, TileCoord::new(1, 1));
    config
        .enemies
        .push(enemy(MovementKind::RandomWalk, TileCoord::new(1, 1), 1));
    let mut world = World::load(LevelLayout::open(4, 4), config).expect("valid level");
    let id = EnemyId::new(0);

    let events = command(&mut world, Command::HitEnemy { enemy: id });
    assert_eq!(
        events,
        vec![Event::EnemyDied {
            enemy: id,
            at: Duration::ZERO,
        }]
    );

    let view = query::enemy_view(&world);
    assert!(view.get(id).expect("enemy exists").is_dead);
    assert_eq!(view.alive().count(), 0);

    let events = tick(&mut world, FRAME);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerDamaged { .. })));
    assert_eq!(query::player(&world).energy, 10);

    let stepped = command(
        &mut world,
        Command::StepEnemy {
            enemy: id,
            direction: Direction::Right,
        },
    );
    assert!(stepped.is_empty());

    let revived = command(&mut world, Command::RespawnEnemy { enemy: id });
    assert_eq!(
        revived,
        vec![Event::EnemyRespawned {
            enemy: id,
            tile: TileCoord::new(1, 1),
        }]
    );
    assert_eq!(query::enemy_view(&world).alive().count(), 1);
}

#[test]
fn enemy_contact_respects_invincibility() {
    let mut config = level(0, TileCoord::new(1, 1));
    config
        .enemies
        .push(enemy(MovementKind::Chaser, TileCoord::new(1, 1), 3));
    let mut world = World::load(LevelLayout::open(4, 4), config).expect("valid level");

    let events = tick(&mut world, FRAME);
    assert!(events.contains(&Event::PlayerDamaged {
        amount: 2,
        energy: 8,
    }));

    let events = tick(&mut world, Duration::from_secs(1));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerDamaged { .. })));
    assert!(query::player(&world).invincible);

    let events = tick(&mut world, Duration::from_secs(2));
    assert!(events.contains(&Event::InvincibilityExpired));
    assert!(events.contains(&Event::PlayerDamaged {
        amount: 2,
        energy: 6,
    }));
}

#[test]
fn killing_terrain_drains_energy_until_depleted() {
    let mut layout = LevelLayout::open(4, 4);
    layout.set(TileCoord::new(0, 0), TileKind::Hazard);
    let mut world = World::load(layout, level(0, TileCoord::new(0, 0))).expect("valid level");

    for _ in 0..10 {
        let _ = tick(&mut world, Duration::from_millis(2_500));
    }

    assert_eq!(query::player(&world).energy, 0);
    assert_eq!(query::level_status(&world), LevelStatus::EnergyDepleted);
    assert!(command(&mut world, move_player(Direction::Down)).is_empty());
}

#[test]
fn shot_travels_and_hits_the_first_enemy() {
    let mut config = level(0, TileCoord::new(1, 4));
    config
        .enemies
        .push(enemy(MovementKind::RandomWalk, TileCoord::new(1, 1), 1));
    let mut world = World::load(LevelLayout::open(3, 6), config).expect("valid level");

    let fired = command(&mut world, Command::Fire);
    assert_eq!(
        fired,
        vec![Event::ShotFired {
            direction: Direction::Up,
        }]
    );
    assert!(command(&mut world, Command::Fire).is_empty());
    assert_eq!(query::player(&world).ammo, 2);

    let mut events = Vec::new();
    for _ in 0..12 {
        events.extend(tick(&mut world, FRAME));
    }

    assert!(events.contains(&Event::ShotExpired));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyDied { enemy, .. } if *enemy == EnemyId::new(0))));
    assert_eq!(query::shot_position(&world), None);
    assert_eq!(query::player(&world).score, 50);
}

#[test]
fn firing_without_ammo_reports_it() {
    let mut config = level(0, TileCoord::new(0, 0));
    config.ammo = 0;
    let mut world = World::load(LevelLayout::open(3, 3), config).expect("valid level");

    assert_eq!(command(&mut world, Command::Fire), vec![Event::OutOfAmmo]);
}

#[test]
fn empty_beacon_budget_ends_the_level() {
    let mut config = level(3, TileCoord::new(0, 5));
    config.beacons = 0;
    let world = World::load(LevelLayout::open(6, 6), config).expect("valid level");
    assert_eq!(query::level_status(&world), LevelStatus::BeaconsExhausted);
}

#[test]
fn beacon_requests_wait_for_the_move_to_finish() {
    let mut world =
        World::load(single_mine_layout(), level(1, TileCoord::new(1, 3))).expect("valid level");
    let _ = command(&mut world, move_player(Direction::Up));
    let _ = tick(&mut world, FRAME);

    assert!(query::player(&world).moving);
    assert!(command(&mut world, Command::PlaceBeacon).is_empty());
    assert_eq!(query::remaining_beacons(&world), 4);

    for _ in 0..7 {
        let _ = tick(&mut world, FRAME);
    }
    assert_eq!(query::player(&world).tile, TileCoord::new(1, 2));
    assert_eq!(
        command(&mut world, Command::PlaceBeacon),
        vec![Event::BeaconPlaced {
            tile: Some(TileCoord::new(1, 1)),
            outcome: BeaconOutcome::CorrectFlag,
        }]
    );
}

/// Loads a 4x4 level with one pickup under the player and runs a tick.
fn collect_on_spawn(layout: LevelLayout, kind: PickupKind) -> (Vec<Event>, PlayerSnapshot) {
    let spawn = TileCoord::new(1, 1);
    let mut config = level(0, spawn);
    config.pickups.push(Pickup { kind, tile: spawn });
    let mut world = World::load(layout, config).expect("valid level");

    let events = tick(&mut world, FRAME);
    assert!(events.contains(&Event::PickupCollected {
        pickup: Pickup { kind, tile: spawn },
    }));
    assert!(query::pickups(&world).is_empty());
    (events, query::player(&world))
}

#[test]
fn life_pickup_refills_energy() {
    let mut layout = LevelLayout::open(4, 4);
    layout.set(TileCoord::new(1, 1), TileKind::Hazard);
    let (events, player) = collect_on_spawn(layout, PickupKind::Life);

    assert!(events.contains(&Event::PlayerDamaged {
        amount: 1,
        energy: 9,
    }));
    assert_eq!(player.energy, 10);
}

#[test]
fn shield_pickup_grants_invincibility() {
    let (_, player) = collect_on_spawn(LevelLayout::open(4, 4), PickupKind::Shield);
    assert!(player.invincible);
    assert_eq!(player.energy, 10);
}

#[test]
fn ammo_pickup_adds_a_round() {
    let (_, player) = collect_on_spawn(LevelLayout::open(4, 4), PickupKind::Ammo);
    assert_eq!(player.ammo, 23);
}

#[test]
fn bonus_pickups_add_to_the_score() {
    for kind in PickupKind::SCORE {
        let (_, player) = collect_on_spawn(LevelLayout::open(4, 4), kind);
        assert_eq!(player.score, kind.points(), "{kind:?}");
    }
}

#[test]
fn collected_bonus_is_replaced_away_from_the_player() {
    let mut config = level(0, TileCoord::new(0, 0));
    config.score_pickups = true;
    let mut world = World::load(LevelLayout::open(2, 1), config).expect("valid level");

    let placed = query::pickups(&world).to_vec();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].tile, TileCoord::new(1, 0));
    assert!(placed[0].kind.is_score());

    let mut events = Vec::new();
    for _ in 0..12 {
        events.extend(command(&mut world, move_player(Direction::Right)));
        events.extend(tick(&mut world, FRAME));
    }

    assert_eq!(query::player(&world).tile, TileCoord::new(1, 0));
    assert!(events.contains(&Event::PickupCollected { pickup: placed[0] }));
    assert_eq!(query::player(&world).score, placed[0].kind.points());
    let respawned: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::PickupSpawned { pickup } => Some(pickup.tile),
            _ => None,
        })
        .collect();
    assert_eq!(respawned, vec![TileCoord::new(0, 0)]);
    assert_eq!(query::pickups(&world).len(), 1);
}
