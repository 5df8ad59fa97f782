use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use mine_squad_core::{
    Axis, Command, Direction, EnemySpawn, Event, Health, LevelConfig, LevelLayout, MovementKind,
    TileCoord, TileKind,
};
use mine_squad_system_behavior::{Behavior, Config};
use mine_squad_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(0x5eed);
    let second = replay(0x5eed);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::MoveCompleted { .. })),
        "enemies never moved"
    );
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut world = level();
    let mut behavior = Behavior::new(Config::default().with_seed(seed));
    let mut log = Vec::new();

    for frame in 0..600_u32 {
        let mut events = Vec::new();
        if frame % 90 == 45 {
            world::apply(
                &mut world,
                Command::MovePlayer {
                    direction: Direction::Up,
                    device: Default::default(),
                },
                &mut events,
            );
        }
        world::apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        process_behavior(&mut world, &mut behavior, events, &mut log);
    }

    let enemies = query::enemy_view(&world)
        .into_vec()
        .into_iter()
        .map(|enemy| (enemy.id.get(), enemy.tile, enemy.facing))
        .collect();

    ReplayOutcome {
        enemies,
        events: log,
    }
}

fn process_behavior(
    world: &mut World,
    behavior: &mut Behavior,
    pending_events: Vec<Event>,
    log: &mut Vec<Event>,
) {
    let mut events = pending_events;

    while !events.is_empty() {
        let view = query::enemy_view(world);
        let player = query::player(world).tile;
        let mut commands = Vec::new();
        {
            let snapshot: &World = world;
            behavior.handle(
                &events,
                &view,
                player,
                |from, direction| query::probe_move(snapshot, from, direction),
                &mut commands,
            );
        }
        log.append(&mut events);

        for command in commands {
            world::apply(world, command, &mut events);
        }
    }
}

fn level() -> World {
    let mut layout = LevelLayout::open(9, 9);
    for tile in [
        TileCoord::new(4, 3),
        TileCoord::new(4, 4),
        TileCoord::new(2, 6),
    ] {
        layout.set(tile, TileKind::Obstacle);
    }

    World::load(
        layout,
        LevelConfig {
            armed_mines: 0,
            beacons: 1,
            ammo: 0,
            player_spawn: TileCoord::new(8, 8),
            seed: 3,
            enemies: vec![
                EnemySpawn {
                    kind: MovementKind::RandomWalk,
                    spawn: TileCoord::new(1, 1),
                    health: Health::new(1),
                    move_duration: 6,
                },
                EnemySpawn {
                    kind: MovementKind::RandomWalk,
                    spawn: TileCoord::new(6, 2),
                    health: Health::new(1),
                    move_duration: 9,
                },
                EnemySpawn {
                    kind: MovementKind::Patrol {
                        axis: Axis::Vertical,
                        bound_a: 0,
                        bound_b: 5,
                    },
                    spawn: TileCoord::new(0, 0),
                    health: Health::new(2),
                    move_duration: 8,
                },
                EnemySpawn {
                    kind: MovementKind::Chaser,
                    spawn: TileCoord::new(7, 5),
                    health: Health::new(3),
                    move_duration: 12,
                },
            ],
            pickups: Vec::new(),
            score_pickups: true,
        },
    )
    .expect("valid level")
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    enemies: Vec<(u32, TileCoord, Direction)>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
