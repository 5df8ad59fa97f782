#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour system that turns ticks into enemy step commands.
//!
//! Every enemy runs one of three state machines selected by its movement
//! kind. The machines only decide directions; the world owns movement and
//! reports back through `MoveCompleted` and `MoveBlocked` events.

use std::collections::BTreeMap;

use mine_squad_core::{
    ActorId, Axis, Command, Direction, EnemyId, EnemySnapshot, EnemyView, Event, MovementKind,
    TileCoord,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_RNG_SEED: u64 = 0x6d69_6e65_5f73_7164;
const DEFAULT_RANDOM_WALK_PAUSE_TICKS: u32 = 30;
const DEFAULT_CHASER_PAUSE_TICKS: u32 = 20;
const DEFAULT_ACTIVATION_RADIUS_SQUARED: u32 = 25;

/// Configuration parameters required to construct the behaviour system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    rng_seed: u64,
    random_walk_pause_ticks: u32,
    chaser_pause_ticks: u32,
    activation_radius_squared: u32,
}

impl Config {
    /// Creates a new configuration from a seed, both pause lengths and the
    /// squared chaser activation radius in tiles.
    #[must_use]
    pub const fn new(
        rng_seed: u64,
        random_walk_pause_ticks: u32,
        chaser_pause_ticks: u32,
        activation_radius_squared: u32,
    ) -> Self {
        Self {
            rng_seed,
            random_walk_pause_ticks,
            chaser_pause_ticks,
            activation_radius_squared,
        }
    }

    /// Returns a copy of the configuration using a different RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_RNG_SEED,
            DEFAULT_RANDOM_WALK_PAUSE_TICKS,
            DEFAULT_CHASER_PAUSE_TICKS,
            DEFAULT_ACTIVATION_RADIUS_SQUARED,
        )
    }
}

/// Coarse state of an enemy's state machine, exposed for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// A patrol walking between its bounds.
    Patrolling,
    /// Counting down before the next decision.
    Paused,
    /// Waiting for a committed step to finish.
    Moving,
    /// A chaser whose target is out of range.
    Inactive,
}

/// Pure system that decides where every live enemy steps next.
#[derive(Debug)]
pub struct Behavior {
    config: Config,
    brains: BTreeMap<EnemyId, Brain>,
    rng: ChaCha8Rng,
}

impl Behavior {
    /// Creates a new behaviour system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            brains: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and the enemy view to emit step commands.
    ///
    /// `can_move` reports the tile an enemy on `from` would reach by stepping
    /// in a direction, or `None` when the world would block the step. A
    /// decision pass runs once per `TimeAdvanced` event.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        player: TileCoord,
        can_move: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(TileCoord, Direction) -> Option<TileCoord>,
    {
        let mut passes = 0_usize;
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => passes += 1,
                Event::MoveCompleted {
                    actor: ActorId::Enemy(id),
                    ..
                }
                | Event::MoveBlocked {
                    actor: ActorId::Enemy(id),
                    ..
                } => {
                    if let Some(brain) = self.brains.get_mut(id) {
                        brain.finish_move();
                    }
                }
                Event::EnemyRespawned { enemy, .. } => {
                    let _ = self.brains.remove(enemy);
                }
                _ => {}
            }
        }

        let Self {
            config,
            brains,
            rng,
        } = self;

        for _ in 0..passes {
            for enemy in enemies.alive() {
                let brain = brains
                    .entry(enemy.id)
                    .or_insert_with(|| Brain::new(enemy.kind));
                if let Some(direction) = brain.advance(enemy, player, config, rng, &can_move) {
                    out.push(Command::StepEnemy {
                        enemy: enemy.id,
                        direction,
                    });
                }
            }
        }
    }

    /// Current phase of an enemy, once its state machine has been created.
    #[must_use]
    pub fn phase(&self, enemy: EnemyId) -> Option<Phase> {
        self.brains.get(&enemy).map(Brain::phase)
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Brain {
    Patrol(Patrol),
    RandomWalk(Walk),
    Chaser(Chase),
}

impl Brain {
    fn new(kind: MovementKind) -> Self {
        match kind {
            MovementKind::Patrol {
                axis,
                bound_a,
                bound_b,
            } => Self::Patrol(Patrol::new(axis, bound_a, bound_b)),
            MovementKind::RandomWalk => Self::RandomWalk(Walk::Paused { elapsed: 0 }),
            MovementKind::Chaser => Self::Chaser(Chase::Inactive),
        }
    }

    fn phase(&self) -> Phase {
        match self {
            Self::Patrol(_) => Phase::Patrolling,
            Self::RandomWalk(Walk::Paused { .. }) | Self::Chaser(Chase::Paused { .. }) => {
                Phase::Paused
            }
            Self::RandomWalk(Walk::Moving) | Self::Chaser(Chase::Moving) => Phase::Moving,
            Self::Chaser(Chase::Inactive) => Phase::Inactive,
        }
    }

    fn finish_move(&mut self) {
        match self {
            Self::RandomWalk(walk @ Walk::Moving) => *walk = Walk::Paused { elapsed: 0 },
            Self::Chaser(chase @ Chase::Moving) => *chase = Chase::Paused { elapsed: 0 },
            _ => {}
        }
    }

    fn advance<F>(
        &mut self,
        enemy: &EnemySnapshot,
        player: TileCoord,
        config: &Config,
        rng: &mut ChaCha8Rng,
        can_move: &F,
    ) -> Option<Direction>
    where
        F: Fn(TileCoord, Direction) -> Option<TileCoord>,
    {
        match self {
            Self::Patrol(patrol) => patrol.advance(enemy),
            Self::RandomWalk(walk) => walk.advance(enemy, config, rng, can_move),
            Self::Chaser(chase) => chase.advance(enemy, player, config, can_move),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Patrol {
    axis: Axis,
    low: u32,
    high: u32,
    heading: i32,
}

impl Patrol {
    fn new(axis: Axis, bound_a: u32, bound_b: u32) -> Self {
        let heading = match bound_b.cmp(&bound_a) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        };
        Self {
            axis,
            low: bound_a.min(bound_b),
            high: bound_a.max(bound_b),
            heading,
        }
    }

    fn advance(&mut self, enemy: &EnemySnapshot) -> Option<Direction> {
        if enemy.moving || self.heading == 0 {
            return None;
        }
        let position = enemy.tile.along(self.axis);
        if position <= self.low {
            self.heading = 1;
        } else if position >= self.high {
            self.heading = -1;
        }
        Direction::along(self.axis, self.heading)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Walk {
    Paused { elapsed: u32 },
    Moving,
}

impl Walk {
    fn advance<F>(
        &mut self,
        enemy: &EnemySnapshot,
        config: &Config,
        rng: &mut ChaCha8Rng,
        can_move: &F,
    ) -> Option<Direction>
    where
        F: Fn(TileCoord, Direction) -> Option<TileCoord>,
    {
        let Self::Paused { elapsed } = self else {
            return None;
        };
        if enemy.moving {
            return None;
        }
        *elapsed = elapsed.saturating_add(1);
        if *elapsed < config.random_walk_pause_ticks {
            return None;
        }

        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        match directions
            .into_iter()
            .find(|direction| can_move(enemy.tile, *direction).is_some())
        {
            Some(direction) => {
                *self = Self::Moving;
                Some(direction)
            }
            None => {
                log::debug!("enemy {} has nowhere to walk", enemy.id.get());
                *elapsed = 0;
                None
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Chase {
    Inactive,
    Paused { elapsed: u32 },
    Moving,
}

impl Chase {
    fn advance<F>(
        &mut self,
        enemy: &EnemySnapshot,
        player: TileCoord,
        config: &Config,
        can_move: &F,
    ) -> Option<Direction>
    where
        F: Fn(TileCoord, Direction) -> Option<TileCoord>,
    {
        let in_range = enemy.tile.squared_distance(player) <= config.activation_radius_squared;
        match (*self, in_range) {
            (Self::Inactive, false) | (Self::Moving, true) => None,
            (Self::Inactive, true) => {
                log::debug!("chaser {} activated", enemy.id.get());
                *self = Self::Paused { elapsed: 0 };
                None
            }
            (Self::Paused { .. } | Self::Moving, false) => {
                log::debug!("chaser {} lost its target", enemy.id.get());
                *self = Self::Inactive;
                None
            }
            (Self::Paused { elapsed }, true) => {
                if enemy.moving {
                    return None;
                }
                let elapsed = elapsed.saturating_add(1);
                if elapsed < config.chaser_pause_ticks {
                    *self = Self::Paused { elapsed };
                    return None;
                }
                match pursue(enemy, player, can_move) {
                    Some(direction) => {
                        *self = Self::Moving;
                        Some(direction)
                    }
                    None => {
                        *self = Self::Paused { elapsed: 0 };
                        None
                    }
                }
            }
        }
    }
}

/// Picks a step toward the player along the axis with the larger gap, then
/// the other axis. Equal gaps prefer the horizontal axis.
fn pursue<F>(enemy: &EnemySnapshot, player: TileCoord, can_move: &F) -> Option<Direction>
where
    F: Fn(TileCoord, Direction) -> Option<TileCoord>,
{
    let origin = enemy.render_position.nearest_tile();
    let (dx, dy) = origin.delta_to(player);
    let candidates = if dx.abs() >= dy.abs() {
        [
            Direction::along(Axis::Horizontal, dx),
            Direction::along(Axis::Vertical, dy),
        ]
    } else {
        [
            Direction::along(Axis::Vertical, dy),
            Direction::along(Axis::Horizontal, dx),
        ]
    };
    candidates
        .into_iter()
        .flatten()
        .find(|direction| can_move(origin, *direction).is_some())
}
