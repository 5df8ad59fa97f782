#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Respawn scheduling system that revives dead enemies once it is safe.

use std::{collections::BTreeMap, time::Duration};

use mine_squad_core::{Command, EnemyId, EnemyView, Event, TileCoord};

const DEFAULT_RESPAWN_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_SAFE_DISTANCE: u32 = 4;

/// Configuration parameters required to construct the lifecycle system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    respawn_delay: Duration,
    safe_distance: u32,
}

impl Config {
    /// Creates a new configuration from the minimum time an enemy stays dead
    /// and the Manhattan tile distance the player must keep from its spawn.
    #[must_use]
    pub const fn new(respawn_delay: Duration, safe_distance: u32) -> Self {
        Self {
            respawn_delay,
            safe_distance,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RESPAWN_DELAY, DEFAULT_SAFE_DISTANCE)
    }
}

/// Pure system that emits respawn commands for dead enemies.
#[derive(Debug)]
pub struct Lifecycle {
    config: Config,
    deaths: BTreeMap<EnemyId, Duration>,
    now: Duration,
}

impl Lifecycle {
    /// Creates a new lifecycle system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            deaths: BTreeMap::new(),
            now: Duration::ZERO,
        }
    }

    /// Consumes world events and the enemy view to emit respawn commands.
    ///
    /// An enemy is revived once it has been dead for the respawn delay and the
    /// player stands farther than the safe distance from its spawn tile. Until
    /// both hold the check is repeated on every tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        player: TileCoord,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        for event in events {
            match event {
                Event::TimeAdvanced { now, .. } => {
                    self.now = *now;
                    ticked = true;
                }
                Event::EnemyDied { enemy, at } => {
                    let _ = self.deaths.insert(*enemy, *at);
                }
                Event::EnemyRespawned { enemy, .. } => {
                    let _ = self.deaths.remove(enemy);
                }
                _ => {}
            }
        }

        if !ticked {
            return;
        }

        for (&enemy, &died_at) in &self.deaths {
            if self.now.saturating_sub(died_at) < self.config.respawn_delay {
                continue;
            }
            let Some(snapshot) = enemies.get(enemy) else {
                continue;
            };
            if player.manhattan_distance(snapshot.spawn) <= self.config.safe_distance {
                log::debug!("enemy {} waits for the player to leave", enemy.get());
                continue;
            }
            out.push(Command::RespawnEnemy { enemy });
        }
    }

    /// Number of dead enemies waiting to be revived.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.deaths.len()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
