#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Mine Squad.

mod actors;
mod beacon;
mod error;
mod grid;
mod minefield;
mod motion;
mod pickups;
mod projectile;

use std::time::Duration;

use mine_squad_core::{
    ActorId, Axis, Command, Direction, EnemyId, Event, InputDevice, LevelConfig, LevelLayout,
    MovementKind, Pickup, RenderPosition, TileCoord, TileKind, TILE_SIZE,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use actors::{Enemy, HitOutcome, Player};
use motion::BeginMove;
use projectile::Shot;

pub use error::LevelError;
pub use grid::GridMap;

/// Energy lost when the player steps on an armed mine.
const MINE_BLAST_DAMAGE: u32 = 7;
/// Energy lost per contact with killing terrain.
const TERRAIN_DAMAGE: u32 = 1;
/// Energy lost when a live enemy touches the player.
const CONTACT_DAMAGE: u32 = 2;
/// Fraction of a tile two actors' boxes must share to touch.
const CONTACT_RATIO: f32 = 0.6;

/// Represents the authoritative Mine Squad world state.
#[derive(Debug)]
pub struct World {
    grid: GridMap,
    player: Player,
    enemies: Vec<Enemy>,
    shot: Option<Shot>,
    pickups: Vec<Pickup>,
    score_pickups: bool,
    rng: ChaCha8Rng,
    beacons: u32,
    tick_index: u64,
    clock: Duration,
}

impl World {
    /// Validates the level description, generates its minefield and places
    /// every actor on its spawn tile.
    pub fn load(layout: LevelLayout, config: LevelConfig) -> Result<Self, LevelError> {
        validate(&layout, &config)?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut grid = GridMap::generate(&layout, config.armed_mines, config.player_spawn, &mut rng)?;
        grid.mark_visited(config.player_spawn);

        let enemies = config
            .enemies
            .iter()
            .enumerate()
            .map(|(index, spawn)| Enemy::new(enemy_id(index), *spawn))
            .collect::<Vec<_>>();

        log::info!(
            "loaded {}x{} level: {} mines, {} beacons, {} enemies",
            layout.columns,
            layout.rows,
            config.armed_mines,
            config.beacons,
            enemies.len()
        );

        let mut world = Self {
            grid,
            player: Player::new(config.player_spawn, config.ammo),
            enemies,
            shot: None,
            pickups: config.pickups,
            score_pickups: config.score_pickups,
            rng,
            beacons: config.beacons,
            tick_index: 0,
            clock: Duration::ZERO,
        };
        let _ = world.restock_pickups();
        Ok(world)
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        let index = usize::try_from(id.get()).ok()?;
        self.enemies.get_mut(index)
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
            dt,
            now: self.clock,
        });
    }

    fn advance_player(&mut self, out_events: &mut Vec<Event>) {
        let Some(tile) = self.player.motion.advance(1) else {
            return;
        };
        out_events.push(Event::MoveCompleted {
            actor: ActorId::Player,
            tile,
        });
        self.grid.mark_visited(tile);
        out_events.push(Event::TilesRevealed { center: tile });

        if self.grid.detonate(tile) {
            log::debug!("mine detonated at ({}, {})", tile.column(), tile.row());
            out_events.push(Event::MineDetonated { tile });
            let energy = self.player.force_damage(MINE_BLAST_DAMAGE, self.clock);
            out_events.push(Event::PlayerDamaged {
                amount: MINE_BLAST_DAMAGE,
                energy,
            });
        }
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.iter_mut().filter(|enemy| !enemy.is_dead()) {
            if let Some(tile) = enemy.motion.advance(1) {
                out_events.push(Event::MoveCompleted {
                    actor: ActorId::Enemy(enemy.id()),
                    tile,
                });
            }
        }
    }

    fn advance_shot(&mut self, out_events: &mut Vec<Event>) {
        let Some(mut shot) = self.shot.take() else {
            return;
        };
        shot.advance();

        let struck = self
            .enemies
            .iter()
            .filter(|enemy| !enemy.is_dead())
            .find(|enemy| shot.overlaps(enemy.motion.render_position()))
            .map(Enemy::id);

        if let Some(enemy) = struck {
            out_events.push(Event::ShotExpired);
            self.hit_enemy(enemy, out_events);
        } else if shot.is_inside(&self.grid) {
            self.shot = Some(shot);
        } else {
            out_events.push(Event::ShotExpired);
        }
    }

    fn resolve_contacts(&mut self, out_events: &mut Vec<Event>) {
        if self.player.expire_invincibility(self.clock) {
            out_events.push(Event::InvincibilityExpired);
        }

        let on_terrain = self.grid.static_tile_kind(self.player.motion.tile()) == TileKind::Hazard;
        if on_terrain {
            self.damage_player(TERRAIN_DAMAGE, out_events);
        }

        let player = self.player.motion.render_position();
        let touched = self
            .enemies
            .iter()
            .filter(|enemy| !enemy.is_dead())
            .any(|enemy| in_contact(enemy.motion.render_position(), player));
        if touched {
            self.damage_player(CONTACT_DAMAGE, out_events);
        }
    }

    /// Consumes the first pickup the player touches. A spent player collects
    /// nothing.
    fn collect_pickups(&mut self, out_events: &mut Vec<Event>) {
        if self.player.energy() == 0 {
            return;
        }
        let player = self.player.motion.render_position();
        let Some(index) = self
            .pickups
            .iter()
            .position(|pickup| in_contact(tile_position(pickup.tile), player))
        else {
            return;
        };

        let pickup = self.pickups.remove(index);
        self.player.collect(pickup.kind, self.clock);
        log::debug!(
            "collected {:?} at ({}, {})",
            pickup.kind,
            pickup.tile.column(),
            pickup.tile.row()
        );
        out_events.push(Event::PickupCollected { pickup });
    }

    /// Drops a new bonus item when the level keeps one on the map and none is
    /// left.
    fn restock_pickups(&mut self) -> Option<Pickup> {
        if !self.score_pickups || self.pickups.iter().any(|pickup| pickup.kind.is_score()) {
            return None;
        }
        let occupied: Vec<TileCoord> = self
            .pickups
            .iter()
            .map(|pickup| pickup.tile)
            .chain([
                self.player.motion.tile(),
                self.player.motion.render_position().nearest_tile(),
            ])
            .collect();
        let pickup = pickups::spawn_score_pickup(&self.grid, &occupied, &mut self.rng)?;
        self.pickups.push(pickup);
        Some(pickup)
    }

    fn damage_player(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if let Some(energy) = self.player.damage(amount, self.clock) {
            out_events.push(Event::PlayerDamaged { amount, energy });
        }
    }

    fn move_player(&mut self, direction: Direction, device: InputDevice, out_events: &mut Vec<Event>) {
        let facing = self.player.motion.facing();
        let outcome = self
            .player
            .motion
            .try_begin(direction, &self.grid, device.turn_delay_ticks());
        match outcome {
            BeginMove::Started { from, to } => out_events.push(Event::MoveStarted {
                actor: ActorId::Player,
                from,
                to,
            }),
            BeginMove::Blocked => out_events.push(Event::MoveBlocked {
                actor: ActorId::Player,
                direction,
            }),
            BeginMove::Turning if facing != direction => {
                out_events.push(Event::PlayerTurned { facing: direction });
            }
            BeginMove::Turning | BeginMove::Busy => {}
        }
    }

    fn place_beacon(&mut self, out_events: &mut Vec<Event>) {
        if self.player.motion.is_moving() {
            return;
        }
        let (tile, outcome) = beacon::place_beacon(
            &mut self.grid,
            self.player.motion.tile(),
            self.player.motion.facing(),
            &mut self.beacons,
        );
        out_events.push(Event::BeaconPlaced { tile, outcome });
    }

    fn fire(&mut self, out_events: &mut Vec<Event>) {
        if self.shot.is_some() {
            return;
        }
        if !self.player.take_ammo() {
            out_events.push(Event::OutOfAmmo);
            return;
        }
        let direction = self.player.motion.facing();
        self.shot = Some(Shot::fired_from(
            self.player.motion.render_position(),
            direction,
        ));
        out_events.push(Event::ShotFired { direction });
    }

    fn step_enemy(&mut self, id: EnemyId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(index) = usize::try_from(id.get()).ok().filter(|index| *index < self.enemies.len())
        else {
            log::warn!("step requested for unknown enemy {}", id.get());
            return;
        };
        let enemy = &mut self.enemies[index];
        if enemy.is_dead() {
            return;
        }
        match enemy.motion.try_begin(direction, &self.grid, 0) {
            BeginMove::Started { from, to } => out_events.push(Event::MoveStarted {
                actor: ActorId::Enemy(id),
                from,
                to,
            }),
            BeginMove::Blocked => out_events.push(Event::MoveBlocked {
                actor: ActorId::Enemy(id),
                direction,
            }),
            BeginMove::Turning | BeginMove::Busy => {}
        }
    }

    fn hit_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let now = self.clock;
        let Some(enemy) = self.enemy_mut(id) else {
            log::warn!("hit requested for unknown enemy {}", id.get());
            return;
        };
        let outcome = enemy.hit(now);
        if outcome != HitOutcome::Ignored {
            let points = enemy.kind().score_per_hit();
            self.player.add_score(points);
        }
        match outcome {
            HitOutcome::Wounded(health) => out_events.push(Event::EnemyHit { enemy: id, health }),
            HitOutcome::Died => {
                log::info!("enemy {} died", id.get());
                out_events.push(Event::EnemyDied { enemy: id, at: now });
            }
            HitOutcome::Ignored => {}
        }
    }

    fn respawn_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemy_mut(id) else {
            log::warn!("respawn requested for unknown enemy {}", id.get());
            return;
        };
        if enemy.respawn() {
            let tile = enemy.spawn_tile();
            log::info!("enemy {} respawned", id.get());
            out_events.push(Event::EnemyRespawned { enemy: id, tile });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Player intents are ignored once the player's energy is spent. Beacon
/// requests are also ignored while the player is crossing between tiles.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let player_alive = world.player.energy() > 0;
    match command {
        Command::Tick { dt } => {
            world.advance_clock(dt, out_events);
            world.advance_player(out_events);
            world.advance_enemies(out_events);
            world.advance_shot(out_events);
            world.resolve_contacts(out_events);
            world.collect_pickups(out_events);
            if let Some(pickup) = world.restock_pickups() {
                log::debug!("bonus {:?} appeared", pickup.kind);
                out_events.push(Event::PickupSpawned { pickup });
            }
        }
        Command::MovePlayer { direction, device } if player_alive => {
            world.move_player(direction, device, out_events);
        }
        Command::PlaceBeacon if player_alive => world.place_beacon(out_events),
        Command::Fire if player_alive => world.fire(out_events),
        Command::MovePlayer { .. } | Command::PlaceBeacon | Command::Fire => {}
        Command::StepEnemy { enemy, direction } => world.step_enemy(enemy, direction, out_events),
        Command::HitEnemy { enemy } => world.hit_enemy(enemy, out_events),
        Command::RespawnEnemy { enemy } => world.respawn_enemy(enemy, out_events),
    }
}

/// Whether two actor boxes share enough of a tile to touch.
fn in_contact(a: RenderPosition, b: RenderPosition) -> bool {
    let reach = TILE_SIZE as f32 * CONTACT_RATIO;
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}

fn tile_position(tile: TileCoord) -> RenderPosition {
    let (x, y) = tile.pixel_origin();
    RenderPosition {
        x: x as f32,
        y: y as f32,
    }
}

fn enemy_id(index: usize) -> EnemyId {
    EnemyId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

fn validate(layout: &LevelLayout, config: &LevelConfig) -> Result<(), LevelError> {
    minefield::check_dimensions(layout)?;

    let spawnable = |tile: TileCoord| {
        tile.column() < layout.columns
            && tile.row() < layout.rows
            && layout.tiles[tile.row() as usize * layout.columns as usize + tile.column() as usize]
                != TileKind::Obstacle
    };

    if !spawnable(config.player_spawn) {
        return Err(LevelError::InvalidSpawn {
            tile: config.player_spawn,
        });
    }

    for (index, enemy) in config.enemies.iter().enumerate() {
        if !spawnable(enemy.spawn) {
            return Err(LevelError::InvalidSpawn { tile: enemy.spawn });
        }
        if let MovementKind::Patrol {
            axis,
            bound_a,
            bound_b,
        } = enemy.kind
        {
            let extent = match axis {
                Axis::Horizontal => layout.columns,
                Axis::Vertical => layout.rows,
            };
            if bound_a >= extent || bound_b >= extent {
                return Err(LevelError::InvalidPatrol {
                    enemy: enemy_id(index),
                });
            }
        }
    }

    if let Some(pickup) = config.pickups.iter().find(|pickup| !spawnable(pickup.tile)) {
        return Err(LevelError::InvalidPickup { tile: pickup.tile });
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{GridMap, World};
    use mine_squad_core::{
        Direction, EnemyView, LevelStatus, MineCell, Pickup, PlayerSnapshot, TileCoord,
    };

    /// Provides read-only access to the tile and mine layers.
    #[must_use]
    pub fn grid(world: &World) -> &GridMap {
        &world.grid
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot(world.clock)
    }

    /// Captures a read-only view of every enemy, dead ones included.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Tile a mover on `from` would reach by stepping in `direction`, or `None`
    /// when the step is blocked.
    #[must_use]
    pub fn probe_move(world: &World, from: TileCoord, direction: Direction) -> Option<TileCoord> {
        super::motion::destination(&world.grid, from, direction)
    }

    /// Beacons the player may still place.
    #[must_use]
    pub fn remaining_beacons(world: &World) -> u32 {
        world.beacons
    }

    /// Armed mines still hidden in the level.
    #[must_use]
    pub fn remaining_armed_count(world: &World) -> u32 {
        world.grid.remaining_armed_count()
    }

    /// Mine-layer state of a tile, or `None` off the map.
    #[must_use]
    pub fn mine_state(world: &World, tile: TileCoord) -> Option<MineCell> {
        world.grid.mine_cell(tile)
    }

    /// Evaluates the level outcome.
    #[must_use]
    pub fn level_status(world: &World) -> LevelStatus {
        if world.player.energy() == 0 {
            LevelStatus::EnergyDepleted
        } else if world.grid.remaining_armed_count() == 0 {
            LevelStatus::Cleared
        } else if world.beacons == 0 {
            LevelStatus::BeaconsExhausted
        } else {
            LevelStatus::InProgress
        }
    }

    /// Pickups still lying on the map, in placement order.
    #[must_use]
    pub fn pickups(world: &World) -> &[Pickup] {
        &world.pickups
    }

    /// Pixel position of the shot in flight, if any.
    #[must_use]
    pub fn shot_position(world: &World) -> Option<(i32, i32)> {
        world.shot.map(|shot| shot.position())
    }

    /// Number of ticks processed since the level was loaded.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Accumulated world time.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }
}
