#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mine Squad engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intents, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Side length of a square tile measured in pixels.
pub const TILE_SIZE: i32 = 16;

/// Fixed simulation rate. One `Tick` command is issued per rendered frame.
pub const TICKS_PER_SECOND: u32 = 60;

/// Cardinal facing and movement directions shared by every actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a fixed, deterministic order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in tile space `(dx, dy)` associated with the direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Axis along which the direction travels.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// Direction that moves along `axis` with the sign of `delta`.
    ///
    /// Returns `None` for a zero delta.
    #[must_use]
    pub const fn along(axis: Axis, delta: i32) -> Option<Self> {
        match (axis, delta.signum()) {
            (Axis::Horizontal, 1) => Some(Self::Right),
            (Axis::Horizontal, -1) => Some(Self::Left),
            (Axis::Vertical, 1) => Some(Self::Down),
            (Axis::Vertical, -1) => Some(Self::Up),
            _ => None,
        }
    }
}

/// Coordinate axes of the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Columns, the x axis.
    Horizontal,
    /// Rows, the y axis.
    Vertical,
}

/// Location of a single tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Index of the tile along the provided axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.column,
            Axis::Vertical => self.row,
        }
    }

    /// Signed tile delta `(dx, dy)` from `self` to `other`.
    #[must_use]
    pub fn delta_to(self, other: TileCoord) -> (i32, i32) {
        (
            signed(other.column) - signed(self.column),
            signed(other.row) - signed(self.row),
        )
    }

    /// Squared euclidean distance between two tiles.
    #[must_use]
    pub fn squared_distance(self, other: TileCoord) -> u32 {
        let dx = self.column.abs_diff(other.column);
        let dy = self.row.abs_diff(other.row);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Neighbouring tile one step away, or `None` when it would underflow.
    ///
    /// The result is not bounds-checked against any map.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<TileCoord> {
        let (dx, dy) = direction.delta();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(TileCoord::new(column, row))
    }

    /// Pixel position of the tile's upper-left corner.
    #[must_use]
    pub fn pixel_origin(self) -> (i32, i32) {
        (signed(self.column) * TILE_SIZE, signed(self.row) * TILE_SIZE)
    }
}

fn signed(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Static per-tile behaviour, derived from the level art at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    /// Open floor.
    #[default]
    NoAction,
    /// Blocks every actor.
    Obstacle,
    /// Hurts the player on contact.
    Hazard,
}

/// Dynamic mine-layer state of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineCell {
    /// No mine. Carries the number of armed neighbours.
    Free(u8),
    /// Contains an active mine.
    Armed,
    /// A beacon was placed. `correct` records whether it defused a mine.
    Flagged {
        /// Whether the flagged tile contained an armed mine.
        correct: bool,
    },
}

impl MineCell {
    /// Reports whether the cell holds an active mine.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, Self::Armed)
    }

    /// Reports whether the cell carries a beacon marker.
    #[must_use]
    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged { .. })
    }
}

/// Result of a beacon placement request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeaconOutcome {
    /// The beacon landed on an armed mine and defused it.
    CorrectFlag,
    /// The beacon landed on a clear tile. The beacon is spent anyway.
    IncorrectFlag,
    /// The target tile already carries a beacon.
    AlreadyFlagged,
    /// The target tile lies outside the map.
    OutOfBounds,
    /// The target tile is an obstacle.
    Obstructed,
    /// The beacon budget is exhausted.
    NoBeaconsLeft,
}

impl BeaconOutcome {
    /// Reports whether the outcome spent a beacon from the budget.
    #[must_use]
    pub const fn consumed_beacon(self) -> bool {
        matches!(self, Self::CorrectFlag | Self::IncorrectFlag)
    }
}

/// Input source that produced a movement intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputDevice {
    /// Discrete key presses.
    #[default]
    Keyboard,
    /// Analog stick or pad.
    Joystick,
}

impl InputDevice {
    /// Ticks the player must wait after changing facing before moving.
    ///
    /// Analog input is noisier, so it pauses longer than key input.
    #[must_use]
    pub const fn turn_delay_ticks(self) -> u32 {
        match self {
            Self::Keyboard => 3,
            Self::Joystick => 6,
        }
    }
}

/// Unique identifier assigned to an enemy, in roster order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifies the actor an event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorId {
    /// The player character.
    Player,
    /// An enemy from the level roster.
    Enemy(EnemyId),
}

/// Remaining hit points of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Health after losing one hit point, saturating at zero.
    #[must_use]
    pub const fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

/// Movement behaviour selected for an enemy at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    /// Walks back and forth between two tile indices along one axis.
    Patrol {
        /// Axis of travel.
        axis: Axis,
        /// First bound, a tile index along `axis`.
        bound_a: u32,
        /// Second bound, a tile index along `axis`. The patrol sets off toward it.
        bound_b: u32,
    },
    /// Pauses, then steps a single tile in a random open direction.
    RandomWalk,
    /// Pursues the player while within the activation radius.
    Chaser,
}

impl MovementKind {
    /// Points the player earns for each shot that lands on an enemy of this kind.
    #[must_use]
    pub const fn score_per_hit(self) -> u32 {
        match self {
            Self::Patrol { .. } => 25,
            Self::RandomWalk => 50,
            Self::Chaser => 75,
        }
    }
}

/// Roster entry describing one enemy of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    /// Movement behaviour of the enemy.
    pub kind: MovementKind,
    /// Tile the enemy appears on, and respawns on.
    pub spawn: TileCoord,
    /// Hit points at spawn.
    pub health: Health,
    /// Ticks the enemy needs to cross one tile.
    pub move_duration: u32,
}

/// Static tile layer supplied by the level art.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Row-major tile behaviours, `columns * rows` entries.
    pub tiles: Vec<TileKind>,
}

impl LevelLayout {
    /// Creates a layout where every tile is open floor.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![TileKind::NoAction; count],
        }
    }

    /// Replaces the behaviour of a single tile. Out-of-range tiles are ignored.
    pub fn set(&mut self, tile: TileCoord, kind: TileKind) {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return;
        }
        let index = tile.row() as usize * self.columns as usize + tile.column() as usize;
        if let Some(slot) = self.tiles.get_mut(index) {
            *slot = kind;
        }
    }
}

/// Collectible items the player picks up by walking over them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Refills the player's energy.
    Life,
    /// Starts a fresh invincibility window.
    Shield,
    /// Adds a round of bullets.
    Ammo,
    /// Bonus item worth 50 points.
    Candy,
    /// Bonus item worth 75 points.
    Apple,
    /// Bonus item worth 100 points.
    Chocolate,
    /// Bonus item worth 200 points.
    Coin,
}

impl PickupKind {
    /// Bonus items in ascending value, the order used for weighted draws.
    pub const SCORE: [PickupKind; 4] = [
        PickupKind::Candy,
        PickupKind::Apple,
        PickupKind::Chocolate,
        PickupKind::Coin,
    ];

    /// Points awarded on pickup. Power-ups are worth nothing.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Candy => 50,
            Self::Apple => 75,
            Self::Chocolate => 100,
            Self::Coin => 200,
            Self::Life | Self::Shield | Self::Ammo => 0,
        }
    }

    /// Reports whether the item only adds to the score.
    #[must_use]
    pub const fn is_score(self) -> bool {
        self.points() > 0
    }
}

/// A pickup lying on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pickup {
    /// What the pickup does.
    pub kind: PickupKind,
    /// Tile the pickup lies on.
    pub tile: TileCoord,
}

/// Per-level tuning supplied alongside the layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Exact number of mines to arm.
    pub armed_mines: u32,
    /// Beacons available to the player.
    pub beacons: u32,
    /// Bullets available to the player.
    pub ammo: u32,
    /// Tile the player starts on.
    pub player_spawn: TileCoord,
    /// Seed for mine placement.
    pub seed: u64,
    /// Enemies of the level, in identifier order.
    pub enemies: Vec<EnemySpawn>,
    /// Pickups placed by the level art.
    pub pickups: Vec<Pickup>,
    /// Keeps one randomly placed bonus item on the map at all times.
    pub score_pickups: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one tick.
    Tick {
        /// Wall-clock time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player step one tile.
    MovePlayer {
        /// Direction of the requested step.
        direction: Direction,
        /// Device that produced the request, selecting the turn delay.
        device: InputDevice,
    },
    /// Requests a beacon on the tile in front of the player.
    PlaceBeacon,
    /// Requests that the player fire a shot along its facing.
    Fire,
    /// Requests that an enemy step one tile.
    StepEnemy {
        /// Enemy attempting to move.
        enemy: EnemyId,
        /// Direction of the attempted step.
        direction: Direction,
    },
    /// Deals one hit to an enemy.
    HitEnemy {
        /// Enemy that was hit.
        enemy: EnemyId,
    },
    /// Revives a dead enemy at its spawn tile.
    RespawnEnemy {
        /// Enemy to revive.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just ran, starting at one.
        tick: u64,
        /// Wall-clock time covered by the tick.
        dt: Duration,
        /// World clock after the tick.
        now: Duration,
    },
    /// The player changed facing and started a turn pause.
    PlayerTurned {
        /// New facing.
        facing: Direction,
    },
    /// An actor started a one-tile move.
    MoveStarted {
        /// Actor that moves.
        actor: ActorId,
        /// Tile the move starts from.
        from: TileCoord,
        /// Destination tile.
        to: TileCoord,
    },
    /// An actor bumped into an obstacle or the map edge.
    MoveBlocked {
        /// Actor that was blocked.
        actor: ActorId,
        /// Direction of the rejected step.
        direction: Direction,
    },
    /// An actor arrived on its destination tile.
    MoveCompleted {
        /// Actor that arrived.
        actor: ActorId,
        /// Tile the actor now occupies.
        tile: TileCoord,
    },
    /// The 3×3 neighbourhood around a tile was revealed.
    TilesRevealed {
        /// Centre of the revealed block.
        center: TileCoord,
    },
    /// A beacon request was resolved.
    BeaconPlaced {
        /// Targeted tile, when it lies on the map.
        tile: Option<TileCoord>,
        /// Result of the request.
        outcome: BeaconOutcome,
    },
    /// The player stepped on an armed mine.
    MineDetonated {
        /// Tile of the detonated mine.
        tile: TileCoord,
    },
    /// The player lost energy.
    PlayerDamaged {
        /// Energy removed.
        amount: u32,
        /// Energy left afterwards.
        energy: u32,
    },
    /// The player's invincibility window ran out.
    InvincibilityExpired,
    /// The player fired a shot.
    ShotFired {
        /// Travel direction of the shot.
        direction: Direction,
    },
    /// The shot in flight left the map or struck an enemy.
    ShotExpired,
    /// The player tried to fire without ammunition.
    OutOfAmmo,
    /// An enemy lost a hit point and survived.
    EnemyHit {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health left.
        health: Health,
    },
    /// An enemy ran out of health.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// World clock at the time of death.
        at: Duration,
    },
    /// The player walked over a pickup and consumed it.
    PickupCollected {
        /// Pickup that was consumed.
        pickup: Pickup,
    },
    /// A new bonus item appeared on the map.
    PickupSpawned {
        /// Pickup that appeared.
        pickup: Pickup,
    },
    /// A dead enemy was revived.
    EnemyRespawned {
        /// Enemy that came back.
        enemy: EnemyId,
        /// Tile it reappeared on.
        tile: TileCoord,
    },
}

/// Continuous pixel position used for presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderPosition {
    /// Horizontal pixel coordinate of the actor's upper-left corner.
    pub x: f32,
    /// Vertical pixel coordinate of the actor's upper-left corner.
    pub y: f32,
}

impl RenderPosition {
    /// Tile whose grid corner lies closest to the render position.
    #[must_use]
    pub fn nearest_tile(&self) -> TileCoord {
        let size = TILE_SIZE as f32;
        let column = (self.x / size).round().max(0.0);
        let row = (self.y / size).round().max(0.0);
        TileCoord::new(column as u32, row as u32)
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Logical tile of the player.
    pub tile: TileCoord,
    /// Interpolated pixel position.
    pub render_position: RenderPosition,
    /// Current facing.
    pub facing: Direction,
    /// Whether a one-tile move is in flight.
    pub moving: bool,
    /// Energy left.
    pub energy: u32,
    /// Bullets left.
    pub ammo: u32,
    /// Points collected so far.
    pub score: u32,
    /// Whether damage is currently ignored.
    pub invincible: bool,
    /// Whether the sprite should be drawn this frame (blinks while invincible).
    pub visible: bool,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Movement behaviour fixed at spawn.
    pub kind: MovementKind,
    /// Logical tile of the enemy.
    pub tile: TileCoord,
    /// Tile the enemy respawns on.
    pub spawn: TileCoord,
    /// Interpolated pixel position.
    pub render_position: RenderPosition,
    /// Current facing.
    pub facing: Direction,
    /// Whether a one-tile move is in flight.
    pub moving: bool,
    /// Hit points left.
    pub health: Health,
    /// Whether the enemy is dead and waiting for a respawn.
    pub is_dead: bool,
    /// World clock at the time of death.
    pub died_at: Option<Duration>,
}

/// Read-only snapshot describing all enemies of the level.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over enemies that are alive and take part in collisions.
    pub fn alive(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter().filter(|snapshot| !snapshot.is_dead)
    }

    /// Snapshot of the enemy with the provided identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Progress of the current level, evaluated in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelStatus {
    /// The level is still being played.
    InProgress,
    /// Every armed mine was defused or detonated.
    Cleared,
    /// The player ran out of energy.
    EnergyDepleted,
    /// No beacons remain while armed mines are still hidden.
    BeaconsExhausted,
}

impl LevelStatus {
    /// Reports whether the level has ended, won or lost.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}
