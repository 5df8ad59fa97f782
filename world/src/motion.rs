//! Tile-stepped movement shared by the player and every enemy.

use mine_squad_core::{Direction, RenderPosition, TileCoord, TileKind, TILE_SIZE};

use crate::GridMap;

/// Outcome of a move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BeginMove {
    /// The mover left `from` and is heading to `to`.
    Started { from: TileCoord, to: TileCoord },
    /// The destination is an obstacle or lies off the map.
    Blocked,
    /// The mover is waiting out a turn pause.
    Turning,
    /// A move is already in flight.
    Busy,
}

/// Logical tile, facing and interpolation state of a single mover.
#[derive(Clone, Debug)]
pub(crate) struct Motion {
    tile: TileCoord,
    target: Option<TileCoord>,
    facing: Direction,
    progress: u32,
    duration: u32,
    turn_pause: u32,
    render: RenderPosition,
}

impl Motion {
    pub(crate) fn new(tile: TileCoord, facing: Direction, duration: u32) -> Self {
        Self {
            tile,
            target: None,
            facing,
            progress: 0,
            duration: duration.max(1),
            turn_pause: 0,
            render: corner(tile),
        }
    }

    pub(crate) fn tile(&self) -> TileCoord {
        self.tile
    }

    pub(crate) fn facing(&self) -> Direction {
        self.facing
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn render_position(&self) -> RenderPosition {
        self.render
    }

    /// Teleports the mover, dropping any move or turn pause.
    pub(crate) fn reset(&mut self, tile: TileCoord, facing: Direction) {
        *self = Self::new(tile, facing, self.duration);
    }

    /// Attempts to start a one-tile move in `direction`.
    ///
    /// A change of facing with a non-zero `turn_delay` only turns the mover; the
    /// step can begin once the pause has been counted down by [`Motion::advance`].
    pub(crate) fn try_begin(
        &mut self,
        direction: Direction,
        grid: &GridMap,
        turn_delay: u32,
    ) -> BeginMove {
        if self.target.is_some() {
            return BeginMove::Busy;
        }
        if direction != self.facing {
            self.facing = direction;
            if turn_delay > 0 {
                self.turn_pause = turn_delay;
                return BeginMove::Turning;
            }
        }
        if self.turn_pause > 0 {
            return BeginMove::Turning;
        }

        match destination(grid, self.tile, direction) {
            Some(to) => {
                self.target = Some(to);
                self.progress = 0;
                BeginMove::Started {
                    from: self.tile,
                    to,
                }
            }
            None => BeginMove::Blocked,
        }
    }

    /// Advances the mover by `ticks`, returning the tile reached when the move
    /// completes during this call.
    pub(crate) fn advance(&mut self, ticks: u32) -> Option<TileCoord> {
        self.turn_pause = self.turn_pause.saturating_sub(ticks);
        let target = self.target?;

        self.progress = self.progress.saturating_add(ticks);
        if self.progress >= self.duration {
            self.tile = target;
            self.target = None;
            self.progress = 0;
            self.render = corner(target);
            return Some(target);
        }

        let origin = corner(self.tile);
        let destination = corner(target);
        let fraction = self.progress as f32 / self.duration as f32;
        self.render = RenderPosition {
            x: origin.x + (destination.x - origin.x) * fraction,
            y: origin.y + (destination.y - origin.y) * fraction,
        };
        None
    }
}

/// Tile a mover on `from` would reach by stepping in `direction`.
///
/// Only the leading edge of the destination rect is tested: the far pixel
/// column for horizontal steps, the far pixel row for vertical steps, both in
/// the mover's current row or column. Vertical steps must also stay inside the
/// map's pixel bounds.
pub(crate) fn destination(
    grid: &GridMap,
    from: TileCoord,
    direction: Direction,
) -> Option<TileCoord> {
    let (dx, dy) = direction.delta();
    let (origin_x, origin_y) = from.pixel_origin();
    let dest_x = origin_x + dx * TILE_SIZE;
    let dest_y = origin_y + dy * TILE_SIZE;

    let (probe_x, probe_y) = match direction {
        Direction::Left => (dest_x, origin_y),
        Direction::Right => (dest_x + TILE_SIZE - 1, origin_y),
        Direction::Up => {
            if dest_y < 0 {
                return None;
            }
            (origin_x, dest_y)
        }
        Direction::Down => {
            if dest_y + TILE_SIZE > grid.pixel_height() {
                return None;
            }
            (origin_x, dest_y + TILE_SIZE - 1)
        }
    };

    let column = probe_x.div_euclid(TILE_SIZE);
    let row = probe_y.div_euclid(TILE_SIZE);
    if grid.get_tile_type(column, row) == TileKind::Obstacle {
        return None;
    }
    Some(TileCoord::new(
        u32::try_from(column).ok()?,
        u32::try_from(row).ok()?,
    ))
}

fn corner(tile: TileCoord) -> RenderPosition {
    let (x, y) = tile.pixel_origin();
    RenderPosition {
        x: x as f32,
        y: y as f32,
    }
}
