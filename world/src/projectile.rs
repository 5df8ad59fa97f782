//! Straight-line shot fired by the player.

use mine_squad_core::{Direction, RenderPosition, TILE_SIZE};

use crate::GridMap;

/// Pixels a shot travels per tick.
pub(crate) const SHOT_SPEED: i32 = 4;
const SHOT_SIZE: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Shot {
    x: i32,
    y: i32,
    direction: Direction,
}

impl Shot {
    /// Places a shot just outside the shooter's box, centred on its leading edge.
    pub(crate) fn fired_from(shooter: RenderPosition, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        let reach = TILE_SIZE / 2 + SHOT_SIZE / 2;
        let center_x = shooter.x.round() as i32 + TILE_SIZE / 2;
        let center_y = shooter.y.round() as i32 + TILE_SIZE / 2;
        Self {
            x: center_x - SHOT_SIZE / 2 + dx * reach,
            y: center_y - SHOT_SIZE / 2 + dy * reach,
            direction,
        }
    }

    pub(crate) fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub(crate) fn advance(&mut self) {
        let (dx, dy) = self.direction.delta();
        self.x += dx * SHOT_SPEED;
        self.y += dy * SHOT_SPEED;
    }

    /// Reports whether any part of the shot still overlaps the map.
    pub(crate) fn is_inside(&self, grid: &GridMap) -> bool {
        self.x + SHOT_SIZE > 0
            && self.y + SHOT_SIZE > 0
            && self.x < grid.pixel_width()
            && self.y < grid.pixel_height()
    }

    /// Reports whether the shot overlaps a tile-sized box at `target`.
    pub(crate) fn overlaps(&self, target: RenderPosition) -> bool {
        let (left, top) = (self.x as f32, self.y as f32);
        let size = SHOT_SIZE as f32;
        let tile = TILE_SIZE as f32;
        left < target.x + tile
            && target.x < left + size
            && top < target.y + tile
            && target.y < top + size
    }
}
