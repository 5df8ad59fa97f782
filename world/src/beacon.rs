//! Beacon placement on the tile in front of the player.

use mine_squad_core::{BeaconOutcome, Direction, TileCoord, TileKind};

use crate::GridMap;

/// Resolves a beacon request and returns the targeted tile, if it is on the
/// map, together with the outcome. Only flag outcomes spend from `beacons`.
pub(crate) fn place_beacon(
    grid: &mut GridMap,
    from: TileCoord,
    facing: Direction,
    beacons: &mut u32,
) -> (Option<TileCoord>, BeaconOutcome) {
    let Some(tile) = from.step(facing).filter(|tile| grid.contains(*tile)) else {
        return (None, BeaconOutcome::OutOfBounds);
    };
    if grid.mine_cell(tile).map_or(false, |cell| cell.is_flagged()) {
        return (Some(tile), BeaconOutcome::AlreadyFlagged);
    }
    if grid.static_tile_kind(tile) == TileKind::Obstacle {
        return (Some(tile), BeaconOutcome::Obstructed);
    }
    if *beacons == 0 {
        return (Some(tile), BeaconOutcome::NoBeaconsLeft);
    }

    let outcome = match grid.flag(tile) {
        Some(true) => BeaconOutcome::CorrectFlag,
        Some(false) => BeaconOutcome::IncorrectFlag,
        None => return (None, BeaconOutcome::OutOfBounds),
    };
    *beacons -= 1;
    (Some(tile), outcome)
}
