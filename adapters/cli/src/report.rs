//! Plain-text rendering of the world for terminal output.

use mine_squad_core::{MineCell, TileCoord, TileKind};
use mine_squad_world::{query, World};

/// Draws the map one character per tile.
///
/// `@` player, `E` live enemy, `+` power-up, `$` bonus item, `#` obstacle,
/// `~` killing terrain, `F` beacon, a digit for a revealed proximity count and
/// `?` for unexplored floor.
pub(crate) fn render_map(world: &World) -> String {
    let grid = query::grid(world);
    let player = query::player(world).tile;
    let enemies: Vec<TileCoord> = query::enemy_view(world)
        .alive()
        .map(|enemy| enemy.tile)
        .collect();

    let mut out = String::new();
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let tile = TileCoord::new(column, row);
            let pickup = query::pickups(world)
                .iter()
                .find(|pickup| pickup.tile == tile);
            let symbol = if tile == player {
                '@'
            } else if enemies.contains(&tile) {
                'E'
            } else if let Some(pickup) = pickup {
                if pickup.kind.is_score() {
                    '$'
                } else {
                    '+'
                }
            } else {
                match (grid.static_tile_kind(tile), grid.mine_cell(tile)) {
                    (TileKind::Obstacle, _) => '#',
                    (TileKind::Hazard, _) => '~',
                    (_, Some(MineCell::Flagged { .. })) => 'F',
                    _ => grid
                        .visible_proximity(tile)
                        .and_then(|count| char::from_digit(u32::from(count), 10))
                        .unwrap_or('?'),
                }
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

/// One-line summary of the level state.
pub(crate) fn summary(world: &World) -> String {
    let player = query::player(world);
    format!(
        "tick {} | {:?} | energy {} | ammo {} | score {} | beacons {} | mines left {}",
        query::tick_index(world),
        query::level_status(world),
        player.energy,
        player.ammo,
        player.score,
        query::remaining_beacons(world),
        query::remaining_armed_count(world),
    )
}
