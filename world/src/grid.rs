//! Tile-type and mine layers of a loaded level.

use mine_squad_core::{MineCell, TileCoord, TileKind, TILE_SIZE};

const DISPLACEMENTS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Static tile layer plus the dynamic mine layer of a level.
///
/// The tile layer never changes after load. The mine layer is written only by
/// generation, beacon placement and detonations; proximity counts are derived
/// once at generation and are not recomputed afterwards.
#[derive(Clone, Debug)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
    mines: Vec<MineCell>,
    proximity: Vec<u8>,
    revealed: Vec<bool>,
    remaining_armed: u32,
}

impl GridMap {
    /// Builds the map from a tile layer and a row-major armed-mine mask.
    pub(crate) fn from_layers(
        columns: u32,
        rows: u32,
        tiles: Vec<TileKind>,
        armed: &[bool],
    ) -> Self {
        let mut grid = Self {
            columns,
            rows,
            mines: vec![MineCell::Free(0); tiles.len()],
            proximity: vec![0; tiles.len()],
            revealed: vec![false; tiles.len()],
            tiles,
            remaining_armed: 0,
        };

        for row in 0..rows {
            for column in 0..columns {
                let tile = TileCoord::new(column, row);
                let Some(index) = grid.index(tile) else {
                    continue;
                };
                let count = neighbors(tile, columns, rows)
                    .filter_map(|neighbor| grid.index(neighbor))
                    .filter(|&neighbor| armed.get(neighbor).copied().unwrap_or(false))
                    .count();
                grid.proximity[index] = u8::try_from(count).unwrap_or(u8::MAX);

                if armed.get(index).copied().unwrap_or(false) {
                    grid.mines[index] = MineCell::Armed;
                    grid.remaining_armed += 1;
                } else {
                    grid.mines[index] = MineCell::Free(grid.proximity[index]);
                }
            }
        }

        grid
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Width of the map in pixels.
    #[must_use]
    pub fn pixel_width(&self) -> i32 {
        i32::try_from(self.columns).unwrap_or(i32::MAX / TILE_SIZE) * TILE_SIZE
    }

    /// Height of the map in pixels.
    #[must_use]
    pub fn pixel_height(&self) -> i32 {
        i32::try_from(self.rows).unwrap_or(i32::MAX / TILE_SIZE) * TILE_SIZE
    }

    /// Reports whether the tile lies on the map.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.column() < self.columns && tile.row() < self.rows
    }

    /// Effective behaviour of the tile at `(x, y)`.
    ///
    /// Out-of-bounds coordinates read as [`TileKind::Obstacle`], so the map
    /// edge behaves like an implicit wall. A tile holding an armed mine reads
    /// as [`TileKind::Hazard`] until the mine is defused or detonated.
    #[must_use]
    pub fn get_tile_type(&self, x: i32, y: i32) -> TileKind {
        let Some(tile) = self.signed_tile(x, y) else {
            return TileKind::Obstacle;
        };
        self.tile_kind(tile)
    }

    /// Effective behaviour of an in-bounds tile, see [`GridMap::get_tile_type`].
    #[must_use]
    pub fn tile_kind(&self, tile: TileCoord) -> TileKind {
        let Some(index) = self.index(tile) else {
            return TileKind::Obstacle;
        };
        match (self.tiles[index], self.mines[index]) {
            (TileKind::NoAction, MineCell::Armed) => TileKind::Hazard,
            (kind, _) => kind,
        }
    }

    /// Behaviour of the tile as authored in the level art.
    #[must_use]
    pub fn static_tile_kind(&self, tile: TileCoord) -> TileKind {
        self.index(tile)
            .map_or(TileKind::Obstacle, |index| self.tiles[index])
    }

    /// Mine-layer state at `(x, y)`, or `None` off the map.
    #[must_use]
    pub fn query_mine_state(&self, x: i32, y: i32) -> Option<MineCell> {
        self.signed_tile(x, y).and_then(|tile| self.mine_cell(tile))
    }

    /// Mine-layer state of the tile, or `None` off the map.
    #[must_use]
    pub fn mine_cell(&self, tile: TileCoord) -> Option<MineCell> {
        self.index(tile).map(|index| self.mines[index])
    }

    /// Number of armed neighbours captured at generation time.
    #[must_use]
    pub fn proximity(&self, tile: TileCoord) -> Option<u8> {
        self.index(tile).map(|index| self.proximity[index])
    }

    /// Armed mines that are neither defused nor detonated.
    #[must_use]
    pub const fn remaining_armed_count(&self) -> u32 {
        self.remaining_armed
    }

    /// Reports whether the player has walked next to the tile.
    #[must_use]
    pub fn is_revealed(&self, tile: TileCoord) -> bool {
        self.index(tile)
            .map_or(false, |index| self.revealed[index])
    }

    /// Proximity count the presentation layer may show for the tile.
    ///
    /// Only revealed, unflagged, mine-free tiles expose their count.
    #[must_use]
    pub fn visible_proximity(&self, tile: TileCoord) -> Option<u8> {
        let index = self.index(tile)?;
        if !self.revealed[index] {
            return None;
        }
        match self.mines[index] {
            MineCell::Free(count) => Some(count),
            MineCell::Armed | MineCell::Flagged { .. } => None,
        }
    }

    /// Tiles that currently hold an armed mine, in row-major order.
    pub fn armed_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let columns = self.columns;
        self.mines
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_armed())
            .filter_map(move |(index, _)| tile_at(index, columns))
    }

    /// Reveals the 3×3 block centred on `tile`, clamped to the map.
    pub(crate) fn mark_visited(&mut self, tile: TileCoord) {
        if let Some(index) = self.index(tile) {
            self.revealed[index] = true;
        }
        for neighbor in neighbors(tile, self.columns, self.rows) {
            if let Some(index) = self.index(neighbor) {
                self.revealed[index] = true;
            }
        }
    }

    /// Places a beacon marker. Returns whether it landed on an armed mine.
    ///
    /// Callers must reject flagged tiles beforehand.
    pub(crate) fn flag(&mut self, tile: TileCoord) -> Option<bool> {
        let index = self.index(tile)?;
        let correct = self.mines[index].is_armed();
        if correct {
            self.remaining_armed = self.remaining_armed.saturating_sub(1);
        }
        self.mines[index] = MineCell::Flagged { correct };
        Some(correct)
    }

    /// Clears an armed mine the player stepped on.
    pub(crate) fn detonate(&mut self, tile: TileCoord) -> bool {
        let Some(index) = self.index(tile) else {
            return false;
        };
        if !self.mines[index].is_armed() {
            return false;
        }
        self.mines[index] = MineCell::Free(self.proximity[index]);
        self.remaining_armed = self.remaining_armed.saturating_sub(1);
        true
    }

    fn signed_tile(&self, x: i32, y: i32) -> Option<TileCoord> {
        let column = u32::try_from(x).ok()?;
        let row = u32::try_from(y).ok()?;
        let tile = TileCoord::new(column, row);
        self.contains(tile).then_some(tile)
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let row = usize::try_from(tile.row()).ok()?;
        let column = usize::try_from(tile.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Up to eight in-bounds neighbours of `tile`.
pub(crate) fn neighbors(
    tile: TileCoord,
    columns: u32,
    rows: u32,
) -> impl Iterator<Item = TileCoord> {
    DISPLACEMENTS.iter().filter_map(move |&(dx, dy)| {
        let column = tile.column().checked_add_signed(dx)?;
        let row = tile.row().checked_add_signed(dy)?;
        (column < columns && row < rows).then(|| TileCoord::new(column, row))
    })
}

fn tile_at(index: usize, columns: u32) -> Option<TileCoord> {
    let width = usize::try_from(columns).ok()?;
    if width == 0 {
        return None;
    }
    let column = u32::try_from(index % width).ok()?;
    let row = u32::try_from(index / width).ok()?;
    Some(TileCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_mines(columns: u32, rows: u32, mines: &[TileCoord]) -> GridMap {
        let len = (columns * rows) as usize;
        let mut armed = vec![false; len];
        for mine in mines {
            armed[(mine.row() * columns + mine.column()) as usize] = true;
        }
        GridMap::from_layers(columns, rows, vec![TileKind::NoAction; len], &armed)
    }

    #[test]
    fn corner_neighbors_are_clamped() {
        let corner: Vec<_> = neighbors(TileCoord::new(0, 0), 3, 3).collect();
        assert_eq!(
            corner,
            vec![
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
        assert_eq!(neighbors(TileCoord::new(1, 1), 3, 3).count(), 8);
    }

    #[test]
    fn proximity_counts_armed_neighbors() {
        let grid = grid_with_mines(3, 3, &[TileCoord::new(0, 0), TileCoord::new(2, 0)]);

        assert_eq!(grid.mine_cell(TileCoord::new(1, 0)), Some(MineCell::Free(2)));
        assert_eq!(grid.mine_cell(TileCoord::new(1, 1)), Some(MineCell::Free(2)));
        assert_eq!(grid.mine_cell(TileCoord::new(0, 1)), Some(MineCell::Free(1)));
        assert_eq!(grid.mine_cell(TileCoord::new(1, 2)), Some(MineCell::Free(0)));
        assert_eq!(grid.mine_cell(TileCoord::new(0, 0)), Some(MineCell::Armed));
        assert_eq!(grid.remaining_armed_count(), 2);
    }

    #[test]
    fn out_of_bounds_reads_as_obstacle() {
        let grid = grid_with_mines(2, 2, &[]);
        assert_eq!(grid.get_tile_type(-1, 0), TileKind::Obstacle);
        assert_eq!(grid.get_tile_type(0, -1), TileKind::Obstacle);
        assert_eq!(grid.get_tile_type(2, 0), TileKind::Obstacle);
        assert_eq!(grid.get_tile_type(0, 2), TileKind::Obstacle);
        assert_eq!(grid.get_tile_type(1, 1), TileKind::NoAction);
        assert_eq!(grid.query_mine_state(5, 5), None);
    }

    #[test]
    fn armed_tiles_read_as_hazard() {
        let grid = grid_with_mines(2, 1, &[TileCoord::new(1, 0)]);
        assert_eq!(grid.get_tile_type(1, 0), TileKind::Hazard);
        assert_eq!(grid.static_tile_kind(TileCoord::new(1, 0)), TileKind::NoAction);
    }

    #[test]
    fn mark_visited_reveals_clamped_block() {
        let mut grid = grid_with_mines(4, 4, &[TileCoord::new(3, 3)]);
        grid.mark_visited(TileCoord::new(0, 0));

        assert!(grid.is_revealed(TileCoord::new(0, 0)));
        assert!(grid.is_revealed(TileCoord::new(1, 1)));
        assert!(!grid.is_revealed(TileCoord::new(2, 2)));
        assert_eq!(grid.visible_proximity(TileCoord::new(1, 1)), Some(0));
        assert_eq!(grid.visible_proximity(TileCoord::new(2, 2)), None);
    }

    #[test]
    fn revealed_armed_tiles_hide_their_count() {
        let mut grid = grid_with_mines(3, 3, &[TileCoord::new(1, 1)]);
        grid.mark_visited(TileCoord::new(1, 1));
        assert_eq!(grid.visible_proximity(TileCoord::new(1, 1)), None);
        assert_eq!(grid.visible_proximity(TileCoord::new(0, 0)), Some(1));
    }

    #[test]
    fn flagging_keeps_neighbor_counts() {
        let mut grid = grid_with_mines(3, 1, &[TileCoord::new(0, 0)]);
        assert_eq!(grid.flag(TileCoord::new(0, 0)), Some(true));
        assert_eq!(grid.remaining_armed_count(), 0);
        assert_eq!(grid.mine_cell(TileCoord::new(1, 0)), Some(MineCell::Free(1)));
        assert_eq!(grid.get_tile_type(0, 0), TileKind::NoAction);
    }

    #[test]
    fn detonation_frees_the_cell_once() {
        let mut grid = grid_with_mines(2, 2, &[TileCoord::new(0, 0), TileCoord::new(1, 1)]);
        assert!(grid.detonate(TileCoord::new(0, 0)));
        assert!(!grid.detonate(TileCoord::new(0, 0)));
        assert_eq!(grid.mine_cell(TileCoord::new(0, 0)), Some(MineCell::Free(1)));
        assert_eq!(grid.remaining_armed_count(), 1);
        assert_eq!(grid.armed_tiles().collect::<Vec<_>>(), vec![TileCoord::new(1, 1)]);
    }
}
