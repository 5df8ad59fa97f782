//! Random mine placement over the eligible tiles of a layout.

use std::ops::Range;

use mine_squad_core::{LevelLayout, TileCoord, TileKind};
use rand::Rng;

use crate::{GridMap, LevelError};

/// Rows kept free of mines next to the spawn edge.
const SAFE_ROWS: u32 = 2;

impl GridMap {
    /// Generates the mine layer for `layout` and derives every proximity count.
    ///
    /// Exactly `armed_mines` distinct tiles are drawn uniformly from the static
    /// `NoAction` tiles outside the two rows nearest the edge the player spawns
    /// on. Requesting more mines than eligible tiles fails instead of placing
    /// fewer. A layout whose tile count disagrees with its dimensions is
    /// rejected with [`LevelError::LayoutMismatch`].
    pub fn generate<R: Rng + ?Sized>(
        layout: &LevelLayout,
        armed_mines: u32,
        spawn: TileCoord,
        rng: &mut R,
    ) -> Result<Self, LevelError> {
        check_dimensions(layout)?;
        let eligible = eligible_tiles(layout, spawn);
        let requested = usize::try_from(armed_mines).unwrap_or(usize::MAX);
        if requested > eligible.len() {
            return Err(LevelError::TooManyMines {
                requested: armed_mines,
                eligible: u32::try_from(eligible.len()).unwrap_or(u32::MAX),
            });
        }

        let mut armed = vec![false; layout.tiles.len()];
        for pick in rand::seq::index::sample(rng, eligible.len(), requested) {
            armed[eligible[pick]] = true;
        }

        log::debug!(
            "armed {} of {} eligible tiles on a {}x{} map",
            armed_mines,
            eligible.len(),
            layout.columns,
            layout.rows
        );

        Ok(Self::from_layers(
            layout.columns,
            layout.rows,
            layout.tiles.clone(),
            &armed,
        ))
    }
}

/// Ensures the tile vector holds exactly `columns * rows` entries.
pub(crate) fn check_dimensions(layout: &LevelLayout) -> Result<(), LevelError> {
    let expected = u64::from(layout.columns) * u64::from(layout.rows);
    if u64::try_from(layout.tiles.len()).map_or(true, |actual| actual != expected) {
        return Err(LevelError::LayoutMismatch {
            columns: layout.columns,
            rows: layout.rows,
            actual: layout.tiles.len(),
        });
    }
    Ok(())
}

/// Row-major indices of tiles that may hold a mine.
fn eligible_tiles(layout: &LevelLayout, spawn: TileCoord) -> Vec<usize> {
    let safe = safe_rows(layout.rows, spawn);
    let width = layout.columns as usize;
    layout
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, kind)| **kind == TileKind::NoAction)
        .filter(|(index, _)| {
            width == 0 || !u32::try_from(index / width).map_or(false, |row| safe.contains(&row))
        })
        .map(|(index, _)| index)
        .collect()
}

/// Rows nearest the map edge closest to the spawn tile.
fn safe_rows(rows: u32, spawn: TileCoord) -> Range<u32> {
    if spawn.row().saturating_mul(2) >= rows {
        rows.saturating_sub(SAFE_ROWS)..rows
    } else {
        0..SAFE_ROWS.min(rows)
    }
}
