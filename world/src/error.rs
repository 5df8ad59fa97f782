//! Errors raised while loading a level.

use mine_squad_core::{EnemyId, TileCoord};
use thiserror::Error;

/// Configuration problems that abort a level load.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// More armed mines were requested than eligible tiles exist.
    #[error("Too many mines: requested {requested} but only {eligible} tiles are eligible")]
    TooManyMines {
        /// Configured armed-mine count.
        requested: u32,
        /// Tiles that may hold a mine.
        eligible: u32,
    },
    /// The tile vector does not match the declared dimensions.
    #[error("Layout holds {actual} tiles but {columns}x{rows} were declared")]
    LayoutMismatch {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
        /// Number of tiles supplied.
        actual: usize,
    },
    /// A spawn tile lies off the map or on an obstacle.
    #[error("Spawn tile ({}, {}) is off the map or obstructed", .tile.column(), .tile.row())]
    InvalidSpawn {
        /// Offending spawn tile.
        tile: TileCoord,
    },
    /// A patrol bound lies outside the map along the patrol axis.
    #[error("Patrol bounds of enemy {} leave the map", .enemy.get())]
    InvalidPatrol {
        /// Enemy whose patrol is misconfigured.
        enemy: EnemyId,
    },
    /// A pickup lies off the map or on an obstacle.
    #[error("Pickup tile ({}, {}) is off the map or obstructed", .tile.column(), .tile.row())]
    InvalidPickup {
        /// Offending pickup tile.
        tile: TileCoord,
    },
}
