//! TOML level description parsed into a layout and level configuration.

use mine_squad_core::{
    Axis, EnemySpawn, Health, LevelConfig, LevelLayout, MovementKind, Pickup, PickupKind,
    TileCoord, TileKind,
};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_ENEMY_HEALTH: u32 = 1;
const DEFAULT_ENEMY_MOVE_DURATION: u32 = 16;

/// Errors raised while turning a level file into a level description.
#[derive(Debug, Error)]
pub(crate) enum LevelFileError {
    #[error("failed to parse level toml")]
    Toml(#[from] toml::de::Error),
    #[error("the map has no rows")]
    EmptyMap,
    #[error("map row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile symbol `{symbol}` at column {column}, row {row}")]
    UnknownTile {
        symbol: char,
        column: usize,
        row: usize,
    },
    #[error("the map does not mark a player spawn with `P`")]
    MissingSpawn,
    #[error("the map marks more than one player spawn")]
    DuplicateSpawn,
    #[error("patrol enemy #{index} needs both `axis` and `bounds`")]
    IncompletePatrol { index: usize },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelFile {
    level: LevelSection,
    map: MapSection,
    #[serde(default)]
    enemies: Vec<EnemyEntry>,
    #[serde(default)]
    pickups: Vec<PickupEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelSection {
    mines: u32,
    beacons: u32,
    #[serde(default)]
    ammo: u32,
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_score_pickups")]
    score_pickups: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapSection {
    rows: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindName {
    Patrol,
    RandomWalk,
    Chaser,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnemyEntry {
    kind: KindName,
    spawn: [u32; 2],
    #[serde(default)]
    axis: Option<Axis>,
    #[serde(default)]
    bounds: Option<[u32; 2]>,
    #[serde(default = "default_health")]
    health: u32,
    #[serde(default = "default_move_duration")]
    move_duration: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PickupName {
    Life,
    Shield,
    Ammo,
    Candy,
    Apple,
    Chocolate,
    Coin,
}

impl From<PickupName> for PickupKind {
    fn from(name: PickupName) -> Self {
        match name {
            PickupName::Life => Self::Life,
            PickupName::Shield => Self::Shield,
            PickupName::Ammo => Self::Ammo,
            PickupName::Candy => Self::Candy,
            PickupName::Apple => Self::Apple,
            PickupName::Chocolate => Self::Chocolate,
            PickupName::Coin => Self::Coin,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PickupEntry {
    kind: PickupName,
    tile: [u32; 2],
}

fn default_score_pickups() -> bool {
    true
}

fn default_health() -> u32 {
    DEFAULT_ENEMY_HEALTH
}

fn default_move_duration() -> u32 {
    DEFAULT_ENEMY_MOVE_DURATION
}

/// Parses the contents of a level file.
///
/// Map symbols: `.` open floor, `#` obstacle, `~` killing terrain and `P`
/// the player spawn on open floor.
pub(crate) fn parse(contents: &str) -> Result<(LevelLayout, LevelConfig), LevelFileError> {
    let file: LevelFile = toml::from_str(contents)?;
    let (layout, player_spawn) = parse_map(&file.map.rows)?;

    let enemies = file
        .enemies
        .iter()
        .enumerate()
        .map(|(index, entry)| enemy_spawn(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let pickups = file
        .pickups
        .into_iter()
        .map(|entry| {
            let [column, row] = entry.tile;
            Pickup {
                kind: entry.kind.into(),
                tile: TileCoord::new(column, row),
            }
        })
        .collect();

    Ok((
        layout,
        LevelConfig {
            armed_mines: file.level.mines,
            beacons: file.level.beacons,
            ammo: file.level.ammo,
            player_spawn,
            seed: file.level.seed,
            enemies,
            pickups,
            score_pickups: file.level.score_pickups,
        },
    ))
}

fn parse_map(rows: &[String]) -> Result<(LevelLayout, TileCoord), LevelFileError> {
    let Some(first) = rows.first() else {
        return Err(LevelFileError::EmptyMap);
    };
    let width = first.chars().count();
    if width == 0 {
        return Err(LevelFileError::EmptyMap);
    }

    let mut tiles = Vec::with_capacity(width * rows.len());
    let mut spawn = None;
    for (row, line) in rows.iter().enumerate() {
        let actual = line.chars().count();
        if actual != width {
            return Err(LevelFileError::RaggedRow {
                row,
                expected: width,
                actual,
            });
        }
        for (column, symbol) in line.chars().enumerate() {
            let kind = match symbol {
                '.' => TileKind::NoAction,
                '#' => TileKind::Obstacle,
                '~' => TileKind::Hazard,
                'P' => {
                    if spawn.is_some() {
                        return Err(LevelFileError::DuplicateSpawn);
                    }
                    spawn = Some(TileCoord::new(index(column), index(row)));
                    TileKind::NoAction
                }
                _ => {
                    return Err(LevelFileError::UnknownTile {
                        symbol,
                        column,
                        row,
                    })
                }
            };
            tiles.push(kind);
        }
    }

    let spawn = spawn.ok_or(LevelFileError::MissingSpawn)?;
    Ok((
        LevelLayout {
            columns: index(width),
            rows: index(rows.len()),
            tiles,
        },
        spawn,
    ))
}

fn enemy_spawn(index: usize, entry: &EnemyEntry) -> Result<EnemySpawn, LevelFileError> {
    let kind = match entry.kind {
        KindName::Patrol => match (entry.axis, entry.bounds) {
            (Some(axis), Some([bound_a, bound_b])) => MovementKind::Patrol {
                axis,
                bound_a,
                bound_b,
            },
            _ => return Err(LevelFileError::IncompletePatrol { index }),
        },
        KindName::RandomWalk => MovementKind::RandomWalk,
        KindName::Chaser => MovementKind::Chaser,
    };
    let [column, row] = entry.spawn;
    Ok(EnemySpawn {
        kind,
        spawn: TileCoord::new(column, row),
        health: Health::new(entry.health),
        move_duration: entry.move_duration,
    })
}

fn index(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
