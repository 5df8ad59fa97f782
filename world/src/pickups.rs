//! Power-ups and bonus items lying on the map.

use mine_squad_core::{Pickup, PickupKind, TileCoord, TileKind};
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
    Rng,
};

use crate::GridMap;

/// Relative odds of each bonus item, in [`PickupKind::SCORE`] order.
const SCORE_WEIGHTS: [u32; 4] = [40, 30, 20, 10];

/// Draws a bonus item and drops it on a random open tile that is not listed
/// in `occupied`. Tiles hiding an armed mine are never chosen.
pub(crate) fn spawn_score_pickup<R: Rng + ?Sized>(
    grid: &GridMap,
    occupied: &[TileCoord],
    rng: &mut R,
) -> Option<Pickup> {
    let weights = WeightedIndex::new(SCORE_WEIGHTS).ok()?;
    let kind = PickupKind::SCORE[weights.sample(rng)];

    let free: Vec<TileCoord> = (0..grid.rows())
        .flat_map(|row| (0..grid.columns()).map(move |column| TileCoord::new(column, row)))
        .filter(|tile| grid.tile_kind(*tile) == TileKind::NoAction && !occupied.contains(tile))
        .collect();
    let tile = *free.choose(rng)?;

    Some(Pickup { kind, tile })
}
