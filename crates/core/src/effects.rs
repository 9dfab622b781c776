//! Card targeting. Every function here only reads the board and draws from the
//! supplied randomness; the returned coordinates are resolved by
//! [`TileGrid::resolve_hits`].

use crate::{Card, CardKind, CardLevel, Coord, EngineError, RandomSupplier, Tile, TileGrid};
use log::trace;
use std::collections::BTreeSet;

/// Hit chance per card level: `[normal, enhanced, max]`.
type Chance = [f64; 3];

const CERTAIN: Chance = [1.0, 1.0, 1.0];
const HALF: Chance = [0.5, 1.0, 1.0];
const THREE_QUARTERS: Chance = [0.75, 1.0, 1.0];
const MAX_ONLY: Chance = [0.0, 0.0, 1.0];

type Pattern = [(i32, i32, Chance)];

const THUNDER: &Pattern = &[
    (0, 0, CERTAIN),
    (1, 0, HALF),
    (0, 1, HALF),
    (-1, 0, HALF),
    (0, -1, HALF),
];

const TORNADO: &Pattern = &[
    (0, 0, CERTAIN),
    (1, 1, HALF),
    (1, -1, HALF),
    (-1, 1, HALF),
    (-1, -1, HALF),
];

const PURIFY: &Pattern = &[
    (0, 0, CERTAIN),
    (1, 0, HALF),
    (-1, 0, HALF),
    (0, 1, MAX_ONLY),
    (0, -1, MAX_ONLY),
];

const SHOCKWAVE: &Pattern = &[
    (0, 0, CERTAIN),
    (1, -1, THREE_QUARTERS),
    (1, 0, THREE_QUARTERS),
    (1, 1, THREE_QUARTERS),
    (0, -1, THREE_QUARTERS),
    (0, 1, THREE_QUARTERS),
    (-1, -1, THREE_QUARTERS),
    (-1, 0, THREE_QUARTERS),
    (-1, 1, THREE_QUARTERS),
];

const TREE: [(i32, i32); 9] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (-1, 0),
    (-2, 0),
    (0, 1),
    (0, 2),
    (0, -1),
    (0, -2),
];

const HELLFIRE_REACH: i32 = 3;

/// Extra random targets Lightning may pick, by level.
const LIGHTNING_CAP: [i64; 3] = [2, 4, 6];

/// Diamond of Manhattan radius 3, walked quadrant by quadrant.
fn hellfire_pattern() -> Vec<(i32, i32, Chance)> {
    let mut pattern = vec![(0, 0, CERTAIN)];
    for dx in 0..=HELLFIRE_REACH {
        for dy in 0..=(HELLFIRE_REACH - dx) {
            if dx == 0 && dy == 0 {
                continue;
            }
            for offset in [(dx, dy), (-dx, dy), (dx, -dy), (-dx, -dy)] {
                if !pattern.iter().any(|(x, y, _)| (*x, *y) == offset) {
                    pattern.push((offset.0, offset.1, HALF));
                }
            }
        }
    }
    pattern
}

/// Chance for sweeping cards, fading with distance from the origin.
pub fn sweep_chance(distance: i32) -> f64 {
    (1.0 - 0.15 * f64::from(distance)).max(0.1)
}

fn is_breakable(grid: &TileGrid, x: i32, y: i32) -> bool {
    grid.get(x, y).is_some_and(Tile::is_breakable)
}

/// Rolls each offset of `pattern` against the card level. Max-level cards pass
/// over distorted tiles unless `hits_distorted` is set.
fn roll_pattern<R: RandomSupplier + ?Sized>(
    grid: &TileGrid,
    (x, y): Coord,
    level: CardLevel,
    pattern: &Pattern,
    hits_distorted: bool,
    rng: &mut R,
) -> BTreeSet<Coord> {
    let mut hits = BTreeSet::new();
    for &(dx, dy, chance) in pattern {
        let (tx, ty) = (x + dx, y + dy);
        let Some(tile) = grid.get(tx, ty) else {
            continue;
        };
        if !tile.is_breakable() {
            continue;
        }
        if rng.uniform() < chance[level.index()] {
            if tile == Tile::Distorted && level == CardLevel::Max && !hits_distorted {
                continue;
            }
            hits.insert((tx, ty));
        }
    }
    hits
}

fn sweep_column<R: RandomSupplier + ?Sized>(
    grid: &TileGrid,
    (x, y): Coord,
    hits: &mut BTreeSet<Coord>,
    rng: &mut R,
) {
    for ty in 0..grid.height() as i32 {
        if !is_breakable(grid, x, ty) {
            continue;
        }
        if rng.uniform() < sweep_chance((ty - y).abs()) {
            hits.insert((x, ty));
        }
    }
}

fn sweep_row<R: RandomSupplier + ?Sized>(
    grid: &TileGrid,
    (x, y): Coord,
    hits: &mut BTreeSet<Coord>,
    rng: &mut R,
) {
    for tx in 0..grid.width() as i32 {
        if !is_breakable(grid, tx, y) {
            continue;
        }
        if rng.uniform() < sweep_chance((tx - x).abs()) {
            hits.insert((tx, y));
        }
    }
}

fn explosion<R: RandomSupplier + ?Sized>(
    grid: &TileGrid,
    (x, y): Coord,
    rng: &mut R,
) -> BTreeSet<Coord> {
    let mut hits = BTreeSet::from([(x, y)]);
    let reach = grid.width().max(grid.height()) as i32;
    for d in 0..reach {
        let mut corners: Vec<Coord> = Vec::with_capacity(4);
        for corner in [(x + d, y + d), (x - d, y + d), (x + d, y - d), (x - d, y - d)] {
            if !corners.contains(&corner) {
                corners.push(corner);
            }
        }
        for (cx, cy) in corners {
            if !is_breakable(grid, cx, cy) {
                continue;
            }
            if rng.uniform() < sweep_chance(d) {
                hits.insert((cx, cy));
            }
        }
    }
    hits
}

/// Lightning rolls a count in `-1..=cap`. A negative roll undoes that many
/// tiles drawn from the destroyed ones plus the origin; each drawn tile is
/// toggled in the hit set, so a drawn origin is spared rather than struck. A
/// positive roll strikes that many other breakable tiles.
fn lightning<R: RandomSupplier + ?Sized>(
    grid: &TileGrid,
    origin: Coord,
    level: CardLevel,
    rng: &mut R,
) -> Result<BTreeSet<Coord>, EngineError> {
    let mut hits = BTreeSet::from([origin]);
    let roll = rng.int_in_range(-1, LIGHTNING_CAP[level.index()]);
    trace!("lightning rolled {roll}");
    if roll < 0 {
        let mut pool = grid.destroyed().clone();
        pool.insert(origin);
        let pool: Vec<Coord> = pool.into_iter().collect();
        let count = (roll.unsigned_abs() as usize).min(pool.len());
        for at in rng.sample(&pool, count)? {
            if !hits.remove(&at) {
                hits.insert(at);
            }
        }
    } else {
        let pool: Vec<Coord> = grid
            .breakable()
            .iter()
            .copied()
            .filter(|at| *at != origin)
            .collect();
        let count = (roll as usize).min(pool.len());
        hits.extend(rng.sample(&pool, count)?);
    }
    Ok(hits)
}

fn tree(grid: &TileGrid, (x, y): Coord) -> BTreeSet<Coord> {
    TREE.iter()
        .map(|(dx, dy)| (x + dx, y + dy))
        .filter(|(tx, ty)| is_breakable(grid, *tx, *ty))
        .collect()
}

/// Coordinates `card` would hit when cast on `(x, y)`.
pub fn target_tiles<R: RandomSupplier + ?Sized>(
    card: Card,
    grid: &TileGrid,
    x: i32,
    y: i32,
    rng: &mut R,
) -> Result<BTreeSet<Coord>, EngineError> {
    let origin = (x, y);
    let level = card.level;
    let hits = match card.kind {
        CardKind::Thunder => roll_pattern(grid, origin, level, THUNDER, false, rng),
        CardKind::Tornado => roll_pattern(grid, origin, level, TORNADO, false, rng),
        CardKind::Purify => roll_pattern(grid, origin, level, PURIFY, true, rng),
        CardKind::Hellfire => roll_pattern(grid, origin, level, &hellfire_pattern(), false, rng),
        CardKind::Shockwave => roll_pattern(grid, origin, level, SHOCKWAVE, false, rng),
        CardKind::Tempest => {
            let mut hits = BTreeSet::from([origin]);
            sweep_column(grid, origin, &mut hits, rng);
            hits
        }
        CardKind::Earthquake => {
            let mut hits = BTreeSet::new();
            sweep_row(grid, origin, &mut hits, rng);
            hits
        }
        CardKind::TidalWave => {
            let mut hits = BTreeSet::from([origin]);
            sweep_row(grid, origin, &mut hits, rng);
            sweep_column(grid, origin, &mut hits, rng);
            hits
        }
        CardKind::Explosion => explosion(grid, origin, rng),
        CardKind::Lightning => lightning(grid, origin, level, rng)?,
        CardKind::Tree => tree(grid, origin),
        CardKind::Outburst => BTreeSet::from([origin]),
    };
    trace!("{} at {origin:?} targets {hits:?}", card.kind.display_name());
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hellfire_covers_diamond_of_radius_three() {
        let pattern = hellfire_pattern();
        assert_eq!(pattern.len(), 25);
        assert!(pattern.iter().all(|(dx, dy, _)| dx.abs() + dy.abs() <= 3));
        assert_eq!(pattern[0], (0, 0, CERTAIN));
    }

    #[test]
    fn sweep_chance_bottoms_out() {
        assert_eq!(sweep_chance(0), 1.0);
        assert!((sweep_chance(2) - 0.7).abs() < 1e-9);
        assert_eq!(sweep_chance(6), 0.1);
        assert_eq!(sweep_chance(40), 0.1);
    }

    #[test]
    fn patterns_keep_origin_certain() {
        for pattern in [THUNDER, TORNADO, PURIFY, SHOCKWAVE] {
            assert_eq!(pattern[0], (0, 0, CERTAIN));
        }
    }
}
