use crate::{CardKind, EngineError, RandomSupplier, TileGenerator};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Board coordinate as `(x, y)`. Signed so pattern offsets may fall off the board.
pub type Coord = (i32, i32);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tile {
    Unusable,
    Normal,
    Destroyed,
    Distorted,
    Addition,
    Relocation,
    Clone,
    Blessing,
    Mystery,
    Enhancement,
}

impl Tile {
    pub const SPECIAL: [Tile; 6] = [
        Tile::Addition,
        Tile::Relocation,
        Tile::Clone,
        Tile::Blessing,
        Tile::Mystery,
        Tile::Enhancement,
    ];

    pub fn is_breakable(self) -> bool {
        !matches!(self, Self::Unusable | Self::Destroyed)
    }

    pub fn is_special(self) -> bool {
        Self::SPECIAL.contains(&self)
    }

    /// Single digit used by text layouts.
    pub fn code(self) -> char {
        match self {
            Self::Unusable => '0',
            Self::Normal => '1',
            Self::Destroyed => '2',
            Self::Distorted => '3',
            Self::Addition => '4',
            Self::Relocation => '5',
            Self::Clone => '6',
            Self::Blessing => '7',
            Self::Mystery => '8',
            Self::Enhancement => '9',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        let tile = match code {
            '0' => Self::Unusable,
            '1' => Self::Normal,
            '2' => Self::Destroyed,
            '3' => Self::Distorted,
            '4' => Self::Addition,
            '5' => Self::Relocation,
            '6' => Self::Clone,
            '7' => Self::Blessing,
            '8' => Self::Mystery,
            '9' => Self::Enhancement,
            _ => return None,
        };
        Some(tile)
    }
}

/// How many tiles of each kind a resolved hit touched, keyed by the kind before the hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileCounts {
    counts: BTreeMap<Tile, u32>,
}

impl TileCounts {
    pub fn add(&mut self, tile: Tile) {
        *self.counts.entry(tile).or_insert(0) += 1;
    }

    pub fn get(&self, tile: Tile) -> u32 {
        self.counts.get(&tile).copied().unwrap_or(0)
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.get(tile) > 0
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tile, u32)> + '_ {
        self.counts.iter().map(|(tile, count)| (*tile, *count))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChange {
    pub at: Coord,
    pub from: Tile,
    pub to: Tile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
    breakable: BTreeSet<Coord>,
    distorted: BTreeSet<Coord>,
    destroyed: BTreeSet<Coord>,
    unusable: BTreeSet<Coord>,
    special: BTreeSet<Coord>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self::build(width, height, vec![Tile::Normal; width * height])
    }

    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(EngineError::InvalidLayout("board has no cells".to_string()));
        }
        if let Some(row) = rows.iter().position(|row| row.len() != width) {
            return Err(EngineError::InvalidLayout(format!(
                "row {row} is not {width} tiles wide"
            )));
        }
        Ok(Self::build(width, height, rows.into_iter().flatten().collect()))
    }

    /// Parses rows of tile digits, see [`Tile::code`]. Whitespace is ignored.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self, EngineError> {
        let mut parsed = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let mut tiles = Vec::new();
            for code in row.as_ref().chars().filter(|c| !c.is_whitespace()) {
                let tile = Tile::from_code(code).ok_or_else(|| {
                    EngineError::InvalidLayout(format!("unknown tile code {code:?} in row {y}"))
                })?;
                tiles.push(tile);
            }
            parsed.push(tiles);
        }
        Self::from_rows(parsed)
    }

    fn build(width: usize, height: usize, cells: Vec<Tile>) -> Self {
        let mut grid = Self {
            width,
            height,
            cells,
            breakable: BTreeSet::new(),
            distorted: BTreeSet::new(),
            destroyed: BTreeSet::new(),
            unusable: BTreeSet::new(),
            special: BTreeSet::new(),
        };
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let tile = grid.cells[grid.offset(x, y)];
                grid.index_tile((x, y), tile);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[self.offset(x, y)])
    }

    /// Cells of row `y`, left to right. `None` below the last row.
    pub fn row(&self, y: usize) -> Option<&[Tile]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.cells.get(start..start + self.width)
    }

    pub fn breakable(&self) -> &BTreeSet<Coord> {
        &self.breakable
    }

    pub fn distorted(&self) -> &BTreeSet<Coord> {
        &self.distorted
    }

    pub fn destroyed(&self) -> &BTreeSet<Coord> {
        &self.destroyed
    }

    pub fn unusable(&self) -> &BTreeSet<Coord> {
        &self.unusable
    }

    pub fn special(&self) -> &BTreeSet<Coord> {
        &self.special
    }

    pub fn is_finished(&self) -> bool {
        self.breakable.is_empty()
    }

    /// Writes a tile. Off-board cells and unusable cells are left untouched.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        let Some(old) = self.get(x, y) else {
            return;
        };
        if old == Tile::Unusable {
            return;
        }
        let offset = self.offset(x, y);
        self.cells[offset] = tile;
        self.unindex_tile((x, y), old);
        self.index_tile((x, y), tile);
    }

    fn index_tile(&mut self, at: Coord, tile: Tile) {
        match tile {
            Tile::Unusable => self.unusable.insert(at),
            Tile::Distorted => self.distorted.insert(at),
            Tile::Destroyed => self.destroyed.insert(at),
            _ => {
                if tile.is_special() {
                    self.special.insert(at);
                }
                self.breakable.insert(at)
            }
        };
    }

    fn unindex_tile(&mut self, at: Coord, tile: Tile) {
        match tile {
            Tile::Unusable => self.unusable.remove(&at),
            Tile::Distorted => self.distorted.remove(&at),
            Tile::Destroyed => self.destroyed.remove(&at),
            _ => {
                self.special.remove(&at);
                self.breakable.remove(&at)
            }
        };
    }

    pub fn clear_special_tiles(&mut self) {
        let special: Vec<Coord> = self.special.iter().copied().collect();
        for (x, y) in special {
            self.set_tile(x, y, Tile::Normal);
        }
    }

    /// Resets every special tile to normal, then places one freshly generated
    /// special tile on a random breakable cell. Returns where it landed.
    pub fn spawn_special_tile<R: RandomSupplier + ?Sized>(
        &mut self,
        rng: &mut R,
        tiles: &TileGenerator,
    ) -> Result<Option<(Coord, Tile)>, EngineError> {
        self.clear_special_tiles();
        if self.breakable.is_empty() {
            return Ok(None);
        }
        let last = self.breakable.len() as i64 - 1;
        let index = rng.int_in_range(0, last) as usize;
        let Some(&(x, y)) = self.breakable.iter().nth(index) else {
            return Ok(None);
        };
        let tile = tiles.next(rng)?;
        self.set_tile(x, y, tile);
        debug!("spawned {tile:?} at ({x}, {y})");
        Ok(Some(((x, y), tile)))
    }

    /// Works out what each hit would do without touching the board.
    pub fn plan_hits(
        &self,
        hits: &BTreeSet<Coord>,
        card: CardKind,
    ) -> Result<Vec<TileChange>, EngineError> {
        let mut changes = Vec::with_capacity(hits.len());
        for &(x, y) in hits {
            let tile = self.get(x, y);
            let change = match tile {
                Some(Tile::Destroyed) if card == CardKind::Lightning => TileChange {
                    at: (x, y),
                    from: Tile::Destroyed,
                    to: Tile::Normal,
                },
                Some(Tile::Distorted) if card == CardKind::Purify => TileChange {
                    at: (x, y),
                    from: Tile::Distorted,
                    to: Tile::Destroyed,
                },
                Some(Tile::Distorted) => {
                    return Err(EngineError::UnsupportedEffect(format!(
                        "{} hitting distorted tile at ({x}, {y})",
                        card.display_name()
                    )));
                }
                Some(from) if from.is_breakable() => TileChange {
                    at: (x, y),
                    from,
                    to: Tile::Destroyed,
                },
                _ => return Err(EngineError::InvalidTileState { x, y, tile }),
            };
            changes.push(change);
        }
        Ok(changes)
    }

    pub fn commit(&mut self, changes: &[TileChange]) -> TileCounts {
        let mut counts = TileCounts::default();
        for change in changes {
            trace!("{:?} -> {:?} at {:?}", change.from, change.to, change.at);
            counts.add(change.from);
            self.set_tile(change.at.0, change.at.1, change.to);
        }
        counts
    }

    /// Breaks every hit tile (Lightning restores destroyed ones instead) and
    /// counts the tile kinds that were hit. Nothing changes on error.
    pub fn resolve_hits(
        &mut self,
        hits: &BTreeSet<Coord>,
        card: CardKind,
    ) -> Result<TileCounts, EngineError> {
        let changes = self.plan_hits(hits, card)?;
        Ok(self.commit(&changes))
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let mut seen = 0;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let at = (x, y);
                let memberships = [
                    self.breakable.contains(&at),
                    self.distorted.contains(&at),
                    self.destroyed.contains(&at),
                    self.unusable.contains(&at),
                ]
                .iter()
                .filter(|member| **member)
                .count();
                if memberships != 1 {
                    return false;
                }
                let tile = self.cells[self.offset(x, y)];
                if tile.is_special() != self.special.contains(&at) {
                    return false;
                }
                seen += 1;
            }
        }
        let indexed =
            self.breakable.len() + self.distorted.len() + self.destroyed.len() + self.unusable.len();
        indexed == seen && self.special.is_subset(&self.breakable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RngState, TileWeight};

    const ALL_TILES: [Tile; 10] = [
        Tile::Unusable,
        Tile::Normal,
        Tile::Destroyed,
        Tile::Distorted,
        Tile::Addition,
        Tile::Relocation,
        Tile::Clone,
        Tile::Blessing,
        Tile::Mystery,
        Tile::Enhancement,
    ];

    #[test]
    fn get_outside_board_is_none() {
        let grid = TileGrid::new(5, 4);
        for (x, y) in [(-1, 0), (0, -1), (5, 0), (0, 4), (i32::MAX, i32::MIN)] {
            assert_eq!(grid.get(x, y), None);
        }
        assert_eq!(grid.get(4, 3), Some(Tile::Normal));
    }

    #[test]
    fn new_grid_is_all_breakable() {
        let grid = TileGrid::new(3, 3);
        assert_eq!(grid.breakable().len(), 9);
        assert!(grid.special().is_empty());
        assert!(grid.is_consistent());
        assert!(!grid.is_finished());
    }

    #[test]
    fn unusable_cells_ignore_writes() {
        let mut grid = TileGrid::from_layout(&["101", "111"]).expect("layout");
        grid.set_tile(1, 0, Tile::Normal);
        assert_eq!(grid.get(1, 0), Some(Tile::Unusable));
        grid.set_tile(9, 9, Tile::Destroyed);
        assert!(grid.is_consistent());
    }

    #[test]
    fn index_sets_stay_partitioned_under_random_writes() {
        let mut rng = RngState::from_seed(7);
        let mut grid = TileGrid::from_layout(&["11011", "13111", "11121", "11111"]).expect("layout");
        for _ in 0..2000 {
            let x = rng.int_in_range(-1, 5) as i32;
            let y = rng.int_in_range(-1, 4) as i32;
            let tile = ALL_TILES[rng.int_in_range(0, 9) as usize];
            grid.set_tile(x, y, tile);
            assert!(grid.is_consistent());
        }
        assert!(grid.unusable().contains(&(2, 0)));
        for &(x, y) in grid.unusable() {
            assert_eq!(grid.get(x, y), Some(Tile::Unusable));
        }
    }

    #[test]
    fn rows_stop_at_the_board_edge() {
        let grid = TileGrid::from_layout(&["120", "345"]).expect("layout");
        assert_eq!(
            grid.row(1),
            Some(&[Tile::Distorted, Tile::Addition, Tile::Relocation][..])
        );
        assert_eq!(grid.row(2), None);
        assert_eq!(grid.row(usize::MAX), None);
    }

    #[test]
    fn layout_rejects_ragged_rows_and_unknown_codes() {
        assert!(matches!(
            TileGrid::from_layout(&["111", "11"]),
            Err(EngineError::InvalidLayout(_))
        ));
        assert!(matches!(
            TileGrid::from_layout(&["1x1"]),
            Err(EngineError::InvalidLayout(_))
        ));
        let empty: [&str; 0] = [];
        assert!(TileGrid::from_layout(&empty).is_err());
    }

    #[test]
    fn resolve_hits_destroys_and_counts() {
        let mut grid = TileGrid::from_layout(&["171", "111"]).expect("layout");
        let hits: BTreeSet<Coord> = [(0, 0), (1, 0), (2, 1)].into_iter().collect();
        let counts = grid.resolve_hits(&hits, CardKind::Thunder).expect("resolve");
        assert_eq!(counts.get(Tile::Normal), 2);
        assert_eq!(counts.get(Tile::Blessing), 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            vec![(Tile::Normal, 2), (Tile::Blessing, 1)]
        );
        assert_eq!(grid.destroyed().len(), 3);
        assert!(grid.special().is_empty());
    }

    #[test]
    fn lightning_restores_destroyed_tiles() {
        let mut grid = TileGrid::from_layout(&["121"]).expect("layout");
        let hits: BTreeSet<Coord> = [(1, 0)].into_iter().collect();
        let counts = grid.resolve_hits(&hits, CardKind::Lightning).expect("resolve");
        assert_eq!(counts.get(Tile::Destroyed), 1);
        assert_eq!(grid.get(1, 0), Some(Tile::Normal));
    }

    #[test]
    fn hitting_destroyed_tile_with_other_card_fails_without_changes() {
        let mut grid = TileGrid::from_layout(&["121"]).expect("layout");
        let before = grid.clone();
        let hits: BTreeSet<Coord> = [(0, 0), (1, 0)].into_iter().collect();
        let err = grid.resolve_hits(&hits, CardKind::Tornado).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTileState {
                x: 1,
                y: 0,
                tile: Some(Tile::Destroyed)
            }
        );
        assert_eq!(grid, before);
    }

    #[test]
    fn only_purify_breaks_distorted_tiles() {
        let mut grid = TileGrid::from_layout(&["13"]).expect("layout");
        let hits: BTreeSet<Coord> = [(1, 0)].into_iter().collect();
        assert!(matches!(
            grid.resolve_hits(&hits, CardKind::Thunder),
            Err(EngineError::UnsupportedEffect(_))
        ));
        let counts = grid.resolve_hits(&hits, CardKind::Purify).expect("purify");
        assert_eq!(counts.get(Tile::Distorted), 1);
        assert_eq!(grid.get(1, 0), Some(Tile::Destroyed));
    }

    #[test]
    fn spawn_keeps_a_single_special_tile() {
        let mut rng = RngState::from_seed(11);
        let tiles = TileGenerator::new(vec![TileWeight {
            tile: Tile::Mystery,
            weight: 1,
        }])
        .expect("weights");
        let mut grid = TileGrid::new(4, 4);
        for _ in 0..20 {
            let spawned = grid.spawn_special_tile(&mut rng, &tiles).expect("spawn");
            assert!(matches!(spawned, Some((_, Tile::Mystery))));
            assert_eq!(grid.special().len(), 1);
            assert!(grid.is_consistent());
        }
    }

    #[test]
    fn spawn_on_cleared_board_places_nothing() {
        let mut rng = RngState::from_seed(3);
        let tiles = TileGenerator::standard();
        let mut grid = TileGrid::from_layout(&["202", "222"]).expect("layout");
        assert!(grid.is_finished());
        assert_eq!(grid.spawn_special_tile(&mut rng, &tiles), Ok(None));
    }
}
