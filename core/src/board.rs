use alloc::collections::VecDeque;
use alloc::string::String;
use core::ops::Index;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The grid of tiles of one game.
///
/// Tiles are addressed by `(row, col)`; neighbor lookups go through the board
/// instead of the tiles referencing each other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    tiles: Array2<Tile>,
    mine_count: CellCount,
}

impl Board {
    /// A board of the given size without any mines.
    pub fn empty(size: Coord2) -> Self {
        Self::from_fn(size, |_| false)
    }

    pub fn from_layout(layout: &MineLayout) -> Self {
        Self::from_fn(layout.size(), |coords| layout.contains_mine(coords))
    }

    fn from_fn(size: Coord2, mut is_mine: impl FnMut(Coord2) -> bool) -> Self {
        let mut mine_count = 0;
        let shape = (usize::from(size.0), usize::from(size.1));
        let tiles = Array2::from_shape_fn(shape, |(row, col)| {
            // dimensions come from a `Coord2`, so indices fit
            let coords = (row as Coord, col as Coord);
            let mine = is_mine(coords);
            if mine {
                mine_count += 1;
            }
            Tile::new(coords, mine)
        });
        Self { tiles, mine_count }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.tiles.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            cols.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn height(&self) -> Coord {
        self.size().0
    }

    pub fn width(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.tiles.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.tiles
            .iter()
            .filter(|tile| tile.is_revealed())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Tile> {
        self.tiles.get(coords.to_nd_index())
    }

    pub(crate) fn tile_mut(&mut self, coords: Coord2) -> &mut Tile {
        &mut self.tiles[coords.to_nd_index()]
    }

    /// All tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Coordinates around `coords` that lie on the board, row by row.
    pub fn iter_neighbors(&self, (row, col): Coord2) -> impl Iterator<Item = Coord2> + use<> {
        let (height, width) = self.size();
        let rows = row.saturating_sub(1)..=row.saturating_add(1).min(height.saturating_sub(1));
        let cols = col.saturating_sub(1)..=col.saturating_add(1).min(width.saturating_sub(1));
        rows.flat_map(move |r| cols.clone().map(move |c| (r, c)))
            .filter(move |&pos| pos != (row, col))
    }

    /// The in-bounds neighbors of `coords`, in a stable order.
    pub fn neighbors(&self, coords: Coord2) -> impl Iterator<Item = &Tile> {
        self.iter_neighbors(coords)
            .map(move |pos| &self.tiles[pos.to_nd_index()])
    }

    fn adjacent_mines_of(&self, coords: Coord2) -> u8 {
        self.neighbors(coords)
            .filter(|tile| tile.is_mine())
            .count()
            .try_into()
            .unwrap_or(u8::MAX)
    }

    /// Counts the mines around `coords` and caches the result on the tile.
    pub fn count_adjacent_mines(&mut self, coords: Coord2) -> u8 {
        if let Some(count) = self[coords].adjacent_mines() {
            return count;
        }
        let count = self.adjacent_mines_of(coords);
        self.tile_mut(coords).cache_adjacent_mines(count);
        count
    }

    /// Returns `(flagged, correctly_flagged)` among the neighbors of `coords`.
    pub fn count_adjacent_flags(&self, coords: Coord2) -> (u8, u8) {
        self.neighbors(coords)
            .filter(|tile| tile.is_flagged())
            .fold((0, 0), |(flagged, correct), tile| {
                (flagged + 1, correct + u8::from(tile.is_mine()))
            })
    }

    /// Reveals a single tile, computing its count first. Returns `false` if it
    /// was already revealed.
    pub fn reveal_tile(&mut self, coords: Coord2) -> bool {
        if self[coords].is_revealed() {
            return false;
        }
        let count = self.count_adjacent_mines(coords);
        self.tile_mut(coords).reveal(count)
    }

    /// Flood-fills outwards from `origin`: every hidden, unflagged, safe
    /// neighbor is revealed and zero-count tiles continue the fill.
    ///
    /// `origin` itself is not touched. Returns how many tiles were revealed.
    pub fn reveal_cascade(&mut self, origin: Coord2) -> CellCount {
        let mut revealed: CellCount = 0;
        let mut visited = HashSet::new();
        visited.insert(origin);
        let mut to_visit: VecDeque<_> = self.iter_neighbors(origin).collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            origin,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            let tile = &self[visit_coords];
            if tile.is_revealed() || tile.is_mine() || tile.is_flagged() {
                continue;
            }

            let count = self.count_adjacent_mines(visit_coords);
            self.tile_mut(visit_coords).reveal(count);
            revealed += 1;
            log::trace!(
                "Flood revealed tile at {:?}, mine count: {}",
                visit_coords,
                count
            );

            if count == 0 {
                to_visit.extend(
                    self.iter_neighbors(visit_coords)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }

        revealed
    }

    /// Uncovers the whole board, computing counts for safe tiles first.
    pub fn force_discover_all(&mut self) {
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                if !self[(row, col)].is_mine() {
                    self.count_adjacent_mines((row, col));
                }
                self.tile_mut((row, col)).force_discover();
            }
        }
    }

    /// Covers every tile again, keeping the mines.
    pub fn recover_all(&mut self) {
        self.tiles.iter_mut().for_each(Tile::recover);
    }

    pub fn to_snapshot(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| {
            log::warn!("Could not encode board snapshot: {}", err);
            GameError::MalformedSnapshot
        })
    }

    /// Decodes and validates a snapshot. Nothing is returned unless the whole
    /// board is consistent.
    pub fn from_snapshot(snapshot: &str) -> Result<Self> {
        let board: Self = serde_json::from_str(snapshot).map_err(|err| {
            log::warn!("Could not decode board snapshot: {}", err);
            GameError::MalformedSnapshot
        })?;
        board.validate()?;
        Ok(board)
    }

    fn validate(&self) -> Result<()> {
        let (rows, cols) = self.tiles.dim();
        let max = usize::from(Coord::MAX);
        if rows == 0 || cols == 0 || rows > max || cols > max {
            log::warn!("Snapshot has invalid dimensions {}x{}", rows, cols);
            return Err(GameError::MalformedSnapshot);
        }

        let mut mines: CellCount = 0;
        for ((row, col), tile) in self.tiles.indexed_iter() {
            if tile.position() != (row as Coord, col as Coord) {
                log::warn!(
                    "Snapshot tile at ({}, {}) claims position {:?}",
                    row,
                    col,
                    tile.position()
                );
                return Err(GameError::MalformedSnapshot);
            }
            if tile.is_mine() {
                mines += 1;
            }
        }
        if mines != self.mine_count || mines >= self.total_cells() {
            log::warn!(
                "Snapshot mine count mismatch, declared: {}, actual: {}",
                self.mine_count,
                mines
            );
            return Err(GameError::MalformedSnapshot);
        }

        for tile in self.tiles.iter() {
            match tile.adjacent_mines() {
                Some(count) if count != self.adjacent_mines_of(tile.position()) => {
                    log::warn!("Snapshot has a stale count at {:?}", tile.position());
                    return Err(GameError::MalformedSnapshot);
                }
                None if tile.is_revealed() && !tile.is_mine() => {
                    log::warn!("Snapshot reveals {:?} without a count", tile.position());
                    return Err(GameError::MalformedSnapshot);
                }
                _ => {}
            }
            if tile.is_revealed() && tile.mark() == Mark::Questioned {
                log::warn!("Snapshot keeps a question mark on revealed {:?}", tile.position());
                return Err(GameError::MalformedSnapshot);
            }
        }

        Ok(())
    }
}

impl Index<Coord2> for Board {
    type Output = Tile;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}
