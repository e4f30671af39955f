use serde::{Deserialize, Serialize};

use crate::Coord2;

/// Player annotation on a hidden tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    #[default]
    None,
    Flagged,
    Questioned,
}

/// What the presentation layer should draw for a tile.
///
/// Derived on demand from the tile's state, never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileStatus {
    Hidden,
    Flagged,
    Questioned,
    RevealedBlank,
    RevealedNumber(u8),
    RevealedMine,
    /// A flagged mine uncovered by the end-of-game sweep.
    RevealedFlaggedMine,
    /// A flag placed on a safe tile, uncovered by the end-of-game sweep.
    Misflagged,
}

impl TileStatus {
    // whether the tile is visually closed
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged | Self::Questioned)
    }
}

/// One cell of the board.
///
/// Position and mine-ness are fixed at creation. A tile never touches its
/// neighbors; traversal belongs to [`Board`](crate::Board).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    position: Coord2,
    is_mine: bool,
    revealed: bool,
    mark: Mark,
    adjacent_mines: Option<u8>,
}

impl Tile {
    pub const fn new(position: Coord2, is_mine: bool) -> Self {
        Self {
            position,
            is_mine,
            revealed: false,
            mark: Mark::None,
            adjacent_mines: None,
        }
    }

    pub const fn position(&self) -> Coord2 {
        self.position
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn mark(&self) -> Mark {
        self.mark
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.mark, Mark::Flagged)
    }

    /// Cached adjacent mine count, `None` until first computed.
    pub const fn adjacent_mines(&self) -> Option<u8> {
        self.adjacent_mines
    }

    pub(crate) fn cache_adjacent_mines(&mut self, count: u8) {
        self.adjacent_mines = Some(count);
    }

    /// Uncovers the tile, returns `false` when it was already revealed.
    ///
    /// `adjacent_mines` is only cached when no count is known yet.
    pub fn reveal(&mut self, adjacent_mines: u8) -> bool {
        if self.revealed {
            return false;
        }
        self.revealed = true;
        self.mark = Mark::None;
        if !self.is_mine && self.adjacent_mines.is_none() {
            self.adjacent_mines = Some(adjacent_mines);
        }
        true
    }

    pub fn set_flag(&mut self) {
        if !self.revealed {
            self.mark = Mark::Flagged;
        }
    }

    pub fn set_question(&mut self) {
        if !self.revealed {
            self.mark = Mark::Questioned;
        }
    }

    pub fn clear_mark(&mut self) {
        if !self.revealed {
            self.mark = Mark::None;
        }
    }

    /// Uncovers the tile no matter how it is marked. Flags survive so the
    /// sweep can tell correct guesses from misflags.
    pub fn force_discover(&mut self) {
        self.revealed = true;
        if matches!(self.mark, Mark::Questioned) {
            self.mark = Mark::None;
        }
    }

    pub fn recover(&mut self) {
        self.revealed = false;
        self.mark = Mark::None;
    }

    pub fn status(&self) -> TileStatus {
        use TileStatus::*;

        match (self.revealed, self.is_mine, self.mark) {
            (false, _, Mark::None) => Hidden,
            (false, _, Mark::Flagged) => Flagged,
            (false, _, Mark::Questioned) => Questioned,
            (true, true, Mark::Flagged) => RevealedFlaggedMine,
            (true, true, _) => RevealedMine,
            (true, false, Mark::Flagged) => Misflagged,
            (true, false, _) => match self.adjacent_mines {
                None | Some(0) => RevealedBlank,
                Some(count) => RevealedNumber(count),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_caches_count_once() {
        let mut tile = Tile::new((0, 0), false);

        assert!(tile.reveal(3));
        assert_eq!(tile.status(), TileStatus::RevealedNumber(3));

        assert!(!tile.reveal(5));
        assert_eq!(tile.adjacent_mines(), Some(3));
    }

    #[test]
    fn reveal_zero_is_blank() {
        let mut tile = Tile::new((1, 2), false);
        tile.reveal(0);
        assert_eq!(tile.status(), TileStatus::RevealedBlank);
    }

    #[test]
    fn marks_are_ignored_once_revealed() {
        let mut tile = Tile::new((0, 0), false);
        tile.set_question();
        assert_eq!(tile.status(), TileStatus::Questioned);

        tile.reveal(1);
        tile.set_flag();
        assert_eq!(tile.mark(), Mark::None);
        assert_eq!(tile.status(), TileStatus::RevealedNumber(1));
    }

    #[test]
    fn revealed_mine_has_no_count() {
        let mut tile = Tile::new((0, 0), true);
        tile.reveal(2);
        assert_eq!(tile.adjacent_mines(), None);
        assert_eq!(tile.status(), TileStatus::RevealedMine);
    }

    #[test]
    fn force_discover_distinguishes_flags() {
        let mut flagged_mine = Tile::new((0, 0), true);
        flagged_mine.set_flag();
        flagged_mine.force_discover();
        assert_eq!(flagged_mine.status(), TileStatus::RevealedFlaggedMine);

        let mut misflagged = Tile::new((0, 1), false);
        misflagged.set_flag();
        misflagged.force_discover();
        assert_eq!(misflagged.status(), TileStatus::Misflagged);

        let mut questioned_mine = Tile::new((0, 2), true);
        questioned_mine.set_question();
        questioned_mine.force_discover();
        assert_eq!(questioned_mine.status(), TileStatus::RevealedMine);
    }

    #[test]
    fn recover_covers_and_unmarks() {
        let mut tile = Tile::new((0, 0), true);
        tile.set_flag();
        tile.force_discover();
        tile.recover();

        assert!(!tile.is_revealed());
        assert_eq!(tile.status(), TileStatus::Hidden);
        assert!(tile.is_mine());
    }
}
