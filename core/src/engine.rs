use alloc::string::String;
use core::time::Duration;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::*;

/// Valid transitions:
/// - Ready -> Gaming
/// - Ready -> Won (zero-mine boards)
/// - Gaming -> Won
/// - Gaming -> Lost
/// - any -> Ready (reset, recover, snapshot load)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Gaming,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A single game of minesweeper, from the first click to the end.
///
/// Mines are placed lazily on the first reveal so that it is always safe.
/// Victory is reached by flagging every mine; revealing all safe tiles is not
/// required. A board without mines is won as soon as the game starts.
#[derive(Debug)]
pub struct GameEngine {
    config: GameConfig,
    board: Board,
    state: EngineState,
    mine_total: CellCount,
    mine_flagged: CellCount,
    mine_flagged_correctly: CellCount,
    time_start: Option<SystemTime>,
    time_end: Option<SystemTime>,
    preset: bool,
    triggered_mine: Option<Coord2>,
    rng: SmallRng,
    events: EventBus,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, clock_seed())
    }

    /// Same as [`GameEngine::new`], but every generated board is reproducible.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        let config = GameConfig::new(config.size(), config.mines())?;
        Ok(Self {
            config,
            board: Board::empty(config.size),
            state: EngineState::Ready,
            mine_total: config.mines,
            mine_flagged: 0,
            mine_flagged_correctly: 0,
            time_start: None,
            time_end: None,
            preset: false,
            triggered_mine: None,
            rng: SmallRng::seed_from_u64(seed),
            events: EventBus::new(),
        })
    }

    /// Engine for a hand-made puzzle. The board is kept as is, so the game has
    /// to be started with [`GameEngine::start`] before tiles can be revealed.
    pub fn with_layout(layout: &MineLayout) -> Result<Self> {
        let config = layout.game_config()?;
        let mut engine = Self::new(config)?;
        engine.board = Board::from_layout(layout);
        engine.preset = true;
        Ok(engine)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tile_at(&self, coords: Coord2) -> Result<&Tile> {
        self.board.get(coords).ok_or(GameError::InvalidCoords)
    }

    pub fn status_at(&self, coords: Coord2) -> Result<TileStatus> {
        self.tile_at(coords).map(Tile::status)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn started(&self) -> bool {
        !self.state.is_ready()
    }

    pub fn ended(&self) -> bool {
        self.state.is_finished()
    }

    /// Whether the board was loaded or recovered and waits for [`GameEngine::start`].
    pub fn is_preset(&self) -> bool {
        self.preset
    }

    pub fn mine_total(&self) -> CellCount {
        self.mine_total
    }

    pub fn mine_flagged(&self) -> CellCount {
        self.mine_flagged
    }

    pub fn mine_flagged_correctly(&self) -> CellCount {
        self.mine_flagged_correctly
    }

    /// How many mines have not been flagged yet, negative when over-flagged
    pub fn mine_may_remain(&self) -> isize {
        (self.mine_total as isize) - (self.mine_flagged as isize)
    }

    pub fn time_start(&self) -> Option<SystemTime> {
        self.time_start
    }

    pub fn time_end(&self) -> Option<SystemTime> {
        self.time_end
    }

    /// Time since the game started, frozen once it ended, zero before it starts.
    pub fn elapsed(&self) -> Duration {
        let Some(start) = self.time_start else {
            return Duration::ZERO;
        };
        self.time_end
            .unwrap_or_else(SystemTime::now)
            .duration_since(start)
            .unwrap_or_default()
    }

    /// The mine that ended the game, if it was lost.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn on(&mut self, event: GameEvent, listener: Listener) -> &mut Self {
        self.events.on(event, listener);
        self
    }

    pub fn off(&mut self, event: GameEvent, listener: &Listener) -> &mut Self {
        self.events.off(event, listener);
        self
    }

    pub fn off_all(&mut self, event: GameEvent) -> &mut Self {
        self.events.off_all(event);
        self
    }

    pub fn off_all_events(&mut self) -> &mut Self {
        self.events.clear();
        self
    }

    /// Reveals a tile. The first reveal of a fresh game places the mines around
    /// it and starts the game.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.board.validate_coords(coords)?;

        match self.state {
            EngineState::Won | EngineState::Lost => Err(GameError::AlreadyEnded),
            EngineState::Ready if self.preset => Err(GameError::NotStarted),
            EngineState::Ready => {
                self.generate(Some(coords));
                self.begin();
                let outcome = self.reveal_unmarked(coords);
                Ok(if self.check_win() {
                    RevealOutcome::Won
                } else {
                    outcome
                })
            }
            EngineState::Gaming => Ok(self.reveal_unmarked(coords)),
        }
    }

    /// Reveals all unflagged neighbors of a revealed number once the number of
    /// adjacent flags matches it. Any misplaced flag loses the game.
    pub fn chord_check(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_gaming()?;

        let tile = &self.board[coords];
        let count = match tile.adjacent_mines() {
            Some(count) if tile.is_revealed() && !tile.is_mine() && count > 0 => count,
            _ => return Ok(RevealOutcome::NoChange),
        };

        let (flagged, correctly_flagged) = self.board.count_adjacent_flags(coords);
        if flagged != count {
            return Ok(RevealOutcome::NoChange);
        }

        if correctly_flagged < count {
            self.triggered_mine = self
                .board
                .neighbors(coords)
                .find(|tile| tile.is_mine() && !tile.is_flagged())
                .map(Tile::position);
            log::debug!("Chord at {:?} with misplaced flags", coords);
            self.end_game(false);
            return Ok(RevealOutcome::HitMine);
        }

        Ok(if self.board.reveal_cascade(coords) > 0 {
            RevealOutcome::Revealed
        } else {
            RevealOutcome::NoChange
        })
    }

    pub fn flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_gaming()?;

        let tile = self.board.tile_mut(coords);
        if tile.is_revealed() || tile.is_flagged() {
            return Ok(MarkOutcome::NoChange);
        }
        tile.set_flag();
        let is_mine = tile.is_mine();

        self.mine_flagged += 1;
        if is_mine {
            self.mine_flagged_correctly += 1;
        }

        Ok(if self.check_win() {
            MarkOutcome::Won
        } else {
            MarkOutcome::Changed
        })
    }

    pub fn question(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.remark(coords, Mark::Questioned)
    }

    pub fn clear_mark(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.remark(coords, Mark::None)
    }

    /// Replaces any mark with `mark`, which must not be a flag.
    fn remark(&mut self, coords: Coord2, mark: Mark) -> Result<MarkOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_gaming()?;

        let tile = self.board.tile_mut(coords);
        if tile.is_revealed() || tile.mark() == mark {
            return Ok(MarkOutcome::NoChange);
        }
        let was_flagged = tile.is_flagged();
        let is_mine = tile.is_mine();
        match mark {
            Mark::Questioned => tile.set_question(),
            _ => tile.clear_mark(),
        }

        if was_flagged {
            self.mine_flagged -= 1;
            if is_mine {
                self.mine_flagged_correctly -= 1;
            }
        }
        Ok(MarkOutcome::Changed)
    }

    /// Starts the game without revealing anything.
    ///
    /// A preset board is played as is; a fresh board gets its mines now, with
    /// no safe cell.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            EngineState::Won | EngineState::Lost => Err(GameError::AlreadyEnded),
            EngineState::Gaming => Ok(()),
            EngineState::Ready => {
                if !self.preset {
                    self.generate(None);
                }
                self.preset = false;
                self.begin();
                self.check_win();
                Ok(())
            }
        }
    }

    /// Starts over on a newly generated board, keeping `safe_start` free of mines.
    pub fn restart(&mut self, safe_start: Option<Coord2>) -> Result<()> {
        if let Some(coords) = safe_start {
            self.config.validate_coords(coords)?;
        }
        self.reset();
        self.generate(safe_start);
        self.begin();
        self.check_win();
        Ok(())
    }

    /// Drops the board and all counters, back to an unstarted empty game.
    pub fn reset(&mut self) -> &mut Self {
        self.board = Board::empty(self.config.size);
        self.mine_total = self.config.mines;
        self.state = EngineState::Ready;
        self.preset = false;
        self.clear_progress();
        log::debug!("Game reset");
        self
    }

    /// Covers every tile again, keeping the mines, so the same puzzle can be
    /// replayed after [`GameEngine::start`].
    pub fn recover(&mut self) -> &mut Self {
        self.board.recover_all();
        self.state = EngineState::Ready;
        self.preset = true;
        self.clear_progress();
        log::debug!("Board recovered");
        self
    }

    /// Uncovers the whole board, normally after a loss.
    pub fn force_discover_all(&mut self) -> &mut Self {
        self.board.force_discover_all();
        self
    }

    pub fn serialize(&self) -> Result<String> {
        self.board.to_snapshot()
    }

    /// Replaces the board with a snapshot. The engine is left untouched if the
    /// snapshot is rejected.
    pub fn load_snapshot(&mut self, snapshot: &str) -> Result<()> {
        let board = Board::from_snapshot(snapshot)?;
        let config = GameConfig::new(board.size(), board.mine_count())?;

        self.config = config;
        self.mine_total = board.mine_count();
        self.board = board;
        self.state = EngineState::Ready;
        self.preset = true;
        self.clear_progress();

        for tile in self.board.iter() {
            if tile.is_flagged() && !tile.is_revealed() {
                self.mine_flagged += 1;
                if tile.is_mine() {
                    self.mine_flagged_correctly += 1;
                }
            }
        }
        log::debug!(
            "Loaded {:?} board with {} mines from snapshot",
            self.config.size,
            self.mine_total
        );
        Ok(())
    }

    fn clear_progress(&mut self) {
        self.mine_flagged = 0;
        self.mine_flagged_correctly = 0;
        self.time_start = None;
        self.time_end = None;
        self.triggered_mine = None;
    }

    fn generate(&mut self, safe_start: Option<Coord2>) {
        let seed = self.rng.random_range(0..u64::MAX);
        let layout = ScatterGenerator::new(seed, safe_start).generate(self.config);
        log::debug!(
            "Generated {:?} board with {} mines, safe start {:?}",
            layout.size(),
            layout.mine_count(),
            safe_start
        );
        self.board = Board::from_layout(&layout);
        self.mine_total = layout.mine_count();
    }

    fn reveal_unmarked(&mut self, coords: Coord2) -> RevealOutcome {
        let tile = &self.board[coords];
        if tile.is_revealed() || tile.mark() != Mark::None {
            return RevealOutcome::NoChange;
        }

        self.board.reveal_tile(coords);
        let tile = &self.board[coords];
        log::debug!("Reveal tile at {:?}, status: {:?}", coords, tile.status());

        if tile.is_mine() {
            self.triggered_mine = Some(coords);
            self.end_game(false);
            return RevealOutcome::HitMine;
        }
        if tile.adjacent_mines() == Some(0) {
            self.board.reveal_cascade(coords);
        }
        RevealOutcome::Revealed
    }

    fn begin(&mut self) {
        let now = SystemTime::now();
        self.time_start = Some(now);
        self.time_end = None;
        self.state = EngineState::Gaming;
        log::debug!("started at {:?}", now);
        self.events.emit(GameEvent::Start);
    }

    /// Wins the game when every mine carries a flag.
    fn check_win(&mut self) -> bool {
        if matches!(self.state, EngineState::Gaming)
            && self.mine_flagged_correctly == self.mine_total
        {
            self.end_game(true);
            true
        } else {
            false
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won {
            EngineState::Won
        } else {
            EngineState::Lost
        };
        let now = SystemTime::now();
        self.time_end = Some(now);
        log::debug!("ended at {:?}, won: {}", now, won);
        self.events.emit(if won { GameEvent::Win } else { GameEvent::Fail });
    }

    fn check_gaming(&self) -> Result<()> {
        match self.state {
            EngineState::Gaming => Ok(()),
            EngineState::Ready => Err(GameError::NotStarted),
            EngineState::Won | EngineState::Lost => Err(GameError::AlreadyEnded),
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
