use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be at least 1x1")]
    InvalidSize,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Game has not been started yet")]
    NotStarted,
    #[error("Snapshot is malformed or does not describe a valid board")]
    MalformedSnapshot,
}

pub type Result<T> = core::result::Result<T, GameError>;
