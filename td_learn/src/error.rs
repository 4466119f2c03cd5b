use std::path::PathBuf;

use crate::board::Mark;

/// Errors raised by the board, the episode runner and the players.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("position {position} is out of bounds (must be 0-8)")]
    InvalidPosition { position: usize },

    #[error("row {row}, column {col} is off the board (both must be 0-2)")]
    InvalidCoords { row: usize, col: usize },

    #[error("cell {position} is already occupied")]
    CellOccupied { position: usize },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("turn parity violated: expected {expected:?} to act, board says {found:?}")]
    TurnParity { expected: Mark, found: Mark },

    #[error("no valid moves available")]
    NoValidMoves,

    #[error("the interactive session was ended by the player")]
    SessionEnded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Rejected human move input. Always answered with a new prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("expected two numbers separated by a comma, like 1,2 (got '{0}')")]
    Format(String),

    #[error("row and column must be 0, 1 or 2 (got {row},{col})")]
    OutOfRange { row: usize, col: usize },

    #[error("cell {row},{col} is already taken")]
    Occupied { row: usize, col: usize },
}
