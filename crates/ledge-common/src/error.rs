//! Error types for the Ledge crates.

use thiserror::Error;

/// Top-level error type for Ledge harness operations.
#[derive(Debug, Error)]
pub enum LedgeError {
    /// Level parsing errors
    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    /// Input script errors
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading an ASCII tile level.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The level text has no rows
    #[error("Level is empty")]
    Empty,

    /// A row has a different width than the first row
    #[error("Row {line} is {actual} tiles wide, expected {expected}")]
    Ragged {
        /// 1-based line number
        line: usize,
        /// Width of the first row
        expected: usize,
        /// Width of this row
        actual: usize,
    },

    /// A character that does not name any tile
    #[error("Unknown tile {ch:?} at line {line}, column {column}")]
    UnknownTile {
        /// Offending character
        ch: char,
        /// 1-based line number
        line: usize,
        /// 1-based column number
        column: usize,
    },

    /// No `@` spawn marker
    #[error("Level has no spawn marker")]
    MissingSpawn,

    /// More than one `@` spawn marker
    #[error("Second spawn marker at line {line}, column {column}")]
    MultipleSpawns {
        /// 1-based line number
        line: usize,
        /// 1-based column number
        column: usize,
    },
}

/// Errors raised while reading a scripted key timeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// A line could not be split into a tick count and keys
    #[error("Malformed script line {line}: {reason}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// A key name the input layer does not know
    #[error("Unknown key {key:?} on script line {line}")]
    UnknownKey {
        /// 1-based line number
        line: usize,
        /// Key name as written
        key: String,
    },
}

/// Result type alias for Ledge harness operations.
pub type LedgeResult<T> = Result<T, LedgeError>;
