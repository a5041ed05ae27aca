//! Error types for the character controller.
//!
//! Errors only surface at construction time. A running tick has no error
//! channel; it resolves every input deterministically.

use thiserror::Error;

/// Errors raised while setting up a character.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControllerError {
    /// A tuning value violates its contract
    #[error("invalid tuning `{field}`: {reason}")]
    InvalidTuning {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The spawn position is buried in solid geometry
    #[error("spawn at ({x}, {y}) is embedded in solid tiles: gave up after {steps} steps")]
    EmbeddedSpawn {
        /// Spawn x
        x: f32,
        /// Spawn y
        y: f32,
        /// Step-out attempts made before giving up
        steps: u32,
    },
}

/// Result type for controller setup.
pub type ControllerResult<T> = Result<T, ControllerError>;
