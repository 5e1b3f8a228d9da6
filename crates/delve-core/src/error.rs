//! Generation and configuration errors
//!
//! None of the generation failures are fatal on their own: callers recover
//! from them by falling back, trying another room pair, or retrying the whole
//! attempt. They are values so the retry loop can inspect and log them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that can occur while generating a dungeon
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationError {
    #[error("placed only {placed} of {requested} requested rooms")]
    PlacementShortfall { requested: usize, placed: usize },

    #[error("no corridor geometry fits between rooms {from} and {to}")]
    RoutingFailure { from: usize, to: usize },

    #[error("room {room} ends with degree {degree}, expected 1 or 2")]
    DegreeViolation { room: usize, degree: usize },

    #[error("room graph has {components} connected components")]
    Disconnected { components: usize },

    #[error("gave up after {attempts} attempts, last failure: {last}")]
    AttemptsExhausted {
        attempts: usize,
        last: Box<GenerationError>,
    },

    /// Settings rejected before the first attempt
    #[error(transparent)]
    #[serde(skip)]
    Config(#[from] ConfigError),
}

/// Rejected configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name}: minimum {min} is greater than maximum {max}")]
    InvalidRange {
        name: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },

    #[error("{name} must not be zero")]
    Zero { name: &'static str },
}
