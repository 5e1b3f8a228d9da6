//! Generator configuration

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// What the orchestrator does when every attempt violated the degree or
/// connectivity rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Return the last attempt, flagged as degraded
    #[default]
    Degrade,
    /// Return [`GenerationError::AttemptsExhausted`](crate::GenerationError)
    Fail,
}

/// Config for level generation
///
/// Room sizes include the walls, so a 5x4 room has a 3x2 floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Grid width in tiles
    pub width: usize,
    /// Grid height in tiles
    pub height: usize,
    /// Number of rooms to try to place
    pub room_count: usize,
    pub min_room_width: usize,
    pub max_room_width: usize,
    pub min_room_height: usize,
    pub max_room_height: usize,
    /// Minimum empty cells between two rooms
    pub room_gap: usize,
    /// Upper bound on the outside-center offset of a corridor
    pub corridor_margin: usize,
    /// Whole-level attempts before the exhaustion policy applies
    pub max_attempts: usize,
    /// Random placements tried per room before placement stops early
    pub placement_attempts: usize,
    /// Seed of the generator, random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub on_exhausted: ExhaustionPolicy,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            room_count: DEFAULT_ROOM_COUNT,
            min_room_width: DEFAULT_MIN_ROOM_WIDTH,
            max_room_width: DEFAULT_MAX_ROOM_WIDTH,
            min_room_height: DEFAULT_MIN_ROOM_HEIGHT,
            max_room_height: DEFAULT_MAX_ROOM_HEIGHT,
            room_gap: DEFAULT_ROOM_GAP,
            corridor_margin: DEFAULT_CORRIDOR_MARGIN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
            seed: None,
            on_exhausted: ExhaustionPolicy::Degrade,
        }
    }
}

impl GenConfig {
    /// Check that the values describe a generatable level.
    ///
    /// A grid too small for even one minimum-size room is accepted: placement
    /// then falls back to a single centered room.
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("width", self.width, MIN_ROOM_SIDE)?;
        at_least("height", self.height, MIN_ROOM_SIDE)?;
        at_least("min_room_width", self.min_room_width, MIN_ROOM_SIDE)?;
        at_least("min_room_height", self.min_room_height, MIN_ROOM_SIDE)?;
        ordered("room width", self.min_room_width, self.max_room_width)?;
        ordered("room height", self.min_room_height, self.max_room_height)?;
        non_zero("room_count", self.room_count)?;
        non_zero("max_attempts", self.max_attempts)?;
        non_zero("placement_attempts", self.placement_attempts)?;
        at_least("room_gap", self.room_gap, 1)?;
        at_least("corridor_margin", self.corridor_margin, 1)?;
        Ok(())
    }
}

fn at_least(name: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { name, min, value });
    }
    Ok(())
}

fn ordered(name: &'static str, min: usize, max: usize) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange { name, min, max });
    }
    Ok(())
}

fn non_zero(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero { name });
    }
    Ok(())
}
