//! Generation constants
//!
//! Defaults for [`GenConfig`](crate::GenConfig) and fixed limits of the
//! algorithms.

/// Default map dimensions
pub const DEFAULT_WIDTH: usize = 100;
pub const DEFAULT_HEIGHT: usize = 25;

/// Default number of rooms to place
pub const DEFAULT_ROOM_COUNT: usize = 10;

/// Default room size limits, walls included
pub const DEFAULT_MIN_ROOM_WIDTH: usize = 5;
pub const DEFAULT_MAX_ROOM_WIDTH: usize = 12;
pub const DEFAULT_MIN_ROOM_HEIGHT: usize = 4;
pub const DEFAULT_MAX_ROOM_HEIGHT: usize = 7;

/// Minimum empty cells between two rooms
pub const DEFAULT_ROOM_GAP: usize = 3;

/// Maximum distance of a corridor's outside center from its wall opening
pub const DEFAULT_CORRIDOR_MARGIN: usize = 2;

/// Whole-level generation attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 50;

/// Random placements tried per room
pub const DEFAULT_PLACEMENT_ATTEMPTS: usize = 100;

/// Smallest room side: one wall on each side around a one-cell interior
pub const MIN_ROOM_SIDE: usize = 3;

/// Cells kept free between rooms and the map edge
pub const BORDER_MARGIN: usize = 2;

/// Maximum number of corridors touching one room
pub const MAX_DEGREE: usize = 2;

/// Candidate wall openings tried per room side for bent corridors
pub const EXIT_CANDIDATES: usize = 3;
