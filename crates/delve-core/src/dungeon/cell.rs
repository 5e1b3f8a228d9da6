//! Map tile types

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Tile kind
///
/// Writes are monotonic during one attempt: `Empty` only ever becomes
/// `Floor`, `RoomWall` or `CorridorWall`, and the only other transitions are
/// `CorridorWall -> Floor` and `RoomWall -> Floor` (a wall opening).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Empty = 0,
    Floor = 1,
    RoomWall = 2,
    /// Padding laid beside corridor floor. Soft: later corridors may route
    /// next to it or through it.
    CorridorWall = 3,
}

impl Tile {
    /// Check if this is a wall type
    pub const fn is_wall(&self) -> bool {
        matches!(self, Tile::RoomWall | Tile::CorridorWall)
    }

    /// Check if a corridor centerline may be laid on this tile
    pub const fn is_routable(&self) -> bool {
        matches!(self, Tile::Empty | Tile::CorridorWall)
    }

    /// Get the display character for this tile
    pub const fn symbol(&self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Floor => '.',
            Tile::RoomWall => '#',
            Tile::CorridorWall => '=',
        }
    }

    /// Parse a display character back into a tile
    pub const fn from_symbol(c: char) -> Option<Tile> {
        match c {
            ' ' => Some(Tile::Empty),
            '.' => Some(Tile::Floor),
            '#' => Some(Tile::RoomWall),
            '=' => Some(Tile::CorridorWall),
            _ => None,
        }
    }
}
