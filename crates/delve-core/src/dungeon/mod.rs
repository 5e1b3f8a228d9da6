//! Dungeon system
//!
//! Contains the tile grid, rooms, and the generation pipeline: room
//! placement, connection planning, corridor routing and the retry loop.

mod cell;
mod corridor;
mod generation;
mod grid;
mod placement;
mod planner;
mod room;

pub use cell::Tile;
pub use corridor::{Corridor, CorridorShape, LegOrder, Point, Side, carve};
pub use generation::{Dungeon, GenerationStatus, Generator, generate_dungeon};
pub use grid::TileGrid;
pub use planner::{ConnectionPlan, ConnectivityTracker, nearest_neighbour_order};
pub use room::Room;
