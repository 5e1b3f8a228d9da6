//! delve-core: procedural dungeon generation
//!
//! Places rectangular rooms by rejection sampling, joins them with straight
//! or L-shaped corridors so that every room has one or two corridors and all
//! rooms are reachable, and retries whole layouts until one passes.
//!
//! This crate holds all generation logic with no I/O. Randomness comes from
//! an explicit [`GameRng`] handle, so a seed and a [`GenConfig`] always
//! produce the same levels.
//!
//! ```
//! use delve_core::{GenConfig, Generator};
//!
//! let mut generator = Generator::new(GenConfig {
//!     seed: Some(7),
//!     ..Default::default()
//! })
//! .unwrap();
//! let dungeon = generator.generate().unwrap();
//! assert!(!dungeon.rooms.is_empty());
//! ```

pub mod config;
pub mod consts;
pub mod dungeon;
pub mod error;
mod rng;

pub use config::{ExhaustionPolicy, GenConfig};
pub use dungeon::{Dungeon, GenerationStatus, Generator, Room, Tile, TileGrid};
pub use error::{ConfigError, GenerationError};
pub use rng::GameRng;
