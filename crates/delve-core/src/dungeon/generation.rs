//! Level generation
//!
//! Runs placement and planning in a bounded retry loop. Every attempt starts
//! from an empty grid and a fresh random layout; the first attempt whose room
//! graph passes [`ConnectionPlan::check`] is returned.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{ExhaustionPolicy, GenConfig};
use crate::error::{ConfigError, GenerationError};
use crate::rng::GameRng;

use super::corridor::Corridor;
use super::placement::place_rooms;
use super::planner::{ConnectionPlan, plan_connections};
use super::{Room, Tile, TileGrid};

/// How a dungeon was accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Every room has degree 1 or 2 and the graph is connected
    Complete { attempts: usize },
    /// Attempts ran out; this is the last layout and `violation` is what it
    /// got wrong
    Degraded {
        attempts: usize,
        violation: GenerationError,
    },
}

impl GenerationStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, GenerationStatus::Complete { .. })
    }

    /// Attempts used to produce the dungeon
    pub fn attempts(&self) -> usize {
        match self {
            GenerationStatus::Complete { attempts } | GenerationStatus::Degraded { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// A generated level. Read-only once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub rooms: Vec<Room>,
    pub grid: TileGrid,
    pub corridors: Vec<Corridor>,
    pub status: GenerationStatus,
}

impl Dungeon {
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn tile(&self, x: usize, y: usize) -> Tile {
        self.grid.get(x, y)
    }

    pub fn is_floor(&self, x: usize, y: usize) -> bool {
        self.grid.get(x, y) == Tile::Floor
    }

    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.grid.get(x, y).is_wall()
    }

    /// Index of the room whose footprint holds the point
    pub fn room_at(&self, x: usize, y: usize) -> Option<usize> {
        self.rooms.iter().position(|r| r.contains(x, y))
    }

    /// Number of corridors touching `room`
    pub fn degree(&self, room: usize) -> usize {
        self.corridors.iter().filter(|c| c.touches(room)).count()
    }

    /// Connected room pairs as `(min, max)`
    pub fn edges(&self) -> BTreeSet<(usize, usize)> {
        self.corridors.iter().map(Corridor::edge).collect()
    }

    /// Re-check the degree and connectivity rules on the finished level
    pub fn validate(&self) -> Result<(), GenerationError> {
        ConnectionPlan::from_corridors(self.rooms.len(), self.corridors.clone()).check()
    }

    /// Random floor cell inside a random room
    pub fn spawn_point(&self, rng: &mut GameRng) -> Option<(usize, usize)> {
        rng.choose(&self.rooms)
            .map(|room| room.random_interior_point(rng))
    }
}

/// Rooms and corridors produced by one attempt
struct Layout {
    rooms: Vec<Room>,
    plan: ConnectionPlan,
}

fn layout(grid: &mut TileGrid, config: &GenConfig, rng: &mut GameRng) -> Layout {
    let placement = place_rooms(grid, config, rng);
    if let Some(shortfall) = placement.shortfall() {
        log::debug!("{shortfall}");
    }
    let plan = plan_connections(grid, &placement.rooms, config, rng);
    Layout {
        rooms: placement.rooms,
        plan,
    }
}

/// Generate one dungeon with `rng`.
///
/// Fails when `config` does not validate, or when every attempt was rejected
/// and `config.on_exhausted` is [`ExhaustionPolicy::Fail`].
pub fn generate_dungeon(config: &GenConfig, rng: &mut GameRng) -> Result<Dungeon, GenerationError> {
    config.validate()?;
    run_attempts(config, rng, |grid, rng| layout(grid, config, rng))
}

fn run_attempts(
    config: &GenConfig,
    rng: &mut GameRng,
    mut attempt_layout: impl FnMut(&mut TileGrid, &mut GameRng) -> Layout,
) -> Result<Dungeon, GenerationError> {
    let max_attempts = config.max_attempts.max(1);
    let mut grid = TileGrid::new(config.width, config.height);
    let mut attempt = 0;

    loop {
        attempt += 1;
        grid.reset();
        let Layout { rooms, plan } = attempt_layout(&mut grid, rng);

        let violation = match plan.check() {
            Ok(()) => {
                log::info!(
                    "generated {} rooms and {} corridors in {attempt} attempt(s)",
                    rooms.len(),
                    plan.corridors.len()
                );
                return Ok(Dungeon {
                    rooms,
                    grid,
                    corridors: plan.corridors,
                    status: GenerationStatus::Complete { attempts: attempt },
                });
            }
            Err(violation) => violation,
        };
        log::debug!("attempt {attempt} rejected: {violation}");

        if attempt < max_attempts {
            continue;
        }
        return match config.on_exhausted {
            ExhaustionPolicy::Degrade => {
                log::warn!("accepting degraded layout after {attempt} attempts: {violation}");
                Ok(Dungeon {
                    rooms,
                    grid,
                    corridors: plan.corridors,
                    status: GenerationStatus::Degraded {
                        attempts: attempt,
                        violation,
                    },
                })
            }
            ExhaustionPolicy::Fail => Err(GenerationError::AttemptsExhausted {
                attempts: attempt,
                last: Box::new(violation),
            }),
        };
    }
}

/// Level generator owning one random stream.
///
/// Successive calls to [`Generator::generate`] continue the same stream, so a
/// seeded generator replays the same sequence of levels.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GenConfig,
    rng: GameRng,
}

impl Generator {
    /// Validate `config` and seed the stream from `config.seed`, or from
    /// entropy when it is unset
    pub fn new(config: GenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = config.seed.map_or_else(GameRng::from_entropy, GameRng::new);
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Seed of the random stream
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Generate the next level
    pub fn generate(&mut self) -> Result<Dungeon, GenerationError> {
        generate_dungeon(&self.config, &mut self.rng)
    }
}
