//! Room placement by rejection sampling
//!
//! Rooms are drawn one at a time at random sizes and positions; a candidate
//! that comes within `room_gap` cells of an accepted room is discarded and
//! redrawn, up to `placement_attempts` times per room.

use crate::config::GenConfig;
use crate::consts::BORDER_MARGIN;
use crate::error::GenerationError;
use crate::rng::GameRng;

use super::{Room, TileGrid};

/// Result of one placement pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    pub rooms: Vec<Room>,
    /// Rooms asked for
    pub requested: usize,
    /// True when nothing fit and a centered room was inserted instead
    pub fallback: bool,
}

impl Placement {
    /// The shortfall, if fewer rooms than requested were placed
    pub(crate) fn shortfall(&self) -> Option<GenerationError> {
        if self.rooms.len() < self.requested {
            Some(GenerationError::PlacementShortfall {
                requested: self.requested,
                placed: self.rooms.len(),
            })
        } else {
            None
        }
    }
}

/// Inclusive size range for one axis, or `None` when even the minimum size
/// does not fit inside the margins.
fn size_range(min: usize, max: usize, extent: usize) -> Option<(usize, usize)> {
    let fit = extent.checked_sub(2 * BORDER_MARGIN)?;
    let hi = max.min(fit);
    if hi < min {
        return None;
    }
    Some((min, hi))
}

/// Room used when nothing could be placed: minimum size clamped to the grid,
/// centered.
fn fallback_room(config: &GenConfig, width: usize, height: usize) -> Room {
    let w = config.min_room_width.min(width);
    let h = config.min_room_height.min(height);
    Room::new((width - w) / 2, (height - h) / 2, w, h)
}

/// Place up to `config.room_count` rooms and stamp them into `grid`.
///
/// Stops early when a room cannot be placed within its attempt cap. Never
/// returns an empty set. `config` must already be validated.
pub(crate) fn place_rooms(grid: &mut TileGrid, config: &GenConfig, rng: &mut GameRng) -> Placement {
    let (width, height) = (grid.width(), grid.height());
    let mut rooms: Vec<Room> = Vec::with_capacity(config.room_count);

    let ranges = size_range(config.min_room_width, config.max_room_width, width)
        .zip(size_range(config.min_room_height, config.max_room_height, height));

    if let Some(((min_w, max_w), (min_h, max_h))) = ranges {
        'rooms: for index in 0..config.room_count {
            for _ in 0..config.placement_attempts {
                let w = rng.range_inclusive(min_w, max_w);
                let h = rng.range_inclusive(min_h, max_h);
                let x = rng.range_inclusive(BORDER_MARGIN, width - BORDER_MARGIN - w);
                let y = rng.range_inclusive(BORDER_MARGIN, height - BORDER_MARGIN - h);

                let room = Room::new(x, y, w, h);
                if rooms.iter().any(|r| room.overlaps(r, config.room_gap)) {
                    continue;
                }
                rooms.push(room);
                continue 'rooms;
            }
            log::debug!(
                "room {index}: no free spot after {} tries, stopping placement",
                config.placement_attempts
            );
            break;
        }
    } else {
        log::debug!("{width}x{height} grid cannot fit a minimum-size room");
    }

    let fallback = rooms.is_empty();
    if fallback {
        let room = fallback_room(config, width, height);
        log::debug!("using fallback room {room:?}");
        rooms.push(room);
    }

    for room in &rooms {
        grid.stamp_room(room);
    }

    Placement {
        rooms,
        requested: config.room_count,
        fallback,
    }
}
