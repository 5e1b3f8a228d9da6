//! Room structure
//!
//! A room is an axis-aligned rectangle whose outer ring is wall and whose
//! inside is floor. Coordinates and sizes include the walls.

use serde::{Deserialize, Serialize};

use crate::rng::GameRng;

/// Rectangle representing a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    /// X coordinate of the left wall
    pub x: usize,
    /// Y coordinate of the top wall
    pub y: usize,
    /// Width including both walls
    pub width: usize,
    /// Height including both walls
    pub height: usize,
}

impl Room {
    /// Create a new room
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the right wall
    pub fn right(&self) -> usize {
        self.x + self.width - 1
    }

    /// Y coordinate of the bottom wall
    pub fn bottom(&self) -> usize {
        self.y + self.height - 1
    }

    /// Check if this room comes closer than `gap` empty cells to another.
    ///
    /// Only `self` is inflated, so two rooms pass when at least `gap` cells
    /// separate their walls along some axis.
    pub fn overlaps(&self, other: &Room, gap: usize) -> bool {
        let x1 = self.x.saturating_sub(gap);
        let y1 = self.y.saturating_sub(gap);
        let x2 = self.x + self.width + gap;
        let y2 = self.y + self.height + gap;

        let ox1 = other.x;
        let oy1 = other.y;
        let ox2 = other.x + other.width;
        let oy2 = other.y + other.height;

        !(x2 <= ox1 || x1 >= ox2 || y2 <= oy1 || y1 >= oy2)
    }

    /// Get center point of room
    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Center of the floor area, always an interior cell. On an even-sized
    /// floor the cell right of (or below) the midline is picked.
    pub fn interior_center(&self) -> (usize, usize) {
        (
            self.x + 1 + (self.width - 2) / 2,
            self.y + 1 + (self.height - 2) / 2,
        )
    }

    /// Squared euclidean distance between the two room centers
    pub fn distance_sq(&self, other: &Room) -> usize {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ax.abs_diff(bx).pow(2) + ay.abs_diff(by).pow(2)
    }

    /// Check if point is inside the room, walls included
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Check if point is on the room's floor
    pub fn contains_interior(&self, x: usize, y: usize) -> bool {
        x > self.x && x < self.right() && y > self.y && y < self.bottom()
    }

    /// Check if point is on the room's wall ring
    pub fn is_perimeter(&self, x: usize, y: usize) -> bool {
        self.contains(x, y) && !self.contains_interior(x, y)
    }

    /// Check if point is one of the four corners
    pub fn is_corner(&self, x: usize, y: usize) -> bool {
        (x == self.x || x == self.right()) && (y == self.y || y == self.bottom())
    }

    /// Get a random point on the room's floor
    pub fn random_interior_point(&self, rng: &mut GameRng) -> (usize, usize) {
        let x = rng.range_inclusive(self.x + 1, self.right() - 1);
        let y = rng.range_inclusive(self.y + 1, self.bottom() - 1);
        (x, y)
    }

    /// Get floor area
    pub fn interior_area(&self) -> usize {
        (self.width - 2) * (self.height - 2)
    }
}
