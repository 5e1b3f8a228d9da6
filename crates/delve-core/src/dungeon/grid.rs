//! Tile grid shared by every generation stage

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Room, Tile};

/// 2-D tile map, indexed `cells[x][y]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Tile>>,
}

impl TileGrid {
    /// Create an all-`Empty` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![Tile::Empty; height]; width],
        }
    }

    /// Build a grid from rows of tile symbols. Returns `None` on unknown
    /// symbols or ragged rows.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return None;
            }
            for (x, c) in row.chars().enumerate() {
                grid.cells[x][y] = Tile::from_symbol(c)?;
            }
        }
        Some(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Clear every tile back to `Empty`
    pub fn reset(&mut self) {
        for col in &mut self.cells {
            col.fill(Tile::Empty);
        }
    }

    /// Tile at a position, `Empty` outside the grid
    pub fn get(&self, x: usize, y: usize) -> Tile {
        self.cells
            .get(x)
            .and_then(|col| col.get(y))
            .copied()
            .unwrap_or(Tile::Empty)
    }

    /// Tile at a signed position, `None` outside the grid
    pub fn at(&self, x: i32, y: i32) -> Option<Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[x as usize][y as usize])
    }

    /// Overwrite a tile. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if let Some(cell) = self.cells.get_mut(x).and_then(|col| col.get_mut(y)) {
            *cell = tile;
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Write a room's wall ring and floor
    pub fn stamp_room(&mut self, room: &Room) {
        for x in room.x..=room.right() {
            for y in room.y..=room.bottom() {
                let tile = if room.is_perimeter(x, y) {
                    Tile::RoomWall
                } else {
                    Tile::Floor
                };
                self.set(x, y, tile);
            }
        }
    }

    /// Number of tiles of the given kind
    pub fn count(&self, tile: Tile) -> usize {
        self.cells
            .iter()
            .flat_map(|col| col.iter())
            .filter(|&&t| t == tile)
            .count()
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                write!(f, "{}", self.cells[x][y].symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
