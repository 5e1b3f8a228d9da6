//! Corridor routing, collision checking and carving
//!
//! A corridor leaves room A through a single opening in its wall, runs out
//! to an "outside center" a short distance beyond that wall, follows a
//! straight or L-shaped Manhattan path to the outside center of room B and
//! enters B through a second opening. Geometries are tried in priority order:
//! 1. Straight runs across the rows (or columns) both rooms share
//! 2. L-shaped runs between exits on the facing sides, longest first leg first
//!
//! The first geometry whose every centerline cell passes [`path_fits`] is
//! carved and the rest are not tried.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::consts::EXIT_CANDIDATES;
use crate::error::GenerationError;
use crate::rng::GameRng;

use super::{Room, Tile, TileGrid};

/// Signed grid position, so offsets past the map edge stay representable
pub type Point = (i32, i32);

/// Wall of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Unit step pointing out of the room
    pub const fn normal(self) -> Point {
        match self {
            Side::Left => (-1, 0),
            Side::Right => (1, 0),
            Side::Top => (0, -1),
            Side::Bottom => (0, 1),
        }
    }

    /// Left and right walls run vertically
    pub const fn is_vertical(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Which leg of a bent corridor is laid first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegOrder {
    HorizontalFirst,
    VerticalFirst,
}

/// Geometry family of a corridor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorridorShape {
    Straight,
    Bent(LegOrder),
}

/// A routed corridor between two rooms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    /// Room the corridor was routed from
    pub from: usize,
    /// Room the corridor was routed to
    pub to: usize,
    /// Wall openings in `from` and `to`
    pub openings: [Point; 2],
    /// Centerline between the openings, connectors included
    pub cells: Vec<Point>,
    pub shape: CorridorShape,
}

impl Corridor {
    fn from_waypoints(
        from: usize,
        to: usize,
        waypoints: &[Point],
        shape: CorridorShape,
    ) -> Option<Self> {
        let points = manhattan_path(waypoints);
        if points.len() < 3 {
            return None;
        }
        // A path that doubles back over itself would carve a loop
        let mut seen = HashSet::with_capacity(points.len());
        if !points.iter().all(|p| seen.insert(*p)) {
            return None;
        }
        let last = points.len() - 1;
        Some(Self {
            from,
            to,
            openings: [points[0], points[last]],
            cells: points[1..last].to_vec(),
            shape,
        })
    }

    /// Full path: opening, centerline, opening
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.openings[0])
            .chain(self.cells.iter().copied())
            .chain(std::iter::once(self.openings[1]))
    }

    /// Steps in the first straight run, counted from the `from` opening
    pub fn first_leg_len(&self) -> usize {
        fn step(w: &[Point]) -> Point {
            (w[1].0 - w[0].0, w[1].1 - w[0].1)
        }
        let points: Vec<Point> = self.points().collect();
        let Some(first) = points.windows(2).next().map(step) else {
            return 0;
        };
        points
            .windows(2)
            .take_while(|w| step(w) == first)
            .count()
    }

    /// Check if this corridor is one of the edges of `room`
    pub fn touches(&self, room: usize) -> bool {
        self.from == room || self.to == room
    }

    /// Room pair as `(min, max)`
    pub fn edge(&self) -> (usize, usize) {
        (self.from.min(self.to), self.from.max(self.to))
    }
}

fn manhattan(a: Point, b: Point) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

/// Cells from `a` to `b` inclusive, moving along the dominant axis first
fn manhattan_line(a: Point, b: Point) -> Vec<Point> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut out = Vec::with_capacity((dx.abs() + dy.abs() + 1) as usize);
    let (mut x, mut y) = a;
    out.push((x, y));
    let walk_x = |x: &mut i32, y: i32, out: &mut Vec<Point>| {
        while *x != b.0 {
            *x += dx.signum();
            out.push((*x, y));
        }
    };
    if dx.abs() >= dy.abs() {
        walk_x(&mut x, y, &mut out);
        while y != b.1 {
            y += dy.signum();
            out.push((x, y));
        }
    } else {
        while y != b.1 {
            y += dy.signum();
            out.push((x, y));
        }
        walk_x(&mut x, y, &mut out);
    }
    out
}

/// Concatenate Manhattan lines through each waypoint
fn manhattan_path(waypoints: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = waypoints.first().copied().into_iter().collect();
    for pair in waypoints.windows(2) {
        out.extend(manhattan_line(pair[0], pair[1]).into_iter().skip(1));
    }
    out
}

/// Offset of the outside center from its opening: at most `margin`, at
/// least 1, and never more than half the distance between the openings.
fn outside_offset(a: Point, b: Point, margin: usize) -> i32 {
    i32::try_from(margin)
        .unwrap_or(i32::MAX)
        .min((manhattan(a, b) / 2).max(1))
}

fn offset(p: Point, side: Side, by: i32) -> Point {
    let (nx, ny) = side.normal();
    (p.0 + nx * by, p.1 + ny * by)
}

fn wall_point(room: &Room, side: Side, along: usize) -> Point {
    let (x, y) = match side {
        Side::Left => (room.x, along),
        Side::Right => (room.right(), along),
        Side::Top => (along, room.y),
        Side::Bottom => (along, room.bottom()),
    };
    (x as i32, y as i32)
}

/// Non-corner span of a side, along its own axis
fn side_span(room: &Room, side: Side) -> (usize, usize) {
    if side.is_vertical() {
        (room.y + 1, room.bottom() - 1)
    } else {
        (room.x + 1, room.right() - 1)
    }
}

/// Sides of `room` that face `target`, best first.
///
/// Rooms separated along only one axis face each other on that axis. Rooms
/// separated diagonally try the axis with the larger center distance first.
pub(crate) fn facing_sides(room: &Room, target: &Room) -> Vec<Side> {
    let horizontal = if room.right() < target.x {
        Some(Side::Right)
    } else if target.right() < room.x {
        Some(Side::Left)
    } else {
        None
    };
    let vertical = if room.bottom() < target.y {
        Some(Side::Bottom)
    } else if target.bottom() < room.y {
        Some(Side::Top)
    } else {
        None
    };
    let (cx, cy) = room.center();
    let (tx, ty) = target.center();
    let horizontal_first = cx.abs_diff(tx) >= cy.abs_diff(ty);

    match (horizontal, vertical) {
        (Some(h), Some(v)) if horizontal_first => vec![h, v],
        (Some(h), Some(v)) => vec![v, h],
        (Some(h), None) => vec![h],
        (None, Some(v)) => vec![v],
        (None, None) if horizontal_first => {
            vec![if tx >= cx { Side::Right } else { Side::Left }]
        }
        (None, None) => vec![if ty >= cy { Side::Bottom } else { Side::Top }],
    }
}

/// Up to [`EXIT_CANDIDATES`] opening positions along `side`: the cell
/// nearest the target's center, the middle of the side and one in between.
pub(crate) fn exit_candidates(room: &Room, side: Side, target: &Room) -> Vec<usize> {
    let (lo, hi) = side_span(room, side);
    let (tx, ty) = target.center();
    let toward = if side.is_vertical() { ty } else { tx };
    let nearest = toward.clamp(lo, hi);
    let middle = lo + (hi - lo) / 2;
    let between = nearest.min(middle) + nearest.abs_diff(middle) / 2;

    let mut out = Vec::with_capacity(EXIT_CANDIDATES);
    for c in [nearest, between, middle] {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out.truncate(EXIT_CANDIDATES);
    out
}

/// Straight corridors across the shared rows or columns, scanned from a
/// random starting line.
fn straight_candidates(
    from: usize,
    to: usize,
    a: &Room,
    b: &Room,
    margin: usize,
    rng: &mut GameRng,
) -> Vec<Corridor> {
    let (side_a, side_b, lo, hi) = if a.right() < b.x || b.right() < a.x {
        let sides = if a.right() < b.x {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        };
        (sides.0, sides.1, a.y.max(b.y) + 1, a.bottom().min(b.bottom()))
    } else if a.bottom() < b.y || b.bottom() < a.y {
        let sides = if a.bottom() < b.y {
            (Side::Bottom, Side::Top)
        } else {
            (Side::Top, Side::Bottom)
        };
        (sides.0, sides.1, a.x.max(b.x) + 1, a.right().min(b.right()))
    } else {
        return Vec::new();
    };
    // `hi` is exclusive: the shared span minus the far corner row
    if lo >= hi {
        return Vec::new();
    }

    let lines: Vec<usize> = (lo..hi).collect();
    let start = rng.rn2(lines.len());
    lines[start..]
        .iter()
        .chain(&lines[..start])
        .filter_map(|&along| {
            let open_a = wall_point(a, side_a, along);
            let open_b = wall_point(b, side_b, along);
            let m = outside_offset(open_a, open_b, margin);
            let waypoints = [
                open_a,
                offset(open_a, side_a, m),
                offset(open_b, side_b, m),
                open_b,
            ];
            Corridor::from_waypoints(from, to, &waypoints, CorridorShape::Straight)
        })
        .collect()
}

/// L-shaped corridors between candidate exits on the facing sides.
///
/// For every exit pair both leg orders are built and the one whose first
/// straight run is longer comes first.
fn bent_candidates(from: usize, to: usize, a: &Room, b: &Room, margin: usize) -> Vec<Corridor> {
    let mut out = Vec::new();
    for (side_a, side_b) in facing_sides(a, b).into_iter().zip(facing_sides(b, a)) {
        for along_a in exit_candidates(a, side_a, b) {
            for along_b in exit_candidates(b, side_b, a) {
                let open_a = wall_point(a, side_a, along_a);
                let open_b = wall_point(b, side_b, along_b);
                let m = outside_offset(open_a, open_b, margin);
                let out_a = offset(open_a, side_a, m);
                let out_b = offset(open_b, side_b, m);

                let mut pair: Vec<Corridor> = [
                    (LegOrder::HorizontalFirst, (out_b.0, out_a.1)),
                    (LegOrder::VerticalFirst, (out_a.0, out_b.1)),
                ]
                .into_iter()
                .filter_map(|(order, bend)| {
                    Corridor::from_waypoints(
                        from,
                        to,
                        &[open_a, out_a, bend, out_b, open_b],
                        CorridorShape::Bent(order),
                    )
                })
                .collect();
                pair.sort_by_key(|c| std::cmp::Reverse(c.first_leg_len()));
                out.extend(pair);
            }
        }
    }
    out
}

/// Check a corridor against the current grid.
///
/// Every centerline cell must be free (`Empty` or soft `CorridorWall`) and
/// each cell of its 3x3 neighbourhood must be in bounds and one of: free,
/// an opening of this corridor, inside either end room, or floor within one
/// step of an opening.
pub(crate) fn path_fits(grid: &TileGrid, a: &Room, b: &Room, corridor: &Corridor) -> bool {
    let [open_a, open_b] = corridor.openings;
    let in_end_room = |(x, y): Point| {
        let (x, y) = (x as usize, y as usize);
        a.contains(x, y) || b.contains(x, y)
    };

    corridor.cells.iter().all(|&(cx, cy)| {
        if !grid.at(cx, cy).is_some_and(|t| t.is_routable()) {
            return false;
        }
        (-1..=1).all(|dx| {
            (-1..=1).all(|dy| {
                let q = (cx + dx, cy + dy);
                match grid.at(q.0, q.1) {
                    None => false,
                    Some(Tile::Empty | Tile::CorridorWall) => true,
                    Some(tile) => {
                        q == open_a
                            || q == open_b
                            || in_end_room(q)
                            || (tile == Tile::Floor
                                && (manhattan(q, open_a) <= 1 || manhattan(q, open_b) <= 1))
                    }
                }
            })
        })
    })
}

/// Write a validated corridor into the grid.
///
/// Centerline becomes `Floor`, its still-empty 8-neighbours become
/// `CorridorWall`, and both openings are cut through the room walls.
/// Carving the same corridor twice leaves the grid unchanged.
pub fn carve(grid: &mut TileGrid, corridor: &Corridor) {
    for &(x, y) in &corridor.cells {
        if grid.at(x, y).is_some_and(|t| t != Tile::RoomWall) {
            grid.set(x as usize, y as usize, Tile::Floor);
        }
    }
    for &(x, y) in &corridor.cells {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if grid.at(nx, ny) == Some(Tile::Empty) {
                    grid.set(nx as usize, ny as usize, Tile::CorridorWall);
                }
            }
        }
    }
    for &(x, y) in &corridor.openings {
        if grid.in_bounds(x, y) {
            grid.set(x as usize, y as usize, Tile::Floor);
        }
    }
}

/// Route and carve one corridor from room `from` to room `to`.
///
/// Straight geometries are tried before bent ones; bent ones are only built
/// once every straight one has been rejected.
pub(crate) fn route_corridor(
    grid: &mut TileGrid,
    rooms: &[Room],
    from: usize,
    to: usize,
    margin: usize,
    rng: &mut GameRng,
) -> Result<Corridor, GenerationError> {
    let failure = GenerationError::RoutingFailure { from, to };
    let (Some(a), Some(b)) = (rooms.get(from), rooms.get(to)) else {
        return Err(failure);
    };
    if from == to {
        return Err(failure);
    }

    let straight = straight_candidates(from, to, a, b, margin, rng);
    let found = straight
        .into_iter()
        .find(|c| path_fits(grid, a, b, c))
        .or_else(|| {
            bent_candidates(from, to, a, b, margin)
                .into_iter()
                .find(|c| path_fits(grid, a, b, c))
        });

    match found {
        Some(corridor) => {
            carve(grid, &corridor);
            log::trace!(
                "corridor {from} -> {to}: {:?}, {} cells",
                corridor.shape,
                corridor.cells.len()
            );
            Ok(corridor)
        }
        None => {
            log::trace!("corridor {from} -> {to}: no geometry fits");
            Err(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamped(width: usize, height: usize, rooms: &[Room]) -> TileGrid {
        let mut grid = TileGrid::new(width, height);
        for room in rooms {
            grid.stamp_room(room);
        }
        grid
    }

    /// Every candidate geometry for `from -> to`, in the order they are tried
    fn candidate_corridors(
        rooms: &[Room],
        from: usize,
        to: usize,
        margin: usize,
        rng: &mut GameRng,
    ) -> Vec<Corridor> {
        let (Some(a), Some(b)) = (rooms.get(from), rooms.get(to)) else {
            return Vec::new();
        };
        if from == to {
            return Vec::new();
        }
        let mut out = straight_candidates(from, to, a, b, margin, rng);
        out.extend(bent_candidates(from, to, a, b, margin));
        out
    }

    #[test]
    fn test_manhattan_line_dominant_axis_first() {
        assert_eq!(
            manhattan_line((0, 0), (3, 1)),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (3, 1)]
        );
        assert_eq!(
            manhattan_line((0, 0), (-1, -2)),
            vec![(0, 0), (0, -1), (0, -2), (-1, -2)]
        );
        assert_eq!(manhattan_line((4, 4), (4, 4)), vec![(4, 4)]);
    }

    #[test]
    fn test_outside_offset_is_adaptive() {
        assert_eq!(outside_offset((0, 0), (20, 0), 2), 2);
        assert_eq!(outside_offset((0, 0), (3, 0), 2), 1);
        assert_eq!(outside_offset((0, 0), (1, 0), 2), 1);
        // Oversized margins saturate instead of wrapping negative
        assert_eq!(outside_offset((0, 0), (20, 0), usize::MAX), 10);
    }

    #[test]
    fn test_facing_sides() {
        let a = Room::new(2, 2, 6, 5);
        let right = Room::new(20, 3, 6, 5);
        let below = Room::new(3, 14, 6, 5);
        let diagonal = Room::new(30, 14, 6, 5);

        assert_eq!(facing_sides(&a, &right), vec![Side::Right]);
        assert_eq!(facing_sides(&right, &a), vec![Side::Left]);
        assert_eq!(facing_sides(&a, &below), vec![Side::Bottom]);
        assert_eq!(facing_sides(&below, &a), vec![Side::Top]);
        assert_eq!(facing_sides(&a, &diagonal), vec![Side::Right, Side::Bottom]);
        assert_eq!(facing_sides(&diagonal, &a), vec![Side::Left, Side::Top]);
    }

    #[test]
    fn test_exit_candidates_avoid_corners() {
        let room = Room::new(10, 10, 8, 6);
        let far_below = Room::new(40, 40, 5, 5);
        let exits = exit_candidates(&room, Side::Right, &far_below);
        assert_eq!(exits, vec![14, 13, 12]);
        assert!(exits.iter().all(|&y| y > room.y && y < room.bottom()));

        let tiny = Room::new(0, 0, 3, 3);
        assert_eq!(exit_candidates(&tiny, Side::Top, &far_below), vec![1]);
    }

    #[test]
    fn test_straight_corridor_between_aligned_rooms() {
        let rooms = [Room::new(3, 4, 8, 6), Room::new(30, 5, 8, 6)];
        let mut grid = stamped(50, 16, &rooms);
        let mut rng = GameRng::new(1);

        let corridor = route_corridor(&mut grid, &rooms, 0, 1, 2, &mut rng).unwrap();
        assert_eq!(corridor.shape, CorridorShape::Straight);

        let [(ax, ay), (bx, by)] = corridor.openings;
        assert_eq!(ax, 10);
        assert_eq!(bx, 30);
        assert_eq!(ay, by);
        assert!((6..=8).contains(&ay));
        assert_eq!(corridor.cells.len(), 19);
        assert!(corridor.cells.iter().all(|&(_, y)| y == ay));

        assert_eq!(grid.get(10, ay as usize), Tile::Floor);
        assert_eq!(grid.get(30, ay as usize), Tile::Floor);
        for x in 11..30 {
            assert_eq!(grid.get(x, ay as usize), Tile::Floor);
            assert_eq!(grid.get(x, ay as usize - 1), Tile::CorridorWall);
            assert_eq!(grid.get(x, ay as usize + 1), Tile::CorridorWall);
        }
    }

    #[test]
    fn test_bent_corridor_prefers_longer_first_leg() {
        let rooms = [Room::new(5, 2, 8, 6), Room::new(40, 14, 8, 6)];
        let mut grid = stamped(60, 25, &rooms);
        let mut rng = GameRng::new(1);

        let corridor = route_corridor(&mut grid, &rooms, 0, 1, 2, &mut rng).unwrap();
        assert_eq!(corridor.shape, CorridorShape::Bent(LegOrder::HorizontalFirst));
        assert_eq!(corridor.openings, [(12, 6), (40, 15)]);
        assert_eq!(corridor.first_leg_len(), 26);

        let alternative = candidate_corridors(&rooms, 0, 1, 2, &mut rng)
            .into_iter()
            .find(|c| {
                c.openings == corridor.openings
                    && c.shape == CorridorShape::Bent(LegOrder::VerticalFirst)
            })
            .unwrap();
        assert!(corridor.first_leg_len() > alternative.first_leg_len());
    }

    #[test]
    fn test_path_rejects_foreign_room_wall() {
        // Room 2 sits between rooms 0 and 1 on the only shared rows
        let rooms = [
            Room::new(2, 2, 6, 5),
            Room::new(30, 2, 6, 5),
            Room::new(15, 1, 6, 7),
        ];
        let grid = stamped(40, 12, &rooms);
        let mut rng = GameRng::new(5);
        let straight: Vec<Corridor> = candidate_corridors(&rooms, 0, 1, 2, &mut rng)
            .into_iter()
            .filter(|c| c.shape == CorridorShape::Straight)
            .collect();
        assert!(!straight.is_empty());
        assert!(straight
            .iter()
            .all(|c| !path_fits(&grid, &rooms[0], &rooms[1], c)));
    }

    #[test]
    fn test_corridors_never_share_cells() {
        // Rooms 0/1 stacked on the left, 2/3 stacked on the right
        let rooms = [
            Room::new(2, 2, 6, 5),
            Room::new(2, 14, 6, 5),
            Room::new(30, 2, 6, 5),
            Room::new(30, 14, 6, 5),
        ];
        let mut grid = stamped(45, 24, &rooms);
        let mut rng = GameRng::new(2);

        let mut corridors = Vec::new();
        for (from, to) in [(0, 2), (1, 3), (0, 3), (1, 2)] {
            if let Ok(corridor) = route_corridor(&mut grid, &rooms, from, to, 2, &mut rng) {
                corridors.push(corridor);
            }
        }
        assert!(corridors.len() >= 3);
        for (i, a) in corridors.iter().enumerate() {
            let cells: HashSet<Point> = a.cells.iter().copied().collect();
            for b in &corridors[i + 1..] {
                assert!(b.cells.iter().all(|p| !cells.contains(p)));
                assert!(b.openings.iter().all(|p| !a.openings.contains(p)));
            }
        }
    }

    #[test]
    fn test_carve_is_idempotent() {
        let rooms = [Room::new(5, 2, 8, 6), Room::new(40, 14, 8, 6)];
        let mut grid = stamped(60, 25, &rooms);
        let mut rng = GameRng::new(9);
        let corridor = route_corridor(&mut grid, &rooms, 0, 1, 2, &mut rng).unwrap();

        let once = grid.clone();
        carve(&mut grid, &corridor);
        assert_eq!(grid, once);
    }

    #[test]
    fn test_carve_never_touches_room_floor() {
        let rooms = [Room::new(3, 4, 8, 6), Room::new(30, 5, 8, 6)];
        let mut grid = stamped(50, 16, &rooms);
        let mut rng = GameRng::new(4);
        route_corridor(&mut grid, &rooms, 0, 1, 2, &mut rng).unwrap();

        for room in &rooms {
            for x in room.x + 1..room.right() {
                for y in room.y + 1..room.bottom() {
                    assert_eq!(grid.get(x, y), Tile::Floor);
                }
            }
        }
        // Only one wall cell per room was opened
        let walls = |r: &Room| 2 * r.width + 2 * (r.height - 2);
        assert_eq!(
            grid.count(Tile::RoomWall),
            walls(&rooms[0]) + walls(&rooms[1]) - 2
        );
    }

    #[test]
    fn test_routing_failure_is_reported() {
        // Room 2 fills the whole height between rooms 0 and 1
        let rooms = [
            Room::new(0, 0, 5, 5),
            Room::new(12, 0, 5, 5),
            Room::new(6, 0, 5, 5),
        ];
        let mut grid = stamped(17, 5, &rooms);
        let before = grid.clone();
        let mut rng = GameRng::new(0);
        assert_eq!(
            route_corridor(&mut grid, &rooms, 0, 1, 2, &mut rng),
            Err(GenerationError::RoutingFailure { from: 0, to: 1 })
        );
        assert_eq!(grid, before);
        assert_eq!(
            route_corridor(&mut grid, &rooms, 1, 1, 2, &mut rng),
            Err(GenerationError::RoutingFailure { from: 1, to: 1 })
        );
    }
}
