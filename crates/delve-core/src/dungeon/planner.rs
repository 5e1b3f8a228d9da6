//! Connection planning
//!
//! Decides which room pairs get a corridor. Every room ends with at most
//! [`MAX_DEGREE`] corridors; the passes below try to leave every room with at
//! least one and the whole room graph in a single component:
//! 1. Nearest-neighbour walk from a random start room
//! 2. Greedy top-up with the globally closest pair that still has capacity
//! 3. Isolated rooms try every other room by increasing distance
//! 4. Connectivity repair across components, closest pair first

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::GenConfig;
use crate::consts::MAX_DEGREE;
use crate::error::GenerationError;
use crate::rng::GameRng;

use super::corridor::{Corridor, route_corridor};
use super::{Room, TileGrid};

/// Connectivity tracker for rooms (equivalence classes)
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    /// Each room's equivalence class (rooms in same class are connected)
    smeq: Vec<usize>,
}

impl ConnectivityTracker {
    /// Create a new tracker for the given number of rooms
    pub fn new(num_rooms: usize) -> Self {
        Self {
            smeq: (0..num_rooms).collect(),
        }
    }

    /// Tracker with every edge already merged
    pub fn from_edges(num_rooms: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut tracker = Self::new(num_rooms);
        for (a, b) in edges {
            tracker.merge(a, b);
        }
        tracker
    }

    /// Check if two rooms are connected (in same equivalence class)
    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        if a >= self.smeq.len() || b >= self.smeq.len() {
            return false;
        }
        self.smeq[a] == self.smeq[b]
    }

    /// Merge equivalence classes when rooms are connected
    pub fn merge(&mut self, a: usize, b: usize) {
        if a >= self.smeq.len() || b >= self.smeq.len() {
            return;
        }

        let old_class = self.smeq[b];
        let new_class = self.smeq[a];
        for eq in &mut self.smeq {
            if *eq == old_class {
                *eq = new_class;
            }
        }
    }

    /// Check if all rooms are connected
    pub fn all_connected(&self) -> bool {
        self.component_count() <= 1
    }

    /// Number of connected components
    pub fn component_count(&self) -> usize {
        self.smeq.iter().collect::<HashSet<_>>().len()
    }
}

/// Corridors chosen for one layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPlan {
    pub corridors: Vec<Corridor>,
    /// Connected pairs as `(min, max)`
    pub edges: BTreeSet<(usize, usize)>,
    /// Corridor count per room
    pub degrees: Vec<usize>,
}

impl ConnectionPlan {
    fn new(num_rooms: usize) -> Self {
        Self {
            corridors: Vec::new(),
            edges: BTreeSet::new(),
            degrees: vec![0; num_rooms],
        }
    }

    /// Rebuild degrees and edges from finished corridors
    pub fn from_corridors(num_rooms: usize, corridors: Vec<Corridor>) -> Self {
        let mut plan = Self::new(num_rooms);
        for corridor in &corridors {
            for room in [corridor.from, corridor.to] {
                if let Some(degree) = plan.degrees.get_mut(room) {
                    *degree += 1;
                }
            }
            plan.edges.insert(corridor.edge());
        }
        plan.corridors = corridors;
        plan
    }

    pub fn component_count(&self) -> usize {
        ConnectivityTracker::from_edges(self.degrees.len(), self.edges.iter().copied())
            .component_count()
    }

    /// Accept the plan when every room has degree 1 or 2 and the graph is a
    /// single component. A lone room needs no corridor.
    pub fn check(&self) -> Result<(), GenerationError> {
        if self.degrees.len() <= 1 {
            return Ok(());
        }
        if let Some((room, &degree)) = self
            .degrees
            .iter()
            .enumerate()
            .find(|&(_, &d)| d == 0 || d > MAX_DEGREE)
        {
            return Err(GenerationError::DegreeViolation { room, degree });
        }
        match self.component_count() {
            1 => Ok(()),
            components => Err(GenerationError::Disconnected { components }),
        }
    }
}

/// Visiting order that always steps to the closest unvisited room.
/// Ties go to the lower index.
pub fn nearest_neighbour_order(rooms: &[Room], start: usize) -> Vec<usize> {
    if start >= rooms.len() {
        return Vec::new();
    }
    let mut order = Vec::with_capacity(rooms.len());
    let mut visited = vec![false; rooms.len()];
    let mut current = start;
    loop {
        visited[current] = true;
        order.push(current);
        let next = (0..rooms.len())
            .filter(|&i| !visited[i])
            .min_by_key(|&i| (rooms[current].distance_sq(&rooms[i]), i));
        match next {
            Some(i) => current = i,
            None => break,
        }
    }
    order
}

struct Planner<'a> {
    grid: &'a mut TileGrid,
    rooms: &'a [Room],
    margin: usize,
    rng: &'a mut GameRng,
    tracker: ConnectivityTracker,
    plan: ConnectionPlan,
}

impl<'a> Planner<'a> {
    fn new(grid: &'a mut TileGrid, rooms: &'a [Room], margin: usize, rng: &'a mut GameRng) -> Self {
        Self {
            grid,
            rooms,
            margin,
            rng,
            tracker: ConnectivityTracker::new(rooms.len()),
            plan: ConnectionPlan::new(rooms.len()),
        }
    }

    fn has_capacity(&self, room: usize) -> bool {
        self.plan.degrees[room] < MAX_DEGREE
    }

    fn is_candidate(&self, a: usize, b: usize) -> bool {
        a != b
            && self.has_capacity(a)
            && self.has_capacity(b)
            && !self.plan.edges.contains(&(a.min(b), a.max(b)))
    }

    /// Route `a -> b`, then `b -> a`. Records the edge on success.
    ///
    /// Refuses pairs where either room is already at [`MAX_DEGREE`], so no
    /// pass can push a degree past the limit.
    fn connect(&mut self, a: usize, b: usize) -> bool {
        if !self.is_candidate(a, b) {
            return false;
        }
        let routed = route_corridor(self.grid, self.rooms, a, b, self.margin, self.rng)
            .or_else(|_| route_corridor(self.grid, self.rooms, b, a, self.margin, self.rng));
        let corridor = match routed {
            Ok(corridor) => corridor,
            Err(err) => {
                log::trace!("{err}");
                return false;
            }
        };

        self.plan.degrees[a] += 1;
        self.plan.degrees[b] += 1;
        self.plan.edges.insert(corridor.edge());
        self.plan.corridors.push(corridor);
        self.tracker.merge(a, b);
        true
    }

    /// Closest pair passing `accept` that is still a candidate and untried
    fn closest_pair(
        &self,
        tried: &HashSet<(usize, usize)>,
        accept: impl Fn(usize, usize) -> bool,
    ) -> Option<(usize, usize)> {
        let n = self.rooms.len();
        (0..n)
            .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
            .filter(|&(a, b)| self.is_candidate(a, b) && !tried.contains(&(a, b)) && accept(a, b))
            .min_by_key(|&(a, b)| (self.rooms[a].distance_sq(&self.rooms[b]), a, b))
    }

    fn walk_order(&mut self) {
        let start = self.rng.rn2(self.rooms.len());
        let order = nearest_neighbour_order(self.rooms, start);
        for pair in order.windows(2) {
            self.connect(pair[0], pair[1]);
        }
    }

    fn top_up(&mut self) {
        let mut tried = HashSet::new();
        loop {
            // Cycles are only closed once nothing is left to join
            let split = !self.tracker.all_connected();
            let tracker = &self.tracker;
            let Some(pair) = self.closest_pair(&tried, |a, b| !split || !tracker.are_connected(a, b))
            else {
                break;
            };
            tried.insert(pair);
            self.connect(pair.0, pair.1);
        }
    }

    fn attach_isolated(&mut self) {
        for room in 0..self.rooms.len() {
            if self.plan.degrees[room] > 0 {
                continue;
            }
            let mut others: Vec<usize> = (0..self.rooms.len()).filter(|&o| o != room).collect();
            others.sort_by_key(|&o| (self.rooms[room].distance_sq(&self.rooms[o]), o));
            for other in others {
                if self.has_capacity(other) && self.connect(room, other) {
                    break;
                }
            }
        }
    }

    fn repair(&mut self) {
        let mut tried = HashSet::new();
        while !self.tracker.all_connected() {
            let tracker = &self.tracker;
            let Some(pair) = self.closest_pair(&tried, |a, b| !tracker.are_connected(a, b)) else {
                log::trace!(
                    "{} components left and no joinable pair",
                    self.tracker.component_count()
                );
                break;
            };
            tried.insert(pair);
            self.connect(pair.0, pair.1);
        }
    }
}

/// Pick and carve the corridors for `rooms`.
///
/// The returned plan may still fail [`ConnectionPlan::check`]; the caller
/// decides whether to retry.
pub(crate) fn plan_connections(
    grid: &mut TileGrid,
    rooms: &[Room],
    config: &GenConfig,
    rng: &mut GameRng,
) -> ConnectionPlan {
    if rooms.len() < 2 {
        return ConnectionPlan::new(rooms.len());
    }

    let mut planner = Planner::new(grid, rooms, config.corridor_margin, rng);
    planner.walk_order();
    planner.top_up();
    planner.attach_isolated();
    planner.repair();

    log::debug!(
        "planned {} corridors over {} rooms, {} components",
        planner.plan.corridors.len(),
        rooms.len(),
        planner.tracker.component_count()
    );
    planner.plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::corridor::{CorridorShape, LegOrder};

    fn plan_for(width: usize, height: usize, rooms: &[Room], seed: u64) -> ConnectionPlan {
        let mut grid = TileGrid::new(width, height);
        for room in rooms {
            grid.stamp_room(room);
        }
        plan_connections(&mut grid, rooms, &GenConfig::default(), &mut GameRng::new(seed))
    }

    #[test]
    fn test_connectivity_tracker() {
        let mut tracker = ConnectivityTracker::new(5);

        assert!(!tracker.are_connected(0, 1));
        assert_eq!(tracker.component_count(), 5);

        tracker.merge(0, 1);
        assert!(tracker.are_connected(0, 1));
        assert!(!tracker.are_connected(0, 2));

        // 0 and 2 join through 1
        tracker.merge(1, 2);
        assert!(tracker.are_connected(0, 2));
        assert!(!tracker.all_connected());
        assert_eq!(tracker.component_count(), 3);

        tracker.merge(2, 3);
        tracker.merge(3, 4);
        assert!(tracker.all_connected());
        assert!(!tracker.are_connected(0, 9));
    }

    #[test]
    fn test_nearest_neighbour_order() {
        let rooms = [
            Room::new(0, 0, 5, 5),
            Room::new(10, 0, 5, 5),
            Room::new(20, 0, 5, 5),
            Room::new(30, 0, 5, 5),
        ];
        assert_eq!(nearest_neighbour_order(&rooms, 0), vec![0, 1, 2, 3]);
        // Equal distances to 1 and 3: lower index wins
        assert_eq!(nearest_neighbour_order(&rooms, 2), vec![2, 1, 0, 3]);
        assert!(nearest_neighbour_order(&rooms, 4).is_empty());
    }

    #[test]
    fn test_two_rooms_on_a_row_get_a_straight_corridor() {
        let rooms = [Room::new(3, 4, 8, 6), Room::new(30, 5, 8, 6)];
        let plan = plan_for(50, 16, &rooms, 1);

        assert_eq!(plan.corridors.len(), 1);
        assert_eq!(plan.corridors[0].shape, CorridorShape::Straight);
        assert_eq!(plan.degrees, vec![1, 1]);
        assert_eq!(plan.check(), Ok(()));
    }

    #[test]
    fn test_diagonal_rooms_get_a_bent_corridor() {
        let rooms = [Room::new(5, 2, 8, 6), Room::new(40, 14, 8, 6)];
        let plan = plan_for(60, 25, &rooms, 1);

        assert_eq!(plan.corridors.len(), 1);
        let corridor = &plan.corridors[0];
        assert!(matches!(corridor.shape, CorridorShape::Bent(_)));
        // Whichever direction was routed, the longer first run was preferred
        if corridor.from == 0 {
            assert_eq!(corridor.shape, CorridorShape::Bent(LegOrder::HorizontalFirst));
        }
        assert_eq!(plan.check(), Ok(()));
    }

    #[test]
    fn test_single_room_needs_no_corridor() {
        let rooms = [Room::new(2, 2, 6, 5)];
        let plan = plan_for(20, 10, &rooms, 0);
        assert!(plan.corridors.is_empty());
        assert!(plan.edges.is_empty());
        assert_eq!(plan.check(), Ok(()));
    }

    #[test]
    fn test_row_of_rooms_forms_a_path() {
        let rooms = [
            Room::new(2, 5, 6, 6),
            Room::new(14, 5, 6, 6),
            Room::new(26, 5, 6, 6),
            Room::new(38, 5, 6, 6),
        ];
        for seed in 0..10 {
            let plan = plan_for(50, 16, &rooms, seed);
            let edges: Vec<_> = plan.edges.iter().copied().collect();
            assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3)], "seed {seed}");
            assert_eq!(plan.degrees, vec![1, 2, 2, 1]);
            assert_eq!(plan.check(), Ok(()));
        }
    }

    #[test]
    fn test_degrees_never_exceed_limit() {
        let config = GenConfig::default();
        for seed in 0..10 {
            let mut rng = GameRng::new(seed);
            let mut grid = TileGrid::new(config.width, config.height);
            let placement = crate::dungeon::placement::place_rooms(&mut grid, &config, &mut rng);
            let plan = plan_connections(&mut grid, &placement.rooms, &config, &mut rng);

            assert!(plan.degrees.iter().all(|&d| d <= MAX_DEGREE));
            assert_eq!(plan.edges.len(), plan.corridors.len());
            assert_eq!(plan.degrees.iter().sum::<usize>(), 2 * plan.edges.len());
        }
    }

    #[test]
    fn test_degree_bound_holds_after_each_pass() {
        fn within_limit(planner: &Planner<'_>, pass: &str, seed: u64) {
            assert!(
                planner.plan.degrees.iter().all(|&d| d <= MAX_DEGREE),
                "seed {seed}, after {pass}: {:?}",
                planner.plan.degrees
            );
        }

        let config = GenConfig {
            room_count: 12,
            ..Default::default()
        };
        for seed in 0..10 {
            let mut rng = GameRng::new(seed);
            let mut grid = TileGrid::new(config.width, config.height);
            let placement = crate::dungeon::placement::place_rooms(&mut grid, &config, &mut rng);
            let mut planner =
                Planner::new(&mut grid, &placement.rooms, config.corridor_margin, &mut rng);

            planner.walk_order();
            within_limit(&planner, "walk", seed);
            planner.top_up();
            within_limit(&planner, "top-up", seed);
            planner.attach_isolated();
            within_limit(&planner, "isolated rooms", seed);
            planner.repair();
            within_limit(&planner, "repair", seed);
        }
    }

    #[test]
    fn test_full_room_refuses_more_corridors() {
        let rooms = [
            Room::new(2, 5, 6, 6),
            Room::new(14, 5, 6, 6),
            Room::new(26, 5, 6, 6),
            Room::new(14, 16, 6, 6),
        ];
        let mut grid = TileGrid::new(40, 26);
        for room in &rooms {
            grid.stamp_room(room);
        }
        let mut rng = GameRng::new(3);
        let mut planner = Planner::new(&mut grid, &rooms, 2, &mut rng);

        assert!(planner.connect(0, 1));
        assert!(planner.connect(1, 2));
        assert_eq!(planner.plan.degrees[1], MAX_DEGREE);
        assert!(!planner.connect(1, 3));
        assert_eq!(planner.plan.degrees, vec![1, 2, 1, 0]);
        assert_eq!(planner.plan.corridors.len(), 2);
    }

    #[test]
    fn test_check_reports_violations() {
        let isolated = ConnectionPlan {
            degrees: vec![1, 1, 0],
            edges: BTreeSet::from([(0, 1)]),
            corridors: Vec::new(),
        };
        assert_eq!(
            isolated.check(),
            Err(GenerationError::DegreeViolation { room: 2, degree: 0 })
        );

        let split = ConnectionPlan {
            degrees: vec![1, 1, 1, 1],
            edges: BTreeSet::from([(0, 1), (2, 3)]),
            corridors: Vec::new(),
        };
        assert_eq!(split.check(), Err(GenerationError::Disconnected { components: 2 }));
    }
}
