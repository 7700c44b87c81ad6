//! Jump point search over grid graphs
//!
//! Instead of pushing every neighbor, the search runs along straight and
//! diagonal lines and only records cells where the route could bend: the
//! goal, cells next to an obstacle corner ("forced neighbors") and cells
//! bordering a different walkable terrain. Step costs come from the grid's
//! connections, so the total cost matches a plain A* search.

use rustc_hash::FxHashMap;

use super::astar::AStar;
use super::heuristic::Heuristic;
use super::record::{NodeRecord, OpenSet};
use crate::graph::{GridGraph, NodeIndex};

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Jump point search borrowing a live grid
#[derive(Debug, Clone, Copy)]
pub struct Jps<'g> {
    grid: &'g GridGraph,
    heuristic: Heuristic,
}

impl<'g> Jps<'g> {
    /// Create a pathfinder over `grid` guided by `heuristic`
    #[must_use]
    pub fn new(grid: &'g GridGraph, heuristic: Heuristic) -> Self {
        Self { grid, heuristic }
    }

    /// Find a path of jump points from `start` to `goal`, both included.
    ///
    /// Consecutive jump points are always on a straight or diagonal line;
    /// use [`Jps::expand_path`] to get every cell in between. Grids without
    /// diagonal connections fall back to A*, which returns every cell.
    #[must_use]
    pub fn find_path(&self, start: NodeIndex, goal: NodeIndex) -> Vec<NodeIndex> {
        // Trivial path, even on impassable terrain
        if start == goal {
            return if self.grid.graph().is_node_valid(start) {
                vec![start]
            } else {
                Vec::new()
            };
        }
        if !self.grid.is_passable(start) || !self.grid.is_passable(goal) {
            return Vec::new();
        }
        if !self.grid.is_connected_diagonally() {
            log::debug!("Grid is 4-connected, using A* instead of jump point search");
            return AStar::new(self.grid.graph(), self.heuristic).find_path(start, goal);
        }

        let graph = self.grid.graph();
        let Some(goal_pos) = graph.node_position(goal) else {
            return Vec::new();
        };
        let estimate = |node: NodeIndex| {
            graph.node_position(node).map_or(0.0, |position| {
                let delta = (position - goal_pos).abs();
                (self.heuristic)(delta.x, delta.y)
            })
        };

        let mut open = OpenSet::default();
        let mut best_g: FxHashMap<NodeIndex, f32> = FxHashMap::default();

        best_g.insert(start, 0.0);
        open.push(NodeRecord::root(start, estimate(start)));

        while let Some(current) = open.pop() {
            if best_g.get(&current.node).is_some_and(|&g| current.g_cost > g) {
                continue;
            }

            if current.node == goal {
                log::debug!(
                    "JPS reached node {goal} from {start} at cost {:.2}",
                    current.g_cost
                );
                return current.path();
            }

            for connection in graph.connections(current.node) {
                let Some((dcol, drow)) = self.direction(current.node, connection.to) else {
                    continue;
                };
                let Some((jump_point, cost)) = self.jump(current.node, dcol, drow, goal) else {
                    continue;
                };

                let g_cost = current.g_cost + cost;
                if best_g.get(&jump_point).is_some_and(|&g| g <= g_cost) {
                    continue;
                }

                best_g.insert(jump_point, g_cost);
                let f_cost = g_cost + estimate(jump_point);
                open.push(NodeRecord::child(&current, jump_point, g_cost, f_cost));
            }
        }

        Vec::new()
    }

    /// Fill in the cells between consecutive jump points
    #[must_use]
    pub fn expand_path(&self, jump_points: &[NodeIndex]) -> Vec<NodeIndex> {
        let Some(&first) = jump_points.first() else {
            return Vec::new();
        };

        let mut path = vec![first];
        for pair in jump_points.windows(2) {
            let Some((dcol, drow)) = self.direction(pair[0], pair[1]) else {
                log::warn!("Jump points {} and {} are not on one line", pair[0], pair[1]);
                return path;
            };

            let mut current = pair[0];
            while current != pair[1] {
                let Some(next) = self.grid.offset_index(current, dcol, drow) else {
                    log::warn!("Ran off the grid expanding {} -> {}", pair[0], pair[1]);
                    return path;
                };
                path.push(next);
                current = next;
            }
        }
        path
    }

    /// Unit step from `from` towards `to`, if they share a row, column or diagonal
    fn direction(&self, from: NodeIndex, to: NodeIndex) -> Option<(i32, i32)> {
        let (from_row, from_col) = self.grid.row_col(from)?;
        let (to_row, to_col) = self.grid.row_col(to)?;
        let dcol = to_col as i64 - from_col as i64;
        let drow = to_row as i64 - from_row as i64;

        let aligned = dcol == 0 || drow == 0 || dcol.abs() == drow.abs();
        (aligned && (dcol, drow) != (0, 0)).then(|| (dcol.signum() as i32, drow.signum() as i32))
    }

    /// Whether the cell at an offset exists and can be entered
    fn is_open(&self, index: NodeIndex, dcol: i32, drow: i32) -> bool {
        self.grid
            .offset_index(index, dcol, drow)
            .is_some_and(|neighbor| self.grid.is_passable(neighbor))
    }

    /// A blocked cell beside `index`, with an open cell just past it
    fn has_forced_neighbor(&self, index: NodeIndex, dcol: i32, drow: i32) -> bool {
        [(drow, dcol), (-drow, -dcol)].into_iter().any(|(pcol, prow)| {
            !self.is_open(index, pcol, prow) && self.is_open(index, dcol + pcol, drow + prow)
        })
    }

    /// A neighbor is walkable but has a different cost multiplier
    fn is_terrain_border(&self, index: NodeIndex) -> bool {
        let terrain = self.grid.terrain(index);
        NEIGHBOR_OFFSETS.iter().any(|&(dcol, drow)| {
            self.grid
                .offset_index(index, dcol, drow)
                .and_then(|neighbor| self.grid.terrain(neighbor))
                .is_some_and(|other| other.is_passable() && Some(other) != terrain)
        })
    }

    /// Step once along the grid, returning the next cell and the step cost
    fn step(&self, index: NodeIndex, dcol: i32, drow: i32) -> Option<(NodeIndex, f32)> {
        let next = self.grid.offset_index(index, dcol, drow)?;
        let cost = self.grid.graph().connection(index, next)?.cost;
        Some((next, cost))
    }

    /// Run from `from` in one direction until a jump point or a dead end
    fn jump(
        &self,
        from: NodeIndex,
        dcol: i32,
        drow: i32,
        goal: NodeIndex,
    ) -> Option<(NodeIndex, f32)> {
        let mut current = from;
        let mut total = 0.0;

        loop {
            let (next, cost) = self.step(current, dcol, drow)?;
            total += cost;

            if next == goal || self.is_terrain_border(next) {
                return Some((next, total));
            }

            if dcol != 0 && drow != 0 {
                if !self.is_open(current, dcol, 0) || !self.is_open(current, 0, drow) {
                    return Some((next, total));
                }
                if self.probe(next, dcol, 0, goal) || self.probe(next, 0, drow, goal) {
                    return Some((next, total));
                }
            } else if self.has_forced_neighbor(next, dcol, drow) {
                return Some((next, total));
            }

            current = next;
        }
    }

    /// Straight scan used by diagonal jumps; true if it would stop at a jump point
    fn probe(&self, from: NodeIndex, dcol: i32, drow: i32, goal: NodeIndex) -> bool {
        let mut current = from;
        while let Some((next, _)) = self.step(current, dcol, drow) {
            if next == goal
                || self.is_terrain_border(next)
                || self.has_forced_neighbor(next, dcol, drow)
            {
                return true;
            }
            current = next;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::pathfinding::heuristic::{manhattan, octile};
    use crate::graph::TerrainType;

    fn walled_grid() -> GridGraph {
        let mut grid = GridGraph::new(12, 10, 1.0, true);
        for row in 0..8 {
            grid.set_terrain(grid.index_of(row, 4).unwrap(), TerrainType::Water);
        }
        for row in 3..10 {
            grid.set_terrain(grid.index_of(row, 8).unwrap(), TerrainType::Water);
        }
        grid
    }

    fn assert_same_cost(grid: &GridGraph, start: NodeIndex, goal: NodeIndex) {
        let jps = Jps::new(grid, octile);
        let jump_points = jps.find_path(start, goal);
        let full = jps.expand_path(&jump_points);
        let astar = AStar::new(grid.graph(), octile).find_path(start, goal);

        assert_eq!(full.first(), Some(&start));
        assert_eq!(full.last(), Some(&goal));
        let jps_cost = grid.graph().path_cost(&full).unwrap();
        let astar_cost = grid.graph().path_cost(&astar).unwrap();
        assert!(
            (jps_cost - astar_cost).abs() < 0.001,
            "{start} -> {goal}: jps {jps_cost}, a* {astar_cost}"
        );
    }

    #[test]
    fn test_open_grid_uses_few_jump_points() {
        let grid = GridGraph::new(10, 10, 1.0, true);
        let jps = Jps::new(&grid, octile);

        let path = jps.find_path(0, 99);
        assert_eq!(path, vec![0, 99]);
        assert_eq!(jps.expand_path(&path).len(), 10);
    }

    #[test]
    fn test_matches_astar_around_walls() {
        let grid = walled_grid();
        let start = grid.index_of(1, 1).unwrap();

        for goal in [
            grid.index_of(1, 10).unwrap(),
            grid.index_of(9, 11).unwrap(),
            grid.index_of(0, 6).unwrap(),
            grid.index_of(9, 0).unwrap(),
        ] {
            assert_same_cost(&grid, start, goal);
        }
    }

    #[test]
    fn test_matches_astar_on_scattered_obstacles() {
        let mut grid = GridGraph::new(9, 9, 2.0, true);
        for (row, col) in [(1, 1), (2, 5), (3, 3), (4, 6), (5, 2), (6, 6), (7, 4), (4, 4)] {
            grid.set_terrain(grid.index_of(row, col).unwrap(), TerrainType::Water);
        }

        for goal in [80, 8, 72, 44] {
            assert_same_cost(&grid, 0, goal);
        }
    }

    #[test]
    fn test_matches_astar_through_mud() {
        let mut grid = GridGraph::new(10, 8, 1.0, true);
        for row in 0..6 {
            grid.set_terrain(grid.index_of(row, 3).unwrap(), TerrainType::Mud);
            grid.set_terrain(grid.index_of(row + 2, 6).unwrap(), TerrainType::Mud);
        }
        grid.set_terrain(grid.index_of(4, 4).unwrap(), TerrainType::Water);

        for goal in [9, 79, 39, 75] {
            assert_same_cost(&grid, 0, goal);
        }
    }

    #[test]
    fn test_start_equals_goal_and_blocked() {
        let grid = walled_grid();
        let jps = Jps::new(&grid, octile);

        assert_eq!(jps.find_path(13, 13), vec![13]);
        let water = grid.index_of(0, 4).unwrap();
        assert!(jps.find_path(13, water).is_empty());
        assert!(jps.find_path(13, 10_000).is_empty());
        assert!(jps.find_path(10_000, 10_000).is_empty());

        // Same answer as A* when standing on water
        let astar = AStar::new(grid.graph(), octile);
        assert_eq!(jps.find_path(water, water), vec![water]);
        assert_eq!(jps.find_path(water, water), astar.find_path(water, water));
        assert!(astar.find_path(10_000, 10_000).is_empty());
    }

    #[test]
    fn test_enclosed_goal_is_unreachable() {
        let mut grid = GridGraph::new(6, 6, 1.0, true);
        for index in [14, 15, 16, 20, 22, 26, 27, 28] {
            grid.set_terrain(index, TerrainType::Water);
        }

        assert!(Jps::new(&grid, octile).find_path(0, 21).is_empty());
    }

    #[test]
    fn test_does_not_mutate_grid() {
        let grid = walled_grid();
        let before = grid.graph().connection_count();

        let _ = Jps::new(&grid, octile).find_path(0, 119);
        assert_eq!(grid.graph().connection_count(), before);
    }

    #[test]
    fn test_four_connected_grid_falls_back_to_astar() {
        let grid = GridGraph::new(5, 5, 1.0, false);

        let path = Jps::new(&grid, manhattan).find_path(0, 24);
        assert_eq!(path.len(), 9);
        assert!((grid.graph().path_cost(&path).unwrap() - 8.0).abs() < 0.001);
    }
}
