//! Graph pathfinding
//!
//! A*, jump point search, breadth-first search and Eulerian trails. Every
//! search returns node indices from start to goal, both included, and an
//! empty list when no path exists.

mod astar;
mod bfs;
mod eulerian;
pub mod heuristic;
mod jps;
mod record;

use glam::Vec2;

use crate::graph::{Graph, GraphNode, NodeIndex};

pub use astar::AStar;
pub use bfs::Bfs;
pub use eulerian::{EulerianPath, Eulerianity};
pub use heuristic::Heuristic;
pub use jps::Jps;
pub use record::NodeRecord;

/// World positions of the nodes along a path; inactive nodes are skipped
#[must_use]
pub fn node_positions<N: GraphNode>(graph: &Graph<N>, path: &[NodeIndex]) -> Vec<Vec2> {
    path.iter()
        .filter_map(|&index| graph.node_position(index))
        .collect()
}

/// Total length of a polyline
#[must_use]
pub fn path_length(waypoints: &[Vec2]) -> f32 {
    waypoints
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GridGraph;

    #[test]
    fn test_node_positions_and_length() {
        let grid = GridGraph::new(4, 1, 2.0, false);
        let path = AStar::new(grid.graph(), heuristic::manhattan).find_path(0, 3);

        let waypoints = node_positions(grid.graph(), &path);
        assert_eq!(waypoints.len(), 4);
        assert_eq!(waypoints[0], Vec2::new(1.0, 1.0));
        assert!((path_length(&waypoints) - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_length() {
        assert_eq!(path_length(&[]), 0.0);
        assert_eq!(path_length(&[Vec2::ONE]), 0.0);
    }
}
