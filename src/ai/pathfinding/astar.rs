//! A* search over any [`Graph`]

use rustc_hash::FxHashMap;

use super::heuristic::Heuristic;
use super::record::{NodeRecord, OpenSet};
use crate::graph::{Graph, GraphNode, NodeIndex};

/// A* pathfinder borrowing a live graph
#[derive(Debug, Clone, Copy)]
pub struct AStar<'g, N> {
    graph: &'g Graph<N>,
    heuristic: Heuristic,
}

impl<'g, N: GraphNode> AStar<'g, N> {
    /// Create a pathfinder over `graph` guided by `heuristic`
    #[must_use]
    pub fn new(graph: &'g Graph<N>, heuristic: Heuristic) -> Self {
        Self { graph, heuristic }
    }

    /// Find the cheapest node path from `start` to `goal`, both included.
    ///
    /// Returns an empty path if either node is inactive or the goal cannot be
    /// reached.
    #[must_use]
    pub fn find_path(&self, start: NodeIndex, goal: NodeIndex) -> Vec<NodeIndex> {
        let (Some(_), Some(goal_pos)) = (
            self.graph.node_position(start),
            self.graph.node_position(goal),
        ) else {
            return Vec::new();
        };
        if start == goal {
            return vec![start];
        }

        let estimate = |node: NodeIndex| {
            self.graph.node_position(node).map_or(0.0, |position| {
                let delta = (position - goal_pos).abs();
                (self.heuristic)(delta.x, delta.y)
            })
        };

        let mut open = OpenSet::default();
        let mut best_g: FxHashMap<NodeIndex, f32> = FxHashMap::default();

        best_g.insert(start, 0.0);
        open.push(NodeRecord::root(start, estimate(start)));

        while let Some(current) = open.pop() {
            // Skip entries superseded by a cheaper route
            if best_g.get(&current.node).is_some_and(|&g| current.g_cost > g) {
                continue;
            }

            if current.node == goal {
                log::debug!(
                    "A* reached node {goal} from {start} at cost {:.2}",
                    current.g_cost
                );
                return current.path();
            }

            for connection in self.graph.connections(current.node) {
                let g_cost = current.g_cost + connection.cost;
                if best_g.get(&connection.to).is_some_and(|&g| g <= g_cost) {
                    continue;
                }

                best_g.insert(connection.to, g_cost);
                let f_cost = g_cost + estimate(connection.to);
                open.push(NodeRecord::child(&current, connection.to, g_cost, f_cost));
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::ai::pathfinding::heuristic::{euclidean, manhattan};
    use crate::graph::{GraphNode2D, GridGraph, TerrainType};

    /// Reference shortest path costs by exhaustive relaxation
    fn dijkstra_costs<N: GraphNode>(graph: &Graph<N>, start: NodeIndex) -> Vec<f32> {
        let mut costs = vec![f32::INFINITY; graph.capacity()];
        costs[start] = 0.0;
        for _ in 0..graph.capacity() {
            for connection in graph.all_connections() {
                let candidate = costs[connection.from] + connection.cost;
                if candidate < costs[connection.to] {
                    costs[connection.to] = candidate;
                }
            }
        }
        costs
    }

    fn diamond() -> Graph<GraphNode2D> {
        let mut graph = Graph::new(false);
        for position in [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(2.0, -1.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(6.0, 2.0),
        ] {
            graph.add_node(GraphNode2D::new(position));
        }
        graph.add_connection(0, 1);
        graph.add_connection(0, 2);
        graph.add_connection(1, 3);
        graph.add_connection(2, 3);
        graph.add_connection(1, 4);
        graph.add_connection(3, 4);
        graph
    }

    #[test]
    fn test_matches_dijkstra() {
        let graph = diamond();
        let expected = dijkstra_costs(&graph, 0);
        let astar = AStar::new(&graph, euclidean);

        for goal in 1..graph.node_count() {
            let path = astar.find_path(0, goal);
            assert_eq!(path.first(), Some(&0));
            assert_eq!(path.last(), Some(&goal));
            let cost = graph.path_cost(&path).unwrap();
            assert!((cost - expected[goal]).abs() < 0.001, "goal {goal}");
        }
    }

    #[test]
    fn test_matches_dijkstra_on_muddy_grid() {
        let mut grid = GridGraph::new(6, 6, 1.0, true);
        for index in [8, 14, 20, 21] {
            grid.set_terrain(index, TerrainType::Mud);
        }
        grid.set_terrain(15, TerrainType::Water);

        let expected = dijkstra_costs(grid.graph(), 0);
        let path = AStar::new(grid.graph(), euclidean).find_path(0, 35);
        let cost = grid.graph().path_cost(&path).unwrap();

        assert!((cost - expected[35]).abs() < 0.001);
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = diamond();

        assert_eq!(AStar::new(&graph, euclidean).find_path(2, 2), vec![2]);
    }

    #[test]
    fn test_unreachable_and_invalid() {
        let mut graph = diamond();
        graph.add_node(GraphNode2D::new(Vec2::new(10.0, 10.0)));
        let astar = AStar::new(&graph, manhattan);

        assert!(astar.find_path(0, 5).is_empty());
        assert!(astar.find_path(0, 99).is_empty());
        assert!(astar.find_path(99, 0).is_empty());
    }

    #[test]
    fn test_terminates_with_self_loops() {
        let mut graph = diamond();
        graph.add_connection_with_cost(0, 0, 0.0);
        graph.add_connection_with_cost(3, 3, 1.0);

        let path = AStar::new(&graph, euclidean).find_path(0, 4);
        assert_eq!(path.last(), Some(&4));
    }

    #[test]
    fn test_routes_around_water() {
        let mut grid = GridGraph::new(10, 10, 1.0, false);
        for row in 2..8 {
            grid.set_terrain(grid.index_of(row, 5).unwrap(), TerrainType::Water);
        }

        let start = grid.index_of(5, 2).unwrap();
        let goal = grid.index_of(5, 8).unwrap();
        let path = AStar::new(grid.graph(), manhattan).find_path(start, goal);

        assert!(path.len() > 7);
        assert!(path.iter().all(|&index| grid.is_passable(index)));
    }

    #[test]
    fn test_straight_corridor() {
        let grid = GridGraph::new(10, 10, 1.0, false);

        let path = AStar::new(grid.graph(), manhattan).find_path(0, 3);
        assert_eq!(path, vec![0, 1, 2, 3]);
    }
}
