//! Breadth-first search

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::graph::{Graph, GraphNode, NodeIndex};

/// Fewest-hops pathfinder; connection costs are ignored
#[derive(Debug, Clone, Copy)]
pub struct Bfs<'g, N> {
    graph: &'g Graph<N>,
}

impl<'g, N: GraphNode> Bfs<'g, N> {
    #[must_use]
    pub fn new(graph: &'g Graph<N>) -> Self {
        Self { graph }
    }

    /// Find the path with the fewest connections from `start` to `goal`.
    ///
    /// Returns an empty path if either node is inactive or unreachable.
    #[must_use]
    pub fn find_path(&self, start: NodeIndex, goal: NodeIndex) -> Vec<NodeIndex> {
        if !self.graph.is_node_valid(start) || !self.graph.is_node_valid(goal) {
            return Vec::new();
        }

        let mut queue = VecDeque::from([start]);
        let mut came_from: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
        came_from.insert(start, start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                let mut path = vec![goal];
                let mut node = goal;
                while node != start {
                    node = came_from[&node];
                    path.push(node);
                }
                path.reverse();
                return path;
            }

            for connection in self.graph.connections(current) {
                if !came_from.contains_key(&connection.to) {
                    came_from.insert(connection.to, current);
                    queue.push_back(connection.to);
                }
            }
        }

        log::debug!("BFS found no path from {start} to {goal}");
        Vec::new()
    }
}
