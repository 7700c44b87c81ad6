//! Eulerian paths and circuits
//!
//! A trail that uses every connection of an undirected graph exactly once.

use std::fmt;

use crate::graph::{Graph, GraphNode, NodeIndex};

/// Whether a graph admits an Eulerian trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eulerianity {
    /// No trail covers every connection
    NotEulerian,
    /// A trail exists between the two odd-degree nodes
    SemiEulerian,
    /// A closed circuit exists
    Eulerian,
}

impl fmt::Display for Eulerianity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEulerian => write!(f, "not eulerian"),
            Self::SemiEulerian => write!(f, "semi eulerian"),
            Self::Eulerian => write!(f, "eulerian"),
        }
    }
}

/// Eulerian trail finder for undirected graphs
#[derive(Debug, Clone, Copy)]
pub struct EulerianPath<'g, N> {
    graph: &'g Graph<N>,
}

impl<'g, N: GraphNode> EulerianPath<'g, N> {
    #[must_use]
    pub fn new(graph: &'g Graph<N>) -> Self {
        Self { graph }
    }

    /// Classify the graph.
    ///
    /// Graphs that are directed, have no connections or contain an active
    /// node that cannot be reached from the others are not eulerian.
    #[must_use]
    pub fn is_eulerian(&self) -> Eulerianity {
        if self.graph.is_directed() {
            log::warn!("Eulerianity is only defined here for undirected graphs");
            return Eulerianity::NotEulerian;
        }
        if !self.is_connected() {
            return Eulerianity::NotEulerian;
        }

        match self.odd_nodes().count() {
            0 => Eulerianity::Eulerian,
            2 => Eulerianity::SemiEulerian,
            _ => Eulerianity::NotEulerian,
        }
    }

    /// Build a trail visiting every connection once, using Hierholzer's
    /// algorithm on a copy of the graph.
    ///
    /// Semi-eulerian graphs start at an odd-degree node. The result lists
    /// nodes in walking order and is empty for non-eulerian graphs.
    #[must_use]
    pub fn find_path(&self, eulerianity: Eulerianity) -> Vec<NodeIndex> {
        let start = match eulerianity {
            Eulerianity::NotEulerian => return Vec::new(),
            Eulerianity::SemiEulerian => self.odd_nodes().next(),
            Eulerianity::Eulerian => self
                .graph
                .active_nodes()
                .map(|(index, _)| index)
                .find(|&index| !self.graph.connections(index).is_empty()),
        };
        let Some(mut current) = start else {
            return Vec::new();
        };

        let mut graph = self.graph.clone();
        let mut stack = Vec::new();
        let mut path = Vec::new();

        loop {
            match graph.connections(current).first().map(|c| c.to) {
                Some(next) => {
                    stack.push(current);
                    graph.remove_connection(current, next);
                    current = next;
                }
                None => {
                    path.push(current);
                    match stack.pop() {
                        Some(previous) => current = previous,
                        None => break,
                    }
                }
            }
        }

        path.reverse();
        path
    }

    /// Degree of a node, counting a self-loop twice
    fn degree(&self, index: NodeIndex) -> usize {
        self.graph
            .connections(index)
            .iter()
            .map(|c| if c.to == index { 2 } else { 1 })
            .sum()
    }

    fn odd_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .active_nodes()
            .map(|(index, _)| index)
            .filter(move |&index| self.degree(index) % 2 == 1)
    }

    /// Every active node is reachable from the first one, and there is at
    /// least one connection
    fn is_connected(&self) -> bool {
        if self.graph.connection_count() == 0 {
            return false;
        }
        let Some((first, _)) = self.graph.active_nodes().next() else {
            return false;
        };

        let mut visited = vec![false; self.graph.capacity()];
        let mut stack = vec![first];
        visited[first] = true;
        while let Some(current) = stack.pop() {
            for connection in self.graph.connections(current) {
                if !visited[connection.to] {
                    visited[connection.to] = true;
                    stack.push(connection.to);
                }
            }
        }

        self.graph.active_nodes().all(|(index, _)| visited[index])
    }
}
