//! Weighted graph with stable node indices
//!
//! Nodes live in an arena of optional slots. Removing a node leaves a
//! tombstone so every other index stays valid. Removed indices go on a
//! min-heap free list, so the next [`Graph::add_node`] reuses the lowest one.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::Vec2;

use super::node::{Connection, GraphNode, NodeIndex};

/// A weighted graph, directed or undirected
///
/// Undirected graphs store every logical edge as two mirrored connections,
/// so the search algorithms only ever deal with outgoing connections.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    /// Node arena (`None` = removed)
    nodes: Vec<Option<N>>,
    /// Outgoing connections, indexed by source node
    connections: Vec<Vec<Connection>>,
    /// Removed slots, lowest index on top
    free: BinaryHeap<Reverse<NodeIndex>>,
    /// Number of `Some` slots in `nodes`
    active_count: usize,
    /// Whether connections are one-way
    is_directed: bool,
}

impl<N: GraphNode> Graph<N> {
    /// Create an empty graph
    #[must_use]
    pub fn new(is_directed: bool) -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            free: BinaryHeap::new(),
            active_count: 0,
            is_directed,
        }
    }

    /// Whether connections are one-way
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.is_directed
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Index the next added node will receive
    #[must_use]
    pub fn next_free_node_index(&self) -> NodeIndex {
        self.free
            .peek()
            .map_or(self.nodes.len(), |&Reverse(index)| index)
    }

    /// Add a node and return its index
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        self.active_count += 1;
        match self.free.pop() {
            Some(Reverse(index)) => {
                self.nodes[index] = Some(node);
                self.connections[index].clear();
                index
            }
            None => {
                self.nodes.push(Some(node));
                self.connections.push(Vec::new());
                self.nodes.len() - 1
            }
        }
    }

    /// Remove a node together with every connection touching it
    pub fn remove_node(&mut self, index: NodeIndex) -> Option<N> {
        let node = self.nodes.get_mut(index)?.take()?;
        self.active_count -= 1;
        self.free.push(Reverse(index));

        let outgoing = std::mem::take(&mut self.connections[index]);
        if self.is_directed {
            for incoming in &mut self.connections {
                incoming.retain(|connection| connection.to != index);
            }
        } else {
            // Incoming edges are the mirrors of the outgoing ones
            for connection in &outgoing {
                self.connections[connection.to].retain(|c| c.to != index);
            }
        }

        Some(node)
    }

    /// Get a node
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&N> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    /// Get a node mutably
    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut N> {
        self.nodes.get_mut(index).and_then(Option::as_mut)
    }

    /// Check whether an index refers to an active node
    #[must_use]
    pub fn is_node_valid(&self, index: NodeIndex) -> bool {
        self.node(index).is_some()
    }

    /// World position of a node
    #[must_use]
    pub fn node_position(&self, index: NodeIndex) -> Option<Vec2> {
        self.node(index).map(GraphNode::position)
    }

    /// Move a node.
    ///
    /// Connection costs are not touched; call
    /// [`set_connection_costs_to_distance`](Self::set_connection_costs_to_distance)
    /// after moving nodes.
    pub fn set_node_position(&mut self, index: NodeIndex, position: Vec2) -> bool {
        match self.node_mut(index) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => false,
        }
    }

    /// Iterate over active nodes
    pub fn active_nodes(&self) -> impl Iterator<Item = (NodeIndex, &N)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.as_ref().map(|node| (index, node)))
    }

    /// Number of active nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.active_count
    }

    /// Size of the index space (active and removed slots)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Connect two nodes, using their distance as cost
    pub fn add_connection(&mut self, from: NodeIndex, to: NodeIndex) {
        let cost = match (self.node_position(from), self.node_position(to)) {
            (Some(a), Some(b)) => a.distance(b),
            _ => 0.0,
        };
        self.add_connection_with_cost(from, to, cost);
    }

    /// Connect two nodes with an explicit cost.
    ///
    /// An existing connection between the same nodes has its cost replaced.
    pub fn add_connection_with_cost(&mut self, from: NodeIndex, to: NodeIndex, cost: f32) {
        let valid = self.is_node_valid(from) && self.is_node_valid(to);
        debug_assert!(valid, "connection {from} -> {to} references an inactive node");
        if !valid {
            log::warn!("Ignoring connection {from} -> {to}: inactive endpoint");
            return;
        }

        let connection = Connection::new(from, to, cost);
        self.insert_connection(connection);
        if !self.is_directed && from != to {
            self.insert_connection(connection.mirrored());
        }
    }

    fn insert_connection(&mut self, connection: Connection) {
        let outgoing = &mut self.connections[connection.from];
        match outgoing.iter_mut().find(|c| c.to == connection.to) {
            Some(existing) => existing.cost = connection.cost,
            None => outgoing.push(connection),
        }
    }

    /// Remove the connection `from -> to` (and its mirror in undirected graphs)
    pub fn remove_connection(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        let mut removed = self.remove_single_connection(from, to);
        if !self.is_directed && from != to {
            removed |= self.remove_single_connection(to, from);
        }
        removed
    }

    fn remove_single_connection(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        let Some(outgoing) = self.connections.get_mut(from) else {
            return false;
        };
        match outgoing.iter().position(|c| c.to == to) {
            Some(position) => {
                outgoing.remove(position);
                true
            }
            None => false,
        }
    }

    /// Outgoing connections of a node, in insertion order
    #[must_use]
    pub fn connections(&self, index: NodeIndex) -> &[Connection] {
        self.connections
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up the connection `from -> to`
    #[must_use]
    pub fn connection(&self, from: NodeIndex, to: NodeIndex) -> Option<&Connection> {
        self.connections(from).iter().find(|c| c.to == to)
    }

    /// Check whether `from -> to` exists
    #[must_use]
    pub fn is_connected(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.connection(from, to).is_some()
    }

    /// Override the cost of an existing connection (and its mirror)
    pub fn set_connection_cost(&mut self, from: NodeIndex, to: NodeIndex, cost: f32) -> bool {
        let mut changed = false;
        for (a, b) in [(from, to), (to, from)] {
            if let Some(connection) = self
                .connections
                .get_mut(a)
                .and_then(|outgoing| outgoing.iter_mut().find(|c| c.to == b))
            {
                connection.cost = cost;
                changed = true;
            }
            if self.is_directed {
                break;
            }
        }
        changed
    }

    /// Number of stored (directed) connections
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(Vec::len).sum()
    }

    /// Iterate over every stored connection
    pub fn all_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().flatten()
    }

    /// Recompute every connection cost as the distance between its endpoints
    pub fn set_connection_costs_to_distance(&mut self) {
        let positions: Vec<Option<Vec2>> = self
            .nodes
            .iter()
            .map(|node| node.as_ref().map(GraphNode::position))
            .collect();

        for connection in self.connections.iter_mut().flatten() {
            if let (Some(a), Some(b)) = (positions[connection.from], positions[connection.to]) {
                connection.cost = a.distance(b);
            }
        }
    }

    /// Total cost of walking a node path; `None` if two consecutive nodes
    /// are not connected
    #[must_use]
    pub fn path_cost(&self, path: &[NodeIndex]) -> Option<f32> {
        path.windows(2)
            .map(|pair| self.connection(pair[0], pair[1]).map(|c| c.cost))
            .sum()
    }

    /// Remove every node and connection
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.free.clear();
        self.active_count = 0;
    }
}

impl<N: GraphNode> Default for Graph<N> {
    fn default() -> Self {
        Self::new(false)
    }
}
