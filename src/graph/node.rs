//! Node payloads and connections

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable handle of a node inside a [`Graph`](super::Graph)
pub type NodeIndex = usize;

/// Capability set every node payload provides to the graph algorithms
pub trait GraphNode: Clone {
    /// World position of the node
    fn position(&self) -> Vec2;

    /// Move the node
    fn set_position(&mut self, position: Vec2);
}

/// Plain node with a world position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphNode2D {
    /// World position
    pub position: Vec2,
}

impl GraphNode2D {
    /// Create a node at the given position
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self { position }
    }
}

impl GraphNode for GraphNode2D {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

/// Terrain classification of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainType {
    /// Regular walkable ground
    #[default]
    Ground,
    /// Walkable, but twice as expensive
    Mud,
    /// Impassable
    Water,
}

impl TerrainType {
    /// Whether agents can enter a cell of this terrain
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Water)
    }

    /// Cost multiplier applied to connections touching this terrain
    #[must_use]
    pub const fn cost_multiplier(self) -> f32 {
        match self {
            Self::Ground => 1.0,
            Self::Mud => 2.0,
            Self::Water => f32::INFINITY,
        }
    }
}

/// A cell of a [`GridGraph`](super::GridGraph)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridNode {
    /// World position of the cell center
    pub position: Vec2,
    /// Terrain of the cell
    pub terrain: TerrainType,
}

impl GraphNode for GridNode {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

/// Node of a navigation mesh graph, sitting on a shared triangle edge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NavGraphNode {
    /// World position (midpoint of the edge)
    pub position: Vec2,
    /// Index of the polygon line this node represents; `None` for the
    /// temporary start and end nodes of a path query
    pub line_index: Option<usize>,
}

impl NavGraphNode {
    /// Create a node for a polygon line
    #[must_use]
    pub const fn new(line_index: Option<usize>, position: Vec2) -> Self {
        Self {
            position,
            line_index,
        }
    }
}

impl GraphNode for NavGraphNode {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

/// A directed, weighted edge between two node indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node
    pub from: NodeIndex,
    /// Destination node
    pub to: NodeIndex,
    /// Traversal cost
    pub cost: f32,
}

impl Connection {
    /// Create a connection with an explicit cost
    #[must_use]
    pub const fn new(from: NodeIndex, to: NodeIndex, cost: f32) -> Self {
        Self { from, to, cost }
    }

    /// The same connection pointing the other way
    #[must_use]
    pub const fn mirrored(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            cost: self.cost,
        }
    }
}
