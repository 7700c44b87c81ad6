//! Game AI toolkit for 2D worlds
//!
//! This crate provides:
//! - Weighted graphs, grid graphs and navigation meshes
//! - A*, jump point search, breadth-first search and Eulerian trails
//! - Funnel smoothing of navmesh paths
//! - A uniform-grid spatial index for neighborhood queries
//! - Steering, flocking and decision making (FSM, behavior trees)

pub mod ai;
pub mod core;
pub mod geometry;
pub mod graph;
pub mod spatial;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AStar, Bfs, Blackboard, EulerianPath, Eulerianity, Flock, Jps, NavGraph, NavMeshPath,
        NavMeshPathfinding, SteeringAgent, SteeringBehavior, SteeringOutput,
    };
    pub use crate::ai::pathfinding::heuristic;
    pub use crate::core::{FlockConfig, GridConfig, SandboxConfig};
    pub use crate::geometry::{Polygon, Rect, Shape};
    pub use crate::graph::{Graph, GraphNode, GraphNode2D, GridGraph, NodeIndex, TerrainType};
    pub use crate::spatial::{CellSpace, Positioned};
    pub use glam::Vec2;
}
