//! Graph module
//!
//! Weighted graphs with stable node indices, plus the grid specialization
//! used by the grid pathfinders.

mod base;
mod grid;
mod node;

pub use base::Graph;
pub use grid::GridGraph;
pub use node::{
    Connection, GraphNode, GraphNode2D, GridNode, NavGraphNode, NodeIndex, TerrainType,
};
