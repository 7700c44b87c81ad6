//! Spatial partitioning
//!
//! Neighborhood queries over agents stored in a uniform grid.

mod cell_space;

pub use cell_space::{AgentId, Cell, CellSpace, Positioned};
