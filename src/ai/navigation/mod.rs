//! Navigation meshes
//!
//! Graph construction over a triangulated polygon, world-position path
//! queries and funnel smoothing of the resulting paths.

mod funnel;
mod nav_graph;
mod navmesh_path;

pub use funnel::{Portal, find_portals, optimize_portals};
pub use nav_graph::NavGraph;
pub use navmesh_path::{NavMeshPath, NavMeshPathfinding};
