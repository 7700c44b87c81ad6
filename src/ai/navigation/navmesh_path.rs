//! World-position path queries over a navigation mesh

use glam::Vec2;

use super::funnel::{Portal, find_portals, optimize_portals};
use super::nav_graph::NavGraph;
use crate::ai::pathfinding::{AStar, heuristic, node_positions, path_length};
use crate::graph::{Graph, NavGraphNode, NodeIndex};

/// Result of a navigation mesh query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavMeshPath {
    /// Smoothed waypoints from start to end
    pub waypoints: Vec<Vec2>,
    /// Positions of the raw graph nodes the search went through
    pub debug_node_positions: Vec<Vec2>,
    /// Portals handed to the funnel
    pub portals: Vec<Portal>,
}

impl NavMeshPath {
    /// Check if no path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Total length of the smoothed path
    #[must_use]
    pub fn length(&self) -> f32 {
        path_length(&self.waypoints)
    }
}

/// Path queries between world positions on a [`NavGraph`]
#[derive(Debug, Clone, Copy)]
pub struct NavMeshPathfinding<'g> {
    nav_graph: &'g NavGraph,
}

impl<'g> NavMeshPathfinding<'g> {
    #[must_use]
    pub fn new(nav_graph: &'g NavGraph) -> Self {
        Self { nav_graph }
    }

    /// Find a smoothed path between two world positions.
    ///
    /// Returns an empty path when either position is outside the mesh or
    /// the two are not connected. Positions inside the same triangle are
    /// joined directly.
    #[must_use]
    pub fn find_path(&self, start: Vec2, end: Vec2) -> NavMeshPath {
        let polygon = self.nav_graph.polygon();
        let (Some(start_triangle), Some(end_triangle)) =
            (polygon.triangle_containing(start), polygon.triangle_containing(end))
        else {
            log::debug!("Navmesh query {start} -> {end} starts or ends outside the mesh");
            return NavMeshPath::default();
        };

        if start_triangle == end_triangle {
            return NavMeshPath {
                waypoints: vec![start, end],
                ..NavMeshPath::default()
            };
        }

        // The query nodes only live on a copy of the graph
        let mut graph = self.nav_graph.graph().clone();
        let start_node = self.add_query_node(&mut graph, start, start_triangle);
        let end_node = self.add_query_node(&mut graph, end, end_triangle);

        let path = AStar::new(&graph, heuristic::euclidean).find_path(start_node, end_node);
        if path.is_empty() {
            log::debug!("No navmesh path from {start} to {end}");
            return NavMeshPath::default();
        }

        let portals = find_portals(&path, &graph, polygon, start, end);
        let waypoints = optimize_portals(&portals);

        NavMeshPath {
            waypoints,
            debug_node_positions: node_positions(&graph, &path),
            portals,
        }
    }

    /// Add a node at `position` connected to the nodes on the shared lines
    /// of its triangle
    fn add_query_node(
        &self,
        graph: &mut Graph<NavGraphNode>,
        position: Vec2,
        triangle: usize,
    ) -> NodeIndex {
        let node = graph.add_node(NavGraphNode::new(None, position));
        let Some(triangle) = self.nav_graph.polygon().triangles().get(triangle) else {
            return node;
        };

        for line_index in triangle.line_indices {
            if let Some(neighbor) = self.nav_graph.node_index_from_line_index(line_index) {
                graph.add_connection(node, neighbor);
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::navigation::nav_graph::tests::l_shape;
    use crate::geometry::Polygon;

    #[test]
    fn test_path_bends_around_corner() {
        let nav_graph = l_shape();
        let start = Vec2::new(0.3, 0.2);
        let end = Vec2::new(1.2, 1.9);

        let path = NavMeshPathfinding::new(&nav_graph).find_path(start, end);

        assert_eq!(path.waypoints, vec![start, Vec2::new(1.0, 1.0), end]);
        assert_eq!(path.debug_node_positions.first(), Some(&start));
        assert_eq!(path.debug_node_positions.last(), Some(&end));
        assert!(path.waypoints.len() <= path.debug_node_positions.len());
        assert_eq!(path.portals.len(), path.debug_node_positions.len());
    }

    #[test]
    fn test_smoothed_path_is_not_longer() {
        let nav_graph = l_shape();
        let path = NavMeshPathfinding::new(&nav_graph)
            .find_path(Vec2::new(0.1, 0.9), Vec2::new(1.9, 1.1));

        assert!(!path.is_empty());
        assert!(path.length() <= path_length(&path.debug_node_positions) + 0.001);
    }

    #[test]
    fn test_same_triangle_is_direct() {
        let nav_graph = l_shape();
        let start = Vec2::new(0.5, 0.1);
        let end = Vec2::new(0.9, 0.2);

        let path = NavMeshPathfinding::new(&nav_graph).find_path(start, end);
        assert_eq!(path.waypoints, vec![start, end]);
        assert!(path.portals.is_empty());
    }

    #[test]
    fn test_outside_mesh_is_empty() {
        let nav_graph = l_shape();
        let pathfinding = NavMeshPathfinding::new(&nav_graph);

        assert!(pathfinding.find_path(Vec2::new(0.5, 1.5), Vec2::new(1.5, 1.5)).is_empty());
        assert!(pathfinding.find_path(Vec2::new(0.5, 0.5), Vec2::new(5.0, 5.0)).is_empty());
    }

    #[test]
    fn test_query_does_not_touch_nav_graph() {
        let nav_graph = l_shape();
        let before = nav_graph.graph().node_count();

        let _ = NavMeshPathfinding::new(&nav_graph)
            .find_path(Vec2::new(0.3, 0.2), Vec2::new(1.2, 1.9));
        assert_eq!(nav_graph.graph().node_count(), before);
    }

    #[test]
    fn test_disconnected_islands() {
        // Two triangles sharing no edge
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(5.0, 1.0),
        ];
        let polygon = Polygon::from_triangles(points, &[[0, 1, 2], [3, 4, 5]]).unwrap();
        let nav_graph = NavGraph::new(polygon);

        let path = NavMeshPathfinding::new(&nav_graph)
            .find_path(Vec2::new(0.2, 0.2), Vec2::new(5.2, 0.2));
        assert!(path.is_empty());
    }
}
