//! Navigation mesh graph
//!
//! One node per triangle edge shared by two triangles, placed at the edge
//! midpoint. Nodes on the same triangle are connected, so a path through the
//! graph is a sequence of edges an agent crosses.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::geometry::Polygon;
use crate::graph::{Graph, NavGraphNode, NodeIndex};

/// Graph over the shared edges of a triangulated polygon
#[derive(Debug, Clone)]
pub struct NavGraph {
    graph: Graph<NavGraphNode>,
    polygon: Polygon,
    line_to_node: FxHashMap<usize, NodeIndex>,
}

impl NavGraph {
    /// Build the graph from an already triangulated polygon
    #[must_use]
    pub fn new(polygon: Polygon) -> Self {
        let mut graph = Graph::new(false);
        let mut line_to_node = FxHashMap::default();

        for line in polygon.lines() {
            if polygon.triangles_from_line_index(line.index).len() > 1 {
                let node = graph.add_node(NavGraphNode::new(Some(line.index), line.midpoint()));
                line_to_node.insert(line.index, node);
            }
        }

        for triangle in polygon.triangles() {
            let nodes: SmallVec<[NodeIndex; 3]> = triangle
                .line_indices
                .iter()
                .filter_map(|line| line_to_node.get(line).copied())
                .collect();

            match nodes.as_slice() {
                &[a, b] => graph.add_connection(a, b),
                &[a, b, c] => {
                    graph.add_connection(a, b);
                    graph.add_connection(b, c);
                    graph.add_connection(c, a);
                }
                _ => {}
            }
        }

        graph.set_connection_costs_to_distance();

        log::info!(
            "Built navigation graph: {} nodes, {} connections from {} triangles",
            graph.node_count(),
            graph.connection_count() / 2,
            polygon.triangles().len()
        );

        Self {
            graph,
            polygon,
            line_to_node,
        }
    }

    /// Node standing on a polygon line, if that line is shared
    #[must_use]
    pub fn node_index_from_line_index(&self, line_index: usize) -> Option<NodeIndex> {
        self.line_to_node.get(&line_index).copied()
    }

    /// The edge graph
    #[must_use]
    pub fn graph(&self) -> &Graph<NavGraphNode> {
        &self.graph
    }

    /// The triangulated polygon the graph was built from
    #[must_use]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use glam::Vec2;

    use super::*;

    /// Three unit squares forming an L: bottom-left, bottom-right, top-right
    pub(crate) fn l_shape() -> NavGraph {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(2.0, 2.0),
        ];
        let triangles = [[0, 1, 4], [0, 4, 3], [1, 2, 5], [1, 5, 4], [4, 5, 7], [4, 7, 6]];
        NavGraph::new(Polygon::from_triangles(points, &triangles).unwrap())
    }

    #[test]
    fn test_nodes_on_shared_lines() {
        let nav_graph = l_shape();
        let polygon = nav_graph.polygon();

        assert_eq!(nav_graph.graph().node_count(), 5);
        for (index, node) in nav_graph.graph().active_nodes() {
            let line = polygon.line(node.line_index.unwrap()).unwrap();
            assert_eq!(node.position, line.midpoint());
            assert_eq!(nav_graph.node_index_from_line_index(line.index), Some(index));
        }

        // Boundary edge (0,0)-(1,0) has no node
        assert_eq!(nav_graph.node_index_from_line_index(0), None);
    }

    #[test]
    fn test_connections_per_triangle() {
        let nav_graph = l_shape();
        let graph = nav_graph.graph();

        // One link from the first square, a 3-cycle in the middle triangle
        // and one link across the top square
        assert_eq!(graph.connection_count(), 2 * 5);

        let node_at = |x: f32, y: f32| {
            graph
                .active_nodes()
                .find(|(_, node)| node.position == Vec2::new(x, y))
                .map(|(index, _)| index)
                .unwrap()
        };
        let middle = node_at(1.5, 1.0);
        assert_eq!(graph.connections(middle).len(), 3);

        let cost = graph.connection(node_at(1.0, 0.5), middle).unwrap().cost;
        assert!((cost - Vec2::new(0.5, 0.5).length()).abs() < 0.001);
    }

    #[test]
    fn test_single_triangle_has_no_nodes() {
        let points = vec![Vec2::ZERO, Vec2::X, Vec2::Y];
        let nav_graph = NavGraph::new(Polygon::from_triangles(points, &[[0, 1, 2]]).unwrap());

        assert_eq!(nav_graph.graph().node_count(), 0);
        assert_eq!(nav_graph.graph().connection_count(), 0);
    }
}
