//! Grid graphs
//!
//! A rectangular grid of cells where every cell is a node. The node index of
//! a cell is `row * columns + col`, and world positions map to cells by plain
//! arithmetic, so lookups never search.

use glam::Vec2;
use smallvec::SmallVec;

use super::base::Graph;
use super::node::{GridNode, NodeIndex, TerrainType};
use crate::core::GridConfig;
use crate::geometry::{Rect, Shape};

/// Straight neighbor offsets as (column, row) deltas
const STRAIGHT_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Diagonal neighbor offsets as (column, row) deltas
const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// A 2D navigation grid backed by an undirected graph
#[derive(Debug, Clone)]
pub struct GridGraph {
    graph: Graph<GridNode>,
    /// Width in cells
    columns: usize,
    /// Height in cells
    rows: usize,
    /// Cell size in world units
    cell_size: f32,
    /// World position of the bottom-left corner of cell (0, 0)
    origin: Vec2,
    /// Whether cells connect to their diagonal neighbors
    is_connected_diagonally: bool,
}

impl GridGraph {
    /// Create a grid with every cell set to ground
    #[must_use]
    pub fn new(columns: usize, rows: usize, cell_size: f32, is_connected_diagonally: bool) -> Self {
        let mut grid = Self {
            graph: Graph::new(false),
            columns,
            rows,
            cell_size,
            origin: Vec2::ZERO,
            is_connected_diagonally,
        };

        for row in 0..rows {
            for col in 0..columns {
                let position = grid.world_pos_of(row, col);
                grid.graph.add_node(GridNode {
                    position,
                    terrain: TerrainType::Ground,
                });
            }
        }

        for index in 0..grid.node_count() {
            grid.connect_cell(index);
        }

        log::debug!(
            "Created {}x{} grid graph ({} connections)",
            columns,
            rows,
            grid.graph.connection_count()
        );

        grid
    }

    /// Build a grid from configuration, applying its terrain overrides
    #[must_use]
    pub fn from_config(config: &GridConfig) -> Self {
        let mut grid = Self::new(
            config.columns,
            config.rows,
            config.cell_size,
            config.is_connected_diagonally,
        )
        .with_origin(config.origin);

        for cell in &config.terrain {
            match grid.index_of(cell.row, cell.col) {
                Some(index) => grid.set_terrain(index, cell.terrain),
                None => log::warn!(
                    "Terrain override ({}, {}) is outside the {}x{} grid",
                    cell.row,
                    cell.col,
                    config.columns,
                    config.rows
                ),
            }
        }

        grid
    }

    /// Move the grid so cell (0, 0) starts at `origin`
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        let offset = origin - self.origin;
        self.origin = origin;
        for index in 0..self.node_count() {
            if let Some(node) = self.graph.node_mut(index) {
                node.position += offset;
            }
        }
        self
    }

    // ========================================================================
    // Index math
    // ========================================================================

    /// Number of columns
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell size in world units
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of the bottom-left corner of the grid
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Whether diagonal moves exist
    #[must_use]
    pub fn is_connected_diagonally(&self) -> bool {
        self.is_connected_diagonally
    }

    /// Total number of cells
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Check if signed cell coordinates are inside the grid
    #[must_use]
    pub fn is_within_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.columns
    }

    /// Node index of a cell
    #[must_use]
    pub fn index_of(&self, row: usize, col: usize) -> Option<NodeIndex> {
        (row < self.rows && col < self.columns).then_some(row * self.columns + col)
    }

    /// Cell coordinates (row, col) of a node index
    #[must_use]
    pub fn row_col(&self, index: NodeIndex) -> Option<(usize, usize)> {
        (index < self.node_count()).then(|| (index / self.columns, index % self.columns))
    }

    /// Index of the cell offset from `index` by (`dcol`, `drow`), if inside the grid
    #[must_use]
    pub fn offset_index(&self, index: NodeIndex, dcol: i32, drow: i32) -> Option<NodeIndex> {
        let (row, col) = self.row_col(index)?;
        let row = row as i64 + i64::from(drow);
        let col = col as i64 + i64::from(dcol);
        if self.is_within_bounds(row, col) {
            self.index_of(row as usize, col as usize)
        } else {
            None
        }
    }

    /// World position of a cell center
    #[must_use]
    pub fn world_pos_of(&self, row: usize, col: usize) -> Vec2 {
        self.origin
            + Vec2::new(
                (col as f32 + 0.5) * self.cell_size,
                (row as f32 + 0.5) * self.cell_size,
            )
    }

    /// World position of a node
    #[must_use]
    pub fn node_world_pos(&self, index: NodeIndex) -> Option<Vec2> {
        self.graph.node_position(index)
    }

    /// Index of the cell containing a world position
    #[must_use]
    pub fn index_at_world_pos(&self, position: Vec2) -> Option<NodeIndex> {
        let local = (position - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        self.index_of(local.y.floor() as usize, local.x.floor() as usize)
    }

    /// Bounding box of a cell
    #[must_use]
    pub fn cell_rect(&self, index: NodeIndex) -> Option<Rect> {
        let (row, col) = self.row_col(index)?;
        Some(Rect::new(
            self.origin.x + col as f32 * self.cell_size,
            self.origin.y + row as f32 * self.cell_size,
            self.cell_size,
            self.cell_size,
        ))
    }

    // ========================================================================
    // Terrain
    // ========================================================================

    /// Terrain of a cell
    #[must_use]
    pub fn terrain(&self, index: NodeIndex) -> Option<TerrainType> {
        self.graph.node(index).map(|node| node.terrain)
    }

    /// Whether a cell exists and can be entered
    #[must_use]
    pub fn is_passable(&self, index: NodeIndex) -> bool {
        self.terrain(index).is_some_and(TerrainType::is_passable)
    }

    /// Change the terrain of a cell and rebuild its connections.
    ///
    /// Impassable cells lose every connection; passable cells are connected
    /// to all passable neighbors with terrain-weighted costs.
    pub fn set_terrain(&mut self, index: NodeIndex, terrain: TerrainType) {
        let Some(node) = self.graph.node_mut(index) else {
            return;
        };
        node.terrain = terrain;

        for (dcol, drow) in self.neighbor_offsets() {
            if let Some(neighbor) = self.offset_index(index, dcol, drow) {
                self.graph.remove_connection(index, neighbor);
            }
        }

        if terrain.is_passable() {
            self.connect_cell(index);
        }
    }

    /// Set the terrain of every cell whose center lies inside `shape`.
    ///
    /// Returns the number of cells changed.
    pub fn paint_shape(&mut self, shape: &Shape, terrain: TerrainType) -> usize {
        let covered: Vec<NodeIndex> = (0..self.node_count())
            .filter(|&index| {
                self.node_world_pos(index)
                    .is_some_and(|center| shape.contains(center))
                    && self.terrain(index) != Some(terrain)
            })
            .collect();

        for &index in &covered {
            self.set_terrain(index, terrain);
        }
        covered.len()
    }

    // ========================================================================
    // Graph access
    // ========================================================================

    /// Underlying graph
    #[must_use]
    pub fn graph(&self) -> &Graph<GridNode> {
        &self.graph
    }

    fn neighbor_offsets(&self) -> SmallVec<[(i32, i32); 8]> {
        let mut offsets: SmallVec<[(i32, i32); 8]> = SmallVec::from_slice(&STRAIGHT_OFFSETS);
        if self.is_connected_diagonally {
            offsets.extend_from_slice(&DIAGONAL_OFFSETS);
        }
        offsets
    }

    /// Connect a passable cell to its passable neighbors
    fn connect_cell(&mut self, index: NodeIndex) {
        let Some(terrain) = self.terrain(index).filter(|t| t.is_passable()) else {
            return;
        };

        for (dcol, drow) in self.neighbor_offsets() {
            let Some(neighbor) = self.offset_index(index, dcol, drow) else {
                continue;
            };
            let Some(neighbor_terrain) = self.terrain(neighbor).filter(|t| t.is_passable()) else {
                continue;
            };

            let distance = Vec2::new(dcol as f32, drow as f32).length() * self.cell_size;
            let multiplier = (terrain.cost_multiplier() + neighbor_terrain.cost_multiplier()) * 0.5;
            self.graph
                .add_connection_with_cost(index, neighbor, distance * multiplier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CellTerrain;

    #[test]
    fn test_index_bijection() {
        let grid = GridGraph::new(7, 5, 2.0, true).with_origin(Vec2::new(-3.0, 4.0));

        for row in 0..grid.rows() {
            for col in 0..grid.columns() {
                let position = grid.world_pos_of(row, col);
                assert_eq!(grid.index_at_world_pos(position), Some(row * 7 + col));
                assert_eq!(grid.row_col(row * 7 + col), Some((row, col)));
                assert_eq!(grid.node_world_pos(row * 7 + col), Some(position));
            }
        }
    }

    #[test]
    fn test_out_of_bounds_lookups() {
        let grid = GridGraph::new(4, 4, 1.0, false);

        assert_eq!(grid.index_at_world_pos(Vec2::new(-0.1, 1.0)), None);
        assert_eq!(grid.index_at_world_pos(Vec2::new(4.0, 1.0)), None);
        assert_eq!(grid.index_of(4, 0), None);
        assert_eq!(grid.offset_index(0, -1, 0), None);
        assert_eq!(grid.offset_index(3, 1, 0), None); // No wrap to the next row
        assert!(!grid.is_within_bounds(-1, 2));
    }

    #[test]
    fn test_connection_counts() {
        let straight = GridGraph::new(3, 3, 1.0, false);
        let diagonal = GridGraph::new(3, 3, 1.0, true);

        // Center cell
        assert_eq!(straight.graph().connections(4).len(), 4);
        assert_eq!(diagonal.graph().connections(4).len(), 8);
        // Corner cell
        assert_eq!(diagonal.graph().connections(0).len(), 3);

        let diagonal_cost = diagonal.graph().connection(0, 4).unwrap().cost;
        assert!((diagonal_cost - std::f32::consts::SQRT_2).abs() < 0.001);
    }

    #[test]
    fn test_water_removes_and_restores_connections() {
        let mut grid = GridGraph::new(3, 3, 1.0, true);

        grid.set_terrain(4, TerrainType::Water);
        assert!(!grid.is_passable(4));
        assert!(grid.graph().connections(4).is_empty());
        assert!(!grid.graph().is_connected(0, 4));

        grid.set_terrain(4, TerrainType::Ground);
        assert_eq!(grid.graph().connections(4).len(), 8);
        assert!(grid.graph().is_connected(0, 4));
    }

    #[test]
    fn test_mud_costs_more() {
        let mut grid = GridGraph::new(3, 1, 1.0, false);
        grid.set_terrain(1, TerrainType::Mud);

        let cost = grid.graph().connection(0, 1).unwrap().cost;
        assert!((cost - 1.5).abs() < 0.001);
        let back = grid.graph().connection(1, 0).unwrap().cost;
        assert!((back - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_paint_expanded_obstacle() {
        let mut grid = GridGraph::new(5, 5, 1.0, false);
        let obstacle = Shape::rectangle(Vec2::splat(2.5), Vec2::splat(0.4));

        assert_eq!(grid.paint_shape(&obstacle, TerrainType::Water), 1);
        assert!(!grid.is_passable(12));

        // Growing by the agent radius covers the ring around the center cell
        let changed = grid.paint_shape(&obstacle.expanded(1.0), TerrainType::Water);
        assert_eq!(changed, 8);
        assert_eq!(grid.paint_shape(&obstacle.expanded(1.0), TerrainType::Water), 0);
    }

    #[test]
    fn test_from_config() {
        let config = GridConfig::default()
            .with_size(5, 4)
            .with_terrain(CellTerrain {
                row: 1,
                col: 2,
                terrain: TerrainType::Water,
            })
            .with_terrain(CellTerrain {
                row: 9,
                col: 9,
                terrain: TerrainType::Water,
            });
        let grid = GridGraph::from_config(&config);

        assert_eq!(grid.node_count(), 20);
        assert_eq!(grid.terrain(7), Some(TerrainType::Water));
        assert_eq!(grid.cell_rect(0).unwrap().size, Vec2::splat(config.cell_size));
    }
}
