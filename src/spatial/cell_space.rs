//! Uniform grid spatial partitioning
//!
//! The space `[-width, width] x [-height, height]` is cut into `rows x cols`
//! equally sized cells. Each agent id lives in exactly one cell, so a radius
//! query only needs to look at the cells its bounding box overlaps.

use glam::Vec2;

use crate::core::CellSpaceConfig;
use crate::geometry::Rect;

/// Index of an agent in an externally owned agent list
pub type AgentId = usize;

/// Anything that has a world position
pub trait Positioned {
    fn position(&self) -> Vec2;
}

impl Positioned for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

/// A single bucket of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Area covered by the cell
    pub bounding_box: Rect,
    /// Agents currently inside the cell
    pub agents: Vec<AgentId>,
}

impl Cell {
    #[must_use]
    pub fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self {
            bounding_box: Rect::new(left, bottom, width, height),
            agents: Vec::new(),
        }
    }

    /// Corners of the cell, for debug drawing
    #[must_use]
    pub fn rect_points(&self) -> [Vec2; 4] {
        self.bounding_box.rect_points()
    }
}

/// Grid of cells answering neighborhood queries
#[derive(Debug, Clone)]
pub struct CellSpace {
    cells: Vec<Cell>,
    /// Half extents of the space
    half_size: Vec2,
    rows: usize,
    cols: usize,
    cell_size: Vec2,
    /// Neighbors found by the last query, reused between queries
    neighbors: Vec<AgentId>,
    /// Cells visited by the last query
    query_cells: Vec<usize>,
}

impl CellSpace {
    /// Create a space covering `[-width, width] x [-height, height]`.
    ///
    /// `max_entities` sizes the neighbor buffer up front.
    #[must_use]
    pub fn new(width: f32, height: f32, rows: usize, cols: usize, max_entities: usize) -> Self {
        if rows == 0 || cols == 0 {
            log::warn!("Cell space needs at least one row and column, got {rows}x{cols}");
        }
        let rows = rows.max(1);
        let cols = cols.max(1);
        let cell_size = Vec2::new(width * 2.0 / cols as f32, height * 2.0 / rows as f32);

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::new(
                    -width + col as f32 * cell_size.x,
                    -height + row as f32 * cell_size.y,
                    cell_size.x,
                    cell_size.y,
                ));
            }
        }

        Self {
            cells,
            half_size: Vec2::new(width, height),
            rows,
            cols,
            cell_size,
            neighbors: Vec::with_capacity(max_entities),
            query_cells: Vec::new(),
        }
    }

    /// Create a space from configuration
    #[must_use]
    pub fn from_config(
        config: &CellSpaceConfig,
        width: f32,
        height: f32,
        max_entities: usize,
    ) -> Self {
        Self::new(width, height, config.rows, config.cols, max_entities)
    }

    // ========================================================================
    // Agent bookkeeping
    // ========================================================================

    /// Put an agent in the cell containing `position`
    pub fn add_agent(&mut self, id: AgentId, position: Vec2) {
        let index = self.position_to_index(position);
        self.cells[index].agents.push(id);
    }

    /// Remove an agent; `position` is where it was last registered.
    ///
    /// Returns whether the agent was found.
    pub fn remove_agent(&mut self, id: AgentId, position: Vec2) -> bool {
        let index = self.position_to_index(position);
        if Self::remove_from(&mut self.cells[index], id) {
            return true;
        }

        log::debug!("Agent {id} not in the cell of {position}, searching all cells");
        self.cells.iter_mut().any(|cell| Self::remove_from(cell, id))
    }

    /// Move an agent to the cell of its new position if that cell changed
    pub fn update_agent_cell(&mut self, id: AgentId, new_position: Vec2, old_position: Vec2) {
        let new_index = self.position_to_index(new_position);
        let old_index = self.position_to_index(old_position);
        if new_index == old_index {
            return;
        }

        if !self.remove_agent(id, old_position) {
            log::warn!("Agent {id} was not registered before its cell update");
        }
        self.cells[new_index].agents.push(id);
    }

    fn remove_from(cell: &mut Cell, id: AgentId) -> bool {
        match cell.agents.iter().position(|&agent| agent == id) {
            Some(slot) => {
                cell.agents.swap_remove(slot);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Collect every agent within `radius` of agent `id`, excluding itself.
    ///
    /// `agents` is the agent list ids index into. The result replaces the
    /// previous one and is read through [`CellSpace::neighbors`].
    pub fn register_neighbors<A: Positioned>(&mut self, id: AgentId, agents: &[A], radius: f32) {
        self.neighbors.clear();
        self.query_cells.clear();

        let Some(position) = agents.get(id).map(Positioned::position) else {
            log::warn!("Neighbor query for unknown agent {id}");
            return;
        };

        let (min_row, min_col) = self.cell_coords(self.clamp(position - Vec2::splat(radius)));
        let (max_row, max_col) = self.cell_coords(self.clamp(position + Vec2::splat(radius)));

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let index = row * self.cols + col;
                self.query_cells.push(index);

                for &other in &self.cells[index].agents {
                    if other == id {
                        continue;
                    }
                    let Some(agent) = agents.get(other) else {
                        continue;
                    };
                    if position.distance(agent.position()) <= radius {
                        self.neighbors.push(other);
                    }
                }
            }
        }
    }

    /// Neighbors found by the last query
    #[must_use]
    pub fn neighbors(&self) -> &[AgentId] {
        &self.neighbors
    }

    /// Number of neighbors found by the last query
    #[must_use]
    pub fn nr_of_neighbors(&self) -> usize {
        self.neighbors.len()
    }

    /// Cells visited by the last query
    #[must_use]
    pub fn query_cells(&self) -> &[usize] {
        &self.query_cells
    }

    /// Index of the cell containing `position`; positions outside the space
    /// map to the nearest border cell
    #[must_use]
    pub fn position_to_index(&self, position: Vec2) -> usize {
        let (row, col) = self.cell_coords(position);
        row * self.cols + col
    }

    /// Clamped (row, column) of the cell containing `position`
    fn cell_coords(&self, position: Vec2) -> (usize, usize) {
        let local = (position + self.half_size) / self.cell_size;
        // Float to int casts saturate, NaN becomes 0
        let col = (local.x.floor() as usize).min(self.cols - 1);
        let row = (local.y.floor() as usize).min(self.rows - 1);
        (row, col)
    }

    fn clamp(&self, position: Vec2) -> Vec2 {
        position.clamp(-self.half_size, self.half_size)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// All cells, row by row from the bottom
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Width and height of one cell
    #[must_use]
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Total number of registered agents
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.agents.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic scatter of points over the space
    fn scatter(count: usize, extent: f32) -> Vec<Vec2> {
        let mut state = 0x2545_f491_u32;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32) * 2.0 - 1.0
        };
        (0..count).map(|_| Vec2::new(next(), next()) * extent).collect()
    }

    fn space_with(positions: &[Vec2]) -> CellSpace {
        let mut space = CellSpace::new(100.0, 50.0, 10, 20, positions.len());
        for (id, &position) in positions.iter().enumerate() {
            space.add_agent(id, position);
        }
        space
    }

    #[test]
    fn test_cells_cover_space() {
        let space = CellSpace::new(100.0, 50.0, 10, 20, 0);

        assert_eq!(space.cells().len(), 200);
        assert_eq!(space.cell_size(), Vec2::new(10.0, 10.0));
        assert_eq!(space.cells()[0].bounding_box.min(), Vec2::new(-100.0, -50.0));
        assert_eq!(space.cells()[199].bounding_box.max(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_position_to_index_uses_columns_as_stride() {
        let space = CellSpace::new(100.0, 50.0, 10, 20, 0);

        assert_eq!(space.position_to_index(Vec2::new(-95.0, -45.0)), 0);
        assert_eq!(space.position_to_index(Vec2::new(-85.0, -45.0)), 1);
        assert_eq!(space.position_to_index(Vec2::new(-95.0, -35.0)), 20);
        assert_eq!(space.position_to_index(Vec2::new(95.0, 45.0)), 199);
    }

    #[test]
    fn test_position_to_index_clamps() {
        let space = CellSpace::new(100.0, 50.0, 10, 20, 0);

        assert_eq!(space.position_to_index(Vec2::new(-500.0, -500.0)), 0);
        assert_eq!(space.position_to_index(Vec2::new(500.0, 500.0)), 199);
        assert_eq!(space.position_to_index(Vec2::new(100.0, 50.0)), 199);
        assert_eq!(space.position_to_index(Vec2::new(f32::NAN, 0.0)), 100);
    }

    #[test]
    fn test_neighbors_match_brute_force() {
        let positions = scatter(300, 90.0);
        let mut space = space_with(&positions);

        for radius in [3.0, 12.5, 40.0] {
            for id in [0, 17, 150, 299] {
                space.register_neighbors(id, &positions, radius);
                let mut found = space.neighbors().to_vec();
                found.sort_unstable();

                let expected: Vec<_> = (0..positions.len())
                    .filter(|&other| other != id)
                    .filter(|&other| positions[id].distance(positions[other]) <= radius)
                    .collect();

                assert_eq!(found, expected, "agent {id}, radius {radius}");
                assert_eq!(space.nr_of_neighbors(), expected.len());
            }
        }
    }

    #[test]
    fn test_query_touches_only_overlapping_cells() {
        let positions = vec![Vec2::new(5.0, 5.0)];
        let mut space = space_with(&positions);

        space.register_neighbors(0, &positions, 2.0);
        assert_eq!(space.query_cells().len(), 1);

        space.register_neighbors(0, &positions, 10.0);
        assert_eq!(space.query_cells().len(), 9);
    }

    #[test]
    fn test_query_at_border() {
        let positions = vec![Vec2::new(-99.0, -49.0), Vec2::new(-97.0, -49.0)];
        let mut space = space_with(&positions);

        space.register_neighbors(0, &positions, 5.0);
        assert_eq!(space.neighbors(), &[1]);
    }

    #[test]
    fn test_update_moves_agent() {
        let mut positions = vec![Vec2::new(-95.0, -45.0), Vec2::new(0.0, 0.0)];
        let mut space = space_with(&positions);
        let old = positions[0];

        positions[0] = Vec2::new(1.0, 1.0);
        space.update_agent_cell(0, positions[0], old);

        assert!(space.cells()[space.position_to_index(old)].agents.is_empty());
        assert_eq!(space.cells()[space.position_to_index(positions[0])].agents.len(), 2);
        assert_eq!(space.agent_count(), 2);

        space.register_neighbors(1, &positions, 2.0);
        assert_eq!(space.neighbors(), &[0]);
    }

    #[test]
    fn test_update_within_cell_is_noop() {
        let mut space = space_with(&[Vec2::new(1.0, 1.0)]);

        space.update_agent_cell(0, Vec2::new(2.0, 2.0), Vec2::new(1.0, 1.0));
        assert_eq!(space.cells()[space.position_to_index(Vec2::ONE)].agents, vec![0]);
    }

    #[test]
    fn test_remove_agent() {
        let mut space = space_with(&[Vec2::new(1.0, 1.0), Vec2::new(1.5, 1.0)]);

        assert!(space.remove_agent(0, Vec2::new(1.0, 1.0)));
        assert!(!space.remove_agent(0, Vec2::new(1.0, 1.0)));
        // Wrong position still finds the agent
        assert!(space.remove_agent(1, Vec2::new(-80.0, 30.0)));
        assert_eq!(space.agent_count(), 0);
    }

    #[test]
    fn test_unknown_agent_query_is_empty() {
        let positions = vec![Vec2::ZERO, Vec2::ONE];
        let mut space = space_with(&positions);

        space.register_neighbors(0, &positions, 5.0);
        space.register_neighbors(7, &positions, 5.0);
        assert_eq!(space.nr_of_neighbors(), 0);
    }
}
