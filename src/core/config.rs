//! Sandbox configuration
//!
//! Grid, spatial-index and flock settings, loadable from RON or JSON files.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::graph::TerrainType;

/// Terrain override for a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellTerrain {
    /// Cell row
    pub row: usize,
    /// Cell column
    pub col: usize,
    /// Terrain to apply
    pub terrain: TerrainType,
}

/// Grid graph configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Width in cells
    pub columns: usize,
    /// Height in cells
    pub rows: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World position of the bottom-left corner
    #[serde(default)]
    pub origin: Vec2,
    /// Connect diagonal neighbors
    pub is_connected_diagonally: bool,
    /// Cells that are not plain ground
    #[serde(default)]
    pub terrain: Vec<CellTerrain>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 10,
            cell_size: 15.0,
            origin: Vec2::ZERO,
            is_connected_diagonally: true,
            terrain: Vec::new(),
        }
    }
}

impl GridConfig {
    /// Set grid dimensions
    #[must_use]
    pub fn with_size(mut self, columns: usize, rows: usize) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    /// Set cell size
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set world origin
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Enable or disable diagonal connections
    #[must_use]
    pub fn with_diagonals(mut self, enabled: bool) -> Self {
        self.is_connected_diagonally = enabled;
        self
    }

    /// Add a terrain override
    #[must_use]
    pub fn with_terrain(mut self, cell: CellTerrain) -> Self {
        self.terrain.push(cell);
        self
    }
}

/// Uniform-grid spatial index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpaceConfig {
    /// Number of cell rows
    pub rows: usize,
    /// Number of cell columns
    pub cols: usize,
}

impl Default for CellSpaceConfig {
    fn default() -> Self {
        Self { rows: 25, cols: 25 }
    }
}

/// Flocking simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockConfig {
    /// Number of agents
    pub flock_size: usize,
    /// Half extent of the square world
    pub world_size: f32,
    /// Wrap agents around the world edges
    pub trim_world: bool,
    /// Neighborhood query radius
    pub neighborhood_radius: f32,
    /// Agent top speed
    pub max_speed: f32,
    /// Radius inside which the evade behavior kicks in
    pub evade_radius: f32,
    /// Use the cell space for neighbor queries
    pub use_space_partitioning: bool,
    /// Spatial index layout
    #[serde(default)]
    pub cell_space: CellSpaceConfig,
    /// Seed for initial agent placement
    pub seed: u64,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            flock_size: 50,
            world_size: 100.0,
            trim_world: true,
            neighborhood_radius: 15.0,
            max_speed: 15.0,
            evade_radius: 20.0,
            use_space_partitioning: true,
            cell_space: CellSpaceConfig::default(),
            seed: 0x5eed,
        }
    }
}

impl FlockConfig {
    /// Set flock size
    #[must_use]
    pub fn with_flock_size(mut self, flock_size: usize) -> Self {
        self.flock_size = flock_size;
        self
    }

    /// Set world half extent
    #[must_use]
    pub fn with_world_size(mut self, world_size: f32) -> Self {
        self.world_size = world_size;
        self
    }

    /// Enable or disable space partitioning
    #[must_use]
    pub fn with_space_partitioning(mut self, enabled: bool) -> Self {
        self.use_space_partitioning = enabled;
        self
    }

    /// Set the placement seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Top-level configuration of the sandbox
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Grid used by the grid pathfinders
    #[serde(default)]
    pub grid: GridConfig,
    /// Flocking simulation
    #[serde(default)]
    pub flock: FlockConfig,
    /// Agent radius used to expand navmesh obstacles
    #[serde(default = "default_agent_radius")]
    pub agent_radius: f32,
}

fn default_agent_radius() -> f32 {
    1.0
}

impl SandboxConfig {
    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load the configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse the configuration from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Save the configuration to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load the configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
