//! Core module
//!
//! Serializable configuration shared by the sandbox components

mod config;

pub use config::{CellSpaceConfig, CellTerrain, ConfigError, FlockConfig, GridConfig, SandboxConfig};
