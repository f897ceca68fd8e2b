//! # Engine Configuration
//!
//! Every knob the engine reads at startup, deserializable from JSON. All fields
//! have defaults, so an empty object (`{}`) is a valid configuration and a file
//! only needs to name the values it overrides:
//!
//! ```json
//! {
//!     "world_radius": 3,
//!     "scheduler": { "max_outstanding_jobs": 8 },
//!     "terrain": { "seed": 42 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Horizontal radius of the populated world, in chunks, around the origin.
    pub world_radius: i32,
    /// Vertical radius of the populated world, in chunks, around the origin.
    pub vertical_radius: i32,
    /// Number of meshing workers. `None` uses the available hardware parallelism.
    pub worker_count: Option<usize>,
    /// Dispatch and apply budgets.
    pub scheduler: SchedulerConfig,
    /// Parameters of the built-in terrain fill.
    pub terrain: TerrainConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            world_radius: 2,
            vertical_radius: 1,
            worker_count: None,
            scheduler: SchedulerConfig::default(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Resolves `worker_count`, never returning less than one worker.
    pub fn resolved_worker_count(&self) -> usize {
        self.worker_count
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// Per-tick budgets of the dirty-chunk scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum jobs submitted to the pool per tick (K).
    pub dispatch_per_tick: usize,
    /// Maximum results applied per tick (M).
    pub apply_per_tick: usize,
    /// Dispatch stops while the pool has this many jobs queued or in flight.
    pub max_outstanding_jobs: usize,
    /// Re-dirty already meshed neighbors when a job fills a chunk's terrain.
    pub remesh_neighbors_on_generate: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            dispatch_per_tick: 8,
            apply_per_tick: 8,
            max_outstanding_jobs: 32,
            remesh_neighbors_on_generate: true,
        }
    }
}

/// Parameters of the built-in terrain fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed shared by both noise fields (the cavity field uses `seed + 1`).
    pub seed: u32,
    /// World voxel coordinates are multiplied by this before sampling.
    pub world_scale: f64,
    /// Height at which the surface sits when the height field samples zero.
    pub sea_level: i32,
    /// Height field output is multiplied by this to get a surface offset.
    pub terrain_amplitude: f64,
    /// Thickness of the dirt layer below the grass surface.
    pub dirt_depth: i32,
    /// Cavity samples above this carve air.
    pub cave_threshold: f64,
    /// Octaves of the fractal height field.
    pub octaves: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            seed: 0,
            world_scale: 0.02,
            sea_level: 0,
            terrain_amplitude: 24.0,
            dirt_depth: 4,
            cave_threshold: 0.6,
            octaves: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "world_radius": 5, "scheduler": { "max_outstanding_jobs": 3 } }"#,
        )
        .unwrap();
        assert_eq!(config.world_radius, 5);
        assert_eq!(config.scheduler.max_outstanding_jobs, 3);
        assert_eq!(
            config.scheduler.dispatch_per_tick,
            SchedulerConfig::default().dispatch_per_tick
        );
        assert_eq!(config.terrain, TerrainConfig::default());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = EngineConfig::from_json_str("{ world_radius: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn worker_count_is_at_least_one() {
        let config = EngineConfig {
            worker_count: Some(0),
            ..EngineConfig::default()
        };
        assert_eq!(config.resolved_worker_count(), 1);
        assert!(EngineConfig::default().resolved_worker_count() >= 1);
    }
}
