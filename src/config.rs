//! # Configuration
//!
//! JSON-backed configuration for the world and the lighting terms handed to the
//! shader. Every struct is `#[serde(default)]`, so a document only has to name
//! the fields it wants to change.
//!
//! Player tuning is deliberately absent: see
//! [`PlayerConstants`](crate::engine_state::player::PlayerConstants).
//!
//! ```
//! use voxel_world::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "world": { "draw_distance": 4, "seed": 7 } }"#).unwrap();
//! assert_eq!(config.world.draw_distance, 4);
//! assert_eq!(config.world.chunk_count_x, 256);
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::chunk::{CHUNK_DIMENSION_X, CHUNK_DIMENSION_Y};
use crate::error::ConfigError;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub world: WorldConfig,
    pub lighting: LightingConfig,
    /// Frame-rate cap for the main loop; 0 disables it.
    pub target_fps: u32,
}

/// World size, streaming and terrain parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub chunk_count_x: u32,
    pub chunk_count_z: u32,
    /// Blocks on each horizontal side of the grid the player may not enter.
    pub edge_margin: i32,
    /// Radius, in chunks, of the draw window around the player.
    pub draw_distance: u32,
    /// `None` picks a random seed at startup.
    pub seed: Option<u32>,
    pub noise_scale_h: f64,
    pub noise_scale_v: f64,
    pub height_bulk: i32,
    pub min_dirt_y: i32,
    pub min_stone_y: i32,
    pub allow_parallel: bool,
    /// `None` uses the available parallelism.
    pub worker_count: Option<usize>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_count_x: 256,
            chunk_count_z: 256,
            edge_margin: 2,
            draw_distance: 8,
            seed: None,
            noise_scale_h: 0.01,
            noise_scale_v: 64.0,
            height_bulk: 32,
            min_dirt_y: 40,
            min_stone_y: 84,
            allow_parallel: true,
            worker_count: None,
        }
    }
}

impl WorldConfig {
    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| fastrand::u32(..))
    }

    pub fn resolve_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Directional + ambient lighting and the selection highlight colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub dir_light_dir: [f32; 3],
    pub dir_light_color: [f32; 4],
    pub ambient_light_color: [f32; 4],
    pub cast_shadow: bool,
    pub shadow_color: [f32; 4],
    pub select_color: [f32; 4],
    /// Half-extent of the orthographic shadow volume around the player.
    pub shadow_extent: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            dir_light_dir: [-0.4, -1.0, -0.3],
            dir_light_color: [1.0, 0.97, 0.9, 1.0],
            ambient_light_color: [0.35, 0.38, 0.45, 1.0],
            cast_shadow: true,
            shadow_color: [0.0, 0.0, 0.0, 0.4],
            select_color: [1.0, 1.0, 1.0, 0.35],
            shadow_extent: 64.0,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.chunk_count_x == 0 || world.chunk_count_z == 0 {
            return Err(ConfigError::Invalid(
                "chunk counts must be at least 1".to_string(),
            ));
        }
        if world.edge_margin < 0 {
            return Err(ConfigError::Invalid(
                "edge_margin must not be negative".to_string(),
            ));
        }
        let smallest_side = world.chunk_count_x.min(world.chunk_count_z) as i32 * CHUNK_DIMENSION_X;
        if 2 * world.edge_margin >= smallest_side {
            return Err(ConfigError::Invalid(format!(
                "edge_margin {} leaves no playable area",
                world.edge_margin
            )));
        }
        if world.min_dirt_y >= CHUNK_DIMENSION_Y || world.min_stone_y >= CHUNK_DIMENSION_Y + 1 {
            return Err(ConfigError::Invalid(
                "material heights must lie inside the chunk".to_string(),
            ));
        }
        if !(world.noise_scale_h.is_finite() && world.noise_scale_v.is_finite()) {
            return Err(ConfigError::Invalid("noise scales must be finite".to_string()));
        }
        if world.worker_count == Some(0) {
            return Err(ConfigError::Invalid(
                "worker_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_world_section() {
        let config =
            EngineConfig::from_json_str(r#"{"world": {"chunk_count_x": 4, "seed": 99}}"#).unwrap();
        assert_eq!(config.world.chunk_count_x, 4);
        assert_eq!(config.world.chunk_count_z, 256);
        assert_eq!(config.world.resolve_seed(), 99);
    }

    #[test]
    fn test_rejects_zero_chunks() {
        let result = EngineConfig::from_json_str(r#"{"world": {"chunk_count_z": 0}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_margin_covering_world() {
        let result = EngineConfig::from_json_str(
            r#"{"world": {"chunk_count_x": 1, "chunk_count_z": 1, "edge_margin": 8}}"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = EngineConfig::from_json_str("{ world: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
