//! Terrain Configuration
//!
//! Generation parameters and the on-disk JSON config for a terrain.
//! Every field has a default, so a config file only needs the values it
//! wants to change.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::generation::Algorithm;
use super::heightmap::DEFAULT_GRID_SIZE;
use crate::error::{Result, TerrainError};

/// Samples per chunk side (32 cells plus the shared edge).
pub const DEFAULT_CHUNK_SIZE: usize = 33;

/// How many times the ground textures repeat across the whole terrain.
pub const DEFAULT_TEXTURE_TILE_AMOUNT: f32 = 10.0;

/// Parameters shared by the three heightmap algorithms and the
/// post-processing chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Number of hills raised by the hill algorithm
    pub hill_iterations: u32,
    /// Smallest hill radius in samples
    pub hill_radius_min: f32,
    /// Largest hill radius in samples
    pub hill_radius_max: f32,
    /// Number of random fault lines
    pub fault_iterations: u32,
    /// Height change applied by every fault line
    pub fault_displacement: f32,
    /// Height change applied by the last fault line; equal to
    /// `fault_displacement` unless a linear decay is wanted
    pub fault_displacement_min: f32,
    /// Initial random offset range for midpoint displacement
    pub midpoint_range: f32,
    /// Per-level decay of the midpoint offset range, in (0, 1)
    pub roughness: f32,
    /// Upper bound of the normalized height range
    pub normalize_max: f32,
    /// Neighbourhood averaging passes after normalization
    pub smooth_passes: u32,
    /// Square normalized heights to bias toward flat ground
    pub flatten: bool,
    /// Vertical exaggeration applied last
    pub height_scale: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            hill_iterations: 200,
            hill_radius_min: 10.0,
            hill_radius_max: 100.0,
            fault_iterations: 200,
            fault_displacement: 1.0,
            fault_displacement_min: 1.0,
            midpoint_range: 1.0,
            roughness: 0.5,
            normalize_max: 1.0,
            smooth_passes: 2,
            flatten: true,
            height_scale: 64.0,
        }
    }
}

impl GenerationParams {
    /// Reject parameter sets that would produce NaNs or an empty terrain.
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("hill_radius_min", self.hill_radius_min),
            ("hill_radius_max", self.hill_radius_max),
            ("fault_displacement", self.fault_displacement),
            ("fault_displacement_min", self.fault_displacement_min),
            ("midpoint_range", self.midpoint_range),
            ("roughness", self.roughness),
            ("normalize_max", self.normalize_max),
            ("height_scale", self.height_scale),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(TerrainError::invalid_params(format!("{name} is not finite")));
            }
        }
        if self.hill_radius_min <= 0.0 || self.hill_radius_min > self.hill_radius_max {
            return Err(TerrainError::invalid_params(format!(
                "hill radius range [{}, {}] is empty or non-positive",
                self.hill_radius_min, self.hill_radius_max
            )));
        }
        if self.roughness <= 0.0 || self.roughness >= 1.0 {
            return Err(TerrainError::invalid_params(format!(
                "roughness {} must lie in (0, 1)",
                self.roughness
            )));
        }
        if self.midpoint_range <= 0.0 {
            return Err(TerrainError::invalid_params("midpoint_range must be positive"));
        }
        if self.normalize_max <= 0.0 {
            return Err(TerrainError::invalid_params("normalize_max must be positive"));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus the checks that only matter for
    /// `algorithm`.
    pub fn validate_for(&self, algorithm: Algorithm) -> Result<()> {
        self.validate()?;
        let iterations = match algorithm {
            Algorithm::Hill => Some(("hill_iterations", self.hill_iterations)),
            Algorithm::FaultLine => Some(("fault_iterations", self.fault_iterations)),
            Algorithm::Midpoint => None,
        };
        if let Some((name, 0)) = iterations {
            return Err(TerrainError::invalid_params(format!(
                "{name} must be at least 1 for {algorithm}"
            )));
        }
        Ok(())
    }
}

/// Height and slope thresholds for the splat vertex colors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplatThresholds {
    /// Height at which shading starts to darken
    pub height_start: f32,
    /// Height span over which shading goes from white to black
    pub height_span: f32,
    /// `1 - normal.y` below which no cliff blending happens
    pub slope_start: f32,
    /// Slope span over which the cliff weight ramps fully in
    pub slope_span: f32,
}

impl Default for SplatThresholds {
    fn default() -> Self {
        Self {
            height_start: 10.0,
            height_span: 30.0,
            slope_start: 0.1,
            slope_span: 0.3,
        }
    }
}

/// Full description of a terrain to build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Samples per side of the square grid
    pub size: usize,
    /// Samples per side of one chunk, including the shared edge
    pub chunk_size: usize,
    pub algorithm: Algorithm,
    pub seed: u64,
    pub generation: GenerationParams,
    pub texture_tile_amount: f32,
    pub splat: SplatThresholds,
    /// Ground texture files, bottom layer first
    pub textures: Vec<PathBuf>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            algorithm: Algorithm::Midpoint,
            seed: 42,
            generation: GenerationParams::default(),
            texture_tile_amount: DEFAULT_TEXTURE_TILE_AMOUNT,
            splat: SplatThresholds::default(),
            textures: Vec::new(),
        }
    }
}

impl TerrainConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text).map_err(|source| TerrainError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("[Terrain] Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_engine_constants() {
        let config = TerrainConfig::default();
        assert_eq!(config.size, 1025);
        assert_eq!(config.chunk_size, 33);
        assert_eq!(config.algorithm, Algorithm::Midpoint);
        assert_eq!(config.texture_tile_amount, 10.0);
        assert_eq!(config.generation.hill_radius_min, 10.0);
        assert_eq!(config.generation.hill_radius_max, 100.0);
        assert_eq!(
            config.generation.fault_displacement_min,
            config.generation.fault_displacement
        );
        assert!(config.generation.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = TerrainConfig::from_json(
            r#"{ "size": 65, "algorithm": "hill", "generation": { "smooth_passes": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.size, 65);
        assert_eq!(config.algorithm, Algorithm::Hill);
        assert_eq!(config.generation.smooth_passes, 5);
        assert_eq!(config.generation.roughness, 0.5);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = TerrainConfig::default();
        config.seed = 7;
        config.algorithm = Algorithm::FaultLine;
        config.textures = vec![PathBuf::from("sand.tga")];
        let text = config.to_json().unwrap();
        assert_eq!(TerrainConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let mut params = GenerationParams::default();
        params.hill_radius_min = 50.0;
        params.hill_radius_max = 10.0;
        assert!(params.validate().is_err());

        let mut params = GenerationParams::default();
        params.roughness = 1.0;
        assert!(params.validate().is_err());

        let mut params = GenerationParams::default();
        params.height_scale = f32::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_iterations_rejected_for_selected_algorithm() {
        let params = GenerationParams {
            hill_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate_for(Algorithm::Hill),
            Err(TerrainError::InvalidParams(_))
        ));
        assert!(params.validate_for(Algorithm::FaultLine).is_ok());
        assert!(params.validate_for(Algorithm::Midpoint).is_ok());

        let params = GenerationParams {
            fault_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate_for(Algorithm::FaultLine),
            Err(TerrainError::InvalidParams(_))
        ));
        assert!(params.validate_for(Algorithm::Hill).is_ok());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let path = std::env::temp_dir().join("motor_terrain_bad_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = TerrainConfig::load(&path).unwrap_err();
        assert!(matches!(err, TerrainError::Config { .. }));
        let _ = std::fs::remove_file(&path);
    }
}
