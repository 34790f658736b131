//! Viewer Configuration
//!
//! Window and debug settings for the terrain viewer, optionally read from
//! the same JSON file as the terrain under a `"viewer"` key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use crate::terrain::TerrainConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Enable VSync (false = Immediate present mode for uncapped FPS)
    pub vsync: bool,
    /// Start with chunk bounding boxes drawn
    pub bounding_boxes: bool,
    /// Load shaders from this directory instead of the embedded copies
    pub shader_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            bounding_boxes: false,
            shader_dir: None,
        }
    }
}

/// Everything the viewer reads from its config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub viewer: ViewerConfig,
    pub terrain: TerrainConfig,
}

impl ViewerSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text).map_err(|source| TerrainError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("[Viewer] Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Algorithm;

    #[test]
    fn test_settings_defaults() {
        let settings: ViewerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ViewerSettings::default());
        assert!(settings.viewer.vsync);
        assert!(!settings.viewer.bounding_boxes);
    }

    #[test]
    fn test_settings_nested_terrain() {
        let settings: ViewerSettings = serde_json::from_str(
            r#"{ "viewer": { "bounding_boxes": true }, "terrain": { "algorithm": "fault_line", "seed": 3 } }"#,
        )
        .unwrap();
        assert!(settings.viewer.bounding_boxes);
        assert_eq!(settings.viewer.width, 1280);
        assert_eq!(settings.terrain.algorithm, Algorithm::FaultLine);
        assert_eq!(settings.terrain.seed, 3);
    }
}
