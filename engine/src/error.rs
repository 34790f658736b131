//! Terrain Errors
//!
//! Every failure the terrain pipeline can report. Generation and chunk
//! building are one-shot: an error aborts terrain initialization and nothing
//! partially built is handed back to the caller.

use std::path::PathBuf;

use crate::terrain::Algorithm;

/// Centralized error type for terrain generation, asset loading and GPU setup
#[derive(thiserror::Error, Debug)]
pub enum TerrainError {
    #[error("grid size {size} is not valid for the {algorithm} algorithm")]
    GridSize { size: usize, algorithm: Algorithm },

    #[error("chunk size {chunk_size} does not evenly partition a {size}x{size} grid")]
    ChunkLayout { size: usize, chunk_size: usize },

    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),

    #[error("non-finite height at ({x}, {z})")]
    NonFinite { x: usize, z: usize },

    #[error("failed to load terrain texture {path:?}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image {path:?}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPU error: {0}")]
    Gpu(String),
}

impl TerrainError {
    pub fn invalid_params<T: ToString>(msg: T) -> Self {
        TerrainError::InvalidParams(msg.to_string())
    }

    pub fn gpu<T: ToString>(msg: T) -> Self {
        TerrainError::Gpu(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TerrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_message_names_algorithm() {
        let err = TerrainError::GridSize {
            size: 100,
            algorithm: Algorithm::Midpoint,
        };
        assert_eq!(
            err.to_string(),
            "grid size 100 is not valid for the midpoint algorithm"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TerrainError = io.into();
        assert!(matches!(err, TerrainError::Io(_)));
    }
}
