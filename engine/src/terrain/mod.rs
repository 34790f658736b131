//! Terrain Module
//!
//! Procedural heightmap terrain: generation, attribute derivation, chunking
//! and GPU vertex packing.
//!
//! ## Pipeline
//!
//! [`Terrain::generate`] runs every stage once, in order:
//!
//! 1. heightmap algorithm + post-processing ([`generation`])
//! 2. normals, texture coordinates, splat colors ([`derive`])
//! 3. chunk strips and bounding boxes ([`chunk`])
//! 4. interleaved vertex buffer ([`packing`])
//!
//! A failure at any stage returns the error and no terrain.

pub mod chunk;
pub mod config;
pub mod context;
pub mod derive;
pub mod generation;
pub mod heightmap;
pub mod packing;
pub mod textures;

pub use chunk::{BoundingBox, Chunk, ChunkGrid, build_chunks, strip_index_count, strip_triangles};
pub use config::{GenerationParams, SplatThresholds, TerrainConfig};
pub use context::GenerationContext;
pub use derive::{derive_colors, derive_normals, derive_texture_coords, splat_color};
pub use generation::{Algorithm, MidpointLevel, generate, generate_seeded};
pub use heightmap::{DEFAULT_GRID_SIZE, HeightSample, Heightmap, Rgba8};
pub use packing::{PlanarLayout, TerrainVertex, heightmap_image, pack_vertices};
pub use textures::{BlendUnit, MAX_GROUND_TEXTURES, TerrainTextureSet};

use std::time::Instant;

use crate::error::Result;

/// A fully built terrain: heights with derived attributes, chunks and the
/// packed vertex buffer. Immutable once generated.
#[derive(Clone, Debug)]
pub struct Terrain {
    config: TerrainConfig,
    heightmap: Heightmap,
    chunks: ChunkGrid,
    vertices: Vec<TerrainVertex>,
}

impl Terrain {
    pub fn generate(config: &TerrainConfig) -> Result<Self> {
        let start = Instant::now();
        let mut ctx = GenerationContext::new(config.seed);

        // Fail on a bad chunk layout before spending time on generation
        chunk::validate_layout(config.size, config.chunk_size)?;

        let mut heightmap = generate(config.algorithm, &mut ctx, config.size, &config.generation)?;
        derive_normals(&mut heightmap);
        derive_texture_coords(&mut heightmap, config.texture_tile_amount);
        derive_colors(&mut heightmap, &config.splat);

        let chunks = build_chunks(&heightmap, config.chunk_size)?;
        let vertices = pack_vertices(&heightmap);

        log::info!(
            "[Terrain] Ready: {} vertices, {} chunks, {} strip indices in {:.1}ms",
            vertices.len(),
            chunks.len(),
            chunks.total_elements(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self {
            config: config.clone(),
            heightmap,
            chunks,
            vertices,
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn chunks(&self) -> &ChunkGrid {
        &self.chunks
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Samples per side.
    pub fn size(&self) -> usize {
        self.heightmap.size()
    }

    /// Height at the nearest sample to world `(x, z)`, or `None` off the map.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if !x.is_finite() || !z.is_finite() || x < 0.0 || z < 0.0 {
            return None;
        }
        self.heightmap
            .get(x.round() as usize, z.round() as usize)
            .map(|s| s.height)
    }
}
