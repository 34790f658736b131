//! Motor Terrain Engine Library
//!
//! Procedural heightmap terrain for a small 3D engine: generation, chunked
//! triangle-strip meshes, frustum culling and a wgpu renderer.
//!
//! # Modules
//!
//! - [`terrain`] - Heightmap algorithms, attribute derivation, chunking, vertex packing
//! - [`render`] - Frustum culling, chunk renderer, wgpu terrain pass
//! - [`camera`] - Free-fly camera supplying view/projection matrices
//! - [`error`] - Error type shared by every module
//!
//! # Example
//!
//! ```ignore
//! use motor_terrain_engine::camera::FlyCamera;
//! use motor_terrain_engine::render::{ChunkRenderer, Frustum, RecordingBackend};
//! use motor_terrain_engine::terrain::{Terrain, TerrainConfig};
//!
//! let terrain = Terrain::generate(&TerrainConfig::default())?;
//! let camera = FlyCamera::overlooking(terrain.size(), 64.0);
//!
//! let frustum = Frustum::from_matrices(camera.view_matrix(), camera.projection_matrix(16.0 / 9.0));
//! let mut renderer = ChunkRenderer::new();
//! let mut backend = RecordingBackend::new();
//! let stats = renderer.render_visible(&frustum, terrain.chunks(), false, &mut backend);
//! println!("{} of {} chunks visible", stats.visible, stats.total);
//! ```

pub mod camera;
pub mod error;
pub mod render;
pub mod terrain;

pub use error::{Result, TerrainError};
