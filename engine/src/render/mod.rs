//! Render Module
//!
//! Frustum culling and chunk submission for the terrain, plus the wgpu
//! backend that draws it.
//!
//! The visibility loop ([`ChunkRenderer`]) only talks to the
//! [`RenderBackend`] trait; [`TerrainPass`] implements it on top of wgpu and
//! [`RecordingBackend`] records calls for headless runs and tests.

pub mod chunk_renderer;
pub mod frustum;
pub mod gpu_context;
pub mod shader_loader;
pub mod terrain_pass;
pub mod viewer_config;

pub use chunk_renderer::{
    BOUNDS_COLOR, BOUNDS_LINE_VERTICES, ChunkDraw, ChunkRenderer, DrawMode, FrameStats,
    LineVertex, RecordedCall, RecordingBackend, RenderBackend,
};
pub use frustum::{Frustum, FrustumPlane, Plane};
pub use gpu_context::{GpuContext, GpuContextConfig};
pub use shader_loader::{ShaderSource, TerrainShaders};
pub use terrain_pass::{TerrainPass, TerrainUniforms};
pub use viewer_config::{ViewerConfig, ViewerSettings};
