//! Shader Loading Utilities
//!
//! Terrain shaders are embedded at compile time; a shader directory can be
//! given at runtime to load edited copies from disk instead.

use std::path::Path;

/// Shader source that can be either embedded at compile time or loaded at runtime.
#[derive(Clone, Debug)]
pub enum ShaderSource {
    /// Embedded shader source (faster, no file I/O at runtime)
    Embedded(&'static str),
    /// Runtime-loaded shader source
    Runtime(String),
}

impl ShaderSource {
    pub fn as_str(&self) -> &str {
        match self {
            ShaderSource::Embedded(s) => s,
            ShaderSource::Runtime(s) => s.as_str(),
        }
    }
}

/// Load a shader from the filesystem at runtime.
pub fn load_shader_file(path: impl AsRef<Path>) -> Result<ShaderSource, std::io::Error> {
    let source = std::fs::read_to_string(path)?;
    Ok(ShaderSource::Runtime(source))
}

/// Create a wgpu shader module from the given source.
pub fn create_shader_module(
    device: &wgpu::Device,
    label: &str,
    source: &ShaderSource,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
    })
}

/// Shader file names, relative to a shader directory.
pub mod paths {
    /// Splat-blended terrain surface
    pub const TERRAIN: &str = "terrain.wgsl";

    /// Bounding-box debug lines
    pub const BOUNDS: &str = "bounds.wgsl";
}

/// Embedded shaders that are compiled into the binary.
pub mod embedded {
    pub const TERRAIN: &str = include_str!("../../../shaders/terrain.wgsl");
    pub const BOUNDS: &str = include_str!("../../../shaders/bounds.wgsl");
}

/// The terrain and bounds shader pair used by the terrain pass.
#[derive(Clone, Debug)]
pub struct TerrainShaders {
    pub terrain: ShaderSource,
    pub bounds: ShaderSource,
}

impl Default for TerrainShaders {
    fn default() -> Self {
        Self {
            terrain: ShaderSource::Embedded(embedded::TERRAIN),
            bounds: ShaderSource::Embedded(embedded::BOUNDS),
        }
    }
}

impl TerrainShaders {
    /// Load both shaders from `dir`; a file that cannot be read falls back
    /// to the embedded copy with a warning.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let load = |name: &str, fallback: &'static str| {
            let path = dir.join(name);
            match load_shader_file(&path) {
                Ok(source) => {
                    log::info!("[Shaders] Loaded {}", path.display());
                    source
                }
                Err(e) => {
                    log::warn!(
                        "[Shaders] Could not read {} ({e}), using embedded copy",
                        path.display()
                    );
                    ShaderSource::Embedded(fallback)
                }
            }
        };
        Self {
            terrain: load(paths::TERRAIN, embedded::TERRAIN),
            bounds: load(paths::BOUNDS, embedded::BOUNDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_source_runtime() {
        let source = ShaderSource::Runtime("fn main() {}".to_string());
        assert_eq!(source.as_str(), "fn main() {}");
    }

    #[test]
    fn test_from_dir_falls_back_to_embedded() {
        let shaders = TerrainShaders::from_dir("no/such/shader/dir");
        assert!(matches!(shaders.terrain, ShaderSource::Embedded(_)));
        assert_eq!(shaders.bounds.as_str(), embedded::BOUNDS);
    }

    #[test]
    fn test_from_dir_reads_files() {
        let shaders = TerrainShaders::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders"));
        assert!(matches!(shaders.terrain, ShaderSource::Runtime(_)));
        assert_eq!(shaders.terrain.as_str(), embedded::TERRAIN);
    }
}
