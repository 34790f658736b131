//! Heightmap Preview
//!
//! Run with:
//! - `cargo run --bin heightmap_preview -- config.json [out.png]`
//! - `cargo run --bin heightmap_preview -- <hill|fault_line|midpoint> [seed] [out.png]`
//!
//! Generates a terrain without opening a window, writes the heightmap as a
//! greyscale image and logs how many chunks the default camera would draw.

use std::path::{Path, PathBuf};

use motor_terrain_engine::camera::FlyCamera;
use motor_terrain_engine::render::{ChunkRenderer, Frustum, RecordingBackend};
use motor_terrain_engine::terrain::{Algorithm, Terrain, TerrainConfig, heightmap_image};
use motor_terrain_engine::{Result, TerrainError};

const DEFAULT_OUTPUT: &str = "heightmap.png";

/// Config plus output path from the command line.
fn parse_args(args: &[String]) -> Result<(TerrainConfig, PathBuf)> {
    let Some(first) = args.first() else {
        return Ok((TerrainConfig::default(), PathBuf::from(DEFAULT_OUTPUT)));
    };

    if Path::new(first)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        let config = TerrainConfig::load(first)?;
        let output = args.get(1).map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), PathBuf::from);
        return Ok((config, output));
    }

    let algorithm: Algorithm = first.parse().map_err(TerrainError::invalid_params)?;
    let seed = match args.get(1) {
        Some(s) => s
            .parse()
            .map_err(|e| TerrainError::invalid_params(format!("seed '{s}': {e}")))?,
        None => TerrainConfig::default().seed,
    };
    let output = args.get(2).map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), PathBuf::from);
    let config = TerrainConfig {
        algorithm,
        seed,
        ..Default::default()
    };
    Ok((config, output))
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, output) = parse_args(&args)?;

    let terrain = Terrain::generate(&config)?;
    let (lo, hi) = terrain.heightmap().height_range().unwrap_or((0.0, 0.0));
    log::info!("[Preview] Height range {:.2} .. {:.2}", lo, hi);

    heightmap_image(terrain.heightmap())
        .save(&output)
        .map_err(|source| TerrainError::ImageWrite {
            path: output.clone(),
            source,
        })?;
    log::info!("[Preview] Wrote {}", output.display());

    let camera = FlyCamera::overlooking(terrain.size(), hi);
    let frustum = Frustum::from_matrices(camera.view_matrix(), camera.projection_matrix(16.0 / 9.0));
    let mut backend = RecordingBackend::new();
    let stats = ChunkRenderer::new().render_visible(&frustum, terrain.chunks(), false, &mut backend);
    log::info!(
        "[Preview] Default camera: {} of {} chunks visible, {} culled, {} strip indices",
        stats.visible,
        stats.total,
        stats.culled,
        stats.elements
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("[Preview] {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_uses_defaults() {
        let (config, output) = parse_args(&[]).unwrap();
        assert_eq!(config, TerrainConfig::default());
        assert_eq!(output, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_algorithm_and_seed() {
        let (config, output) = parse_args(&args(&["hill", "99", "hills.png"])).unwrap();
        assert_eq!(config.algorithm, Algorithm::Hill);
        assert_eq!(config.seed, 99);
        assert_eq!(output, PathBuf::from("hills.png"));
    }

    #[test]
    fn test_bad_algorithm_and_seed() {
        assert!(parse_args(&args(&["volcano"])).is_err());
        assert!(parse_args(&args(&["midpoint", "abc"])).is_err());
    }
}
