//! Normal, Color and Texture Coordinate Derivation
//!
//! Fills in the per-sample attributes that depend on the finished heights.
//! Colors encode the splat blend: RGB is a height shade that blends the
//! lowland layer toward the highland layer, alpha is a slope weight that
//! blends in the cliff layer.

use glam::Vec3;

use super::config::SplatThresholds;
use super::heightmap::{Heightmap, Rgba8};

/// Compute unit normals from finite differences of neighbouring heights.
///
/// Interior samples use central differences, edge samples one-sided ones.
pub fn derive_normals(map: &mut Heightmap) {
    let size = map.size();
    if size < 2 {
        return;
    }
    let heights = map.heights();
    let at = |x: usize, z: usize| heights[z * size + x];

    for z in 0..size {
        let z_lo = z.saturating_sub(1);
        let z_hi = (z + 1).min(size - 1);
        for x in 0..size {
            let x_lo = x.saturating_sub(1);
            let x_hi = (x + 1).min(size - 1);

            let edge_x = Vec3::new((x_hi - x_lo) as f32, at(x_hi, z) - at(x_lo, z), 0.0);
            let edge_z = Vec3::new(0.0, at(x, z_hi) - at(x, z_lo), (z_hi - z_lo) as f32);

            map.sample_mut(x, z).normal = edge_z.cross(edge_x).normalize_or(Vec3::Y);
        }
    }
}

/// Height shade and slope weight for one sample.
pub fn splat_color(height: f32, normal: Vec3, thresholds: &SplatThresholds) -> Rgba8 {
    let shade = clamp01((height - thresholds.height_start) / thresholds.height_span);
    let cliff = clamp01((1.0 - normal.y - thresholds.slope_start) / thresholds.slope_span);

    let grey = 255 - (255.0 * shade) as u8;
    let alpha = 255 - (255.0 * cliff) as u8;
    Rgba8::grey(grey, alpha)
}

/// Assign splat colors. Normals must already be derived.
pub fn derive_colors(map: &mut Heightmap, thresholds: &SplatThresholds) {
    for sample in map.samples_mut() {
        sample.color = splat_color(sample.height, sample.normal, thresholds);
    }
}

/// Assign texture coordinates so the ground textures repeat `tile_amount`
/// times across the grid.
pub fn derive_texture_coords(map: &mut Heightmap, tile_amount: f32) {
    let size = map.size();
    if size == 0 {
        return;
    }
    let step = tile_amount / size as f32;
    for z in 0..size {
        for x in 0..size {
            let sample = map.sample_mut(x, z);
            sample.u = x as f32 * step;
            sample.v = z as f32 * step;
        }
    }
}

fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_map_normals_point_up() {
        let mut map = Heightmap::from_heights(4, &[3.0; 16]).unwrap();
        derive_normals(&mut map);
        for sample in map.samples() {
            assert!((sample.normal - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_ramp_normal_tilts_against_slope() {
        // Height rises by 1 per sample along +x
        let heights: Vec<f32> = (0..25).map(|i| (i % 5) as f32).collect();
        let mut map = Heightmap::from_heights(5, &heights).unwrap();
        derive_normals(&mut map);

        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        for sample in map.samples() {
            assert!((sample.normal - expected).length() < 1e-5);
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let heights: Vec<f32> = (0..81).map(|i| ((i * 37) % 11) as f32 * 0.7).collect();
        let mut map = Heightmap::from_heights(9, &heights).unwrap();
        derive_normals(&mut map);
        for sample in map.samples() {
            assert!((sample.normal.length() - 1.0).abs() < 1e-5);
            assert!(sample.normal.y > 0.0);
        }
    }

    #[test]
    fn test_splat_color_thresholds() {
        let t = SplatThresholds::default();
        // Low and flat: white, opaque
        assert_eq!(splat_color(0.0, Vec3::Y, &t), Rgba8::grey(255, 255));
        // Above height_start + height_span: black
        assert_eq!(splat_color(40.0, Vec3::Y, &t).r, 0);
        // Halfway up the shade ramp: 255 - trunc(127.5) = 128
        assert_eq!(splat_color(25.0, Vec3::Y, &t).r, 128);
        // Steep slope: 1 - n.y past 0.4 gives zero alpha
        let steep = Vec3::new(0.866, 0.5, 0.0);
        assert_eq!(splat_color(0.0, steep, &t).a, 0);
    }

    #[test]
    fn test_texture_coords_tile() {
        let mut map = Heightmap::new(10);
        derive_texture_coords(&mut map, 10.0);
        assert_eq!(map.sample(0, 0).u, 0.0);
        assert_eq!(map.sample(3, 0).u, 3.0);
        assert_eq!(map.sample(0, 7).v, 7.0);
        assert!(map.samples().iter().all(|s| s.u < 10.0 && s.v < 10.0));
    }
}
