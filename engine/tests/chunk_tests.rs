//! Chunk Tests - Strip Coverage and Bounding Boxes
//!
//! Every grid cell must be covered by exactly two triangles across all
//! chunks, and each chunk box must hug its footprint exactly.

use std::collections::HashMap;

use motor_terrain_engine::TerrainError;
use motor_terrain_engine::terrain::{
    Algorithm, GenerationParams, Heightmap, build_chunks, generate_seeded, strip_index_count,
    strip_triangles,
};

fn generated(size: usize) -> Heightmap {
    let params = GenerationParams {
        fault_iterations: 50,
        ..Default::default()
    };
    generate_seeded(Algorithm::FaultLine, 11, size, &params).unwrap()
}

/// Cell `(x, z)` a non-degenerate strip triangle belongs to.
fn cell_of(tri: [u32; 3], size: usize) -> (usize, usize) {
    let xs = tri.map(|i| i as usize % size);
    let zs = tri.map(|i| i as usize / size);
    (*xs.iter().min().unwrap(), *zs.iter().min().unwrap())
}

#[test]
fn test_every_cell_covered_by_two_triangles() {
    let size = 65;
    let grid = build_chunks(&generated(size), 17).unwrap();

    let mut cells: HashMap<(usize, usize), usize> = HashMap::new();
    let mut seen_triangles = std::collections::HashSet::new();
    for chunk in &grid {
        for tri in strip_triangles(&chunk.indices) {
            let mut key = tri;
            key.sort_unstable();
            assert!(seen_triangles.insert(key), "duplicate triangle {tri:?}");
            *cells.entry(cell_of(tri, size)).or_default() += 1;
        }
    }

    assert_eq!(cells.len(), (size - 1) * (size - 1));
    assert!(cells.values().all(|&count| count == 2));
}

#[test]
fn test_every_sample_is_referenced() {
    let size = 33;
    let grid = build_chunks(&generated(size), 9).unwrap();
    let mut referenced = vec![false; size * size];
    for chunk in grid.iter() {
        for &i in &chunk.indices {
            referenced[i as usize] = true;
        }
    }
    assert!(referenced.iter().all(|&r| r));
}

#[test]
fn test_triangles_share_winding() {
    let size = 17;
    let map = Heightmap::new(size);
    let grid = build_chunks(&map, 9).unwrap();
    for chunk in grid.iter() {
        for tri in strip_triangles(&chunk.indices) {
            let p = tri.map(|i| glam::Vec3::new((i as usize % size) as f32, 0.0, (i as usize / size) as f32));
            let normal = (p[1] - p[0]).cross(p[2] - p[0]);
            assert!(normal.y > 0.0, "triangle {tri:?} faces down");
        }
    }
}

#[test]
fn test_index_counts() {
    let grid = build_chunks(&generated(65), 33).unwrap();
    assert_eq!(grid.len(), 4);
    for chunk in grid.iter() {
        assert_eq!(chunk.element_count(), strip_index_count(33));
        assert_eq!(chunk.element_count(), 32 * 68 - 2);
    }
    assert_eq!(grid.total_elements(), 4 * strip_index_count(33));
}

#[test]
fn test_bounding_boxes_are_exact() {
    let size = 65;
    let chunk_size = 17;
    let map = generated(size);
    let grid = build_chunks(&map, chunk_size).unwrap();

    for chunk in grid.iter() {
        let x0 = chunk.grid_x * (chunk_size - 1);
        let z0 = chunk.grid_z * (chunk_size - 1);
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for z in z0..z0 + chunk_size {
            for x in x0..x0 + chunk_size {
                lo = lo.min(map.height(x, z));
                hi = hi.max(map.height(x, z));
            }
        }
        assert_eq!(chunk.bounds.min.y, lo);
        assert_eq!(chunk.bounds.max.y, hi);
        assert_eq!(chunk.bounds.min.x, x0 as f32);
        assert_eq!(chunk.bounds.max.x, (x0 + chunk_size - 1) as f32);
        assert_eq!(chunk.bounds.min.z, z0 as f32);
        assert_eq!(chunk.bounds.max.z, (z0 + chunk_size - 1) as f32);
    }
}

#[test]
fn test_neighbouring_chunks_share_an_edge() {
    let grid = build_chunks(&generated(33), 17).unwrap();
    let left = grid.get(0, 0).unwrap();
    let right = grid.get(1, 0).unwrap();
    assert_eq!(left.bounds.max.x, right.bounds.min.x);
}

#[test]
fn test_bad_layout_is_rejected() {
    let map = generated(33);
    for chunk_size in [0, 1, 6, 34] {
        let err = build_chunks(&map, chunk_size).unwrap_err();
        assert!(matches!(err, TerrainError::ChunkLayout { size: 33, .. }));
    }
}
