//! Chunked Mesh Builder
//!
//! Splits the heightmap into square chunks that share their edge row and
//! column with their neighbours. Each chunk gets a triangle-strip index list
//! into the shared vertex grid and an exact axis-aligned bounding box used by
//! the frustum culler.
//!
//! Strip layout for one chunk of `cs` samples per side: every cell row walks
//! its columns emitting the upper then lower vertex; rows are joined by two
//! degenerate indices (last vertex of the finished row, first vertex of the
//! next one), so the whole chunk is a single strip of
//! `(cs - 1) * (2 * cs + 2) - 2` indices.

use glam::Vec3;
use rayon::prelude::*;

use super::heightmap::Heightmap;
use crate::error::{Result, TerrainError};

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// All eight corners. Bit 0 selects x, bit 1 y, bit 2 z.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }

    /// The twelve edges as corner pairs, for wireframe debug drawing.
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        const EDGES: [(usize, usize); 12] = [
            // bottom face
            (0, 1),
            (1, 5),
            (5, 4),
            (4, 0),
            // top face
            (2, 3),
            (3, 7),
            (7, 6),
            (6, 2),
            // verticals
            (0, 2),
            (1, 3),
            (4, 6),
            (5, 7),
        ];
        let c = self.corners();
        EDGES.map(|(a, b)| (c[a], c[b]))
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// One renderable piece of the terrain.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub grid_x: usize,
    pub grid_z: usize,
    /// Triangle-strip indices into the shared vertex grid
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
}

impl Chunk {
    pub fn element_count(&self) -> usize {
        self.indices.len()
    }
}

/// All chunks of a terrain, row-major: `index = grid_z * chunks_per_side + grid_x`.
#[derive(Clone, Debug, Default)]
pub struct ChunkGrid {
    chunks: Vec<Chunk>,
    chunks_per_side: usize,
    chunk_size: usize,
    size: usize,
}

impl ChunkGrid {
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks_per_side(&self) -> usize {
        self.chunks_per_side
    }

    /// Samples per chunk side, shared edge included.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Samples per side of the heightmap the grid was built from.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, grid_x: usize, grid_z: usize) -> Option<&Chunk> {
        if grid_x < self.chunks_per_side && grid_z < self.chunks_per_side {
            self.chunks.get(grid_z * self.chunks_per_side + grid_x)
        } else {
            None
        }
    }

    /// Sum of all chunk index counts.
    pub fn total_elements(&self) -> usize {
        self.chunks.iter().map(Chunk::element_count).sum()
    }
}

impl<'a> IntoIterator for &'a ChunkGrid {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// Number of strip indices for a chunk with `chunk_size` samples per side.
pub fn strip_index_count(chunk_size: usize) -> usize {
    if chunk_size < 2 {
        return 0;
    }
    (chunk_size - 1) * (2 * chunk_size + 2) - 2
}

/// Check that `chunk_size` evenly partitions a `size × size` grid.
pub fn validate_layout(size: usize, chunk_size: usize) -> Result<usize> {
    let layout_error = || TerrainError::ChunkLayout { size, chunk_size };
    if chunk_size < 2 || size < chunk_size {
        return Err(layout_error());
    }
    if (size - 1) % (chunk_size - 1) != 0 {
        return Err(layout_error());
    }
    // Vertex indices are u32
    if size.checked_mul(size).is_none_or(|n| n > u32::MAX as usize) {
        return Err(layout_error());
    }
    Ok((size - 1) / (chunk_size - 1))
}

/// Build every chunk of `map` in parallel.
pub fn build_chunks(map: &Heightmap, chunk_size: usize) -> Result<ChunkGrid> {
    let size = map.size();
    let per_side = validate_layout(size, chunk_size)?;

    let start = std::time::Instant::now();
    let chunks: Vec<Chunk> = (0..per_side * per_side)
        .into_par_iter()
        .map(|i| build_chunk(map, i % per_side, i / per_side, chunk_size))
        .collect();

    log::info!(
        "[Chunks] Built {} chunks ({}x{}, {} samples each) in {:.1}ms",
        chunks.len(),
        per_side,
        per_side,
        chunk_size,
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(ChunkGrid {
        chunks,
        chunks_per_side: per_side,
        chunk_size,
        size,
    })
}

fn build_chunk(map: &Heightmap, grid_x: usize, grid_z: usize, chunk_size: usize) -> Chunk {
    let origin_x = grid_x * (chunk_size - 1);
    let origin_z = grid_z * (chunk_size - 1);
    Chunk {
        grid_x,
        grid_z,
        indices: strip_indices(map.size(), origin_x, origin_z, chunk_size),
        bounds: chunk_bounds(map, origin_x, origin_z, chunk_size),
    }
}

/// Triangle-strip indices for the chunk whose first sample is
/// `(origin_x, origin_z)` in a grid `size` samples wide.
pub fn strip_indices(size: usize, origin_x: usize, origin_z: usize, chunk_size: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(strip_index_count(chunk_size));
    let idx = |x: usize, z: usize| (z * size + x) as u32;
    let last_x = origin_x + chunk_size - 1;
    let last_row = origin_z + chunk_size - 2;

    for z in origin_z..=last_row {
        if z != origin_z {
            indices.push(idx(origin_x, z));
        }
        for x in origin_x..=last_x {
            indices.push(idx(x, z));
            indices.push(idx(x, z + 1));
        }
        if z != last_row {
            indices.push(idx(last_x, z + 1));
        }
    }
    indices
}

fn chunk_bounds(map: &Heightmap, origin_x: usize, origin_z: usize, chunk_size: usize) -> BoundingBox {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for z in origin_z..origin_z + chunk_size {
        for x in origin_x..origin_x + chunk_size {
            let h = map.height(x, z);
            lo = lo.min(h);
            hi = hi.max(h);
        }
    }
    let far = (chunk_size - 1) as f32;
    BoundingBox {
        min: Vec3::new(origin_x as f32, lo, origin_z as f32),
        max: Vec3::new(origin_x as f32 + far, hi, origin_z as f32 + far),
    }
}

/// Expand a triangle strip into its non-degenerate triangles, with the
/// winding of odd triangles flipped back to match the first one.
pub fn strip_triangles(indices: &[u32]) -> Vec<[u32; 3]> {
    indices
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1] && w[1] != w[2] && w[0] != w[2])
        .map(|(i, w)| {
            if i % 2 == 0 {
                [w[0], w[1], w[2]]
            } else {
                [w[1], w[0], w[2]]
            }
        })
        .collect()
}
