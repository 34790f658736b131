//! Vertex Packing
//!
//! Turns the finished heightmap into GPU vertex data. The interleaved
//! [`TerrainVertex`] stream feeds the wgpu pipeline; [`PlanarLayout`]
//! describes the single-buffer, attribute-per-block layout used by
//! fixed-function style backends.

use glam::Vec3;
use static_assertions::const_assert_eq;

use super::heightmap::Heightmap;

/// One terrain vertex, 36 bytes.
///
/// WGSL layout:
/// - location(0) position: vec3<f32>
/// - location(1) normal: vec3<f32>
/// - location(2) uv: vec2<f32>
/// - location(3) color: vec4<f32> (from unorm8x4)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

const_assert_eq!(std::mem::size_of::<TerrainVertex>(), 36);

impl TerrainVertex {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Interleaved vertices in row-major order, position `(x, height, z)`.
pub fn pack_vertices(map: &Heightmap) -> Vec<TerrainVertex> {
    let size = map.size();
    map.samples()
        .iter()
        .enumerate()
        .map(|(i, s)| TerrainVertex {
            position: [(i % size) as f32, s.height, (i / size) as f32],
            normal: s.normal.to_array(),
            uv: [s.u, s.v],
            color: s.color.to_array(),
        })
        .collect()
}

/// Byte offsets of each attribute block in a planar vertex buffer:
/// all positions, then all normals, then texcoords, then colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanarLayout {
    pub vertex_count: usize,
    pub position_offset: usize,
    pub normal_offset: usize,
    pub texcoord_offset: usize,
    pub color_offset: usize,
    pub total_bytes: usize,
}

impl PlanarLayout {
    pub fn for_size(size: usize) -> Self {
        let n = size * size;
        let position_offset = 0;
        let normal_offset = position_offset + n * 3 * 4;
        let texcoord_offset = normal_offset + n * 3 * 4;
        let color_offset = texcoord_offset + n * 2 * 4;
        Self {
            vertex_count: n,
            position_offset,
            normal_offset,
            texcoord_offset,
            color_offset,
            total_bytes: color_offset + n * 4,
        }
    }

    /// Fill a byte buffer with the planar layout of `vertices`.
    pub fn pack(&self, vertices: &[TerrainVertex]) -> Vec<u8> {
        debug_assert_eq!(vertices.len(), self.vertex_count);
        let mut bytes = Vec::with_capacity(self.total_bytes);
        for v in vertices {
            bytes.extend_from_slice(bytemuck::cast_slice(&v.position));
        }
        for v in vertices {
            bytes.extend_from_slice(bytemuck::cast_slice(&v.normal));
        }
        for v in vertices {
            bytes.extend_from_slice(bytemuck::cast_slice(&v.uv));
        }
        for v in vertices {
            bytes.extend_from_slice(&v.color);
        }
        bytes
    }
}

/// Greyscale preview of the heightmap: lowest sample → 0, highest → 255.
pub fn heightmap_image(map: &Heightmap) -> image::GrayImage {
    let size = map.size() as u32;
    let (lo, hi) = map.height_range().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    image::GrayImage::from_fn(size, size, |x, z| {
        let h = map.height(x as usize, z as usize);
        let t = if span > 0.0 { (h - lo) / span } else { 0.0 };
        image::Luma([(t.clamp(0.0, 1.0) * 255.0).round() as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::heightmap::Rgba8;

    #[test]
    fn test_pack_vertices_positions() {
        let mut map = Heightmap::from_heights(3, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        map.sample_mut(2, 1).color = Rgba8::grey(10, 20);
        let verts = pack_vertices(&map);
        assert_eq!(verts.len(), 9);
        assert_eq!(verts[5].position, [2.0, 5.0, 1.0]);
        assert_eq!(verts[5].color, [10, 10, 10, 20]);
        assert_eq!(verts[0].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_planar_offsets() {
        let layout = PlanarLayout::for_size(33);
        let n = 33 * 33;
        assert_eq!(layout.normal_offset, n * 12);
        assert_eq!(layout.texcoord_offset, n * 24);
        assert_eq!(layout.color_offset, n * 32);
        assert_eq!(layout.total_bytes, n * 36);

        let map = Heightmap::new(33);
        let bytes = layout.pack(&pack_vertices(&map));
        assert_eq!(bytes.len(), layout.total_bytes);
    }

    #[test]
    fn test_heightmap_image_range() {
        let map = Heightmap::from_heights(2, &[-1.0, 0.0, 1.0, 3.0]).unwrap();
        let img = heightmap_image(&map);
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 1).0[0], 255);
        assert_eq!(img.get_pixel(0, 1).0[0], 128);
    }
}
