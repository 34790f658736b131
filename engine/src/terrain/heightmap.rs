//! Heightmap Storage
//!
//! A square grid of height samples held in one contiguous buffer and
//! addressed by `(x, z)` with `index = z * size + x`.

use glam::Vec3;

/// Side length of the default terrain grid (2^10 + 1 samples).
pub const DEFAULT_GRID_SIZE: usize = 1025;

/// 8-bit RGBA vertex color. The RGB channels carry the height shade, alpha
/// carries the cliff blend weight.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Grey value on all three color channels.
    pub const fn grey(value: u8, alpha: u8) -> Self {
        Self::new(value, value, value, alpha)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// One grid sample: elevation plus the attributes derived from it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightSample {
    pub height: f32,
    pub normal: Vec3,
    pub color: Rgba8,
    pub u: f32,
    pub v: f32,
}

impl Default for HeightSample {
    fn default() -> Self {
        Self {
            height: 0.0,
            normal: Vec3::Y,
            color: Rgba8::grey(255, 255),
            u: 0.0,
            v: 0.0,
        }
    }
}

/// Square heightmap owning all of its samples.
#[derive(Clone, Debug)]
pub struct Heightmap {
    size: usize,
    samples: Vec<HeightSample>,
}

impl Heightmap {
    /// Flat heightmap of `size × size` samples at height zero.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            samples: vec![HeightSample::default(); size * size],
        }
    }

    /// Build a heightmap from raw heights in row-major order.
    ///
    /// Returns `None` when `heights.len() != size * size`.
    pub fn from_heights(size: usize, heights: &[f32]) -> Option<Self> {
        if heights.len() != size * size {
            return None;
        }
        let samples = heights
            .iter()
            .map(|&height| HeightSample {
                height,
                ..Default::default()
            })
            .collect();
        Some(Self { size, samples })
    }

    /// Samples per side.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        z * self.size + x
    }

    pub fn get(&self, x: usize, z: usize) -> Option<&HeightSample> {
        if x < self.size && z < self.size {
            Some(&self.samples[self.index(x, z)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: usize, z: usize) -> Option<&mut HeightSample> {
        if x < self.size && z < self.size {
            let idx = self.index(x, z);
            Some(&mut self.samples[idx])
        } else {
            None
        }
    }

    /// Sample at `(x, z)`. Panics when out of range.
    #[inline]
    pub fn sample(&self, x: usize, z: usize) -> &HeightSample {
        debug_assert!(x < self.size && z < self.size);
        &self.samples[z * self.size + x]
    }

    #[inline]
    pub fn sample_mut(&mut self, x: usize, z: usize) -> &mut HeightSample {
        debug_assert!(x < self.size && z < self.size);
        let idx = z * self.size + x;
        &mut self.samples[idx]
    }

    #[inline]
    pub fn height(&self, x: usize, z: usize) -> f32 {
        self.sample(x, z).height
    }

    #[inline]
    pub fn set_height(&mut self, x: usize, z: usize, height: f32) {
        self.sample_mut(x, z).height = height;
    }

    pub fn samples(&self) -> &[HeightSample] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [HeightSample] {
        &mut self.samples
    }

    /// Iterate rows of samples, `z = 0` first.
    pub fn rows(&self) -> impl Iterator<Item = &[HeightSample]> {
        self.samples.chunks_exact(self.size.max(1))
    }

    /// Copy of all heights in row-major order.
    pub fn heights(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.height).collect()
    }

    /// Minimum and maximum height, or `None` for an empty map.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        let mut iter = self.samples.iter().map(|s| s.height);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }

    /// First sample whose height is NaN or infinite.
    pub fn find_non_finite(&self) -> Option<(usize, usize)> {
        self.samples
            .iter()
            .position(|s| !s.height.is_finite())
            .map(|idx| (idx % self.size, idx / self.size))
    }
}
