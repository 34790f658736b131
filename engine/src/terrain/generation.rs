//! Heightmap Generation
//!
//! Three procedural height algorithms plus the shared post-processing chain:
//!
//! - **Hill**: cosine-falloff bumps of random radius dropped on the grid
//! - **FaultLine**: random lines that raise one side and lower the other
//! - **Midpoint**: diamond-square subdivision with a decaying random offset
//!
//! Every variant finishes with normalize → smooth → flatten → scale. All
//! randomness comes from the [`GenerationContext`] passed in.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::config::GenerationParams;
use super::context::GenerationContext;
use super::heightmap::Heightmap;
use crate::error::{Result, TerrainError};

/// Smallest grid any algorithm accepts.
pub const MIN_GRID_SIZE: usize = 3;

/// Heightmap algorithm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Hill,
    FaultLine,
    #[default]
    Midpoint,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Hill, Algorithm::FaultLine, Algorithm::Midpoint];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Hill => "hill",
            Algorithm::FaultLine => "fault_line",
            Algorithm::Midpoint => "midpoint",
        }
    }

    /// Whether a `size × size` grid can be generated by this algorithm.
    pub fn supports_size(self, size: usize) -> bool {
        match self {
            Algorithm::Midpoint => is_midpoint_size(size),
            Algorithm::Hill | Algorithm::FaultLine => size >= MIN_GRID_SIZE,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hill" => Ok(Algorithm::Hill),
            "fault_line" | "faultline" | "fault" => Ok(Algorithm::FaultLine),
            "midpoint" | "diamond_square" => Ok(Algorithm::Midpoint),
            other => Err(format!("unknown heightmap algorithm '{other}'")),
        }
    }
}

/// `size - 1` must be a power of two for diamond-square to land on every sample.
pub fn is_midpoint_size(size: usize) -> bool {
    size >= MIN_GRID_SIZE && (size - 1).is_power_of_two()
}

/// Generate a finished heightmap: raw algorithm output followed by the
/// post-processing chain configured in `params`.
pub fn generate(
    algorithm: Algorithm,
    ctx: &mut GenerationContext,
    size: usize,
    params: &GenerationParams,
) -> Result<Heightmap> {
    params.validate_for(algorithm)?;
    if !algorithm.supports_size(size) {
        return Err(TerrainError::GridSize { size, algorithm });
    }

    let start = Instant::now();
    let mut map = match algorithm {
        Algorithm::Hill => hill(ctx, size, params),
        Algorithm::FaultLine => fault_line(ctx, size, params),
        Algorithm::Midpoint => midpoint_displacement(ctx, size, params)?.0,
    };
    log::debug!(
        "[Terrain] {} pass done in {:.1}ms",
        algorithm,
        start.elapsed().as_secs_f64() * 1000.0
    );

    normalize(&mut map, params.normalize_max);
    smooth(&mut map, params.smooth_passes);
    if params.flatten {
        flatten(&mut map, params.normalize_max);
    }
    scale(&mut map, params.height_scale);

    if let Some((x, z)) = map.find_non_finite() {
        return Err(TerrainError::NonFinite { x, z });
    }

    log::info!(
        "[Terrain] Generated {}x{} {} heightmap (seed {}) in {:.1}ms",
        size,
        size,
        algorithm,
        ctx.seed(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(map)
}

/// Convenience wrapper that owns a fresh context for `seed`.
pub fn generate_seeded(
    algorithm: Algorithm,
    seed: u64,
    size: usize,
    params: &GenerationParams,
) -> Result<Heightmap> {
    let mut ctx = GenerationContext::new(seed);
    generate(algorithm, &mut ctx, size, params)
}

// ============================================================================
// Hill
// ============================================================================

/// Raise `hill_iterations` cosine bumps. Raw heights, not normalized.
pub fn hill(ctx: &mut GenerationContext, size: usize, params: &GenerationParams) -> Heightmap {
    let mut map = Heightmap::new(size);
    let last = size as isize - 1;

    for _ in 0..params.hill_iterations {
        let radius = ctx.uniform(params.hill_radius_min, params.hill_radius_max);
        let cx = ctx.index(size) as isize;
        let cz = ctx.index(size) as isize;
        // No hill reaches further than the grid side
        let reach = radius.ceil().min(size as f32) as isize;

        let x0 = (cx - reach).max(0);
        let x1 = (cx + reach).min(last);
        let z0 = (cz - reach).max(0);
        let z1 = (cz + reach).min(last);

        for z in z0..=z1 {
            for x in x0..=x1 {
                let dx = (x - cx) as f32;
                let dz = (z - cz) as f32;
                let dist = (dx * dx + dz * dz).sqrt();
                if dist >= radius {
                    continue;
                }
                let falloff = ((dist / radius * PI).cos() + 1.0) * 0.5;
                map.sample_mut(x as usize, z as usize).height += falloff * radius;
            }
        }
    }

    map
}

// ============================================================================
// Fault line
// ============================================================================

/// Cut the grid with `fault_iterations` random lines. Raw heights.
///
/// Every line moves each sample by `fault_displacement`. Setting
/// `fault_displacement_min` lower makes the displacement decay linearly down
/// to it on the last line.
pub fn fault_line(ctx: &mut GenerationContext, size: usize, params: &GenerationParams) -> Heightmap {
    let mut map = Heightmap::new(size);
    let iterations = params.fault_iterations;

    for i in 0..iterations {
        let t = if iterations > 1 {
            i as f32 / (iterations - 1) as f32
        } else {
            0.0
        };
        let displacement = params.fault_displacement
            + (params.fault_displacement_min - params.fault_displacement) * t;

        let x1 = ctx.index(size) as f32;
        let z1 = ctx.index(size) as f32;
        let (x2, z2) = loop {
            let x2 = ctx.index(size) as f32;
            let z2 = ctx.index(size) as f32;
            if x2 != x1 || z2 != z1 {
                break (x2, z2);
            }
        };
        let line_x = x2 - x1;
        let line_z = z2 - z1;

        for z in 0..size {
            for x in 0..size {
                let side = line_x * (z as f32 - z1) - line_z * (x as f32 - x1);
                let sample = map.sample_mut(x, z);
                if side > 0.0 {
                    sample.height += displacement;
                } else {
                    sample.height -= displacement;
                }
            }
        }
    }

    map
}

// ============================================================================
// Midpoint displacement (diamond-square)
// ============================================================================

/// Offsets applied at one subdivision level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MidpointLevel {
    /// Side of the squares subdivided at this level
    pub width: usize,
    /// Offset range `[-range, range]` used at this level
    pub range: f32,
    /// Largest absolute offset actually drawn
    pub max_abs_offset: f32,
    /// Mean absolute offset over every draw at this level
    pub mean_abs_offset: f32,
}

/// Diamond-square over a `2^n + 1` grid. Returns raw heights and the
/// per-level offset ranges.
///
/// The four corners are seeded first, in the order (0,0), (last,0),
/// (0,last), (last,last), and are never touched again.
pub fn midpoint_displacement(
    ctx: &mut GenerationContext,
    size: usize,
    params: &GenerationParams,
) -> Result<(Heightmap, Vec<MidpointLevel>)> {
    if !is_midpoint_size(size) {
        return Err(TerrainError::GridSize {
            size,
            algorithm: Algorithm::Midpoint,
        });
    }

    let mut map = Heightmap::new(size);
    let last = size - 1;
    let mut range = params.midpoint_range;

    for (x, z) in [(0, 0), (last, 0), (0, last), (last, last)] {
        let seed_height = ctx.uniform(-range, range);
        map.set_height(x, z, seed_height);
    }

    let mut levels = Vec::new();
    let mut width = last;
    while width > 1 {
        let half = width / 2;
        let mut max_abs_offset = 0.0f32;
        let mut abs_offset_sum = 0.0f32;
        let mut draws = 0u32;

        // Square step: centre of every sub-square
        for z in (0..last).step_by(width) {
            for x in (0..last).step_by(width) {
                let avg = (map.height(x, z)
                    + map.height(x + width, z)
                    + map.height(x, z + width)
                    + map.height(x + width, z + width))
                    * 0.25;
                let offset = ctx.uniform(-range, range);
                max_abs_offset = max_abs_offset.max(offset.abs());
                abs_offset_sum += offset.abs();
                draws += 1;
                map.set_height(x + half, z + half, avg + offset);
            }
        }

        // Diamond step: edge midpoints, neighbours wrap across the grid
        for z in (0..=last).step_by(half) {
            let x_start = if (z / half) % 2 == 0 { half } else { 0 };
            for x in (x_start..=last).step_by(width) {
                let avg = (map.height(wrap(x as isize - half as isize, last), z)
                    + map.height(wrap(x as isize + half as isize, last), z)
                    + map.height(x, wrap(z as isize - half as isize, last))
                    + map.height(x, wrap(z as isize + half as isize, last)))
                    * 0.25;
                let offset = ctx.uniform(-range, range);
                max_abs_offset = max_abs_offset.max(offset.abs());
                abs_offset_sum += offset.abs();
                draws += 1;
                map.set_height(x, z, avg + offset);
            }
        }

        log::trace!("[Terrain] midpoint level width={} range={:.4}", width, range);
        levels.push(MidpointLevel {
            width,
            range,
            max_abs_offset,
            mean_abs_offset: abs_offset_sum / draws.max(1) as f32,
        });

        range *= params.roughness;
        width = half;
    }

    Ok((map, levels))
}

/// Wrap an out-of-range coordinate around a grid whose period is `last`.
fn wrap(i: isize, last: usize) -> usize {
    let period = last as isize;
    if i < 0 {
        (i + period) as usize
    } else if i > period {
        (i - period) as usize
    } else {
        i as usize
    }
}

// ============================================================================
// Post-processing
// ============================================================================

/// Linearly rescale heights to `[0, max]`. A flat map becomes all zeros.
pub fn normalize(map: &mut Heightmap, max: f32) {
    let Some((lo, hi)) = map.height_range() else {
        return;
    };
    let span = hi - lo;
    if !(span > 0.0) || !span.is_finite() {
        for sample in map.samples_mut() {
            sample.height = 0.0;
        }
        return;
    }
    for sample in map.samples_mut() {
        sample.height = (sample.height - lo) / span * max;
    }
}

/// Average every sample with its 4-neighbourhood, `passes` times.
/// Neighbours past the edge clamp to the edge sample.
pub fn smooth(map: &mut Heightmap, passes: u32) {
    let size = map.size();
    if size == 0 {
        return;
    }
    for _ in 0..passes {
        let snapshot = map.heights();
        let at = |x: usize, z: usize| snapshot[z * size + x];
        for z in 0..size {
            for x in 0..size {
                let sum = at(x, z)
                    + at(x.saturating_sub(1), z)
                    + at((x + 1).min(size - 1), z)
                    + at(x, z.saturating_sub(1))
                    + at(x, (z + 1).min(size - 1));
                map.set_height(x, z, sum / 5.0);
            }
        }
    }
}

/// Square normalized heights: `h = (h / max)^2 * max`.
pub fn flatten(map: &mut Heightmap, max: f32) {
    if max <= 0.0 {
        return;
    }
    for sample in map.samples_mut() {
        let t = sample.height / max;
        sample.height = t * t * max;
    }
}

/// Multiply every height by `factor`.
pub fn scale(map: &mut Heightmap, factor: f32) {
    for sample in map.samples_mut() {
        sample.height *= factor;
    }
}
