//! Chunk Renderer
//!
//! Per-frame visibility loop over the terrain chunks. Draw calls go through
//! the [`RenderBackend`] trait so the same loop drives the wgpu pass and the
//! headless [`RecordingBackend`].

use glam::Vec3;

use super::frustum::Frustum;
use crate::terrain::ChunkGrid;

/// Line color for bounding-box wireframes.
pub const BOUNDS_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Line vertices emitted per bounding box (12 edges × 2 ends).
pub const BOUNDS_LINE_VERTICES: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    TriangleStrip,
}

/// One chunk draw request.
#[derive(Clone, Copy, Debug)]
pub struct ChunkDraw<'a> {
    /// Chunk position in the grid's row-major order
    pub index: usize,
    pub mode: DrawMode,
    pub element_count: usize,
    pub indices: &'a [u32],
}

/// Debug line vertex, 28 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }
}

/// Receiver of the renderer's draw calls.
pub trait RenderBackend {
    fn draw_chunk(&mut self, chunk: ChunkDraw<'_>);
    fn draw_lines(&mut self, lines: &[LineVertex]);
}

/// Counts for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub total: usize,
    pub visible: usize,
    pub culled: usize,
    /// Strip indices submitted
    pub elements: usize,
}

/// Frustum-culled chunk submission. Reuses its line buffer across frames.
#[derive(Debug, Default)]
pub struct ChunkRenderer {
    lines: Vec<LineVertex>,
    warned_non_finite: bool,
    last_stats: FrameStats,
}

impl ChunkRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw every chunk whose box survives the frustum test. With
    /// `bounding_box_debug`, the boxes of the drawn chunks follow as one
    /// batch of red lines.
    pub fn render_visible<B: RenderBackend + ?Sized>(
        &mut self,
        frustum: &Frustum,
        chunks: &ChunkGrid,
        bounding_box_debug: bool,
        backend: &mut B,
    ) -> FrameStats {
        let mut stats = FrameStats {
            total: chunks.len(),
            ..Default::default()
        };
        self.lines.clear();

        for (index, chunk) in chunks.iter().enumerate() {
            if !chunk.bounds.is_finite() && !self.warned_non_finite {
                log::warn!(
                    "[Frustum] Chunk ({}, {}) has a non-finite bounding box, drawing it unculled",
                    chunk.grid_x,
                    chunk.grid_z
                );
                self.warned_non_finite = true;
            }
            if !frustum.is_visible(&chunk.bounds) {
                stats.culled += 1;
                continue;
            }

            backend.draw_chunk(ChunkDraw {
                index,
                mode: DrawMode::TriangleStrip,
                element_count: chunk.indices.len(),
                indices: &chunk.indices,
            });
            stats.visible += 1;
            stats.elements += chunk.indices.len();

            if bounding_box_debug {
                for (a, b) in chunk.bounds.edges() {
                    self.lines.push(LineVertex::new(a, BOUNDS_COLOR));
                    self.lines.push(LineVertex::new(b, BOUNDS_COLOR));
                }
            }
        }

        if bounding_box_debug && !self.lines.is_empty() {
            backend.draw_lines(&self.lines);
        }

        log::trace!(
            "[Frustum] {} / {} chunks visible, {} culled, {} indices",
            stats.visible,
            stats.total,
            stats.culled,
            stats.elements
        );
        self.last_stats = stats;
        stats
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }
}

/// A call seen by [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    Chunk {
        index: usize,
        mode: DrawMode,
        element_count: usize,
    },
    Lines(Vec<LineVertex>),
}

/// Backend that records calls instead of drawing. Used headless and in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<RecordedCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Indices of the chunks drawn, in call order.
    pub fn drawn_chunks(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Chunk { index, .. } => Some(*index),
                RecordedCall::Lines(_) => None,
            })
            .collect()
    }

    pub fn line_batches(&self) -> Vec<&[LineVertex]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Lines(lines) => Some(lines.as_slice()),
                RecordedCall::Chunk { .. } => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn draw_chunk(&mut self, chunk: ChunkDraw<'_>) {
        self.calls.push(RecordedCall::Chunk {
            index: chunk.index,
            mode: chunk.mode,
            element_count: chunk.element_count,
        });
    }

    fn draw_lines(&mut self, lines: &[LineVertex]) {
        self.calls.push(RecordedCall::Lines(lines.to_vec()));
    }
}
