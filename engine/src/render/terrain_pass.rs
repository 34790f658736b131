//! Terrain Render Pass
//!
//! wgpu side of the terrain: one shared vertex buffer, one index buffer per
//! chunk drawn as an indexed triangle strip, the splat textures and a line
//! pipeline for bounding-box wireframes. Visibility is decided by the
//! [`ChunkRenderer`]; this pass only turns its draw calls into GPU commands.

use glam::{Mat4, Vec3};
use static_assertions::const_assert_eq;

use super::chunk_renderer::{ChunkDraw, ChunkRenderer, FrameStats, LineVertex, RenderBackend, BOUNDS_LINE_VERTICES};
use super::frustum::Frustum;
use super::gpu_context::{DEPTH_FORMAT, GpuContext};
use super::shader_loader::{TerrainShaders, create_shader_module};
use crate::error::{Result, TerrainError};
use crate::terrain::{BlendUnit, ChunkGrid, Terrain, TerrainTextureSet, TerrainVertex};

/// Uniform data for the terrain and bounds shaders
///
/// WGSL Layout (112 bytes total):
/// - view_proj: mat4x4<f32> (64 bytes)
/// - camera_pos: vec3<f32>, fog_density: f32 (16 bytes)
/// - sun_dir: vec3<f32>, ambient: f32 (16 bytes)
/// - fog_color: vec3<f32>, _pad: f32 (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub fog_density: f32,
    pub sun_dir: [f32; 3],
    pub ambient: f32,
    pub fog_color: [f32; 3],
    pub _pad: f32,
}

const_assert_eq!(std::mem::size_of::<TerrainUniforms>(), 112);

impl Default for TerrainUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0; 3],
            fog_density: 0.0008,
            sun_dir: Vec3::new(0.4, 0.8, 0.3).normalize().to_array(),
            ambient: 0.3,
            fog_color: [0.62, 0.72, 0.82],
            _pad: 0.0,
        }
    }
}

impl TerrainUniforms {
    pub fn set_camera(&mut self, view_proj: Mat4, camera_pos: Vec3) {
        self.view_proj = view_proj.to_cols_array_2d();
        self.camera_pos = camera_pos.to_array();
    }
}

/// Vertex layout of [`TerrainVertex`]
pub const TERRAIN_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Unorm8x4,
        offset: 32,
        shader_location: 3,
    },
];

/// Vertex layout of [`LineVertex`]
pub const LINE_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: 12,
        shader_location: 1,
    },
];

/// Index buffer of one chunk
struct ChunkBuffer {
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// GPU copy of one ground layer
struct GroundLayer {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct TerrainPass {
    pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    line_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    chunk_buffers: Vec<ChunkBuffer>,
    line_buffer: wgpu::Buffer,
    layers: Vec<GroundLayer>,
    sampler: wgpu::Sampler,
    renderer: ChunkRenderer,
    uniforms: TerrainUniforms,
}

impl TerrainPass {
    pub fn new(
        ctx: &GpuContext,
        terrain: &Terrain,
        textures: &TerrainTextureSet,
        shaders: &TerrainShaders,
    ) -> Result<Self> {
        let device = &ctx.device;

        let vertex_buffer = ctx.create_vertex_buffer("Terrain Vertex Buffer", terrain.vertices());
        let chunk_buffers: Vec<ChunkBuffer> = terrain
            .chunks()
            .iter()
            .map(|chunk| ChunkBuffer {
                index_buffer: ctx.create_index_buffer(
                    &format!("Terrain Chunk ({}, {}) Indices", chunk.grid_x, chunk.grid_z),
                    &chunk.indices,
                ),
                index_count: chunk.indices.len() as u32,
            })
            .collect();

        // Room for every chunk's box at once
        let max_lines = terrain.chunks().len().max(1) * BOUNDS_LINE_VERTICES;
        let line_buffer = ctx.create_dynamic_vertex_buffer(
            "Bounds Line Buffer",
            (max_lines * std::mem::size_of::<LineVertex>()) as u64,
        );

        let uniforms = TerrainUniforms::default();
        let uniform_buffer = ctx.create_uniform_buffer("Terrain Uniform Buffer", &uniforms);

        let layers = upload_layers(ctx, textures);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Terrain Ground Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Bind Group Layout"),
            entries: &[
                uniform_entry,
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                texture_entry(2),
                texture_entry(3),
                texture_entry(4),
            ],
        });
        let line_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bounds Bind Group Layout"),
            entries: &[uniform_entry],
        });

        let bind_group = create_ground_bind_group(
            device,
            &bind_group_layout,
            &uniform_buffer,
            &sampler,
            &layers,
            textures,
        )?;
        let line_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bounds Bind Group"),
            layout: &line_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let terrain_shader = create_shader_module(device, "Terrain Shader", &shaders.terrain);
        let bounds_shader = create_shader_module(device, "Bounds Shader", &shaders.bounds);

        let pipeline = create_pipeline(
            device,
            "Terrain",
            &terrain_shader,
            &bind_group_layout,
            ctx.format(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<TerrainVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &TERRAIN_VERTEX_ATTRIBUTES,
            },
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            true,
        );
        let line_pipeline = create_pipeline(
            device,
            "Bounds",
            &bounds_shader,
            &line_bind_group_layout,
            ctx.format(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LINE_VERTEX_ATTRIBUTES,
            },
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            false,
        );

        log::info!(
            "[TerrainPass] Uploaded {} vertices, {} chunk index buffers, {} ground layers",
            terrain.vertices().len(),
            chunk_buffers.len(),
            layers.len()
        );

        Ok(Self {
            pipeline,
            line_pipeline,
            uniform_buffer,
            bind_group_layout,
            bind_group,
            line_bind_group,
            vertex_buffer,
            chunk_buffers,
            line_buffer,
            layers,
            sampler,
            renderer: ChunkRenderer::new(),
            uniforms,
        })
    }

    pub fn uniforms_mut(&mut self) -> &mut TerrainUniforms {
        &mut self.uniforms
    }

    /// Upload uniforms to GPU
    pub fn upload_uniforms(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    /// Rebind the ground layers after a blend unit changed.
    pub fn rebind_textures(&mut self, device: &wgpu::Device, textures: &TerrainTextureSet) -> Result<()> {
        self.bind_group = create_ground_bind_group(
            device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            &self.sampler,
            &self.layers,
            textures,
        )?;
        Ok(())
    }

    /// Record the visible chunks (and optionally their boxes) into `pass`.
    pub fn record(
        &mut self,
        pass: &mut wgpu::RenderPass<'_>,
        queue: &wgpu::Queue,
        frustum: &Frustum,
        chunks: &ChunkGrid,
        bounding_box_debug: bool,
    ) -> FrameStats {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        let mut backend = PassBackend {
            pass,
            queue,
            chunk_buffers: &self.chunk_buffers,
            line_pipeline: &self.line_pipeline,
            line_bind_group: &self.line_bind_group,
            line_buffer: &self.line_buffer,
        };
        self.renderer
            .render_visible(frustum, chunks, bounding_box_debug, &mut backend)
    }
}

/// [`RenderBackend`] that encodes into a live wgpu render pass.
struct PassBackend<'a, 'p> {
    pass: &'a mut wgpu::RenderPass<'p>,
    queue: &'a wgpu::Queue,
    chunk_buffers: &'a [ChunkBuffer],
    line_pipeline: &'a wgpu::RenderPipeline,
    line_bind_group: &'a wgpu::BindGroup,
    line_buffer: &'a wgpu::Buffer,
}

impl RenderBackend for PassBackend<'_, '_> {
    fn draw_chunk(&mut self, chunk: ChunkDraw<'_>) {
        let Some(buffer) = self.chunk_buffers.get(chunk.index) else {
            log::warn!("[TerrainPass] No index buffer for chunk {}", chunk.index);
            return;
        };
        if buffer.index_count == 0 {
            return;
        }
        self.pass
            .set_index_buffer(buffer.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..buffer.index_count, 0, 0..1);
    }

    fn draw_lines(&mut self, lines: &[LineVertex]) {
        let capacity = (self.line_buffer.size() as usize) / std::mem::size_of::<LineVertex>();
        let lines = &lines[..lines.len().min(capacity)];
        if lines.is_empty() {
            return;
        }
        self.queue
            .write_buffer(self.line_buffer, 0, bytemuck::cast_slice(lines));
        let bytes = std::mem::size_of_val(lines) as u64;
        self.pass.set_pipeline(self.line_pipeline);
        self.pass.set_bind_group(0, self.line_bind_group, &[]);
        self.pass.set_vertex_buffer(0, self.line_buffer.slice(..bytes));
        self.pass.draw(0..lines.len() as u32, 0..1);
    }
}

fn upload_layers(ctx: &GpuContext, textures: &TerrainTextureSet) -> Vec<GroundLayer> {
    textures
        .layers()
        .iter()
        .enumerate()
        .map(|(i, img)| {
            let (width, height) = img.dimensions();
            let size = wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            };
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("Terrain Ground Layer {i}")),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                img.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            GroundLayer { texture, view }
        })
        .collect()
}

fn create_ground_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    sampler: &wgpu::Sampler,
    layers: &[GroundLayer],
    textures: &TerrainTextureSet,
) -> Result<wgpu::BindGroup> {
    let view_for = |unit: BlendUnit| {
        layers
            .get(textures.layer_index(unit))
            .map(|layer| &layer.view)
            .ok_or_else(|| TerrainError::gpu(format!("no ground layer bound to unit {unit:?}")))
    };
    let (a, b, c) = (view_for(BlendUnit::A)?, view_for(BlendUnit::B)?, view_for(BlendUnit::C)?);

    Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Terrain Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(a),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(b),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::TextureView(c),
            },
        ],
    }))
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    vertex_layout: wgpu::VertexBufferLayout<'_>,
    primitive: wgpu::PrimitiveState,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Pipeline Layout")),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} Pipeline")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive,
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_attributes_match_struct() {
        let last = TERRAIN_VERTEX_ATTRIBUTES[3];
        assert_eq!(last.offset + last.format.size(), std::mem::size_of::<TerrainVertex>() as u64);
        let line_last = LINE_VERTEX_ATTRIBUTES[1];
        assert_eq!(
            line_last.offset + line_last.format.size(),
            std::mem::size_of::<LineVertex>() as u64
        );
    }

    #[test]
    fn test_uniforms_default_sun_is_unit() {
        let uniforms = TerrainUniforms::default();
        assert!((Vec3::from_array(uniforms.sun_dir).length() - 1.0).abs() < 1e-5);
    }
}
