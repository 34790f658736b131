//! Render Tests - Shader Validation and Chunk Submission
//!
//! Validates the WGSL shaders with naga and drives the chunk renderer over a
//! generated terrain through the recording backend.

use motor_terrain_engine::camera::FlyCamera;
use motor_terrain_engine::render::shader_loader::embedded;
use motor_terrain_engine::render::{
    BOUNDS_LINE_VERTICES, ChunkRenderer, DrawMode, Frustum, RecordedCall, RecordingBackend,
    TerrainUniforms,
};
use motor_terrain_engine::terrain::{Algorithm, GenerationParams, Terrain, TerrainConfig};

fn parse_and_validate(source: &str) -> naga::Module {
    let module = naga::front::wgsl::parse_str(source).expect("WGSL should parse");
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .expect("WGSL should validate");
    module
}

fn uniforms_span(module: &naga::Module) -> u32 {
    let (_, ty) = module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some("Uniforms"))
        .expect("Uniforms struct");
    match ty.inner {
        naga::TypeInner::Struct { span, .. } => span,
        _ => panic!("Uniforms is not a struct"),
    }
}

fn small_terrain() -> Terrain {
    Terrain::generate(&TerrainConfig {
        size: 129,
        chunk_size: 17,
        algorithm: Algorithm::Midpoint,
        seed: 42,
        generation: GenerationParams::default(),
        ..Default::default()
    })
    .unwrap()
}

// ============================================================================
// Shaders
// ============================================================================

#[test]
fn test_terrain_shader_validates() {
    let module = parse_and_validate(embedded::TERRAIN);
    let entries: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
    assert!(entries.contains(&"vs_main"));
    assert!(entries.contains(&"fs_main"));
}

#[test]
fn test_bounds_shader_validates() {
    parse_and_validate(embedded::BOUNDS);
}

#[test]
fn test_uniform_layout_matches_shaders() {
    let expected = std::mem::size_of::<TerrainUniforms>() as u32;
    assert_eq!(uniforms_span(&parse_and_validate(embedded::TERRAIN)), expected);
    assert_eq!(uniforms_span(&parse_and_validate(embedded::BOUNDS)), expected);
}

// ============================================================================
// Chunk submission
// ============================================================================

#[test]
fn test_overview_camera_draws_visible_chunks_once() {
    let terrain = small_terrain();
    let camera = FlyCamera::overlooking(terrain.size(), 64.0);
    let frustum = Frustum::from_matrices(camera.view_matrix(), camera.projection_matrix(16.0 / 9.0));

    let mut renderer = ChunkRenderer::new();
    let mut backend = RecordingBackend::new();
    let stats = renderer.render_visible(&frustum, terrain.chunks(), false, &mut backend);

    assert_eq!(stats.total, 64);
    assert!(stats.visible > 0);
    assert_eq!(stats.visible + stats.culled, stats.total);

    let drawn = backend.drawn_chunks();
    assert_eq!(drawn.len(), stats.visible);
    let mut unique = drawn.clone();
    unique.dedup();
    assert_eq!(unique, drawn);

    for index in drawn {
        let chunk = &terrain.chunks().chunks()[index];
        assert!(frustum.is_visible(&chunk.bounds));
    }
    for call in &backend.calls {
        if let RecordedCall::Chunk { mode, element_count, index } = call {
            assert_eq!(*mode, DrawMode::TriangleStrip);
            assert_eq!(*element_count, terrain.chunks().chunks()[*index].indices.len());
        }
    }
}

#[test]
fn test_looking_away_draws_nothing() {
    let terrain = small_terrain();
    // In front of the map's near edge, facing -Z away from it
    let camera = FlyCamera::new(glam::Vec3::new(64.0, 50.0, -100.0), 0.0, 0.0);
    let frustum = Frustum::from_matrices(camera.view_matrix(), camera.projection_matrix(1.0));

    let mut backend = RecordingBackend::new();
    let stats = ChunkRenderer::new().render_visible(&frustum, terrain.chunks(), true, &mut backend);

    assert_eq!(stats.visible, 0);
    assert_eq!(stats.culled, stats.total);
    assert!(backend.calls.is_empty());
}

#[test]
fn test_debug_boxes_follow_visible_chunks() {
    let terrain = small_terrain();
    let camera = FlyCamera::overlooking(terrain.size(), 64.0);
    let frustum = Frustum::from_matrices(camera.view_matrix(), camera.projection_matrix(1.5));

    let mut renderer = ChunkRenderer::new();
    let mut backend = RecordingBackend::new();
    let stats = renderer.render_visible(&frustum, terrain.chunks(), true, &mut backend);

    let batches = backend.line_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), stats.visible * BOUNDS_LINE_VERTICES);

    // Same frame without debug boxes issues the same chunk draws
    let mut plain = RecordingBackend::new();
    renderer.render_visible(&frustum, terrain.chunks(), false, &mut plain);
    assert_eq!(plain.drawn_chunks(), backend.drawn_chunks());
}
