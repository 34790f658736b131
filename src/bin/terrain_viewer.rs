//! Terrain Viewer
//!
//! Run with: `cargo run --bin terrain_viewer [settings.json]`
//!
//! Generates a heightmap terrain from the settings file (or defaults) and
//! flies a free camera over it. Only chunks inside the view frustum are drawn.
//!
//! Controls:
//! - WASD: Move camera
//! - Mouse right-drag: Look around
//! - Space: Move up
//! - Shift: Move down (or sprint when moving)
//! - Scroll: Move along view direction
//! - B: Toggle chunk bounding boxes
//! - 1 / 2 / 3: Cycle ground layer of blend unit A / B / C
//! - R: Reset camera
//! - ESC: Exit

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use motor_terrain_engine::camera::FlyCamera;
use motor_terrain_engine::render::{
    FrameStats, Frustum, GpuContext, GpuContextConfig, TerrainPass, TerrainShaders, ViewerSettings,
};
use motor_terrain_engine::terrain::{BlendUnit, Terrain, TerrainTextureSet};
use motor_terrain_engine::{Result, TerrainError};

/// Movement key state
#[derive(Default)]
struct MovementKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    sprint: bool,
}

impl MovementKeys {
    fn axis(positive: bool, negative: bool) -> f32 {
        (positive as i32 - negative as i32) as f32
    }
}

struct AppState {
    window: Arc<Window>,
    gpu: GpuContext,
    terrain: Terrain,
    textures: TerrainTextureSet,
    pass: TerrainPass,
    camera: FlyCamera,
    frustum: Frustum,
    movement_keys: MovementKeys,
    bounding_boxes: bool,
    right_mouse_down: bool,
    last_mouse_pos: Option<(f64, f64)>,
    last_frame_time: Instant,
    fps_update_time: Instant,
    frame_count: u32,
    last_stats: FrameStats,
}

impl AppState {
    fn new(window: Arc<Window>, settings: &ViewerSettings, terrain: Terrain) -> Result<Self> {
        let gpu = GpuContext::new(
            Arc::clone(&window),
            GpuContextConfig {
                vsync: settings.viewer.vsync,
                ..Default::default()
            },
        )?;

        let textures = if terrain.config().textures.is_empty() {
            log::info!("[Viewer] No ground textures configured, using procedural layers");
            TerrainTextureSet::procedural()
        } else {
            TerrainTextureSet::load(&terrain.config().textures)?
        };

        let shaders = match &settings.viewer.shader_dir {
            Some(dir) => TerrainShaders::from_dir(dir),
            None => TerrainShaders::default(),
        };
        let pass = TerrainPass::new(&gpu, &terrain, &textures, &shaders)?;

        let peak = terrain.heightmap().height_range().map_or(0.0, |(_, hi)| hi);
        let camera = FlyCamera::overlooking(terrain.size(), peak);

        let now = Instant::now();
        Ok(Self {
            window,
            gpu,
            terrain,
            textures,
            pass,
            camera,
            frustum: Frustum::default(),
            movement_keys: MovementKeys::default(),
            bounding_boxes: settings.viewer.bounding_boxes,
            right_mouse_down: false,
            last_mouse_pos: None,
            last_frame_time: now,
            fps_update_time: now,
            frame_count: 0,
            last_stats: FrameStats::default(),
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size.width, new_size.height);
    }

    fn update(&mut self) {
        let now = Instant::now();
        let delta_time = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.frame_count += 1;
        let fps_elapsed = (now - self.fps_update_time).as_secs_f32();
        if fps_elapsed >= 1.0 {
            let fps = self.frame_count as f32 / fps_elapsed;
            self.frame_count = 0;
            self.fps_update_time = now;
            self.window.set_title(&format!(
                "Terrain | FPS: {:.0} | Chunks: {}/{} | Boxes: {}",
                fps,
                self.last_stats.visible,
                self.last_stats.total,
                if self.bounding_boxes { "on" } else { "off" }
            ));
        }

        let keys = &self.movement_keys;
        let forward = MovementKeys::axis(keys.forward, keys.backward);
        let right = MovementKeys::axis(keys.right, keys.left);
        let up = MovementKeys::axis(keys.up, keys.down);
        let sprint = keys.sprint;
        self.camera.update_movement(forward, right, up, delta_time, sprint);
    }

    fn render(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.gpu.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Frustum first, every visibility test this frame reads it
        let view_matrix = self.camera.view_matrix();
        let proj_matrix = self.camera.projection_matrix(self.gpu.aspect());
        self.frustum.update(view_matrix, proj_matrix);

        self.pass
            .uniforms_mut()
            .set_camera(proj_matrix * view_matrix, self.camera.position);
        self.pass.upload_uniforms(&self.gpu.queue);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Terrain Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Terrain Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.62,
                            g: 0.72,
                            b: 0.82,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.last_stats = self.pass.record(
                &mut render_pass,
                &self.gpu.queue,
                &self.frustum,
                self.terrain.chunks(),
                self.bounding_boxes,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn cycle_unit(&mut self, unit: BlendUnit) {
        let layer = self.textures.cycle_unit(unit);
        match self.pass.rebind_textures(&self.gpu.device, &self.textures) {
            Ok(()) => log::info!("[Viewer] Blend unit {:?} -> layer {}", unit, layer),
            Err(e) => log::error!("[Viewer] Failed to rebind ground layers: {e}"),
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::KeyW => self.movement_keys.forward = pressed,
            KeyCode::KeyS => self.movement_keys.backward = pressed,
            KeyCode::KeyA => self.movement_keys.left = pressed,
            KeyCode::KeyD => self.movement_keys.right = pressed,
            KeyCode::Space => self.movement_keys.up = pressed,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                self.movement_keys.down = pressed;
                self.movement_keys.sprint = pressed;
            }
            KeyCode::KeyB if pressed => {
                self.bounding_boxes = !self.bounding_boxes;
                log::info!(
                    "[Viewer] Bounding boxes {}",
                    if self.bounding_boxes { "on" } else { "off" }
                );
            }
            KeyCode::Digit1 if pressed => self.cycle_unit(BlendUnit::A),
            KeyCode::Digit2 if pressed => self.cycle_unit(BlendUnit::B),
            KeyCode::Digit3 if pressed => self.cycle_unit(BlendUnit::C),
            KeyCode::KeyR if pressed => {
                let peak = self
                    .terrain
                    .heightmap()
                    .height_range()
                    .map_or(0.0, |(_, hi)| hi);
                self.camera = FlyCamera::overlooking(self.terrain.size(), peak);
                log::info!("[Viewer] Camera reset");
            }
            _ => {}
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button == MouseButton::Right {
            self.right_mouse_down = pressed;

            if pressed {
                let _ = self.window.set_cursor_grab(CursorGrabMode::Confined);
                self.window.set_cursor_visible(false);
            } else {
                let _ = self.window.set_cursor_grab(CursorGrabMode::None);
                self.window.set_cursor_visible(true);
                self.last_mouse_pos = None;
            }
        }
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        if self.right_mouse_down {
            if let Some((last_x, last_y)) = self.last_mouse_pos {
                self.camera
                    .handle_mouse_look((x - last_x) as f32, (y - last_y) as f32);
            }
        }
        self.last_mouse_pos = Some((x, y));
    }

    fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        let scroll_amount = match delta {
            MouseScrollDelta::LineDelta(_, y) => y * 8.0,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.4,
        };
        let forward = self.camera.forward();
        self.camera.position += forward * scroll_amount;
    }
}

struct App {
    settings: ViewerSettings,
    /// Taken when the window is created
    terrain: Option<Terrain>,
    state: Option<AppState>,
    error: Option<TerrainError>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(terrain) = self.terrain.take() else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title("Terrain - WASD to move, Right-drag to look")
            .with_inner_size(PhysicalSize::new(
                self.settings.viewer.width,
                self.settings.viewer.height,
            ));
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(TerrainError::gpu(format!("failed to create window: {e}")));
                event_loop.exit();
                return;
            }
        };

        match AppState::new(window, &self.settings, terrain) {
            Ok(state) => {
                log::info!("[Viewer] Ready! WASD move, right-drag look, B boxes, 1/2/3 layers, R reset, ESC exit");
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                state.resize(new_size);
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;

                if key == KeyCode::Escape && pressed {
                    event_loop.exit();
                    return;
                }

                state.handle_key(key, pressed);
            }
            WindowEvent::MouseInput { button, state: btn_state, .. } => {
                state.handle_mouse_button(button, btn_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.handle_mouse_move(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.handle_scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                state.update();

                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.gpu.reconfigure()
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        self.error = Some(TerrainError::gpu("surface out of memory"));
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("[Viewer] Render error: {e:?}"),
                }

                state.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn run() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => ViewerSettings::load(path)?,
        None => ViewerSettings::default(),
    };
    let terrain = Terrain::generate(&settings.terrain)?;

    let event_loop = EventLoop::new().map_err(|e| TerrainError::gpu(format!("event loop: {e}")))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        settings,
        terrain: Some(terrain),
        state: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| TerrainError::gpu(format!("event loop: {e}")))?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("[Viewer] {e}");
        std::process::exit(1);
    }
}
