//! Fly Camera
//!
//! Free-flying yaw/pitch camera for inspecting the terrain. Supplies the
//! view and projection matrices the frustum is extracted from each frame.

use glam::{Mat4, Vec3};

/// Pitch limit: ±89 degrees in radians
const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Speed multiplier while sprinting
const SPRINT_FACTOR: f32 = 2.5;

#[derive(Clone, Debug, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Horizontal angle (radians), 0 looks toward -Z
    pub yaw: f32,
    /// Vertical angle (radians), clamped to ±89°
    pub pitch: f32,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// World units per second
    pub move_speed: f32,
    /// Radians per pixel of mouse movement
    pub look_sensitivity: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        // Above the south edge of a 1025 grid, looking north over the centre
        Self {
            position: Vec3::new(512.0, 160.0, 1100.0),
            yaw: 0.0,
            pitch: -0.3,
            fov: 60.0_f32.to_radians(),
            near: 1.0,
            far: 3000.0,
            move_speed: 80.0,
            look_sensitivity: 0.003,
        }
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            ..Default::default()
        }
    }

    /// Camera placed above the south edge of a `size`-wide terrain, looking at its centre.
    pub fn overlooking(size: usize, peak_height: f32) -> Self {
        let half = (size.saturating_sub(1)) as f32 * 0.5;
        Self {
            position: Vec3::new(half, peak_height + half * 0.3, half * 2.15),
            ..Default::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Right-handed perspective with wgpu's [0, 1] depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(1e-4), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Mouse right looks right, mouse up looks up.
    pub fn handle_mouse_look(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.look_sensitivity;
        self.pitch -= delta_y * self.look_sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along the view direction projected onto the ground plane;
    /// `up` moves straight along world Y.
    pub fn update_movement(&mut self, forward: f32, right: f32, up: f32, delta_time: f32, sprint: bool) {
        let speed = if sprint {
            self.move_speed * SPRINT_FACTOR
        } else {
            self.move_speed
        };

        let forward_dir = self.forward();
        let right_dir = self.right();
        let forward_xz = Vec3::new(forward_dir.x, 0.0, forward_dir.z).normalize_or_zero();
        let right_xz = Vec3::new(right_dir.x, 0.0, right_dir.z).normalize_or_zero();

        self.position += forward_xz * forward * speed * delta_time;
        self.position += right_xz * right * speed * delta_time;
        self.position.y += up * speed * delta_time;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_toward_negative_z() {
        let camera = FlyCamera {
            pitch: 0.0,
            ..Default::default()
        };
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.handle_mouse_look(0.0, -1.0e6);
        assert!((camera.pitch - PITCH_LIMIT).abs() < 1e-6);
        camera.handle_mouse_look(0.0, 1.0e6);
        assert!((camera.pitch + PITCH_LIMIT).abs() < 1e-6);
    }

    #[test]
    fn test_mouse_right_turns_right() {
        let mut camera = FlyCamera::default();
        camera.handle_mouse_look(100.0, 0.0);
        assert!((camera.yaw - 0.3).abs() < 1e-6);
        assert!(camera.forward().x > 0.0);
    }

    #[test]
    fn test_movement_stays_horizontal() {
        let mut camera = FlyCamera::default();
        let start = camera.position;
        camera.update_movement(1.0, 0.0, 0.0, 1.0, false);
        assert_eq!(camera.position.y, start.y);
        assert!((camera.position.z - (start.z - camera.move_speed)).abs() < 1e-3);

        camera.update_movement(0.0, 0.0, 1.0, 0.5, true);
        assert!((camera.position.y - (start.y + camera.move_speed * SPRINT_FACTOR * 0.5)).abs() < 1e-3);
    }

    #[test]
    fn test_view_matrix_places_camera_at_origin() {
        let camera = FlyCamera::default();
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(eye.length() < 1e-3);
    }

    #[test]
    fn test_reset() {
        let mut camera = FlyCamera::default();
        camera.handle_mouse_look(40.0, 12.0);
        camera.update_movement(1.0, 1.0, 1.0, 2.0, false);
        camera.reset();
        assert_eq!(camera, FlyCamera::default());
    }
}
