//! Camera state
//!
//! Per-frame camera snapshot consumed by the raymarcher and the temporal
//! blender. Movement and rotation are explicit commands invoked by whatever
//! input layer the host provides; nothing here polls input.

use glam::{Mat4, Vec3};

/// World-space camera with a yaw/pitch orientation
#[derive(Debug, Clone)]
pub struct CameraState {
    pub position: Vec3,
    /// Yaw in degrees, 0 looking down +X
    pub yaw: f32,
    /// Pitch in degrees, clamped to avoid flipping
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl CameraState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            fov_y: 45.0,
            aspect: width as f32 / height.max(1) as f32,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.znear, self.zfar)
    }

    /// Combined view-projection, stored by the temporal blender each frame.
    pub fn view_projection(&self) -> Mat4 {
        self.build_projection_matrix() * self.build_view_matrix()
    }

    pub fn move_forward(&mut self, amount: f32) {
        self.position += self.forward() * amount;
    }

    pub fn move_right(&mut self, amount: f32) {
        self.position += self.right() * amount;
    }

    pub fn move_up(&mut self, amount: f32) {
        self.position.y += amount;
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        // Clamp pitch to prevent camera flipping
        self.pitch = (self.pitch + delta_pitch).clamp(-89.0, 89.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_is_orthonormal() {
        let mut camera = CameraState::new(640, 480);
        camera.rotate(37.0, -12.0);
        let f = camera.forward();
        let r = camera.right();
        let u = camera.up();
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!(f.dot(r).abs() < 1e-5, "forward and right should be orthogonal");
        assert!(f.dot(u).abs() < 1e-5, "forward and up should be orthogonal");
        assert!(r.dot(u).abs() < 1e-5, "right and up should be orthogonal");
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = CameraState::new(640, 480);
        camera.rotate(0.0, 500.0);
        assert!(camera.pitch <= 89.0);
        camera.rotate(0.0, -500.0);
        assert!(camera.pitch >= -89.0);
    }

    #[test]
    fn test_move_commands() {
        let mut camera = CameraState::new(640, 480);
        let start = camera.position;
        camera.move_forward(2.0);
        assert!((camera.position - start).length() > 1.9);
        camera.move_up(1.0);
        assert!(camera.position.y > start.y);
    }
}
