/// Data-Oriented Camera
///
/// Pure data plus free functions. Transformations return a new `CameraData`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Camera data as a plain old data structure
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    pub position: [f32; 3],
    pub yaw_radians: f32,
    pub pitch_radians: f32,
    pub aspect_ratio: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    _padding: [f32; 3], // Align to 16 bytes
}

/// Camera uniform buffer for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_matrix: [[f32; 4]; 4],
    pub projection_matrix: [[f32; 4]; 4],
    pub view_projection_matrix: [[f32; 4]; 4],
    pub position: [f32; 3],
    _padding: f32,
}

/// Initialize camera data looking down -Z
pub fn init_camera(width: u32, height: u32, position: Vec3, znear: f32, zfar: f32) -> CameraData {
    CameraData {
        position: position.to_array(),
        yaw_radians: -std::f32::consts::FRAC_PI_2, // -90 degrees
        pitch_radians: 0.0,
        aspect_ratio: aspect(width, height),
        fovy_radians: 60f32.to_radians(),
        znear,
        zfar,
        _padding: [0.0; 3],
    }
}

/// Update camera aspect ratio for window resize
pub fn update_aspect_ratio(camera: &CameraData, width: u32, height: u32) -> CameraData {
    let mut updated = *camera;
    updated.aspect_ratio = aspect(width, height);
    updated
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

pub fn camera_position(camera: &CameraData) -> Vec3 {
    Vec3::from_array(camera.position)
}

/// Calculate forward vector from camera orientation
pub fn forward_vector(camera: &CameraData) -> Vec3 {
    let (sin_yaw, cos_yaw) = camera.yaw_radians.sin_cos();
    let (sin_pitch, cos_pitch) = camera.pitch_radians.sin_cos();

    Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
}

pub fn right_vector(camera: &CameraData) -> Vec3 {
    forward_vector(camera).cross(Vec3::Y).normalize()
}

/// Camera-space up, orthogonal to forward
pub fn up_vector(camera: &CameraData) -> Vec3 {
    right_vector(camera).cross(forward_vector(camera))
}

/// Build view matrix from camera data
pub fn build_view_matrix(camera: &CameraData) -> Mat4 {
    let position = camera_position(camera);
    Mat4::look_at_rh(position, position + forward_vector(camera), Vec3::Y)
}

/// Build projection matrix from camera data
pub fn build_projection_matrix(camera: &CameraData) -> Mat4 {
    Mat4::perspective_rh(camera.fovy_radians, camera.aspect_ratio, camera.znear, camera.zfar)
}

pub fn build_view_projection(camera: &CameraData) -> Mat4 {
    build_projection_matrix(camera) * build_view_matrix(camera)
}

/// Build camera uniform buffer for GPU
pub fn build_camera_uniform(camera: &CameraData) -> CameraUniform {
    let view = build_view_matrix(camera);
    let proj = build_projection_matrix(camera);

    CameraUniform {
        view_matrix: view.to_cols_array_2d(),
        projection_matrix: proj.to_cols_array_2d(),
        view_projection_matrix: (proj * view).to_cols_array_2d(),
        position: camera.position,
        _padding: 0.0,
    }
}

/// Camera movement transformations (returns new camera data)
pub mod transform {
    use super::*;

    /// Move camera forward by amount
    pub fn move_forward(camera: &CameraData, amount: f32) -> CameraData {
        translate(camera, forward_vector(camera) * amount)
    }

    /// Move camera right by amount
    pub fn move_right(camera: &CameraData, amount: f32) -> CameraData {
        translate(camera, right_vector(camera) * amount)
    }

    /// Move camera up by amount
    pub fn move_up(camera: &CameraData, amount: f32) -> CameraData {
        translate(camera, Vec3::Y * amount)
    }

    pub fn set_position(camera: &CameraData, position: Vec3) -> CameraData {
        let mut updated = *camera;
        updated.position = position.to_array();
        updated
    }

    /// Rotate camera by delta yaw and pitch (in radians)
    pub fn rotate(camera: &CameraData, delta_yaw: f32, delta_pitch: f32) -> CameraData {
        let mut updated = *camera;
        updated.yaw_radians += delta_yaw;
        // Clamp pitch to prevent camera flipping
        updated.pitch_radians = (updated.pitch_radians + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        updated
    }

    fn translate(camera: &CameraData, delta: Vec3) -> CameraData {
        set_position(camera, camera_position(camera) + delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraData {
        init_camera(1280, 720, Vec3::new(0.0, 40.0, 0.0), 0.01, 1500.0)
    }

    #[test]
    fn test_camera_initialization() {
        let camera = camera();
        assert_eq!(camera.position, [0.0, 40.0, 0.0]);
        assert!((camera.aspect_ratio - 1280.0 / 720.0).abs() < 0.001);
        assert!(forward_vector(&camera).abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(up_vector(&camera).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_camera_movement() {
        let camera = camera();
        let moved = transform::move_forward(&camera, 2.0);
        assert!(camera_position(&moved).abs_diff_eq(Vec3::new(0.0, 40.0, -2.0), 1e-5));

        let raised = transform::move_up(&moved, 1.0);
        assert!((raised.position[1] - 41.0).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let camera = transform::rotate(&camera(), 0.0, 10.0);
        assert!((camera.pitch_radians - MAX_PITCH).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_maps_position_to_origin() {
        let camera = camera();
        let view = build_view_matrix(&camera);
        let origin = view.transform_point3(camera_position(&camera));
        assert!(origin.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn test_uniform_matches_matrices() {
        let camera = camera();
        let uniform = build_camera_uniform(&camera);
        assert_eq!(
            uniform.view_projection_matrix,
            build_view_projection(&camera).to_cols_array_2d()
        );
    }
}
