/// Camera Module
///
/// First-person camera as plain data plus free functions, and the capture
/// toggle driven by the right mouse button.

pub mod data_camera;

pub use data_camera::{
    build_camera_uniform, build_projection_matrix, build_view_matrix, build_view_projection,
    camera_position, forward_vector, init_camera, right_vector, transform, up_vector,
    update_aspect_ratio, CameraData, CameraUniform,
};

/// Whether mouse motion currently steers the camera
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraControl {
    pub captured: bool,
}

impl CameraControl {
    pub fn toggle(&mut self) -> bool {
        self.captured = !self.captured;
        log::debug!("[CameraControl] Mouse capture {}", if self.captured { "on" } else { "off" });
        self.captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_capture() {
        let mut control = CameraControl::default();
        assert!(control.toggle());
        assert!(!control.toggle());
    }
}
