//! Raymarched distance-field terrain.
//!
//! Rendered by a full-viewport pass into an off-screen target and drawn
//! outside the camera transform.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::camera::{self, CameraData};
use crate::config::ShaderSettings;
use crate::error::{DemoError, DemoResult};
use crate::renderer::{
    DrawCommand, DrawList, DrawPass, RaymarchUniforms, ShaderProgram, TargetHandle,
};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

pub struct RaymarchTerrain {
    pub num_iterations: u32,
    pub maximum_depth: f32,
    pub resolution_x: u32,
    pub resolution_y: u32,
    /// Camera snapshot for the current frame
    pub camera: CameraData,
    time: f32,
    offset: Vec3,
    target: TargetHandle,
    program: Option<ShaderProgram>,
}

impl RaymarchTerrain {
    pub fn new(width: u32, height: u32, camera: CameraData) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            num_iterations: 256,
            maximum_depth: 1500.0,
            resolution_x: width,
            resolution_y: height,
            camera,
            time: 0.0,
            offset: Vec3::ZERO,
            target: allocate_target(width, height),
            program: None,
        }
    }

    /// Terrain drawn with the raymarch program from `shaders`; load failures
    /// are logged and the pass is recorded without a program.
    pub fn with_shaders(
        width: u32,
        height: u32,
        camera: CameraData,
        shaders: &ShaderSettings,
    ) -> Self {
        let mut terrain = Self::new(width, height, camera);
        terrain.program = ShaderProgram::load_or_warn(
            "RaymarchTerrain",
            &shaders.raymarch_vertex,
            None,
            &shaders.raymarch_fragment,
        );
        terrain
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    /// Reallocate the off-screen target. Invalid sizes keep the old target.
    pub fn rebuild(&mut self, width: i32, height: i32) -> DemoResult<()> {
        if width <= 0 || height <= 0 {
            return Err(DemoError::invalid_dimensions(
                "RaymarchTerrain",
                format!("render target {}x{} must be positive", width, height),
            ));
        }

        let previous = self.target;
        self.target = allocate_target(width as u32, height as u32);
        self.resolution_x = width as u32;
        self.resolution_y = height as u32;
        log::info!(
            "[RaymarchTerrain] Render target {}x{} (#{} -> #{})",
            width,
            height,
            previous.id,
            self.target.id
        );
        Ok(())
    }

    pub fn target(&self) -> TargetHandle {
        self.target
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    pub fn uniforms(&self) -> RaymarchUniforms {
        RaymarchUniforms {
            camera_position: self.offset.to_array(),
            max_depth: self.maximum_depth,
            camera_forward: camera::forward_vector(&self.camera).to_array(),
            num_iterations: self.num_iterations,
            camera_up: camera::up_vector(&self.camera).to_array(),
            time: self.time,
            resolution: [self.resolution_x as f32, self.resolution_y as f32],
            fovy: self.camera.fovy_radians,
            _padding: 0.0,
        }
    }

    /// Full-viewport pass, recorded between `EndCamera` and `BeginCamera`
    pub fn draw(&self, list: &mut DrawList) {
        list.push(DrawPass::Terrain, DrawCommand::EndCamera);
        list.push(
            DrawPass::Terrain,
            DrawCommand::RaymarchPass {
                program: self.program.as_ref().map(|p| p.id),
                target: self.target,
                uniforms: self.uniforms(),
            },
        );
        list.push(
            DrawPass::Terrain,
            DrawCommand::BeginCamera {
                view_projection: camera::build_view_projection(&self.camera),
            },
        );
    }
}

fn allocate_target(width: u32, height: u32) -> TargetHandle {
    TargetHandle {
        id: NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain() -> RaymarchTerrain {
        let camera = camera::init_camera(1280, 720, Vec3::new(0.0, 40.0, 0.0), 0.01, 1500.0);
        RaymarchTerrain::new(1280, 720, camera)
    }

    #[test]
    fn test_rebuild_reallocates_target() {
        let mut terrain = terrain();
        let before = terrain.target();

        terrain.rebuild(640, 360).expect("valid size");

        let after = terrain.target();
        assert_ne!(before.id, after.id);
        assert_eq!((after.width, after.height), (640, 360));
        assert_eq!((terrain.resolution_x, terrain.resolution_y), (640, 360));
    }

    #[test]
    fn test_invalid_rebuild_keeps_target() {
        let mut terrain = terrain();
        let before = terrain.target();
        assert!(terrain.rebuild(0, 720).is_err());
        assert!(terrain.rebuild(1280, -4).is_err());
        assert_eq!(terrain.target(), before);
    }

    #[test]
    fn test_missing_program_is_not_fatal() {
        let camera = camera::init_camera(640, 360, Vec3::ZERO, 0.01, 1500.0);
        let shaders = ShaderSettings {
            raymarch_vertex: "missing/raymarch.vert".to_string(),
            raymarch_fragment: "missing/raymarch.frag".to_string(),
            ..ShaderSettings::default()
        };
        let terrain = RaymarchTerrain::with_shaders(640, 360, camera, &shaders);
        assert!(terrain.program().is_none());

        let mut list = DrawList::new();
        terrain.draw(&mut list);
        assert!(list
            .commands()
            .any(|c| matches!(c, DrawCommand::RaymarchPass { program: None, .. })));
    }

    #[test]
    fn test_draw_leaves_camera_transform() {
        let mut terrain = terrain();
        terrain.num_iterations = 64;
        let mut list = DrawList::new();
        terrain.draw(&mut list);

        let commands: Vec<&DrawCommand> = list.commands().collect();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], DrawCommand::EndCamera));
        assert!(matches!(
            commands[1],
            DrawCommand::RaymarchPass { uniforms, .. } if uniforms.num_iterations == 64
        ));
        assert!(matches!(commands[2], DrawCommand::BeginCamera { .. }));
    }
}
