//! Per-frame orchestration of terrain, physics, fracture and the control panel.

use std::sync::Arc;

use glam::Vec3;

use crate::camera::{self, CameraControl, CameraData};
use crate::config::{AppConfig, ConfigChange};
use crate::error::{DemoError, DemoResult};
use crate::fracture::{voronoi_fracture, FragmentArena};
use crate::input::{InputEvent, InputState, MouseButton};
use crate::mesh::{box_mesh, TriangleMesh};
use crate::physics::{world_wireframe, BodyId, CollisionShape, PhysicsWorld, RigidBody};
use crate::renderer::{
    DrawCommand, DrawList, DrawPass, LightUniforms, MeshSource, ShaderProgram,
};
use crate::sdf::DensityField;
use crate::terrain::{
    GridTerrain, RaymarchTerrain, Terrain, TerrainErrorContext, TerrainKind,
};
use crate::ui::{
    build_panel, translate_event, Binding, Command, Diagnostics, GuiAction, GuiEvent, Panel,
    SLICE, SLICE_DONE,
};

/// Radians per pixel of captured mouse motion
const MOUSE_SENSITIVITY: f32 = 0.0025;
const TEST_SPHERE_RADIUS: f32 = 1.0;
const TEST_SPHERE_MASS: f32 = 2.0;
const TEST_SPHERE_HEIGHT: f32 = 20.0;
const TEST_BOX_SIZE: f32 = 10.0;
const TEST_BOX_MASS: f32 = 1.0;
const TEST_BOX_HEIGHT: f32 = 35.0;
const PROBE_MAX_STEPS: u32 = 256;

pub struct AppController {
    config: AppConfig,
    camera: CameraData,
    control: CameraControl,
    input: InputState,
    terrain: Terrain,
    /// Density field kept while a non-grid terrain is active
    parked_field: Option<DensityField>,
    /// Terrain proxy body not owned by the active terrain
    terrain_proxy: Option<BodyId>,
    world: PhysicsWorld,
    test_sphere: BodyId,
    test_box: Option<BodyId>,
    box_mesh: Arc<TriangleMesh>,
    fragments: FragmentArena,
    light_shader: Option<ShaderProgram>,
    panel: Panel,
    diagnostics: Diagnostics,
    frame: u64,
}

impl AppController {
    pub fn new(config: AppConfig) -> DemoResult<Self> {
        config.validate()?;
        let config = config.clamped();

        let cam = &config.camera;
        let camera = camera::init_camera(
            cam.viewport_width,
            cam.viewport_height,
            cam.position,
            cam.near_clip,
            cam.far_clip,
        );
        let eye = camera::camera_position(&camera);
        let up = camera::up_vector(&camera);

        let mut world = PhysicsWorld::new(config.physics.gravity);
        let test_sphere = world.add_body(RigidBody::dynamic(
            CollisionShape::Sphere {
                radius: TEST_SPHERE_RADIUS,
            },
            eye + up * TEST_SPHERE_HEIGHT,
            TEST_SPHERE_MASS,
        ));
        let box_mesh = Arc::new(box_mesh(Vec3::splat(TEST_BOX_SIZE)));
        let test_box = world.add_body(RigidBody::dynamic(
            CollisionShape::Box {
                half_extents: Vec3::splat(TEST_BOX_SIZE * 0.5),
            },
            eye + up * TEST_BOX_HEIGHT,
            TEST_BOX_MASS,
        ));

        // Placeholder until the grid terrain extracts a real surface
        let placeholder = TriangleMesh::from_triangles(&[[
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]]);
        let terrain_proxy = world.add_body(RigidBody::kinematic(
            CollisionShape::TriangleMesh {
                mesh: Arc::new(placeholder),
            },
            Vec3::ZERO,
        ));

        let light_shader = load_light_shader(&config);
        let kind = config.terrain.kind;
        let panel = build_panel(&config, kind);

        let mut controller = Self {
            terrain: Terrain::Raymarched(RaymarchTerrain::new(
                config.terrain.raymarch.resolution_x,
                config.terrain.raymarch.resolution_y,
                camera,
            )),
            parked_field: Some(DensityField::noise(config.terrain.seed)),
            terrain_proxy: Some(terrain_proxy),
            config,
            camera,
            control: CameraControl::default(),
            input: InputState::new(),
            world,
            test_sphere,
            test_box: Some(test_box),
            box_mesh,
            fragments: FragmentArena::new(),
            light_shader,
            panel,
            diagnostics: Diagnostics::default(),
            frame: 0,
        };
        controller.terrain = controller.make_terrain(kind)?;

        log::info!(
            "[AppController] Ready: {} terrain, {} bodies",
            kind.label(),
            controller.world.body_count()
        );
        Ok(controller)
    }

    fn make_terrain(&mut self, kind: TerrainKind) -> DemoResult<Terrain> {
        match kind {
            TerrainKind::GridMarchingCubes => {
                let field = self
                    .parked_field
                    .take()
                    .unwrap_or_else(|| DensityField::noise(self.config.terrain.seed));
                let mut grid = GridTerrain::with_shaders(field, &self.config.shaders);
                let settings = &self.config.terrain.grid;
                let n = settings.resolution as i32;
                grid.rebuild(n, n, n, settings.zoom)?;
                grid.expensive_normals = settings.smooth_normals;
                grid.set_offset(camera::camera_position(&self.camera));
                if let Some(proxy) = self.terrain_proxy.take() {
                    grid.attach_physics_mesh(proxy);
                }
                Ok(Terrain::Grid(grid))
            }
            TerrainKind::RaymarchedDistanceField => {
                let settings = &self.config.terrain.raymarch;
                let mut ray = RaymarchTerrain::with_shaders(
                    settings.resolution_x,
                    settings.resolution_y,
                    self.camera,
                    &self.config.shaders,
                );
                ray.rebuild(settings.resolution_x as i32, settings.resolution_y as i32)?;
                ray.num_iterations = settings.max_steps;
                ray.maximum_depth = settings.max_distance;
                Ok(Terrain::Raymarched(ray))
            }
            TerrainKind::OptimisedGridMarchingCubes => Err(DemoError::invalid_config(
                "terrain.kind",
                format!("{} is not available", kind.label()),
            )),
        }
    }

    /// Switch the active terrain at runtime and rebuild the panel
    pub fn select_terrain(&mut self, kind: TerrainKind) -> DemoResult<()> {
        if !kind.is_live() {
            log::warn!("[AppController] {} is not available", kind.label());
            return Err(DemoError::invalid_config(
                "terrain.kind",
                format!("{} is not available", kind.label()),
            ));
        }
        if kind == self.terrain.kind() {
            return Ok(());
        }

        let next = self.make_terrain(kind)?;
        let previous = std::mem::replace(&mut self.terrain, next);
        if let Terrain::Grid(grid) = previous {
            let (field, proxy) = grid.into_parts();
            self.parked_field = Some(field);
            self.terrain_proxy = proxy;
        }

        self.config.terrain.kind = kind;
        self.panel = build_panel(&self.config, kind);
        if self.test_box.is_none() {
            self.panel.rename_button(SLICE, SLICE_DONE);
        }
        log::info!("[AppController] Switched terrain to {}", kind.label());
        Ok(())
    }

    pub fn apply(&mut self, change: ConfigChange) {
        log::debug!("[AppController] {:?}", change);
        self.config.apply(change);
        self.panel.sync(&self.config);
    }

    pub fn handle_gui_event(&mut self, event: &GuiEvent) -> DemoResult<()> {
        match translate_event(&self.panel, event) {
            Some(GuiAction::Config(change)) => {
                self.apply(change);
                Ok(())
            }
            Some(GuiAction::Command(command)) => self.execute(command),
            None => {
                log::debug!("[AppController] Ignored {:?}", event);
                Ok(())
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> DemoResult<()> {
        match command {
            Command::RebuildTerrain => self.rebuild_terrain(),
            Command::Slice => self.slice().map(|_| ()),
            Command::SelectTerrain(kind) => self.select_terrain(kind),
        }
    }

    /// Rebuild the active terrain from the current slider values
    pub fn rebuild_terrain(&mut self) -> DemoResult<()> {
        let settings = &self.config.terrain;
        match &mut self.terrain {
            Terrain::Grid(grid) => {
                let n = settings.grid.resolution as i32;
                grid.rebuild(n, n, n, settings.grid.zoom)
            }
            Terrain::Raymarched(ray) => ray.rebuild(
                settings.raymarch.resolution_x as i32,
                settings.raymarch.resolution_y as i32,
            ),
        }
    }

    pub fn update(&mut self, dt: f32) -> DemoResult<()> {
        self.frame += 1;
        self.diagnostics.record(dt);
        let text = self.diagnostics.frame_time_text();
        self.panel.set_text(Binding::FrameTime, &text);
        self.panel.set_plot_value("FT", dt);

        let (dx, dy) = self.input.take_mouse_delta();
        if self.control.captured && (dx != 0.0 || dy != 0.0) {
            self.camera = camera::transform::rotate(
                &self.camera,
                dx * MOUSE_SENSITIVITY,
                -dy * MOUSE_SENSITIVITY,
            );
        }

        self.terrain.set_offset(camera::camera_position(&self.camera));

        match &mut self.terrain {
            Terrain::Grid(grid) => {
                grid.expensive_normals = self.config.terrain.grid.smooth_normals;
            }
            Terrain::Raymarched(ray) => {
                let settings = &self.config.terrain.raymarch;
                ray.num_iterations = settings.max_steps;
                ray.maximum_depth = settings.max_distance;
                ray.resolution_x = settings.resolution_x;
                ray.resolution_y = settings.resolution_y;
                ray.camera = self.camera;
            }
        }

        self.terrain.update(dt, &mut self.world);

        if self.config.physics.enabled {
            self.world.step(dt * self.config.physics.timescale * 2.0)?;
        }
        Ok(())
    }

    /// Record the frame: terrain, physics debug, lit bodies, fragments, GUI
    pub fn draw(&self) -> DrawList {
        let mut list = DrawList::new();
        let wireframe = self.config.physics.wireframe;

        list.push(
            DrawPass::Terrain,
            DrawCommand::BeginCamera {
                view_projection: camera::build_view_projection(&self.camera),
            },
        );
        self.terrain.draw(&mut list);

        list.push(DrawPass::PhysicsDebug, DrawCommand::SetDepthTest(false));
        if wireframe {
            list.push(
                DrawPass::PhysicsDebug,
                DrawCommand::DebugLines {
                    lines: world_wireframe(&self.world),
                },
            );
        }
        list.push(DrawPass::PhysicsDebug, DrawCommand::SetDepthTest(true));

        list.push(
            DrawPass::PhysicsObjects,
            DrawCommand::BeginLighting {
                program: self.light_shader.as_ref().map(|p| p.id),
                uniforms: LightUniforms::default(),
            },
        );
        let objects = [
            (MeshSource::TestSphere, Some(self.test_sphere)),
            (MeshSource::TestBox, self.test_box),
        ];
        for (source, body) in objects {
            if let Some(id) = body {
                if let Some(rigid) = self.world.body(id) {
                    list.push(
                        DrawPass::PhysicsObjects,
                        DrawCommand::LitMesh {
                            source,
                            body: id,
                            transform: rigid.transform(),
                            wireframe,
                        },
                    );
                }
            }
        }

        for (fragment_id, fragment) in self.fragments.iter() {
            if let Some(rigid) = self.world.body(fragment.body) {
                list.push(
                    DrawPass::Fragments,
                    DrawCommand::LitMesh {
                        source: MeshSource::Fragment(fragment_id.0),
                        body: fragment.body,
                        transform: rigid.transform(),
                        wireframe,
                    },
                );
            }
        }
        list.push(DrawPass::Fragments, DrawCommand::EndLighting);
        list.push(DrawPass::Fragments, DrawCommand::EndCamera);

        list.push(
            DrawPass::Gui,
            DrawCommand::Gui {
                widget_count: self.panel.widget_count(),
            },
        );
        list
    }

    pub fn handle_input(&mut self, event: InputEvent) -> DemoResult<()> {
        self.input.process(&event);
        match event {
            InputEvent::MousePressed(MouseButton::Right) => {
                self.control.toggle();
            }
            InputEvent::MousePressed(MouseButton::Middle) => {
                if self.terrain.as_grid().is_some() {
                    self.probe()?;
                } else {
                    log::debug!("[AppController] Probe ignored: terrain is not grid based");
                }
            }
            InputEvent::Resized { width, height } => {
                self.camera = camera::update_aspect_ratio(&self.camera, width, height);
                self.config.camera.viewport_width = width;
                self.config.camera.viewport_height = height;
            }
            _ => {}
        }
        Ok(())
    }

    /// Remove a CSG sphere where the camera looks; returns the sphere centre
    pub fn probe(&mut self) -> DemoResult<Vec3> {
        let eye = camera::camera_position(&self.camera);
        let forward = camera::forward_vector(&self.camera);
        let radius = self.config.probe.csg_radius;
        let max_distance = self.config.probe.max_distance;

        let grid = self.terrain.as_grid_mut().terrain_context("grid terrain")?;
        let center = grid
            .field()
            .march_ray(eye, forward, PROBE_MAX_STEPS, max_distance)
            // Mirror of the lattice centre through the eye
            .unwrap_or_else(|| eye + (eye - grid.offset()));
        grid.csg_remove_sphere(center, radius);
        Ok(center)
    }

    /// Fracture the test box into Voronoi fragments and retire it
    pub fn slice(&mut self) -> DemoResult<usize> {
        let source = self
            .test_box
            .ok_or_else(|| DemoError::Fracture("test box was already sliced".to_string()))?;

        let pieces = voronoi_fracture(
            &self.box_mesh,
            self.config.fracture.cells as usize,
            None,
            self.config.fracture.seed,
        )?;

        self.fragments.clear(&mut self.world);
        let spawned = self.fragments.spawn_from(&mut self.world, source, pieces)?;
        self.world.remove_body(source);
        self.test_box = None;
        self.panel.rename_button(SLICE, SLICE_DONE);

        log::info!("[AppController] Sliced test box into {} fragments", spawned.len());
        Ok(spawned.len())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraData {
        &self.camera
    }

    pub fn set_camera_position(&mut self, position: Vec3) {
        self.camera = camera::transform::set_position(&self.camera, position);
    }

    pub fn control(&self) -> CameraControl {
        self.control
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut Terrain {
        &mut self.terrain
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn test_sphere(&self) -> BodyId {
        self.test_sphere
    }

    pub fn test_box(&self) -> Option<BodyId> {
        self.test_box
    }

    pub fn fragments(&self) -> &FragmentArena {
        &self.fragments
    }

    pub fn light_shader(&self) -> Option<&ShaderProgram> {
        self.light_shader.as_ref()
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn load_light_shader(config: &AppConfig) -> Option<ShaderProgram> {
    ShaderProgram::load_or_warn(
        "AppController",
        &config.shaders.light_vertex,
        None,
        &config.shaders.light_fragment,
    )
}
