// Application controller integration tests
//
// Frame orchestration: draw order, physics gating, GUI events, probing and slicing.

use density_destruction::config::ConfigChange;
use density_destruction::renderer::DrawCommand;
use density_destruction::ui::{Binding, SLICE, SLICE_DONE};
use density_destruction::{
    AppConfig, AppController, DemoError, DrawPass, GuiEvent, InputEvent, MouseButton, TerrainKind,
};

const DT: f32 = 1.0 / 60.0;

fn small_grid_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.terrain.kind = TerrainKind::GridMarchingCubes;
    config.terrain.grid.resolution = 12;
    config.terrain.grid.zoom = 5.0;
    config.fracture.seed = Some(1234);
    config
}

#[test]
fn test_physics_disabled_freezes_bodies() {
    let mut app = AppController::new(AppConfig::default()).expect("controller");
    assert!(!app.config().physics.enabled);

    let before: Vec<_> = app.world().bodies().map(|(id, b)| (id, b.position)).collect();
    for _ in 0..30 {
        app.update(DT).expect("update");
    }
    let after: Vec<_> = app.world().bodies().map(|(id, b)| (id, b.position)).collect();

    assert_eq!(before, after);
}

#[test]
fn test_physics_enabled_moves_test_sphere() {
    let mut app = AppController::new(AppConfig::default()).expect("controller");
    app.apply(ConfigChange::PhysicsEnabled(true));
    let start = app.world().body(app.test_sphere()).expect("sphere").position;

    for _ in 0..10 {
        app.update(DT).expect("update");
    }
    let end = app.world().body(app.test_sphere()).expect("sphere").position;
    assert!(end.y < start.y);
}

#[test]
fn test_zero_length_frame_with_physics_enabled() {
    let mut app = AppController::new(AppConfig::default()).expect("controller");
    app.apply(ConfigChange::PhysicsEnabled(true));
    let start = app.world().body(app.test_sphere()).expect("sphere").position;

    app.update(0.0).expect("zero-length frame");

    assert_eq!(app.world().step_count(), 0);
    assert_eq!(app.world().body(app.test_sphere()).expect("sphere").position, start);
    assert!(app.update(-DT).is_err());
}

#[test]
fn test_test_bodies_are_placed_above_camera() {
    let app = AppController::new(AppConfig::default()).expect("controller");
    let eye = glam::Vec3::from_array(app.camera().position);

    let sphere = app.world().body(app.test_sphere()).expect("sphere");
    assert!((sphere.position.y - (eye.y + 20.0)).abs() < 1e-3);
    assert_eq!(sphere.mass, 2.0);

    let test_box = app.world().body(app.test_box().expect("box")).expect("box body");
    assert!((test_box.position.y - (eye.y + 35.0)).abs() < 1e-3);
    assert_eq!(test_box.mass, 1.0);
}

#[test]
fn test_draw_order_is_fixed() {
    let expected = vec![
        DrawPass::Terrain,
        DrawPass::PhysicsDebug,
        DrawPass::PhysicsObjects,
        DrawPass::Fragments,
        DrawPass::Gui,
    ];

    let mut app = AppController::new(small_grid_config()).expect("controller");
    app.apply(ConfigChange::Wireframe(true));
    app.update(DT).expect("update");
    assert_eq!(app.draw().passes(), expected);

    app.slice().expect("slice");
    let list = app.draw();
    assert_eq!(list.passes(), expected);
    assert_eq!(list.count_in(DrawPass::Fragments), app.fragments().len() + 2);

    app.select_terrain(TerrainKind::RaymarchedDistanceField).expect("switch");
    assert_eq!(app.draw().passes(), expected);
}

#[test]
fn test_wireframe_toggles_debug_lines() {
    let mut app = AppController::new(AppConfig::default()).expect("controller");
    let has_lines = |app: &AppController| {
        app.draw()
            .commands()
            .any(|c| matches!(c, DrawCommand::DebugLines { .. }))
    };

    assert!(!has_lines(&app));
    app.apply(ConfigChange::Wireframe(true));
    assert!(has_lines(&app));
}

#[test]
fn test_missing_shader_is_not_fatal() {
    let mut config = AppConfig::default();
    config.shaders.light_vertex = "does/not/exist.vert".to_string();
    config.shaders.light_fragment = "does/not/exist.frag".to_string();

    let mut app = AppController::new(config).expect("controller without shader");
    assert!(app.light_shader().is_none());
    app.update(DT).expect("update");

    let lighting = app
        .draw()
        .commands()
        .find_map(|c| match c {
            DrawCommand::BeginLighting { program, .. } => Some(*program),
            _ => None,
        })
        .expect("lighting pass recorded");
    assert_eq!(lighting, None);
}

#[test]
fn test_terrain_programs_are_loaded() {
    let mut app = AppController::new(small_grid_config()).expect("controller");
    let grid = app.terrain().as_grid().expect("grid terrain");
    let program = grid.program().expect("grid program").id;
    assert!(grid.program().and_then(|p| p.geometry.as_ref()).is_some());

    let recorded = app.draw().commands().find_map(|c| match c {
        DrawCommand::GridPoints { program, .. } => Some(*program),
        _ => None,
    });
    assert_eq!(recorded, Some(Some(program)));

    app.select_terrain(TerrainKind::RaymarchedDistanceField).expect("switch");
    let ray = app.terrain().as_raymarch().expect("raymarch terrain");
    assert!(ray.program().is_some());
}

#[test]
fn test_missing_terrain_shaders_are_not_fatal() {
    let mut config = small_grid_config();
    config.shaders.grid_geometry = "does/not/exist.geom".to_string();
    config.shaders.raymarch_fragment = "does/not/exist.frag".to_string();

    let mut app = AppController::new(config).expect("controller without terrain shaders");
    assert!(app.terrain().as_grid().expect("grid").program().is_none());
    app.update(DT).expect("update");
    assert!(app
        .draw()
        .commands()
        .any(|c| matches!(c, DrawCommand::GridPoints { program: None, .. })));

    app.select_terrain(TerrainKind::RaymarchedDistanceField).expect("switch");
    assert!(app
        .draw()
        .commands()
        .any(|c| matches!(c, DrawCommand::RaymarchPass { program: None, .. })));
}

#[test]
fn test_slider_events_are_clamped() {
    let mut app = AppController::new(AppConfig::default()).expect("controller");

    app.handle_gui_event(&GuiEvent::Slider {
        binding: Binding::Timescale,
        value: 5.0,
    })
    .expect("slider");
    assert_eq!(app.config().physics.timescale, 1.0);

    app.handle_gui_event(&GuiEvent::Slider {
        binding: Binding::RayMaxSteps,
        value: 3.0,
    })
    .expect("slider");
    assert_eq!(app.config().terrain.raymarch.max_steps, 16);
}

#[test]
fn test_slice_retires_box_and_renames_button() {
    let mut app = AppController::new(small_grid_config()).expect("controller");
    let source = app.test_box().expect("box");

    app.handle_gui_event(&GuiEvent::Button {
        name: SLICE.to_string(),
    })
    .expect("slice");

    assert!(app.test_box().is_none());
    assert!(!app.world().contains(source));
    assert!((1..=16).contains(&app.fragments().len()));
    assert!(app.panel().has_button(SLICE_DONE));
    assert!(!app.panel().has_button(SLICE));

    let total: f32 = app.fragments().iter().map(|(_, f)| f.mesh.volume()).sum();
    assert!((total - 1000.0).abs() < 1.0);

    assert!(matches!(app.slice(), Err(DemoError::Fracture(_))));
}

#[test]
fn test_middle_mouse_probe_only_on_grid() {
    let mut app = AppController::new(small_grid_config()).expect("controller");
    app.update(DT).expect("update");

    app.handle_input(InputEvent::MousePressed(MouseButton::Middle))
        .expect("probe");
    let grid = app.terrain().as_grid().expect("grid terrain");
    assert_eq!(grid.field().edits().len(), 1);
    assert_eq!(grid.field().edits()[0].radius, 25.0);
    assert!(grid.update_physics_mesh);

    app.select_terrain(TerrainKind::RaymarchedDistanceField).expect("switch");
    app.handle_input(InputEvent::MousePressed(MouseButton::Middle))
        .expect("ignored probe");

    // Edit log survives the round trip
    app.select_terrain(TerrainKind::GridMarchingCubes).expect("switch back");
    let grid = app.terrain().as_grid().expect("grid terrain");
    assert_eq!(grid.field().edits().len(), 1);
}

#[test]
fn test_right_mouse_toggles_capture() {
    let mut app = AppController::new(AppConfig::default()).expect("controller");
    assert!(!app.control().captured);
    app.handle_input(InputEvent::MousePressed(MouseButton::Right)).expect("input");
    assert!(app.control().captured);

    let yaw = app.camera().yaw_radians;
    app.handle_input(InputEvent::MouseMoved { dx: 40.0, dy: 0.0 }).expect("input");
    app.update(DT).expect("update");
    assert!(app.camera().yaw_radians > yaw);
}

#[test]
fn test_unavailable_terrain_is_rejected() {
    let mut app = AppController::new(AppConfig::default()).expect("controller");
    let err = app
        .select_terrain(TerrainKind::OptimisedGridMarchingCubes)
        .unwrap_err();
    assert!(matches!(err, DemoError::InvalidConfig { .. }));
    assert_eq!(app.terrain().kind(), TerrainKind::RaymarchedDistanceField);

    app.handle_gui_event(&GuiEvent::Dropdown { index: 0 }).expect("dropdown");
    assert_eq!(app.terrain().kind(), TerrainKind::GridMarchingCubes);
    assert_eq!(app.config().terrain.kind, TerrainKind::GridMarchingCubes);
}

#[test]
fn test_rebuild_button_uses_slider_values() {
    let mut app = AppController::new(small_grid_config()).expect("controller");
    let before = app.terrain().as_grid().expect("grid").handle();

    app.handle_gui_event(&GuiEvent::Slider {
        binding: Binding::GridResolution,
        value: 9.0,
    })
    .expect("slider");
    app.handle_gui_event(&GuiEvent::Button {
        name: "Rebuild Terrain".to_string(),
    })
    .expect("rebuild");

    let grid = app.terrain().as_grid().expect("grid");
    assert_eq!(grid.dimensions(), [9, 9, 9]);
    assert_ne!(grid.handle(), before);
}
