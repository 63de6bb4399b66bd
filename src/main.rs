/// Headless driver for the destruction demo.
///
/// Runs a scripted session against the controller: terrain setup, physics,
/// a CSG probe and a Voronoi slice. Window and GPU work belong to the host.

use anyhow::{Context, Result};
use density_destruction::config::ConfigChange;
use density_destruction::{AppConfig, AppController, InputEvent, MouseButton, TerrainKind};

const FRAME_DT: f32 = 1.0 / 60.0;
const SETTLE_FRAMES: u32 = 120;

fn main() -> Result<()> {
    if let Err(e) = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init() {
        log::debug!("Logger already initialised: {}", e);
    }

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => AppConfig::default(),
    };

    let mut app = AppController::new(config).context("Failed to create controller")?;
    log::info!("Starting scripted session on {} terrain", app.terrain().kind().label());

    app.select_terrain(TerrainKind::GridMarchingCubes)
        .context("Failed to switch to grid terrain")?;
    app.apply(ConfigChange::PhysicsEnabled(true));

    run_frames(&mut app, SETTLE_FRAMES)?;

    app.handle_input(InputEvent::MousePressed(MouseButton::Middle))
        .context("CSG probe failed")?;
    app.handle_input(InputEvent::MouseReleased(MouseButton::Middle))?;
    run_frames(&mut app, 10)?;

    let fragments = app.slice().context("Slice failed")?;
    log::info!("Slice produced {} fragments", fragments);
    run_frames(&mut app, SETTLE_FRAMES)?;

    let draw_list = app.draw();
    log::info!(
        "Final frame: {} draw commands across {:?}",
        draw_list.len(),
        draw_list.passes()
    );
    for (id, body) in app.world().bodies() {
        log::info!("{} {} at {:?}", id, body.shape.name(), body.position);
    }
    Ok(())
}

fn run_frames(app: &mut AppController, frames: u32) -> Result<()> {
    for _ in 0..frames {
        app.update(FRAME_DT).context("Frame update failed")?;
        let _ = app.draw();
    }
    log::info!(
        "Frame {}: avg {:.2} ms, {} bodies",
        app.frame(),
        app.diagnostics().average() * 1000.0,
        app.world().body_count()
    );
    Ok(())
}
