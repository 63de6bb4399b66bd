//! Application configuration.
//!
//! Every value the control panel can edit lives here. The controller owns one
//! [`AppConfig`] and copies it into the active terrain and the physics world
//! each frame; the panel only ever produces [`ConfigChange`] values.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{DemoError, DemoResult};
use crate::terrain::TerrainKind;

/// Inclusive slider ranges shared by config clamping and the panel builder
pub mod ranges {
    pub const GRID_RESOLUTION: (f32, f32) = (3.0, 128.0);
    pub const GRID_ZOOM: (f32, f32) = (1.0, 20.0);
    pub const RAY_RESOLUTION_X: (f32, f32) = (32.0, 1280.0);
    pub const RAY_RESOLUTION_Y: (f32, f32) = (24.0, 720.0);
    pub const RAY_MAX_STEPS: (f32, f32) = (16.0, 1024.0);
    pub const RAY_MAX_DISTANCE: (f32, f32) = (64.0, 16000.0);
    pub const PHYSICS_TIMESCALE: (f32, f32) = (0.01, 1.0);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub resolution: u32,
    pub zoom: f32,
    pub smooth_normals: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            resolution: 64,
            zoom: 5.0,
            smooth_normals: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaymarchSettings {
    pub resolution_x: u32,
    pub resolution_y: u32,
    pub max_steps: u32,
    pub max_distance: f32,
}

impl Default for RaymarchSettings {
    fn default() -> Self {
        Self {
            resolution_x: 1280,
            resolution_y: 720,
            max_steps: 256,
            max_distance: 1500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub kind: TerrainKind,
    pub seed: u32,
    pub grid: GridSettings,
    pub raymarch: RaymarchSettings,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            kind: TerrainKind::RaymarchedDistanceField,
            seed: 0,
            grid: GridSettings::default(),
            raymarch: RaymarchSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub enabled: bool,
    pub wireframe: bool,
    pub timescale: f32,
    pub gravity: Vec3,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            wireframe: false,
            timescale: 1.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractureSettings {
    pub cells: u32,
    pub seed: Option<u64>,
}

impl Default for FractureSettings {
    fn default() -> Self {
        Self { cells: 16, seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub near_clip: f32,
    pub far_clip: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 40.0, 0.0),
            near_clip: 0.01,
            far_clip: 1500.0,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub csg_radius: f32,
    pub max_distance: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            csg_radius: 25.0,
            max_distance: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSettings {
    pub light_vertex: String,
    pub light_fragment: String,
    pub grid_vertex: String,
    pub grid_geometry: String,
    pub grid_fragment: String,
    pub raymarch_vertex: String,
    pub raymarch_fragment: String,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            light_vertex: "data/shaders/directional_light.vert".to_string(),
            light_fragment: "data/shaders/directional_light.frag".to_string(),
            grid_vertex: "data/shaders/grid_marching_cubes.vert".to_string(),
            grid_geometry: "data/shaders/grid_marching_cubes.geom".to_string(),
            grid_fragment: "data/shaders/grid_marching_cubes.frag".to_string(),
            raymarch_vertex: "data/shaders/raymarch.vert".to_string(),
            raymarch_fragment: "data/shaders/raymarch.frag".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub terrain: TerrainSettings,
    pub physics: PhysicsSettings,
    pub fracture: FractureSettings,
    pub camera: CameraSettings,
    pub probe: ProbeSettings,
    pub shaders: ShaderSettings,
}

/// A single edit to the configuration, as produced by the control panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    GridResolution(u32),
    GridZoom(f32),
    SmoothNormals(bool),
    RayResolutionX(u32),
    RayResolutionY(u32),
    RayMaxSteps(u32),
    RayMaxDistance(f32),
    PhysicsEnabled(bool),
    Wireframe(bool),
    Timescale(f32),
}

impl AppConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> DemoResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("[AppConfig] Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> DemoResult<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config.clamped())
    }

    pub fn to_toml_string(&self) -> DemoResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values no clamp can repair
    pub fn validate(&self) -> DemoResult<()> {
        let floats = [
            ("terrain.grid.zoom", self.terrain.grid.zoom),
            ("terrain.raymarch.max_distance", self.terrain.raymarch.max_distance),
            ("physics.timescale", self.physics.timescale),
            ("probe.csg_radius", self.probe.csg_radius),
            ("probe.max_distance", self.probe.max_distance),
            ("camera.near_clip", self.camera.near_clip),
            ("camera.far_clip", self.camera.far_clip),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(DemoError::invalid_config(field, "must be finite"));
            }
        }
        if !self.physics.gravity.is_finite() {
            return Err(DemoError::invalid_config("physics.gravity", "must be finite"));
        }
        if self.probe.csg_radius <= 0.0 {
            return Err(DemoError::invalid_config("probe.csg_radius", "must be positive"));
        }
        if !self.terrain.kind.is_live() {
            return Err(DemoError::invalid_config(
                "terrain.kind",
                format!("{} is not available", self.terrain.kind.label()),
            ));
        }
        if self.fracture.cells == 0 {
            return Err(DemoError::invalid_config("fracture.cells", "must be at least 1"));
        }
        if self.camera.near_clip <= 0.0 || self.camera.far_clip <= self.camera.near_clip {
            return Err(DemoError::invalid_config(
                "camera",
                "near clip must be positive and below the far clip",
            ));
        }
        Ok(())
    }

    /// Copy with every panel-bound value forced into its slider range
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        out.terrain.grid.resolution = clamp_u32(out.terrain.grid.resolution, ranges::GRID_RESOLUTION);
        out.terrain.grid.zoom = clamp_f32(out.terrain.grid.zoom, ranges::GRID_ZOOM);
        let ray = &mut out.terrain.raymarch;
        ray.resolution_x = clamp_u32(ray.resolution_x, ranges::RAY_RESOLUTION_X);
        ray.resolution_y = clamp_u32(ray.resolution_y, ranges::RAY_RESOLUTION_Y);
        ray.max_steps = clamp_u32(ray.max_steps, ranges::RAY_MAX_STEPS);
        ray.max_distance = clamp_f32(ray.max_distance, ranges::RAY_MAX_DISTANCE);
        out.physics.timescale = clamp_f32(out.physics.timescale, ranges::PHYSICS_TIMESCALE);
        out
    }

    /// Apply a panel edit. Values are clamped to the matching slider range.
    pub fn apply(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::GridResolution(v) => {
                self.terrain.grid.resolution = clamp_u32(v, ranges::GRID_RESOLUTION)
            }
            ConfigChange::GridZoom(v) => self.terrain.grid.zoom = clamp_f32(v, ranges::GRID_ZOOM),
            ConfigChange::SmoothNormals(v) => self.terrain.grid.smooth_normals = v,
            ConfigChange::RayResolutionX(v) => {
                self.terrain.raymarch.resolution_x = clamp_u32(v, ranges::RAY_RESOLUTION_X)
            }
            ConfigChange::RayResolutionY(v) => {
                self.terrain.raymarch.resolution_y = clamp_u32(v, ranges::RAY_RESOLUTION_Y)
            }
            ConfigChange::RayMaxSteps(v) => {
                self.terrain.raymarch.max_steps = clamp_u32(v, ranges::RAY_MAX_STEPS)
            }
            ConfigChange::RayMaxDistance(v) => {
                self.terrain.raymarch.max_distance = clamp_f32(v, ranges::RAY_MAX_DISTANCE)
            }
            ConfigChange::PhysicsEnabled(v) => self.physics.enabled = v,
            ConfigChange::Wireframe(v) => self.physics.wireframe = v,
            ConfigChange::Timescale(v) => {
                self.physics.timescale = clamp_f32(v, ranges::PHYSICS_TIMESCALE)
            }
        }
    }
}

fn clamp_f32(value: f32, (min, max): (f32, f32)) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

fn clamp_u32(value: u32, (min, max): (f32, f32)) -> u32 {
    value.clamp(min as u32, max as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_panel_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.terrain.grid.resolution, 64);
        assert_eq!(config.terrain.grid.zoom, 5.0);
        assert_eq!(config.terrain.raymarch.max_steps, 256);
        assert_eq!(config.terrain.raymarch.max_distance, 1500.0);
        assert_eq!(config.physics.timescale, 1.0);
        assert!(!config.physics.enabled);
        assert_eq!(config.fracture.cells, 16);
        assert_eq!(config.terrain.kind, TerrainKind::RaymarchedDistanceField);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [terrain]
            kind = "grid_marching_cubes"

            [terrain.grid]
            resolution = 32

            [physics]
            enabled = true
            "#,
        )
        .expect("valid config");

        assert_eq!(config.terrain.kind, TerrainKind::GridMarchingCubes);
        assert_eq!(config.terrain.grid.resolution, 32);
        assert_eq!(config.terrain.grid.zoom, 5.0);
        assert!(config.physics.enabled);
        assert_eq!(config.physics.timescale, 1.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = AppConfig::from_toml_str(
            r#"
            [terrain.grid]
            resolution = 4000
            zoom = 0.1

            [physics]
            timescale = 7.5
            "#,
        )
        .expect("valid config");

        assert_eq!(config.terrain.grid.resolution, 128);
        assert_eq!(config.terrain.grid.zoom, 1.0);
        assert_eq!(config.physics.timescale, 1.0);
    }

    #[test]
    fn test_zero_fracture_cells_rejected() {
        let err = AppConfig::from_toml_str("[fracture]\ncells = 0\n").unwrap_err();
        assert!(matches!(err, DemoError::InvalidConfig { .. }));
    }

    #[test]
    fn test_apply_clamps_slider_values() {
        let mut config = AppConfig::default();
        config.apply(ConfigChange::RayMaxSteps(2));
        config.apply(ConfigChange::Timescale(0.5));
        config.apply(ConfigChange::Wireframe(true));

        assert_eq!(config.terrain.raymarch.max_steps, 16);
        assert_eq!(config.physics.timescale, 0.5);
        assert!(config.physics.wireframe);
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let mut config = AppConfig::default();
        config.terrain.kind = TerrainKind::GridMarchingCubes;
        config.fracture.seed = Some(7);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("demo.toml");
        std::fs::write(&path, config.to_toml_string().expect("serialize")).expect("write");

        let loaded = AppConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }
}
