pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod fracture;
pub mod input;
pub mod mesh;
pub mod physics;
pub mod renderer;
pub mod sdf;
pub mod terrain;
pub mod ui;

pub use app::AppController;
pub use camera::{CameraControl, CameraData};
pub use config::{AppConfig, ConfigChange};
pub use error::{DemoError, DemoResult};
pub use fracture::{voronoi_fracture, FragmentArena, FragmentMesh};
pub use input::{InputEvent, MouseButton};
pub use mesh::{box_mesh, TriangleMesh};
pub use physics::{BodyId, CollisionShape, PhysicsWorld, RigidBody, AABB};
pub use renderer::{DrawCommand, DrawList, DrawPass, ShaderProgram};
pub use sdf::{CsgEdit, CsgOp, DensityField};
pub use terrain::{GridTerrain, RaymarchTerrain, Terrain, TerrainKind};
pub use ui::{build_panel, GuiEvent, Panel};
