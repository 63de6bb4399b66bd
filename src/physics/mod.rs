pub mod aabb;
pub mod body;
pub mod debug_draw;
pub mod error;
pub mod world;

pub use aabb::AABB;
pub use body::{BodyId, BodyKind, CollisionShape, RigidBody};
pub use debug_draw::{body_wireframe, world_wireframe, DebugLine};
pub use error::{PhysicsErrorContext, PhysicsResult};
pub use world::{closest_point_on_triangle, Contact, PhysicsWorld};

pub const GRAVITY: f32 = -9.81;
/// Per-step velocity retention
pub const LINEAR_DAMPING: f32 = 0.999;
pub const ANGULAR_DAMPING: f32 = 0.98;
/// Push-out passes per dynamic body and surface
pub const CONTACT_ITERATIONS: usize = 4;
/// Share of a body-body penetration removed per pass
pub const PAIR_CORRECTION_PERCENT: f32 = 0.8;
/// Penetration tolerated between resting bodies
pub const PAIR_CORRECTION_SLOP: f32 = 0.01;
