//! Rigid bodies and their collision shapes

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use super::aabb::{aabb_from_center_half_extents, aabb_transformed, AABB};
use crate::mesh::TriangleMesh;

/// Handle to a body owned by a [`super::PhysicsWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated every step
    Dynamic,
    /// Moved only by its owner; never integrated, never deactivated
    Kinematic,
    Static,
}

/// Shape in body-local space
#[derive(Debug, Clone)]
pub enum CollisionShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    /// Convex solid given by its closed surface mesh
    ConvexHull { mesh: Arc<TriangleMesh> },
    /// Arbitrary triangle soup; only sensible on kinematic or static bodies
    TriangleMesh { mesh: Arc<TriangleMesh> },
}

impl CollisionShape {
    pub fn local_aabb(&self) -> AABB {
        match self {
            CollisionShape::Sphere { radius } => {
                aabb_from_center_half_extents(Vec3::ZERO, Vec3::splat(*radius))
            }
            CollisionShape::Box { half_extents } => {
                aabb_from_center_half_extents(Vec3::ZERO, *half_extents)
            }
            CollisionShape::ConvexHull { mesh } | CollisionShape::TriangleMesh { mesh } => mesh
                .bounds()
                .map(|b| AABB { min: b.min, max: b.max })
                .unwrap_or(AABB {
                    min: Vec3::ZERO,
                    max: Vec3::ZERO,
                }),
        }
    }

    /// Radius of a sphere around the local origin enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            CollisionShape::Sphere { radius } => *radius,
            CollisionShape::Box { half_extents } => half_extents.length(),
            CollisionShape::ConvexHull { mesh } | CollisionShape::TriangleMesh { mesh } => mesh
                .positions
                .iter()
                .map(|p| p.length())
                .fold(0.0, f32::max),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CollisionShape::Sphere { .. } => "sphere",
            CollisionShape::Box { .. } => "box",
            CollisionShape::ConvexHull { .. } => "convex hull",
            CollisionShape::TriangleMesh { .. } => "triangle mesh",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    pub shape: CollisionShape,
    pub kind: BodyKind,
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
}

impl RigidBody {
    pub fn new(shape: CollisionShape, kind: BodyKind, position: Vec3, mass: f32) -> Self {
        Self {
            shape,
            kind,
            position,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            restitution: 0.2,
            friction: 0.5,
        }
    }

    pub fn dynamic(shape: CollisionShape, position: Vec3, mass: f32) -> Self {
        Self::new(shape, BodyKind::Dynamic, position, mass)
    }

    pub fn kinematic(shape: CollisionShape, position: Vec3) -> Self {
        Self::new(shape, BodyKind::Kinematic, position, 0.0)
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic && self.mass > 0.0
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    pub fn world_aabb(&self) -> AABB {
        aabb_transformed(&self.shape.local_aabb(), self.orientation, self.position)
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.orientation * local + self.position
    }

    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.orientation.inverse() * (world - self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::box_mesh;

    #[test]
    fn test_local_to_world_round_trip() {
        let mut body = RigidBody::dynamic(CollisionShape::Sphere { radius: 1.0 }, Vec3::new(1.0, 2.0, 3.0), 1.0);
        body.orientation = Quat::from_rotation_z(0.7);
        let p = Vec3::new(0.3, -0.2, 4.0);
        assert!((body.to_local(body.to_world(p)) - p).length() < 1e-5);
    }

    #[test]
    fn test_hull_bounds() {
        let mesh = Arc::new(box_mesh(Vec3::new(2.0, 4.0, 2.0)));
        let shape = CollisionShape::ConvexHull { mesh };
        let aabb = shape.local_aabb();
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 1.0));
        assert!((shape.bounding_radius() - 6.0f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_massless_dynamic_is_not_integrated() {
        let body = RigidBody::dynamic(CollisionShape::Sphere { radius: 1.0 }, Vec3::ZERO, 0.0);
        assert!(!body.is_dynamic());
    }
}
