//! Wireframe extraction for the physics debug pass

use glam::{Quat, Vec3};

use super::body::{CollisionShape, RigidBody};
use super::world::PhysicsWorld;

const SPHERE_SEGMENTS: usize = 16;

/// A world-space line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
}

/// Wireframe of every body in the world, in creation order
pub fn world_wireframe(world: &PhysicsWorld) -> Vec<DebugLine> {
    let mut lines = Vec::new();
    for (_, body) in world.bodies() {
        body_wireframe(body, &mut lines);
    }
    lines
}

pub fn body_wireframe(body: &RigidBody, out: &mut Vec<DebugLine>) {
    match &body.shape {
        CollisionShape::Sphere { radius } => {
            // One ring per principal plane
            let rings = [
                Quat::IDENTITY,
                Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ];
            for axis in rings {
                for i in 0..SPHERE_SEGMENTS {
                    let a0 = i as f32 / SPHERE_SEGMENTS as f32 * std::f32::consts::TAU;
                    let a1 = (i + 1) as f32 / SPHERE_SEGMENTS as f32 * std::f32::consts::TAU;
                    let p0 = axis * Vec3::new(a0.cos(), a0.sin(), 0.0) * *radius;
                    let p1 = axis * Vec3::new(a1.cos(), a1.sin(), 0.0) * *radius;
                    push_line(out, body, p0, p1);
                }
            }
        }
        CollisionShape::Box { half_extents } => {
            let h = *half_extents;
            let corner = |i: usize| {
                Vec3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            };
            for i in 0..8 {
                for bit in [1, 2, 4] {
                    if i & bit == 0 {
                        push_line(out, body, corner(i), corner(i | bit));
                    }
                }
            }
        }
        CollisionShape::ConvexHull { mesh } | CollisionShape::TriangleMesh { mesh } => {
            for (a, b) in mesh.wireframe_edges() {
                push_line(out, body, a, b);
            }
        }
    }
}

fn push_line(out: &mut Vec<DebugLine>, body: &RigidBody, a: Vec3, b: Vec3) {
    out.push(DebugLine {
        start: body.to_world(a),
        end: body.to_world(b),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_has_twelve_edges() {
        let body = RigidBody::dynamic(
            CollisionShape::Box {
                half_extents: Vec3::splat(5.0),
            },
            Vec3::new(0.0, 10.0, 0.0),
            1.0,
        );
        let mut lines = Vec::new();
        body_wireframe(&body, &mut lines);
        assert_eq!(lines.len(), 12);
        for line in &lines {
            assert!(((line.start - line.end).length() - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_rings_lie_on_surface() {
        let body = RigidBody::dynamic(CollisionShape::Sphere { radius: 2.0 }, Vec3::ONE, 1.0);
        let mut lines = Vec::new();
        body_wireframe(&body, &mut lines);
        assert_eq!(lines.len(), 3 * SPHERE_SEGMENTS);
        for line in &lines {
            assert!(((line.start - Vec3::ONE).length() - 2.0).abs() < 1e-4);
        }
    }
}
