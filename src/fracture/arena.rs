//! Owning store for fracture fragments and their physics bodies.

use std::sync::Arc;

use crate::error::{DemoError, DemoResult};
use crate::mesh::TriangleMesh;
use crate::physics::{BodyId, CollisionShape, PhysicsWorld, RigidBody};

use super::voronoi::FragmentMesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(pub usize);

/// A fragment mesh paired with the body simulating it
#[derive(Debug, Clone)]
pub struct Fragment {
    pub mesh: Arc<TriangleMesh>,
    pub body: BodyId,
}

#[derive(Debug, Default)]
pub struct FragmentArena {
    fragments: Vec<Fragment>,
}

impl FragmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one convex-hull body per fragment in place of `source`.
    ///
    /// Fragments inherit the source transform and velocities; mass is split by
    /// volume. The source body itself is left in the world.
    pub fn spawn_from(
        &mut self,
        world: &mut PhysicsWorld,
        source: BodyId,
        fragments: Vec<FragmentMesh>,
    ) -> DemoResult<Vec<FragmentId>> {
        if fragments.is_empty() {
            return Err(DemoError::Fracture("nothing to spawn".to_string()));
        }
        let parent = world.try_body(source)?.clone();
        let total_volume: f32 = fragments.iter().map(|f| f.mesh.volume()).sum();

        let mut ids = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let mass = if parent.mass > 0.0 && total_volume > 0.0 {
                parent.mass * fragment.mesh.volume() / total_volume
            } else {
                1.0
            };
            let mesh = Arc::new(fragment.mesh);
            let mut body = RigidBody::dynamic(
                CollisionShape::ConvexHull { mesh: mesh.clone() },
                parent.to_world(fragment.centroid),
                mass,
            );
            body.orientation = parent.orientation;
            body.linear_velocity = parent.linear_velocity;
            body.angular_velocity = parent.angular_velocity;
            body.restitution = parent.restitution;
            body.friction = parent.friction;

            let body = world.add_body(body);
            ids.push(FragmentId(self.fragments.len()));
            self.fragments.push(Fragment { mesh, body });
        }

        log::info!(
            "[FragmentArena] Spawned {} fragments from {}",
            ids.len(),
            source
        );
        Ok(ids)
    }

    /// Remove every fragment body from the world and drop the meshes
    pub fn clear(&mut self, world: &mut PhysicsWorld) {
        for fragment in self.fragments.drain(..) {
            if world.remove_body(fragment.body).is_none() {
                log::warn!("[FragmentArena] {} was already gone", fragment.body);
            }
        }
    }

    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FragmentId, &Fragment)> {
        self.fragments
            .iter()
            .enumerate()
            .map(|(i, f)| (FragmentId(i), f))
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::fracture::voronoi_fracture;
    use crate::mesh::box_mesh;

    #[test]
    fn test_spawn_places_fragments_around_source() {
        let mut world = PhysicsWorld::default();
        let source_mesh = box_mesh(Vec3::splat(2.0));
        let mut source = RigidBody::dynamic(
            CollisionShape::Box {
                half_extents: Vec3::ONE,
            },
            Vec3::new(0.0, 10.0, 0.0),
            4.0,
        );
        source.linear_velocity = Vec3::new(1.0, 0.0, 0.0);
        let source = world.add_body(source);

        let seeds = [Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)];
        let pieces = voronoi_fracture(&source_mesh, 2, Some(&seeds), None).expect("fracture");

        let mut arena = FragmentArena::new();
        let ids = arena.spawn_from(&mut world, source, pieces).expect("spawn");

        assert_eq!(ids.len(), 2);
        assert_eq!(world.body_count(), 3);
        for (_, fragment) in arena.iter() {
            let body = world.body(fragment.body).expect("fragment body");
            assert!((body.mass - 2.0).abs() < 1e-4);
            assert!((body.position.y - 10.0).abs() < 1e-4);
            assert_eq!(body.linear_velocity, Vec3::new(1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_clear_releases_bodies() {
        let mut world = PhysicsWorld::default();
        let source = world.add_body(RigidBody::dynamic(
            CollisionShape::Box {
                half_extents: Vec3::splat(5.0),
            },
            Vec3::ZERO,
            1.0,
        ));
        let pieces =
            voronoi_fracture(&box_mesh(Vec3::splat(10.0)), 4, None, Some(1)).expect("fracture");

        let mut arena = FragmentArena::new();
        let count = arena.spawn_from(&mut world, source, pieces).expect("spawn").len();
        assert_eq!(world.body_count(), 1 + count);

        arena.clear(&mut world);
        assert!(arena.is_empty());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_spawn_from_missing_source() {
        let mut world = PhysicsWorld::default();
        let pieces = voronoi_fracture(&box_mesh(Vec3::ONE), 1, None, Some(0)).expect("fracture");
        let err = FragmentArena::new()
            .spawn_from(&mut world, BodyId(77), pieces)
            .unwrap_err();
        assert!(matches!(err, DemoError::ResourceNotFound { .. }));
    }
}
