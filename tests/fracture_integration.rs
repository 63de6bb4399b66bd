// Voronoi fracture integration tests
//
// Volume conservation of the fracture and body bookkeeping of the fragment arena.

use density_destruction::fracture::FragmentArena;
use density_destruction::{box_mesh, voronoi_fracture, CollisionShape, PhysicsWorld, RigidBody, TriangleMesh};
use glam::Vec3;

/// Regular octahedron with outward winding
fn octahedron(r: f32) -> TriangleMesh {
    let (px, nx) = (Vec3::X * r, -Vec3::X * r);
    let (py, ny) = (Vec3::Y * r, -Vec3::Y * r);
    let (pz, nz) = (Vec3::Z * r, -Vec3::Z * r);
    TriangleMesh::from_triangles(&[
        [px, py, pz],
        [pz, py, nx],
        [nx, py, nz],
        [nz, py, px],
        [px, pz, ny],
        [pz, nx, ny],
        [nx, nz, ny],
        [nz, px, ny],
    ])
}

#[test]
fn test_single_cell_keeps_convex_solid() {
    for source in [box_mesh(Vec3::new(3.0, 5.0, 2.0)), octahedron(2.0)] {
        let fragments = voronoi_fracture(&source, 1, None, Some(11)).expect("fracture");
        assert_eq!(fragments.len(), 1);
        let expected = source.volume();
        assert!(expected > 0.0);
        assert!((fragments[0].mesh.volume() - expected).abs() < expected * 1e-4);
    }
}

#[test]
fn test_sixteen_cells_partition_the_box() {
    let source = box_mesh(Vec3::splat(10.0));
    for seed in [1, 2, 3] {
        let fragments = voronoi_fracture(&source, 16, None, Some(seed)).expect("fracture");
        assert!((1..=16).contains(&fragments.len()));

        let total: f32 = fragments.iter().map(|f| f.mesh.volume()).sum();
        assert!((total - 1000.0).abs() < 1.0, "seed {} total volume {}", seed, total);

        for fragment in &fragments {
            assert!(fragment.mesh.signed_volume() > 0.0);
            assert!(fragment.mesh.centroid().length() < 1e-2);
        }
    }
}

#[test]
fn test_fragments_stay_inside_source_bounds() {
    let source = box_mesh(Vec3::splat(10.0));
    let fragments = voronoi_fracture(&source, 8, None, Some(7)).expect("fracture");
    for fragment in &fragments {
        let bounds = fragment.mesh.bounds().expect("non-empty fragment");
        let min = bounds.min + fragment.centroid;
        let max = bounds.max + fragment.centroid;
        assert!(min.cmpge(Vec3::splat(-5.001)).all());
        assert!(max.cmple(Vec3::splat(5.001)).all());
    }
}

#[test]
fn test_arena_clear_releases_every_body() {
    let mut world = PhysicsWorld::default();
    let source = world.add_body(RigidBody::dynamic(
        CollisionShape::Box {
            half_extents: Vec3::splat(5.0),
        },
        Vec3::new(0.0, 50.0, 0.0),
        1.0,
    ));
    let pieces = voronoi_fracture(&box_mesh(Vec3::splat(10.0)), 16, None, Some(5)).expect("fracture");
    let count = pieces.len();

    let mut arena = FragmentArena::new();
    arena.spawn_from(&mut world, source, pieces).expect("spawn");
    let bodies: Vec<_> = arena.iter().map(|(_, f)| f.body).collect();
    assert_eq!(bodies.len(), count);
    assert!(bodies.iter().all(|id| world.contains(*id)));

    let total_mass: f32 = bodies
        .iter()
        .filter_map(|id| world.body(*id))
        .map(|b| b.mass)
        .sum();
    assert!((total_mass - 1.0).abs() < 1e-3);

    arena.clear(&mut world);
    assert!(arena.is_empty());
    assert!(bodies.iter().all(|id| !world.contains(*id)));
    assert!(world.contains(source));
}
