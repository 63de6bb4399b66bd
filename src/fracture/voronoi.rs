//! Voronoi fracture of a convex mesh.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::clip::{ConvexPolyhedron, Plane};
use crate::error::{DemoError, DemoResult};
use crate::mesh::TriangleMesh;

/// Cells below this share of the source volume are dropped
const MIN_VOLUME_FRACTION: f32 = 1e-5;
const SITE_WELD_DISTANCE: f32 = 1e-4;

/// One Voronoi cell, recentred so its volume centroid is the origin
#[derive(Debug, Clone)]
pub struct FragmentMesh {
    pub mesh: TriangleMesh,
    /// Centroid in the source mesh's local space
    pub centroid: Vec3,
}

/// Split a convex mesh into Voronoi cells.
///
/// A concave or inward-wound source is rejected with [`DemoError::Fracture`].
/// With `seeds`, every seed is a site and `cells` is ignored. Without, `cells`
/// sites are drawn uniformly inside the mesh bounds, reproducibly when
/// `rng_seed` is given. Cells that clip to nothing are dropped.
pub fn voronoi_fracture(
    mesh: &TriangleMesh,
    cells: usize,
    seeds: Option<&[Vec3]>,
    rng_seed: Option<u64>,
) -> DemoResult<Vec<FragmentMesh>> {
    let bounds = mesh
        .bounds()
        .filter(|_| !mesh.is_empty())
        .ok_or_else(|| DemoError::Fracture("source mesh is empty".to_string()))?;

    let sites = match seeds {
        Some(seeds) => seeds.to_vec(),
        None => {
            if cells == 0 {
                return Err(DemoError::Fracture("cell count must be at least 1".to_string()));
            }
            let mut rng = match rng_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            (0..cells)
                .map(|_| {
                    Vec3::new(
                        rng.gen_range(bounds.min.x..=bounds.max.x),
                        rng.gen_range(bounds.min.y..=bounds.max.y),
                        rng.gen_range(bounds.min.z..=bounds.max.z),
                    )
                })
                .collect()
        }
    };
    let sites = weld_sites(sites);
    if sites.is_empty() {
        return Err(DemoError::Fracture("no fracture sites".to_string()));
    }

    let source = ConvexPolyhedron::try_from_mesh(mesh)?;
    let min_volume = mesh.volume() * MIN_VOLUME_FRACTION;

    let fragments: Vec<FragmentMesh> = sites
        .par_iter()
        .enumerate()
        .filter_map(|(i, site)| voronoi_cell(&source, &sites, i, *site, min_volume))
        .collect();

    if fragments.is_empty() {
        return Err(DemoError::Fracture(format!(
            "{} sites produced no fragment",
            sites.len()
        )));
    }

    log::info!(
        "[Fracture] {} sites -> {} fragments",
        sites.len(),
        fragments.len()
    );
    Ok(fragments)
}

fn voronoi_cell(
    source: &ConvexPolyhedron,
    sites: &[Vec3],
    index: usize,
    site: Vec3,
    min_volume: f32,
) -> Option<FragmentMesh> {
    let mut cell = source.clone();
    for (j, other) in sites.iter().enumerate() {
        if j == index {
            continue;
        }
        if let Some(plane) = Plane::bisector(site, *other) {
            cell = cell.clip(&plane);
            if cell.is_empty() {
                return None;
            }
        }
    }

    let mesh = cell.to_mesh();
    let volume = mesh.signed_volume();
    if volume <= min_volume {
        log::trace!("[Fracture] Dropped degenerate cell {} (volume {})", index, volume);
        return None;
    }

    let centroid = mesh.centroid();
    Some(FragmentMesh {
        mesh: mesh.translated(-centroid),
        centroid,
    })
}

/// Drop sites that coincide with an earlier one
fn weld_sites(sites: Vec<Vec3>) -> Vec<Vec3> {
    let mut unique: Vec<Vec3> = Vec::with_capacity(sites.len());
    for site in sites {
        if !site.is_finite() {
            continue;
        }
        if unique.iter().all(|u| u.distance(site) > SITE_WELD_DISTANCE) {
            unique.push(site);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::box_mesh;

    #[test]
    fn test_single_cell_is_whole_solid() {
        let source = box_mesh(Vec3::new(4.0, 2.0, 6.0));
        let fragments = voronoi_fracture(&source, 1, None, Some(3)).expect("fracture");

        assert_eq!(fragments.len(), 1);
        assert!((fragments[0].mesh.volume() - source.volume()).abs() < 1e-3);
        assert!(fragments[0].centroid.length() < 1e-4);
    }

    #[test]
    fn test_given_seeds_split_along_bisector() {
        let source = box_mesh(Vec3::splat(2.0));
        let seeds = [Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)];
        let fragments = voronoi_fracture(&source, 99, Some(&seeds), None).expect("fracture");

        assert_eq!(fragments.len(), 2);
        for fragment in &fragments {
            assert!((fragment.mesh.volume() - 4.0).abs() < 1e-4);
        }
        assert!((fragments[0].centroid.x + 0.5).abs() < 1e-4);
        assert!((fragments[1].centroid.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_seeded_fracture_is_reproducible() {
        let source = box_mesh(Vec3::splat(10.0));
        let a = voronoi_fracture(&source, 8, None, Some(42)).expect("fracture");
        let b = voronoi_fracture(&source, 8, None, Some(42)).expect("fracture");

        assert_eq!(a.len(), b.len());
        for (fa, fb) in a.iter().zip(&b) {
            assert_eq!(fa.centroid, fb.centroid);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let source = box_mesh(Vec3::ONE);
        assert!(matches!(
            voronoi_fracture(&source, 0, None, None),
            Err(DemoError::Fracture(_))
        ));
        assert!(matches!(
            voronoi_fracture(&TriangleMesh::new(), 4, None, None),
            Err(DemoError::Fracture(_))
        ));
        assert!(matches!(
            voronoi_fracture(&source, 4, Some(&[]), None),
            Err(DemoError::Fracture(_))
        ));
    }

    #[test]
    fn test_concave_source_is_rejected() {
        let lower = box_mesh(Vec3::ONE);
        let upper = lower.translated(Vec3::new(1.0, 1.0, 0.0));
        let triangles: Vec<[Vec3; 3]> = lower.triangles().chain(upper.triangles()).collect();
        let source = TriangleMesh::from_triangles(&triangles);

        assert!(matches!(
            voronoi_fracture(&source, 4, None, Some(1)),
            Err(DemoError::Fracture(_))
        ));
    }

    #[test]
    fn test_duplicate_seeds_are_welded() {
        let source = box_mesh(Vec3::splat(2.0));
        let seeds = [Vec3::ZERO, Vec3::ZERO];
        let fragments = voronoi_fracture(&source, 2, Some(&seeds), None).expect("fracture");
        assert_eq!(fragments.len(), 1);
        assert!((fragments[0].mesh.volume() - 8.0).abs() < 1e-4);
    }
}
