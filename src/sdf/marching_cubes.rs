//! CPU marching cubes over a sampled lattice.
//!
//! Used to build the terrain's physics proxy. The render path does the same
//! triangulation in the geometry stage on the GPU.

use glam::Vec3;

use super::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::mesh::TriangleMesh;

/// How vertex normals are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalMode {
    /// One face normal per triangle
    Flat,
    /// Interpolated field gradient ("expensive normals")
    Smooth,
}

/// A lattice of density samples, x fastest then y then z
#[derive(Debug, Clone)]
pub struct SampledLattice<'a> {
    pub samples: &'a [f32],
    pub dims: [usize; 3],
    pub origin: Vec3,
    pub spacing: f32,
}

impl SampledLattice<'_> {
    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.dims[0] + z * self.dims[0] * self.dims[1]
    }

    #[inline]
    fn value(&self, x: usize, y: usize, z: usize) -> f32 {
        self.samples[self.index(x, y, z)]
    }

    fn position(&self, x: usize, y: usize, z: usize) -> Vec3 {
        self.origin + Vec3::new(x as f32, y as f32, z as f32) * self.spacing
    }

    /// Finite-difference gradient at a lattice point, one-sided at the border
    fn gradient(&self, x: usize, y: usize, z: usize) -> Vec3 {
        let axis = |i: usize, n: usize, at: &dyn Fn(usize) -> f32| -> f32 {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(n - 1);
            if hi == lo {
                return 0.0;
            }
            (at(hi) - at(lo)) / ((hi - lo) as f32 * self.spacing)
        };
        Vec3::new(
            axis(x, self.dims[0], &|i| self.value(i, y, z)),
            axis(y, self.dims[1], &|i| self.value(x, i, z)),
            axis(z, self.dims[2], &|i| self.value(x, y, i)),
        )
    }
}

#[inline]
fn interpolate(p0: Vec3, p1: Vec3, v0: f32, v1: f32, iso: f32) -> (Vec3, f32) {
    let denom = v1 - v0;
    let t = if denom.abs() < f32::EPSILON {
        0.5
    } else {
        ((iso - v0) / denom).clamp(0.0, 1.0)
    };
    (p0 + (p1 - p0) * t, t)
}

/// Triangulate the `iso` level set of a sampled lattice.
///
/// Triangles are wound counter-clockwise seen from outside the solid, so a
/// closed surface has positive signed volume.
pub fn extract(lattice: &SampledLattice, iso: f32, normals: NormalMode) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let [nx, ny, nz] = lattice.dims;
    if nx < 2 || ny < 2 || nz < 2 || lattice.samples.len() < nx * ny * nz {
        return mesh;
    }

    for z in 0..nz - 1 {
        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                polygonise_cell(lattice, [x, y, z], iso, normals, &mut mesh);
            }
        }
    }

    log::trace!(
        "[marching_cubes] {}x{}x{} lattice -> {} triangles",
        nx,
        ny,
        nz,
        mesh.triangle_count()
    );
    mesh
}

fn polygonise_cell(
    lattice: &SampledLattice,
    cell: [usize; 3],
    iso: f32,
    normals: NormalMode,
    mesh: &mut TriangleMesh,
) {
    let mut values = [0.0f32; 8];
    let mut corners = [[0usize; 3]; 8];
    let mut case_index = 0usize;
    for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
        let c = [cell[0] + offset[0], cell[1] + offset[1], cell[2] + offset[2]];
        corners[i] = c;
        values[i] = lattice.value(c[0], c[1], c[2]);
        if values[i] < iso {
            case_index |= 1 << i;
        }
    }

    let edge_mask = EDGE_TABLE[case_index];
    if edge_mask == 0 {
        return;
    }

    let mut edge_points = [Vec3::ZERO; 12];
    let mut edge_normals = [Vec3::ZERO; 12];
    for (edge, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
        if edge_mask & (1 << edge) == 0 {
            continue;
        }
        let (ca, cb) = (corners[a], corners[b]);
        let (point, t) = interpolate(
            lattice.position(ca[0], ca[1], ca[2]),
            lattice.position(cb[0], cb[1], cb[2]),
            values[a],
            values[b],
            iso,
        );
        edge_points[edge] = point;
        if normals == NormalMode::Smooth {
            let ga = lattice.gradient(ca[0], ca[1], ca[2]);
            let gb = lattice.gradient(cb[0], cb[1], cb[2]);
            edge_normals[edge] = ga.lerp(gb, t).normalize_or_zero();
        }
    }

    let tris = &TRI_TABLE[case_index];
    for tri in tris.chunks_exact(3) {
        if tri[0] < 0 {
            break;
        }
        // Table winding faces the inside; swap to face out
        let (e0, e1, e2) = (tri[0] as usize, tri[2] as usize, tri[1] as usize);
        let (a, b, c) = (edge_points[e0], edge_points[e1], edge_points[e2]);
        mesh.push_triangle(a, b, c);
        match normals {
            NormalMode::Flat => {
                let n = (b - a).cross(c - a).normalize_or_zero();
                mesh.normals.extend_from_slice(&[n, n, n]);
            }
            NormalMode::Smooth => {
                mesh.normals
                    .extend_from_slice(&[edge_normals[e0], edge_normals[e1], edge_normals[e2]]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::{BaseField, DensityField};

    fn sample_field(field: &DensityField, dims: [usize; 3], origin: Vec3, spacing: f32) -> Vec<f32> {
        let mut samples = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    let p = origin + Vec3::new(x as f32, y as f32, z as f32) * spacing;
                    samples.push(field.sample(p));
                }
            }
        }
        samples
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mut field = DensityField::new(BaseField::Empty);
        field.add_sphere(Vec3::ZERO, 4.0);
        let dims = [21, 21, 21];
        let origin = Vec3::splat(-5.0);
        let samples = sample_field(&field, dims, origin, 0.5);
        let lattice = SampledLattice {
            samples: &samples,
            dims,
            origin,
            spacing: 0.5,
        };

        let mesh = extract(&lattice, 0.0, NormalMode::Flat);
        let expected = 4.0 / 3.0 * std::f32::consts::PI * 64.0;
        let volume = mesh.signed_volume();
        assert!(volume > 0.0, "winding must face outward");
        assert!((volume - expected).abs() / expected < 0.05, "volume {volume} vs {expected}");
    }

    #[test]
    fn test_smooth_normals_follow_gradient() {
        let mut field = DensityField::new(BaseField::Empty);
        field.add_sphere(Vec3::ZERO, 3.0);
        let dims = [17, 17, 17];
        let origin = Vec3::splat(-4.0);
        let samples = sample_field(&field, dims, origin, 0.5);
        let lattice = SampledLattice {
            samples: &samples,
            dims,
            origin,
            spacing: 0.5,
        };

        let mesh = extract(&lattice, 0.0, NormalMode::Smooth);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!(p.normalize().dot(*n) > 0.9);
        }
    }

    #[test]
    fn test_uniform_field_produces_nothing() {
        let samples = vec![1.0; 27];
        let lattice = SampledLattice {
            samples: &samples,
            dims: [3, 3, 3],
            origin: Vec3::ZERO,
            spacing: 1.0,
        };
        assert!(extract(&lattice, 0.0, NormalMode::Flat).is_empty());
    }

    #[test]
    fn test_degenerate_lattice_is_empty() {
        let samples = vec![-1.0, 1.0];
        let lattice = SampledLattice {
            samples: &samples,
            dims: [2, 1, 1],
            origin: Vec3::ZERO,
            spacing: 1.0,
        };
        assert!(extract(&lattice, 0.0, NormalMode::Flat).is_empty());
    }
}
