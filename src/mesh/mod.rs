//! Triangle meshes shared by terrain extraction, fracture and physics shapes.

use glam::Vec3;

/// Indexed triangle mesh. `normals` is either empty or one per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
}

/// Axis-aligned bounds of a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw triangles, one position per corner
    pub fn from_triangles(triangles: &[[Vec3; 3]]) -> Self {
        let mut mesh = Self::new();
        for tri in triangles {
            mesh.push_triangle(tri[0], tri[1], tri[2]);
        }
        mesh
    }

    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&[a, b, c]);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Bounds { min, max })
    }

    /// Enclosed volume via the divergence theorem. Positive for outward winding.
    pub fn signed_volume(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| a.dot(b.cross(c)) / 6.0)
            .sum()
    }

    pub fn volume(&self) -> f32 {
        self.signed_volume().abs()
    }

    /// Volume centroid of a closed mesh; falls back to the vertex average
    /// when the enclosed volume vanishes.
    pub fn centroid(&self) -> Vec3 {
        let mut weighted = Vec3::ZERO;
        let mut total = 0.0;
        for [a, b, c] in self.triangles() {
            let v = a.dot(b.cross(c)) / 6.0;
            weighted += (a + b + c) * (v / 4.0);
            total += v;
        }
        if total.abs() > f32::EPSILON {
            weighted / total
        } else if self.positions.is_empty() {
            Vec3::ZERO
        } else {
            self.positions.iter().copied().sum::<Vec3>() / self.positions.len() as f32
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            positions: self.positions.iter().map(|p| *p + offset).collect(),
            indices: self.indices.clone(),
            normals: self.normals.clone(),
        }
    }

    /// Per-vertex normals. Shared vertices get area-weighted averages.
    pub fn recompute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            );
            let n = (b - a).cross(c - a);
            for &i in tri {
                normals[i as usize] += n;
            }
        }
        self.normals = normals.into_iter().map(|n| n.normalize_or_zero()).collect();
    }

    /// Unique undirected edges, for wireframe drawing
    pub fn wireframe_edges(&self) -> Vec<(Vec3, Vec3)> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut edges = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (i, j) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = if i < j { (i, j) } else { (j, i) };
                if seen.insert(key) {
                    edges.push((self.positions[i as usize], self.positions[j as usize]));
                }
            }
        }
        edges
    }
}

/// Closed box centred at the origin, outward winding
pub fn box_mesh(size: Vec3) -> TriangleMesh {
    let h = size * 0.5;
    let corners = [
        Vec3::new(-h.x, -h.y, -h.z),
        Vec3::new(h.x, -h.y, -h.z),
        Vec3::new(h.x, h.y, -h.z),
        Vec3::new(-h.x, h.y, -h.z),
        Vec3::new(-h.x, -h.y, h.z),
        Vec3::new(h.x, -h.y, h.z),
        Vec3::new(h.x, h.y, h.z),
        Vec3::new(-h.x, h.y, h.z),
    ];
    // Quads listed counter-clockwise seen from outside
    const FACES: [[u32; 4]; 6] = [
        [0, 3, 2, 1], // -z
        [4, 5, 6, 7], // +z
        [0, 1, 5, 4], // -y
        [3, 7, 6, 2], // +y
        [0, 4, 7, 3], // -x
        [1, 2, 6, 5], // +x
    ];
    let mut indices = Vec::with_capacity(36);
    for [a, b, c, d] in FACES {
        indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    let mut mesh = TriangleMesh {
        positions: corners.to_vec(),
        indices,
        normals: Vec::new(),
    };
    mesh.recompute_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_volume_and_winding() {
        let mesh = box_mesh(Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(mesh.triangle_count(), 12);
        assert!((mesh.signed_volume() - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_centroid_of_offset_box() {
        let mesh = box_mesh(Vec3::new(2.0, 4.0, 6.0)).translated(Vec3::new(1.0, -2.0, 3.0));
        let c = mesh.centroid();
        assert!((c - Vec3::new(1.0, -2.0, 3.0)).length() < 1e-4);
    }

    #[test]
    fn test_box_has_twelve_edges_plus_diagonals() {
        let mesh = box_mesh(Vec3::ONE);
        // 12 box edges + 6 face diagonals
        assert_eq!(mesh.wireframe_edges().len(), 18);
    }

    #[test]
    fn test_bounds() {
        let mesh = box_mesh(Vec3::new(2.0, 2.0, 2.0));
        let bounds = mesh.bounds().expect("non-empty");
        assert_eq!(bounds.min, Vec3::splat(-1.0));
        assert_eq!(bounds.max, Vec3::splat(1.0));
        assert!(TriangleMesh::new().bounds().is_none());
    }
}
