//! Convex polyhedron clipping by half-spaces.

use glam::Vec3;

use crate::error::{DemoError, DemoResult};
use crate::mesh::TriangleMesh;

/// Points closer than this are merged when building cap polygons
const WELD_EPSILON: f32 = 1e-5;
/// Allowed vertex overshoot past a face plane, relative to the mesh extent
const CONVEXITY_TOLERANCE: f32 = 1e-4;

/// Half-space `normal . p <= offset`; `normal` is unit length and points out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Plane {
    /// Bisector keeping the side closer to `keep` than to `other`.
    ///
    /// `None` when the two sites coincide.
    pub fn bisector(keep: Vec3, other: Vec3) -> Option<Self> {
        let delta = other - keep;
        let length = delta.length();
        if length <= WELD_EPSILON {
            return None;
        }
        let midpoint = (keep + other) * 0.5;
        let normal = delta / length;
        Some(Self {
            normal,
            offset: normal.dot(midpoint),
        })
    }

    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.offset
    }
}

/// Convex polyhedron as outward-wound faces
#[derive(Debug, Clone, Default)]
pub struct ConvexPolyhedron {
    pub faces: Vec<Vec<Vec3>>,
}

impl ConvexPolyhedron {
    /// Faces of `mesh` taken as is. The mesh must be convex and wound outwards.
    pub fn from_mesh(mesh: &TriangleMesh) -> Self {
        Self {
            faces: mesh.triangles().map(|t| t.to_vec()).collect(),
        }
    }

    /// Like [`Self::from_mesh`], but rejects a mesh with a vertex in front of
    /// any of its face planes (concave, or wound inwards).
    pub fn try_from_mesh(mesh: &TriangleMesh) -> DemoResult<Self> {
        let extent = mesh
            .bounds()
            .map_or(0.0, |b| (b.max - b.min).length());
        let tolerance = extent * CONVEXITY_TOLERANCE;

        for (face, tri) in mesh.triangles().enumerate() {
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
            if normal.length_squared() <= f32::EPSILON * extent * extent {
                continue;
            }
            let plane = Plane {
                normal: normal.normalize(),
                offset: normal.normalize().dot(tri[0]),
            };
            if let Some(p) = mesh.positions.iter().find(|p| plane.distance(**p) > tolerance) {
                return Err(DemoError::Fracture(format!(
                    "source mesh is not convex: vertex {:?} lies in front of face {}",
                    p, face
                )));
            }
        }
        Ok(Self::from_mesh(mesh))
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Keep the part inside `plane` and close the cut with a cap face
    pub fn clip(&self, plane: &Plane) -> Self {
        let mut faces = Vec::with_capacity(self.faces.len() + 1);
        let mut cut_points = Vec::new();
        // A face already lying in the plane closes the cut
        let mut closed = false;

        for face in &self.faces {
            if face.iter().all(|p| plane.distance(*p).abs() <= WELD_EPSILON) {
                closed = true;
            }
            let clipped = clip_polygon(face, plane, &mut cut_points);
            if clipped.len() >= 3 {
                faces.push(clipped);
            }
        }

        if !closed {
            if let Some(cap) = cap_polygon(&cut_points, plane.normal) {
                faces.push(cap);
            }
        }
        Self { faces }
    }

    pub fn to_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for face in &self.faces {
            for i in 1..face.len() - 1 {
                mesh.push_triangle(face[0], face[i], face[i + 1]);
            }
        }
        mesh.recompute_normals();
        mesh
    }
}

/// Sutherland-Hodgman against a single plane; crossing points go to `cut_points`
fn clip_polygon(polygon: &[Vec3], plane: &Plane, cut_points: &mut Vec<Vec3>) -> Vec<Vec3> {
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let da = plane.distance(a);
        let db = plane.distance(b);

        if da <= 0.0 {
            out.push(a);
            if da.abs() <= WELD_EPSILON {
                cut_points.push(a);
            }
        }
        if (da < 0.0 && db > 0.0) || (da > 0.0 && db < 0.0) {
            let t = da / (da - db);
            let p = a + (b - a) * t;
            out.push(p);
            cut_points.push(p);
        }
    }
    out
}

/// Order the cut points around their centroid, wound to face along `normal`
fn cap_polygon(points: &[Vec3], normal: Vec3) -> Option<Vec<Vec3>> {
    let mut unique: Vec<Vec3> = Vec::with_capacity(points.len());
    for p in points {
        if !unique.iter().any(|q| q.distance_squared(*p) <= WELD_EPSILON * WELD_EPSILON) {
            unique.push(*p);
        }
    }
    if unique.len() < 3 {
        return None;
    }

    let center = unique.iter().copied().sum::<Vec3>() / unique.len() as f32;
    let u = normal.any_orthonormal_vector();
    let v = normal.cross(u);
    let angle = |p: &Vec3| {
        let d = *p - center;
        d.dot(v).atan2(d.dot(u))
    };
    unique.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
    Some(unique)
}
