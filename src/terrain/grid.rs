//! Grid-based marching-cubes terrain.
//!
//! A lattice of points travels with the camera. The GPU geometry stage
//! samples the density field around each point and emits triangles; the CPU
//! side only keeps the lattice, the edit log and the physics proxy mesh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec3;
use rayon::prelude::*;

use crate::config::ShaderSettings;
use crate::error::{DemoError, DemoResult};
use crate::mesh::TriangleMesh;
use crate::physics::{BodyId, CollisionShape, PhysicsWorld, RigidBody};
use crate::renderer::{
    DrawCommand, DrawList, DrawPass, GridUniforms, ShaderProgram, TriTableBlock,
};
use crate::sdf::{extract, DensityField, NormalMode, SampledLattice, SURFACE_THRESHOLD};

static NEXT_LATTICE_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identity of one allocated lattice; every rebuild gets a fresh handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeHandle(pub u64);

impl LatticeHandle {
    fn next() -> Self {
        Self(NEXT_LATTICE_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Local lattice points, centred on the origin, x fastest then y then z
#[derive(Debug, Clone)]
pub struct GridLattice {
    pub handle: LatticeHandle,
    pub dimensions: [usize; 3],
    pub point_scale: f32,
    pub points: Vec<Vec3>,
}

impl GridLattice {
    fn build(dimensions: [usize; 3], point_scale: f32) -> Self {
        let [nx, ny, nz] = dimensions;
        let half = Vec3::new(
            (nx - 1) as f32,
            (ny - 1) as f32,
            (nz - 1) as f32,
        ) * point_scale
            * 0.5;

        let mut points = Vec::with_capacity(nx * ny * nz);
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    points.push(Vec3::new(x as f32, y as f32, z as f32) * point_scale - half);
                }
            }
        }

        Self {
            handle: LatticeHandle::next(),
            dimensions,
            point_scale,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub struct GridTerrain {
    /// Gradient normals instead of face normals
    pub expensive_normals: bool,
    /// Re-extract the physics mesh on the next update
    pub update_physics_mesh: bool,
    /// Keep the physics proxy but skip drawing
    pub physics_only: bool,
    time: f32,
    offset: Vec3,
    lattice: GridLattice,
    field: DensityField,
    physics_mesh: Option<BodyId>,
    physics_triangles: usize,
    program: Option<ShaderProgram>,
    tri_table: Arc<TriTableBlock>,
}

impl GridTerrain {
    pub const DEFAULT_DIMENSION: usize = 16;
    /// Largest lattice accepted by `rebuild` (256^3 points)
    pub const MAX_LATTICE_POINTS: usize = 1 << 24;

    pub fn new(field: DensityField) -> Self {
        let dims = [Self::DEFAULT_DIMENSION; 3];
        Self {
            expensive_normals: false,
            update_physics_mesh: false,
            physics_only: false,
            time: 0.0,
            offset: Vec3::ZERO,
            lattice: GridLattice::build(dims, 1.0),
            field,
            physics_mesh: None,
            physics_triangles: 0,
            program: None,
            tri_table: Arc::new(TriTableBlock::bourke()),
        }
    }

    /// Terrain drawn with the grid program from `shaders`. A program that
    /// fails to load is logged and the terrain is kept without one.
    pub fn with_shaders(field: DensityField, shaders: &ShaderSettings) -> Self {
        let mut terrain = Self::new(field);
        terrain.program = ShaderProgram::load_or_warn(
            "GridTerrain",
            &shaders.grid_vertex,
            Some(shaders.grid_geometry.as_str()),
            &shaders.grid_fragment,
        );
        terrain
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    /// Triangle table uploaded for the geometry stage
    pub fn tri_table(&self) -> &Arc<TriTableBlock> {
        &self.tri_table
    }

    /// Discard the lattice and build an `nx * ny * nz` one with `scale` spacing.
    ///
    /// Invalid input leaves the current lattice untouched.
    pub fn rebuild(&mut self, nx: i32, ny: i32, nz: i32, scale: f32) -> DemoResult<()> {
        if nx <= 0 || ny <= 0 || nz <= 0 {
            return Err(DemoError::invalid_dimensions(
                "GridTerrain",
                format!("lattice {}x{}x{} must be positive", nx, ny, nz),
            ));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DemoError::invalid_dimensions(
                "GridTerrain",
                format!("point scale {} must be positive", scale),
            ));
        }
        let total = (nx as usize)
            .checked_mul(ny as usize)
            .and_then(|n| n.checked_mul(nz as usize))
            .filter(|&n| n <= Self::MAX_LATTICE_POINTS);
        if total.is_none() {
            return Err(DemoError::invalid_dimensions(
                "GridTerrain",
                format!(
                    "lattice {}x{}x{} exceeds {} points",
                    nx,
                    ny,
                    nz,
                    Self::MAX_LATTICE_POINTS
                ),
            ));
        }

        let previous = self.lattice.handle;
        self.lattice = GridLattice::build([nx as usize, ny as usize, nz as usize], scale);
        self.update_physics_mesh = true;

        log::info!(
            "[GridTerrain] Rebuilt lattice {}x{}x{} scale {} ({:?} -> {:?})",
            nx,
            ny,
            nz,
            scale,
            previous,
            self.lattice.handle
        );
        Ok(())
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn lattice(&self) -> &GridLattice {
        &self.lattice
    }

    pub fn handle(&self) -> LatticeHandle {
        self.lattice.handle
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.lattice.dimensions
    }

    pub fn point_scale(&self) -> f32 {
        self.lattice.point_scale
    }

    pub fn field(&self) -> &DensityField {
        &self.field
    }

    /// Hand back the density field and the proxy body when switching terrain
    pub fn into_parts(self) -> (DensityField, Option<BodyId>) {
        (self.field, self.physics_mesh)
    }

    pub fn physics_mesh(&self) -> Option<BodyId> {
        self.physics_mesh
    }

    /// Hand over an existing proxy body; it is replaced on the next extraction
    pub fn attach_physics_mesh(&mut self, body: BodyId) {
        self.physics_mesh = Some(body);
    }

    pub fn physics_triangle_count(&self) -> usize {
        self.physics_triangles
    }

    pub fn csg_add_sphere(&mut self, center: Vec3, radius: f32) {
        self.field.add_sphere(center, radius);
        self.update_physics_mesh = true;
        log::info!("[GridTerrain] Added CSG sphere r={} at {:?}", radius, center);
    }

    pub fn csg_remove_sphere(&mut self, center: Vec3, radius: f32) {
        self.field.remove_sphere(center, radius);
        self.update_physics_mesh = true;
        log::info!("[GridTerrain] Removed CSG sphere r={} at {:?}", radius, center);
    }

    /// World-space sample points of the current lattice window
    pub fn sample_window(&self) -> Vec<Vec3> {
        self.lattice.points.iter().map(|p| *p + self.offset).collect()
    }

    /// Density samples over the lattice window
    pub fn sample_densities(&self) -> Vec<f32> {
        let offset = self.offset;
        let field = &self.field;
        self.lattice
            .points
            .par_iter()
            .map(|p| field.sample(*p + offset))
            .collect()
    }

    /// Triangulate the surface inside the current window, in world space
    pub fn extract_mesh(&self) -> TriangleMesh {
        let samples = self.sample_densities();
        let origin = self.lattice.points.first().copied().unwrap_or(Vec3::ZERO) + self.offset;
        let lattice = SampledLattice {
            samples: &samples,
            dims: self.lattice.dimensions,
            origin,
            spacing: self.lattice.point_scale,
        };
        let normals = if self.expensive_normals {
            NormalMode::Smooth
        } else {
            NormalMode::Flat
        };
        extract(&lattice, SURFACE_THRESHOLD, normals)
    }

    pub fn update(&mut self, dt: f32, world: &mut PhysicsWorld) {
        self.time += dt;
        if !self.update_physics_mesh {
            return;
        }

        let mesh = self.extract_mesh();
        self.physics_triangles = mesh.triangle_count();
        self.replace_physics_mesh(mesh, world);
        self.update_physics_mesh = false;
    }

    fn replace_physics_mesh(&mut self, mesh: TriangleMesh, world: &mut PhysicsWorld) {
        if let Some(old) = self.physics_mesh.take() {
            world.remove_body(old);
        }
        if mesh.is_empty() {
            log::debug!("[GridTerrain] No surface inside the lattice window");
            return;
        }

        let triangles = mesh.triangle_count();
        let body = RigidBody::kinematic(
            CollisionShape::TriangleMesh {
                mesh: Arc::new(mesh),
            },
            Vec3::ZERO,
        );
        let id = world.add_body(body);
        self.physics_mesh = Some(id);
        log::debug!("[GridTerrain] Physics mesh {} with {} triangles", id, triangles);
    }

    pub fn uniforms(&self) -> GridUniforms {
        let [nx, ny, nz] = self.lattice.dimensions;
        GridUniforms {
            dimensions: [nx as u32, ny as u32, nz as u32],
            point_scale: self.lattice.point_scale,
            offset: self.offset.to_array(),
            time: self.time,
            expensive_normals: if self.expensive_normals { 1.0 } else { 0.0 },
            iso_level: SURFACE_THRESHOLD,
            _padding: [0.0; 2],
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        if self.physics_only {
            return;
        }
        list.push(
            DrawPass::Terrain,
            DrawCommand::GridPoints {
                program: self.program.as_ref().map(|p| p.id),
                point_count: u32::try_from(self.lattice.len()).unwrap_or(u32::MAX),
                uniforms: self.uniforms(),
                tri_table: Arc::clone(&self.tri_table),
            },
        );
    }
}
