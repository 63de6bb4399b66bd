use glam::Vec3;
use noise::{NoiseFn, Perlin};

/// Sign applied by a CSG edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgOp {
    /// Union: the sphere becomes solid
    Add,
    /// Subtraction: the sphere is carved out
    Remove,
}

/// A signed sphere edit against the density field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsgEdit {
    pub center: Vec3,
    pub radius: f32,
    pub op: CsgOp,
}

impl CsgEdit {
    pub fn sphere_distance(&self, p: Vec3) -> f32 {
        (p - self.center).length() - self.radius
    }

    /// Combine this edit with the density `d` accumulated so far
    #[inline]
    pub fn apply(&self, d: f32, p: Vec3) -> f32 {
        let s = self.sphere_distance(p);
        match self.op {
            CsgOp::Add => d.min(s),
            CsgOp::Remove => d.max(-s),
        }
    }
}

/// Noise driven height field with 3D detail for overhangs
#[derive(Debug, Clone)]
pub struct NoiseTerrain {
    height_noise: Perlin,
    detail_noise: Perlin,
    seed: u32,
    pub base_height: f32,
    pub hill_amplitude: f32,
    pub detail_amplitude: f32,
}

impl NoiseTerrain {
    pub fn new(seed: u32) -> Self {
        Self {
            height_noise: Perlin::new(seed),
            detail_noise: Perlin::new(seed.wrapping_add(1)),
            seed,
            base_height: 0.0,
            hill_amplitude: 30.0,
            detail_amplitude: 6.0,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn height(&self, x: f32, z: f32) -> f32 {
        let (x, z) = (x as f64, z as f64);
        // Large hills, then smaller bumps
        let h1 = self.height_noise.get([x * 0.005, z * 0.005]);
        let h2 = self.height_noise.get([x * 0.02 + 100.0, z * 0.02 + 100.0]) * 0.35;
        self.base_height + (h1 + h2) as f32 * self.hill_amplitude
    }

    pub fn sample(&self, p: Vec3) -> f32 {
        let detail = self
            .detail_noise
            .get([p.x as f64 * 0.03, p.y as f64 * 0.03, p.z as f64 * 0.03]) as f32;
        p.y - self.height(p.x, p.z) + detail * self.detail_amplitude
    }
}

/// The field the edit log is applied on top of
#[derive(Debug, Clone)]
pub enum BaseField {
    /// Nothing solid anywhere
    Empty,
    /// Solid below `height`
    Plane { height: f32 },
    Noise(NoiseTerrain),
}

impl BaseField {
    pub fn sample(&self, p: Vec3) -> f32 {
        match self {
            // Large positive: far outside everything
            BaseField::Empty => f32::MAX,
            BaseField::Plane { height } => p.y - height,
            BaseField::Noise(terrain) => terrain.sample(p),
        }
    }
}

/// Implicit density field: negative inside solid, positive outside, surface at zero.
///
/// The field is never stored; it is the base field followed by every CSG
/// edit in the order it was registered. Two fields with the same base and the
/// same ordered edit log sample identically.
#[derive(Debug, Clone)]
pub struct DensityField {
    base: BaseField,
    edits: Vec<CsgEdit>,
}

impl DensityField {
    pub fn new(base: BaseField) -> Self {
        Self {
            base,
            edits: Vec::new(),
        }
    }

    pub fn noise(seed: u32) -> Self {
        Self::new(BaseField::Noise(NoiseTerrain::new(seed)))
    }

    pub fn base(&self) -> &BaseField {
        &self.base
    }

    pub fn edits(&self) -> &[CsgEdit] {
        &self.edits
    }

    pub fn push_edit(&mut self, edit: CsgEdit) {
        self.edits.push(edit);
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32) {
        self.push_edit(CsgEdit {
            center,
            radius,
            op: CsgOp::Add,
        });
    }

    pub fn remove_sphere(&mut self, center: Vec3, radius: f32) {
        self.push_edit(CsgEdit {
            center,
            radius,
            op: CsgOp::Remove,
        });
    }

    pub fn sample(&self, p: Vec3) -> f32 {
        self.edits
            .iter()
            .fold(self.base.sample(p), |d, edit| edit.apply(d, p))
    }

    /// Central-difference gradient; points away from solid
    pub fn gradient(&self, p: Vec3, eps: f32) -> Vec3 {
        let dx = Vec3::new(eps, 0.0, 0.0);
        let dy = Vec3::new(0.0, eps, 0.0);
        let dz = Vec3::new(0.0, 0.0, eps);
        Vec3::new(
            self.sample(p + dx) - self.sample(p - dx),
            self.sample(p + dy) - self.sample(p - dy),
            self.sample(p + dz) - self.sample(p - dz),
        ) / (2.0 * eps)
    }

    /// Sphere-trace along `dir` and return the first surface point.
    ///
    /// The noise terrain is not an exact distance field, so steps are
    /// shortened. Starting inside solid returns `origin`.
    pub fn march_ray(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_steps: u32,
        max_distance: f32,
    ) -> Option<Vec3> {
        const STEP_SCALE: f32 = 0.6;
        const HIT_EPSILON: f32 = 0.01;
        const MIN_STEP: f32 = 0.05;

        let dir = dir.try_normalize()?;
        let mut t = 0.0;
        for _ in 0..max_steps {
            let p = origin + dir * t;
            let d = self.sample(p);
            if d < HIT_EPSILON {
                return Some(p);
            }
            t += (d * STEP_SCALE).max(MIN_STEP);
            if t > max_distance {
                return None;
            }
        }
        None
    }
}
