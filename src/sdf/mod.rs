//! Density fields and surface extraction
//!
//! - Implicit density field (noise terrain + ordered CSG sphere edits)
//! - CPU marching cubes for physics proxies
//! - Sphere tracing for world-space probes

pub mod density;
pub mod marching_cubes;
pub mod tables;

pub use density::{BaseField, CsgEdit, CsgOp, DensityField, NoiseTerrain};
pub use marching_cubes::{extract, NormalMode, SampledLattice};

/// Iso level of the terrain surface
pub const SURFACE_THRESHOLD: f32 = 0.0;
