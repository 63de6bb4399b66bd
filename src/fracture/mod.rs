//! Voronoi fracture
//!
//! - Half-space clipping of convex polyhedra
//! - Site generation and per-cell clipping (cells run in parallel)
//! - Fragment arena pairing each mesh with its physics body

pub mod arena;
pub mod clip;
pub mod voronoi;

pub use arena::{Fragment, FragmentArena, FragmentId};
pub use clip::{ConvexPolyhedron, Plane};
pub use voronoi::{voronoi_fracture, FragmentMesh};
