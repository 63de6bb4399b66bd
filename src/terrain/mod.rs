//! Terrain variants
//!
//! The active terrain is one [`Terrain`] value; per-variant configuration goes
//! through `as_grid_mut` / `as_raymarch_mut`.

pub mod error;
pub mod grid;
pub mod raymarch;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use error::{TerrainErrorContext, TerrainResult};
pub use grid::{GridLattice, GridTerrain, LatticeHandle};
pub use raymarch::RaymarchTerrain;

use crate::physics::PhysicsWorld;
use crate::renderer::DrawList;

/// Terrain choices offered by the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    GridMarchingCubes,
    /// Listed in the panel, not implemented
    OptimisedGridMarchingCubes,
    RaymarchedDistanceField,
}

impl TerrainKind {
    /// Panel dropdown order
    pub const ALL: [TerrainKind; 3] = [
        TerrainKind::GridMarchingCubes,
        TerrainKind::OptimisedGridMarchingCubes,
        TerrainKind::RaymarchedDistanceField,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TerrainKind::GridMarchingCubes => "Grid-Based Naive Marching Cubes",
            TerrainKind::OptimisedGridMarchingCubes => "Grid-Based Optimised Marching Cubes",
            TerrainKind::RaymarchedDistanceField => "Raymarched Distance Field",
        }
    }

    pub fn is_live(self) -> bool {
        !matches!(self, TerrainKind::OptimisedGridMarchingCubes)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

pub enum Terrain {
    Grid(GridTerrain),
    Raymarched(RaymarchTerrain),
}

impl Terrain {
    pub fn kind(&self) -> TerrainKind {
        match self {
            Terrain::Grid(_) => TerrainKind::GridMarchingCubes,
            Terrain::Raymarched(_) => TerrainKind::RaymarchedDistanceField,
        }
    }

    pub fn update(&mut self, dt: f32, world: &mut PhysicsWorld) {
        match self {
            Terrain::Grid(grid) => grid.update(dt, world),
            Terrain::Raymarched(ray) => ray.update(dt),
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        match self {
            Terrain::Grid(grid) => grid.draw(list),
            Terrain::Raymarched(ray) => ray.draw(list),
        }
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        match self {
            Terrain::Grid(grid) => grid.set_offset(offset),
            Terrain::Raymarched(ray) => ray.set_offset(offset),
        }
    }

    pub fn as_grid(&self) -> Option<&GridTerrain> {
        match self {
            Terrain::Grid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn as_grid_mut(&mut self) -> Option<&mut GridTerrain> {
        match self {
            Terrain::Grid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn as_raymarch(&self) -> Option<&RaymarchTerrain> {
        match self {
            Terrain::Raymarched(ray) => Some(ray),
            _ => None,
        }
    }

    pub fn as_raymarch_mut(&mut self) -> Option<&mut RaymarchTerrain> {
        match self {
            Terrain::Raymarched(ray) => Some(ray),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::DensityField;

    #[test]
    fn test_dropdown_indices() {
        assert_eq!(TerrainKind::from_index(2), Some(TerrainKind::RaymarchedDistanceField));
        assert_eq!(TerrainKind::from_index(3), None);
        assert_eq!(TerrainKind::GridMarchingCubes.index(), 0);
        assert!(!TerrainKind::OptimisedGridMarchingCubes.is_live());
    }

    #[test]
    fn test_variant_accessors() {
        let mut terrain = Terrain::Grid(GridTerrain::new(DensityField::noise(1)));
        assert_eq!(terrain.kind(), TerrainKind::GridMarchingCubes);
        assert!(terrain.as_grid_mut().is_some());
        assert!(terrain.as_raymarch().is_none());
        assert!(terrain.as_raymarch_mut().terrain_context("raymarch").is_err());
    }
}
