//! Frame draw list.
//!
//! The controller records one [`DrawList`] per frame; the host renderer walks
//! it in order. Commands reference meshes by handle so nothing heavy is copied.

use std::sync::Arc;

use glam::Mat4;

use super::shader::ProgramId;
use super::uniforms::{GridUniforms, LightUniforms, RaymarchUniforms, TriTableBlock};
use crate::physics::{BodyId, DebugLine};

/// Off-screen render target allocated by the raymarched terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

/// Coarse stage a command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    Terrain,
    PhysicsDebug,
    PhysicsObjects,
    Fragments,
    Gui,
}

/// Which mesh a lit draw refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSource {
    TestSphere,
    TestBox,
    Fragment(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Start drawing with the camera transform
    BeginCamera { view_projection: Mat4 },
    EndCamera,
    SetDepthTest(bool),
    /// One point primitive per lattice point; the geometry stage emits triangles
    GridPoints {
        /// `None` when the grid program failed to load; the host skips the draw
        program: Option<ProgramId>,
        point_count: u32,
        uniforms: GridUniforms,
        tri_table: Arc<TriTableBlock>,
    },
    /// Full-viewport raymarch into `target`, then composited
    RaymarchPass {
        program: Option<ProgramId>,
        target: TargetHandle,
        uniforms: RaymarchUniforms,
    },
    DebugLines { lines: Vec<DebugLine> },
    BeginLighting {
        program: Option<ProgramId>,
        uniforms: LightUniforms,
    },
    EndLighting,
    LitMesh {
        source: MeshSource,
        body: BodyId,
        transform: Mat4,
        wireframe: bool,
    },
    Gui { widget_count: usize },
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<(DrawPass, DrawCommand)>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pass: DrawPass, command: DrawCommand) {
        self.commands.push((pass, command));
    }

    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().map(|(_, c)| c)
    }

    pub fn tagged(&self) -> &[(DrawPass, DrawCommand)] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Pass sequence with consecutive repeats collapsed
    pub fn passes(&self) -> Vec<DrawPass> {
        let mut passes: Vec<DrawPass> = Vec::new();
        for (pass, _) in &self.commands {
            if passes.last() != Some(pass) {
                passes.push(*pass);
            }
        }
        passes
    }

    pub fn count_in(&self, pass: DrawPass) -> usize {
        self.commands.iter().filter(|(p, _)| *p == pass).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_collapse_repeats() {
        let mut list = DrawList::new();
        list.push(DrawPass::Terrain, DrawCommand::EndCamera);
        list.push(DrawPass::Terrain, DrawCommand::EndCamera);
        list.push(DrawPass::Gui, DrawCommand::Gui { widget_count: 3 });
        list.push(DrawPass::Terrain, DrawCommand::EndCamera);

        assert_eq!(
            list.passes(),
            vec![DrawPass::Terrain, DrawPass::Gui, DrawPass::Terrain]
        );
        assert_eq!(list.count_in(DrawPass::Terrain), 3);
        assert_eq!(list.len(), 4);
    }
}
