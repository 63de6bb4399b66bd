//! Uniform blocks forwarded to the terrain and lighting shaders.
//!
//! Layouts are mirrored by the GLSL prelude generated in `build.rs`; keep the
//! field order in sync.

use bytemuck::{Pod, Zeroable};

use crate::sdf::tables::TRI_TABLE;

/// Parameters for the grid marching-cubes geometry stage
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GridUniforms {
    pub dimensions: [u32; 3],
    pub point_scale: f32,
    pub offset: [f32; 3],
    pub time: f32,
    /// 1.0 selects gradient normals, 0.0 face normals
    pub expensive_normals: f32,
    pub iso_level: f32,
    pub _padding: [f32; 2],
}

/// Parameters for the full-screen raymarching pass
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RaymarchUniforms {
    pub camera_position: [f32; 3],
    pub max_depth: f32,
    pub camera_forward: [f32; 3],
    pub num_iterations: u32,
    pub camera_up: [f32; 3],
    pub time: f32,
    pub resolution: [f32; 2],
    pub fovy: f32,
    pub _padding: f32,
}

/// Directional light used for physics objects
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LightUniforms {
    pub direction: [f32; 3],
    pub ambient: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}

impl Default for LightUniforms {
    fn default() -> Self {
        Self {
            direction: [-0.4, -1.0, -0.3],
            ambient: 0.25,
            color: [1.0, 0.98, 0.92],
            _padding: 0.0,
        }
    }
}

/// Marching-cubes triangle table for the grid geometry stage.
///
/// Each case's sixteen edge indices (`-1` terminated) fill four `ivec4`
/// slots, so case `c` entry `i` lives at `entries[c * 4 + i / 4][i % 4]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TriTableBlock {
    pub entries: [[i32; 4]; 1024],
}

impl TriTableBlock {
    pub fn bourke() -> Self {
        let mut block = Self::zeroed();
        for (case, row) in TRI_TABLE.iter().enumerate() {
            for (i, &edge) in row.iter().enumerate() {
                block.entries[case * 4 + i / 4][i % 4] = i32::from(edge);
            }
        }
        block
    }

    pub fn edge(&self, case: usize, index: usize) -> i32 {
        self.entries[case * 4 + index / 4][index % 4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<GridUniforms>(), 48);
        assert_eq!(std::mem::size_of::<RaymarchUniforms>(), 64);
        assert_eq!(std::mem::size_of::<LightUniforms>(), 32);
    }

    #[test]
    fn test_tri_table_block_matches_table() {
        let block = TriTableBlock::bourke();
        assert_eq!(std::mem::size_of::<TriTableBlock>(), 16 * 1024);
        for case in [0usize, 1, 37, 128, 254, 255] {
            for i in 0..16 {
                assert_eq!(block.edge(case, i), i32::from(TRI_TABLE[case][i]));
            }
        }
        // Case 1 is a single triangle across edges 0, 8 and 3
        assert_eq!(&block.entries[4][..], &[0, 8, 3, -1]);
        assert_eq!(bytemuck::bytes_of(&block).len(), 16384);
    }

    #[test]
    fn test_uniform_bytes() {
        let uniforms = GridUniforms {
            dimensions: [16, 16, 16],
            point_scale: 10.0,
            ..Zeroable::zeroed()
        };
        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(&bytes[0..4], &16u32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &10.0f32.to_ne_bytes());
    }
}
