//! Frame description handed to the host renderer.
//!
//! Nothing here talks to a graphics API. Terrains, physics and the GUI record
//! typed commands into a [`DrawList`]; uniform blocks are plain `Pod` data.

pub mod draw_list;
pub mod shader;
pub mod uniforms;

pub use draw_list::{DrawCommand, DrawList, DrawPass, MeshSource, TargetHandle};
pub use shader::{ProgramId, ShaderProgram, UNIFORM_PRELUDE};
pub use uniforms::{GridUniforms, LightUniforms, RaymarchUniforms, TriTableBlock};
