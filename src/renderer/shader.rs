//! Shader program sources.
//!
//! Compilation happens in the host renderer; this side loads the GLSL stages,
//! checks they are usable and prepends the generated uniform prelude.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DemoError, DemoResult};

/// Uniform block declarations generated by `build.rs`
pub const UNIFORM_PRELUDE: &str = include_str!(concat!(env!("OUT_DIR"), "/terrain_uniforms.glsl"));

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub id: ProgramId,
    pub vertex_path: PathBuf,
    pub fragment_path: PathBuf,
    pub vertex_source: String,
    pub fragment_source: String,
    /// Path and source of the optional geometry stage
    pub geometry: Option<(PathBuf, String)>,
}

impl ShaderProgram {
    /// Load a vertex/fragment pair from disk
    pub fn load(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> DemoResult<Self> {
        let vertex_path = vertex.as_ref().to_path_buf();
        let fragment_path = fragment.as_ref().to_path_buf();
        let vertex_source = read_stage(&vertex_path)?;
        let fragment_source = read_stage(&fragment_path)?;
        Self::from_sources(vertex_path, fragment_path, &vertex_source, &fragment_source)
    }

    /// Load a vertex/geometry/fragment triple from disk
    pub fn load_with_geometry(
        vertex: impl AsRef<Path>,
        geometry: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
    ) -> DemoResult<Self> {
        let geometry_path = geometry.as_ref().to_path_buf();
        let geometry_source = read_stage(&geometry_path)?;
        validate_stage(&geometry_path, &geometry_source)?;

        let mut program = Self::load(vertex, fragment)?;
        log::debug!(
            "[ShaderProgram] {:?} geometry stage {}",
            program.id,
            geometry_path.display()
        );
        program.geometry = Some((geometry_path, with_prelude(&geometry_source)));
        Ok(program)
    }

    /// Load a program for `owner`, logging and returning `None` on failure.
    ///
    /// Rendering carries on without the program; the host skips its pass.
    pub fn load_or_warn(
        owner: &str,
        vertex: &str,
        geometry: Option<&str>,
        fragment: &str,
    ) -> Option<Self> {
        let loaded = match geometry {
            Some(geometry) => Self::load_with_geometry(vertex, geometry, fragment),
            None => Self::load(vertex, fragment),
        };
        match loaded {
            Ok(program) => Some(program),
            Err(e) => {
                log::warn!("[{}] Continuing without shader: {}", owner, e);
                None
            }
        }
    }

    pub fn from_sources(
        vertex_path: PathBuf,
        fragment_path: PathBuf,
        vertex_source: &str,
        fragment_source: &str,
    ) -> DemoResult<Self> {
        validate_stage(&vertex_path, vertex_source)?;
        validate_stage(&fragment_path, fragment_source)?;

        let program = Self {
            id: ProgramId(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed)),
            vertex_source: with_prelude(vertex_source),
            fragment_source: with_prelude(fragment_source),
            vertex_path,
            fragment_path,
            geometry: None,
        };
        log::info!(
            "[ShaderProgram] Loaded {:?} ({}, {})",
            program.id,
            program.vertex_path.display(),
            program.fragment_path.display()
        );
        Ok(program)
    }
}

fn read_stage(path: &Path) -> DemoResult<String> {
    std::fs::read_to_string(path).map_err(|e| DemoError::Shader {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn validate_stage(path: &Path, source: &str) -> DemoResult<()> {
    if source.trim().is_empty() {
        return Err(DemoError::Shader {
            path: path.to_path_buf(),
            reason: "source is empty".to_string(),
        });
    }
    if !source.contains("void main") {
        return Err(DemoError::Shader {
            path: path.to_path_buf(),
            reason: "no `void main` entry point".to_string(),
        });
    }
    Ok(())
}

/// Insert the prelude after a leading `#version` line, if any
fn with_prelude(source: &str) -> String {
    let trimmed = source.trim_start();
    if trimmed.starts_with("#version") {
        let (version, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
        format!("{}\n{}\n{}", version, UNIFORM_PRELUDE, rest)
    } else {
        format!("{}\n{}", UNIFORM_PRELUDE, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = "#version 330\nvoid main() { gl_Position = vec4(0.0); }\n";
    const FRAG: &str = "#version 330\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";
    const GEOM: &str = "#version 330\nlayout(points) in;\nlayout(triangle_strip, max_vertices = 3) out;\nvoid main() { EndPrimitive(); }\n";

    #[test]
    fn test_load_pair_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vert = dir.path().join("light.vert");
        let frag = dir.path().join("light.frag");
        std::fs::write(&vert, VERT).expect("write vert");
        std::fs::write(&frag, FRAG).expect("write frag");

        let program = ShaderProgram::load(&vert, &frag).expect("valid program");
        assert!(program.vertex_source.starts_with("#version 330\n"));
        assert!(program.vertex_source.contains("GridUniforms"));
        assert!(program.fragment_source.contains("void main"));
    }

    #[test]
    fn test_missing_file_is_shader_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ShaderProgram::load(dir.path().join("nope.vert"), dir.path().join("nope.frag"))
            .unwrap_err();
        assert!(matches!(err, DemoError::Shader { .. }));
    }

    #[test]
    fn test_source_without_entry_point_rejected() {
        let err = ShaderProgram::from_sources(
            PathBuf::from("a.vert"),
            PathBuf::from("a.frag"),
            VERT,
            "#version 330\n// nothing here\n",
        )
        .unwrap_err();
        assert!(matches!(err, DemoError::Shader { ref path, .. } if path == Path::new("a.frag")));
    }

    #[test]
    fn test_load_with_geometry_stage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vert = dir.path().join("grid.vert");
        let geom = dir.path().join("grid.geom");
        let frag = dir.path().join("grid.frag");
        std::fs::write(&vert, VERT).expect("write vert");
        std::fs::write(&geom, GEOM).expect("write geom");
        std::fs::write(&frag, FRAG).expect("write frag");

        let program = ShaderProgram::load_with_geometry(&vert, &geom, &frag).expect("valid program");
        let (path, source) = program.geometry.expect("geometry stage");
        assert_eq!(path, geom);
        assert!(source.contains("TriTableBlock"));
    }

    #[test]
    fn test_load_or_warn_returns_none_on_missing_stage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vert = dir.path().join("grid.vert");
        let frag = dir.path().join("grid.frag");
        std::fs::write(&vert, VERT).expect("write vert");
        std::fs::write(&frag, FRAG).expect("write frag");
        let missing = dir.path().join("grid.geom");

        let program = ShaderProgram::load_or_warn(
            "GridTerrain",
            &vert.to_string_lossy(),
            Some(&missing.to_string_lossy()),
            &frag.to_string_lossy(),
        );
        assert!(program.is_none());
        assert!(ShaderProgram::load_or_warn(
            "GridTerrain",
            &vert.to_string_lossy(),
            None,
            &frag.to_string_lossy()
        )
        .is_some());
    }

    #[test]
    fn test_program_ids_are_unique() {
        let a = ShaderProgram::from_sources(PathBuf::from("a"), PathBuf::from("b"), VERT, FRAG)
            .expect("valid");
        let b = ShaderProgram::from_sources(PathBuf::from("a"), PathBuf::from("b"), VERT, FRAG)
            .expect("valid");
        assert_ne!(a.id, b.id);
    }
}
