//! Build script for generating GLSL uniform declarations from the Rust uniform layouts

use std::{env, fs, path::Path};

/// (block name, instance name, fields as (glsl type, name)), in `renderer::uniforms` order
type UniformBlock = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const UNIFORM_BLOCKS: &[UniformBlock] = &[
    (
        "GridUniforms",
        "grid",
        &[
            ("uvec3", "dimensions"),
            ("float", "point_scale"),
            ("vec3", "offset"),
            ("float", "time"),
            ("float", "expensive_normals"),
            ("float", "iso_level"),
            ("vec2", "_padding"),
        ],
    ),
    (
        "RaymarchUniforms",
        "raymarch",
        &[
            ("vec3", "camera_position"),
            ("float", "max_depth"),
            ("vec3", "camera_forward"),
            ("uint", "num_iterations"),
            ("vec3", "camera_up"),
            ("float", "time"),
            ("vec2", "resolution"),
            ("float", "fovy"),
            ("float", "_padding"),
        ],
    ),
    (
        "LightUniforms",
        "light",
        &[
            ("vec3", "direction"),
            ("float", "ambient"),
            ("vec3", "color"),
            ("float", "_padding"),
        ],
    ),
    ("TriTableBlock", "tri_table", &[("ivec4", "entries[1024]")]),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/renderer/uniforms.rs");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let path = Path::new(&out_dir).join("terrain_uniforms.glsl");

    fs::write(&path, generate_glsl_uniforms()).expect("Failed to write generated GLSL uniforms");
}

fn generate_glsl_uniforms() -> String {
    let mut glsl = String::from("// Generated by build.rs - do not edit\n");
    for (block, instance, fields) in UNIFORM_BLOCKS {
        glsl.push_str(&format!("layout(std140) uniform {} {{\n", block));
        for (ty, name) in fields.iter() {
            glsl.push_str(&format!("    {} {};\n", ty, name));
        }
        glsl.push_str(&format!("}} {};\n", instance));
    }
    glsl
}
