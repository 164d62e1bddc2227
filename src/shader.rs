//! WGSL source for the particle pipeline.
//!
//! One module holds both stages. The vertex stage expands every particle
//! instance into a six-vertex quad sized like a GL point sprite, so the
//! pipeline needs no point-size feature from the adapter.

/// Vertex + fragment shader source.
pub const PARTICLE_SHADER: &str = include_str!("particles.wgsl");

/// Vertex entry point.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment entry point.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Vertices emitted per particle instance (two triangles).
pub const VERTICES_PER_PARTICLE: u32 = 6;

/// Vertex shader input locations, one vertex buffer each.
pub mod location {
    pub const POSITION: u32 = 0;
    pub const RANDOM: u32 = 1;
    pub const COLOR: u32 = 2;
}
