//! Cache keys
//!
//! Textures and shader stages are keyed by asset path, geometry buffers by a
//! mesh path or a synthetic name, and linked programs by the ordered pair of
//! the stage handles they were linked from.

use std::fmt;

use crate::backend::ShaderHandle;

/// Synthetic geometry name for the skybox quad.
pub const SKYBOX: &str = "skybox";

/// Synthetic geometry name for the UI quad.
pub const UI: &str = "ui";

/// Synthetic geometry name for the instanced UI quad.
pub const UI_INSTANCED: &str = "ui_instanced";

/// Key of a linked program: the (vertex, fragment) stage pair.
///
/// The pair is ordered. Two programs alias only when built from the same
/// two already-cached stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramKey {
    pub vertex: ShaderHandle,
    pub fragment: ShaderHandle,
}

impl ProgramKey {
    pub fn new(vertex: ShaderHandle, fragment: ShaderHandle) -> Self {
        Self { vertex, fragment }
    }
}

impl From<(ShaderHandle, ShaderHandle)> for ProgramKey {
    fn from((vertex, fragment): (ShaderHandle, ShaderHandle)) -> Self {
        Self::new(vertex, fragment)
    }
}

impl fmt::Display for ProgramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.vertex, self.fragment)
    }
}

/// Which slot cache a resource lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    VertexShader,
    FragmentShader,
    Program,
    Geometry,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Texture => "texture",
            ResourceKind::VertexShader => "vertex shader",
            ResourceKind::FragmentShader => "fragment shader",
            ResourceKind::Program => "program",
            ResourceKind::Geometry => "geometry buffer",
        }
    }
}

/// A cache key of any kind, used for reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// Asset path of a texture or shader stage
    Path(String),
    /// Stage pair of a linked program
    Pair(ProgramKey),
    /// Mesh path or synthetic name of a geometry buffer, also carried by
    /// geometry errors
    Name(String),
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Path(path) => f.write_str(path),
            ResourceKey::Pair(pair) => write!(f, "{}", pair),
            ResourceKey::Name(name) => f.write_str(name),
        }
    }
}
