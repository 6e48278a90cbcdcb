//! Shader bindings: the stage, program and texture set a render component holds.
//!
//! A [`ShaderBinding`] is acquired and released as one unit. The texture
//! fallback lives here, on the caller side of the cache: when a requested
//! texture does not exist, the preset's default texture key is requested
//! instead. The cache itself never substitutes resources.

use crate::backend::{GraphicsDevice, ProgramHandle, ShaderHandle, TextureHandle};
use crate::cache::GraphicsCache;
use crate::error::CacheResult;
use crate::keys::ProgramKey;

pub const MISSING_TEXTURE: &str = "Crux/Assets/Textures/Required/Missing.jpg";
pub const FONT_TEXTURE: &str = "Crux/Assets/Fonts/PublicSans.jpg";

const LIT_VERTEX: &str = "Crux/Assets/Shaders/Required/Vertex/vert_lit.glsl";
const INSTANCE_LIT_VERTEX: &str = "Crux/Assets/Shaders/Required/Vertex/instance_vert_lit.glsl";
const FONT_VERTEX: &str = "Crux/Assets/Shaders/Required/Vertex/vert_font.glsl";
const SKYBOX_VERTEX: &str = "Crux/Assets/Shaders/Required/Vertex/vert_skybox.glsl";
const LIT_FRAGMENT: &str = "Crux/Assets/Shaders/Required/Fragment/frag_lit.glsl";
const FONT_FRAGMENT: &str = "Crux/Assets/Shaders/Required/Fragment/frag_font.glsl";
const OUTLINE_FRAGMENT: &str = "Crux/Assets/Shaders/Required/Fragment/frag_outline.glsl";
const SKYBOX_FRAGMENT: &str = "Crux/Assets/Shaders/Required/Fragment/frag_skybox.glsl";

/// Built-in shader configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderPreset {
    Lit,
    InstanceLit,
    Font,
    Outline,
    Skybox,
}

impl ShaderPreset {
    pub const ALL: [ShaderPreset; 5] = [
        Self::Lit,
        Self::InstanceLit,
        Self::Font,
        Self::Outline,
        Self::Skybox,
    ];

    pub fn vertex_path(&self) -> &'static str {
        match self {
            Self::Lit | Self::Outline => LIT_VERTEX,
            Self::InstanceLit => INSTANCE_LIT_VERTEX,
            Self::Font => FONT_VERTEX,
            Self::Skybox => SKYBOX_VERTEX,
        }
    }

    pub fn fragment_path(&self) -> &'static str {
        match self {
            Self::Lit | Self::InstanceLit => LIT_FRAGMENT,
            Self::Font => FONT_FRAGMENT,
            Self::Outline => OUTLINE_FRAGMENT,
            Self::Skybox => SKYBOX_FRAGMENT,
        }
    }

    /// Texture used when the requested one is absent. `None` for untextured presets.
    pub fn default_texture(&self) -> Option<&'static str> {
        match self {
            Self::Lit | Self::InstanceLit => Some(MISSING_TEXTURE),
            Self::Font => Some(FONT_TEXTURE),
            Self::Outline | Self::Skybox => None,
        }
    }
}

/// Everything a component acquired for one shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBinding {
    pub vertex_path: String,
    pub fragment_path: String,
    pub texture_path: Option<String>,
    pub vertex: ShaderHandle,
    pub fragment: ShaderHandle,
    pub program: ProgramHandle,
    /// `None` if untextured or the texture asset was unavailable
    pub texture: Option<TextureHandle>,
}

impl ShaderBinding {
    pub fn program_key(&self) -> ProgramKey {
        ProgramKey::new(self.vertex, self.fragment)
    }
}

impl<D: GraphicsDevice> GraphicsCache<D> {
    /// Acquire both stages, their program and an optional texture.
    ///
    /// Returns `Ok(None)` if a stage source is unavailable. On any failure the
    /// parts acquired so far are released again.
    pub fn acquire_shader(
        &mut self,
        vertex_path: &str,
        fragment_path: &str,
        texture_path: Option<&str>,
    ) -> CacheResult<Option<ShaderBinding>> {
        let Some(vertex) = self.acquire_vertex_stage(vertex_path)? else {
            return Ok(None);
        };
        let fragment = match self.acquire_fragment_stage(fragment_path) {
            Ok(Some(fragment)) => fragment,
            other => {
                self.release_vertex_stage(vertex_path);
                return other.map(|_| None);
            }
        };
        let program = match self.acquire_program((vertex, fragment)) {
            Ok(program) => program,
            Err(err) => {
                self.release_vertex_stage(vertex_path);
                self.release_fragment_stage(fragment_path);
                return Err(err);
            }
        };
        let texture = match texture_path {
            Some(path) => match self.acquire_texture(path) {
                Ok(texture) => texture,
                Err(err) => {
                    self.release_program((vertex, fragment));
                    self.release_vertex_stage(vertex_path);
                    self.release_fragment_stage(fragment_path);
                    return Err(err);
                }
            },
            None => None,
        };

        Ok(Some(ShaderBinding {
            vertex_path: vertex_path.to_string(),
            fragment_path: fragment_path.to_string(),
            texture_path: texture.and(texture_path.map(str::to_string)),
            vertex,
            fragment,
            program,
            texture,
        }))
    }

    /// Acquire a preset, falling back to its default texture when `texture_path`
    /// does not exist. Untextured presets ignore `texture_path`.
    pub fn load_preset_shader(
        &mut self,
        preset: ShaderPreset,
        texture_path: Option<&str>,
    ) -> CacheResult<Option<ShaderBinding>> {
        let texture = preset.default_texture().map(|default| {
            texture_path
                .filter(|path| self.assets().exists(path))
                .unwrap_or(default)
        });
        self.acquire_shader(preset.vertex_path(), preset.fragment_path(), texture)
    }

    /// Release every part of a binding.
    pub fn release_shader(&mut self, binding: &ShaderBinding) {
        self.release_program(binding.program_key());
        self.release_vertex_stage(&binding.vertex_path);
        self.release_fragment_stage(&binding.fragment_path);
        if let Some(path) = &binding.texture_path {
            self.release_texture(path);
        }
    }
}
