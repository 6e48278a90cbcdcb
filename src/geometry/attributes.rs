//! Source vertex data handed to the geometry builder.

use glam::{Vec2, Vec3};

/// Semantic meaning of a static vertex attribute.
///
/// Each semantic has a fixed shader location so that every layout the
/// builder produces agrees with the engine's shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Position,
    TexCoord,
    Normal,
}

impl AttributeSemantic {
    /// Shader input location of this semantic.
    pub fn location(&self) -> u32 {
        match self {
            Self::Position => 0,
            Self::TexCoord => 1,
            Self::Normal => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::TexCoord => "UV",
            Self::Normal => "Normal",
        }
    }
}

/// First shader location available to per-instance attributes.
pub const FIRST_INSTANCE_LOCATION: u32 = 3;

/// One attribute array: `components` floats per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttributeData {
    pub semantic: AttributeSemantic,
    pub components: u32,
    pub data: Vec<f32>,
}

impl VertexAttributeData {
    pub fn new(semantic: AttributeSemantic, components: u32, data: Vec<f32>) -> Self {
        Self {
            semantic,
            components,
            data,
        }
    }

    /// Build a three-component attribute from vectors.
    pub fn from_vec3(semantic: AttributeSemantic, values: &[Vec3]) -> Self {
        Self::new(semantic, 3, bytemuck::cast_slice(values).to_vec())
    }

    /// Build a two-component attribute from vectors.
    pub fn from_vec2(semantic: AttributeSemantic, values: &[Vec2]) -> Self {
        Self::new(semantic, 2, bytemuck::cast_slice(values).to_vec())
    }

    pub fn vertex_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.data.len() / self.components as usize
        }
    }

    /// Size in bytes of one vertex's worth of this attribute.
    pub fn element_size(&self) -> u32 {
        self.components * std::mem::size_of::<f32>() as u32
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Check component count and that the data holds whole vertices.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=4).contains(&self.components) {
            return Err(format!(
                "{} attribute has {} components, expected 1 to 4",
                self.semantic.name(),
                self.components
            ));
        }
        if self.data.len() % self.components as usize != 0 {
            return Err(format!(
                "{} attribute holds {} floats, not a multiple of {}",
                self.semantic.name(),
                self.data.len(),
                self.components
            ));
        }
        Ok(())
    }
}

/// Decoded mesh geometry with one array per attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// Texture coordinates; empty if the mesh has none
    pub uvs: Vec<Vec2>,
    /// Normals; empty if the mesh has none
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            ..Default::default()
        }
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The mesh's attributes as separate arrays, omitting absent ones.
    pub fn separated_attributes(&self) -> Vec<VertexAttributeData> {
        let mut attributes = vec![VertexAttributeData::from_vec3(
            AttributeSemantic::Position,
            &self.positions,
        )];
        if !self.uvs.is_empty() {
            attributes.push(VertexAttributeData::from_vec2(
                AttributeSemantic::TexCoord,
                &self.uvs,
            ));
        }
        if !self.normals.is_empty() {
            attributes.push(VertexAttributeData::from_vec3(
                AttributeSemantic::Normal,
                &self.normals,
            ));
        }
        attributes
    }
}

/// Type of one per-instance attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceAttribute {
    Float,
    Vec2,
    Vec3,
    Vec4,
    /// 4x4 transform, occupying four consecutive locations (one per column)
    Mat4,
}

impl InstanceAttribute {
    /// Number of shader locations this attribute occupies.
    pub fn locations(&self) -> u32 {
        match self {
            Self::Mat4 => 4,
            _ => 1,
        }
    }

    /// Float components per location.
    pub fn components_per_location(&self) -> u32 {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat4 => 4,
        }
    }

    /// Size in bytes of one instance's worth of this attribute.
    pub fn size(&self) -> u32 {
        self.locations() * self.components_per_location() * std::mem::size_of::<f32>() as u32
    }
}
