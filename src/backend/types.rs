//! Descriptor and value types handed to the graphics device

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    R8Unorm,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm => 4,
            TextureFormat::R8Unorm => 1,
        }
    }
}

/// Filter mode for texture sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
    /// Nearest texel from the nearest mip level
    NearestMipmapNearest,
    /// Linear within the nearest mip level
    LinearMipmapNearest,
    /// Trilinear filtering
    LinearMipmapLinear,
}

impl FilterMode {
    /// Whether this filter samples from mip levels.
    pub fn uses_mipmaps(&self) -> bool {
        matches!(
            self,
            FilterMode::NearestMipmapNearest
                | FilterMode::LinearMipmapNearest
                | FilterMode::LinearMipmapLinear
        )
    }
}

/// Address (wrap) mode for texture sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Texture descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub generate_mipmaps: bool,
}

impl TextureDescriptor {
    /// Expected size in bytes of the pixel data for this descriptor.
    pub fn data_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8Unorm,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            generate_mipmaps: false,
        }
    }
}

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferUsage(u32);

impl BufferUsage {
    pub const VERTEX: Self = Self(1 << 0);
    pub const INDEX: Self = Self(1 << 1);
    /// Contents are uploaded once and never rewritten
    pub const STATIC: Self = Self(1 << 2);
    /// Contents are rewritten every frame
    pub const DYNAMIC: Self = Self(1 << 3);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Buffer descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    pub size: u64,
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Wiring of one vertex attribute location to a buffer region.
///
/// Offsets and strides are in bytes. A `divisor` of 0 advances the attribute
/// once per vertex; 1 advances it once per draw instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributePointer {
    pub location: u32,
    /// Number of 32-bit float components (1..=4)
    pub components: u32,
    pub stride: u32,
    pub offset: u64,
    pub divisor: u32,
}

impl VertexAttributePointer {
    pub fn per_vertex(location: u32, components: u32, stride: u32, offset: u64) -> Self {
        Self {
            location,
            components,
            stride,
            offset,
            divisor: 0,
        }
    }

    pub fn per_instance(location: u32, components: u32, stride: u32, offset: u64) -> Self {
        Self {
            location,
            components,
            stride,
            offset,
            divisor: 1,
        }
    }

    pub fn is_per_instance(&self) -> bool {
        self.divisor > 0
    }
}
