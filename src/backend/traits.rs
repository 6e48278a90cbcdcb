//! Device capability trait
//!
//! The cache never talks to a graphics API directly. Everything it needs from
//! the GPU goes through [`GraphicsDevice`]: creating and destroying textures,
//! compiling shader stages, linking programs, and allocating vertex arrays and
//! buffers. All calls are synchronous and must happen on the thread that owns
//! the device context.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Failed to create resource: {0}")]
    ResourceCreationFailed(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type DeviceResult<T> = Result<T, DeviceError>;

macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw device-assigned id.
            pub const fn from_raw(id: u64) -> Self {
                Self(id)
            }

            /// The raw device-assigned id.
            pub const fn raw(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

device_handle!(
    /// Handle to a GPU texture
    TextureHandle
);
device_handle!(
    /// Handle to a compiled shader stage
    ShaderHandle
);
device_handle!(
    /// Handle to a linked shader program
    ProgramHandle
);
device_handle!(
    /// Handle to a GPU buffer
    BufferHandle
);
device_handle!(
    /// Handle to a vertex-array (vertex layout) object
    VertexArrayHandle
);

/// Graphics device capability consumed by the cache
pub trait GraphicsDevice {
    /// Human-readable device name
    fn name(&self) -> &str;

    // Textures

    /// Create a texture and upload its pixel data
    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> DeviceResult<TextureHandle>;

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    // Shader stages

    /// Compile a shader stage from source text.
    ///
    /// A returned handle does not imply success: compiler diagnostics are
    /// read back with [`GraphicsDevice::shader_info_log`].
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> DeviceResult<ShaderHandle>;

    /// Compiler diagnostic log for a shader stage (empty when clean)
    fn shader_info_log(&self, shader: ShaderHandle) -> String;

    /// Destroy a shader stage
    fn destroy_shader(&mut self, shader: ShaderHandle);

    // Programs

    /// Create an empty program object
    fn create_program(&mut self) -> DeviceResult<ProgramHandle>;

    /// Attach a compiled stage to a program
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);

    /// Detach a stage from a program
    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);

    /// Link the attached stages
    fn link_program(&mut self, program: ProgramHandle);

    /// Validate a linked program
    fn validate_program(&mut self, program: ProgramHandle);

    /// Diagnostic log of the most recent link or validate (empty when clean)
    fn program_info_log(&self, program: ProgramHandle) -> String;

    /// Destroy a program
    fn destroy_program(&mut self, program: ProgramHandle);

    // Vertex arrays and buffers

    /// Create a vertex-array object
    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle>;

    /// Destroy a vertex-array object
    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Create a buffer, optionally with initial contents
    fn create_buffer(
        &mut self,
        desc: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> DeviceResult<BufferHandle>;

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Wire a vertex attribute of `vertex_array` to a region of `buffer`
    fn set_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayHandle,
        buffer: BufferHandle,
        pointer: &VertexAttributePointer,
    );

    /// Bind an element (index) buffer to `vertex_array`
    fn set_index_buffer(&mut self, vertex_array: VertexArrayHandle, buffer: BufferHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_raw_roundtrip() {
        let handle = TextureHandle::from_raw(42);
        assert_eq!(handle.raw(), 42);
        assert_eq!(handle.to_string(), "42");
    }

    #[test]
    fn test_error_display() {
        let err = DeviceError::OutOfMemory;
        assert_eq!(err.to_string(), "Out of memory");

        let err = DeviceError::ResourceCreationFailed("no slots".to_string());
        assert_eq!(err.to_string(), "Failed to create resource: no slots");
    }
}
