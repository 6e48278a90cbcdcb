//! Cache error types.

use thiserror::Error;

use crate::backend::DeviceError;
use crate::keys::ResourceKey;

/// Step of shader construction that produced diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStage {
    VertexCompile,
    FragmentCompile,
    Link,
    Validate,
}

impl std::fmt::Display for ContentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::VertexCompile => "compiling vertex shader",
            Self::FragmentCompile => "compiling fragment shader",
            Self::Link => "linking program",
            Self::Validate => "validating program",
        };
        f.write_str(name)
    }
}

/// Errors that abort a cache acquisition.
///
/// A failed acquisition leaves the cache exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Shader compile, link or validate produced diagnostics.
    #[error("Error {stage} {key}: {log}")]
    Content {
        key: ResourceKey,
        stage: ContentStage,
        log: String,
    },
    /// The device refused to create an object.
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// Source geometry cannot be turned into a buffer set.
    #[error("Invalid geometry '{key}': {reason}")]
    InvalidGeometry { key: ResourceKey, reason: String },
}

impl CacheError {
    /// Whether this is a shader content defect.
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content { .. })
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::Content {
            key: ResourceKey::Path("a.glsl".into()),
            stage: ContentStage::VertexCompile,
            log: "0:3: syntax error".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error compiling vertex shader a.glsl: 0:3: syntax error"
        );
        assert!(err.is_content());

        let err = CacheError::InvalidGeometry {
            key: ResourceKey::Name("Cube".into()),
            reason: "no vertices".into(),
        };
        assert_eq!(err.to_string(), "Invalid geometry 'Cube': no vertices");
        assert!(!err.is_content());

        let err: CacheError = DeviceError::OutOfMemory.into();
        assert_eq!(err.to_string(), "Out of memory");
        assert!(!err.is_content());
    }
}
