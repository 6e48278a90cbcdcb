//! Asset sources
//!
//! The cache consumes decoded pixel buffers and shader source text, looked up
//! by asset path through an [`AssetSource`]. Sources report absence as
//! [`AssetError::NotFound`]; the cache turns that into a warning and an empty
//! result rather than a failure.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use thiserror::Error;

use crate::backend::TextureFormat;

/// Asset lookup error
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset '{0}' not found.")]
    NotFound(String),
    #[error("Failed to read asset '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode asset '{path}': {message}")]
    Decode { path: String, message: String },
}

/// Decoded pixel data, ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
}

impl PixelData {
    /// Bytes of tightly packed RGBA8 data for an image of this size.
    pub fn rgba_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    /// Wrap tightly packed RGBA8 pixels.
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            data,
        }
    }

    /// Decode an encoded image (PNG, JPEG, ...) into RGBA8.
    pub fn from_bytes(bytes: &[u8], flip_vertically: bool) -> Result<Self, String> {
        let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        Ok(Self::from_image(img, flip_vertically))
    }

    /// Convert a decoded image to RGBA8.
    pub fn from_image(img: DynamicImage, flip_vertically: bool) -> Self {
        let img = if flip_vertically { img.flipv() } else { img };
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::rgba(width, height, rgba.into_raw())
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4]) -> Self {
        Self::rgba(1, 1, color.to_vec())
    }

    /// Create a checkerboard texture
    pub fn checkerboard(size: u32, color1: [u8; 4], color2: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(Self::rgba_len(size, size));

        for y in 0..size {
            for x in 0..size {
                let is_even = ((x / 8) + (y / 8)) % 2 == 0;
                let color = if is_even { color1 } else { color2 };
                data.extend_from_slice(&color);
            }
        }

        Self::rgba(size, size, data)
    }
}

/// Read-only lookup of asset data by path
pub trait AssetSource: Send {
    /// Whether `path` has backing data.
    fn exists(&self, path: &str) -> bool;

    /// Full text of an asset (shader source).
    fn read_text(&self, path: &str) -> Result<String, AssetError>;

    /// Decoded pixels of an image asset.
    fn read_pixels(&self, path: &str) -> Result<PixelData, AssetError>;
}

/// In-memory asset source
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    texts: HashMap<String, String>,
    images: HashMap<String, PixelData>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert_text(path, text);
        self
    }

    pub fn with_pixels(mut self, path: impl Into<String>, pixels: PixelData) -> Self {
        self.insert_pixels(path, pixels);
        self
    }

    pub fn insert_text(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(path.into(), text.into());
    }

    pub fn insert_pixels(&mut self, path: impl Into<String>, pixels: PixelData) {
        self.images.insert(path.into(), pixels);
    }

    /// Remove any asset stored under `path`.
    pub fn remove(&mut self, path: &str) {
        self.texts.remove(path);
        self.images.remove(path);
    }
}

impl AssetSource for MemoryAssets {
    fn exists(&self, path: &str) -> bool {
        self.texts.contains_key(path) || self.images.contains_key(path)
    }

    fn read_text(&self, path: &str) -> Result<String, AssetError> {
        self.texts
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn read_pixels(&self, path: &str) -> Result<PixelData, AssetError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

/// Asset source rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
    flip_vertically: bool,
}

impl DirectoryAssets {
    /// Serve assets relative to `root`. Images are flipped vertically by default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            flip_vertically: true,
        }
    }

    /// Whether decoded images are flipped so that row 0 is the bottom.
    pub fn with_flip_vertically(mut self, flip: bool) -> Self {
        self.flip_vertically = flip;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        if path.is_empty() {
            return Err(AssetError::NotFound(path.to_string()));
        }
        let full = self.root.join(path);
        if full.is_file() {
            Ok(full)
        } else {
            Err(AssetError::NotFound(path.to_string()))
        }
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.resolve(path)?;
        std::fs::read(&full).map_err(|source| AssetError::Io {
            path: path.to_string(),
            source,
        })
    }
}

impl AssetSource for DirectoryAssets {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    fn read_text(&self, path: &str) -> Result<String, AssetError> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| AssetError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn read_pixels(&self, path: &str) -> Result<PixelData, AssetError> {
        let bytes = self.read_bytes(path)?;
        PixelData::from_bytes(&bytes, self.flip_vertically).map_err(|message| {
            AssetError::Decode {
                path: path.to_string(),
                message,
            }
        })
    }
}
