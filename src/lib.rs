//! GPU Resource Cache - reference-counted sharing of GPU objects
//!
//! Scene components request textures, shader stages, linked programs and
//! geometry buffer sets by a stable key. The cache builds each resource once,
//! hands the same handle to every requester, and destroys it when the last
//! holder releases it.
//!
//! # Features
//! - One generic [`SlotCache`] per resource kind, keyed by asset path, stage pair or name
//! - Geometry buffer builder with interleaved, separated and position-only layouts,
//!   index buffers and per-instance buffers
//! - Compile, link and validate diagnostics surfaced as content errors
//! - Short and full text reports of cache population
//! - An abstract [`GraphicsDevice`] with an in-memory [`RecordingDevice`] for tests
//!
//! ```
//! use gpu_resource_cache::{CacheConfig, GraphicsCache, MemoryAssets, PixelData, RecordingDevice};
//!
//! let assets = MemoryAssets::new().with_pixels("tex.png", PixelData::solid_color([255; 4]));
//! let mut cache = GraphicsCache::new(RecordingDevice::new(), assets, CacheConfig::default());
//!
//! let first = cache.acquire_texture("tex.png").unwrap();
//! let second = cache.acquire_texture("tex.png").unwrap();
//! assert_eq!(first, second);
//! assert_eq!(cache.textures().ref_count("tex.png"), Some(2));
//!
//! cache.release_texture("tex.png");
//! cache.release_texture("tex.png");
//! assert!(cache.textures().is_empty());
//! ```

pub mod assets;
pub mod backend;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod shader;
pub mod shared;

pub use assets::{AssetError, AssetSource, DirectoryAssets, MemoryAssets, PixelData};
pub use backend::{
    BufferHandle, DeviceError, DeviceResult, GraphicsDevice, ProgramHandle, RecordingDevice,
    ShaderHandle, TextureHandle, VertexArrayHandle,
};
pub use cache::{GraphicsCache, ReleaseOutcome, SlotCache, TeardownReport};
pub use config::{CacheConfig, TextureSettings};
pub use diagnostics::FrameCounters;
pub use error::{CacheError, CacheResult, ContentStage};
pub use geometry::{GeometryBuffer, LayoutSignature, MeshData, StaticLayout};
pub use keys::{ProgramKey, ResourceKey, ResourceKind};
pub use shader::{ShaderBinding, ShaderPreset};
pub use shared::SharedGraphicsCache;
