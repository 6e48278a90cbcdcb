//! Common utilities for cache integration tests.

#![allow(dead_code)]

use glam::{Vec2, Vec3};

use gpu_resource_cache::{
    CacheConfig, GraphicsCache, MemoryAssets, MeshData, PixelData, RecordingDevice,
};

/// Marker that makes the recording device report a compile error
pub const BROKEN_MARKER: &str = "#error deliberately broken";

pub const COMPILE_LOG: &str = "0:1: error: deliberately broken";

pub const VERTEX_A: &str = "a.glsl";
pub const FRAGMENT_B: &str = "b.glsl";
pub const FRAGMENT_C: &str = "c.glsl";
pub const BROKEN_SHADER: &str = "broken.glsl";
pub const TEXTURE: &str = "tex.png";

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assets used by most tests.
pub fn test_assets() -> MemoryAssets {
    MemoryAssets::new()
        .with_pixels(
            TEXTURE,
            PixelData::checkerboard(16, [255, 255, 255, 255], [0, 0, 0, 255]),
        )
        .with_pixels("other.png", PixelData::solid_color([0, 128, 255, 255]))
        .with_text(VERTEX_A, "void main() { gl_Position = vec4(0.0); }")
        .with_text(FRAGMENT_B, "void main() { color = vec4(1.0); }")
        .with_text(FRAGMENT_C, "void main() { color = vec4(0.5); }")
        .with_text(BROKEN_SHADER, BROKEN_MARKER)
}

/// A fresh cache over a recording device that flags [`BROKEN_MARKER`] sources.
pub fn test_cache() -> GraphicsCache<RecordingDevice> {
    init_logging();
    let mut device = RecordingDevice::new();
    device.fail_shaders_containing(BROKEN_MARKER, COMPILE_LOG);
    GraphicsCache::new(device, test_assets(), CacheConfig::default())
}

/// Unit cube with positions, UVs and normals, as a stand-in for a decoded mesh.
pub fn cube_mesh() -> MeshData {
    let positions = vec![
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
    ];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let normals = positions.iter().map(|p| p.normalize()).collect();
    let indices = vec![
        0, 1, 2, 0, 2, 3, // back
        4, 6, 5, 4, 7, 6, // front
        0, 4, 5, 0, 5, 1, // bottom
        3, 2, 6, 3, 6, 7, // top
        0, 3, 7, 0, 7, 4, // left
        1, 5, 6, 1, 6, 2, // right
    ];
    MeshData::new(positions, indices)
        .with_uvs(uvs)
        .with_normals(normals)
}
