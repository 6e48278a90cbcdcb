//! Debug scene
//!
//! Builds the engine's debug scene against a [`RecordingDevice`]: a row of
//! textured primitives sharing one debug texture and one lit shader, a monkey
//! mesh, a line-bounds overlay, the skybox and the UI quads. Runs a few frames
//! while bumping the frame counters, prints the cache report and tears
//! everything down.
//!
//! ```bash
//! cargo run --example debug_scene -- --frames 5 --full
//! ```

use std::f32::consts::TAU;
use std::time::Instant;

use clap::Parser;
use glam::{Vec2, Vec3};

use gpu_resource_cache::geometry::shapes;
use gpu_resource_cache::shader::{FONT_TEXTURE, MISSING_TEXTURE};
use gpu_resource_cache::{
    CacheConfig, CacheResult, GeometryBuffer, GraphicsCache, MemoryAssets, MeshData, PixelData,
    RecordingDevice, ShaderBinding, ShaderPreset,
};

const DEBUG_TEXTURE: &str = "Crux/Assets/Textures/Required/Debug.jpg";
const MONKEY: &str = "Crux/Assets/Models/Required/Monkey.obj";
const LINE_BOUNDS: &str = "LineBounds";

const PRIMITIVES: [&str; 6] = ["Quad", "Cube", "Cylinder", "Cone", "Sphere", "Torus"];

/// Debug scene cache statistics.
#[derive(Parser, Debug)]
#[command(
    name = "debug_scene",
    about = "Builds the debug scene against a recording device and prints cache statistics"
)]
struct Args {
    /// Number of frames to simulate.
    #[arg(long, default_value = "3")]
    frames: u32,

    /// Print every cached key with its user count.
    #[arg(long)]
    full: bool,

    /// Extra copies of the primitive row (each shares the same resources).
    #[arg(long, default_value = "1")]
    copies: u32,
}

/// One drawable object holding cache resources.
struct MeshRenderer {
    mesh_key: String,
    shader: ShaderBinding,
    buffer: GeometryBuffer,
    triangles: u64,
}

impl MeshRenderer {
    fn new(
        cache: &mut GraphicsCache<RecordingDevice>,
        mesh_key: &str,
        mesh: &MeshData,
    ) -> CacheResult<Option<Self>> {
        let Some(shader) = cache.load_preset_shader(ShaderPreset::Lit, Some(DEBUG_TEXTURE))? else {
            return Ok(None);
        };
        let buffer = match cache.acquire_mesh_buffer(mesh_key, mesh) {
            Ok(buffer) => buffer,
            Err(err) => {
                cache.release_shader(&shader);
                return Err(err);
            }
        };
        Ok(Some(Self {
            mesh_key: mesh_key.to_string(),
            shader,
            buffer,
            triangles: mesh.triangle_count() as u64,
        }))
    }

    fn release(self, cache: &mut GraphicsCache<RecordingDevice>) {
        cache.release_mesh_buffer(&self.mesh_key);
        cache.release_shader(&self.shader);
    }
}

/// Revolve a 2-D profile (x = radius, y = height) around the Y axis.
fn revolve(profile: &[Vec2], segments: u32) -> MeshData {
    let rings = profile.len() as u32;
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut normals = Vec::new();
    for s in 0..=segments {
        let angle = s as f32 / segments as f32 * TAU;
        let (sin, cos) = angle.sin_cos();
        for (r, point) in profile.iter().enumerate() {
            let position = Vec3::new(point.x * cos, point.y, point.x * sin);
            positions.push(position);
            uvs.push(Vec2::new(
                s as f32 / segments as f32,
                r as f32 / (rings - 1).max(1) as f32,
            ));
            normals.push(Vec3::new(cos, 0.0, sin));
        }
    }

    let mut indices = Vec::new();
    for s in 0..segments {
        for r in 0..rings - 1 {
            let a = s * rings + r;
            let b = (s + 1) * rings + r;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    MeshData::new(positions, indices)
        .with_uvs(uvs)
        .with_normals(normals)
}

fn primitive_mesh(name: &str) -> MeshData {
    match name {
        "Quad" => MeshData::new(
            vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .with_uvs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
        .with_normals(vec![Vec3::Z; 4]),
        "Cube" => revolve(&[Vec2::new(0.7, -0.5), Vec2::new(0.7, 0.5)], 4),
        "Cylinder" => revolve(&[Vec2::new(0.5, -0.5), Vec2::new(0.5, 0.5)], 24),
        "Cone" => revolve(&[Vec2::new(0.5, -0.5), Vec2::new(0.0, 0.5)], 24),
        "Torus" => {
            let tube: Vec<_> = (0..=12)
                .map(|i| {
                    let (sin, cos) = (i as f32 / 12.0 * TAU).sin_cos();
                    Vec2::new(0.5 + 0.2 * cos, 0.2 * sin)
                })
                .collect();
            revolve(&tube, 24)
        }
        _ => sphere(12),
    }
}

fn sphere(rings: u32) -> MeshData {
    let profile: Vec<_> = (0..=rings)
        .map(|i| {
            let (sin, cos) = (i as f32 / rings as f32 * std::f32::consts::PI).sin_cos();
            Vec2::new(0.5 * sin, -0.5 * cos)
        })
        .collect();
    revolve(&profile, rings * 2)
}

fn scene_assets() -> MemoryAssets {
    let mut assets = MemoryAssets::new()
        .with_pixels(
            DEBUG_TEXTURE,
            PixelData::checkerboard(64, [255, 255, 255, 255], [40, 40, 40, 255]),
        )
        .with_pixels(MISSING_TEXTURE, PixelData::solid_color([255, 0, 255, 255]))
        .with_pixels(FONT_TEXTURE, PixelData::solid_color([255, 255, 255, 255]));
    for preset in ShaderPreset::ALL {
        assets.insert_text(preset.vertex_path(), "#version 330 core\nvoid main() {}\n");
        assets.insert_text(preset.fragment_path(), "#version 330 core\nvoid main() {}\n");
    }
    assets
}

fn run(args: &Args) -> CacheResult<()> {
    let mut cache = GraphicsCache::new(RecordingDevice::new(), scene_assets(), CacheConfig::default());

    let mut renderers = Vec::new();
    for _ in 0..args.copies.max(1) {
        for name in PRIMITIVES {
            let key = format!("Crux/Assets/Models/Required/Primitives/{}.obj", name);
            if let Some(renderer) = MeshRenderer::new(&mut cache, &key, &primitive_mesh(name))? {
                renderers.push(renderer);
            }
        }
    }
    if let Some(monkey) = MeshRenderer::new(&mut cache, MONKEY, &sphere(16))? {
        renderers.push(monkey);
    }

    let outline = cache.load_preset_shader(ShaderPreset::Outline, None)?;
    let line_bounds = cache.acquire_line_buffer(LINE_BOUNDS, &shapes::line_bounds())?;
    let skybox_shader = cache.load_preset_shader(ShaderPreset::Skybox, None)?;
    cache.acquire_skybox_buffer()?;
    let font = cache.load_preset_shader(ShaderPreset::Font, None)?;
    cache.acquire_ui_buffer()?;
    cache.acquire_instanced_ui_buffer()?;

    let mut last = Instant::now();
    for _ in 0..args.frames {
        cache.counters_mut().reset();
        for renderer in &renderers {
            cache.counters_mut().record_mesh_draw(renderer.triangles);
            // Bounds overlay
            cache
                .counters_mut()
                .record_line_draw(line_bounds.vertex_count() as u64 / 2);
            log::trace!(
                "draw {} ({} elements)",
                renderer.mesh_key,
                renderer.buffer.element_count()
            );
        }
        // Skybox and one UI pass
        cache.counters_mut().record_mesh_draw(2);
        cache.counters_mut().record_mesh_draw(2);

        let now = Instant::now();
        cache
            .counters_mut()
            .set_frame_time(now.duration_since(last).as_secs_f64());
        last = now;
    }

    if args.full {
        println!("{}", cache.full_info());
    } else {
        println!("{}", cache.short_info());
    }

    // Scene unload: the first row releases normally, the rest is swept
    let keep = renderers.split_off(PRIMITIVES.len().min(renderers.len()));
    for renderer in renderers {
        renderer.release(&mut cache);
    }
    for binding in [outline, skybox_shader, font].into_iter().flatten() {
        cache.release_shader(&binding);
    }
    log::info!("{} renderers still holding resources", keep.len());

    let report = cache.teardown_all();
    println!(
        "Teardown: {} programs, {} vertex shaders, {} fragment shaders, {} textures, {} buffer sets",
        report.programs,
        report.vertex_shaders,
        report.fragment_shaders,
        report.textures,
        report.buffers
    );
    println!(
        "Live device objects after teardown: {}",
        cache.device().total_live()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        log::error!("Debug scene failed: {}", err);
        std::process::exit(1);
    }
}
