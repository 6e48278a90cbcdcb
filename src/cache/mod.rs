//! The graphics resource cache.
//!
//! [`GraphicsCache`] owns the device and one [`SlotCache`] per resource kind:
//!
//! - textures, keyed by asset path
//! - vertex and fragment stages, keyed by asset path
//! - linked programs, keyed by the [`ProgramKey`] of their two stage handles
//! - geometry buffer sets, keyed by mesh path or a synthetic name
//!
//! Every `acquire_*` is paired with a `release_*` by the same owner. The
//! resource is built on the first acquisition and destroyed by the release
//! that brings its count back to zero. [`GraphicsCache::teardown_all`] sweeps
//! whatever is left before the device goes away.
//!
//! Stage and program caches are independent: a program may be released before
//! or after the stages it was linked from.

mod slot;

pub use slot::*;

use glam::Vec3;

use crate::assets::{AssetError, AssetSource};
use crate::backend::{GraphicsDevice, ProgramHandle, ShaderHandle, ShaderStage, TextureHandle};
use crate::config::CacheConfig;
use crate::diagnostics::{self, FrameCounters};
use crate::error::{CacheError, CacheResult, ContentStage};
use crate::geometry::{
    shapes, AttributeSemantic, GeometryBuffer, GeometryBuilder, GeometryDescriptor,
    InstanceAttribute, LayoutSignature, MeshData, StaticLayout, VertexAttributeData,
};
use crate::keys::{ProgramKey, ResourceKey, ResourceKind, SKYBOX, UI, UI_INSTANCED};

/// Per-instance layout of instanced mesh buffers
pub const INSTANCED_MESH_ATTRIBUTES: [InstanceAttribute; 1] = [InstanceAttribute::Mat4];

/// Per-instance layout of the instanced UI buffer (transform, 2-D offset)
pub const INSTANCED_UI_ATTRIBUTES: [InstanceAttribute; 2] =
    [InstanceAttribute::Mat4, InstanceAttribute::Vec2];

/// Why a cache miss produced no resource.
enum Miss {
    /// The source asset is unavailable; already logged.
    Absent,
    Failed(CacheError),
}

impl From<CacheError> for Miss {
    fn from(err: CacheError) -> Self {
        Self::Failed(err)
    }
}

fn settle<H>(result: Result<H, Miss>) -> CacheResult<Option<H>> {
    match result {
        Ok(handle) => Ok(Some(handle)),
        Err(Miss::Absent) => Ok(None),
        Err(Miss::Failed(err)) => Err(err),
    }
}

/// Read an asset, turning any lookup failure into a warning.
fn read_asset<T>(
    path: &str,
    read: impl FnOnce(&str) -> Result<T, AssetError>,
) -> Result<T, Miss> {
    read(path).map_err(|err| {
        log::warn!("{}", err);
        Miss::Absent
    })
}

fn content_error(key: ResourceKey, stage: ContentStage, info_log: String) -> CacheError {
    let err = CacheError::Content {
        key,
        stage,
        log: info_log,
    };
    log::error!("{}", err);
    err
}

fn compile_stage<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    assets: &dyn AssetSource,
    stage: ShaderStage,
    path: &str,
) -> Result<ShaderHandle, Miss> {
    let source = read_asset(path, |p| assets.read_text(p))?;
    let shader = device
        .compile_shader(stage, &source)
        .map_err(CacheError::from)?;

    let info_log = device.shader_info_log(shader);
    if !info_log.is_empty() {
        device.destroy_shader(shader);
        let content_stage = match stage {
            ShaderStage::Vertex => ContentStage::VertexCompile,
            ShaderStage::Fragment => ContentStage::FragmentCompile,
        };
        return Err(content_error(ResourceKey::Path(path.to_string()), content_stage, info_log).into());
    }
    Ok(shader)
}

fn link_program<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    key: ProgramKey,
) -> CacheResult<ProgramHandle> {
    let program = device.create_program()?;
    device.attach_shader(program, key.vertex);
    device.attach_shader(program, key.fragment);

    device.link_program(program);
    let info_log = device.program_info_log(program);
    if !info_log.is_empty() {
        device.destroy_program(program);
        return Err(content_error(ResourceKey::Pair(key), ContentStage::Link, info_log));
    }

    device.validate_program(program);
    let info_log = device.program_info_log(program);
    if !info_log.is_empty() {
        device.destroy_program(program);
        return Err(content_error(ResourceKey::Pair(key), ContentStage::Validate, info_log));
    }

    device.detach_shader(program, key.vertex);
    device.detach_shader(program, key.fragment);
    Ok(program)
}

fn quad_attributes() -> Vec<VertexAttributeData> {
    vec![
        VertexAttributeData::from_vec3(AttributeSemantic::Position, &shapes::QUAD_VERTICES),
        VertexAttributeData::from_vec2(AttributeSemantic::TexCoord, &shapes::QUAD_UVS),
    ]
}

fn mesh_descriptor(name: &str, mesh: &MeshData) -> GeometryDescriptor {
    let desc = GeometryDescriptor::new(name, StaticLayout::Separated)
        .with_attributes(mesh.separated_attributes());
    if mesh.indices.is_empty() {
        desc
    } else {
        desc.with_indices(mesh.indices.clone())
    }
}

fn mesh_signature(mesh: &MeshData, instance_attributes: &[InstanceAttribute]) -> LayoutSignature {
    LayoutSignature::new(StaticLayout::Separated, !mesh.indices.is_empty(), instance_attributes)
}

/// Entries destroyed by a teardown sweep, per resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub programs: usize,
    pub vertex_shaders: usize,
    pub fragment_shaders: usize,
    pub textures: usize,
    pub buffers: usize,
}

impl TeardownReport {
    pub fn total(&self) -> usize {
        self.programs + self.vertex_shaders + self.fragment_shaders + self.textures + self.buffers
    }
}

/// Process-scoped GPU resource cache over device `D`.
pub struct GraphicsCache<D: GraphicsDevice> {
    device: D,
    assets: Box<dyn AssetSource>,
    config: CacheConfig,
    counters: FrameCounters,
    textures: SlotCache<String, TextureHandle>,
    vertex_shaders: SlotCache<String, ShaderHandle>,
    fragment_shaders: SlotCache<String, ShaderHandle>,
    programs: SlotCache<ProgramKey, ProgramHandle>,
    buffers: SlotCache<String, GeometryBuffer>,
}

impl<D: GraphicsDevice> GraphicsCache<D> {
    /// Create an empty cache over `device`, reading sources from `assets`.
    pub fn new(device: D, assets: impl AssetSource + 'static, config: CacheConfig) -> Self {
        log::info!("Initializing graphics cache on {}", device.name());
        Self {
            device,
            assets: Box::new(assets),
            config,
            counters: FrameCounters::default(),
            textures: SlotCache::new(ResourceKind::Texture),
            vertex_shaders: SlotCache::new(ResourceKind::VertexShader),
            fragment_shaders: SlotCache::new(ResourceKind::FragmentShader),
            programs: SlotCache::new(ResourceKind::Program),
            buffers: SlotCache::new(ResourceKind::Geometry),
        }
    }

    // Textures

    /// Acquire the texture at `path`, uploading it on first use.
    ///
    /// Returns `Ok(None)` (with a warning) if the asset is unavailable.
    pub fn acquire_texture(&mut self, path: &str) -> CacheResult<Option<TextureHandle>> {
        let device = &mut self.device;
        let assets = &*self.assets;
        let settings = &self.config.texture;
        settle(self.textures.acquire_with(path, || {
            let pixels = read_asset(path, |p| assets.read_pixels(p))?;
            let desc = settings.descriptor(path, pixels.width, pixels.height, pixels.format);
            device
                .create_texture(&desc, &pixels.data)
                .map_err(|err| Miss::Failed(err.into()))
        }))
    }

    pub fn release_texture(&mut self, path: &str) -> ReleaseOutcome {
        self.textures.release(path, &mut self.device)
    }

    // Shader stages

    /// Acquire the vertex stage compiled from `path`.
    ///
    /// A non-empty compiler log fails with [`CacheError::Content`] and caches
    /// nothing. A missing source returns `Ok(None)`.
    pub fn acquire_vertex_stage(&mut self, path: &str) -> CacheResult<Option<ShaderHandle>> {
        let device = &mut self.device;
        let assets = &*self.assets;
        settle(
            self.vertex_shaders
                .acquire_with(path, || compile_stage(device, assets, ShaderStage::Vertex, path)),
        )
    }

    /// Acquire the fragment stage compiled from `path`.
    pub fn acquire_fragment_stage(&mut self, path: &str) -> CacheResult<Option<ShaderHandle>> {
        let device = &mut self.device;
        let assets = &*self.assets;
        settle(
            self.fragment_shaders
                .acquire_with(path, || compile_stage(device, assets, ShaderStage::Fragment, path)),
        )
    }

    pub fn release_vertex_stage(&mut self, path: &str) -> ReleaseOutcome {
        self.vertex_shaders.release(path, &mut self.device)
    }

    pub fn release_fragment_stage(&mut self, path: &str) -> ReleaseOutcome {
        self.fragment_shaders.release(path, &mut self.device)
    }

    // Programs

    /// Acquire the program linked from an already acquired stage pair.
    ///
    /// Link and validate diagnostics fail with [`CacheError::Content`]; the
    /// half-built program is destroyed and nothing is cached.
    pub fn acquire_program(&mut self, key: impl Into<ProgramKey>) -> CacheResult<ProgramHandle> {
        let key = key.into();
        let device = &mut self.device;
        self.programs.acquire_with(&key, || link_program(device, key))
    }

    pub fn release_program(&mut self, key: impl Into<ProgramKey>) -> ReleaseOutcome {
        let key: ProgramKey = key.into();
        self.programs.release(&key, &mut self.device)
    }

    // Geometry

    /// Acquire the buffer set cached under `name`, building it on a miss.
    ///
    /// A hit whose cached signature differs from `signature` fails with
    /// [`CacheError::InvalidGeometry`] and leaves the count unchanged.
    fn acquire_geometry(
        &mut self,
        name: &str,
        signature: LayoutSignature,
        describe: impl FnOnce(&CacheConfig) -> GeometryDescriptor,
    ) -> CacheResult<GeometryBuffer> {
        if let Some(cached) = self.buffers.get(name) {
            let found = cached.signature();
            if found != signature {
                let err = CacheError::InvalidGeometry {
                    key: ResourceKey::Name(name.to_string()),
                    reason: format!("cached as {}, requested {}", found, signature),
                };
                log::error!("{}", err);
                return Err(err);
            }
        }
        let device = &mut self.device;
        let config = &self.config;
        self.buffers
            .acquire_with(name, || GeometryBuilder::build(device, &describe(config)))
    }

    /// Acquire a separated, indexed buffer set for a mesh.
    ///
    /// `mesh` is only read on a miss.
    pub fn acquire_mesh_buffer(&mut self, name: &str, mesh: &MeshData) -> CacheResult<GeometryBuffer> {
        let signature = mesh_signature(mesh, &[]);
        self.acquire_geometry(name, signature, |_| mesh_descriptor(name, mesh))
    }

    /// Acquire a mesh buffer set with a per-instance transform buffer.
    pub fn acquire_instanced_mesh_buffer(
        &mut self,
        name: &str,
        mesh: &MeshData,
    ) -> CacheResult<GeometryBuffer> {
        let signature = mesh_signature(mesh, &INSTANCED_MESH_ATTRIBUTES);
        self.acquire_geometry(name, signature, |config| {
            mesh_descriptor(name, mesh)
                .with_instances(&INSTANCED_MESH_ATTRIBUTES, config.instance_capacity)
        })
    }

    /// Acquire a position-only buffer set for line geometry.
    pub fn acquire_line_buffer(&mut self, name: &str, vertices: &[Vec3]) -> CacheResult<GeometryBuffer> {
        let signature = LayoutSignature::new(StaticLayout::PositionOnly, false, &[]);
        self.acquire_geometry(name, signature, |_| {
            GeometryDescriptor::new(name, StaticLayout::PositionOnly).with_attribute(
                VertexAttributeData::from_vec3(AttributeSemantic::Position, vertices),
            )
        })
    }

    pub fn acquire_skybox_buffer(&mut self) -> CacheResult<GeometryBuffer> {
        let signature = LayoutSignature::new(StaticLayout::Interleaved, false, &[]);
        self.acquire_geometry(SKYBOX, signature, |_| {
            GeometryDescriptor::new(SKYBOX, StaticLayout::Interleaved).with_attributes(quad_attributes())
        })
    }

    pub fn acquire_ui_buffer(&mut self) -> CacheResult<GeometryBuffer> {
        let signature = LayoutSignature::new(StaticLayout::Interleaved, false, &[]);
        self.acquire_geometry(UI, signature, |_| {
            GeometryDescriptor::new(UI, StaticLayout::Interleaved).with_attributes(quad_attributes())
        })
    }

    pub fn acquire_instanced_ui_buffer(&mut self) -> CacheResult<GeometryBuffer> {
        let signature =
            LayoutSignature::new(StaticLayout::Interleaved, false, &INSTANCED_UI_ATTRIBUTES);
        self.acquire_geometry(UI_INSTANCED, signature, |config| {
            GeometryDescriptor::new(UI_INSTANCED, StaticLayout::Interleaved)
                .with_attributes(quad_attributes())
                .with_instances(&INSTANCED_UI_ATTRIBUTES, config.instance_capacity)
        })
    }

    /// Release any buffer set by name.
    pub fn release_buffer(&mut self, name: &str) -> ReleaseOutcome {
        self.buffers.release(name, &mut self.device)
    }

    pub fn release_mesh_buffer(&mut self, name: &str) -> ReleaseOutcome {
        self.release_buffer(name)
    }

    pub fn release_instanced_mesh_buffer(&mut self, name: &str) -> ReleaseOutcome {
        self.release_buffer(name)
    }

    pub fn release_line_buffer(&mut self, name: &str) -> ReleaseOutcome {
        self.release_buffer(name)
    }

    pub fn release_skybox_buffer(&mut self) -> ReleaseOutcome {
        self.release_buffer(SKYBOX)
    }

    pub fn release_ui_buffer(&mut self) -> ReleaseOutcome {
        self.release_buffer(UI)
    }

    pub fn release_instanced_ui_buffer(&mut self) -> ReleaseOutcome {
        self.release_buffer(UI_INSTANCED)
    }

    // Lifecycle

    /// Destroy every cached resource regardless of its count.
    ///
    /// Programs go first, then stages, textures and buffer sets. Every cache
    /// is empty afterwards.
    pub fn teardown_all(&mut self) -> TeardownReport {
        let report = TeardownReport {
            programs: self.programs.drain(&mut self.device),
            vertex_shaders: self.vertex_shaders.drain(&mut self.device),
            fragment_shaders: self.fragment_shaders.drain(&mut self.device),
            textures: self.textures.drain(&mut self.device),
            buffers: self.buffers.drain(&mut self.device),
        };
        log::info!("Graphics cache teardown: {} resources destroyed", report.total());
        report
    }

    /// Whether no resource of any kind is cached.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
            && self.vertex_shaders.is_empty()
            && self.fragment_shaders.is_empty()
            && self.programs.is_empty()
            && self.buffers.is_empty()
    }

    // Introspection

    pub fn textures(&self) -> &SlotCache<String, TextureHandle> {
        &self.textures
    }

    pub fn vertex_shaders(&self) -> &SlotCache<String, ShaderHandle> {
        &self.vertex_shaders
    }

    pub fn fragment_shaders(&self) -> &SlotCache<String, ShaderHandle> {
        &self.fragment_shaders
    }

    pub fn programs(&self) -> &SlotCache<ProgramKey, ProgramHandle> {
        &self.programs
    }

    pub fn buffers(&self) -> &SlotCache<String, GeometryBuffer> {
        &self.buffers
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable device access for work outside the cache (draws, per-frame uploads).
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn assets(&self) -> &dyn AssetSource {
        &*self.assets
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn counters(&self) -> &FrameCounters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut FrameCounters {
        &mut self.counters
    }

    /// See [`diagnostics::short_report`].
    pub fn short_info(&self) -> String {
        diagnostics::short_report(self)
    }

    /// See [`diagnostics::full_report`].
    pub fn full_info(&self) -> String {
        diagnostics::full_report(self)
    }
}

impl<D: GraphicsDevice> Drop for GraphicsCache<D> {
    fn drop(&mut self) {
        if !self.is_empty() {
            log::warn!("Graphics cache dropped with live resources, sweeping");
            self.teardown_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryAssets, PixelData};
    use crate::backend::{ObjectKind, RecordingDevice, TextureFormat};

    const BROKEN: &str = "#error broken";

    fn assets() -> MemoryAssets {
        MemoryAssets::new()
            .with_pixels("tex.png", PixelData::checkerboard(4, [255; 4], [0, 0, 0, 255]))
            .with_text("a.glsl", "void main() { gl_Position = vec4(0.0); }")
            .with_text("b.glsl", "void main() {}")
            .with_text("c.glsl", "void main() { discard; }")
            .with_text("broken.glsl", BROKEN)
    }

    fn cache() -> GraphicsCache<RecordingDevice> {
        let mut device = RecordingDevice::new();
        device.fail_shaders_containing(BROKEN, "0:1: error: broken");
        GraphicsCache::new(device, assets(), CacheConfig::default())
    }

    fn cube() -> MeshData {
        MeshData::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .with_normals(vec![Vec3::Z; 4])
    }

    #[test]
    fn test_texture_uses_settings() {
        let mut cache = cache();
        let tex = cache.acquire_texture("tex.png").unwrap().unwrap();

        let desc = cache.device().texture_descriptor(tex).unwrap();
        assert_eq!((desc.width, desc.height), (4, 4));
        assert!(desc.generate_mipmaps);
        assert_eq!(desc.label.as_deref(), Some("tex.png"));
        cache.teardown_all();
    }

    #[test]
    fn test_texture_keeps_pixel_format() {
        let assets = assets().with_pixels(
            "mask.png",
            PixelData {
                width: 2,
                height: 2,
                format: TextureFormat::R8Unorm,
                data: vec![0, 64, 128, 255],
            },
        );
        let mut cache = GraphicsCache::new(RecordingDevice::new(), assets, CacheConfig::default());
        let tex = cache.acquire_texture("mask.png").unwrap().unwrap();

        let desc = cache.device().texture_descriptor(tex).unwrap();
        assert_eq!(desc.format, TextureFormat::R8Unorm);
        assert_eq!(desc.data_size(), 4);
        cache.teardown_all();
        assert!(cache.device().faults().is_empty());
    }

    #[test]
    fn test_missing_texture_is_none() {
        let mut cache = cache();
        assert_eq!(cache.acquire_texture("nope.png"), Ok(None));
        assert!(cache.textures().is_empty());
        assert_eq!(cache.device().stats(ObjectKind::Texture).created, 0);
    }

    #[test]
    fn test_compile_failure_destroys_shader() {
        let mut cache = cache();
        let err = cache.acquire_fragment_stage("broken.glsl").unwrap_err();
        match err {
            CacheError::Content { key, stage, log } => {
                assert_eq!(key, ResourceKey::Path("broken.glsl".into()));
                assert_eq!(stage, ContentStage::FragmentCompile);
                assert_eq!(log, "0:1: error: broken");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(cache.fragment_shaders().is_empty());
        assert_eq!(cache.device().live_count(ObjectKind::Shader), 0);
    }

    #[test]
    fn test_program_detaches_stages() {
        let mut cache = cache();
        let v = cache.acquire_vertex_stage("a.glsl").unwrap().unwrap();
        let f = cache.acquire_fragment_stage("b.glsl").unwrap().unwrap();
        let program = cache.acquire_program((v, f)).unwrap();

        assert!(cache.device().attached_shaders(program).is_empty());
        assert_eq!(cache.programs().ref_count(&ProgramKey::new(v, f)), Some(1));
        cache.teardown_all();
    }

    #[test]
    fn test_link_failure_leaves_no_program() {
        let mut cache = cache();
        let v = cache.acquire_vertex_stage("a.glsl").unwrap().unwrap();
        let f = cache.acquire_fragment_stage("b.glsl").unwrap().unwrap();
        cache.device_mut().fail_link_with("link error");

        let err = cache.acquire_program((v, f)).unwrap_err();
        assert!(matches!(
            err,
            CacheError::Content {
                stage: ContentStage::Link,
                ..
            }
        ));
        assert!(cache.programs().is_empty());
        assert_eq!(cache.device().live_count(ObjectKind::Program), 0);
        // Stages are untouched
        assert_eq!(cache.vertex_shaders().ref_count("a.glsl"), Some(1));
        cache.teardown_all();
    }

    #[test]
    fn test_validate_failure_leaves_no_program() {
        let mut cache = cache();
        let v = cache.acquire_vertex_stage("a.glsl").unwrap().unwrap();
        let f = cache.acquire_fragment_stage("b.glsl").unwrap().unwrap();
        cache.device_mut().fail_validate_with("validation error");

        let err = cache.acquire_program((v, f)).unwrap_err();
        assert!(matches!(
            err,
            CacheError::Content {
                stage: ContentStage::Validate,
                ..
            }
        ));
        assert!(cache.programs().is_empty());
        assert_eq!(cache.device().live_count(ObjectKind::Program), 0);
        cache.teardown_all();
    }

    #[test]
    fn test_program_release_independent_of_stages() {
        let mut cache = cache();
        let v = cache.acquire_vertex_stage("a.glsl").unwrap().unwrap();
        let f = cache.acquire_fragment_stage("b.glsl").unwrap().unwrap();
        cache.acquire_program((v, f)).unwrap();

        cache.release_vertex_stage("a.glsl");
        cache.release_fragment_stage("b.glsl");
        assert_eq!(cache.device().live_count(ObjectKind::Shader), 0);
        assert_eq!(cache.programs().len(), 1);

        assert_eq!(cache.release_program((v, f)), ReleaseOutcome::Destroyed);
        assert!(cache.is_empty());
        assert!(cache.device().faults().is_empty());
    }

    #[test]
    fn test_mesh_buffer_is_indexed_and_separated() {
        let mut cache = cache();
        let buffer = cache.acquire_mesh_buffer("quad.obj", &cube()).unwrap();
        assert_eq!(buffer.layout(), StaticLayout::Separated);
        assert_eq!(buffer.element_count(), 6);
        assert!(!buffer.is_instanced());

        let wiring = cache.device().vertex_attributes(buffer.vertex_array());
        let locations: Vec<_> = wiring.iter().map(|(_, p)| p.location).collect();
        assert_eq!(locations, vec![0, 2]);
        cache.teardown_all();
    }

    #[test]
    fn test_instanced_mesh_buffer() {
        let mut cache = cache();
        let buffer = cache.acquire_instanced_mesh_buffer("quad.obj", &cube()).unwrap();
        let instance = buffer.instance_buffer().unwrap();
        assert_eq!(instance.attributes, INSTANCED_MESH_ATTRIBUTES.to_vec());
        assert_eq!(instance.capacity, 64);
        assert_eq!(
            cache.device().buffer_size(instance.handle),
            Some(64 * 64)
        );
        cache.teardown_all();
    }

    #[test]
    fn test_mesh_name_reused_with_other_layout() {
        let mut cache = cache();
        let plain = cache.acquire_mesh_buffer("Cube", &cube()).unwrap();

        let err = cache.acquire_instanced_mesh_buffer("Cube", &cube()).unwrap_err();
        match err {
            CacheError::InvalidGeometry { key, reason } => {
                assert_eq!(key, ResourceKey::Name("Cube".into()));
                assert_eq!(
                    reason,
                    "cached as Separated indexed, requested Separated indexed instanced [Mat4]"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(cache.buffers().ref_count("Cube"), Some(1));
        assert_eq!(cache.buffers().get("Cube"), Some(&plain));

        // Same shape still shares
        assert_eq!(cache.acquire_mesh_buffer("Cube", &cube()).unwrap(), plain);
        assert_eq!(cache.buffers().ref_count("Cube"), Some(2));
        cache.teardown_all();
    }

    #[test]
    fn test_ui_buffers_do_not_alias() {
        let mut cache = cache();
        let ui = cache.acquire_ui_buffer().unwrap();
        let instanced = cache.acquire_instanced_ui_buffer().unwrap();
        assert_ne!(ui.vertex_array(), instanced.vertex_array());
        assert!(!ui.is_instanced());

        let instance = instanced.instance_buffer().unwrap();
        assert_eq!(instance.stride, 72);
        assert_eq!(cache.buffers().len(), 2);
        cache.teardown_all();
    }

    #[test]
    fn test_skybox_and_line_buffers() {
        let mut cache = cache();
        let skybox = cache.acquire_skybox_buffer().unwrap();
        assert_eq!(skybox.layout(), StaticLayout::Interleaved);
        assert_eq!(skybox.vertex_count(), 6);

        let lines = cache
            .acquire_line_buffer("LineBounds", &shapes::line_bounds())
            .unwrap();
        assert_eq!(lines.layout(), StaticLayout::PositionOnly);
        assert_eq!(lines.vertex_count(), 24);

        assert_eq!(cache.release_skybox_buffer(), ReleaseOutcome::Destroyed);
        assert_eq!(cache.release_line_buffer("LineBounds"), ReleaseOutcome::Destroyed);
        assert_eq!(cache.device().total_live(), 0);
    }

    #[test]
    fn test_buffer_release_destroys_all_buffers() {
        let mut cache = cache();
        cache.acquire_instanced_mesh_buffer("quad.obj", &cube()).unwrap();
        assert_eq!(cache.device().live_count(ObjectKind::Buffer), 3);
        assert_eq!(cache.device().live_count(ObjectKind::VertexArray), 1);

        cache.release_instanced_mesh_buffer("quad.obj");
        assert_eq!(cache.device().live_count(ObjectKind::Buffer), 0);
        assert_eq!(cache.device().live_count(ObjectKind::VertexArray), 0);
    }

    #[test]
    fn test_teardown_order_and_report() {
        let mut cache = cache();
        cache.acquire_texture("tex.png").unwrap();
        cache.acquire_texture("tex.png").unwrap();
        let v = cache.acquire_vertex_stage("a.glsl").unwrap().unwrap();
        let f = cache.acquire_fragment_stage("b.glsl").unwrap().unwrap();
        let g = cache.acquire_fragment_stage("c.glsl").unwrap().unwrap();
        cache.acquire_program((v, f)).unwrap();
        cache.acquire_program((v, g)).unwrap();
        cache.acquire_ui_buffer().unwrap();

        let report = cache.teardown_all();
        assert_eq!(
            report,
            TeardownReport {
                programs: 2,
                vertex_shaders: 1,
                fragment_shaders: 2,
                textures: 1,
                buffers: 1,
            }
        );
        assert!(cache.is_empty());
        assert_eq!(cache.device().total_live(), 0);
        assert!(cache.device().faults().is_empty());
    }
}
