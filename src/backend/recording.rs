//! Recording device for testing and development.
//!
//! This device doesn't perform actual GPU operations. It hands out ids,
//! remembers every live object, and counts creations and destructions per
//! object kind, so tests can check that the cache creates each resource once
//! and destroys it exactly once. Compiler, link and validate diagnostics can
//! be injected to exercise the cache's content-error paths.

use std::collections::HashMap;

use crate::backend::traits::*;
use crate::backend::types::*;

/// Kind of device object tracked by [`RecordingDevice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Texture,
    Shader,
    Program,
    VertexArray,
    Buffer,
}

/// Creation/destruction counters for one object kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    pub created: usize,
    pub destroyed: usize,
}

impl KindStats {
    pub fn live(&self) -> usize {
        self.created - self.destroyed
    }
}

#[derive(Debug, Clone)]
struct LiveObject {
    kind: ObjectKind,
    label: Option<String>,
}

/// In-memory [`GraphicsDevice`] that records everything done to it.
#[derive(Debug)]
pub struct RecordingDevice {
    next_id: u64,
    live: HashMap<u64, LiveObject>,
    stats: HashMap<ObjectKind, KindStats>,
    faults: Vec<String>,

    // Injected diagnostics
    compile_failures: Vec<(String, String)>,
    link_log: Option<String>,
    validate_log: Option<String>,
    buffer_budget: Option<usize>,

    // Per-object state
    shader_logs: HashMap<u64, String>,
    program_logs: HashMap<u64, String>,
    attached: HashMap<u64, Vec<ShaderHandle>>,
    attributes: HashMap<u64, Vec<(BufferHandle, VertexAttributePointer)>>,
    index_buffers: HashMap<u64, BufferHandle>,
    buffer_sizes: HashMap<u64, u64>,
    texture_descriptors: HashMap<u64, TextureDescriptor>,
}

impl RecordingDevice {
    /// Create a new recording device.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            live: HashMap::new(),
            stats: HashMap::new(),
            faults: Vec::new(),
            compile_failures: Vec::new(),
            link_log: None,
            validate_log: None,
            buffer_budget: None,
            shader_logs: HashMap::new(),
            program_logs: HashMap::new(),
            attached: HashMap::new(),
            attributes: HashMap::new(),
            index_buffers: HashMap::new(),
            buffer_sizes: HashMap::new(),
            texture_descriptors: HashMap::new(),
        }
    }

    /// Any shader whose source contains `marker` compiles with `log` as its diagnostics.
    pub fn fail_shaders_containing(&mut self, marker: impl Into<String>, log: impl Into<String>) {
        self.compile_failures.push((marker.into(), log.into()));
    }

    /// Every program link reports `log`.
    pub fn fail_link_with(&mut self, log: impl Into<String>) {
        self.link_log = Some(log.into());
    }

    /// Every program validation reports `log`.
    pub fn fail_validate_with(&mut self, log: impl Into<String>) {
        self.validate_log = Some(log.into());
    }

    /// Allow only `count` more buffer allocations before reporting out of memory.
    pub fn limit_buffers(&mut self, count: usize) {
        self.buffer_budget = Some(count);
    }

    /// Clear all injected failures.
    pub fn clear_failures(&mut self) {
        self.compile_failures.clear();
        self.link_log = None;
        self.validate_log = None;
        self.buffer_budget = None;
    }

    /// Creation/destruction counters for one kind.
    pub fn stats(&self, kind: ObjectKind) -> KindStats {
        self.stats.get(&kind).copied().unwrap_or_default()
    }

    /// Number of live objects of one kind.
    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.live.values().filter(|o| o.kind == kind).count()
    }

    /// Number of live objects of any kind.
    pub fn total_live(&self) -> usize {
        self.live.len()
    }

    /// Whether the object with this raw id is still alive.
    pub fn is_live(&self, raw: u64) -> bool {
        self.live.contains_key(&raw)
    }

    /// Debug label an object was created with.
    pub fn label(&self, raw: u64) -> Option<&str> {
        self.live.get(&raw).and_then(|o| o.label.as_deref())
    }

    /// Misuse observed so far (double destroy, wrong kind, unknown id).
    pub fn faults(&self) -> &[String] {
        &self.faults
    }

    /// Attribute wiring recorded for a vertex array.
    pub fn vertex_attributes(
        &self,
        vertex_array: VertexArrayHandle,
    ) -> &[(BufferHandle, VertexAttributePointer)] {
        self.attributes
            .get(&vertex_array.raw())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Index buffer bound to a vertex array.
    pub fn index_buffer(&self, vertex_array: VertexArrayHandle) -> Option<BufferHandle> {
        self.index_buffers.get(&vertex_array.raw()).copied()
    }

    /// Size in bytes a buffer was allocated with.
    pub fn buffer_size(&self, buffer: BufferHandle) -> Option<u64> {
        self.buffer_sizes.get(&buffer.raw()).copied()
    }

    /// Descriptor a texture was created with.
    pub fn texture_descriptor(&self, texture: TextureHandle) -> Option<&TextureDescriptor> {
        self.texture_descriptors.get(&texture.raw())
    }

    /// Stages currently attached to a program.
    pub fn attached_shaders(&self, program: ProgramHandle) -> &[ShaderHandle] {
        self.attached
            .get(&program.raw())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn allocate(&mut self, kind: ObjectKind, label: Option<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id, LiveObject { kind, label });
        self.stats.entry(kind).or_default().created += 1;
        id
    }

    fn release(&mut self, kind: ObjectKind, raw: u64) -> bool {
        match self.live.get(&raw) {
            Some(object) if object.kind == kind => {
                self.live.remove(&raw);
                self.stats.entry(kind).or_default().destroyed += 1;
                true
            }
            Some(object) => {
                let fault = format!("destroy {:?} {} which is a {:?}", kind, raw, object.kind);
                log::warn!("RecordingDevice: {}", fault);
                self.faults.push(fault);
                false
            }
            None => {
                let fault = format!("destroy unknown {:?} {}", kind, raw);
                log::warn!("RecordingDevice: {}", fault);
                self.faults.push(fault);
                false
            }
        }
    }

    fn require_live(&mut self, kind: ObjectKind, raw: u64, operation: &str) -> bool {
        match self.live.get(&raw) {
            Some(object) if object.kind == kind => true,
            _ => {
                let fault = format!("{} on dead or foreign {:?} {}", operation, kind, raw);
                log::warn!("RecordingDevice: {}", fault);
                self.faults.push(fault);
                false
            }
        }
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn name(&self) -> &str {
        "Recording Device"
    }

    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> DeviceResult<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(DeviceError::InvalidParameter(
                "texture dimensions cannot be zero".to_string(),
            ));
        }
        if pixels.len() != desc.data_size() {
            return Err(DeviceError::InvalidParameter(format!(
                "texture {:?} expects {} bytes of pixel data, got {}",
                desc.label,
                desc.data_size(),
                pixels.len()
            )));
        }

        let id = self.allocate(ObjectKind::Texture, desc.label.clone());
        self.texture_descriptors.insert(id, desc.clone());
        log::trace!(
            "RecordingDevice: creating texture {:?} ({}x{}) -> {}",
            desc.label,
            desc.width,
            desc.height,
            id
        );
        Ok(TextureHandle::from_raw(id))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        log::trace!("RecordingDevice: destroying texture {}", texture);
        if self.release(ObjectKind::Texture, texture.raw()) {
            self.texture_descriptors.remove(&texture.raw());
        }
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> DeviceResult<ShaderHandle> {
        let id = self.allocate(ObjectKind::Shader, Some(stage.name().to_string()));
        let log = self
            .compile_failures
            .iter()
            .find(|(marker, _)| source.contains(marker.as_str()))
            .map(|(_, log)| log.clone())
            .unwrap_or_default();
        log::trace!(
            "RecordingDevice: compiling {} shader ({} bytes) -> {}",
            stage.name(),
            source.len(),
            id
        );
        self.shader_logs.insert(id, log);
        Ok(ShaderHandle::from_raw(id))
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shader_logs
            .get(&shader.raw())
            .cloned()
            .unwrap_or_default()
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        log::trace!("RecordingDevice: destroying shader {}", shader);
        if self.release(ObjectKind::Shader, shader.raw()) {
            self.shader_logs.remove(&shader.raw());
        }
    }

    fn create_program(&mut self) -> DeviceResult<ProgramHandle> {
        let id = self.allocate(ObjectKind::Program, None);
        log::trace!("RecordingDevice: creating program -> {}", id);
        self.program_logs.insert(id, String::new());
        self.attached.insert(id, Vec::new());
        Ok(ProgramHandle::from_raw(id))
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if !self.require_live(ObjectKind::Program, program.raw(), "attach_shader")
            || !self.require_live(ObjectKind::Shader, shader.raw(), "attach_shader")
        {
            return;
        }
        self.attached.entry(program.raw()).or_default().push(shader);
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if let Some(stages) = self.attached.get_mut(&program.raw()) {
            stages.retain(|s| *s != shader);
        }
    }

    fn link_program(&mut self, program: ProgramHandle) {
        let stages = self.attached_shaders(program).to_vec();
        let log = if let Some(log) = &self.link_log {
            log.clone()
        } else if stages.len() != 2 {
            format!("expected 2 attached stages, found {}", stages.len())
        } else if stages
            .iter()
            .any(|s| !self.shader_info_log(*s).is_empty())
        {
            "attached stage failed to compile".to_string()
        } else {
            String::new()
        };
        log::trace!("RecordingDevice: linking program {}", program);
        self.program_logs.insert(program.raw(), log);
    }

    fn validate_program(&mut self, program: ProgramHandle) {
        let log = self.validate_log.clone().unwrap_or_default();
        log::trace!("RecordingDevice: validating program {}", program);
        self.program_logs.insert(program.raw(), log);
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.program_logs
            .get(&program.raw())
            .cloned()
            .unwrap_or_default()
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        log::trace!("RecordingDevice: destroying program {}", program);
        if self.release(ObjectKind::Program, program.raw()) {
            self.program_logs.remove(&program.raw());
            self.attached.remove(&program.raw());
        }
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle> {
        let id = self.allocate(ObjectKind::VertexArray, None);
        log::trace!("RecordingDevice: creating vertex array -> {}", id);
        Ok(VertexArrayHandle::from_raw(id))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        log::trace!("RecordingDevice: destroying vertex array {}", vertex_array);
        if self.release(ObjectKind::VertexArray, vertex_array.raw()) {
            self.attributes.remove(&vertex_array.raw());
            self.index_buffers.remove(&vertex_array.raw());
        }
    }

    fn create_buffer(
        &mut self,
        desc: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> DeviceResult<BufferHandle> {
        if let Some(budget) = self.buffer_budget.as_mut() {
            if *budget == 0 {
                return Err(DeviceError::OutOfMemory);
            }
            *budget -= 1;
        }
        if let Some(data) = data {
            if data.len() as u64 > desc.size {
                return Err(DeviceError::InvalidParameter(format!(
                    "buffer {:?} of size {} cannot hold {} bytes",
                    desc.label,
                    desc.size,
                    data.len()
                )));
            }
        }

        let id = self.allocate(ObjectKind::Buffer, desc.label.clone());
        self.buffer_sizes.insert(id, desc.size);
        log::trace!(
            "RecordingDevice: creating buffer {:?} (size: {}) -> {}",
            desc.label,
            desc.size,
            id
        );
        Ok(BufferHandle::from_raw(id))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        log::trace!("RecordingDevice: destroying buffer {}", buffer);
        if self.release(ObjectKind::Buffer, buffer.raw()) {
            self.buffer_sizes.remove(&buffer.raw());
        }
    }

    fn set_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayHandle,
        buffer: BufferHandle,
        pointer: &VertexAttributePointer,
    ) {
        if !self.require_live(ObjectKind::VertexArray, vertex_array.raw(), "set_vertex_attribute")
            || !self.require_live(ObjectKind::Buffer, buffer.raw(), "set_vertex_attribute")
        {
            return;
        }
        log::trace!(
            "RecordingDevice: vertex array {} location {} <- buffer {} (divisor {})",
            vertex_array,
            pointer.location,
            buffer,
            pointer.divisor
        );
        self.attributes
            .entry(vertex_array.raw())
            .or_default()
            .push((buffer, *pointer));
    }

    fn set_index_buffer(&mut self, vertex_array: VertexArrayHandle, buffer: BufferHandle) {
        if !self.require_live(ObjectKind::VertexArray, vertex_array.raw(), "set_index_buffer")
            || !self.require_live(ObjectKind::Buffer, buffer.raw(), "set_index_buffer")
        {
            return;
        }
        self.index_buffers.insert(vertex_array.raw(), buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_name() {
        let device = RecordingDevice::new();
        assert_eq!(device.name(), "Recording Device");
    }

    #[test]
    fn test_create_and_destroy_texture() {
        let mut device = RecordingDevice::new();
        let desc = TextureDescriptor {
            width: 2,
            height: 2,
            ..Default::default()
        };
        let texture = device.create_texture(&desc, &[0u8; 16]).unwrap();
        assert_eq!(device.live_count(ObjectKind::Texture), 1);

        device.destroy_texture(texture);
        assert_eq!(device.live_count(ObjectKind::Texture), 0);
        assert_eq!(
            device.stats(ObjectKind::Texture),
            KindStats {
                created: 1,
                destroyed: 1
            }
        );
        assert!(device.faults().is_empty());
    }

    #[test]
    fn test_texture_size_mismatch() {
        let mut device = RecordingDevice::new();
        let desc = TextureDescriptor {
            width: 2,
            height: 2,
            ..Default::default()
        };
        assert!(device.create_texture(&desc, &[0u8; 3]).is_err());
        assert_eq!(device.total_live(), 0);
    }

    #[test]
    fn test_double_destroy_is_recorded() {
        let mut device = RecordingDevice::new();
        let shader = device.compile_shader(ShaderStage::Vertex, "void main() {}").unwrap();
        device.destroy_shader(shader);
        device.destroy_shader(shader);
        assert_eq!(device.faults().len(), 1);
        assert_eq!(device.stats(ObjectKind::Shader).destroyed, 1);
    }

    #[test]
    fn test_injected_compile_log() {
        let mut device = RecordingDevice::new();
        device.fail_shaders_containing("#error", "0:1: error");
        let good = device.compile_shader(ShaderStage::Fragment, "void main() {}").unwrap();
        let bad = device.compile_shader(ShaderStage::Fragment, "#error\n").unwrap();
        assert!(device.shader_info_log(good).is_empty());
        assert_eq!(device.shader_info_log(bad), "0:1: error");
    }

    #[test]
    fn test_link_requires_two_stages() {
        let mut device = RecordingDevice::new();
        let vs = device.compile_shader(ShaderStage::Vertex, "vs").unwrap();
        let program = device.create_program().unwrap();
        device.attach_shader(program, vs);
        device.link_program(program);
        assert!(!device.program_info_log(program).is_empty());

        let fs = device.compile_shader(ShaderStage::Fragment, "fs").unwrap();
        device.attach_shader(program, fs);
        device.link_program(program);
        assert!(device.program_info_log(program).is_empty());
    }

    #[test]
    fn test_buffer_limit() {
        let mut device = RecordingDevice::new();
        device.limit_buffers(1);
        let desc = BufferDescriptor::new(16, BufferUsage::VERTEX);
        assert!(device.create_buffer(&desc, None).is_ok());
        assert_eq!(
            device.create_buffer(&desc, None),
            Err(DeviceError::OutOfMemory)
        );
    }
}
