//! Geometry buffer builder.
//!
//! Turns immutable source attributes into a vertex-array object plus its
//! backing buffers. Three static arrangements are supported (interleaved,
//! separated and position-only), optionally augmented with an element buffer
//! and a dynamic per-instance buffer whose attributes advance once per drawn
//! instance.
//!
//! If any device call fails part way, every object created so far is
//! destroyed before the error is returned.

use crate::backend::{
    BufferDescriptor, BufferHandle, BufferUsage, GraphicsDevice, VertexArrayHandle,
    VertexAttributePointer,
};
use crate::error::{CacheError, CacheResult};
use crate::keys::ResourceKey;
use crate::geometry::{
    AttributeSemantic, GeometryBuffer, IndexBuffer, InstanceAttribute, InstanceBuffer,
    StaticLayout, VertexAttributeData, FIRST_INSTANCE_LOCATION,
};

/// Everything needed to build one [`GeometryBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDescriptor {
    pub label: String,
    pub layout: StaticLayout,
    pub attributes: Vec<VertexAttributeData>,
    pub indices: Option<Vec<u32>>,
    pub instance_attributes: Vec<InstanceAttribute>,
    /// Instances the dynamic buffer is initially sized for
    pub instance_capacity: u32,
}

impl GeometryDescriptor {
    pub fn new(label: impl Into<String>, layout: StaticLayout) -> Self {
        Self {
            label: label.into(),
            layout,
            attributes: Vec::new(),
            indices: None,
            instance_attributes: Vec::new(),
            instance_capacity: 0,
        }
    }

    pub fn with_attribute(mut self, attribute: VertexAttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<VertexAttributeData>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_instances(mut self, attributes: &[InstanceAttribute], capacity: u32) -> Self {
        self.instance_attributes = attributes.to_vec();
        self.instance_capacity = capacity;
        self
    }

    fn invalid(&self, reason: impl Into<String>) -> CacheError {
        CacheError::InvalidGeometry {
            key: ResourceKey::Name(self.label.clone()),
            reason: reason.into(),
        }
    }

    /// Check the descriptor and return the common vertex count.
    pub fn validate(&self) -> CacheResult<u32> {
        let Some(first) = self.attributes.first() else {
            return Err(self.invalid("no vertex attributes"));
        };
        for attribute in &self.attributes {
            attribute.validate().map_err(|reason| self.invalid(reason))?;
        }

        let vertex_count = first.vertex_count();
        if vertex_count == 0 {
            return Err(self.invalid("no vertices"));
        }
        if let Some(attr) = self
            .attributes
            .iter()
            .find(|a| a.vertex_count() != vertex_count)
        {
            return Err(self.invalid(format!(
                "{} attribute has {} vertices, expected {}",
                attr.semantic.name(),
                attr.vertex_count(),
                vertex_count
            )));
        }
        for (i, attr) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.semantic == attr.semantic) {
                return Err(self.invalid(format!(
                    "duplicate {} attribute",
                    attr.semantic.name()
                )));
            }
        }

        if self.layout == StaticLayout::PositionOnly
            && (self.attributes.len() != 1
                || first.semantic != AttributeSemantic::Position)
        {
            return Err(self.invalid("position-only layout takes exactly one position attribute"));
        }

        if let Some(indices) = &self.indices {
            if indices.is_empty() {
                return Err(self.invalid("empty index list"));
            }
            if let Some(index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(self.invalid(format!(
                    "index {} out of range for {} vertices",
                    index, vertex_count
                )));
            }
        }

        if !self.instance_attributes.is_empty() && self.instance_capacity == 0 {
            return Err(self.invalid("instance buffer with zero capacity"));
        }

        u32::try_from(vertex_count).map_err(|_| self.invalid("too many vertices"))
    }
}

/// Packed static vertex data plus the attribute wiring that reads it.
struct PackedVertices {
    bytes: Vec<u8>,
    pointers: Vec<VertexAttributePointer>,
}

fn pack_interleaved(attributes: &[VertexAttributeData], vertex_count: usize) -> PackedVertices {
    let stride: u32 = attributes.iter().map(|a| a.element_size()).sum();
    let mut floats = Vec::with_capacity(stride as usize / 4 * vertex_count);
    for vertex in 0..vertex_count {
        for attr in attributes {
            let n = attr.components as usize;
            floats.extend_from_slice(&attr.data[vertex * n..(vertex + 1) * n]);
        }
    }

    let mut offset = 0u64;
    let pointers = attributes
        .iter()
        .map(|attr| {
            let pointer = VertexAttributePointer::per_vertex(
                attr.semantic.location(),
                attr.components,
                stride,
                offset,
            );
            offset += attr.element_size() as u64;
            pointer
        })
        .collect();

    PackedVertices {
        bytes: bytemuck::cast_slice(&floats).to_vec(),
        pointers,
    }
}

fn pack_separated(attributes: &[VertexAttributeData]) -> PackedVertices {
    let mut bytes = Vec::new();
    let mut pointers = Vec::with_capacity(attributes.len());
    for attr in attributes {
        pointers.push(VertexAttributePointer::per_vertex(
            attr.semantic.location(),
            attr.components,
            attr.element_size(),
            bytes.len() as u64,
        ));
        bytes.extend_from_slice(attr.bytes());
    }
    PackedVertices { bytes, pointers }
}

fn instance_pointers(attributes: &[InstanceAttribute]) -> (u32, Vec<VertexAttributePointer>) {
    let stride: u32 = attributes.iter().map(|a| a.size()).sum();
    let mut pointers = Vec::new();
    let mut location = FIRST_INSTANCE_LOCATION;
    let mut offset = 0u64;
    for attr in attributes {
        let components = attr.components_per_location();
        for _ in 0..attr.locations() {
            pointers.push(VertexAttributePointer::per_instance(
                location, components, stride, offset,
            ));
            location += 1;
            offset += (components * std::mem::size_of::<f32>() as u32) as u64;
        }
    }
    (stride, pointers)
}

/// Device objects created so far, destroyed if the build fails.
#[derive(Default)]
struct Allocated {
    vertex_array: Option<VertexArrayHandle>,
    buffers: Vec<BufferHandle>,
}

impl Allocated {
    fn destroy<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        if let Some(vertex_array) = self.vertex_array {
            device.destroy_vertex_array(vertex_array);
        }
        for buffer in self.buffers {
            device.destroy_buffer(buffer);
        }
    }
}

/// Builds [`GeometryBuffer`]s on a device.
pub struct GeometryBuilder;

impl GeometryBuilder {
    /// Build the buffer set described by `desc`.
    pub fn build<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        desc: &GeometryDescriptor,
    ) -> CacheResult<GeometryBuffer> {
        let vertex_count = desc.validate()?;

        let mut allocated = Allocated::default();
        match Self::build_into(device, desc, vertex_count, &mut allocated) {
            Ok(buffer) => {
                log::debug!(
                    "GeometryBuilder: built '{}' ({:?}, {} vertices, {} buffers)",
                    desc.label,
                    desc.layout,
                    vertex_count,
                    buffer.buffers().count()
                );
                Ok(buffer)
            }
            Err(err) => {
                log::warn!("GeometryBuilder: failed to build '{}': {}", desc.label, err);
                allocated.destroy(device);
                Err(err)
            }
        }
    }

    fn build_into<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        desc: &GeometryDescriptor,
        vertex_count: u32,
        allocated: &mut Allocated,
    ) -> CacheResult<GeometryBuffer> {
        let vertex_array = device.create_vertex_array()?;
        allocated.vertex_array = Some(vertex_array);

        let packed = match desc.layout {
            StaticLayout::Interleaved => pack_interleaved(&desc.attributes, vertex_count as usize),
            StaticLayout::Separated | StaticLayout::PositionOnly => {
                pack_separated(&desc.attributes)
            }
        };
        let static_buffer = device.create_buffer(
            &BufferDescriptor::new(packed.bytes.len() as u64, BufferUsage::VERTEX | BufferUsage::STATIC)
                .with_label(format!("{} vertices", desc.label)),
            Some(&packed.bytes),
        )?;
        allocated.buffers.push(static_buffer);
        for pointer in &packed.pointers {
            device.set_vertex_attribute(vertex_array, static_buffer, pointer);
        }

        let index = match &desc.indices {
            Some(indices) => {
                let bytes: &[u8] = bytemuck::cast_slice(indices);
                let handle = device.create_buffer(
                    &BufferDescriptor::new(bytes.len() as u64, BufferUsage::INDEX | BufferUsage::STATIC)
                        .with_label(format!("{} indices", desc.label)),
                    Some(bytes),
                )?;
                allocated.buffers.push(handle);
                device.set_index_buffer(vertex_array, handle);
                Some(IndexBuffer {
                    handle,
                    count: indices.len() as u32,
                })
            }
            None => None,
        };

        let instance = if desc.instance_attributes.is_empty() {
            None
        } else {
            let (stride, pointers) = instance_pointers(&desc.instance_attributes);
            let handle = device.create_buffer(
                &BufferDescriptor::new(
                    stride as u64 * desc.instance_capacity as u64,
                    BufferUsage::VERTEX | BufferUsage::DYNAMIC,
                )
                .with_label(format!("{} instances", desc.label)),
                None,
            )?;
            allocated.buffers.push(handle);
            for pointer in &pointers {
                device.set_vertex_attribute(vertex_array, handle, pointer);
            }
            Some(InstanceBuffer {
                handle,
                attributes: desc.instance_attributes.clone(),
                stride,
                capacity: desc.instance_capacity,
            })
        };

        Ok(GeometryBuffer {
            vertex_array,
            static_buffer,
            layout: desc.layout,
            vertex_count,
            index,
            instance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ObjectKind, RecordingDevice};
    use glam::{Vec2, Vec3};

    fn triangle() -> Vec<VertexAttributeData> {
        vec![
            VertexAttributeData::from_vec3(
                AttributeSemantic::Position,
                &[Vec3::ZERO, Vec3::X, Vec3::Y],
            ),
            VertexAttributeData::from_vec2(
                AttributeSemantic::TexCoord,
                &[Vec2::ZERO, Vec2::X, Vec2::Y],
            ),
        ]
    }

    #[test]
    fn test_interleaved_layout() {
        let mut device = RecordingDevice::new();
        let desc =
            GeometryDescriptor::new("quad", StaticLayout::Interleaved).with_attributes(triangle());
        let buffer = GeometryBuilder::build(&mut device, &desc).unwrap();

        assert_eq!(buffer.vertex_count(), 3);
        assert_eq!(device.buffer_size(buffer.static_buffer()), Some(60));

        let pointers: Vec<_> = device
            .vertex_attributes(buffer.vertex_array())
            .iter()
            .map(|(_, p)| *p)
            .collect();
        assert_eq!(
            pointers,
            vec![
                VertexAttributePointer::per_vertex(0, 3, 20, 0),
                VertexAttributePointer::per_vertex(1, 2, 20, 12),
            ]
        );
    }

    #[test]
    fn test_separated_layout_with_indices() {
        let mut device = RecordingDevice::new();
        let desc = GeometryDescriptor::new("mesh", StaticLayout::Separated)
            .with_attributes(triangle())
            .with_indices(vec![0, 1, 2]);
        let buffer = GeometryBuilder::build(&mut device, &desc).unwrap();

        let pointers: Vec<_> = device
            .vertex_attributes(buffer.vertex_array())
            .iter()
            .map(|(_, p)| *p)
            .collect();
        assert_eq!(
            pointers,
            vec![
                VertexAttributePointer::per_vertex(0, 3, 12, 0),
                VertexAttributePointer::per_vertex(1, 2, 8, 36),
            ]
        );
        let index = buffer.index_buffer().unwrap();
        assert_eq!(index.count, 3);
        assert_eq!(device.index_buffer(buffer.vertex_array()), Some(index.handle));
        assert_eq!(buffer.element_count(), 3);
    }

    #[test]
    fn test_instance_buffer_wiring() {
        let mut device = RecordingDevice::new();
        let desc = GeometryDescriptor::new("ui", StaticLayout::Interleaved)
            .with_attributes(triangle())
            .with_instances(&[InstanceAttribute::Mat4, InstanceAttribute::Vec2], 16);
        let buffer = GeometryBuilder::build(&mut device, &desc).unwrap();

        let instance = buffer.instance_buffer().unwrap();
        assert_eq!(instance.stride, 72);
        assert_eq!(device.buffer_size(instance.handle), Some(72 * 16));

        let per_instance: Vec<_> = device
            .vertex_attributes(buffer.vertex_array())
            .iter()
            .filter(|(b, _)| *b == instance.handle)
            .map(|(_, p)| *p)
            .collect();
        assert_eq!(per_instance.len(), 5);
        assert!(per_instance.iter().all(|p| p.divisor == 1));
        assert_eq!(
            per_instance.iter().map(|p| p.location).collect::<Vec<_>>(),
            vec![3, 4, 5, 6, 7]
        );
        assert_eq!(per_instance[4], VertexAttributePointer::per_instance(7, 2, 72, 64));
    }

    #[test]
    fn test_position_only_rejects_extra_attributes() {
        let mut device = RecordingDevice::new();
        let desc = GeometryDescriptor::new("lines", StaticLayout::PositionOnly)
            .with_attributes(triangle());
        let err = GeometryBuilder::build(&mut device, &desc).unwrap_err();
        assert!(matches!(err, CacheError::InvalidGeometry { .. }));
        assert_eq!(device.total_live(), 0);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut device = RecordingDevice::new();
        let desc = GeometryDescriptor::new("mesh", StaticLayout::Separated)
            .with_attributes(triangle())
            .with_indices(vec![0, 1, 3]);
        assert!(GeometryBuilder::build(&mut device, &desc).is_err());
    }

    #[test]
    fn test_mismatched_vertex_counts() {
        let mut device = RecordingDevice::new();
        let mut attributes = triangle();
        attributes[1].data.truncate(4);
        let desc = GeometryDescriptor::new("mesh", StaticLayout::Separated)
            .with_attributes(attributes);
        assert!(GeometryBuilder::build(&mut device, &desc).is_err());
    }

    #[test]
    fn test_device_failure_cleans_up() {
        let mut device = RecordingDevice::new();
        device.limit_buffers(1);
        let desc = GeometryDescriptor::new("mesh", StaticLayout::Separated)
            .with_attributes(triangle())
            .with_indices(vec![0, 1, 2]);

        let err = GeometryBuilder::build(&mut device, &desc).unwrap_err();
        assert!(matches!(err, CacheError::Device(_)));
        assert_eq!(device.total_live(), 0);
        assert_eq!(device.stats(ObjectKind::Buffer).destroyed, 1);
        assert_eq!(device.stats(ObjectKind::VertexArray).destroyed, 1);
        assert!(device.faults().is_empty());
    }
}
