//! Device-resident buffer sets.

use crate::backend::{BufferHandle, GraphicsDevice, VertexArrayHandle};
use crate::cache::DeviceResource;
use crate::geometry::InstanceAttribute;

/// How static attributes are arranged in the static vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticLayout {
    /// All attributes of a vertex stored together
    Interleaved,
    /// Each attribute stored as its own contiguous block
    Separated,
    /// A single position attribute
    PositionOnly,
}

/// Element buffer of an indexed buffer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuffer {
    pub handle: BufferHandle,
    pub count: u32,
}

/// Dynamic per-instance buffer.
///
/// The builder only allocates it and wires its attributes; the renderer
/// rewrites its contents every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceBuffer {
    pub handle: BufferHandle,
    pub attributes: Vec<InstanceAttribute>,
    /// Bytes per instance
    pub stride: u32,
    /// Instances the initial allocation can hold
    pub capacity: u32,
}

/// Vertex shape of a buffer set.
///
/// Every acquisition under one name must ask for the same signature as the
/// buffer set already cached there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSignature {
    pub layout: StaticLayout,
    pub indexed: bool,
    pub instance_attributes: Vec<InstanceAttribute>,
}

impl LayoutSignature {
    pub fn new(layout: StaticLayout, indexed: bool, instance_attributes: &[InstanceAttribute]) -> Self {
        Self {
            layout,
            indexed,
            instance_attributes: instance_attributes.to_vec(),
        }
    }
}

impl std::fmt::Display for LayoutSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.layout)?;
        if self.indexed {
            f.write_str(" indexed")?;
        }
        if !self.instance_attributes.is_empty() {
            write!(f, " instanced {:?}", self.instance_attributes)?;
        }
        Ok(())
    }
}

/// A vertex-array object together with every buffer it reads from.
///
/// Owned by its cache entry. Holders only keep a copy of the handles and
/// never destroy them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryBuffer {
    pub(crate) vertex_array: VertexArrayHandle,
    pub(crate) static_buffer: BufferHandle,
    pub(crate) layout: StaticLayout,
    pub(crate) vertex_count: u32,
    pub(crate) index: Option<IndexBuffer>,
    pub(crate) instance: Option<InstanceBuffer>,
}

impl GeometryBuffer {
    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    pub fn static_buffer(&self) -> BufferHandle {
        self.static_buffer
    }

    pub fn layout(&self) -> StaticLayout {
        self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index.as_ref()
    }

    pub fn instance_buffer(&self) -> Option<&InstanceBuffer> {
        self.instance.as_ref()
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn is_instanced(&self) -> bool {
        self.instance.is_some()
    }

    pub fn signature(&self) -> LayoutSignature {
        LayoutSignature {
            layout: self.layout,
            indexed: self.is_indexed(),
            instance_attributes: self
                .instance
                .as_ref()
                .map(|i| i.attributes.clone())
                .unwrap_or_default(),
        }
    }

    /// Number of elements a draw of this buffer set covers.
    pub fn element_count(&self) -> u32 {
        self.index.map(|i| i.count).unwrap_or(self.vertex_count)
    }

    /// Every buffer owned by this set.
    pub fn buffers(&self) -> impl Iterator<Item = BufferHandle> + '_ {
        std::iter::once(self.static_buffer)
            .chain(self.index.map(|i| i.handle))
            .chain(self.instance.as_ref().map(|i| i.handle))
    }
}

impl<D: GraphicsDevice + ?Sized> DeviceResource<D> for GeometryBuffer {
    fn destroy(self, device: &mut D) {
        device.destroy_vertex_array(self.vertex_array);
        for buffer in self.buffers() {
            device.destroy_buffer(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_set(indexed: bool) -> GeometryBuffer {
        GeometryBuffer {
            vertex_array: VertexArrayHandle::from_raw(1),
            static_buffer: BufferHandle::from_raw(2),
            layout: StaticLayout::Separated,
            vertex_count: 8,
            index: indexed.then_some(IndexBuffer {
                handle: BufferHandle::from_raw(3),
                count: 36,
            }),
            instance: None,
        }
    }

    #[test]
    fn test_element_count() {
        assert_eq!(buffer_set(true).element_count(), 36);
        assert_eq!(buffer_set(false).element_count(), 8);
    }

    #[test]
    fn test_signature() {
        assert_eq!(
            buffer_set(true).signature(),
            LayoutSignature::new(StaticLayout::Separated, true, &[])
        );
        assert_ne!(buffer_set(true).signature(), buffer_set(false).signature());

        let mut instanced = buffer_set(true);
        instanced.instance = Some(InstanceBuffer {
            handle: BufferHandle::from_raw(4),
            attributes: vec![InstanceAttribute::Mat4],
            stride: 64,
            capacity: 8,
        });
        let signature = instanced.signature();
        assert_eq!(
            signature,
            LayoutSignature::new(StaticLayout::Separated, true, &[InstanceAttribute::Mat4])
        );
        assert_eq!(signature.to_string(), "Separated indexed instanced [Mat4]");
    }

    #[test]
    fn test_owned_buffers() {
        let buffers: Vec<_> = buffer_set(true).buffers().map(|b| b.raw()).collect();
        assert_eq!(buffers, vec![2, 3]);
    }
}
