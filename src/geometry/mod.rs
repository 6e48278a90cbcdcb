//! Geometry buffer sets.
//!
//! This module turns in-memory mesh and shape data into device-resident
//! vertex layouts:
//!
//! - [`VertexAttributeData`] / [`MeshData`] - immutable source arrays
//! - [`GeometryBuilder`] - builds a [`GeometryBuffer`] from a [`GeometryDescriptor`]
//! - [`GeometryBuffer`] - vertex array plus static, index and per-instance buffers
//! - [`shapes`] - quad and line-bounds data for the synthetic buffer sets

mod attributes;
mod buffer;
mod builder;
pub mod shapes;

pub use attributes::{
    AttributeSemantic, InstanceAttribute, MeshData, VertexAttributeData, FIRST_INSTANCE_LOCATION,
};
pub use buffer::{GeometryBuffer, IndexBuffer, InstanceBuffer, LayoutSignature, StaticLayout};
pub use builder::{GeometryBuilder, GeometryDescriptor};
