//! Procedural geometry.
//!
//! Meshes are built as [`MeshData`]: a flat, interleaved `f32` vertex array, an index array
//! and the [`VertexFormat`] describing how the vertex array is laid out. The GL side binds
//! attribute `i` of the format to shader location `i`.

pub mod cube;
pub mod plane;
pub mod trefoil;

pub use cube::*;
pub use plane::*;
pub use trefoil::*;

use glam::{Vec2, Vec3, Vec4};

use crate::aabb::Aabb;

/// The meaning of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Normal,
    Uv,
    Color,
    Tangent,
}

impl AttributeKind {
    /// Number of `f32` components the attribute occupies.
    pub fn components(self) -> usize {
        match self {
            AttributeKind::Position | AttributeKind::Normal | AttributeKind::Color => 3,
            AttributeKind::Uv => 2,
            AttributeKind::Tangent => 4,
        }
    }
}

/// A single attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    pub location: u32,
    pub components: usize,
    /// Offset from the start of the vertex, in floats.
    pub offset: usize,
}

/// Layout of an interleaved vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexFormat {
    attributes: Vec<VertexAttribute>,
    stride: usize,
}

impl VertexFormat {
    /// Packs `kinds` in order; attribute `i` gets location `i`.
    pub fn new(kinds: &[AttributeKind]) -> Self {
        let mut offset = 0;
        let attributes = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                let attribute = VertexAttribute {
                    kind,
                    location: i as u32,
                    components: kind.components(),
                    offset,
                };
                offset += attribute.components;
                attribute
            })
            .collect();
        Self {
            attributes,
            stride: offset,
        }
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride_floats(&self) -> usize {
        self.stride
    }

    pub fn stride_bytes(&self) -> usize {
        self.stride * std::mem::size_of::<f32>()
    }

    pub fn attribute(&self, kind: AttributeKind) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.kind == kind)
    }

    pub fn offset_of(&self, kind: AttributeKind) -> Option<usize> {
        self.attribute(kind).map(|a| a.offset)
    }
}

/// CPU-side mesh: interleaved vertices plus triangle indices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub format: VertexFormat,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(format: VertexFormat) -> Self {
        Self {
            format,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Appends one vertex and returns its index.
    pub fn push_vertex(&mut self, vertex: &[f32]) -> Result<u32, String> {
        if vertex.len() != self.format.stride_floats() {
            return Err(format!(
                "vertex has {} floats, format stride is {}",
                vertex.len(),
                self.format.stride_floats()
            ));
        }
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(vertex);
        Ok(index)
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        match self.format.stride_floats() {
            0 => 0,
            stride => self.vertices.len() / stride,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the vertex array matches the format and that all indices are in range.
    pub fn validate(&self) -> Result<(), String> {
        let stride = self.format.stride_floats();
        if stride == 0 || self.vertices.len() % stride != 0 {
            return Err(format!(
                "{} floats is not a whole number of {}-float vertices",
                self.vertices.len(),
                stride
            ));
        }
        if self.indices.len() % 3 != 0 {
            return Err(format!("{} indices do not form triangles", self.indices.len()));
        }
        let count = self.vertex_count() as u32;
        if let Some(bad) = self.indices.iter().find(|&&i| i >= count) {
            return Err(format!("index {bad} out of range for {count} vertices"));
        }
        Ok(())
    }

    /// Reads the components of `kind` for the vertex at `index`.
    pub fn attribute(&self, index: usize, kind: AttributeKind) -> Option<&[f32]> {
        let attribute = self.format.attribute(kind)?;
        let start = index * self.format.stride_floats() + attribute.offset;
        self.vertices.get(start..start + attribute.components)
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.attribute(index, AttributeKind::Position)
            .map(Vec3::from_slice)
    }

    pub fn normal(&self, index: usize) -> Option<Vec3> {
        self.attribute(index, AttributeKind::Normal)
            .map(Vec3::from_slice)
    }

    /// Bounding box of all positions; invalid when the format has no positions.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points((0..self.vertex_count()).filter_map(|i| self.position(i)))
    }
}

/// Helper for writing interleaved vertices attribute by attribute.
#[derive(Default)]
pub(crate) struct VertexWriter {
    buf: Vec<f32>,
}

impl VertexWriter {
    pub fn vec2(mut self, v: Vec2) -> Self {
        self.buf.extend_from_slice(&v.to_array());
        self
    }

    pub fn vec3(mut self, v: Vec3) -> Self {
        self.buf.extend_from_slice(&v.to_array());
        self
    }

    pub fn vec4(mut self, v: Vec4) -> Self {
        self.buf.extend_from_slice(&v.to_array());
        self
    }

    pub fn finish(self) -> Vec<f32> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_packs_offsets_in_order() {
        let format = VertexFormat::new(&[
            AttributeKind::Position,
            AttributeKind::Uv,
            AttributeKind::Tangent,
        ]);
        assert_eq!(format.stride_floats(), 9);
        assert_eq!(format.stride_bytes(), 36);
        assert_eq!(format.offset_of(AttributeKind::Uv), Some(3));
        assert_eq!(format.offset_of(AttributeKind::Tangent), Some(5));
        assert_eq!(format.offset_of(AttributeKind::Normal), None);
        assert_eq!(format.attributes()[2].location, 2);
    }

    #[test]
    fn push_vertex_rejects_wrong_stride() {
        let mut mesh = MeshData::new(VertexFormat::new(&[AttributeKind::Position]));
        assert!(mesh.push_vertex(&[0.0, 1.0]).is_err());
        assert_eq!(mesh.push_vertex(&[0.0, 1.0, 2.0]), Ok(0));
        assert_eq!(mesh.push_vertex(&[3.0, 4.0, 5.0]), Ok(1));
        assert_eq!(mesh.position(1), Some(Vec3::new(3.0, 4.0, 5.0)));
    }

    #[test]
    fn validate_catches_out_of_range_index() {
        let mut mesh = MeshData::new(VertexFormat::new(&[AttributeKind::Position]));
        for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            mesh.push_vertex(&p.to_array()).unwrap();
        }
        mesh.push_triangle(0, 1, 2);
        assert!(mesh.validate().is_ok());

        mesh.push_triangle(0, 1, 3);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn bounds_cover_positions() {
        let mut mesh = MeshData::new(VertexFormat::new(&[
            AttributeKind::Position,
            AttributeKind::Color,
        ]));
        mesh.push_vertex(&[-1.0, 0.0, 0.0, 9.0, 9.0, 9.0]).unwrap();
        mesh.push_vertex(&[1.0, 2.0, 0.5, -9.0, -9.0, -9.0]).unwrap();
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 0.5));
    }
}
