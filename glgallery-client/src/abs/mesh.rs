//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing mesh data on the GPU side.
//! Typed vertices implement the [`Vertex`] trait; procedural [`MeshData`] is uploaded with
//! [`Mesh::from_data`], which sets up its attributes from the data's own [`VertexFormat`].

use std::sync::Arc;

use glgallery_core::{
    Aabb, Bounded,
    geometry::{MeshData, VertexFormat},
};
use glow::HasContext;

/// Trait that defines the necessary methods for a vertex.
pub trait Vertex: bytemuck::Pod {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &glow::Context);
}

fn format_attribs(gl: &glow::Context, format: &VertexFormat) {
    let stride = format.stride_bytes() as i32;
    for attribute in format.attributes() {
        unsafe {
            gl.enable_vertex_attrib_array(attribute.location);
            gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components as i32,
                glow::FLOAT,
                false,
                stride,
                (attribute.offset * std::mem::size_of::<f32>()) as i32,
            );
        }
    }
}

/// Pairs `held` with the result of the next creation, releasing `held` if that failed.
fn then_or_release<T, U>(
    held: T,
    next: Result<U, String>,
    release: impl FnOnce(T),
) -> Result<(T, U), String> {
    match next {
        Ok(next) => Ok((held, next)),
        Err(e) => {
            release(held);
            Err(e)
        }
    }
}

/// Represents a mesh stored on the GPU side.
pub struct Mesh {
    gl: Arc<glow::Context>,
    draw_mode: u32,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: usize,
    bounds: Aabb,
}

impl Mesh {
    fn upload(
        gl: &Arc<glow::Context>,
        vertices: &[u8],
        indices: &[u32],
        draw_mode: u32,
        usage: u32,
        attribs: impl FnOnce(&glow::Context),
    ) -> Result<Self, String> {
        unsafe {
            let vao = gl.create_vertex_array()?;
            let (vao, vbo) =
                then_or_release(vao, gl.create_buffer(), |vao| gl.delete_vertex_array(vao))?;
            let ((vao, vbo), ebo) =
                then_or_release((vao, vbo), gl.create_buffer(), |(vao, vbo)| {
                    gl.delete_vertex_array(vao);
                    gl.delete_buffer(vbo);
                })?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, vertices, usage);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                usage,
            );

            attribs(gl);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                draw_mode,
                vao,
                vbo,
                ebo,
                index_count: indices.len(),
                bounds: Aabb::default(),
            })
        }
    }

    /// Creates a new mesh from typed vertices. Meant for data that changes every frame, such
    /// as UI batches; the bounds stay empty.
    pub fn new<V: Vertex>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
        draw_mode: u32,
    ) -> Result<Self, String> {
        Self::upload(
            gl,
            bytemuck::cast_slice(vertices),
            indices,
            draw_mode,
            glow::DYNAMIC_DRAW,
            V::vertex_attribs,
        )
    }

    /// Uploads procedural mesh data as triangles. Attribute `i` of its format is bound to
    /// location `i`.
    pub fn from_data(gl: &Arc<glow::Context>, data: &MeshData) -> Result<Self, String> {
        data.validate()?;
        let mut mesh = Self::upload(
            gl,
            bytemuck::cast_slice(&data.vertices),
            &data.indices,
            glow::TRIANGLES,
            glow::STATIC_DRAW,
            |gl| format_attribs(gl, &data.format),
        )?;
        mesh.bounds = data.bounds();
        Ok(mesh)
    }

    /// Updates the mesh.
    pub fn update<V: Vertex>(&mut self, vertices: &[V], indices: &[u32]) {
        unsafe {
            self.index_count = indices.len();

            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::DYNAMIC_DRAW,
            );

            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ebo));
            self.gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::DYNAMIC_DRAW,
            );

            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
        }
    }

    /// Draws the mesh.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_elements(self.draw_mode, self.index_count as i32, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }

    /// Number of indices drawn.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl Bounded for Mesh {
    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_creation_releases_what_was_held() {
        let mut released = Vec::new();
        let result = then_or_release((1, 2), Err::<u32, _>("out of names".to_string()), |held| {
            released.push(held)
        });
        assert_eq!(result, Err("out of names".to_string()));
        assert_eq!(released, [(1, 2)]);

        let result = then_or_release(1, Ok::<_, String>(2), |held| released.push((held, 0)));
        assert_eq!(result, Ok((1, 2)));
        assert_eq!(released.len(), 1);
    }
}
