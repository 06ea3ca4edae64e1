//! A single triangle covering the whole target.
//!
//! The vertex shader derives positions from `gl_VertexID`, but core profiles refuse to draw
//! without a vertex array bound, so an empty one is kept around.

use std::sync::Arc;

use glow::HasContext;

pub struct FullscreenPass {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
}

impl FullscreenPass {
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self, String> {
        let vao = unsafe { gl.create_vertex_array().map_err(|e| e.to_string())? };
        Ok(Self {
            gl: Arc::clone(gl),
            vao,
        })
    }

    /// Draws with whatever program is in use.
    pub fn draw(&self) {
        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, 3);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for FullscreenPass {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
