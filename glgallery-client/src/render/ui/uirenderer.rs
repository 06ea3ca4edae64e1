//! The UI renderer for the gallery shell.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec4};
use glow::HasContext;

use crate::{
    abs::{Mesh, ShaderProgram, TextureHandle},
    render::ui::UIVertex,
};

/// The rendering mode for a UI element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UIRenderMode {
    Texture(TextureHandle, Vec4),
    Color(Vec4),
}

/// A draw command for rendering a UI element.
pub struct DrawCommand {
    pub rect: [Vec2; 2],
    pub uv_rect: [Vec2; 2],
    pub mode: UIRenderMode,
}

impl DrawCommand {
    /// A solid rectangle at `position` with `size`.
    pub fn color(position: Vec2, size: Vec2, color: Vec4) -> Self {
        Self {
            rect: [position, position + size],
            uv_rect: [Vec2::ZERO, Vec2::ONE],
            mode: UIRenderMode::Color(color),
        }
    }
}

/// Quads that share one render mode, ready to become a single mesh.
#[derive(Default)]
pub struct QuadBatch {
    mode: Option<UIRenderMode>,
    vertices: Vec<UIVertex>,
    indices: Vec<u32>,
}

impl QuadBatch {
    /// Whether `command` can join this batch without a flush.
    pub fn accepts(&self, command: &DrawCommand) -> bool {
        self.mode.is_none_or(|mode| mode == command.mode)
    }

    /// Appends a command's vertices and indices.
    pub fn push(&mut self, command: &DrawCommand) {
        let base_index = self.vertices.len() as u32;
        let [min, max] = command.rect;
        let [uv_min, uv_max] = command.uv_rect;

        self.vertices.extend_from_slice(&[
            UIVertex {
                position: Vec2::new(max.x, min.y),
                uv: Vec2::new(uv_max.x, uv_min.y),
            },
            UIVertex {
                position: Vec2::new(min.x, min.y),
                uv: Vec2::new(uv_min.x, uv_min.y),
            },
            UIVertex {
                position: Vec2::new(min.x, max.y),
                uv: Vec2::new(uv_min.x, uv_max.y),
            },
            UIVertex {
                position: Vec2::new(max.x, max.y),
                uv: Vec2::new(uv_max.x, uv_max.y),
            },
        ]);
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        self.mode = Some(command.mode);
    }

    pub fn mode(&self) -> Option<UIRenderMode> {
        self.mode
    }

    pub fn vertices(&self) -> &[UIVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.mode = None;
        self.vertices.clear();
        self.indices.clear();
    }
}

/// The UI renderer for rendering 2D elements on the screen.
pub struct UIRenderer {
    gl: Arc<glow::Context>,
    shader_program: ShaderProgram,
    pub projection_matrix: Mat4,
    batch: QuadBatch,
    /// Reused for every batch.
    mesh: Option<Mesh>,
}

impl UIRenderer {
    /// Creates a new UI renderer.
    pub fn new(
        gl: &Arc<glow::Context>,
        shader_program: ShaderProgram,
        projection_matrix: Mat4,
    ) -> Self {
        Self {
            gl: Arc::clone(gl),
            shader_program,
            projection_matrix,
            batch: QuadBatch::default(),
            mesh: None,
        }
    }

    /// Prepares 2D state: no depth test or culling, alpha blending on.
    pub fn begin(&mut self) {
        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.disable(glow::CULL_FACE);
            self.gl.enable(glow::BLEND);
            self.gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    /// Adds a draw command to the UI renderer.
    pub fn add_command(&mut self, command: DrawCommand) {
        // Quads sharing the last mode are batched; a new mode flushes first.
        if !self.batch.accepts(&command) {
            self.finish();
        }
        self.batch.push(&command);
    }

    /// Draws the current batch and starts an empty one.
    pub fn finish(&mut self) {
        self.draw_mesh();
        self.batch.clear();
    }

    /// Uploads the batch into the shared mesh and draws it.
    fn draw_mesh(&mut self) {
        if self.batch.is_empty() {
            return;
        }

        if let Some(mesh) = self.mesh.as_mut() {
            mesh.update(self.batch.vertices(), self.batch.indices());
        } else {
            match Mesh::new(
                &self.gl,
                self.batch.vertices(),
                self.batch.indices(),
                glow::TRIANGLES,
            ) {
                Ok(mesh) => self.mesh = Some(mesh),
                Err(e) => {
                    log::warn!("Dropping UI batch: {e}");
                    return;
                }
            }
        }
        let Some(mesh) = &self.mesh else {
            return;
        };

        self.shader_program.use_program();
        self.shader_program
            .set_uniform("u_projection", self.projection_matrix);

        match self.batch.mode() {
            Some(UIRenderMode::Texture(texture_handle, color)) => {
                texture_handle.bind(&self.gl, 0);
                self.shader_program.set_uniform("u_tex", 0);
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", false);
            }
            Some(UIRenderMode::Color(color)) => {
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", true);
            }
            None => return,
        }

        mesh.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_get_two_triangles_each() {
        let mut batch = QuadBatch::default();
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        batch.push(&DrawCommand::color(Vec2::ZERO, Vec2::new(10.0, 5.0), red));
        batch.push(&DrawCommand::color(Vec2::new(20.0, 0.0), Vec2::ONE, red));

        assert_eq!(batch.vertices().len(), 8);
        assert_eq!(batch.indices(), &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(batch.vertices()[0].position, Vec2::new(10.0, 0.0));
        assert_eq!(batch.vertices()[2].position, Vec2::new(0.0, 5.0));
        assert_eq!(batch.mode(), Some(UIRenderMode::Color(red)));
    }

    #[test]
    fn mode_change_is_not_accepted() {
        let mut batch = QuadBatch::default();
        let first = DrawCommand::color(Vec2::ZERO, Vec2::ONE, Vec4::ONE);
        let second = DrawCommand::color(Vec2::ZERO, Vec2::ONE, Vec4::ZERO);
        assert!(batch.accepts(&first));
        batch.push(&first);
        assert!(batch.accepts(&first));
        assert!(!batch.accepts(&second));
        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.accepts(&second));
    }

    #[test]
    fn uv_rect_follows_corners() {
        let mut batch = QuadBatch::default();
        batch.push(&DrawCommand {
            rect: [Vec2::ZERO, Vec2::splat(4.0)],
            // Flipped vertically, as used for framebuffer textures.
            uv_rect: [Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)],
            mode: UIRenderMode::Color(Vec4::ONE),
        });
        let top_left = batch.vertices()[1];
        let bottom_right = batch.vertices()[3];
        assert_eq!(top_left.uv, Vec2::new(0.0, 1.0));
        assert_eq!(bottom_right.uv, Vec2::new(1.0, 0.0));
    }
}
