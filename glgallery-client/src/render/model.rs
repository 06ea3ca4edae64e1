//! Drawing of scene-graph models uploaded to the GPU.

use glam::Mat4;
use glgallery_core::{Model, math};

use crate::abs::{Mesh, ShaderProgram};

/// Draws every mesh of `model` with `program`, which must already be in use.
///
/// Each node's world transform (`parent` times its ancestors' local transforms) goes to
/// `u_model`, its normal matrix to `u_normal_matrix`.
pub fn draw_model(program: &ShaderProgram, model: &Model<Mesh>, parent: Mat4) {
    model.visit(|world, node| {
        if node.meshes().is_empty() {
            return;
        }
        let world = parent * world;
        program.set_uniform("u_model", world);
        program.set_uniform("u_normal_matrix", math::normal_matrix(world));
        for mesh in node.meshes() {
            mesh.draw();
        }
    });
}
