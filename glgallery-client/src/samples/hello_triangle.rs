//! One coloured triangle: the shortest path from vertices to pixels.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{UVec2, Vec3};
use glow::HasContext;

use crate::{
    abs::{Mesh, ShaderProgram, Vertex},
    other::UpdateContext,
    samples::{Sample, SampleKind},
    shader_program,
};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct ColorVertex {
    position: Vec3,
    color: Vec3,
}

impl Vertex for ColorVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<ColorVertex>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                stride,
                std::mem::size_of::<Vec3>() as i32,
            );
        }
    }
}

const VERTICES: [ColorVertex; 3] = [
    ColorVertex {
        position: Vec3::new(-0.6, -0.5, 0.0),
        color: Vec3::new(1.0, 0.2, 0.2),
    },
    ColorVertex {
        position: Vec3::new(0.6, -0.5, 0.0),
        color: Vec3::new(0.2, 1.0, 0.2),
    },
    ColorVertex {
        position: Vec3::new(0.0, 0.6, 0.0),
        color: Vec3::new(0.2, 0.4, 1.0),
    },
];

pub struct HelloTriangle {
    program: ShaderProgram,
    mesh: Mesh,
}

impl HelloTriangle {
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self, String> {
        Ok(Self {
            program: shader_program!(basic, gl)?,
            mesh: Mesh::new(gl, &VERTICES, &[0, 1, 2], glow::TRIANGLES)?,
        })
    }
}

impl Sample for HelloTriangle {
    fn kind(&self) -> SampleKind {
        SampleKind::HelloTriangle
    }

    fn update(&mut self, _ctx: &UpdateContext) {}

    fn render(&mut self, gl: &Arc<glow::Context>, _size: UVec2) {
        unsafe {
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::CULL_FACE);
            gl.clear_color(0.08, 0.08, 0.1, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        self.program.use_program();
        self.mesh.draw();
    }
}
