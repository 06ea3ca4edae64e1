//! A procedural cube turned by a [`SpinControl`]. Dragging nudges the spin along.

use std::sync::Arc;

use glam::{UVec2, Vec3};
use glgallery_core::{
    config::SampleSettings,
    controls::{Control, SpinControl},
    geometry::cube,
    math,
};
use glow::HasContext;

use crate::{
    abs::{Mesh, ShaderProgram},
    other::UpdateContext,
    samples::{Sample, SampleKind, aspect},
    shader_program,
};

const EYE: Vec3 = Vec3::new(0.0, 0.8, 3.2);

const FACE_COLORS: [Vec3; 6] = [
    Vec3::new(0.85, 0.25, 0.2),
    Vec3::new(0.2, 0.7, 0.85),
    Vec3::new(0.3, 0.8, 0.3),
    Vec3::new(0.8, 0.3, 0.75),
    Vec3::new(0.2, 0.35, 0.9),
    Vec3::new(0.95, 0.8, 0.2),
];

pub struct SpinningCube {
    program: ShaderProgram,
    mesh: Mesh,
    spin: SpinControl,
    fov: f32,
}

impl SpinningCube {
    pub fn new(gl: &Arc<glow::Context>, settings: &SampleSettings) -> Result<Self, String> {
        Ok(Self {
            program: shader_program!(lit, gl)?,
            mesh: Mesh::from_data(gl, &cube(1.2, FACE_COLORS))?,
            spin: SpinControl::new(
                Vec3::new(0.4, 1.0, 0.2),
                0.9,
                math::look_at(EYE, Vec3::ZERO, Vec3::Y),
            ),
            fov: settings.fov,
        })
    }
}

impl Sample for SpinningCube {
    fn kind(&self) -> SampleKind {
        SampleKind::SpinningCube
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.spin.update(ctx.delta_time, &ctx.control_input());
    }

    fn render(&mut self, gl: &Arc<glow::Context>, size: UVec2) {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);
            gl.clear_color(0.1, 0.1, 0.14, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let model = self.spin.model();
        self.program.use_program();
        self.program.set_uniform(
            "u_projection",
            math::perspective(self.fov, aspect(size), 0.1, 100.0),
        );
        self.program.set_uniform("u_view", self.spin.view());
        self.program.set_uniform("u_model", model);
        self.program
            .set_uniform("u_normal_matrix", math::normal_matrix(model));
        self.program
            .set_uniform("u_light_pos", Vec3::new(2.0, 3.0, 4.0));
        self.program.set_uniform("u_view_pos", EYE);
        self.program.set_uniform("u_vertex_color", true);
        self.program.set_uniform("u_shininess", 32.0f32);
        self.program.set_uniform("u_edge", 0.03f32);
        self.mesh.draw();
    }
}
