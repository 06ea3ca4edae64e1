//! The trefoil knot tube, Phong shaded, framed by its bounding box.

use std::sync::Arc;

use glam::{Mat4, UVec2, Vec3};
use glgallery_core::{
    Bounded,
    config::SampleSettings,
    controls::{Control, OrbitControl},
    geometry::{TrefoilParams, trefoil_knot},
    math,
};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use crate::{
    abs::{Mesh, ShaderProgram},
    other::UpdateContext,
    samples::{Sample, SampleKind, aspect},
    shader_program,
};

pub struct TrefoilKnot {
    program: ShaderProgram,
    mesh: Mesh,
    orbit: OrbitControl,
    fov: f32,
}

impl TrefoilKnot {
    pub fn new(gl: &Arc<glow::Context>, settings: &SampleSettings) -> Result<Self, String> {
        let params = TrefoilParams {
            slices: settings.trefoil_slices,
            stacks: settings.trefoil_stacks,
            ..TrefoilParams::default()
        };
        let data = trefoil_knot(&params);
        let mesh = Mesh::from_data(gl, &data)?;
        log::debug!(
            "Trefoil knot: {} vertices, {} indices",
            data.vertex_count(),
            mesh.index_count()
        );

        let mut orbit = OrbitControl::default();
        orbit.frame(&mesh.bounds(), settings.fov);
        orbit.auto_rotate = 12.0;

        Ok(Self {
            program: shader_program!(lit, gl)?,
            mesh,
            orbit,
            fov: settings.fov,
        })
    }
}

impl Sample for TrefoilKnot {
    fn kind(&self) -> SampleKind {
        SampleKind::TrefoilKnot
    }

    fn update(&mut self, ctx: &UpdateContext) {
        if ctx.keyboard.is_pressed(Keycode::Home) {
            self.orbit.frame(&self.mesh.bounds(), self.fov);
        }
        self.orbit.update(ctx.delta_time, &ctx.control_input());
    }

    fn render(&mut self, gl: &Arc<glow::Context>, size: UVec2) {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);
            gl.clear_color(0.06, 0.07, 0.1, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let radius = self.mesh.bounds().radius();
        let near = (self.orbit.distance - radius).max(radius * 0.01);
        let eye = self.orbit.eye();
        self.program.use_program();
        self.program.set_uniform(
            "u_projection",
            math::perspective(self.fov, aspect(size), near, self.orbit.distance + radius * 2.0),
        );
        self.program.set_uniform("u_view", self.orbit.view());
        self.program.set_uniform("u_model", Mat4::IDENTITY);
        self.program
            .set_uniform("u_normal_matrix", math::normal_matrix(Mat4::IDENTITY));
        self.program
            .set_uniform("u_light_pos", eye + Vec3::new(1.0, 2.0, 0.5));
        self.program.set_uniform("u_view_pos", eye);
        self.program.set_uniform("u_vertex_color", false);
        self.program
            .set_uniform("u_color", Vec3::new(0.85, 0.62, 0.22));
        self.program.set_uniform("u_shininess", 64.0f32);
        self.program.set_uniform("u_edge", 0.0f32);
        self.mesh.draw();
    }
}
