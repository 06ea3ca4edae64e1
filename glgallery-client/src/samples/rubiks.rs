//! Rubik's cube viewer on top of the scene graph.
//!
//! Each of the 27 cubies is a node holding one cube mesh; the node transforms are refreshed from
//! the cube state every frame. Face keys turn layers (with Shift for counter-clockwise), Space
//! scrambles, Backspace plays everything back to solved, Return skips the animation.

use std::sync::Arc;

use glam::{Mat4, UVec2, Vec3};
use glgallery_core::{
    Model, ModelNode,
    config::SampleSettings,
    controls::{Control, OrbitControl},
    geometry::cube,
    math,
    rubiks::{Face, Move, RubiksCube},
};
use glow::HasContext;
use sdl2::{
    event::Event,
    keyboard::{Keycode, Mod},
};

use crate::{
    abs::{Mesh, ShaderProgram},
    other::UpdateContext,
    render::draw_model,
    samples::{Sample, SampleKind, aspect},
    shader_program,
};

const SCRAMBLE_LENGTH: usize = 20;
const CUBIE_SIZE: f32 = 0.96;

fn face_for_key(key: Keycode) -> Option<Face> {
    match key {
        Keycode::R => Some(Face::R),
        Keycode::L => Some(Face::L),
        Keycode::U => Some(Face::U),
        Keycode::D => Some(Face::D),
        Keycode::F => Some(Face::F),
        Keycode::B => Some(Face::B),
        _ => None,
    }
}

/// The move a key press asks for: a clockwise quarter turn, or counter-clockwise with Shift.
pub fn move_for_key(key: Keycode, keymod: Mod) -> Option<Move> {
    let face = face_for_key(key)?;
    let prime = keymod.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD);
    Some(Move::new(face, if prime { -1 } else { 1 }))
}

pub struct RubiksViewer {
    program: ShaderProgram,
    cube: RubiksCube,
    model: Model<Mesh>,
    orbit: OrbitControl,
    fov: f32,
}

impl RubiksViewer {
    pub fn new(gl: &Arc<glow::Context>, settings: &SampleSettings) -> Result<Self, String> {
        let mut cube_state = RubiksCube::new();
        cube_state.speed = settings.rubiks_speed.max(0.1);

        let mut root = ModelNode::new("cube");
        for (i, cubie) in cube_state.cubies().iter().enumerate() {
            let mesh = Mesh::from_data(gl, &cube(CUBIE_SIZE, cubie.face_colors()))?;
            root.add_child(
                ModelNode::new(format!("cubie-{i}"))
                    .with_transform(cube_state.cubie_transform(i))
                    .with_mesh(mesh),
            );
        }
        let model = Model::new(root);
        log::debug!(
            "Rubik's cube model: {} nodes, {} meshes",
            model.node_count(),
            model.mesh_count()
        );

        let mut orbit = OrbitControl::default();
        orbit.frame(&model.bounds(), settings.fov);
        orbit.yaw = 35.0;
        orbit.pitch = 25.0;
        orbit.set_distance(orbit.distance * 1.3);

        Ok(Self {
            program: shader_program!(lit, gl)?,
            cube: cube_state,
            model,
            orbit,
            fov: settings.fov,
        })
    }

    fn sync_nodes(&mut self) {
        let root = self.model.root_mut();
        for i in 0..self.cube.cubies().len() {
            if let Some(node) = root.child_mut(i) {
                node.set_transform(self.cube.cubie_transform(i));
            }
        }
    }
}

impl Sample for RubiksViewer {
    fn kind(&self) -> SampleKind {
        SampleKind::RubiksCube
    }

    fn handle_event(&mut self, event: &Event) {
        let Event::KeyDown {
            keycode: Some(key),
            keymod,
            repeat: false,
            ..
        } = *event
        else {
            return;
        };

        if let Some(mv) = move_for_key(key, keymod) {
            self.cube.begin(mv);
            return;
        }
        match key {
            Keycode::Space => {
                let moves = self.cube.scramble(&mut rand::rng(), SCRAMBLE_LENGTH);
                let notation: Vec<String> = moves.iter().map(Move::to_string).collect();
                log::info!("Scramble: {}", notation.join(" "));
            }
            Keycode::Backspace => {
                log::info!("Unwinding {} moves", self.cube.history().len());
                self.cube.unwind();
            }
            Keycode::Return => self.cube.finish(),
            _ => {}
        }
    }

    fn update(&mut self, ctx: &UpdateContext) {
        let was_animating = self.cube.is_animating();
        self.cube.update(ctx.delta_time);
        if was_animating && !self.cube.is_animating() && self.cube.is_solved() {
            log::info!("Cube solved");
        }
        self.sync_nodes();
        self.orbit.update(ctx.delta_time, &ctx.control_input());
    }

    fn render(&mut self, gl: &Arc<glow::Context>, size: UVec2) {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);
            gl.clear_color(0.16, 0.17, 0.2, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let eye = self.orbit.eye();
        self.program.use_program();
        self.program.set_uniform(
            "u_projection",
            math::perspective(self.fov, aspect(size), 0.1, 100.0),
        );
        self.program.set_uniform("u_view", self.orbit.view());
        self.program
            .set_uniform("u_light_pos", eye + Vec3::new(2.0, 4.0, 1.0));
        self.program.set_uniform("u_view_pos", eye);
        self.program.set_uniform("u_vertex_color", true);
        self.program.set_uniform("u_shininess", 48.0f32);
        self.program.set_uniform("u_edge", 0.06f32);
        draw_model(&self.program, &self.model, Mat4::IDENTITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_makes_prime_moves() {
        assert_eq!(
            move_for_key(Keycode::R, Mod::NOMOD),
            Some(Move::new(Face::R, 1))
        );
        assert_eq!(
            move_for_key(Keycode::F, Mod::LSHIFTMOD),
            Some(Move::new(Face::F, -1))
        );
        assert_eq!(move_for_key(Keycode::Q, Mod::NOMOD), None);
    }
}
