//! Sphere ray tracer running in a compute shader.
//!
//! Every frame adds one batch of samples per pixel to a floating-point accumulation image; the
//! running average is tone mapped onto the target. Moving the camera or resizing restarts the
//! average. `R` restarts it by hand.

use std::sync::Arc;

use glam::{Mat4, UVec2, Vec3};
use glgallery_core::{
    config::SampleSettings,
    controls::{Control, OrbitControl},
    raytrace::{GpuSphere, RayScene},
};
use sdl2::keyboard::Keycode;

use crate::{
    abs::{ShaderProgram, ShaderStorageBuffer, Texture},
    compute_program,
    other::UpdateContext,
    render::FullscreenPass,
    samples::{Sample, SampleKind},
    shader_program,
};

const WORK_GROUP: u32 = 8;

/// Orthonormal camera basis `(forward, right, up)` looking from `eye` at `target`.
pub fn camera_basis(eye: Vec3, target: Vec3) -> (Vec3, Vec3, Vec3) {
    let forward = (target - eye).normalize_or(Vec3::NEG_Z);
    let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
    let up = right.cross(forward);
    (forward, right, up)
}

pub struct RayTracer {
    gl: Arc<glow::Context>,
    compute: ShaderProgram,
    blit: ShaderProgram,
    fullscreen: FullscreenPass,
    spheres: ShaderStorageBuffer<GpuSphere>,
    accum: Option<Texture>,
    orbit: OrbitControl,
    last_view: Mat4,
    frame: u32,
    max_bounces: u32,
    samples_per_frame: u32,
    fov: f32,
}

impl RayTracer {
    pub fn new(gl: &Arc<glow::Context>, settings: &SampleSettings) -> Result<Self, String> {
        let scene = RayScene::showcase();
        let mut orbit = OrbitControl::new(Vec3::new(0.0, 1.0, 0.0), 9.0);
        orbit.pitch = 14.0;
        orbit.min_distance = 2.0;
        orbit.max_distance = 40.0;

        Ok(Self {
            gl: Arc::clone(gl),
            compute: compute_program!(raytrace, gl)?,
            blit: shader_program!(blit, gl)?,
            fullscreen: FullscreenPass::new(gl)?,
            spheres: ShaderStorageBuffer::new(gl, &scene.to_gpu())?,
            accum: None,
            last_view: orbit.view(),
            orbit,
            frame: 0,
            max_bounces: settings.ray_max_bounces,
            samples_per_frame: settings.ray_samples_per_frame.max(1),
            fov: settings.fov,
        })
    }

    fn restart(&mut self) {
        self.frame = 0;
    }

    fn ensure_target(&mut self, size: UVec2) -> Result<(), String> {
        let fits = self
            .accum
            .as_ref()
            .is_some_and(|t| t.width() == size.x && t.height() == size.y);
        if !fits {
            self.accum = None;
            self.accum = Some(Texture::storage(&self.gl, size.x, size.y, glow::RGBA32F)?);
            self.restart();
        }
        Ok(())
    }
}

impl Sample for RayTracer {
    fn kind(&self) -> SampleKind {
        SampleKind::RayTracer
    }

    fn update(&mut self, ctx: &UpdateContext) {
        if ctx.keyboard.is_pressed(Keycode::R) {
            self.restart();
        }
        self.orbit.update(ctx.delta_time, &ctx.control_input());
        let view = self.orbit.view();
        if view != self.last_view {
            self.last_view = view;
            self.restart();
        }
    }

    fn render(&mut self, _gl: &Arc<glow::Context>, size: UVec2) {
        let size = size.max(UVec2::ONE);
        if let Err(e) = self.ensure_target(size) {
            log::error!("Ray tracer target: {e}");
            return;
        }
        let Some(accum) = &self.accum else {
            return;
        };

        let eye = self.orbit.eye();
        let (forward, right, up) = camera_basis(eye, self.orbit.target);

        accum.bind_image(0, glow::READ_WRITE, glow::RGBA32F);
        self.spheres.bind_base(1);
        self.compute.use_program();
        self.compute.set_uniform("u_eye", eye);
        self.compute.set_uniform("u_forward", forward);
        self.compute.set_uniform("u_right", right);
        self.compute.set_uniform("u_up", up);
        self.compute
            .set_uniform("u_tan_half_fov", (self.fov.to_radians() * 0.5).tan());
        self.compute.set_uniform("u_frame", self.frame);
        self.compute.set_uniform("u_max_bounces", self.max_bounces);
        self.compute.set_uniform("u_samples", self.samples_per_frame);
        self.compute.dispatch(
            (size.x.div_ceil(WORK_GROUP), size.y.div_ceil(WORK_GROUP), 1),
            glow::SHADER_IMAGE_ACCESS_BARRIER_BIT | glow::TEXTURE_FETCH_BARRIER_BIT,
        );
        self.frame = self.frame.saturating_add(1);

        self.blit.use_program();
        accum.bind(0);
        self.blit.set_uniform("u_tex", 0);
        self.blit.set_uniform("u_exposure", 1.0f32);
        self.fullscreen.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_basis_is_orthonormal() {
        let (f, r, u) = camera_basis(Vec3::new(3.0, 2.0, 5.0), Vec3::new(0.0, 1.0, 0.0));
        for v in [f, r, u] {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
        assert!(f.dot(r).abs() < 1e-5);
        assert!(f.dot(u).abs() < 1e-5);
        assert!(u.y > 0.0);
    }

    #[test]
    fn straight_down_still_has_a_basis() {
        let (_, r, u) = camera_basis(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO);
        assert!(r.is_finite() && u.is_finite());
        assert!((r.length() - 1.0).abs() < 1e-5);
    }
}
