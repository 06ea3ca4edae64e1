//! Relief rendering on a flat floor: normal mapping, parallax occlusion mapping and cone step
//! mapping over the same procedural tile height map.
//!
//! `M` cycles the technique, `+`/`-` change the relief depth, WASD plus dragging flies around.

use std::sync::Arc;

use glam::{Mat4, UVec2, Vec2, Vec3};
use glgallery_core::{
    config::SampleSettings,
    controls::{Control, FirstPersonControl},
    geometry::plane,
    math,
    relief::HeightMap,
};
use glow::HasContext;
use image::{Rgba, RgbaImage};
use sdl2::keyboard::Keycode;

use crate::{
    abs::{Mesh, ShaderProgram, Texture, TextureFilter},
    other::UpdateContext,
    samples::{Sample, SampleKind, aspect},
    shader_program,
};

const TILES_PER_TEXTURE: usize = 2;
/// Cone map build time grows with the fourth power of the edge length.
const MAX_RELIEF_SIZE: usize = 256;

fn relief_size(requested: usize) -> usize {
    requested.clamp(8, MAX_RELIEF_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReliefMode {
    NormalMapping,
    ParallaxOcclusion,
    ConeStep,
}

impl ReliefMode {
    pub fn next(self) -> Self {
        match self {
            ReliefMode::NormalMapping => ReliefMode::ParallaxOcclusion,
            ReliefMode::ParallaxOcclusion => ReliefMode::ConeStep,
            ReliefMode::ConeStep => ReliefMode::NormalMapping,
        }
    }

    /// Value of the shader's `u_mode`.
    pub fn code(self) -> i32 {
        match self {
            ReliefMode::NormalMapping => 0,
            ReliefMode::ParallaxOcclusion => 1,
            ReliefMode::ConeStep => 2,
        }
    }
}

/// Stone colours with a per-tile tint, grey grout wherever the height map is low.
fn albedo_image(map: &HeightMap) -> RgbaImage {
    let size = map.width as u32;
    RgbaImage::from_fn(size, map.height as u32, |x, y| {
        let height = map.sample(x as isize, y as isize);
        if height < 0.2 {
            return Rgba([92, 88, 84, 255]);
        }
        let uv = Vec2::new(x as f32, y as f32) / size as f32 * TILES_PER_TEXTURE as f32;
        let tile = uv.floor();
        let tint = ((tile.x * 3.0 + tile.y * 5.0) % 4.0) / 4.0;
        let base = Vec3::new(0.62, 0.42, 0.3).lerp(Vec3::new(0.75, 0.6, 0.45), tint);
        let shade = base * (0.85 + 0.15 * height);
        Rgba([
            (shade.x * 255.0) as u8,
            (shade.y * 255.0) as u8,
            (shade.z * 255.0) as u8,
            255,
        ])
    })
}

pub struct Parallax {
    program: ShaderProgram,
    mesh: Mesh,
    normal_height: Texture,
    cone: Texture,
    albedo: Texture,
    camera: FirstPersonControl,
    mode: ReliefMode,
    depth_scale: f32,
    time: f32,
    fov: f32,
}

impl Parallax {
    pub fn new(gl: &Arc<glow::Context>, settings: &SampleSettings) -> Result<Self, String> {
        let size = relief_size(settings.relief_size);
        if size != settings.relief_size {
            log::warn!(
                "Relief size {} is out of range, using {size}",
                settings.relief_size
            );
        }
        let map = HeightMap::tiles(size, TILES_PER_TEXTURE, 0.12);

        let started = std::time::Instant::now();
        let cone_data = map.cone_rgba();
        log::debug!(
            "Cone map for {size}x{size} relief built in {:.1} ms",
            started.elapsed().as_secs_f32() * 1000.0
        );

        let side = size as u32;
        Ok(Self {
            program: shader_program!(parallax, gl)?,
            mesh: Mesh::from_data(gl, &plane(10.0, 5.0))?,
            normal_height: Texture::new_from_data(
                gl,
                side,
                side,
                &map.normal_height_rgba(6.0),
                TextureFilter::Linear,
            )?,
            cone: Texture::new_from_data(gl, side, side, &cone_data, TextureFilter::Nearest)?,
            albedo: Texture::new(gl, &albedo_image(&map), TextureFilter::Mipmapped)?,
            camera: FirstPersonControl::new(Vec3::new(0.0, 1.6, 3.5), 0.0, -30.0),
            mode: ReliefMode::ConeStep,
            depth_scale: 0.06,
            time: 0.0,
            fov: settings.fov,
        })
    }
}

impl Sample for Parallax {
    fn kind(&self) -> SampleKind {
        SampleKind::Parallax
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.time += ctx.delta_time;
        if ctx.keyboard.is_pressed(Keycode::M) {
            self.mode = self.mode.next();
            log::info!("Relief mode: {:?}", self.mode);
        }
        if ctx.keyboard.is_pressed(Keycode::Equals) || ctx.keyboard.is_pressed(Keycode::KpPlus) {
            self.depth_scale = (self.depth_scale + 0.01).min(0.2);
        }
        if ctx.keyboard.is_pressed(Keycode::Minus) || ctx.keyboard.is_pressed(Keycode::KpMinus) {
            self.depth_scale = (self.depth_scale - 0.01).max(0.0);
        }
        self.camera.update(ctx.delta_time, &ctx.control_input());
        self.camera.position.y = self.camera.position.y.max(0.2);
    }

    fn render(&mut self, gl: &Arc<glow::Context>, size: UVec2) {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);
            gl.clear_color(0.55, 0.65, 0.75, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let light = Vec3::new(
            3.0 * (self.time * 0.5).cos(),
            1.5,
            3.0 * (self.time * 0.5).sin(),
        );

        self.normal_height.bind(0);
        self.cone.bind(1);
        self.albedo.bind(2);

        self.program.use_program();
        self.program.set_uniform(
            "u_projection",
            math::perspective(self.fov, aspect(size), 0.05, 100.0),
        );
        self.program.set_uniform("u_view", self.camera.view());
        self.program.set_uniform("u_model", Mat4::IDENTITY);
        self.program
            .set_uniform("u_normal_matrix", math::normal_matrix(Mat4::IDENTITY));
        self.program.set_uniform("u_view_pos", self.camera.position);
        self.program.set_uniform("u_light_pos", light);
        self.program.set_uniform("u_normal_height", 0);
        self.program.set_uniform("u_cone", 1);
        self.program.set_uniform("u_albedo", 2);
        self.program.set_uniform("u_mode", self.mode.code());
        self.program.set_uniform("u_depth_scale", self.depth_scale);
        self.mesh.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_cycle_through_all_three() {
        let mut mode = ReliefMode::NormalMapping;
        let mut codes = Vec::new();
        for _ in 0..3 {
            codes.push(mode.code());
            mode = mode.next();
        }
        assert_eq!(codes, vec![0, 1, 2]);
        assert_eq!(mode, ReliefMode::NormalMapping);
    }

    #[test]
    fn relief_size_is_kept_in_range() {
        assert_eq!(relief_size(0), 8);
        assert_eq!(relief_size(64), 64);
        assert_eq!(relief_size(MAX_RELIEF_SIZE), MAX_RELIEF_SIZE);
        assert_eq!(relief_size(100_000), MAX_RELIEF_SIZE);
    }

    #[test]
    fn albedo_marks_grout() {
        let map = HeightMap::tiles(16, 1, 0.2);
        let image = albedo_image(&map);
        assert_eq!(image.dimensions(), (16, 16));
        assert_eq!(image.get_pixel(0, 0), &Rgba([92, 88, 84, 255]));
        assert_ne!(image.get_pixel(8, 8), &Rgba([92, 88, 84, 255]));
    }
}
