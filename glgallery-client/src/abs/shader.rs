//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders,
//! including compute programs. It also provides the [`Uniform`] trait for setting uniform
//! variables in shader programs.

use std::sync::Arc;

use glam::{IVec3, Mat3, Mat4, UVec2, Vec2, Vec3, Vec4};
use glow::HasContext;

/// Builds a [`ShaderProgram`] from `render/shaders/<name>/vert.glsl` and `frag.glsl`.
#[macro_export]
macro_rules! shader_program {
    ($name:ident, $gl:expr) => {
        $crate::abs::ShaderProgram::from_sources(
            &$gl,
            stringify!($name),
            &[
                (
                    glow::VERTEX_SHADER,
                    include_str!(concat!(
                        env!("CARGO_MANIFEST_DIR"),
                        "/src/render/shaders/",
                        stringify!($name),
                        "/vert.glsl"
                    )),
                ),
                (
                    glow::FRAGMENT_SHADER,
                    include_str!(concat!(
                        env!("CARGO_MANIFEST_DIR"),
                        "/src/render/shaders/",
                        stringify!($name),
                        "/frag.glsl"
                    )),
                ),
            ],
        )
    };
}

/// Builds a compute [`ShaderProgram`] from `render/shaders/<name>/comp.glsl`.
#[macro_export]
macro_rules! compute_program {
    ($name:ident, $gl:expr) => {
        $crate::abs::ShaderProgram::from_sources(
            &$gl,
            stringify!($name),
            &[(
                glow::COMPUTE_SHADER,
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/src/render/shaders/",
                    stringify!($name),
                    "/comp.glsl"
                )),
            )],
        )
    };
}

fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        glow::COMPUTE_SHADER => "compute",
        _ => "unknown",
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(gl: &Arc<glow::Context>, shader_type: u32, source: &str) -> Result<Self, String> {
        unsafe {
            let shader = gl.create_shader(shader_type).map_err(|e| e.to_string())?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(format!("{} shader: {log}", stage_name(shader_type)));
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Sets the value of the uniform variable in the given shader program.
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str);
}

impl Uniform for bool {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_1_i32(Some(&loc), *self as i32);
            }
        }
    }
}

impl Uniform for f32 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_1_f32(Some(&loc), *self);
            }
        }
    }
}

impl Uniform for i32 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_1_i32(Some(&loc), *self);
            }
        }
    }
}

impl Uniform for u32 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_1_u32(Some(&loc), *self);
            }
        }
    }
}

impl Uniform for Vec2 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_2_f32(Some(&loc), self.x, self.y);
            }
        }
    }
}

impl Uniform for UVec2 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_2_u32(Some(&loc), self.x, self.y);
            }
        }
    }
}

impl Uniform for Vec3 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_3_f32(Some(&loc), self.x, self.y, self.z);
            }
        }
    }
}

impl Uniform for IVec3 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_3_i32(Some(&loc), self.x, self.y, self.z);
            }
        }
    }
}

impl Uniform for Vec4 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_4_f32(Some(&loc), self.x, self.y, self.z, self.w);
            }
        }
    }
}

impl Uniform for Mat3 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_matrix_3_f32_slice(Some(&loc), false, self.as_ref());
            }
        }
    }
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_matrix_4_f32_slice(Some(&loc), false, self.as_ref());
            }
        }
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        (*self).set_uniform(gl, program, name);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self, String> {
        unsafe {
            let program = gl.create_program().map_err(|e| e.to_string())?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(format!("link: {log}"));
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
            })
        }
    }

    /// Compiles every `(shader type, source)` pair and links them. Failures are logged with
    /// the program's name before being returned.
    pub fn from_sources(
        gl: &Arc<glow::Context>,
        name: &str,
        sources: &[(u32, &str)],
    ) -> Result<Self, String> {
        let result = sources
            .iter()
            .map(|&(shader_type, source)| Shader::new(gl, shader_type, source))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|shaders| {
                let refs: Vec<&Shader> = shaders.iter().collect();
                Self::new(gl, &refs)
            });

        match result {
            Ok(program) => {
                log::debug!("Built shader program '{name}'");
                Ok(program)
            }
            Err(e) => {
                log::error!("Shader program '{name}' failed: {e}");
                Err(format!("shader program '{name}': {e}"))
            }
        }
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable in the shader program.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        value.set_uniform(&self.gl, self.id, name);
    }

    /// Runs a compute program over `groups` work groups and waits for the given barrier bits.
    pub fn dispatch(&self, groups: (u32, u32, u32), barriers: u32) {
        unsafe {
            self.gl.use_program(Some(self.id));
            self.gl.dispatch_compute(groups.0, groups.1, groups.2);
            self.gl.memory_barrier(barriers);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}
