//! Thin owners of OpenGL objects: the window and context, shaders, meshes, buffers,
//! textures and framebuffers. Each wrapper releases its object when dropped.

pub mod app;
pub mod buffer;
pub mod framebuffer;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
pub use buffer::*;
pub use framebuffer::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
