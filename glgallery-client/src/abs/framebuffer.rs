//! Module to work with OpenGL framebuffers.
//!
//! The gallery renders the active sample into a [`Framebuffer`] and composites its colour
//! texture into the viewport widget. Screenshots read the pixels back from the same target.

use std::sync::Arc;

use glow::HasContext;

use crate::abs::Texture;

/// Represents an OpenGL framebuffer with an RGBA8 colour attachment.
pub struct Framebuffer {
    gl: Arc<glow::Context>,
    fbo: glow::Framebuffer,
    color_tex: Texture,
    /// Only owned, so it lives as long as the attachment.
    _depth_tex: Option<Texture>,
}

fn attachment(
    gl: &Arc<glow::Context>,
    width: i32,
    height: i32,
    (internal, format, ty): (u32, u32, u32),
    filter: u32,
) -> Result<Texture, String> {
    unsafe {
        let tex = gl.create_texture().map_err(|e| e.to_string())?;
        gl.bind_texture(glow::TEXTURE_2D, Some(tex));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            internal as i32,
            width,
            height,
            0,
            format,
            ty,
            glow::PixelUnpackData::Slice(None),
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter as i32);
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.bind_texture(glow::TEXTURE_2D, None);

        Ok(Texture {
            gl: Arc::clone(gl),
            id: tex,
            width: width as u32,
            height: height as u32,
        })
    }
}

impl Framebuffer {
    /// Creates a new framebuffer with the specified width and height, clamped to at least one
    /// pixel.
    pub fn new(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        use_depth: bool,
    ) -> Result<Self, String> {
        let (width, height) = (width.max(1) as i32, height.max(1) as i32);
        let color_tex = attachment(
            gl,
            width,
            height,
            (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
            glow::LINEAR,
        )?;
        let depth_tex = if use_depth {
            Some(attachment(
                gl,
                width,
                height,
                (glow::DEPTH_COMPONENT24, glow::DEPTH_COMPONENT, glow::UNSIGNED_INT),
                glow::NEAREST,
            )?)
        } else {
            None
        };

        unsafe {
            let fbo = gl.create_framebuffer().map_err(|e| e.to_string())?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color_tex.id),
                0,
            );
            if let Some(depth) = &depth_tex {
                gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_ATTACHMENT,
                    glow::TEXTURE_2D,
                    Some(depth.id),
                    0,
                );
            }

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.delete_framebuffer(fbo);
                return Err(format!("Framebuffer incomplete: 0x{status:x}"));
            }

            Ok(Self {
                gl: Arc::clone(gl),
                fbo,
                color_tex,
                _depth_tex: depth_tex,
            })
        }
    }

    /// Binds the framebuffer for rendering and sets the viewport to cover it.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            self.gl.viewport(
                0,
                0,
                self.color_tex.width as i32,
                self.color_tex.height as i32,
            );
        }
    }

    /// Unbinds the framebuffer, reverting to the default framebuffer.
    pub fn unbind(gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.color_tex.width, self.color_tex.height)
    }

    /// Returns the color texture of the framebuffer.
    pub fn texture(&self) -> &Texture {
        &self.color_tex
    }

    /// Reads the colour attachment as tightly packed RGBA8 rows, bottom row first.
    pub fn read_pixels(&self) -> Vec<u8> {
        let (width, height) = self.size();
        read_rgba(&self.gl, Some(self.fbo), width, height)
    }

    /// Reads `width` x `height` pixels of the window's back buffer, bottom row first.
    pub fn read_default(gl: &glow::Context, width: u32, height: u32) -> Vec<u8> {
        unsafe {
            gl.read_buffer(glow::BACK);
        }
        read_rgba(gl, None, width, height)
    }
}

fn read_rgba(
    gl: &glow::Context,
    fbo: Option<glow::Framebuffer>,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    unsafe {
        gl.bind_framebuffer(glow::READ_FRAMEBUFFER, fbo);
        gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
        gl.read_pixels(
            0,
            0,
            width as i32,
            height as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelPackData::Slice(Some(&mut pixels)),
        );
        gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
    }
    pixels
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_framebuffer(self.fbo);
        }
    }
}
