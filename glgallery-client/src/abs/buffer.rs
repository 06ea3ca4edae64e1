//! Shader storage buffers.
//!
//! [`ShaderStorageBuffer`] holds a typed array of plain-old-data elements that compute and
//! fragment shaders read and write through a `buffer` block binding.

use std::{marker::PhantomData, sync::Arc};

use bytemuck::Pod;
use glow::HasContext;

/// A GPU array of `T`, bound to `GL_SHADER_STORAGE_BUFFER`.
pub struct ShaderStorageBuffer<T: Pod> {
    gl: Arc<glow::Context>,
    id: glow::Buffer,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> ShaderStorageBuffer<T> {
    /// Creates a buffer holding a copy of `data`.
    pub fn new(gl: &Arc<glow::Context>, data: &[T]) -> Result<Self, String> {
        unsafe {
            let id = gl.create_buffer().map_err(|e| e.to_string())?;
            gl.bind_buffer(glow::SHADER_STORAGE_BUFFER, Some(id));
            gl.buffer_data_u8_slice(
                glow::SHADER_STORAGE_BUFFER,
                bytemuck::cast_slice(data),
                glow::DYNAMIC_COPY,
            );
            gl.bind_buffer(glow::SHADER_STORAGE_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id,
                len: data.len(),
                _marker: PhantomData,
            })
        }
    }

    /// Creates a zero-filled buffer of `len` elements.
    pub fn with_len(gl: &Arc<glow::Context>, len: usize) -> Result<Self, String> {
        Self::new(gl, &vec![T::zeroed(); len])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Binds the buffer to `layout(binding = index)`.
    pub fn bind_base(&self, index: u32) {
        unsafe {
            self.gl
                .bind_buffer_base(glow::SHADER_STORAGE_BUFFER, index, Some(self.id));
        }
    }

    /// Replaces the whole contents, reallocating when the length changes.
    pub fn update(&mut self, data: &[T]) {
        unsafe {
            self.gl
                .bind_buffer(glow::SHADER_STORAGE_BUFFER, Some(self.id));
            if data.len() == self.len {
                self.gl.buffer_sub_data_u8_slice(
                    glow::SHADER_STORAGE_BUFFER,
                    0,
                    bytemuck::cast_slice(data),
                );
            } else {
                self.gl.buffer_data_u8_slice(
                    glow::SHADER_STORAGE_BUFFER,
                    bytemuck::cast_slice(data),
                    glow::DYNAMIC_COPY,
                );
                self.len = data.len();
            }
            self.gl.bind_buffer(glow::SHADER_STORAGE_BUFFER, None);
        }
    }

    /// Overwrites the elements starting at `start`.
    pub fn update_range(&mut self, start: usize, data: &[T]) -> Result<(), String> {
        if start + data.len() > self.len {
            return Err(format!(
                "Range {}..{} out of bounds for {} elements",
                start,
                start + data.len(),
                self.len
            ));
        }
        unsafe {
            self.gl
                .bind_buffer(glow::SHADER_STORAGE_BUFFER, Some(self.id));
            self.gl.buffer_sub_data_u8_slice(
                glow::SHADER_STORAGE_BUFFER,
                (start * std::mem::size_of::<T>()) as i32,
                bytemuck::cast_slice(data),
            );
            self.gl.bind_buffer(glow::SHADER_STORAGE_BUFFER, None);
        }
        Ok(())
    }

    /// Zeroes every element.
    pub fn clear(&mut self) {
        let zeros = vec![T::zeroed(); self.len];
        self.update(&zeros);
    }

    /// Reads the buffer back to the CPU.
    pub fn read(&self) -> Vec<T> {
        let mut out = vec![T::zeroed(); self.len];
        unsafe {
            self.gl
                .bind_buffer(glow::SHADER_STORAGE_BUFFER, Some(self.id));
            self.gl.get_buffer_sub_data(
                glow::SHADER_STORAGE_BUFFER,
                0,
                bytemuck::cast_slice_mut(&mut out),
            );
            self.gl.bind_buffer(glow::SHADER_STORAGE_BUFFER, None);
        }
        out
    }
}

impl<T: Pod> Drop for ShaderStorageBuffer<T> {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.id);
        }
    }
}
