//! The embedded GL surface of the gallery.
//!
//! A [`Viewport`] owns an off-screen [`Framebuffer`] the size of its rectangle. The active sample
//! renders into it, then the widget pass draws its colour texture like any other quad.

use std::sync::Arc;

use glam::{UVec2, Vec2, Vec4};
use sdl2::mouse::MouseButton;

use crate::{
    abs::Framebuffer,
    other::{MouseState, UpdateContext},
    render::ui::{
        uirenderer::{DrawCommand, UIRenderMode, UIRenderer},
        widgets::{LayoutContext, Widget, contains},
    },
};

pub struct Viewport {
    pub position: Vec2,
    pub size: Vec2,
    pub background: Vec4,
    target: Option<Framebuffer>,
    hovered: bool,
    dragging: bool,
}

impl Viewport {
    pub fn new(size: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
            target: None,
            hovered: false,
            dragging: false,
        }
    }

    /// Size of the render target in pixels, at least 1x1.
    pub fn pixel_size(&self) -> UVec2 {
        self.size.max(Vec2::ONE).as_uvec2()
    }

    /// Whether the sample should receive pointer input: the pointer is over the viewport, or a
    /// drag started there is still held.
    pub fn captures_pointer(&self) -> bool {
        self.hovered || self.dragging
    }

    /// `mouse` with its position made relative to the viewport's top-left corner.
    pub fn local_mouse(&self, mouse: &MouseState) -> MouseState {
        MouseState {
            position: mouse.position - self.position,
            ..mouse.clone()
        }
    }

    /// The render target, recreated when the viewport has been resized.
    pub fn target(&mut self, gl: &Arc<glow::Context>) -> Result<&Framebuffer, String> {
        let size = self.pixel_size();
        let stale = self
            .target
            .as_ref()
            .is_none_or(|fb| UVec2::from(fb.size()) != size);
        if stale {
            // Release the old target before allocating the new one.
            self.target = None;
            let fb = Framebuffer::new(gl, size.x, size.y, true)?;
            log::debug!("Viewport target resized to {}x{}", size.x, size.y);
            self.target = Some(fb);
        }
        self.target
            .as_ref()
            .ok_or_else(|| "Viewport has no render target".to_string())
    }

    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.target.as_ref()
    }
}

impl Widget for Viewport {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        self.size
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.hovered = contains(self.position, self.size, ctx.mouse.position);
        if self.hovered && ctx.mouse.pressed.contains(&MouseButton::Left) {
            self.dragging = true;
        }
        if !ctx.mouse.down.contains(&MouseButton::Left) {
            self.dragging = false;
        }
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        match &self.target {
            Some(fb) => ui_renderer.add_command(DrawCommand {
                rect: [self.position, self.position + self.size],
                // Framebuffer rows run bottom-up.
                uv_rect: [Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)],
                mode: UIRenderMode::Texture(fb.texture().handle(), Vec4::ONE),
            }),
            None => ui_renderer.add_command(DrawCommand::color(
                self.position,
                self.size,
                self.background,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::other::KeyboardState;

    #[test]
    fn drag_keeps_capture_outside_the_rect() {
        let mut viewport = Viewport::new(Vec2::new(100.0, 100.0));
        viewport.position = Vec2::new(50.0, 0.0);
        let keyboard = KeyboardState::default();

        let mut mouse = MouseState {
            position: Vec2::new(60.0, 10.0),
            ..MouseState::default()
        };
        mouse.down.insert(MouseButton::Left);
        mouse.pressed.insert(MouseButton::Left);
        viewport.update(&UpdateContext::new(&keyboard, &mouse, 0.016));
        assert!(viewport.captures_pointer());

        mouse.position = Vec2::new(10.0, 10.0);
        mouse.pressed.clear();
        viewport.update(&UpdateContext::new(&keyboard, &mouse, 0.016));
        assert!(!viewport.hovered);
        assert!(viewport.captures_pointer());

        mouse.down.clear();
        viewport.update(&UpdateContext::new(&keyboard, &mouse, 0.016));
        assert!(!viewport.captures_pointer());
    }

    #[test]
    fn local_mouse_is_relative() {
        let mut viewport = Viewport::new(Vec2::new(10.0, 10.0));
        viewport.position = Vec2::new(200.0, 20.0);
        let mouse = MouseState {
            position: Vec2::new(205.0, 25.0),
            ..MouseState::default()
        };
        assert_eq!(viewport.local_mouse(&mouse).position, Vec2::new(5.0, 5.0));
        assert_eq!(
            Viewport::new(Vec2::new(0.0, 0.5)).pixel_size(),
            UVec2::ONE
        );
    }
}
