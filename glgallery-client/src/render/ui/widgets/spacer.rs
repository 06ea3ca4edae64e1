use glam::Vec2;

use crate::render::ui::{
    uirenderer::UIRenderer,
    widgets::{LayoutContext, Widget},
};

/// Empty space of a fixed size.
pub struct Spacer {
    pub size: Vec2,
    pub position: Vec2,
}

impl Spacer {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            position: Vec2::ZERO,
        }
    }
}

impl Widget for Spacer {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        self.size
    }

    fn update(&mut self, _ctx: &crate::other::UpdateContext) {}

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size_hint()
    }

    fn draw(&self, _ui_renderer: &mut UIRenderer) {}
}
