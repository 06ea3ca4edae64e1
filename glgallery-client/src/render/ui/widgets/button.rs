use glam::{Vec2, Vec4};
use sdl2::mouse::MouseButton;

use crate::render::ui::{
    uirenderer::{DrawCommand, UIRenderer},
    widgets::{LayoutContext, Widget, contains},
};

const BORDER: f32 = 3.0;

/// A flat, coloured button. The sample list uses one per sample, tinted with its accent.
///
/// A click is a left press that starts on the button followed by a release still over it.
pub struct Button {
    pub position: Vec2,
    pub size: Vec2,
    pub color: Vec4,
    /// Drawn with a light frame while set.
    pub selected: bool,
    pub disabled: bool,
    armed: bool,
    clicked: bool,
    hovered: bool,
}

impl Button {
    pub fn new(size: Vec2, color: Vec4) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
            color,
            selected: false,
            disabled: false,
            armed: false,
            clicked: false,
            hovered: false,
        }
    }

    /// Set for the one update in which a click completed.
    pub fn is_pressed(&self) -> bool {
        self.clicked && !self.disabled
    }

    fn fill(&self) -> Vec4 {
        let shade = if self.disabled {
            0.4
        } else if self.armed && self.hovered {
            0.8
        } else if self.hovered {
            1.2
        } else {
            1.0
        };
        (self.color.truncate() * shade).extend(self.color.w)
    }
}

impl Widget for Button {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        self.size
    }

    fn update(&mut self, ctx: &crate::other::UpdateContext) {
        let mouse = ctx.mouse;
        self.hovered = contains(self.position, self.size, mouse.position);
        if self.hovered && mouse.pressed.contains(&MouseButton::Left) {
            self.armed = true;
        }
        self.clicked =
            self.armed && self.hovered && mouse.released.contains(&MouseButton::Left);
        if !mouse.down.contains(&MouseButton::Left) {
            self.armed = false;
        }
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size_hint().min(ctx.max_size)
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        if self.selected {
            ui_renderer.add_command(DrawCommand::color(
                self.position,
                self.size,
                Vec4::new(0.95, 0.95, 0.95, 1.0),
            ));
            ui_renderer.add_command(DrawCommand::color(
                self.position + BORDER,
                (self.size - 2.0 * BORDER).max(Vec2::ZERO),
                self.fill(),
            ));
        } else {
            ui_renderer.add_command(DrawCommand::color(self.position, self.size, self.fill()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::other::{KeyboardState, MouseState, UpdateContext};

    fn button() -> Button {
        let mut button = Button::new(Vec2::new(40.0, 20.0), Vec4::ONE);
        button.position = Vec2::new(100.0, 100.0);
        button
    }

    fn step(button: &mut Button, mouse: &mut MouseState) {
        button.update(&UpdateContext::new(&KeyboardState::default(), mouse, 0.016));
        mouse.begin_frame();
    }

    fn press(mouse: &mut MouseState) {
        mouse.down.insert(MouseButton::Left);
        mouse.pressed.insert(MouseButton::Left);
    }

    fn release(mouse: &mut MouseState) {
        mouse.down.remove(&MouseButton::Left);
        mouse.released.insert(MouseButton::Left);
    }

    #[test]
    fn clicks_on_release_over_the_button() {
        let mut button = button();
        let mut mouse = MouseState {
            position: Vec2::new(110.0, 110.0),
            ..MouseState::default()
        };
        press(&mut mouse);
        step(&mut button, &mut mouse);
        assert!(!button.is_pressed());
        step(&mut button, &mut mouse);
        assert!(!button.is_pressed());

        release(&mut mouse);
        step(&mut button, &mut mouse);
        assert!(button.is_pressed());
        step(&mut button, &mut mouse);
        assert!(!button.is_pressed());
    }

    #[test]
    fn held_button_dragged_onto_it_does_not_click() {
        let mut button = button();
        let mut mouse = MouseState {
            position: Vec2::new(10.0, 10.0),
            ..MouseState::default()
        };
        press(&mut mouse);
        step(&mut button, &mut mouse);

        mouse.position = Vec2::new(110.0, 110.0);
        step(&mut button, &mut mouse);
        assert!(!button.is_pressed());

        release(&mut mouse);
        step(&mut button, &mut mouse);
        assert!(!button.is_pressed());
    }

    #[test]
    fn release_outside_cancels() {
        let mut button = button();
        let mut mouse = MouseState {
            position: Vec2::new(110.0, 110.0),
            ..MouseState::default()
        };
        press(&mut mouse);
        step(&mut button, &mut mouse);
        mouse.position = Vec2::new(0.0, 0.0);
        release(&mut mouse);
        step(&mut button, &mut mouse);
        assert!(!button.is_pressed());

        button.disabled = true;
        mouse.position = Vec2::new(110.0, 110.0);
        press(&mut mouse);
        release(&mut mouse);
        step(&mut button, &mut mouse);
        assert!(!button.is_pressed());
    }
}
