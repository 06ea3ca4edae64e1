use std::collections::HashSet;

use glam::{Vec2, Vec3};
use glgallery_core::controls::ControlInput;
use sdl2::{event::Event, keyboard::Keycode, mouse::MouseButton};

/// The current state of the keyboard.
#[derive(Default, Clone)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

impl KeyboardState {
    /// Forgets the per-frame edges, keeping held keys.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    pub fn is_down(&self, key: Keycode) -> bool {
        self.down.contains(&key)
    }

    pub fn is_pressed(&self, key: Keycode) -> bool {
        self.pressed.contains(&key)
    }

    /// `+1` while `positive` is held, `-1` for `negative`, 0 for both or neither.
    fn axis(&self, positive: Keycode, negative: Keycode) -> f32 {
        self.is_down(positive) as i32 as f32 - self.is_down(negative) as i32 as f32
    }
}

/// The current state of the mouse.
#[derive(Default, Clone)]
pub struct MouseState {
    pub position: Vec2,
    pub delta: Vec2,
    pub down: HashSet<MouseButton>,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
    pub scroll_delta: Vec2,
}

impl MouseState {
    pub fn begin_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.pressed.clear();
        self.released.clear();
    }
}

/// Folds one SDL event into the input state.
pub fn track_input(keyboard: &mut KeyboardState, mouse: &mut MouseState, event: &Event) {
    match *event {
        Event::MouseMotion {
            x, y, xrel, yrel, ..
        } => {
            mouse.position = Vec2::new(x as f32, y as f32);
            mouse.delta += Vec2::new(xrel as f32, yrel as f32);
        }
        Event::MouseWheel { x, y, .. } => {
            mouse.scroll_delta += Vec2::new(x as f32, y as f32);
        }
        Event::MouseButtonDown { mouse_btn, .. } => {
            mouse.down.insert(mouse_btn);
            mouse.pressed.insert(mouse_btn);
        }
        Event::MouseButtonUp { mouse_btn, .. } => {
            mouse.down.remove(&mouse_btn);
            mouse.released.insert(mouse_btn);
        }
        Event::KeyDown {
            keycode: Some(keycode),
            repeat: false,
            ..
        } => {
            keyboard.down.insert(keycode);
            keyboard.pressed.insert(keycode);
        }
        Event::KeyUp {
            keycode: Some(keycode),
            repeat: false,
            ..
        } => {
            keyboard.down.remove(&keycode);
            keyboard.released.insert(keycode);
        }
        _ => {}
    }
}

/// Context provided to widgets and samples during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    pub delta_time: f32,
}

impl<'a> UpdateContext<'a> {
    /// Creates a new `UpdateContext` from the given keyboard and mouse states and delta time.
    pub fn new(keyboard: &'a KeyboardState, mouse: &'a MouseState, delta_time: f32) -> Self {
        Self {
            keyboard,
            mouse,
            delta_time,
        }
    }

    /// Maps the raw state to control input: drag with the left button to rotate, wheel to
    /// zoom, WASD to move, Space and C to rise and sink.
    pub fn control_input(&self) -> ControlInput {
        let rotate = if self.mouse.down.contains(&MouseButton::Left) {
            self.mouse.delta
        } else {
            Vec2::ZERO
        };
        let kb = self.keyboard;
        ControlInput {
            rotate,
            zoom: self.mouse.scroll_delta.y,
            movement: Vec3::new(
                kb.axis(Keycode::D, Keycode::A),
                kb.axis(Keycode::Space, Keycode::C),
                kb.axis(Keycode::W, Keycode::S),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_needs_a_held_button() {
        let keyboard = KeyboardState::default();
        let mut mouse = MouseState {
            delta: Vec2::new(4.0, -2.0),
            scroll_delta: Vec2::new(0.0, 1.0),
            ..MouseState::default()
        };
        let input = UpdateContext::new(&keyboard, &mouse, 0.016).control_input();
        assert_eq!(input.rotate, Vec2::ZERO);
        assert_eq!(input.zoom, 1.0);

        mouse.down.insert(MouseButton::Left);
        let input = UpdateContext::new(&keyboard, &mouse, 0.016).control_input();
        assert_eq!(input.rotate, Vec2::new(4.0, -2.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut keyboard = KeyboardState::default();
        let mouse = MouseState::default();
        keyboard.down.extend([Keycode::W, Keycode::D, Keycode::A, Keycode::Space]);
        let input = UpdateContext::new(&keyboard, &mouse, 0.016).control_input();
        assert_eq!(input.movement, Vec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn edges_are_cleared_each_frame() {
        let mut keyboard = KeyboardState::default();
        let mut mouse = MouseState::default();
        mouse.scroll_delta = Vec2::new(0.0, 2.0);
        mouse.pressed.insert(MouseButton::Left);
        keyboard.down.insert(Keycode::W);
        keyboard.pressed.insert(Keycode::W);

        keyboard.begin_frame();
        mouse.begin_frame();
        assert!(keyboard.is_down(Keycode::W));
        assert!(!keyboard.is_pressed(Keycode::W));
        assert_eq!(mouse.scroll_delta, Vec2::ZERO);
        assert!(mouse.pressed.is_empty());
    }
}
