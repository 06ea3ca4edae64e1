//! The gallery shell: a column of sample buttons next to an embedded viewport.
//!
//! The active sample renders into the viewport's off-screen target every frame; the widget pass
//! then composites the panel and the target onto the window. Keys `1`-`7` or the buttons switch
//! samples, `F12` saves the viewport, `Esc` quits.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use glgallery_core::{
    config::{GalleryConfig, SampleSettings},
    math,
};
use glow::HasContext;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
};

use crate::{
    abs::{App, Framebuffer},
    other::{KeyboardState, MouseState, UpdateContext, track_input},
    render::ui::{uirenderer::UIRenderer, widgets::*},
    samples::{Sample, SampleKind},
    screenshot, shader_program,
};

const BUTTON_HEIGHT: f32 = 56.0;
const PANEL_PADDING: f32 = 12.0;
const PANEL_BACKGROUND: Vec4 = Vec4::new(0.11, 0.12, 0.14, 1.0);
/// Gap between panel and viewport, showing the window's clear colour.
const DIVIDER: f32 = 2.0;
const VIEWPORT_SLOT: usize = 2;

/// The sample a number key selects, `1` being the first.
pub fn sample_for_key(key: Keycode) -> Option<SampleKind> {
    let index = match key {
        Keycode::Num1 | Keycode::Kp1 => 0,
        Keycode::Num2 | Keycode::Kp2 => 1,
        Keycode::Num3 | Keycode::Kp3 => 2,
        Keycode::Num4 | Keycode::Kp4 => 3,
        Keycode::Num5 | Keycode::Kp5 => 4,
        Keycode::Num6 | Keycode::Kp6 => 5,
        Keycode::Num7 | Keycode::Kp7 => 6,
        _ => return None,
    };
    SampleKind::ALL.get(index).copied()
}

/// Counts frames and reports the rate once per second.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    /// Counts one frame that took `delta_time` seconds. Returns the average rate when a full
    /// second has gone by since the last report.
    pub fn tick(&mut self, delta_time: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta_time;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

pub fn window_title(base: &str, kind: SampleKind, fps: f32) -> String {
    format!("{base} - {} - {fps:.0} FPS", kind.title())
}

pub struct Gallery {
    gl: Arc<glow::Context>,
    ui: UIRenderer,
    /// Panel column, divider, viewport.
    root: Row,
    sample: Option<Box<dyn Sample>>,
    kind: SampleKind,
    settings: SampleSettings,
    panel_width: f32,
    window_size: Vec2,
}

impl Gallery {
    pub fn new(
        gl: &Arc<glow::Context>,
        config: &GalleryConfig,
        first: SampleKind,
        window_size: (u32, u32),
    ) -> Result<Self, String> {
        let panel_width = config.window.panel_width as f32;
        let button_width = (panel_width - 2.0 * PANEL_PADDING).max(1.0);

        let mut panel = Column::new(
            8.0,
            Alignment::Center,
            Vec4::splat(PANEL_PADDING),
            Justification::Center,
        );
        panel.background = Some(PANEL_BACKGROUND);
        for kind in SampleKind::ALL {
            panel.add_widget(Button::new(
                Vec2::new(button_width, BUTTON_HEIGHT),
                kind.accent(),
            ));
        }

        let mut root = Row::new(0.0, Alignment::Start, Vec4::ZERO, Justification::Start);
        root.add_widget(panel);
        root.add_widget(Spacer::new(Vec2::new(DIVIDER, 1.0)));
        root.add_widget(Viewport::new(Vec2::ONE));

        let ui = UIRenderer::new(gl, shader_program!(ui, gl)?, math::pixel_projection(1.0, 1.0));
        let mut gallery = Self {
            gl: Arc::clone(gl),
            ui,
            root,
            sample: None,
            kind: first,
            settings: config.samples.clone(),
            panel_width,
            window_size: Vec2::ONE,
        };
        gallery.resize(window_size);

        // The first sample has nothing to fall back to.
        gallery.sample = Some(first.create(gl, &gallery.settings)?);
        gallery.mark_selected();
        log::info!("Showing '{}'", first.title());
        Ok(gallery)
    }

    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    fn panel(&self) -> Option<&Column> {
        self.root.get_widget::<Column>(0)
    }

    fn viewport(&self) -> Option<&Viewport> {
        self.root.get_widget::<Viewport>(VIEWPORT_SLOT)
    }

    fn mark_selected(&mut self) {
        let current = self.kind.index();
        if let Some(panel) = self.root.get_widget_mut::<Column>(0) {
            for i in 0..SampleKind::ALL.len() {
                if let Some(button) = panel.get_widget_mut::<Button>(i) {
                    button.selected = i == current;
                }
            }
        }
    }

    /// Replaces the active sample. The old one is dropped first so its GL objects are gone
    /// before the new one allocates; if the new one fails, the old kind is created again.
    pub fn switch_to(&mut self, kind: SampleKind) {
        if kind == self.kind && self.sample.is_some() {
            return;
        }
        let previous = self.kind;
        if let Some(old) = self.sample.take() {
            log::debug!("Releasing '{}'", old.name());
        }

        match kind.create(&self.gl, &self.settings) {
            Ok(sample) => {
                log::info!("Switched to '{}'", kind.title());
                self.sample = Some(sample);
                self.kind = kind;
            }
            Err(e) => {
                log::error!("Could not start '{}': {e}", kind.title());
                match previous.create(&self.gl, &self.settings) {
                    Ok(sample) => self.sample = Some(sample),
                    Err(e) => log::error!("Could not restore '{}': {e}", previous.title()),
                }
            }
        }
        self.mark_selected();
    }

    /// Lays the panel and viewport out for a window of `size` (in window coordinates).
    pub fn resize(&mut self, (width, height): (u32, u32)) {
        self.window_size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        self.ui.projection_matrix = math::pixel_projection(self.window_size.x, self.window_size.y);

        let panel_width = self.panel_width.min(self.window_size.x);
        if let Some(panel) = self.root.get_widget_mut::<Column>(0) {
            panel.min_size = Vec2::new(panel_width, self.window_size.y);
        }
        if let Some(viewport) = self.root.get_widget_mut::<Viewport>(VIEWPORT_SLOT) {
            viewport.size = Vec2::new(
                (self.window_size.x - panel_width - DIVIDER).max(1.0),
                self.window_size.y,
            );
        }
        self.root.layout(&LayoutContext {
            max_size: self.window_size,
            cursor: Vec2::ZERO,
        });
    }

    /// Forwards an event to the sample. Pointer events only reach it while the viewport holds
    /// the pointer.
    pub fn handle_event(&mut self, event: &Event) {
        let pointer = matches!(
            event,
            Event::MouseMotion { .. }
                | Event::MouseButtonDown { .. }
                | Event::MouseButtonUp { .. }
                | Event::MouseWheel { .. }
        );
        if pointer && !self.viewport().is_some_and(Viewport::captures_pointer) {
            return;
        }
        if let Some(sample) = &mut self.sample {
            sample.handle_event(event);
        }
    }

    pub fn update(&mut self, keyboard: &KeyboardState, mouse: &MouseState, delta_time: f32) {
        self.root.update(&UpdateContext::new(keyboard, mouse, delta_time));

        let sample_has_pointer = self.viewport().is_some_and(Viewport::captures_pointer);
        let pressed = self.panel().filter(|_| !sample_has_pointer).and_then(|panel| {
            (0..SampleKind::ALL.len())
                .find(|&i| panel.get_widget::<Button>(i).is_some_and(Button::is_pressed))
        });
        if let Some(kind) = pressed.and_then(|i| SampleKind::ALL.get(i).copied()) {
            self.switch_to(kind);
        }

        let local = match self.viewport() {
            Some(viewport) if viewport.captures_pointer() => viewport.local_mouse(mouse),
            _ => MouseState::default(),
        };
        if let Some(sample) = &mut self.sample {
            sample.update(&UpdateContext::new(keyboard, &local, delta_time));
        }
    }

    /// Renders the sample into the viewport target, then the shell onto the window.
    pub fn render(&mut self, drawable_size: (u32, u32)) {
        let gl = Arc::clone(&self.gl);
        if let Some(viewport) = self.root.get_widget_mut::<Viewport>(VIEWPORT_SLOT) {
            let size = viewport.pixel_size();
            match viewport.target(&gl) {
                Ok(target) => {
                    target.bind();
                    match &mut self.sample {
                        Some(sample) => sample.render(&gl, size),
                        None => unsafe {
                            gl.clear_color(0.0, 0.0, 0.0, 1.0);
                            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                        },
                    }
                    Framebuffer::unbind(&gl);
                }
                Err(e) => log::error!("Viewport target: {e}"),
            }
        }

        unsafe {
            gl.viewport(0, 0, drawable_size.0 as i32, drawable_size.1 as i32);
            gl.clear_color(0.04, 0.04, 0.05, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        self.ui.begin();
        self.root.draw(&mut self.ui);
        self.ui.finish();
    }

    /// Saves the viewport's last frame.
    pub fn screenshot(&self, config: &GalleryConfig) {
        match self.viewport().and_then(Viewport::framebuffer) {
            Some(target) => {
                let (width, height) = target.size();
                screenshot::capture(
                    config,
                    self.kind.name(),
                    width,
                    height,
                    target.read_pixels(),
                );
            }
            None => log::warn!("Nothing rendered yet, no screenshot taken"),
        }
    }
}

/// Runs the gallery until the window is closed or `Esc` is pressed.
pub fn run(app: &mut App, config: &GalleryConfig, first: SampleKind) -> Result<(), String> {
    let mut gallery = Gallery::new(&app.gl, config, first, app.window.size())?;

    let mut keyboard_state = KeyboardState::default();
    let mut mouse_state = MouseState::default();
    let mut fps = FpsCounter::default();
    let mut last_frame_time = std::time::Instant::now();

    'running: loop {
        let now = std::time::Instant::now();
        let delta_time = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        keyboard_state.begin_frame();
        mouse_state.begin_frame();

        for event in app.event_pump.poll_iter() {
            track_input(&mut keyboard_state, &mut mouse_state, &event);
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::F12),
                    repeat: false,
                    ..
                } => gallery.screenshot(config),
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } if sample_for_key(key).is_some() => {
                    if let Some(kind) = sample_for_key(key) {
                        gallery.switch_to(kind);
                    }
                }
                Event::Window {
                    win_event: WindowEvent::Resized(..) | WindowEvent::SizeChanged(..),
                    ..
                } => gallery.resize(app.window.size()),
                _ => gallery.handle_event(&event),
            }
        }

        gallery.update(&keyboard_state, &mouse_state, delta_time);
        gallery.render(app.drawable_size());
        app.window.gl_swap_window();

        if let Some(rate) = fps.tick(delta_time) {
            let title = window_title(&config.window.title, gallery.kind(), rate);
            if let Err(e) = app.window.set_title(&title) {
                log::warn!("Could not set window title: {e}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_pick_samples_in_order() {
        assert_eq!(sample_for_key(Keycode::Num1), Some(SampleKind::HelloTriangle));
        assert_eq!(sample_for_key(Keycode::Kp5), Some(SampleKind::RayTracer));
        assert_eq!(sample_for_key(Keycode::Num7), Some(SampleKind::RubiksCube));
        assert_eq!(sample_for_key(Keycode::Num8), None);
    }

    #[test]
    fn fps_reports_once_per_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..59 {
            assert_eq!(fps.tick(1.0 / 60.0), None);
        }
        let rate = fps.tick(1.0 / 60.0 + 1e-4).unwrap();
        assert!((rate - 60.0).abs() < 0.5);
        assert_eq!(fps.tick(0.1), None);
    }

    #[test]
    fn title_names_the_sample() {
        assert_eq!(
            window_title("GL Gallery", SampleKind::BarnsleyFern, 59.6),
            "GL Gallery - Barnsley Fern - 60 FPS"
        );
    }
}
