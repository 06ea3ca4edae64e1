use std::path::PathBuf;

use glam::UVec2;
use glgallery_core::config::GalleryConfig;
use glow::HasContext;
use sdl2::{event::Event, keyboard::Keycode};

use crate::{
    abs::{App, Framebuffer},
    gallery::{FpsCounter, window_title},
    other::{KeyboardState, MouseState, UpdateContext, track_input},
    samples::SampleKind,
};

mod abs;
mod gallery;
mod logging;
mod other;
mod render;
mod samples;
mod screenshot;

const USAGE: &str = "Usage: glgallery [--sample <name>] [--config <path>] [--list]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Options {
    /// Run this sample alone instead of the gallery.
    sample: Option<SampleKind>,
    config: Option<PathBuf>,
    list: bool,
    help: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" | "-s" => {
                let name = args.next().ok_or("--sample needs a sample name")?;
                options.sample = Some(name.parse()?);
            }
            "--config" | "-c" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config = Some(PathBuf::from(path));
            }
            "--list" | "-l" => options.list = true,
            "--help" | "-h" => options.help = true,
            other => return Err(format!("Unexpected argument '{other}'\n{USAGE}")),
        }
    }
    Ok(options)
}

/// Runs one sample straight in the window until it is closed or `Esc` is pressed.
fn run_standalone(app: &mut App, config: &GalleryConfig, kind: SampleKind) -> Result<(), String> {
    let mut sample = kind.create(&app.gl, &config.samples)?;
    log::info!("Running '{}' standalone", kind.title());

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
        let mut take_screenshot = false;

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
                } => take_screenshot = true,
                _ => sample.handle_event(&event),
            }
        }

        let update_ctx = UpdateContext::new(&keyboard_state, &mouse_state, delta_time);
        sample.update(&update_ctx);

        let (width, height) = app.drawable_size();
        unsafe {
            app.gl.viewport(0, 0, width as i32, height as i32);
        }
        sample.render(&app.gl, UVec2::new(width, height));
        if take_screenshot {
            let pixels = Framebuffer::read_default(&app.gl, width, height);
            screenshot::capture(config, kind.name(), width, height, pixels);
        }
        app.window.gl_swap_window();

        if let Some(rate) = fps.tick(delta_time) {
            let title = window_title(&config.window.title, kind, rate);
            if let Err(e) = app.window.set_title(&title) {
                log::warn!("Could not set window title: {e}");
            }
        }
    }

    Ok(())
}

fn run(options: Options) -> Result<(), String> {
    let config = match options.config.or_else(GalleryConfig::default_path) {
        Some(path) => {
            let config = GalleryConfig::load_or_create(&path);
            logging::set_level(config.log_level());
            log::debug!("Config: {}", path.display());
            config
        }
        None => {
            log::warn!("No config directory, using defaults");
            GalleryConfig::default()
        }
    };

    let mut app = App::new(&config.window)?;
    match options.sample {
        Some(kind) => run_standalone(&mut app, &config, kind),
        None => {
            let first = config.start_sample.parse().unwrap_or_else(|e| {
                log::warn!("{e}");
                SampleKind::HelloTriangle
            });
            gallery::run(&mut app, &config, first)
        }
    }
}

fn main() {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    if options.help {
        println!("{USAGE}");
        return;
    }
    if options.list {
        for kind in SampleKind::ALL {
            println!("{:<16} {}", kind.name(), kind.title());
        }
        return;
    }

    if let Err(e) = logging::init() {
        eprintln!("Could not set up logging: {e}");
    }
    if let Err(e) = run(options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_all_flags() {
        let options = parse_args(args(&["--sample", "ray-tracer", "-c", "x.json", "--list"]))
            .unwrap();
        assert_eq!(
            options,
            Options {
                sample: Some(SampleKind::RayTracer),
                config: Some(PathBuf::from("x.json")),
                list: true,
                help: false,
            }
        );
        assert_eq!(parse_args(Vec::new()).unwrap(), Options::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(args(&["--sample"])).is_err());
        assert!(parse_args(args(&["--sample", "teapot"])).is_err());
        assert!(parse_args(args(&["--fullscreen"])).is_err());
    }
}
