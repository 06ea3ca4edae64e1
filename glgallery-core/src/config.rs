//! Gallery configuration, stored as JSON in the user's config directory.
//!
//! Every field has a default, so a partial file (or none at all) is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    /// Width of the sample list next to the embedded viewport, in pixels.
    pub panel_width: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "GL Gallery".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            panel_width: 220,
        }
    }
}

/// Per-sample tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSettings {
    /// Vertical field of view in degrees for the perspective samples.
    pub fov: f32,
    pub trefoil_slices: u32,
    pub trefoil_stacks: u32,
    /// Number of chaos-game walkers on the GPU.
    pub fern_walkers: u32,
    /// Steps each walker takes per frame.
    pub fern_steps: u32,
    pub ray_max_bounces: u32,
    pub ray_samples_per_frame: u32,
    /// Edge length of the procedural relief texture, clamped to 8..=256.
    pub relief_size: usize,
    /// Quarter turns per second.
    pub rubiks_speed: f32,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            fov: 60.0,
            trefoil_slices: 128,
            trefoil_stacks: 32,
            fern_walkers: 64 * 256,
            fern_steps: 64,
            ray_max_bounces: 6,
            ray_samples_per_frame: 1,
            relief_size: 64,
            rubiks_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub window: WindowConfig,
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Sample shown first in gallery mode.
    pub start_sample: String,
    /// Where screenshots go; the pictures directory when unset.
    pub screenshot_dir: Option<PathBuf>,
    pub samples: SampleSettings,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            log_level: "info".to_string(),
            start_sample: "hello_triangle".to_string(),
            screenshot_dir: None,
            samples: SampleSettings::default(),
        }
    }
}

impl GalleryConfig {
    /// `<config dir>/glgallery/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("glgallery").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, text).map_err(|e| e.to_string())
    }

    /// Loads the file at `path`, writing the defaults there first if it does not exist.
    /// An unreadable file is reported and replaced by the defaults in memory only.
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            match config.save(path) {
                Ok(()) => log::info!("Wrote default config to {}", path.display()),
                Err(e) => log::warn!("Could not write default config: {e}"),
            }
            return config;
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config, using defaults: {e}");
            Self::default()
        })
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("glgallery-test-{}-{name}", std::process::id()))
            .join("config.json")
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: GalleryConfig =
            serde_json::from_str(r#"{ "window": { "width": 640 }, "log_level": "debug" }"#)
                .unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
        assert_eq!(config.samples, SampleSettings::default());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = GalleryConfig {
            log_level: "loud".to_string(),
            ..GalleryConfig::default()
        };
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip");
        let mut config = GalleryConfig::default();
        config.start_sample = "ray_tracer".to_string();
        config.samples.fov = 75.0;
        config.save(&path).unwrap();
        assert_eq!(GalleryConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn load_or_create_writes_defaults() {
        let path = temp_path("create");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        let config = GalleryConfig::load_or_create(&path);
        assert_eq!(config, GalleryConfig::default());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn broken_file_yields_defaults() {
        let path = temp_path("broken");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(GalleryConfig::load(&path).is_err());
        assert_eq!(GalleryConfig::load_or_create(&path), GalleryConfig::default());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
