//! Saving rendered frames as PNG files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use glgallery_core::config::GalleryConfig;
use image::RgbaImage;

/// File name for a screenshot of `sample` taken at `time`.
pub fn screenshot_name(sample: &str, time: &DateTime<Local>) -> String {
    format!("glgallery-{sample}-{}.png", time.format("%Y%m%d-%H%M%S"))
}

/// Where screenshots go: the configured directory, else the user's pictures directory, else the
/// working directory.
pub fn screenshot_dir(config: &GalleryConfig) -> PathBuf {
    config
        .screenshot_dir
        .clone()
        .or_else(dirs::picture_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Turns GL pixel rows (bottom row first) into an upright image.
pub fn image_from_gl(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaImage, String> {
    let expected = width as usize * height as usize * 4;
    let got = pixels.len();
    let mut image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        format!("Expected {expected} bytes for a {width}x{height} image, got {got}")
    })?;
    image::imageops::flip_vertical_in_place(&mut image);
    Ok(image)
}

/// Writes the pixels to `dir/name`, creating `dir` if needed.
pub fn save_rgba(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> Result<PathBuf, String> {
    let image = image_from_gl(width, height, pixels)?;
    std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let path = dir.join(name);
    image.save(&path).map_err(|e| e.to_string())?;
    Ok(path)
}

/// Saves a screenshot of `sample` into the configured directory and logs the outcome.
pub fn capture(config: &GalleryConfig, sample: &str, width: u32, height: u32, pixels: Vec<u8>) {
    let name = screenshot_name(sample, &Local::now());
    match save_rgba(&screenshot_dir(config), &name, width, height, pixels) {
        Ok(path) => log::info!("Screenshot saved to {}", path.display()),
        Err(e) => log::error!("Screenshot failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn names_carry_sample_and_time() {
        let time = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            screenshot_name("ray_tracer", &time),
            "glgallery-ray_tracer-20240309-070501.png"
        );
    }

    #[test]
    fn rows_are_flipped_upright() {
        // Two rows of one pixel: red at the bottom, blue on top.
        let pixels = vec![255, 0, 0, 255, 0, 0, 255, 255];
        let image = image_from_gl(1, 2, pixels).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(image_from_gl(4, 4, vec![0; 10]).is_err());
    }

    #[test]
    fn configured_dir_wins() {
        let config = GalleryConfig {
            screenshot_dir: Some(PathBuf::from("/tmp/shots")),
            ..GalleryConfig::default()
        };
        assert_eq!(screenshot_dir(&config), PathBuf::from("/tmp/shots"));
    }
}
