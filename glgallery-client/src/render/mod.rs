//! Module for anything related to rendering.
//!
//! This module contains the widget UI, helpers shared by the samples and all used shaders
//! (under `render/shaders/<program>/`).

pub mod fullscreen;
pub mod model;
pub mod ui;

pub use fullscreen::FullscreenPass;
pub use model::draw_model;
