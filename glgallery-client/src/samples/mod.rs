//! Module providing the `Sample` trait and all sample implementations.
//!
//! A sample builds its GL objects once in its constructor, is updated and rendered every frame
//! by whichever host is running it, and releases everything when dropped.

use std::{fmt, str::FromStr, sync::Arc};

use glam::{UVec2, Vec4};
use glgallery_core::config::SampleSettings;

use crate::other::UpdateContext;

pub mod barnsley_fern;
pub mod hello_triangle;
pub mod parallax;
pub mod ray_tracer;
pub mod rubiks;
pub mod spinning_cube;
pub mod trefoil;

/// The Sample trait defines the common interface for all samples.
pub trait Sample {
    fn kind(&self) -> SampleKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Handles a raw event. Only called while the sample has input focus.
    fn handle_event(&mut self, _event: &sdl2::event::Event) {}

    /// Advances the sample by one frame.
    fn update(&mut self, ctx: &UpdateContext);

    /// Renders into the bound framebuffer, whose viewport covers `size` pixels.
    fn render(&mut self, gl: &Arc<glow::Context>, size: UVec2);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleKind {
    HelloTriangle,
    SpinningCube,
    TrefoilKnot,
    Parallax,
    RayTracer,
    BarnsleyFern,
    RubiksCube,
}

impl SampleKind {
    pub const ALL: [SampleKind; 7] = [
        SampleKind::HelloTriangle,
        SampleKind::SpinningCube,
        SampleKind::TrefoilKnot,
        SampleKind::Parallax,
        SampleKind::RayTracer,
        SampleKind::BarnsleyFern,
        SampleKind::RubiksCube,
    ];

    /// Identifier used on the command line, in the config and in screenshot names.
    pub fn name(self) -> &'static str {
        match self {
            SampleKind::HelloTriangle => "hello_triangle",
            SampleKind::SpinningCube => "spinning_cube",
            SampleKind::TrefoilKnot => "trefoil_knot",
            SampleKind::Parallax => "parallax",
            SampleKind::RayTracer => "ray_tracer",
            SampleKind::BarnsleyFern => "barnsley_fern",
            SampleKind::RubiksCube => "rubiks_cube",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SampleKind::HelloTriangle => "Hello Triangle",
            SampleKind::SpinningCube => "Spinning Cube",
            SampleKind::TrefoilKnot => "Trefoil Knot",
            SampleKind::Parallax => "Parallax Mapping",
            SampleKind::RayTracer => "Compute Ray Tracer",
            SampleKind::BarnsleyFern => "Barnsley Fern",
            SampleKind::RubiksCube => "Rubik's Cube",
        }
    }

    /// Button colour in the gallery panel.
    pub fn accent(self) -> Vec4 {
        match self {
            SampleKind::HelloTriangle => Vec4::new(0.80, 0.27, 0.25, 1.0),
            SampleKind::SpinningCube => Vec4::new(0.90, 0.55, 0.20, 1.0),
            SampleKind::TrefoilKnot => Vec4::new(0.85, 0.75, 0.25, 1.0),
            SampleKind::Parallax => Vec4::new(0.35, 0.65, 0.30, 1.0),
            SampleKind::RayTracer => Vec4::new(0.25, 0.55, 0.80, 1.0),
            SampleKind::BarnsleyFern => Vec4::new(0.20, 0.70, 0.55, 1.0),
            SampleKind::RubiksCube => Vec4::new(0.55, 0.35, 0.75, 1.0),
        }
    }

    /// Position in [`SampleKind::ALL`]; key `index + 1` selects the sample in the gallery.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }

    pub fn create(
        self,
        gl: &Arc<glow::Context>,
        settings: &SampleSettings,
    ) -> Result<Box<dyn Sample>, String> {
        log::debug!("Creating sample '{}'", self.name());
        Ok(match self {
            SampleKind::HelloTriangle => Box::new(hello_triangle::HelloTriangle::new(gl)?),
            SampleKind::SpinningCube => {
                Box::new(spinning_cube::SpinningCube::new(gl, settings)?)
            }
            SampleKind::TrefoilKnot => Box::new(trefoil::TrefoilKnot::new(gl, settings)?),
            SampleKind::Parallax => Box::new(parallax::Parallax::new(gl, settings)?),
            SampleKind::RayTracer => Box::new(ray_tracer::RayTracer::new(gl, settings)?),
            SampleKind::BarnsleyFern => {
                Box::new(barnsley_fern::BarnsleyFern::new(gl, settings)?)
            }
            SampleKind::RubiksCube => Box::new(rubiks::RubiksViewer::new(gl, settings)?),
        })
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleKind {
    type Err = String;

    /// Accepts the sample name in any case, with `-` in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.name()).collect();
                format!("Unknown sample '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Aspect ratio of `size`, guarding against zero height.
pub(crate) fn aspect(size: UVec2) -> f32 {
    size.x.max(1) as f32 / size.y.max(1) as f32
}
