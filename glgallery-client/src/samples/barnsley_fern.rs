//! The Barnsley fern drawn by the chaos game on the GPU.
//!
//! A compute shader moves thousands of independent walkers through the IFS each frame and
//! counts their visits per pixel in a storage buffer; a fragment shader turns the counts into a
//! log-scaled density image. `R` clears the plot and reseeds the walkers.
//!
//! Walkers are moved onto the attractor on the CPU before they are uploaded, so no transient
//! points are plotted. The plot is cleared before any cell count could pass `u32::MAX`.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{UVec2, Vec2, Vec3};
use glgallery_core::{
    config::SampleSettings,
    ifs::{FERN_BOUNDS, GpuAffineMap, Ifs},
};
use glow::HasContext;
use rand::Rng;
use sdl2::keyboard::Keycode;

use crate::{
    abs::{ShaderProgram, ShaderStorageBuffer},
    compute_program,
    other::UpdateContext,
    render::FullscreenPass,
    samples::{Sample, SampleKind, aspect},
    shader_program,
};

const WORK_GROUP: u32 = 256;
const MARGIN: f32 = 0.05;
/// CPU iterations per walker before its first plotted point.
const WARM_UP_STEPS: usize = 48;

/// One chaos-game walker as laid out in the `Walkers` buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Walker {
    pub position: [f32; 2],
    /// PCG state.
    pub state: u32,
    pub _pad: u32,
}

fn seed_walkers<R: Rng>(rng: &mut R, ifs: &Ifs, count: usize) -> Vec<Walker> {
    (0..count)
        .map(|_| {
            let mut point = Vec2::new(rng.random(), rng.random());
            for _ in 0..WARM_UP_STEPS {
                point = ifs.step(point, rng.random());
            }
            Walker {
                position: point.to_array(),
                state: rng.random(),
                _pad: 0,
            }
        })
        .collect()
}

/// Whether plotting `added` more points could push a cell past `u32::MAX`. No cell holds more
/// than the total number of points plotted.
fn histogram_would_overflow(total_points: u64, added: u64) -> bool {
    total_points.saturating_add(added) > u64::from(u32::MAX)
}

/// Grows `bounds` around its centre so it has the given aspect ratio, plus a margin.
pub fn fit_bounds((min, max): (Vec2, Vec2), aspect: f32, margin: f32) -> (Vec2, Vec2) {
    let center = (min + max) * 0.5;
    let mut half = (max - min) * 0.5 * (1.0 + margin);
    if half.x / half.y < aspect {
        half.x = half.y * aspect;
    } else {
        half.y = half.x / aspect;
    }
    (center - half, center + half)
}

pub struct BarnsleyFern {
    gl: Arc<glow::Context>,
    compute: ShaderProgram,
    density: ShaderProgram,
    fullscreen: FullscreenPass,
    ifs: Ifs,
    maps: ShaderStorageBuffer<GpuAffineMap>,
    walkers: ShaderStorageBuffer<Walker>,
    histogram: Option<ShaderStorageBuffer<u32>>,
    grid: UVec2,
    bounds: (Vec2, Vec2),
    steps: u32,
    total_points: u64,
}

impl BarnsleyFern {
    pub fn new(gl: &Arc<glow::Context>, settings: &SampleSettings) -> Result<Self, String> {
        let ifs = Ifs::barnsley_fern();
        let walkers = seed_walkers(
            &mut rand::rng(),
            &ifs,
            settings.fern_walkers.max(1) as usize,
        );

        Ok(Self {
            gl: Arc::clone(gl),
            compute: compute_program!(fern, gl)?,
            density: shader_program!(fern_density, gl)?,
            fullscreen: FullscreenPass::new(gl)?,
            maps: ShaderStorageBuffer::new(gl, &ifs.to_gpu())?,
            walkers: ShaderStorageBuffer::new(gl, &walkers)?,
            ifs,
            histogram: None,
            grid: UVec2::ZERO,
            bounds: FERN_BOUNDS,
            steps: settings.fern_steps.max(1),
            total_points: 0,
        })
    }

    fn clear_plot(&mut self) {
        if let Some(histogram) = &mut self.histogram {
            let hits: u64 = histogram.read().iter().map(|&n| n as u64).sum();
            log::debug!("Clearing {hits} plotted points");
            histogram.clear();
        }
        self.total_points = 0;
    }

    fn reset(&mut self) {
        self.clear_plot();
        let walkers = seed_walkers(&mut rand::rng(), &self.ifs, self.walkers.len());
        if let Err(e) = self.walkers.update_range(0, &walkers) {
            log::warn!("Could not reseed walkers: {e}");
        }
    }

    fn ensure_grid(&mut self, size: UVec2) -> Result<(), String> {
        if self.histogram.is_some() && self.grid == size {
            return Ok(());
        }
        self.histogram = None;
        self.histogram = Some(ShaderStorageBuffer::with_len(
            &self.gl,
            (size.x * size.y) as usize,
        )?);
        self.grid = size;
        self.bounds = fit_bounds(FERN_BOUNDS, aspect(size), MARGIN);
        self.total_points = 0;
        log::debug!("Fern histogram resized to {}x{}", size.x, size.y);
        Ok(())
    }
}

impl Sample for BarnsleyFern {
    fn kind(&self) -> SampleKind {
        SampleKind::BarnsleyFern
    }

    fn update(&mut self, ctx: &UpdateContext) {
        if ctx.keyboard.is_pressed(Keycode::R) {
            self.reset();
        }
    }

    fn render(&mut self, gl: &Arc<glow::Context>, size: UVec2) {
        let size = size.max(UVec2::ONE);
        if let Err(e) = self.ensure_grid(size) {
            log::error!("Fern histogram: {e}");
            return;
        }
        let added = self.walkers.len() as u64 * self.steps as u64;
        if histogram_would_overflow(self.total_points, added) {
            log::info!("Fern plot is saturated, starting over");
            self.clear_plot();
        }
        let Some(histogram) = &self.histogram else {
            return;
        };

        self.maps.bind_base(0);
        self.walkers.bind_base(1);
        histogram.bind_base(2);

        self.compute.use_program();
        self.compute.set_uniform("u_steps", self.steps);
        self.compute.set_uniform("u_bounds_min", self.bounds.0);
        self.compute.set_uniform("u_bounds_max", self.bounds.1);
        self.compute.set_uniform("u_grid", self.grid);
        self.compute.dispatch(
            ((self.walkers.len() as u32).div_ceil(WORK_GROUP), 1, 1),
            glow::SHADER_STORAGE_BARRIER_BIT,
        );
        self.total_points += added;

        // The attractor covers only a small part of the plot, so even cells reach full
        // brightness well above the mean count.
        let mean = self.total_points as f32 / (self.grid.x * self.grid.y) as f32;

        unsafe {
            gl.clear_color(0.02, 0.03, 0.02, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        self.density.use_program();
        self.density.set_uniform("u_grid", self.grid);
        self.density.set_uniform("u_scale", mean * 40.0);
        self.density
            .set_uniform("u_color", Vec3::new(0.45, 0.95, 0.4));
        self.density
            .set_uniform("u_background", Vec3::new(0.02, 0.03, 0.02));
        self.fullscreen.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn fitted_bounds_match_aspect_and_contain_the_fern() {
        for aspect in [0.3, 1.0, 16.0 / 9.0] {
            let (min, max) = fit_bounds(FERN_BOUNDS, aspect, MARGIN);
            let size = max - min;
            assert!((size.x / size.y - aspect).abs() < 1e-4);
            assert!(min.cmple(FERN_BOUNDS.0).all());
            assert!(max.cmpge(FERN_BOUNDS.1).all());
        }
    }

    #[test]
    fn walker_layout_is_std430_sized() {
        assert_eq!(std::mem::size_of::<Walker>(), 16);
    }

    #[test]
    fn seeds_differ() {
        let walkers = seed_walkers(&mut StdRng::seed_from_u64(7), &Ifs::barnsley_fern(), 64);
        assert_eq!(walkers.len(), 64);
        let first = walkers[0].state;
        assert!(walkers.iter().any(|w| w.state != first));
    }

    #[test]
    fn seeded_walkers_start_on_the_attractor() {
        let (min, max) = FERN_BOUNDS;
        let slack = Vec2::splat(0.01);
        let walkers = seed_walkers(&mut StdRng::seed_from_u64(3), &Ifs::barnsley_fern(), 500);
        for walker in walkers {
            let p = Vec2::from(walker.position);
            assert!(p.cmpge(min - slack).all() && p.cmple(max + slack).all(), "{p}");
        }
    }

    #[test]
    fn plot_clears_before_counts_can_overflow() {
        let frame = 4096 * 64;
        assert!(!histogram_would_overflow(0, frame));
        assert!(!histogram_would_overflow(u64::from(u32::MAX) - frame, frame));
        assert!(histogram_would_overflow(u64::from(u32::MAX) - frame + 1, frame));
        assert!(histogram_would_overflow(u64::MAX, 1));
    }
}
