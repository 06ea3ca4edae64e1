//! Iterated function systems, and the Barnsley fern in particular.
//!
//! The compute sample runs the chaos game on the GPU; this module holds the map table it
//! uploads and a CPU reference used for bounds and tests.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::Rng;

/// `p' = [a b; c d] p + [e f]`, chosen with probability `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
    pub p: f32,
}

impl AffineMap {
    pub fn apply(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.a * v.x + self.b * v.y + self.e,
            self.c * v.x + self.d * v.y + self.f,
        )
    }
}

/// The classic Barnsley fern: stem, successively smaller leaflets, left and right leaflets.
pub const BARNSLEY_FERN: [AffineMap; 4] = [
    AffineMap { a: 0.0, b: 0.0, c: 0.0, d: 0.16, e: 0.0, f: 0.0, p: 0.01 },
    AffineMap { a: 0.85, b: 0.04, c: -0.04, d: 0.85, e: 0.0, f: 1.6, p: 0.85 },
    AffineMap { a: 0.2, b: -0.26, c: 0.23, d: 0.22, e: 0.0, f: 1.6, p: 0.07 },
    AffineMap { a: -0.15, b: 0.28, c: 0.26, d: 0.24, e: 0.0, f: 0.44, p: 0.07 },
];

/// Bounds of the Barnsley fern attractor: `(min, max)`.
pub const FERN_BOUNDS: (Vec2, Vec2) = (Vec2::new(-2.1820, 0.0), Vec2::new(2.6558, 9.9983));

/// GPU layout of one map: `vec4(a, b, c, d)`, `vec4(e, f, cumulative p, 0)` under std430.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuAffineMap {
    pub matrix: [f32; 4],
    pub offset_cdf: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ifs {
    maps: Vec<AffineMap>,
    cumulative: Vec<f32>,
}

impl Ifs {
    /// Validates the probabilities: each positive, summing to one.
    pub fn new(maps: &[AffineMap]) -> Result<Self, String> {
        if maps.is_empty() {
            return Err("An IFS needs at least one map".to_string());
        }
        if let Some(bad) = maps.iter().position(|m| m.p <= 0.0) {
            return Err(format!("Map {bad} has a non-positive probability"));
        }
        let total: f32 = maps.iter().map(|m| m.p).sum();
        if (total - 1.0).abs() > 1e-4 {
            return Err(format!("Probabilities sum to {total}, expected 1"));
        }
        Ok(Self::from_valid(maps))
    }

    fn from_valid(maps: &[AffineMap]) -> Self {
        let cumulative = maps
            .iter()
            .scan(0.0, |acc, m| {
                *acc += m.p;
                Some(*acc)
            })
            .collect();
        Self {
            maps: maps.to_vec(),
            cumulative,
        }
    }

    pub fn barnsley_fern() -> Self {
        Self::from_valid(&BARNSLEY_FERN)
    }

    pub fn maps(&self) -> &[AffineMap] {
        &self.maps
    }

    /// Index of the map selected by a uniform sample `r` in `[0, 1)`.
    pub fn pick(&self, r: f32) -> usize {
        self.cumulative
            .iter()
            .position(|&c| r < c)
            .unwrap_or(self.maps.len() - 1)
    }

    pub fn step(&self, point: Vec2, r: f32) -> Vec2 {
        self.maps[self.pick(r)].apply(point)
    }

    /// Runs the chaos game for `n` steps from `start`, returning every visited point.
    pub fn iterate<R: Rng>(&self, start: Vec2, n: usize, rng: &mut R) -> Vec<Vec2> {
        let mut point = start;
        (0..n)
            .map(|_| {
                point = self.step(point, rng.random::<f32>());
                point
            })
            .collect()
    }

    pub fn to_gpu(&self) -> Vec<GpuAffineMap> {
        self.maps
            .iter()
            .zip(&self.cumulative)
            .map(|(m, &cdf)| GpuAffineMap {
                matrix: [m.a, m.b, m.c, m.d],
                offset_cdf: [m.e, m.f, cdf, 0.0],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn rejects_bad_probabilities() {
        let mut maps = BARNSLEY_FERN;
        maps[0].p = 0.5;
        assert!(Ifs::new(&maps).is_err());

        maps[0].p = 0.0;
        assert!(Ifs::new(&maps).is_err());
        assert!(Ifs::new(&[]).is_err());
    }

    #[test]
    fn pick_follows_cumulative_probabilities() {
        let fern = Ifs::barnsley_fern();
        assert_eq!(fern.pick(0.0), 0);
        assert_eq!(fern.pick(0.005), 0);
        assert_eq!(fern.pick(0.5), 1);
        assert_eq!(fern.pick(0.9), 2);
        assert_eq!(fern.pick(0.95), 3);
        assert_eq!(fern.pick(1.0), 3);
    }

    #[test]
    fn iterates_stay_inside_attractor_bounds() {
        let fern = Ifs::barnsley_fern();
        let mut rng = StdRng::seed_from_u64(42);
        let (min, max) = FERN_BOUNDS;
        for p in fern.iterate(Vec2::ZERO, 20_000, &mut rng) {
            assert!(p.x >= min.x - 1e-3 && p.x <= max.x + 1e-3, "{p}");
            assert!(p.y >= min.y - 1e-3 && p.y <= max.y + 1e-3, "{p}");
        }
    }

    #[test]
    fn gpu_table_is_std430_sized() {
        let gpu = Ifs::barnsley_fern().to_gpu();
        assert_eq!(std::mem::size_of::<GpuAffineMap>(), 32);
        assert_eq!(gpu.len(), 4);
        assert!((gpu[3].offset_cdf[2] - 1.0).abs() < 1e-6);
        assert_eq!(gpu[1].offset_cdf[1], 1.6);
    }
}
