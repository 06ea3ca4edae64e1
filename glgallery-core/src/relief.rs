//! Height maps for the parallax sample, and their cone maps.
//!
//! Heights are in `[0, 1]`, 1 being the top surface. A texel's cone ratio is the widest
//! `horizontal / vertical` slope of an upward cone that contains no higher texel; the cone
//! step shader uses it as a safe marching distance.

use glam::{Vec2, Vec3};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl HeightMap {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err("Height map must not be empty".to_string());
        }
        if data.len() != width * height {
            return Err(format!(
                "Height map of {width}x{height} needs {} samples, got {}",
                width * height,
                data.len()
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn flat(width: usize, height: usize, value: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            data: vec![value.clamp(0.0, 1.0); width.max(1) * height.max(1)],
        }
    }

    /// Raised square tiles with bevelled edges and sunken grout. `bevel` is the bevel width as
    /// a fraction of a tile.
    pub fn tiles(size: usize, count: usize, bevel: f32) -> Self {
        let size = size.max(1);
        let count = count.max(1) as f32;
        let grout = 0.06;
        let bevel = bevel.clamp(1e-3, 0.5);
        let data = (0..size * size)
            .map(|i| {
                let uv = Vec2::new((i % size) as f32 + 0.5, (i / size) as f32 + 0.5) / size as f32;
                let cell = (uv * count).fract();
                // Distance to the nearest tile edge, in tile units.
                let edge = cell.min(Vec2::ONE - cell).min_element();
                if edge < grout {
                    0.1
                } else {
                    0.1 + 0.9 * ((edge - grout) / bevel).min(1.0)
                }
            })
            .collect();
        Self {
            width: size,
            height: size,
            data,
        }
    }

    /// Height at integer texel coordinates, wrapping around the edges.
    pub fn sample(&self, x: isize, y: isize) -> f32 {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.data[y * self.width + x]
    }

    /// Tangent-space normal from central differences.
    pub fn normal_at(&self, x: usize, y: usize, strength: f32) -> Vec3 {
        let (x, y) = (x as isize, y as isize);
        let dx = self.sample(x + 1, y) - self.sample(x - 1, y);
        let dy = self.sample(x, y + 1) - self.sample(x, y - 1);
        Vec3::new(-dx * strength, -dy * strength, 1.0).normalize()
    }

    /// RGBA8 texels: normal in RGB (biased to `[0, 255]`), height in A.
    pub fn normal_height_rgba(&self, strength: f32) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let n = self.normal_at(x, y, strength) * 0.5 + 0.5;
                out.extend_from_slice(&[
                    to_u8(n.x),
                    to_u8(n.y),
                    to_u8(n.z),
                    to_u8(self.data[y * self.width + x]),
                ]);
            }
        }
        out
    }

    /// Cone ratio per texel, in `[0, 1]`.
    ///
    /// Brute force over every other texel, with wrap-around distances so the map tiles.
    pub fn cone_ratios(&self) -> Vec<f32> {
        let (w, h) = (self.width, self.height);
        (0..w * h)
            .into_par_iter()
            .map(|i| {
                let (x, y) = (i % w, i / w);
                let here = self.data[i];
                let mut ratio: f32 = 1.0;
                for oy in 0..h {
                    for ox in 0..w {
                        let dh = self.data[oy * w + ox] - here;
                        if dh <= 0.0 {
                            continue;
                        }
                        let dx = wrap_distance(x, ox, w) / w as f32;
                        let dy = wrap_distance(y, oy, h) / h as f32;
                        let dist = (dx * dx + dy * dy).sqrt();
                        ratio = ratio.min(dist / dh);
                    }
                }
                ratio
            })
            .collect()
    }

    /// RGBA8 texels: height in R, `sqrt(cone ratio)` in G.
    ///
    /// The square root spends more precision on the narrow cones that matter most; the
    /// shader squares it back.
    pub fn cone_rgba(&self) -> Vec<u8> {
        self.data
            .iter()
            .zip(self.cone_ratios())
            .flat_map(|(&height, ratio)| [to_u8(height), to_u8(ratio.sqrt()), 0, 255])
            .collect()
    }
}

fn wrap_distance(a: usize, b: usize, size: usize) -> f32 {
    let d = a.abs_diff(b);
    d.min(size - d) as f32
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_data() {
        assert!(HeightMap::new(4, 4, vec![0.0; 15]).is_err());
        assert!(HeightMap::new(0, 4, vec![]).is_err());
        assert!(HeightMap::new(2, 2, vec![0.0; 4]).is_ok());
    }

    #[test]
    fn flat_map_has_open_cones_and_up_normals() {
        let map = HeightMap::flat(8, 8, 0.5);
        assert!(map.cone_ratios().iter().all(|&r| r == 1.0));
        assert_eq!(map.normal_at(3, 3, 4.0), Vec3::Z);
    }

    #[test]
    fn tiles_stay_in_range() {
        let map = HeightMap::tiles(32, 2, 0.2);
        assert_eq!(map.data.len(), 32 * 32);
        assert!(map.data.iter().all(|&h| (0.0..=1.0).contains(&h)));
        // Tile centres are at full height, corners in the grout.
        assert_eq!(map.sample(8, 8), 1.0);
        assert_eq!(map.sample(0, 0), 0.1);
    }

    #[test]
    fn cone_ratios_are_bounded_and_narrow_next_to_walls() {
        let map = HeightMap::tiles(16, 1, 0.2);
        let ratios = map.cone_ratios();
        assert!(ratios.iter().all(|&r| (0.0..=1.0).contains(&r)));
        // The highest texels see nothing above them.
        let top = map.data.iter().position(|&h| h == 1.0).unwrap();
        assert_eq!(ratios[top], 1.0);
        // Grout right beside a raised tile gets a narrow cone.
        assert!(ratios[0] < 0.5);
    }

    #[test]
    fn sample_wraps() {
        let map = HeightMap::new(2, 2, vec![0.0, 0.25, 0.5, 0.75]).unwrap();
        assert_eq!(map.sample(-1, 0), 0.25);
        assert_eq!(map.sample(2, 3), 0.5);
    }

    #[test]
    fn rgba_packing_sizes() {
        let map = HeightMap::tiles(8, 1, 0.25);
        assert_eq!(map.normal_height_rgba(2.0).len(), 8 * 8 * 4);
        let cone = map.cone_rgba();
        assert_eq!(cone.len(), 8 * 8 * 4);
        assert!(cone.chunks(4).all(|t| t[3] == 255));
    }
}
