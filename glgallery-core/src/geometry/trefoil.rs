//! Trefoil knot tube mesh.
//!
//! The surface is sampled over a `(s, t)` grid in `[0, 1]²`: `s` runs along the knot, `t`
//! around the tube. Normals come from a fixed forward finite difference of the surface.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use super::{AttributeKind, MeshData, VertexFormat, VertexWriter};

const NORMAL_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrefoilParams {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    /// Tube radius.
    pub d: f32,
    pub slices: u32,
    pub stacks: u32,
}

impl Default for TrefoilParams {
    fn default() -> Self {
        Self {
            a: 0.5,
            b: 0.3,
            c: 0.5,
            d: 0.1,
            slices: 128,
            stacks: 32,
        }
    }
}

impl TrefoilParams {
    /// Point on the knot's centre curve for `s`.
    pub fn center(&self, s: f32) -> Vec3 {
        let u = (1.0 - s) * 2.0 * TAU;
        let r = self.a + self.b * (1.5 * u).cos();
        Vec3::new(r * u.cos(), r * u.sin(), self.c * (1.5 * u).sin())
    }

    /// Point on the tube surface.
    pub fn evaluate(&self, s: f32, t: f32) -> Vec3 {
        let u = (1.0 - s) * 2.0 * TAU;
        let v = t * TAU;
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);

        let r = a + b * (1.5 * u).cos();
        let center = Vec3::new(r * u.cos(), r * u.sin(), c * (1.5 * u).sin());

        let dv = Vec3::new(
            -1.5 * b * (1.5 * u).sin() * u.cos() - r * u.sin(),
            -1.5 * b * (1.5 * u).sin() * u.sin() + r * u.cos(),
            1.5 * c * (1.5 * u).cos(),
        );
        let q = dv.normalize();
        let qvec = Vec3::new(q.y, -q.x, 0.0).normalize();
        let ww = q.cross(qvec);

        center + d * (qvec * v.cos() + ww * v.sin())
    }

    /// Finite-difference surface normal, pointing out of the tube.
    pub fn normal(&self, s: f32, t: f32) -> Vec3 {
        let p = self.evaluate(s, t);
        let du = self.evaluate(s + NORMAL_EPSILON, t) - p;
        let dv = self.evaluate(s, t + NORMAL_EPSILON) - p;
        du.cross(dv).normalize()
    }
}

pub fn trefoil_format() -> VertexFormat {
    VertexFormat::new(&[
        AttributeKind::Position,
        AttributeKind::Normal,
        AttributeKind::Uv,
    ])
}

pub fn trefoil_knot(params: &TrefoilParams) -> MeshData {
    let slices = params.slices.max(3);
    let stacks = params.stacks.max(3);
    let mut mesh = MeshData::new(trefoil_format());
    mesh.vertices
        .reserve(((slices + 1) * (stacks + 1)) as usize * mesh.format.stride_floats());

    for i in 0..=slices {
        let s = i as f32 / slices as f32;
        for j in 0..=stacks {
            let t = j as f32 / stacks as f32;
            let vertex = VertexWriter::default()
                .vec3(params.evaluate(s, t))
                .vec3(params.normal(s, t))
                .vec2(Vec2::new(s, t))
                .finish();
            mesh.vertices.extend_from_slice(&vertex);
        }
    }

    let row = stacks + 1;
    for i in 0..slices {
        for j in 0..stacks {
            let v0 = i * row + j;
            let v1 = (i + 1) * row + j;
            let v2 = (i + 1) * row + j + 1;
            let v3 = i * row + j + 1;
            mesh.push_triangle(v0, v1, v3);
            mesh.push_triangle(v1, v2, v3);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TrefoilParams {
        TrefoilParams {
            slices: 24,
            stacks: 8,
            ..TrefoilParams::default()
        }
    }

    #[test]
    fn grid_counts() {
        let params = small();
        let mesh = trefoil_knot(&params);
        assert_eq!(mesh.vertex_count(), 25 * 9);
        assert_eq!(mesh.triangle_count(), 2 * 24 * 8);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn degenerate_resolution_is_clamped() {
        let mesh = trefoil_knot(&TrefoilParams {
            slices: 0,
            stacks: 1,
            ..TrefoilParams::default()
        });
        assert_eq!(mesh.vertex_count(), 16);
    }

    #[test]
    fn knot_closes_on_itself() {
        let params = small();
        for t in [0.0, 0.25, 0.6] {
            assert!(
                params
                    .evaluate(0.0, t)
                    .abs_diff_eq(params.evaluate(1.0, t), 1e-4)
            );
        }
        assert!(
            params
                .evaluate(0.3, 0.0)
                .abs_diff_eq(params.evaluate(0.3, 1.0), 1e-5)
        );
    }

    #[test]
    fn surface_sits_on_the_tube() {
        let params = small();
        for k in 0..10 {
            let s = k as f32 / 10.0;
            let dist = (params.evaluate(s, 0.37) - params.center(s)).length();
            assert!((dist - params.d).abs() < 1e-4);
        }
    }

    #[test]
    fn normals_are_unit_and_outward() {
        let params = small();
        let mesh = trefoil_knot(&params);
        for i in 0..mesh.vertex_count() {
            let n = mesh.normal(i).unwrap();
            assert!((n.length() - 1.0).abs() < 1e-3);

            let uv = Vec2::from_slice(mesh.attribute(i, AttributeKind::Uv).unwrap());
            let p = mesh.position(i).unwrap();
            assert!((p - params.center(uv.x)).dot(n) > 0.0);
        }
    }

    #[test]
    fn triangles_agree_with_normals() {
        let mesh = trefoil_knot(&TrefoilParams {
            slices: 96,
            stacks: 12,
            ..TrefoilParams::default()
        });
        for tri in mesh.indices.chunks(3).step_by(7) {
            let a = mesh.position(tri[0] as usize).unwrap();
            let b = mesh.position(tri[1] as usize).unwrap();
            let c = mesh.position(tri[2] as usize).unwrap();
            let face = (b - a).cross(c - a);
            assert!(face.dot(mesh.normal(tri[0] as usize).unwrap()) > 0.0);
        }
    }
}
