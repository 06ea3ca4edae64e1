//! Axis-aligned cube with one flat-shaded quad per face.

use glam::{Vec2, Vec3};

use super::{AttributeKind, MeshData, VertexFormat, VertexWriter};

/// Face order used by [`cube`] for normals and `face_colors`: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACE_NORMALS: [Vec3; 6] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

pub fn cube_format() -> VertexFormat {
    VertexFormat::new(&[
        AttributeKind::Position,
        AttributeKind::Normal,
        AttributeKind::Uv,
        AttributeKind::Color,
    ])
}

/// Builds a cube of edge length `size` centred at the origin.
///
/// 24 vertices, 36 indices, counter-clockwise when seen from outside.
pub fn cube(size: f32, face_colors: [Vec3; 6]) -> MeshData {
    let mut mesh = MeshData::new(cube_format());
    let half = size * 0.5;

    for (normal, color) in CUBE_FACE_NORMALS.into_iter().zip(face_colors) {
        // Build a right-handed basis on the face so that u × v = normal.
        let up = if normal.y.abs() > 0.5 { Vec3::Z } else { Vec3::Y };
        let u = up.cross(normal);
        let v = normal.cross(u);

        let corners = [
            (-1.0, -1.0, Vec2::new(0.0, 0.0)),
            (1.0, -1.0, Vec2::new(1.0, 0.0)),
            (1.0, 1.0, Vec2::new(1.0, 1.0)),
            (-1.0, 1.0, Vec2::new(0.0, 1.0)),
        ];

        let base = mesh.vertex_count() as u32;
        for (su, sv, uv) in corners {
            let position = (normal + u * su + v * sv) * half;
            let vertex = VertexWriter::default()
                .vec3(position)
                .vec3(normal)
                .vec2(uv)
                .vec3(color)
                .finish();
            mesh.vertices.extend_from_slice(&vertex);
        }
        mesh.push_triangle(base, base + 1, base + 2);
        mesh.push_triangle(base, base + 2, base + 3);
    }

    mesh
}
