use glam::{Vec2, Vec3, Vec4};

use super::{AttributeKind, MeshData, VertexFormat, VertexWriter};

pub fn plane_format() -> VertexFormat {
    VertexFormat::new(&[
        AttributeKind::Position,
        AttributeKind::Normal,
        AttributeKind::Uv,
        AttributeKind::Tangent,
    ])
}

/// A square in the XZ plane facing +Y, with UVs repeated `tiling` times.
///
/// The tangent points along +U; its `w` is the bitangent sign so that
/// `bitangent = cross(normal, tangent.xyz) * w` points along +V.
pub fn plane(size: f32, tiling: f32) -> MeshData {
    let mut mesh = MeshData::new(plane_format());
    let h = size * 0.5;
    let tangent = Vec4::new(1.0, 0.0, 0.0, 1.0);

    let corners = [
        (Vec3::new(-h, 0.0, h), Vec2::new(0.0, 0.0)),
        (Vec3::new(h, 0.0, h), Vec2::new(tiling, 0.0)),
        (Vec3::new(h, 0.0, -h), Vec2::new(tiling, tiling)),
        (Vec3::new(-h, 0.0, -h), Vec2::new(0.0, tiling)),
    ];
    for (position, uv) in corners {
        let vertex = VertexWriter::default()
            .vec3(position)
            .vec3(Vec3::Y)
            .vec2(uv)
            .vec4(tangent)
            .finish();
        mesh.vertices.extend_from_slice(&vertex);
    }
    mesh.push_triangle(0, 1, 2);
    mesh.push_triangle(0, 2, 3);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_faces_up() {
        let mesh = plane(4.0, 2.0);
        assert!(mesh.validate().is_ok());
        let a = mesh.position(0).unwrap();
        let b = mesh.position(1).unwrap();
        let c = mesh.position(2).unwrap();
        assert!((b - a).cross(c - a).normalize().abs_diff_eq(Vec3::Y, 1e-6));
        assert_eq!(mesh.bounds().size(), Vec3::new(4.0, 0.0, 4.0));
    }

    #[test]
    fn bitangent_follows_v() {
        let mesh = plane(1.0, 1.0);
        let t = Vec4::from_slice(mesh.attribute(0, AttributeKind::Tangent).unwrap());
        let bitangent = Vec3::Y.cross(t.truncate()) * t.w;
        // v grows from the +Z edge to the -Z edge
        assert_eq!(bitangent, Vec3::NEG_Z);
    }
}
