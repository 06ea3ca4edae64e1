//! Small 4x4 matrix helpers shared by the samples.
//!
//! Everything here is a thin layer over [`glam`], using the right-handed, OpenGL clip-space
//! conventions (`*_rh_gl`) throughout.

use glam::{Mat3, Mat4, Vec3};

/// Perspective projection with the vertical field of view given in degrees.
pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y_degrees.to_radians(), aspect.max(f32::EPSILON), near, far)
}

/// View matrix looking from `eye` towards `target`.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

/// Orthographic projection mapping pixel coordinates to clip space, with the origin in the
/// top-left corner.
pub fn pixel_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, width, height, 0.0, -1.0, 1.0)
}

/// The matrix used to transform normals: inverse transpose of the upper 3x3.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    let m = Mat3::from_mat4(model);
    if m.determinant().abs() <= f32::EPSILON {
        return Mat3::IDENTITY;
    }
    m.inverse().transpose()
}

/// Rotation of `angle` radians about `axis`, pivoting around `pivot` instead of the origin.
pub fn rotation_about(axis: Vec3, angle: f32, pivot: Vec3) -> Mat4 {
    Mat4::from_translation(pivot)
        * Mat4::from_axis_angle(axis.normalize_or(Vec3::Y), angle)
        * Mat4::from_translation(-pivot)
}

pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    m.transform_point3(p)
}

pub fn transform_direction(m: Mat4, d: Vec3) -> Vec3 {
    m.transform_vector3(d)
}

/// Distance at which a sphere of `radius` fills the vertical field of view.
pub fn fit_distance(radius: f32, fov_y_degrees: f32) -> f32 {
    let half = (fov_y_degrees.to_radians() * 0.5).max(1e-3);
    radius / half.sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(model) * Vec3::new(1.0, 1.0, 0.0);
        assert!(n.abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn singular_model_gives_identity_normal_matrix() {
        let model = Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(normal_matrix(model), Mat3::IDENTITY);
    }

    #[test]
    fn rotation_keeps_pivot_fixed() {
        let pivot = Vec3::new(1.0, 2.0, 3.0);
        let m = rotation_about(Vec3::Z, 1.3, pivot);
        assert!(transform_point(m, pivot).abs_diff_eq(pivot, 1e-5));

        let p = transform_point(m, pivot + Vec3::X);
        assert!(((p - pivot).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pixel_projection_maps_corners() {
        let m = pixel_projection(800.0, 600.0);
        assert!(transform_point(m, Vec3::ZERO).abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-6));
        assert!(
            transform_point(m, Vec3::new(800.0, 600.0, 0.0))
                .abs_diff_eq(Vec3::new(1.0, -1.0, 0.0), 1e-6)
        );
    }

    #[test]
    fn fit_distance_frames_sphere() {
        let d = fit_distance(1.0, 90.0);
        assert!((d - std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn directions_ignore_translation() {
        let m = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(transform_direction(m, Vec3::Y), Vec3::Y);
    }
}
