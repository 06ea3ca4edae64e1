//! Camera and object controls.
//!
//! Controls turn one frame of host-agnostic [`ControlInput`] plus the elapsed time into a
//! transform. Apart from their accumulated angles and time they are stateless.

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::{aabb::Aabb, math};

const MAX_PITCH: f32 = 89.0;

/// Input gathered by the host for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    /// Rotation request, in pixels of pointer travel.
    pub rotate: Vec2,
    /// Zoom steps; positive zooms in.
    pub zoom: f32,
    /// Movement request in camera space: x = right, y = up, z = forward.
    pub movement: Vec3,
}

pub trait Control {
    fn update(&mut self, dt: f32, input: &ControlInput);

    fn view(&self) -> Mat4;
}

/// Rotates an object about an axis at a constant angular speed.
pub struct SpinControl {
    pub axis: Vec3,
    /// Radians per second.
    pub speed: f32,
    pub base_view: Mat4,
    time: f32,
}

impl SpinControl {
    pub fn new(axis: Vec3, speed: f32, base_view: Mat4) -> Self {
        Self {
            axis: axis.normalize_or(Vec3::Y),
            speed,
            base_view,
            time: 0.0,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn angle(&self) -> f32 {
        self.speed * self.time
    }

    /// The spinning object's model matrix.
    pub fn model(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_axis_angle(self.axis, self.angle()))
    }
}

impl Control for SpinControl {
    fn update(&mut self, dt: f32, input: &ControlInput) {
        // Horizontal drags nudge the spin forward or back.
        self.time += dt + input.rotate.x * 0.005;
    }

    fn view(&self) -> Mat4 {
        self.base_view
    }
}

/// Orbits a camera around a target point.
pub struct OrbitControl {
    pub target: Vec3,
    pub distance: f32,
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Degrees per pixel of pointer travel.
    pub sensitivity: f32,
    /// Degrees per second added to the yaw when idle.
    pub auto_rotate: f32,
}

impl Default for OrbitControl {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 3.0,
            yaw: 30.0,
            pitch: 20.0,
            min_distance: 0.1,
            max_distance: 100.0,
            sensitivity: 0.4,
            auto_rotate: 0.0,
        }
    }
}

impl OrbitControl {
    pub fn new(target: Vec3, distance: f32) -> Self {
        let mut control = Self {
            target,
            ..Self::default()
        };
        control.set_distance(distance);
        control
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    pub fn eye(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        let offset = Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos(),
        );
        self.target + offset * self.distance
    }

    /// Re-targets on `bounds` at a distance that fits it in view.
    pub fn frame(&mut self, bounds: &Aabb, fov_y_degrees: f32) {
        if !bounds.valid {
            return;
        }
        self.target = bounds.center();
        let radius = bounds.radius().max(1e-3);
        self.min_distance = self.min_distance.min(radius);
        self.max_distance = self.max_distance.max(radius * 20.0);
        self.set_distance(math::fit_distance(radius, fov_y_degrees) * 1.1);
    }
}

impl Control for OrbitControl {
    fn update(&mut self, dt: f32, input: &ControlInput) {
        if input.rotate == Vec2::ZERO {
            self.yaw += self.auto_rotate * dt;
        }
        self.yaw = (self.yaw - input.rotate.x * self.sensitivity) % 360.0;
        self.pitch = (self.pitch + input.rotate.y * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        if input.zoom != 0.0 {
            self.set_distance(self.distance * 0.9f32.powf(input.zoom));
        }
    }

    fn view(&self) -> Mat4 {
        math::look_at(self.eye(), self.target, Vec3::Y)
    }
}

/// A free-flying first-person camera.
pub struct FirstPersonControl {
    pub position: Vec3,
    /// Degrees; 0 looks down -Z.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    /// Units per second.
    pub speed: f32,
    pub sensitivity: f32,
}

impl FirstPersonControl {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            speed: 2.0,
            sensitivity: 0.2,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            -yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        )
    }

    fn horizontal_frame(&self) -> (Vec3, Vec3) {
        let yaw = self.yaw.to_radians();
        let forward = Vec3::new(-yaw.sin(), 0.0, -yaw.cos());
        let right = forward.cross(Vec3::Y);
        (forward, right)
    }
}

impl Control for FirstPersonControl {
    fn update(&mut self, dt: f32, input: &ControlInput) {
        self.yaw -= input.rotate.x * self.sensitivity;
        self.pitch = (self.pitch - input.rotate.y * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);

        let (forward, right) = self.horizontal_frame();
        let m = input.movement;
        let direction = forward * m.z + right * m.x + Vec3::Y * m.y;
        self.position += direction.normalize_or_zero() * self.speed * dt;
    }

    fn view(&self) -> Mat4 {
        math::look_at(self.position, self.position + self.forward(), Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_angle_follows_time() {
        let mut spin = SpinControl::new(Vec3::Y, 2.0, Mat4::IDENTITY);
        for _ in 0..10 {
            spin.update(0.1, &ControlInput::default());
        }
        assert!((spin.angle() - 2.0).abs() < 1e-5);
        let p = spin.model().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(2.0f32.cos(), 0.0, -2.0f32.sin()), 1e-5));
        assert_eq!(spin.view(), Mat4::IDENTITY);
    }

    #[test]
    fn orbit_pitch_is_clamped() {
        let mut orbit = OrbitControl::default();
        orbit.update(
            0.016,
            &ControlInput {
                rotate: Vec2::new(0.0, 10_000.0),
                ..Default::default()
            },
        );
        assert_eq!(orbit.pitch, MAX_PITCH);
    }

    #[test]
    fn orbit_zoom_moves_closer_and_clamps() {
        let mut orbit = OrbitControl::new(Vec3::ZERO, 5.0);
        let zoom_in = ControlInput {
            zoom: 1.0,
            ..Default::default()
        };
        orbit.update(0.0, &zoom_in);
        assert!((orbit.distance - 4.5).abs() < 1e-5);

        for _ in 0..1000 {
            orbit.update(0.0, &zoom_in);
        }
        assert_eq!(orbit.distance, orbit.min_distance);
    }

    #[test]
    fn orbit_eye_keeps_distance() {
        let orbit = OrbitControl {
            yaw: 123.0,
            pitch: -40.0,
            ..OrbitControl::new(Vec3::new(1.0, 2.0, 3.0), 7.0)
        };
        assert!(((orbit.eye() - orbit.target).length() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn orbit_frames_bounds() {
        let mut orbit = OrbitControl::default();
        let bounds = Aabb::new(Vec3::new(9.0, -1.0, -1.0), Vec3::new(11.0, 1.0, 1.0));
        orbit.frame(&bounds, 60.0);
        assert_eq!(orbit.target, Vec3::new(10.0, 0.0, 0.0));
        assert!(orbit.distance > bounds.radius());
    }

    #[test]
    fn auto_rotate_only_when_idle() {
        let mut orbit = OrbitControl {
            auto_rotate: 10.0,
            yaw: 0.0,
            ..OrbitControl::default()
        };
        orbit.update(1.0, &ControlInput::default());
        assert!((orbit.yaw - 10.0).abs() < 1e-5);
    }

    #[test]
    fn first_person_moves_forward_horizontally() {
        let mut fp = FirstPersonControl::new(Vec3::ZERO, 0.0, 45.0);
        fp.update(
            1.0,
            &ControlInput {
                movement: Vec3::new(0.0, 0.0, 1.0),
                ..Default::default()
            },
        );
        assert!(fp.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn first_person_strafes_right() {
        let mut fp = FirstPersonControl::new(Vec3::ZERO, 90.0, 0.0);
        fp.update(
            0.5,
            &ControlInput {
                movement: Vec3::X,
                ..Default::default()
            },
        );
        // Looking down -X, right is -Z.
        assert!(fp.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }
}
