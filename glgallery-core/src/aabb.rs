//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// An axis-aligned bounding box.
///
/// A default box is *invalid*: it contains nothing and acts as the identity for
/// [`Aabb::union_box`]. The first point or valid box merged into it makes it valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
    pub valid: bool,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
            valid: false,
        }
    }
}

impl Aabb {
    /// Creates a valid box from two corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            valid: true,
        }
    }

    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::default();
        for p in points {
            aabb.union_point(p);
        }
        aabb
    }

    /// Grows the box to include `p`.
    pub fn union_point(&mut self, p: Vec3) {
        if self.valid {
            self.min = self.min.min(p);
            self.max = self.max.max(p);
        } else {
            self.min = p;
            self.max = p;
            self.valid = true;
        }
    }

    /// Grows the box to include `other`. Invalid boxes are ignored.
    pub fn union_box(&mut self, other: &Aabb) {
        if !other.valid {
            return;
        }
        if self.valid {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        } else {
            *self = *other;
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.valid {
            (self.min + self.max) * 0.5
        } else {
            Vec3::ZERO
        }
    }

    pub fn size(&self) -> Vec3 {
        if self.valid {
            self.max - self.min
        } else {
            Vec3::ZERO
        }
    }

    /// Half of [`Aabb::size`].
    pub fn extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Radius of the sphere around the box's center that encloses the box.
    pub fn radius(&self) -> f32 {
        self.extent().length()
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.valid && p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// The box enclosing this box after transforming its eight corners by `m`.
    pub fn transformed(&self, m: Mat4) -> Aabb {
        if !self.valid {
            return *self;
        }
        Aabb::from_points((0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            m.transform_point3(corner)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_invalid_and_empty() {
        let aabb = Aabb::default();
        assert!(!aabb.valid);
        assert!(!aabb.contains(Vec3::ZERO));
        assert_eq!(aabb.size(), Vec3::ZERO);
    }

    #[test]
    fn first_point_makes_box_valid() {
        let mut aabb = Aabb::default();
        aabb.union_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(aabb.valid);
        assert_eq!(aabb.min, aabb.max);

        aabb.union_point(Vec3::new(-1.0, 5.0, 0.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn invalid_box_is_union_identity() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);

        let mut b = a;
        b.union_box(&Aabb::default());
        assert_eq!(a, b);

        let mut c = Aabb::default();
        c.union_box(&a);
        assert_eq!(a, c);
    }

    #[test]
    fn union_of_disjoint_boxes() {
        let mut a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        a.union_box(&Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0)));
        assert_eq!(a.min, Vec3::ZERO);
        assert_eq!(a.max, Vec3::splat(3.0));
        assert_eq!(a.center(), Vec3::splat(1.5));
    }

    #[test]
    fn rotated_box_grows() {
        let a = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let r = a.transformed(Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let s = std::f32::consts::SQRT_2;
        assert!(r.max.abs_diff_eq(Vec3::new(s, 1.0, s), 1e-5));
        assert!(r.min.abs_diff_eq(Vec3::new(-s, -1.0, -s), 1e-5));
    }

    #[test]
    fn translated_box_moves() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let t = a.transformed(Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)));
        assert_eq!(t.min, Vec3::new(0.0, 10.0, 0.0));
        assert!(t.contains(Vec3::new(0.5, 10.5, 0.5)));
    }
}
