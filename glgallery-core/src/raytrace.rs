//! Scene description for the compute-shader ray tracer.
//!
//! The GPU only ever sees [`GpuSphere`]s. [`RayScene::trace_hit`] mirrors the shader's
//! intersection loop on the CPU so hits can be checked without a GPU.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Diffuse,
    Metal { fuzz: f32 },
    Emissive,
}

impl Material {
    fn gpu_kind(self) -> (f32, f32) {
        match self {
            Material::Diffuse => (0.0, 0.0),
            Material::Metal { fuzz } => (1.0, fuzz.clamp(0.0, 1.0)),
            Material::Emissive => (2.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub albedo: Vec3,
    pub material: Material,
}

/// std430 layout: `vec4(center, radius)`, `vec4(albedo, kind)`, `vec4(fuzz, 0, 0, 0)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuSphere {
    pub center_radius: [f32; 4],
    pub albedo_kind: [f32; 4],
    pub params: [f32; 4],
}

impl From<&Sphere> for GpuSphere {
    fn from(s: &Sphere) -> Self {
        let (kind, fuzz) = s.material.gpu_kind();
        Self {
            center_radius: [s.center.x, s.center.y, s.center.z, s.radius],
            albedo_kind: [s.albedo.x, s.albedo.y, s.albedo.z, kind],
            params: [fuzz, 0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub point: Vec3,
    /// Always faces against the ray.
    pub normal: Vec3,
    pub sphere: usize,
}

impl Sphere {
    /// Nearest intersection distance in `(t_min, t_max)`.
    pub fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<f32> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        [(-half_b - sqrt_d) / a, (-half_b + sqrt_d) / a]
            .into_iter()
            .find(|&t| t > t_min && t < t_max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RayScene {
    pub spheres: Vec<Sphere>,
}

impl RayScene {
    /// Ground, three feature spheres, a small light and a scatter of small spheres.
    pub fn showcase() -> Self {
        let mut spheres = vec![
            Sphere {
                center: Vec3::new(0.0, -1000.0, 0.0),
                radius: 1000.0,
                albedo: Vec3::new(0.5, 0.5, 0.5),
                material: Material::Diffuse,
            },
            Sphere {
                center: Vec3::new(0.0, 1.0, 0.0),
                radius: 1.0,
                albedo: Vec3::new(0.9, 0.9, 0.9),
                material: Material::Metal { fuzz: 0.0 },
            },
            Sphere {
                center: Vec3::new(-2.2, 1.0, 0.0),
                radius: 1.0,
                albedo: Vec3::new(0.4, 0.2, 0.1),
                material: Material::Diffuse,
            },
            Sphere {
                center: Vec3::new(2.2, 1.0, 0.0),
                radius: 1.0,
                albedo: Vec3::new(0.7, 0.6, 0.5),
                material: Material::Metal { fuzz: 0.25 },
            },
            Sphere {
                center: Vec3::new(0.0, 4.0, 2.0),
                radius: 0.6,
                albedo: Vec3::new(6.0, 5.6, 5.0),
                material: Material::Emissive,
            },
        ];

        // Deterministic ring of small spheres so every run renders the same image.
        for i in 0..12 {
            let angle = i as f32 / 12.0 * std::f32::consts::TAU;
            let hue = i as f32 / 12.0;
            spheres.push(Sphere {
                center: Vec3::new(angle.cos() * 4.5, 0.3, angle.sin() * 4.5),
                radius: 0.3,
                albedo: hue_to_rgb(hue),
                material: if i % 3 == 0 {
                    Material::Metal { fuzz: 0.1 }
                } else {
                    Material::Diffuse
                },
            });
        }

        Self { spheres }
    }

    /// Closest hit along `ray`.
    pub fn trace_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<Hit> {
        let mut closest: Option<(f32, usize)> = None;
        for (i, sphere) in self.spheres.iter().enumerate() {
            let limit = closest.map_or(t_max, |(t, _)| t);
            if let Some(t) = sphere.intersect(ray, t_min, limit) {
                closest = Some((t, i));
            }
        }
        closest.map(|(t, i)| {
            let point = ray.at(t);
            let outward = (point - self.spheres[i].center) / self.spheres[i].radius;
            let normal = if outward.dot(ray.direction) < 0.0 {
                outward
            } else {
                -outward
            };
            Hit {
                t,
                point,
                normal,
                sphere: i,
            }
        })
    }

    pub fn to_gpu(&self) -> Vec<GpuSphere> {
        self.spheres.iter().map(GpuSphere::from).collect()
    }
}

fn hue_to_rgb(h: f32) -> Vec3 {
    let r = (h * 6.0 - 3.0).abs() - 1.0;
    let g = 2.0 - (h * 6.0 - 2.0).abs();
    let b = 2.0 - (h * 6.0 - 4.0).abs();
    Vec3::new(r, g, b).clamp(Vec3::ZERO, Vec3::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Sphere {
        Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
            albedo: Vec3::ONE,
            material: Material::Diffuse,
        }
    }

    #[test]
    fn ray_hits_front_of_sphere() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = unit_sphere().intersect(&ray, 1e-3, f32::MAX).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_from_inside_hits_far_side() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = unit_sphere().intersect(&ray, 1e-3, f32::MAX).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(unit_sphere().intersect(&ray, 1e-3, f32::MAX).is_none());
    }

    #[test]
    fn closest_hit_wins_and_normal_faces_ray() {
        let scene = RayScene::showcase();
        let ray = Ray::new(Vec3::new(0.0, 1.0, 10.0), Vec3::NEG_Z);
        let hit = scene.trace_hit(&ray, 1e-3, f32::MAX).unwrap();
        assert_eq!(hit.sphere, 1);
        assert!((hit.t - 9.0).abs() < 1e-4);
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-4));
    }

    #[test]
    fn ground_catches_downward_rays() {
        let scene = RayScene::showcase();
        let ray = Ray::new(Vec3::new(10.0, 5.0, 10.0), Vec3::NEG_Y);
        let hit = scene.trace_hit(&ray, 1e-3, f32::MAX).unwrap();
        assert_eq!(hit.sphere, 0);
    }

    #[test]
    fn gpu_layout() {
        assert_eq!(std::mem::size_of::<GpuSphere>(), 48);
        let scene = RayScene::showcase();
        let gpu = scene.to_gpu();
        assert_eq!(gpu.len(), scene.spheres.len());
        assert_eq!(gpu[3].albedo_kind[3], 1.0);
        assert_eq!(gpu[3].params[0], 0.25);
        assert_eq!(gpu[4].albedo_kind[3], 2.0);
    }
}
