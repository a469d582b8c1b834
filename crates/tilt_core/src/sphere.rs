//! Sphere primitive for ray tracing.

use serde::{Deserialize, Serialize};
use tilt_math::{Interval, Rgb, Vector3};

/// Ray parameters where a line crosses a sphere, in ascending order.
///
/// Holds zero (miss), one (tangent) or two (secant) roots without
/// allocating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roots {
    values: [f64; 2],
    len: usize,
}

impl Roots {
    pub const NONE: Roots = Roots { values: [0.0; 2], len: 0 };

    fn one(t: f64) -> Self {
        Self { values: [t, t], len: 1 }
    }

    fn two(near: f64, far: f64) -> Self {
        Self { values: [near, far], len: 2 }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The smallest root inside `range`, if any.
    pub fn first_in(&self, range: Interval) -> Option<f64> {
        self.as_slice().iter().copied().find(|&t| range.contains(t))
    }
}

/// A sphere primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    center: Vector3,
    radius: f64,
    color: Rgb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vector3, radius: f64, color: Rgb) -> Self {
        debug_assert!(radius > 0.0, "sphere radius must be positive, got {radius}");
        Self { center, radius, color }
    }

    pub fn center(&self) -> Vector3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Intersect the line `origin + t * direction` with this sphere.
    ///
    /// `direction` must be unit length for the roots to be distances.
    /// Roots behind the origin are included; callers filter them.
    pub fn intersect(&self, origin: Vector3, direction: Vector3) -> Roots {
        let oc = origin - self.center;
        let b = direction.dot(oc);
        let discriminant = b * b - (oc.length_squared() - self.radius * self.radius);

        if discriminant < 0.0 {
            Roots::NONE
        } else if discriminant == 0.0 {
            Roots::one(-b)
        } else {
            let sqrtd = discriminant.sqrt();
            Roots::two(-b - sqrtd, -b + sqrtd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere(radius: f64) -> Sphere {
        Sphere::new(Vector3::ZERO, radius, Rgb::RED)
    }

    #[test]
    fn test_sphere_hit_on_axis() {
        let sphere = unit_sphere(2.0);
        let origin = Vector3::new(0.0, 0.0, -10.0);

        let roots = sphere.intersect(origin, Vector3::Z);
        assert_eq!(roots.len(), 2);
        assert!((roots.as_slice()[0] - 8.0).abs() < 1e-9);
        assert!((roots.as_slice()[1] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere(2.0);

        // Ray pointing away from sphere
        let roots = sphere.intersect(Vector3::new(0.0, 0.0, -10.0), Vector3::Y);
        assert!(roots.is_empty());
        assert_eq!(roots.as_slice(), &[] as &[f64]);
    }

    #[test]
    fn test_sphere_tangent() {
        let sphere = unit_sphere(2.0);

        // Grazes the sphere at (0, 2, 0)
        let roots = sphere.intersect(Vector3::new(-5.0, 2.0, 0.0), Vector3::X);
        assert_eq!(roots.as_slice(), &[5.0]);
    }

    #[test]
    fn test_roots_ascending() {
        let sphere = Sphere::new(Vector3::new(1.0, -2.0, 3.0), 1.5, Rgb::GREEN);
        let origins = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, -2.0, 3.0),
            Vector3::new(5.0, 5.0, 5.0),
            Vector3::new(-3.0, -2.5, 2.0),
        ];

        for origin in origins {
            let direction = (sphere.center() - origin + Vector3::new(0.1, 0.2, -0.1)).normalize();
            let roots = sphere.intersect(origin, direction);
            if let [near, far] = roots.as_slice() {
                assert!(near <= far, "roots out of order: {near} > {far}");
            }
        }
    }

    #[test]
    fn test_origin_inside_sphere() {
        let sphere = unit_sphere(1.0);
        let roots = sphere.intersect(Vector3::ZERO, Vector3::X);

        assert_eq!(roots.as_slice(), &[-1.0, 1.0]);
        assert_eq!(roots.first_in(crate::HIT_RANGE), Some(1.0));
    }

    #[test]
    fn test_first_in_respects_bounds() {
        let sphere = unit_sphere(1.0);
        let roots = sphere.intersect(Vector3::new(0.0, 0.0, -3.0), Vector3::Z);

        assert_eq!(roots.first_in(Interval::new(0.0, 10.0)), Some(2.0));
        assert_eq!(roots.first_in(Interval::new(2.5, 10.0)), Some(4.0));
        assert_eq!(roots.first_in(Interval::new(4.5, 10.0)), None);

        // Origin on the surface: a root exactly at the lower bound counts
        let on_surface = sphere.intersect(Vector3::new(0.0, 0.0, -1.0), Vector3::Z);
        assert_eq!(on_surface.first_in(Interval::new(0.0, f64::INFINITY)), Some(0.0));
        assert_eq!(on_surface.first_in(crate::HIT_RANGE), Some(2.0));
    }
}
