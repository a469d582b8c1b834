//! Nearest-hit query over a sphere list.

use tilt_math::{Ray, Vector3};

use crate::{Sphere, HIT_RANGE};

/// Record of a ray-sphere intersection.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Point of intersection
    pub point: Vector3,
    /// Outward normal, `point - center` (not normalized)
    pub normal: Vector3,
    /// Sphere that was hit
    pub sphere: &'a Sphere,
}

/// Find the closest intersection along `ray` with `t` in [`HIT_RANGE`].
///
/// Spheres are tested in order and a later sphere only wins with a
/// strictly smaller `t`, so on ties the first declared sphere is kept.
pub fn nearest_hit<'a>(spheres: &'a [Sphere], ray: &Ray) -> Option<HitRecord<'a>> {
    let mut closest: Option<(f64, &'a Sphere)> = None;

    for sphere in spheres {
        let Some(t) = sphere.intersect(ray.origin, ray.direction).first_in(HIT_RANGE) else {
            continue;
        };
        if closest.map_or(true, |(best, _)| t < best) {
            closest = Some((t, sphere));
        }
    }

    closest.map(|(t, sphere)| {
        let point = ray.at(t);
        HitRecord {
            t,
            point,
            normal: point - sphere.center(),
            sphere,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilt_math::Rgb;

    #[test]
    fn test_nearest_wins() {
        let spheres = [
            Sphere::new(Vector3::new(0.0, 0.0, 20.0), 1.0, Rgb::RED),
            Sphere::new(Vector3::new(0.0, 0.0, 10.0), 1.0, Rgb::GREEN),
        ];
        let ray = Ray::new(Vector3::ZERO, Vector3::Z);

        let hit = nearest_hit(&spheres, &ray).unwrap();
        assert_eq!(hit.sphere.color(), Rgb::GREEN);
        assert!((hit.t - 9.0).abs() < 1e-9);
        assert!(hit.normal.abs_diff_eq(Vector3::NEG_Z, 1e-9));
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        // Both spheres touch z = 9 first along the ray
        let spheres = [
            Sphere::new(Vector3::new(0.0, 0.0, 10.0), 1.0, Rgb::RED),
            Sphere::new(Vector3::new(0.0, 0.0, 11.0), 2.0, Rgb::BLUE),
        ];
        let ray = Ray::new(Vector3::ZERO, Vector3::Z);

        let hit = nearest_hit(&spheres, &ray).unwrap();
        assert_eq!(hit.t, 9.0);
        assert_eq!(hit.sphere.color(), Rgb::RED);

        let reversed = [spheres[1].clone(), spheres[0].clone()];
        let hit = nearest_hit(&reversed, &ray).unwrap();
        assert_eq!(hit.sphere.color(), Rgb::BLUE);
    }

    #[test]
    fn test_behind_origin_ignored() {
        let spheres = [Sphere::new(Vector3::new(0.0, 0.0, -10.0), 1.0, Rgb::RED)];
        let ray = Ray::new(Vector3::ZERO, Vector3::Z);
        assert!(nearest_hit(&spheres, &ray).is_none());
    }

    #[test]
    fn test_inside_sphere_hits_far_wall() {
        let spheres = [Sphere::new(Vector3::ZERO, 2.0, Rgb::RED)];
        let ray = Ray::new(Vector3::ZERO, Vector3::X);

        let hit = nearest_hit(&spheres, &ray).unwrap();
        assert_eq!(hit.t, 2.0);
        assert_eq!(hit.point, Vector3::new(2.0, 0.0, 0.0));
    }
}
