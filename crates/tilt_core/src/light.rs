//! Point lights with hard shadows.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tilt_math::Vector3;

use crate::{Sphere, HIT_RANGE};

/// An isotropic point light with inverse-square falloff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    origin: Vector3,
    power: f64,
}

impl Light {
    pub fn new(origin: Vector3, power: f64) -> Self {
        debug_assert!(power > 0.0, "light power must be positive, got {power}");
        Self { origin, power }
    }

    pub fn origin(&self) -> Vector3 {
        self.origin
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    /// Power this light delivers to `point` on a surface with normal `normal`.
    ///
    /// Returns exactly 0 when any sphere blocks the shadow ray. The cosine
    /// term is left signed: a light behind the surface contributes negative
    /// power, and the sum over all lights is clamped when shading.
    /// `normal` need not be normalized.
    pub fn illuminate(&self, point: Vector3, normal: Vector3, spheres: &[Sphere]) -> f64 {
        let ray = self.origin - point;
        let direction = ray.normalize();

        let occluded = spheres
            .iter()
            .any(|sphere| sphere.intersect(point, direction).first_in(HIT_RANGE).is_some());
        if occluded {
            return 0.0;
        }

        let cosine = normal.dot(direction) / normal.length();
        self.power * cosine / (4.0 * PI * ray.length_squared())
    }
}
