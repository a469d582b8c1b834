use crate::Vector3;

/// A ray in 3D space with origin and direction.
///
/// Rays are used for raytracing - they represent a line starting at `origin`
/// and traveling in `direction`. The direction is expected to be unit length
/// so that the ray parameter `t` is a true distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray from `origin` towards `target`, normalizing the direction.
    pub fn towards(origin: Vector3, target: Vector3) -> Self {
        Self::new(origin, (target - origin).normalize())
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }
}
