// Re-export glam for convenience
pub use glam::*;

/// Double precision 3-vector used for all scene geometry.
///
/// `normalize()` is the unit operation; a zero-length vector normalizes
/// to NaN components, so callers must never cast through the eye point.
pub type Vector3 = DVec3;

// Tilt math types
mod color;
mod interval;
mod ray;
pub use color::Rgb;
pub use interval::Interval;
pub use ray::Ray;
