//! Tilt Core - scene model for the tiled sphere tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Sphere` (ray intersection), `Light` (shadowed point
//!   illumination), `Camera` + `Film` (planar projection, movement)
//! - **Scene**: the aggregate a render pass works from, plus the
//!   byte-exact snapshot format used to hand it to workers
//!
//! # Example
//!
//! ```
//! use tilt_core::Scene;
//!
//! let mut scene = Scene::demo(320, 240);
//! let snapshot = scene.serialize();
//! scene.apply_command("w");
//!
//! // The snapshot is unaffected by later camera moves
//! let copy = Scene::deserialize(snapshot.as_bytes()).unwrap();
//! assert_ne!(copy.camera, scene.camera);
//! ```

pub mod camera;
pub mod hit;
pub mod light;
pub mod scene;
pub mod sphere;
pub mod wire;

use tilt_math::Interval;

/// Minimum ray parameter accepted as a hit; rejects self-intersection.
pub const EPSILON: f64 = 1e-10;

/// Ray parameters accepted by primary and shadow rays.
pub const HIT_RANGE: Interval = Interval::new(EPSILON, f64::INFINITY);

// Re-export commonly used types
pub use camera::{Camera, CameraCommand, Film};
pub use hit::{nearest_hit, HitRecord};
pub use light::Light;
pub use scene::Scene;
pub use sphere::{Roots, Sphere};
pub use wire::{MalformedSceneData, SceneSnapshot};
