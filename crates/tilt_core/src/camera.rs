//! Camera and film plane for ray generation.

use serde::{Deserialize, Serialize};
use tilt_math::{Ray, Vector3};

/// Distance covered by one movement command.
pub const MOVE_STEP: f64 = 1.0;

/// Planar projection surface facing along +z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub origin: Vector3,
    pub width: f64,
    pub height: f64,
}

impl Film {
    pub fn new(origin: Vector3, width: f64, height: f64) -> Self {
        Self { origin, width, height }
    }

    /// Map normalized offsets to a world-space point on the film.
    ///
    /// `v` is flipped so that increasing `v` moves down the image.
    pub fn project(&self, u: f64, v: f64) -> Vector3 {
        Vector3::new(
            self.origin.x + self.width * u,
            self.origin.y + self.height - self.height * v,
            self.origin.z,
        )
    }
}

/// Discrete camera translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraCommand {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Eye and film move forward together.
    MoveForward,
    /// Only the eye moves; the film stays, widening the field of view.
    MoveEyeForward,
    MoveBack,
    MoveEyeBack,
}

impl CameraCommand {
    /// Look up the command bound to an input key identifier.
    pub fn from_key(key: &str) -> Option<Self> {
        let command = match key {
            "w" => Self::MoveForward,
            "W" => Self::MoveEyeForward,
            "s" => Self::MoveBack,
            "S" => Self::MoveEyeBack,
            "a" | "ArrowLeft" => Self::MoveLeft,
            "d" | "ArrowRight" => Self::MoveRight,
            "ArrowUp" => Self::MoveUp,
            "ArrowDown" => Self::MoveDown,
            _ => return None,
        };
        Some(command)
    }

    /// Translation applied to the eye, and whether the film follows it.
    fn translation(self) -> (Vector3, bool) {
        match self {
            Self::MoveLeft => (Vector3::NEG_X, true),
            Self::MoveRight => (Vector3::X, true),
            Self::MoveUp => (Vector3::Y, true),
            Self::MoveDown => (Vector3::NEG_Y, true),
            Self::MoveForward => (Vector3::Z, true),
            Self::MoveBack => (Vector3::NEG_Z, true),
            Self::MoveEyeForward => (Vector3::Z, false),
            Self::MoveEyeBack => (Vector3::NEG_Z, false),
        }
    }
}

/// Pinhole camera looking through a film plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: Vector3,
    pub film: Film,
}

impl Camera {
    pub fn new(eye: Vector3, film: Film) -> Self {
        Self { eye, film }
    }

    /// Unit direction from the eye through the film at `(u, v)`.
    ///
    /// The eye must not lie on the film plane at the projected point.
    pub fn cast(&self, u: f64, v: f64) -> Vector3 {
        self.ray(u, v).direction
    }

    /// Primary ray through `(u, v)`.
    pub fn ray(&self, u: f64, v: f64) -> Ray {
        Ray::towards(self.eye, self.film.project(u, v))
    }

    pub fn apply(&mut self, command: CameraCommand) {
        let (offset, with_film) = command.translation();
        let offset = offset * MOVE_STEP;
        self.eye += offset;
        if with_film {
            self.film.origin += offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(
            Vector3::new(3.0, 3.0, 0.0),
            Film::new(Vector3::new(0.0, 0.0, 3.0), 6.0, 6.0),
        )
    }

    #[test]
    fn test_project_flips_v() {
        let film = camera().film;
        assert_eq!(film.project(0.0, 0.0), Vector3::new(0.0, 6.0, 3.0));
        assert_eq!(film.project(1.0, 1.0), Vector3::new(6.0, 0.0, 3.0));
        assert_eq!(film.project(0.5, 0.5), Vector3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_cast_center_looks_down_z() {
        let cam = camera();
        assert_eq!(cam.cast(0.5, 0.5), Vector3::Z);

        let ray = cam.ray(0.5, 0.5);
        assert_eq!(ray.origin, cam.eye);
    }

    #[test]
    fn test_move_with_film() {
        let mut cam = camera();
        cam.apply(CameraCommand::MoveLeft);
        cam.apply(CameraCommand::MoveUp);
        cam.apply(CameraCommand::MoveForward);

        assert_eq!(cam.eye, Vector3::new(2.0, 4.0, 1.0));
        assert_eq!(cam.film.origin, Vector3::new(-1.0, 1.0, 4.0));
        // Relative geometry unchanged
        assert_eq!(cam.cast(0.5, 0.5), Vector3::Z);
    }

    #[test]
    fn test_move_eye_only() {
        let mut cam = camera();
        cam.apply(CameraCommand::MoveEyeForward);
        cam.apply(CameraCommand::MoveEyeForward);
        cam.apply(CameraCommand::MoveEyeBack);

        assert_eq!(cam.eye, Vector3::new(3.0, 3.0, 1.0));
        assert_eq!(cam.film.origin, Vector3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(CameraCommand::from_key("w"), Some(CameraCommand::MoveForward));
        assert_eq!(CameraCommand::from_key("W"), Some(CameraCommand::MoveEyeForward));
        assert_eq!(CameraCommand::from_key("S"), Some(CameraCommand::MoveEyeBack));
        assert_eq!(CameraCommand::from_key("ArrowLeft"), Some(CameraCommand::MoveLeft));
        assert_eq!(CameraCommand::from_key("d"), Some(CameraCommand::MoveRight));
        assert_eq!(CameraCommand::from_key("ArrowDown"), Some(CameraCommand::MoveDown));
        assert_eq!(CameraCommand::from_key("q"), None);
        assert_eq!(CameraCommand::from_key(""), None);
    }
}
