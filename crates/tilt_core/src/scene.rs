//! Scene state: camera, spheres, lights and the target frame size.

use serde::{Deserialize, Serialize};
use tilt_math::{Rgb, Vector3};

use crate::wire::{self, MalformedSceneData, SceneSnapshot};
use crate::{Camera, CameraCommand, Film, Light, Sphere};

/// A complete renderable scene.
///
/// Spheres and lights are fixed for a session; only the camera moves.
/// Workers never see this value directly, only decoded copies of a
/// [`SceneSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub camera: Camera,

    /// Spheres in declaration order (earlier spheres win depth ties)
    pub spheres: Vec<Sphere>,

    pub lights: Vec<Light>,

    /// Target frame width in pixels
    pub width: u32,

    /// Target frame height in pixels
    pub height: u32,
}

impl Scene {
    pub fn new(
        camera: Camera,
        spheres: Vec<Sphere>,
        lights: Vec<Light>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            camera,
            spheres,
            lights,
            width,
            height,
        }
    }

    /// The stock three-sphere scene lit by two point lights.
    pub fn demo(width: u32, height: u32) -> Self {
        let camera = Camera::new(
            Vector3::new(3.0, 3.0, 0.0),
            Film::new(Vector3::new(0.0, 0.0, 3.0), 6.0, 6.0),
        );

        let spheres = vec![
            Sphere::new(Vector3::new(5.0, 3.0, 5.0), 2.0, Rgb::RED),
            Sphere::new(Vector3::new(0.0, 5.0, 10.0), 2.0, Rgb::GREEN),
            Sphere::new(Vector3::new(3.0, 0.0, 15.0), 2.0, Rgb::BLUE),
        ];

        let lights = vec![
            Light::new(Vector3::new(-5.0, 10.0, 0.0), 3000.0),
            Light::new(Vector3::new(10.0, 5.0, 2.0), 1500.0),
        ];

        Self::new(camera, spheres, lights, width, height)
    }

    /// Apply the camera movement bound to `key`.
    ///
    /// Returns false, leaving the scene untouched, for unknown keys; callers
    /// use that to skip re-rendering.
    pub fn apply_command(&mut self, key: &str) -> bool {
        match CameraCommand::from_key(key) {
            Some(command) => {
                self.apply(command);
                true
            }
            None => {
                log::debug!("Ignoring unbound key {:?}", key);
                false
            }
        }
    }

    pub fn apply(&mut self, command: CameraCommand) {
        self.camera.apply(command);
        log::debug!("{:?}: eye now at {}", command, self.camera.eye);
    }

    /// Flatten the scene into an independent byte snapshot.
    pub fn serialize(&self) -> SceneSnapshot {
        wire::encode(self)
    }

    /// Rebuild a scene from snapshot bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Scene, MalformedSceneData> {
        wire::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene() {
        let scene = Scene::demo(100, 100);
        assert_eq!(scene.spheres.len(), 3);
        assert_eq!(scene.lights.len(), 2);
        assert_eq!((scene.width, scene.height), (100, 100));
        assert_eq!(scene.spheres[0].color(), Rgb::RED);
    }

    #[test]
    fn test_apply_command() {
        let mut scene = Scene::demo(10, 10);

        assert!(scene.apply_command("a"));
        assert!(scene.apply_command("ArrowUp"));
        assert!(scene.apply_command("S"));
        assert_eq!(scene.camera.eye, Vector3::new(2.0, 4.0, -1.0));
        assert_eq!(scene.camera.film.origin, Vector3::new(-1.0, 1.0, 3.0));
    }

    #[test]
    fn test_unknown_command_is_noop() {
        let mut scene = Scene::demo(10, 10);
        let before = scene.clone();

        assert!(!scene.apply_command("x"));
        assert!(!scene.apply_command("Escape"));
        assert_eq!(scene, before);
    }

    #[test]
    fn test_json_scene_description() {
        let json = r#"{
            "camera": {
                "eye": [3.0, 3.0, 0.0],
                "film": { "origin": [0.0, 0.0, 3.0], "width": 6.0, "height": 6.0 }
            },
            "spheres": [
                {
                    "center": [5.0, 3.0, 5.0],
                    "radius": 2.0,
                    "color": { "red": 255.0, "green": 0.0, "blue": 0.0 }
                }
            ],
            "lights": [ { "origin": [-5.0, 10.0, 0.0], "power": 3000.0 } ],
            "width": 64,
            "height": 48
        }"#;

        let scene: Scene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.spheres[0].radius(), 2.0);
        assert_eq!(scene.lights[0].power(), 3000.0);
        assert_eq!(scene.camera.film.origin, Vector3::new(0.0, 0.0, 3.0));
        assert_eq!((scene.width, scene.height), (64, 48));
    }
}
