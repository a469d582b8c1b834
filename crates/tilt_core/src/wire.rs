//! Byte-exact scene snapshot format.
//!
//! Layout (all little-endian):
//!
//! ```text
//! u32 width | u32 height | u32 sphere_count | u32 light_count
//! f64 x 8   camera: eye.xyz, film.origin.xyz, film.width, film.height
//! f64 x 7   per sphere: center.xyz, radius, red, green, blue
//! f64 x 4   per light: origin.xyz, power
//! ```
//!
//! Decoding either reproduces every field bit for bit or fails; a
//! partially populated scene is never returned.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tilt_math::{Rgb, Vector3};

use crate::{Camera, Film, Light, Scene, Sphere};

/// Size of the integer header in bytes.
pub const HEADER_LEN: usize = 16;
/// Floats per camera block.
pub const CAMERA_FLOATS: usize = 8;
/// Floats per sphere block.
pub const SPHERE_FLOATS: usize = 7;
/// Floats per light block.
pub const LIGHT_FLOATS: usize = 4;

/// Errors for scene snapshots that cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedSceneData {
    #[error("malformed scene data: header needs {HEADER_LEN} bytes, got {0}")]
    MissingHeader(usize),

    #[error(
        "malformed scene data: {spheres} spheres and {lights} lights need {expected} bytes, \
         got {actual}"
    )]
    LengthMismatch {
        spheres: usize,
        lights: usize,
        expected: usize,
        actual: usize,
    },

    #[error("malformed scene data: empty frame {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("malformed scene data: value {index} is not finite")]
    NonFinite { index: usize },

    #[error("malformed scene data: value {index} must be positive, got {value}")]
    NonPositive { index: usize, value: f64 },
}

/// Immutable serialized scene, cheap to clone and send to workers.
///
/// Clones share the same bytes; nothing in a snapshot refers back to the
/// live scene it was taken from.
#[derive(Clone, PartialEq, Eq)]
pub struct SceneSnapshot {
    bytes: Arc<[u8]>,
}

impl SceneSnapshot {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode into an independent scene.
    pub fn decode(&self) -> Result<Scene, MalformedSceneData> {
        decode(&self.bytes)
    }
}

impl fmt::Debug for SceneSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneSnapshot").field("len", &self.bytes.len()).finish()
    }
}

/// Total encoded size for a scene with the given counts.
pub fn encoded_len(spheres: usize, lights: usize) -> usize {
    HEADER_LEN + 8 * (CAMERA_FLOATS + SPHERE_FLOATS * spheres + LIGHT_FLOATS * lights)
}

pub(crate) fn encode(scene: &Scene) -> SceneSnapshot {
    let mut buf = Vec::with_capacity(encoded_len(scene.spheres.len(), scene.lights.len()));

    buf.extend_from_slice(&scene.width.to_le_bytes());
    buf.extend_from_slice(&scene.height.to_le_bytes());
    buf.extend_from_slice(&wire_count(scene.spheres.len()).to_le_bytes());
    buf.extend_from_slice(&wire_count(scene.lights.len()).to_le_bytes());

    let mut put = |v: f64| buf.extend_from_slice(&v.to_le_bytes());

    let camera = &scene.camera;
    put_vector(&mut put, camera.eye);
    put_vector(&mut put, camera.film.origin);
    put(camera.film.width);
    put(camera.film.height);

    for sphere in &scene.spheres {
        put_vector(&mut put, sphere.center());
        put(sphere.radius());
        let color = sphere.color();
        put(color.red);
        put(color.green);
        put(color.blue);
    }

    for light in &scene.lights {
        put_vector(&mut put, light.origin());
        put(light.power());
    }

    SceneSnapshot { bytes: buf.into() }
}

/// Header count for `len` items.
///
/// Saturates instead of wrapping, so an oversized list can never alias a
/// smaller valid count; decoding such a snapshot fails with `LengthMismatch`.
fn wire_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn put_vector(put: &mut impl FnMut(f64), v: Vector3) {
    put(v.x);
    put(v.y);
    put(v.z);
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Scene, MalformedSceneData> {
    if bytes.len() < HEADER_LEN {
        return Err(MalformedSceneData::MissingHeader(bytes.len()));
    }

    let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    let width = word(0);
    let height = word(4);
    let spheres = word(8) as usize;
    let lights = word(12) as usize;

    let expected = encoded_len(spheres, lights);
    if bytes.len() != expected {
        return Err(MalformedSceneData::LengthMismatch {
            spheres,
            lights,
            expected,
            actual: bytes.len(),
        });
    }
    if width == 0 || height == 0 {
        return Err(MalformedSceneData::EmptyFrame { width, height });
    }

    let mut floats = Floats::new(&bytes[HEADER_LEN..]);

    let eye = floats.vector()?;
    let film_origin = floats.vector()?;
    let film = Film::new(film_origin, floats.next()?, floats.next()?);
    let camera = Camera::new(eye, film);

    let sphere_list = (0..spheres)
        .map(|_| {
            let center = floats.vector()?;
            let radius = floats.positive()?;
            let color = Rgb::new(floats.next()?, floats.next()?, floats.next()?);
            Ok(Sphere::new(center, radius, color))
        })
        .collect::<Result<Vec<_>, MalformedSceneData>>()?;

    let light_list = (0..lights)
        .map(|_| Ok(Light::new(floats.vector()?, floats.positive()?)))
        .collect::<Result<Vec<_>, MalformedSceneData>>()?;

    Ok(Scene::new(camera, sphere_list, light_list, width, height))
}

/// Sequential reader over the float body. Length is checked up front.
struct Floats<'a> {
    chunks: std::slice::ChunksExact<'a, u8>,
    index: usize,
}

impl<'a> Floats<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self {
            chunks: body.chunks_exact(8),
            index: 0,
        }
    }

    fn next(&mut self) -> Result<f64, MalformedSceneData> {
        let index = self.index;
        self.index += 1;

        let value = self
            .chunks
            .next()
            .and_then(|chunk| chunk.try_into().ok())
            .map(f64::from_le_bytes)
            .ok_or(MalformedSceneData::NonFinite { index })?;

        if value.is_finite() {
            Ok(value)
        } else {
            Err(MalformedSceneData::NonFinite { index })
        }
    }

    fn positive(&mut self) -> Result<f64, MalformedSceneData> {
        let index = self.index;
        let value = self.next()?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(MalformedSceneData::NonPositive { index, value })
        }
    }

    fn vector(&mut self) -> Result<Vector3, MalformedSceneData> {
        Ok(Vector3::new(self.next()?, self.next()?, self.next()?))
    }
}
