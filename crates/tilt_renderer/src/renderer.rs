//! Core shading and frame assembly.
//!
//! Implements direct illumination with:
//! - Brute-force nearest sphere hit per ray
//! - Hard shadows from every point light
//! - Anti-aliasing via jittered multi-sampling

use rand::{Rng, RngCore};
use rayon::prelude::*;
use serde::Deserialize;
use tilt_core::{nearest_hit, Scene};
use tilt_math::{Ray, Rgb};

use crate::coordinator::FrameSink;
use crate::error::{RenderError, RenderResult};
use crate::tile::{partition, render_tile, Tile};

/// Color of pixels whose ray misses every sphere.
pub const BACKGROUND: Rgb = Rgb::new(180.0, 180.0, 180.0);

/// Render configuration.
///
/// Every field has a default, so a config file only needs to name what
/// it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Tiles per frame row
    pub tile_grid_columns: u32,
    /// Tiles per frame column
    pub tile_grid_rows: u32,
    /// Worker threads; `None` uses the available hardware parallelism
    pub worker_count: Option<usize>,
    /// Samples per pixel; more than one enables jittered anti-aliasing
    pub samples_per_pixel: u32,
    /// Color when the ray doesn't hit anything
    pub background: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_grid_columns: 5,
            tile_grid_rows: 5,
            worker_count: None,
            samples_per_pixel: 1,
            background: BACKGROUND,
        }
    }
}

impl RenderConfig {
    /// Default config with 4x jittered supersampling.
    pub fn anti_aliased() -> Self {
        Self {
            samples_per_pixel: 4,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.tile_grid_columns == 0 || self.tile_grid_rows == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "tile grid must be at least 1x1, got {}x{}",
                self.tile_grid_columns, self.tile_grid_rows
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig("samples_per_pixel must be at least 1".into()));
        }
        if self.worker_count == Some(0) {
            return Err(RenderError::InvalidConfig("worker_count must be at least 1".into()));
        }
        Ok(())
    }
}

/// Compute the color seen by a primary ray.
///
/// The light contributions are summed before `shade` clamps them, so a
/// light behind the surface can cancel part of another light.
pub fn ray_color(ray: &Ray, scene: &Scene, config: &RenderConfig) -> Rgb {
    let Some(hit) = nearest_hit(&scene.spheres, ray) else {
        return config.background;
    };

    let power: f64 = scene
        .lights
        .iter()
        .map(|light| light.illuminate(hit.point, hit.normal, &scene.spheres))
        .sum();

    hit.sphere.color().shade(power)
}

/// Render a single pixel of the full frame with multi-sampling.
///
/// `x` and `y` are frame coordinates. With one sample the ray goes
/// through the pixel's top-left corner; with more, each sample is
/// jittered uniformly within the pixel.
pub fn render_pixel(
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Rgb {
    let samples = config.samples_per_pixel.max(1);
    let weight = 1.0 / samples as f64;
    let width = scene.width as f64;
    let height = scene.height as f64;

    let mut pixel_color = Rgb::BLACK;
    for _ in 0..samples {
        let (jx, jy) = sample_offset(samples, rng);

        let u = (x as f64 + jx) / width;
        let v = (y as f64 + jy) / height;
        let ray = scene.camera.ray(u, v);
        pixel_color = pixel_color + ray_color(&ray, scene, config) * weight;
    }

    pixel_color
}

/// Offset of one sample from the pixel's top-left corner, in `[0, 1)`.
fn sample_offset(samples: u32, rng: &mut dyn RngCore) -> (f64, f64) {
    if samples > 1 {
        (rng.gen::<f64>(), rng.gen::<f64>())
    } else {
        (0.0, 0.0)
    }
}

/// RGBA8 frame buffer for storing render output.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Create a new transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Raw row-major RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy a tile's tile-local pixels to its place in the frame.
    pub fn blit(&mut self, tile: &Tile, pixels: &[u8]) {
        debug_assert!(tile.x + tile.width <= self.width && tile.y + tile.height <= self.height);
        debug_assert_eq!(pixels.len(), tile.byte_len());

        let row_len = tile.width as usize * 4;
        for (row, src) in pixels.chunks_exact(row_len).enumerate() {
            let start = self.offset(tile.x, tile.y + row as u32);
            self.pixels[start..start + row_len].copy_from_slice(src);
        }
    }

    /// Convert to an `image` buffer for saving.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl FrameSink for FrameBuffer {
    fn draw_tile(&mut self, tile: &Tile, pixels: &[u8]) {
        self.blit(tile, pixels);
    }

    fn present(&mut self) {
        log::debug!("Frame {}x{} complete", self.width, self.height);
    }
}

/// Render the entire scene in one shot.
///
/// Tiles are rendered in parallel on the rayon pool, without a
/// coordinator or generations. Useful for offline renders and as a
/// reference for the worker pipeline.
pub fn render_frame(scene: &Scene, config: &RenderConfig) -> RenderResult<FrameBuffer> {
    config.validate()?;

    let tiles = partition(
        scene.width,
        scene.height,
        config.tile_grid_columns,
        config.tile_grid_rows,
        0,
    );

    let rendered: Vec<(Tile, Vec<u8>)> = tiles
        .par_iter()
        .map(|tile| {
            let mut rng = rand::thread_rng();
            (*tile, render_tile(tile, scene, config, &mut rng))
        })
        .collect();

    let mut frame = FrameBuffer::new(scene.width, scene.height);
    for (tile, pixels) in &rendered {
        frame.blit(tile, pixels);
    }
    Ok(frame)
}
