//! Tile-based frame partitioning and rendering.
//!
//! Divides the frame into a grid of tiles that are rendered independently
//! and reassembled at their fixed offsets.

use rand::RngCore;
use tilt_core::Scene;

use crate::renderer::render_pixel;
use crate::RenderConfig;

/// Identifier of one complete render pass.
pub type Generation = u64;

/// A rectangular region of the frame to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    /// Width of the tile in pixels
    pub width: u32,
    /// Height of the tile in pixels
    pub height: u32,
    /// Render pass this tile belongs to
    pub generation: Generation,
}

impl Tile {
    /// Create a new tile.
    pub fn new(x: u32, y: u32, width: u32, height: u32, generation: Generation) -> Self {
        Self {
            x,
            y,
            width,
            height,
            generation,
        }
    }

    /// Get the total number of pixels in this tile.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of this tile's RGBA8 pixel buffer.
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * 4
    }
}

/// Rendered pixels of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileResult {
    /// The tile that was rendered
    pub tile: Tile,
    /// Tile-local RGBA8 pixels in row-major order
    pub pixels: Vec<u8>,
}

impl TileResult {
    pub fn new(tile: Tile, pixels: Vec<u8>) -> Self {
        Self { tile, pixels }
    }
}

/// Split a `width` x `height` frame into a `columns` x `rows` grid.
///
/// Tile edges fall at `i * width / columns` (and likewise vertically), so
/// sizes differ by at most one pixel and every pixel lands in exactly one
/// tile. A grid finer than the frame is capped at one tile per pixel.
/// Tiles are returned in row-major order.
pub fn partition(
    width: u32,
    height: u32,
    columns: u32,
    rows: u32,
    generation: Generation,
) -> Vec<Tile> {
    let columns = columns.min(width);
    let rows = rows.min(height);
    if columns == 0 || rows == 0 {
        return Vec::new();
    }

    let edge = |i: u32, count: u32, extent: u32| (i as u64 * extent as u64 / count as u64) as u32;
    let mut tiles = Vec::with_capacity(columns as usize * rows as usize);

    for row in 0..rows {
        let y0 = edge(row, rows, height);
        let y1 = edge(row + 1, rows, height);
        if y1 == y0 {
            continue;
        }

        for column in 0..columns {
            let x0 = edge(column, columns, width);
            let x1 = edge(column + 1, columns, width);
            if x1 > x0 {
                tiles.push(Tile::new(x0, y0, x1 - x0, y1 - y0, generation));
            }
        }
    }

    tiles
}

/// Render a single tile against a decoded scene.
///
/// Returns `4 * width * height` bytes in tile-local row-major order;
/// placing them in the frame is the caller's job.
pub fn render_tile(
    tile: &Tile,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(tile.byte_len());

    for local_y in 0..tile.height {
        for local_x in 0..tile.width {
            let color = render_pixel(scene, tile.x + local_x, tile.y + local_y, config, rng);
            pixels.extend_from_slice(&color.to_rgba());
        }
    }

    pixels
}
