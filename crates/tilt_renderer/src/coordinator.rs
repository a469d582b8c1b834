//! Render coordinator: generations, tile dispatch and frame assembly.
//!
//! The coordinator owns the live [`Scene`]. Each render pass gets a new
//! generation: the scene is serialized once and broadcast to every worker,
//! the frame is partitioned into tiles, and tiles are handed out one per
//! worker with the rest kept in a backlog. Results from older generations
//! are dropped on arrival, so a burst of camera moves can never leave
//! stale pixels in the presented frame.

use tilt_core::{Scene, SceneSnapshot};

use crate::error::{RenderError, RenderResult};
use crate::tile::{partition, Generation, Tile, TileResult};
use crate::RenderConfig;

/// Index of a worker within its transport.
pub type WorkerId = usize;

/// A worker's answer to a dispatched tile.
#[derive(Debug)]
pub struct WorkerReply {
    pub worker: WorkerId,
    pub result: RenderResult<TileResult>,
}

/// Message-passing link between the coordinator and its workers.
///
/// Nothing is shared: scenes travel as snapshots and pixels come back
/// as owned buffers.
pub trait WorkerTransport {
    /// Number of workers; ids run from `0` to `worker_count() - 1`.
    fn worker_count(&self) -> usize;

    /// Send `snapshot` to every worker, busy or idle.
    fn broadcast(&mut self, snapshot: &SceneSnapshot) -> RenderResult<()>;

    /// Ask `worker` to render `tile`.
    fn dispatch(&mut self, worker: WorkerId, tile: Tile) -> RenderResult<()>;

    /// Block until some worker replies.
    fn recv(&mut self) -> RenderResult<WorkerReply>;
}

/// Destination for assembled pixels.
pub trait FrameSink {
    /// Blit tile-local RGBA8 pixels at the tile's offset.
    fn draw_tile(&mut self, tile: &Tile, pixels: &[u8]);

    /// All tiles of the current generation have been drawn.
    fn present(&mut self);
}

/// What happened to a collected tile result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collected {
    /// From a superseded generation (or a duplicate); dropped.
    Stale,
    /// Drawn; `remaining` tiles of this generation are still out.
    Accepted { remaining: usize },
    /// Drawn, and it was the last one: the frame was presented.
    Presented,
}

/// Drives render passes over a [`WorkerTransport`] into a [`FrameSink`].
pub struct Coordinator<T, S> {
    scene: Scene,
    config: RenderConfig,
    transport: T,
    sink: S,
    generation: Generation,
    /// Undispatched tiles; popped from the back
    backlog: Vec<Tile>,
    /// Tiles of the current generation not yet drawn
    outstanding: usize,
}

impl<T: WorkerTransport, S: FrameSink> Coordinator<T, S> {
    pub fn new(scene: Scene, config: RenderConfig, transport: T, sink: S) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self {
            scene,
            config,
            transport,
            sink,
            generation: 0,
            backlog: Vec::new(),
            outstanding: 0,
        })
    }

    /// Current generation; 0 before the first render pass.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// True once the latest render pass has been presented.
    pub fn is_presented(&self) -> bool {
        self.generation > 0 && self.outstanding == 0
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a new render pass and return its generation.
    ///
    /// Tiles of earlier passes still in flight are not cancelled; their
    /// results will simply be discarded.
    pub fn start(&mut self) -> RenderResult<Generation> {
        self.generation += 1;
        let generation = self.generation;

        let snapshot = self.scene.serialize();
        self.transport.broadcast(&snapshot)?;

        let mut tiles = partition(
            self.scene.width,
            self.scene.height,
            self.config.tile_grid_columns,
            self.config.tile_grid_rows,
            generation,
        );
        // Backlog pops from the back; reverse so tiles go out top to bottom
        tiles.reverse();
        self.outstanding = tiles.len();
        self.backlog = tiles;

        log::info!(
            "Generation {}: {} tiles for {}x{} across {} workers",
            generation,
            self.outstanding,
            self.scene.width,
            self.scene.height,
            self.transport.worker_count()
        );

        if self.outstanding == 0 {
            self.sink.present();
            return Ok(generation);
        }

        for worker in 0..self.transport.worker_count() {
            let Some(tile) = self.backlog.pop() else {
                break;
            };
            self.transport.dispatch(worker, tile)?;
        }
        log::debug!("Initial dispatch done, {} tiles in backlog", self.backlog.len());

        Ok(generation)
    }

    /// Apply an input command and re-render if it moved the camera.
    ///
    /// Returns whether the command was recognized.
    pub fn apply_command(&mut self, key: &str) -> RenderResult<bool> {
        if !self.scene.apply_command(key) {
            log::warn!("Unrecognized command {:?}, not re-rendering", key);
            return Ok(false);
        }
        self.start()?;
        Ok(true)
    }

    /// Collect one tile result from `worker`.
    ///
    /// Current-generation results are drawn and the worker is handed the
    /// next backlog tile. Older results change nothing.
    pub fn handle_result(
        &mut self,
        worker: WorkerId,
        result: TileResult,
    ) -> RenderResult<Collected> {
        let tile = result.tile;

        if tile.generation < self.generation {
            log::trace!(
                "Dropping tile ({}, {}) from generation {} (current {})",
                tile.x,
                tile.y,
                tile.generation,
                self.generation
            );
            return Ok(Collected::Stale);
        }
        if tile.generation > self.generation || self.outstanding == 0 {
            log::warn!(
                "Ignoring unexpected tile ({}, {}) of generation {} from worker {}",
                tile.x,
                tile.y,
                tile.generation,
                worker
            );
            return Ok(Collected::Stale);
        }

        if result.pixels.len() != tile.byte_len() {
            return Err(RenderError::PixelCountMismatch {
                expected: tile.byte_len(),
                actual: result.pixels.len(),
            });
        }

        self.sink.draw_tile(&tile, &result.pixels);
        self.outstanding -= 1;

        if let Some(next) = self.backlog.pop() {
            self.transport.dispatch(worker, next)?;
        }

        if self.outstanding == 0 {
            log::info!("Generation {} complete, presenting", self.generation);
            self.sink.present();
            Ok(Collected::Presented)
        } else {
            Ok(Collected::Accepted {
                remaining: self.outstanding,
            })
        }
    }

    /// Receive and handle one worker reply.
    pub fn pump(&mut self) -> RenderResult<Collected> {
        let reply = self.transport.recv()?;
        let result = reply.result?;
        self.handle_result(reply.worker, result)
    }

    /// Pump replies until the latest generation is presented.
    ///
    /// Starts a first pass if none has been started.
    pub fn render_until_presented(&mut self) -> RenderResult<()> {
        if self.generation == 0 {
            self.start()?;
        }
        while !self.is_presented() {
            self.pump()?;
        }
        Ok(())
    }
}
