//! Thread-backed worker pool.
//!
//! Each worker is an OS thread with its own inbox, its own decoded copy
//! of the scene and its own RNG. Workers only ever talk to the
//! coordinator: scene snapshots and tiles come in over the inbox, tile
//! results go out over one shared reply channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tilt_core::{MalformedSceneData, Scene, SceneSnapshot};

use crate::coordinator::{Coordinator, FrameSink, WorkerId, WorkerReply, WorkerTransport};
use crate::error::{RenderError, RenderResult};
use crate::tile::{render_tile, Tile, TileResult};
use crate::RenderConfig;

/// Pool size used when the hardware parallelism cannot be queried.
pub const FALLBACK_WORKER_COUNT: usize = 2;

/// Number of workers to start when the config does not say.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKER_COUNT)
}

/// Messages a worker accepts.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Replace the worker's scene with this snapshot.
    SetScene(SceneSnapshot),
    /// Render a tile and reply with its pixels.
    RenderTile(Tile),
    Shutdown,
}

/// Scene state private to one worker.
enum WorkerScene {
    Missing,
    Broken(MalformedSceneData),
    Ready(Scene),
}

struct WorkerHandle {
    inbox: Sender<WorkerMessage>,
    thread: Option<JoinHandle<()>>,
}

/// A fixed pool of tile-rendering threads.
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    replies: Receiver<WorkerReply>,
}

impl WorkerPool {
    /// Start `config.worker_count` workers, or one per hardware thread.
    ///
    /// Workers keep their own copy of `config` for sampling and background;
    /// use [`Coordinator::spawn`] to drive a pool from the same config.
    pub fn new(config: &RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        let count = config.worker_count.unwrap_or_else(default_worker_count);

        let (reply_tx, replies) = mpsc::channel();
        let mut workers = Vec::with_capacity(count);

        for id in 0..count {
            let (inbox, messages) = mpsc::channel();
            let reply_tx = reply_tx.clone();
            let config = config.clone();

            let thread = thread::Builder::new()
                .name(format!("tilt-worker-{id}"))
                .spawn(move || run_worker(id, messages, reply_tx, config))?;

            workers.push(WorkerHandle {
                inbox,
                thread: Some(thread),
            });
        }

        log::info!("Started {} render workers", count);
        Ok(Self { workers, replies })
    }

    fn send(&self, worker: WorkerId, message: WorkerMessage) -> RenderResult<()> {
        let handle = self.workers.get(worker).ok_or(RenderError::UnknownWorker(worker))?;
        handle
            .inbox
            .send(message)
            .map_err(|_| RenderError::WorkerDisconnected)
    }
}

impl<S: FrameSink> Coordinator<WorkerPool, S> {
    /// Coordinator over a fresh [`WorkerPool`] built from `config`.
    pub fn spawn(scene: Scene, config: RenderConfig, sink: S) -> RenderResult<Self> {
        let pool = WorkerPool::new(&config)?;
        Coordinator::new(scene, config, pool, sink)
    }
}

impl WorkerTransport for WorkerPool {
    fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn broadcast(&mut self, snapshot: &SceneSnapshot) -> RenderResult<()> {
        for worker in 0..self.workers.len() {
            self.send(worker, WorkerMessage::SetScene(snapshot.clone()))?;
        }
        Ok(())
    }

    fn dispatch(&mut self, worker: WorkerId, tile: Tile) -> RenderResult<()> {
        log::debug!("Tile ({}, {}) gen {} -> worker {}", tile.x, tile.y, tile.generation, worker);
        self.send(worker, WorkerMessage::RenderTile(tile))
    }

    fn recv(&mut self) -> RenderResult<WorkerReply> {
        self.replies.recv().map_err(|_| RenderError::WorkerDisconnected)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for worker in &self.workers {
            let _ = worker.inbox.send(WorkerMessage::Shutdown);
        }
        for (id, worker) in self.workers.iter_mut().enumerate() {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    log::error!("Render worker {} panicked", id);
                }
            }
        }
    }
}

/// Worker loop: runs until shutdown or until either channel closes.
fn run_worker(
    id: WorkerId,
    messages: Receiver<WorkerMessage>,
    replies: Sender<WorkerReply>,
    config: RenderConfig,
) {
    let mut rng = StdRng::from_entropy();
    let mut scene = WorkerScene::Missing;

    for message in messages {
        match message {
            WorkerMessage::SetScene(snapshot) => {
                scene = match snapshot.decode() {
                    Ok(decoded) => WorkerScene::Ready(decoded),
                    Err(e) => {
                        log::error!("Worker {} could not decode scene: {}", id, e);
                        WorkerScene::Broken(e)
                    }
                };
            }
            WorkerMessage::RenderTile(tile) => {
                let result = match &scene {
                    WorkerScene::Ready(scene) => {
                        Ok(TileResult::new(tile, render_tile(&tile, scene, &config, &mut rng)))
                    }
                    WorkerScene::Broken(e) => Err(RenderError::Scene(e.clone())),
                    WorkerScene::Missing => Err(RenderError::NoScene),
                };

                if replies.send(WorkerReply { worker: id, result }).is_err() {
                    break;
                }
            }
            WorkerMessage::Shutdown => break,
        }
    }

    log::debug!("Render worker {} exiting", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{render_frame, FrameBuffer};
    use tilt_math::Rgb;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config(workers: usize) -> RenderConfig {
        RenderConfig {
            worker_count: Some(workers),
            ..Default::default()
        }
    }

    /// Sink that remembers which generations it was asked to draw.
    struct GenerationLog {
        frame: FrameBuffer,
        generations: Vec<u64>,
        presents: usize,
    }

    impl FrameSink for GenerationLog {
        fn draw_tile(&mut self, tile: &Tile, pixels: &[u8]) {
            self.generations.push(tile.generation);
            self.frame.draw_tile(tile, pixels);
        }

        fn present(&mut self) {
            self.presents += 1;
        }
    }

    #[test]
    fn test_default_worker_count_positive() {
        assert!(default_worker_count() >= 1);
    }

    #[test]
    fn test_pool_render_matches_direct() {
        init_logging();
        let scene = Scene::demo(64, 48);
        let sink = FrameBuffer::new(64, 48);
        let mut coord = Coordinator::spawn(scene.clone(), config(3), sink).unwrap();
        assert_eq!(coord.transport().worker_count(), 3);

        coord.render_until_presented().unwrap();

        let direct = render_frame(&scene, &RenderConfig::default()).unwrap();
        assert_eq!(coord.sink(), &direct);
    }

    #[test]
    fn test_pool_discards_superseded_generations() {
        init_logging();
        let sink = GenerationLog {
            frame: FrameBuffer::new(60, 40),
            generations: Vec::new(),
            presents: 0,
        };
        let pool = WorkerPool::new(&config(4)).unwrap();
        let mut coord = Coordinator::new(Scene::demo(60, 40), config(4), pool, sink).unwrap();

        coord.start().unwrap();
        coord.apply_command("a").unwrap();
        coord.apply_command("W").unwrap();
        coord.render_until_presented().unwrap();

        let log = coord.sink();
        assert_eq!(log.presents, 1);
        assert_eq!(log.generations.len(), 25);
        assert!(log.generations.iter().all(|&g| g == 3));

        let mut moved = Scene::demo(60, 40);
        moved.apply_command("a");
        moved.apply_command("W");
        let direct = render_frame(&moved, &RenderConfig::default()).unwrap();
        assert_eq!(log.frame, direct);
    }

    #[test]
    fn test_spawned_pool_uses_coordinator_config() {
        let config = RenderConfig {
            worker_count: Some(2),
            background: Rgb::new(10.0, 20.0, 30.0),
            ..Default::default()
        };
        let sink = FrameBuffer::new(20, 20);
        let mut coord = Coordinator::spawn(Scene::demo(20, 20), config, sink).unwrap();
        coord.render_until_presented().unwrap();

        // Top-left corner of the demo scene sees no sphere
        assert_eq!(coord.sink().get(0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn test_render_before_scene_reports_no_scene() {
        let mut pool = WorkerPool::new(&config(1)).unwrap();
        pool.dispatch(0, Tile::new(0, 0, 1, 1, 1)).unwrap();

        let reply = pool.recv().unwrap();
        assert_eq!(reply.worker, 0);
        assert!(matches!(reply.result, Err(RenderError::NoScene)));
    }

    #[test]
    fn test_unknown_worker() {
        let mut pool = WorkerPool::new(&config(2)).unwrap();
        let err = pool.dispatch(5, Tile::new(0, 0, 1, 1, 1)).unwrap_err();
        assert!(matches!(err, RenderError::UnknownWorker(5)));
    }

    #[test]
    fn test_worker_renders_private_snapshot() {
        let mut scene = Scene::demo(8, 8);
        let mut pool = WorkerPool::new(&config(1)).unwrap();
        pool.broadcast(&scene.serialize()).unwrap();

        // Moving the live scene after the broadcast does not affect the worker
        scene.apply_command("d");
        let tile = Tile::new(0, 0, 8, 8, 1);
        pool.dispatch(0, tile).unwrap();

        let pixels = pool.recv().unwrap().result.unwrap().pixels;
        let expected = render_frame(&Scene::demo(8, 8), &RenderConfig::default()).unwrap();
        assert_eq!(pixels, expected.as_bytes());
    }
}
