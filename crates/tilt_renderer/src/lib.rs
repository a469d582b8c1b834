//! Tilt Renderer - tiled parallel sphere tracing.
//!
//! Renders a [`tilt_core::Scene`] with direct illumination and hard
//! shadows. A frame is split into tiles that a pool of workers renders
//! concurrently; the [`Coordinator`] reassembles them and discards tiles
//! left over from superseded render passes.

mod coordinator;
mod error;
mod renderer;
mod tile;
mod worker;

pub use coordinator::{Collected, Coordinator, FrameSink, WorkerId, WorkerReply, WorkerTransport};
pub use error::{RenderError, RenderResult};
pub use renderer::{ray_color, render_frame, render_pixel, FrameBuffer, RenderConfig, BACKGROUND};
pub use tile::{partition, render_tile, Generation, Tile, TileResult};
pub use worker::{default_worker_count, WorkerMessage, WorkerPool, FALLBACK_WORKER_COUNT};

/// Re-export the scene model so callers need only this crate
pub use tilt_core::{Scene, SceneSnapshot};
pub use tilt_math::Rgb;
