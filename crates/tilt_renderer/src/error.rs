//! Errors raised by the render pipeline.

use thiserror::Error;
use tilt_core::MalformedSceneData;

use crate::WorkerId;

/// Errors that can occur while rendering or coordinating workers.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Scene error: {0}")]
    Scene(#[from] MalformedSceneData),

    #[error("Worker asked to render before any scene was broadcast")]
    NoScene,

    #[error("Tile pixel buffer has {actual} bytes, expected {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },

    #[error("Unknown worker id: {0}")]
    UnknownWorker(WorkerId),

    #[error("Worker channel disconnected")]
    WorkerDisconnected,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Invalid render config: {0}")]
    InvalidConfig(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
