//! Error types for the engine.
//!
//! Meshing failures are isolated per job and never cross the worker boundary as
//! panics; they surface here only so the owning thread can do its bookkeeping.

use cgmath::Point3;
use thiserror::Error;

/// A single meshing job failed. The job is dropped and the worker keeps running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JobError {
    /// The chunk was not in the store when the worker picked the job up.
    #[error("chunk {0:?} is not loaded")]
    ChunkNotLoaded(Point3<i32>),

    /// The job panicked during terrain fill, padding or meshing.
    #[error("job for chunk {position:?} panicked: {message}")]
    Panicked {
        /// Coordinate of the chunk the job was meshing.
        position: Point3<i32>,
        /// Panic payload, when it was a string.
        message: String,
    },
}

/// Failure loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text was not valid JSON for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error for engine construction.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread {index}: {source}")]
    WorkerSpawn {
        /// Index of the worker that failed to start.
        index: usize,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
}
