//! # Meshing Error Types

use panelforge_core::ChunkId;
use thiserror::Error;

/// Failure reported by a placement sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("placement sink rejected chunk: {reason}")]
pub struct PlacementError {
    /// Sink-provided reason.
    pub reason: String,
}

impl PlacementError {
    /// Creates a placement error with a reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while regenerating chunk panels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Handle does not refer to a live chunk.
    #[error("unknown chunk {0:?}")]
    UnknownChunk(ChunkId),

    /// Placement sink refused the result; the chunk stays dirty.
    #[error(transparent)]
    Sink(#[from] PlacementError),
}

/// Result type for meshing operations.
pub type MeshResult<T> = Result<T, MeshError>;
