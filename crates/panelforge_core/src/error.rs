//! # Core Error Types
//!
//! All errors that can occur while configuring, storing or restoring voxel data.

use thiserror::Error;

/// Errors that can occur in the core voxel layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Chunk edge length outside the supported range.
    #[error("invalid chunk size {size}: must be between 1 and {max}")]
    InvalidChunkSize {
        /// The rejected size.
        size: usize,
        /// Largest supported size.
        max: usize,
    },

    /// Panel size catalog failed validation.
    #[error("invalid panel catalog: {0}")]
    InvalidCatalog(String),

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filesystem access failed.
    #[error("i/o failure: {0}")]
    Io(String),

    /// Snapshot does not start with the expected magic bytes.
    #[error("not a chunk snapshot (bad magic)")]
    BadMagic,

    /// Snapshot was written by an unknown format version.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u16),

    /// Snapshot ended before all declared data was read.
    #[error("snapshot truncated at byte {0}")]
    Truncated(usize),

    /// Declared or decompressed voxel payload has the wrong length.
    #[error("chunk payload size mismatch: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// Bytes remain after the last declared chunk record.
    #[error("{0} trailing bytes after the last chunk record")]
    TrailingBytes(usize),

    /// LZ4 decompression failed.
    #[error("chunk payload decompression failed: {0}")]
    Decompress(String),

    /// A stored voxel carries bits no valid voxel can have.
    #[error("corrupt voxel at cell {index}")]
    CorruptVoxel {
        /// Dense array index of the offending cell.
        index: usize,
    },

    /// Two snapshot entries claim the same chunk coordinate.
    #[error("duplicate chunk at ({x}, {y}, {z})")]
    DuplicateChunk {
        /// Chunk X.
        x: i32,
        /// Chunk Y.
        y: i32,
        /// Chunk Z.
        z: i32,
    },
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
