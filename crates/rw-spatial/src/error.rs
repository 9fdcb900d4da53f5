//! Spatial-subsystem error type.

use thiserror::Error;

use rw_core::RoomId;

/// Errors produced by `rw-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: RoomId, to: RoomId },

    #[error("room {0} not found in registry")]
    RoomNotFound(RoomId),

    #[error("adjacency parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
