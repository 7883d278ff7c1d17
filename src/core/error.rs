//! Error types for the Voxelforge engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] crate::codec::CodecError),

    #[error("config error: {0}")]
    Config(String),

    #[error("project error: {0}")]
    Project(String),

    #[error("voxel error: {0}")]
    Voxel(String),
}
