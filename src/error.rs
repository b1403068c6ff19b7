//! Error types for rotating writers and file retention

use std::io;

use thiserror::Error;

/// Result type for rotation and retention operations
pub type RotateResult<T> = Result<T, RotateError>;

/// Errors that can occur while writing, rotating or pruning
#[derive(Debug, Error)]
pub enum RotateError {
    /// A write or rotation was attempted while no sink is open
    #[error("stream is closed")]
    Closed,

    /// `reopen` was called while a sink is still installed
    #[error("stream is already open")]
    AlreadyOpen,

    /// Closing the old sink or creating the new one failed
    #[error("failed to rotate: {0}")]
    Rotation(#[source] io::Error),

    /// Ledger lookup by name or index missed
    #[error("file not found: {0}")]
    NotFound(String),

    /// Pruning stopped at the first deletion that failed
    #[error("failed to prune files after removing {removed:?}: {source}")]
    Prune {
        removed: Vec<String>,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RotateError {
    /// True for ledger misses
    pub fn is_not_found(&self) -> bool {
        matches!(self, RotateError::NotFound(_))
    }

    /// Names already removed when a prune failed part-way
    pub fn removed(&self) -> &[String] {
        match self {
            RotateError::Prune { removed, .. } => removed,
            _ => &[],
        }
    }
}

impl From<RotateError> for io::Error {
    fn from(e: RotateError) -> Self {
        match e {
            RotateError::Io(inner) => inner,
            RotateError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, e),
            RotateError::NotFound(_) => io::Error::new(io::ErrorKind::NotFound, e),
            other => io::Error::other(other),
        }
    }
}
