//! Error types
//!
//! `ServeError` is what content handlers report; only the router turns it into
//! an HTTP status. `FsError` covers the tree copy and archive helpers.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for content delivery
pub type Result<T> = std::result::Result<T, ServeError>;

/// Failure kinds of the content handlers and the response writer
#[derive(Error, Debug)]
pub enum ServeError {
    /// Target file is absent (or is a directory)
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// Target exists but could not be read
    #[error("content unavailable: {path}: {source}")]
    ContentUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Request path resolves outside the configured root
    #[error("path traversal blocked: {0}")]
    PathTraversal(String),

    /// Headers derived from the content were rejected, e.g. a file name
    /// holding a control character
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] hyper::http::Error),
}

impl ServeError {
    /// Classify an I/O failure on `path` into `NotFound` or `ContentUnavailable`
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::ContentUnavailable { path, source: err }
        }
    }

    /// HTTP status code the router answers with
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::PathTraversal(_) => 403,
            Self::ContentUnavailable { .. } | Self::InvalidResponse(_) => 500,
        }
    }
}

/// Errors of the filesystem helpers in [`crate::files`]
#[derive(Error, Debug)]
pub enum FsError {
    /// Source of a tree copy is not a directory
    #[error("{0}: source is not a directory")]
    NotADirectory(PathBuf),

    /// Archive could not be opened or holds an unsafe entry
    #[error("invalid archive {path}: {reason}")]
    InvalidArchive { path: PathBuf, reason: String },

    /// Underlying I/O failure
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
