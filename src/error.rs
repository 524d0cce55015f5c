//! Error types for configuration collection.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Empty or malformed root path
    InvalidArgument,
    /// Root path does not exist
    NotFound,
    /// Permission failure, broken symlink or unreadable file
    Io,
    /// Merged stream is not valid YAML or does not fit the target type
    Decode,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Io => write!(f, "i/o error"),
            ErrorKind::Decode => write!(f, "decode error"),
        }
    }
}

/// Errors raised while collecting or decoding a configuration tree.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller passed an unusable root path.
    #[error("Invalid config root {path:?}: {reason}")]
    InvalidArgument {
        /// The path as given by the caller.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// The root path does not exist.
    #[error("Config root not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A filesystem operation failed during traversal.
    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted (e.g. "resolve symlink").
        action: &'static str,
        /// The path the operation was applied to.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The merged YAML stream could not be decoded.
    #[error("Failed to decode merged config: {0}")]
    Decode(#[from] serde_yaml::Error),
}

impl Error {
    pub fn invalid_argument(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable code for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Io { .. } => ErrorKind::Io,
            Error::Decode(_) => ErrorKind::Decode,
        }
    }

    /// The filesystem path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::InvalidArgument { path, .. }
            | Error::NotFound { path }
            | Error::Io { path, .. } => Some(path),
            Error::Decode(_) => None,
        }
    }
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, Error>;
