//! Error types
//!
//! Defines domain-specific error types for each module of the file manager,
//! plus the request-level error that carries its response status code.

use std::fmt;
use std::io;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    /// The caller-supplied relative path failed confinement validation.
    InvalidPath(String),
    /// The configured root directory is missing or unusable.
    RootUnavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidPath(p) => write!(f, "invalid path \"{}\"", p),
            StorageError::RootUnavailable(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Traversal errors; any one of these aborts the whole delete request.
#[derive(Debug)]
pub enum TraverseError {
    /// A subtree entry could not be stat-ed.
    Stat { path: String, error: io::Error },
    /// A directory's entries could not be listed.
    List { path: String, error: io::Error },
}

impl fmt::Display for TraverseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraverseError::Stat { path, error } => {
                write!(f, "traverse stat \"{}\": {}", path, error)
            }
            TraverseError::List { path, error } => {
                write!(f, "opendir \"{}\": {}", path, error)
            }
        }
    }
}

impl std::error::Error for TraverseError {}

/// Request-level error covering every failure a handler can report.
///
/// Each variant maps to exactly one response status; the payload is the
/// user-visible message, which also carries the OS error text where one
/// exists.
#[derive(Debug)]
pub enum FileManagerError {
    InvalidInput(String),
    Forbidden(String),
    NotFound(String),
    MethodNotAllowed(String),
    UnknownRoute(String),
    Internal(String),
    Unconfigured(String),
}

impl FileManagerError {
    /// The response status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            FileManagerError::InvalidInput(_) => 400,
            FileManagerError::Forbidden(_) => 403,
            FileManagerError::NotFound(_) => 404,
            FileManagerError::MethodNotAllowed(_) => 405,
            FileManagerError::UnknownRoute(_) => 404,
            FileManagerError::Internal(_) => 500,
            FileManagerError::Unconfigured(_) => 500,
        }
    }

    /// The user-visible message.
    pub fn message(&self) -> &str {
        match self {
            FileManagerError::InvalidInput(m)
            | FileManagerError::Forbidden(m)
            | FileManagerError::NotFound(m)
            | FileManagerError::MethodNotAllowed(m)
            | FileManagerError::UnknownRoute(m)
            | FileManagerError::Internal(m)
            | FileManagerError::Unconfigured(m) => m,
        }
    }
}

impl fmt::Display for FileManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FileManagerError {}

impl From<StorageError> for FileManagerError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::InvalidPath(_) => FileManagerError::InvalidInput(error.to_string()),
            StorageError::RootUnavailable(_) => FileManagerError::Unconfigured(error.to_string()),
        }
    }
}

impl From<TraverseError> for FileManagerError {
    fn from(error: TraverseError) -> Self {
        FileManagerError::Internal(error.to_string())
    }
}
