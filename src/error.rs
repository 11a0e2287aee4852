//! Error types
//!
//! All errors that can occur while resolving, loading or serving a theme.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum CursorError {
    /// No theme directory matched the request
    #[error("No cursor theme found: {0}")]
    ThemeNotFound(String),

    /// Malformed manifest or shape metadata
    #[error("Parse error: {0}")]
    Parse(String),

    /// Archive could not be opened, or an entry is missing or unreadable
    #[error("Archive error in {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },

    /// Raster decode or vector render failed in a backend
    #[error("Decode error: {0}")]
    Decode(String),

    /// A resize-less raster shape was queried at a size it does not ship
    #[error("Shape {shape} has no image of size {size} and cannot be resampled")]
    ContractViolation { shape: String, size: u32 },

    /// No loaded image of the shape can be handed out
    #[error("Shape {0} has no loaded image to serve")]
    NoCandidate(String),

    /// The manager failed to load a theme
    #[error("Manager is not valid")]
    InvalidManager,

    /// IO error (wrapped)
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CursorError {
    fn from(err: std::io::Error) -> Self {
        CursorError::Io(err.to_string())
    }
}

impl CursorError {
    pub(crate) fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CursorError::Archive {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias used across the crate
pub type CursorResult<T> = Result<T, CursorError>;
