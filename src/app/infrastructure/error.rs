use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not valid UTF-8 text: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("Shell integration error: {0}")]
    ShellIntegration(String),

    #[error("Instance error: {0}")]
    Instance(String),
}

impl AppError {
    /// Classify an I/O failure on `path` into the document error taxonomy.
    pub fn from_io(path: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => AppError::PermissionDenied(path.to_string()),
            io::ErrorKind::InvalidData => AppError::Decode(path.to_string()),
            _ => AppError::Io(err),
        }
    }
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
