use std::path::PathBuf;

use relay_core::error::CoreError;

/// Errors from artifact resolution and publication.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A local input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The remote object does not exist.
    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// A reference has no usable file name component.
    #[error("Reference has no file name: {0}")]
    NoFileName(String),

    /// An object storage call failed.
    #[error("Object storage error: {0}")]
    Transport(String),

    /// Local filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::FileNotFound(_) | StorageError::ObjectNotFound { .. } => {
                CoreError::NotFound(message)
            }
            StorageError::NoFileName(_) => CoreError::Validation(message),
            StorageError::Transport(_) => CoreError::Transport(message),
            StorageError::Io(io) => CoreError::from(io),
        }
    }
}
