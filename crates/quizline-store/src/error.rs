//! Store error types.

use thiserror::Error;

/// Errors that can occur when reading or writing stored quizzes and results.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No quiz with this id is stored.
    #[error("quiz not found: {0}")]
    NotFound(String),

    /// The id cannot be used as a storage key.
    #[error("invalid id {0:?}: ids may not be empty or contain path separators")]
    InvalidId(String),

    /// Reading or writing the data directory failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored file could not be decoded.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl StoreError {
    /// Returns `true` if retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }
}

/// Check that `id` is safe to use as a single path component.
pub(crate) fn check_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.contains('\0')
    {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}
