//! Error types for `encfm-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

use std::path::PathBuf;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// A root navigation target that does not exist or is not a directory.
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry handle no longer refers to a live tree node.
    ///
    /// Handles are invalidated when their directory is re-expanded or the
    /// tree root changes.
    #[error("stale entry handle")]
    StaleEntry,

    /// A file's source encoding could not be determined or decoded.
    #[error("encoding error: {0}")]
    Decode(String),

    /// An encoding label outside the supported conversion target set.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `encfm-core`.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Classifies a raw I/O error against `path` into the closest variant.
    pub(crate) fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => {
                CoreError::PermissionDenied(path.to_path_buf())
            }
            _ => CoreError::Io(err),
        }
    }
}
