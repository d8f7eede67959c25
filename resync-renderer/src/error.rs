//! Error types for resync-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// A stub or header could not be rendered. The caller skips the item.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Empty or non-identifier names.
    #[error("invalid stub input: {0}")]
    InvalidInput(String),
}
