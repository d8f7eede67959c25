//! Error types for resync-sync.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use resync_core::{ConfigError, LoadError};
use resync_renderer::RenderError;

/// Errors that abort a run before anything is written.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A module failed to load.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// The stub templates could not be built.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The external formatter failed. The unformatted text is used instead.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("formatter command is empty")]
    EmptyCommand,

    #[error("failed to start formatter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("formatter timed out after {}s", .timeout.as_secs())]
    TimedOut { timeout: Duration },

    #[error("formatter exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("formatter output is not valid UTF-8")]
    NotUtf8,
}

/// A single file could not be written. Other files are unaffected.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
