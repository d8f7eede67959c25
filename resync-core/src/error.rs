//! Error types for resync-core.

use std::path::PathBuf;

use thiserror::Error;

/// A module could not be loaded. Always fatal for a run.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O failure while enumerating or reading a module.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The module directory does not exist.
    #[error("module not found at {}", .path.display())]
    NotFound { path: PathBuf },

    /// The module directory contains no `.go` files.
    #[error("no source files in {}", .path.display())]
    NoSourceFiles { path: PathBuf },

    /// A source file failed to parse.
    #[error("{}:{line}:{column}: {message}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Files of one module declare different packages.
    #[error("{} declares package {found}, expected {expected}", .path.display())]
    MixedPackages {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// The same receiver-qualified name is declared twice.
    #[error("{name} declared in both {} and {}", .first.display(), .second.display())]
    Duplicate {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Errors raised while loading `resync.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the file path and serde_yaml's line context.
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting was given neither in the file nor on the command line.
    #[error("missing setting `{field}`")]
    Missing { field: &'static str },
}

/// Convenience constructor for [`LoadError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.into(),
        source,
    }
}
