//! Error taxonomy for index registration.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Every way a registration step can fail.
///
/// A name that is already present is not an error; see
/// [`Insertion::Duplicate`](crate::editor::Insertion::Duplicate).
#[derive(Debug, Error)]
pub enum IndexError {
    /// The repository name cannot be used as a directory and link target.
    #[error("invalid repository name {name:?}: {reason}")]
    Usage {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Creating, reading or writing a file failed.
    #[error("cannot access {}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A document does not have the structure the registrar edits.
    #[error("{}: {reason}", path.display())]
    Parse {
        /// The document.
        path: PathBuf,
        /// What was expected and not found.
        reason: String,
    },

    /// A template file cannot be parsed or rendered.
    #[error("{}: template error: {reason}", path.display())]
    Template {
        /// The template file.
        path: PathBuf,
        /// The engine's description of the failure.
        reason: String,
    },

    /// The manifest is not a JSON array of strings.
    #[error("malformed manifest {}", path.display())]
    Decode {
        /// The manifest file.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl IndexError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
