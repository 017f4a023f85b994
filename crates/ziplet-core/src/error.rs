//! Error types for ziplet-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for the ziplet library
#[derive(Error, Debug)]
pub enum Error {
    /// An input path or the archive to unpack does not exist
    #[error("Not found: {0:?}")]
    NotFound(PathBuf),

    /// The destination archive name carries an extension that is not recognized
    #[error("Invalid archive extension {extension:?} for {path:?}")]
    InvalidExtension {
        path: PathBuf,
        extension: Option<String>,
    },

    /// Filesystem create/write failure unrelated to entry content
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A specific entry could not be read or written
    #[error("Entry error for {path:?}: {reason}")]
    Entry { path: PathBuf, reason: String },

    /// The supplied password failed the codec's integrity check
    #[error("Bad password for entry: {0}")]
    BadPassword(String),

    /// An archive entry would be written outside the destination root
    #[error("Path traversal attempt detected: {0}")]
    PathTraversal(String),

    /// The container itself is malformed or unsupported
    #[error("Zip error: {0}")]
    Zip(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn entry(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Entry {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Zip(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
