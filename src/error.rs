// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading benchmark inputs, generating datasets or
/// evaluating classifier output.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying filesystem failure, tagged with the path involved.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited table row does not have the expected shape.
    #[error("{}:{line}: {message}", path.display())]
    MalformedTable {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The same identifier appears twice in a table that requires unique keys.
    #[error("{}: duplicate identifier '{id}'", path.display())]
    DuplicateId { path: PathBuf, id: String },

    /// A results directory does not follow `<dataset>-iter<i>/<...>/<method>/<params>`.
    #[error("{}: {message}", path.display())]
    Layout { path: PathBuf, message: String },

    /// Parameters that cannot produce a valid run.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedTable {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn layout(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Layout {
            path: path.into(),
            message: message.into(),
        }
    }
}
