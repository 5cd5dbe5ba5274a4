//! Errors raised while building, writing or reading a scanner LUT.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the scanner model and LUT serialisation.
#[derive(Debug, Error)]
pub enum LutError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Header error at line {line}: {message}")]
    Header { line: usize, message: String },

    #[error("Malformed LUT: {0}")]
    Format(String),
}

impl LutError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
