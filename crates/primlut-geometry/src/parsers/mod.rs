//! Parsers for PRIM geometry files.
//!
//! A PRIM file is a flat list of placed physical volumes. Each volume is a
//! block of directives (`#/PVName`, `/Origin`, `/BaseVector`, `/Box`, ...)
//! closed by a line of dashes:
//!
//! ```text
//! #/PVName crystal.12
//! /Origin 10 0 5
//! /BaseVector 0 1 0 -1 0 0
//! /Box 2 2 2
//! #--------------------
//! ```

pub mod directive;
pub mod segment;

use std::path::{Path, PathBuf};

use primlut_core::{LutError, Scanner};
use thiserror::Error;

use segment::{ParseSummary, SegmentRules};

/// Errors during PRIM file parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    FormatError { line: usize, message: String },

    #[error(transparent)]
    Scanner(#[from] LutError),
}

/// Read a PRIM file from disk and feed it into `scanner`.
pub fn parse_prim_file(
    path: &Path,
    scanner: &mut Scanner,
    rules: &SegmentRules,
) -> Result<ParseSummary, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Parsing PRIM file {}", path.display());
    segment::parse_prim(&content, scanner, rules)
}
