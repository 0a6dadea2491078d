//! Error handling for delimited-text ingestion.
//!
//! Structural problems (a row whose field count disagrees with the header, or
//! a file that cannot be read) abort the run and carry enough context to find
//! the offending line. Malformed quoting is never an error: the tokenizer
//! absorbs it and produces a best-effort split.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(
        "Field count mismatch{}: expected {expected} fields, found {found}",
        describe_location(.path, .line_index)
    )]
    FieldCountMismatch {
        path: Option<PathBuf>,
        line_index: Option<usize>,
        expected: usize,
        found: usize,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Row handler aborted ingestion: {message}")]
    Handler { message: String },
}

impl IngestError {
    /// Create a field count mismatch without location context
    pub fn field_count_mismatch(expected: usize, found: usize) -> Self {
        Self::FieldCountMismatch {
            path: None,
            line_index: None,
            expected,
            found,
        }
    }

    /// Create an I/O error for the given source path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an error a row handler returns to stop ingestion
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }

    /// Attach a zero-based line index to a field count mismatch
    pub fn at_line(mut self, index: usize) -> Self {
        if let Self::FieldCountMismatch { line_index, .. } = &mut self {
            *line_index = Some(index);
        }
        self
    }

    /// Attach the source path to a field count mismatch
    pub fn in_file(mut self, source: Option<&Path>) -> Self {
        if let (Self::FieldCountMismatch { path, .. }, Some(source)) = (&mut self, source) {
            *path = Some(source.to_path_buf());
        }
        self
    }

    /// Zero-based line index of the failing row, when known
    pub fn line_index(&self) -> Option<usize> {
        match self {
            Self::FieldCountMismatch { line_index, .. } => *line_index,
            _ => None,
        }
    }
}

fn describe_location(path: &Option<PathBuf>, line_index: &Option<usize>) -> String {
    match (path, line_index) {
        (Some(path), Some(line)) => format!(" in {} at line {}", path.display(), line),
        (Some(path), None) => format!(" in {}", path.display()),
        (None, Some(line)) => format!(" at line {}", line),
        (None, None) => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
