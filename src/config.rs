//! Configuration for a single ingestion run.
//!
//! Each run receives its own `IngestConfig`; nothing about a run (header,
//! counters) lives in process-wide state.

use crate::constants::{
    DEFAULT_DELIMITER, DEFAULT_FILTER_NON_PRINTABLE, DEFAULT_HAS_HEADER, RESERVED_DELIMITERS,
};
use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};

/// Options controlling tokenization and header handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Single character separating fields within a line
    pub delimiter: char,

    /// Treat line 0 as field names rather than data
    pub has_header: bool,

    /// Strip characters outside printable ASCII from every field
    pub filter_non_printable: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            has_header: DEFAULT_HAS_HEADER,
            filter_non_printable: DEFAULT_FILTER_NON_PRINTABLE,
        }
    }
}

impl IngestConfig {
    /// Create configuration with a custom delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enable or disable header mode
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Enable or disable non-printable character filtering
    pub fn with_filter_non_printable(mut self, filter: bool) -> Self {
        self.filter_non_printable = filter;
        self
    }

    /// Reject delimiters that collide with the quoting dialect
    pub fn validate(&self) -> Result<()> {
        if RESERVED_DELIMITERS.contains(&self.delimiter) {
            return Err(IngestError::configuration(format!(
                "delimiter {:?} is reserved by the quoting dialect",
                self.delimiter
            )));
        }
        Ok(())
    }
}
