//! Row and result types produced by ingestion.

use crate::header::{Header, Record};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// One data line, positional or keyed by header name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Row {
    /// Array form, used when header mode is off
    Fields(Vec<String>),
    /// Object form, used when header mode is on
    Record(Record),
}

impl Row {
    /// Values in column order regardless of form
    pub fn values(&self) -> &[String] {
        match self {
            Row::Fields(fields) => fields,
            Row::Record(record) => record.values(),
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Row::Record(record) => Some(record),
            Row::Fields(_) => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Row::Record(record) => Some(record),
            Row::Fields(_) => None,
        }
    }
}

/// What a streaming consumer receives for one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    /// The captured header, delivered once at line index 0 in header mode
    Header(Arc<Header>),
    /// A data row
    Row(Row),
}

/// Bulk ingestion output with every row materialized
#[derive(Debug, Clone, Serialize)]
pub struct IngestionResult {
    pub rows: Vec<Row>,

    /// Data rows processed, excluding the header line
    pub row_count: usize,

    /// Captured header; empty when header mode is off
    pub header: Arc<Header>,
}

/// Streaming ingestion output; rows were handed to the caller and not retained
#[derive(Debug, Clone, Serialize)]
pub struct IngestionSummary {
    pub row_count: usize,
    pub header: Arc<Header>,
    /// Source file, when ingesting from disk
    pub path: Option<PathBuf>,
}
