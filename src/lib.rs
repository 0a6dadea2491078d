//! Delimited Ingest Library
//!
//! A Rust library for turning delimited-text exports (occurrence downloads,
//! checklist dumps, spreadsheet extracts) into header-keyed rows.
//!
//! This library provides tools for:
//! - Tokenizing lines or whole buffers with a quote-tolerant dialect
//! - Mapping rows against a header captured from line 0
//! - Ingesting files in bulk, or streaming them row by row without retaining rows
//! - Reporting field-count mismatches with the file and line that caused them
//!
//! ## Usage
//!
//! ```rust,no_run
//! use delimited_ingest::{IngestConfig, RowEvent, ingest_file_streaming};
//! use std::path::Path;
//!
//! # async fn example() -> delimited_ingest::Result<()> {
//! let config = IngestConfig::default().with_delimiter('\t');
//! let summary = ingest_file_streaming(Path::new("occurrence.txt"), &config, |event, line| {
//!     if let RowEvent::Row(row) = event {
//!         println!("{line}: {:?}", row.values());
//!     }
//!     Ok(())
//! })
//! .await?;
//!
//! println!("{} rows", summary.row_count);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod processor;
pub mod tokenizer;

// Re-export commonly used types
pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use header::{Header, MappedLine, Record, map_line, map_row, reconstruct_line};
pub use models::{IngestionResult, IngestionSummary, Row, RowEvent};
pub use processor::{FileIngestor, RowStream, ingest_file, ingest_file_streaming};
pub use tokenizer::{normalize_field, tokenize_buffer, tokenize_line};
