//! File ingestion in bulk and streaming modes.
//!
//! Both modes share one pipeline: read a line, tokenize it, map it against
//! the header, deliver it. Bulk mode keeps every row and returns them
//! together; streaming mode hands each row to a caller-supplied handler and
//! keeps nothing. A field-count mismatch or I/O failure aborts either mode at
//! the offending line; bulk mode discards what it had collected and streaming
//! mode makes no further handler calls.

pub mod streaming;

#[cfg(test)]
pub mod tests;

pub use self::streaming::RowStream;

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::header::Record;
use crate::models::{IngestionResult, IngestionSummary, Row, RowEvent};

use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{error, info};

/// Ingests delimited files with a fixed configuration
#[derive(Debug, Clone)]
pub struct FileIngestor {
    config: IngestConfig,
}

impl FileIngestor {
    /// Create an ingestor, rejecting delimiters the dialect reserves
    pub fn new(config: IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Open `path` as a pull-based row stream
    pub async fn open(&self, path: &Path) -> Result<RowStream<BufReader<File>>> {
        let file = File::open(path)
            .await
            .map_err(|e| IngestError::io(path, e))?;
        Ok(RowStream::new(BufReader::new(file), self.config.clone()).with_source(path))
    }

    /// Ingest a whole file, materializing every row
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestionResult> {
        self.log_start("bulk", path);
        let result = match self.open(path).await {
            Ok(rows) => collect_rows(rows).await,
            Err(e) => Err(e),
        };
        log_outcome(path, result.as_ref().map(|r| r.row_count));
        result
    }

    /// Ingest a file, calling `on_row(event, line_index)` once per line
    ///
    /// In header mode the first call carries the header at line index 0. An
    /// error returned by the handler stops ingestion and is propagated.
    pub async fn ingest_file_streaming<F>(&self, path: &Path, on_row: F) -> Result<IngestionSummary>
    where
        F: FnMut(RowEvent, usize) -> Result<()>,
    {
        self.log_start("streaming", path);
        let summary = match self.open(path).await {
            Ok(rows) => deliver_rows(rows, on_row).await,
            Err(e) => Err(e),
        };
        log_outcome(path, summary.as_ref().map(|s| s.row_count));
        summary
    }

    /// Ingest a file in header mode and return only the keyed records
    pub async fn ingest_records(&self, path: &Path) -> Result<Vec<Record>> {
        let ingestor = Self {
            config: self.config.clone().with_header(true),
        };
        let result = ingestor.ingest_file(path).await?;
        Ok(result.rows.into_iter().filter_map(Row::into_record).collect())
    }

    /// Bulk mode over an arbitrary reader
    pub async fn ingest_reader<R>(&self, reader: R) -> Result<IngestionResult>
    where
        R: AsyncBufRead + Unpin,
    {
        collect_rows(RowStream::new(reader, self.config.clone())).await
    }

    /// Streaming mode over an arbitrary reader
    pub async fn ingest_reader_streaming<R, F>(
        &self,
        reader: R,
        on_row: F,
    ) -> Result<IngestionSummary>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut(RowEvent, usize) -> Result<()>,
    {
        deliver_rows(RowStream::new(reader, self.config.clone()), on_row).await
    }

    fn log_start(&self, mode: &str, path: &Path) {
        info!(
            "Ingesting {} ({} mode, delimiter {:?}, header: {}, filter non-printable: {})",
            path.display(),
            mode,
            self.config.delimiter,
            self.config.has_header,
            self.config.filter_non_printable
        );
    }
}

/// Ingest a whole file with `config`, materializing every row
pub async fn ingest_file(path: &Path, config: &IngestConfig) -> Result<IngestionResult> {
    FileIngestor::new(config.clone())?.ingest_file(path).await
}

/// Ingest a file with `config`, delivering rows to `on_row` as they are read
pub async fn ingest_file_streaming<F>(
    path: &Path,
    config: &IngestConfig,
    on_row: F,
) -> Result<IngestionSummary>
where
    F: FnMut(RowEvent, usize) -> Result<()>,
{
    FileIngestor::new(config.clone())?
        .ingest_file_streaming(path, on_row)
        .await
}

async fn collect_rows<R>(mut rows: RowStream<R>) -> Result<IngestionResult>
where
    R: AsyncBufRead + Unpin,
{
    let mut collected = Vec::new();
    while let Some((_, event)) = rows.next_event().await? {
        if let RowEvent::Row(row) = event {
            collected.push(row);
        }
    }

    let summary = rows.into_summary();
    Ok(IngestionResult {
        rows: collected,
        row_count: summary.row_count,
        header: summary.header,
    })
}

async fn deliver_rows<R, F>(mut rows: RowStream<R>, mut on_row: F) -> Result<IngestionSummary>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(RowEvent, usize) -> Result<()>,
{
    while let Some((line_index, event)) = rows.next_event().await? {
        on_row(event, line_index)?;
    }
    Ok(rows.into_summary())
}

fn log_outcome(path: &Path, outcome: std::result::Result<usize, &IngestError>) {
    match outcome {
        Ok(row_count) => info!(
            "File {} processed and closed: {} rows",
            path.display(),
            row_count
        ),
        Err(e) => error!("Failed to ingest {}: {}", path.display(), e),
    }
}
