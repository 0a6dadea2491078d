//! Line-by-line row delivery
//!
//! [`RowStream`] reads one line at a time from any `AsyncBufRead`, tokenizes
//! it, maps it against the header and hands back a single [`RowEvent`]. It
//! never reads ahead: the next line is only requested when the consumer asks
//! for the next event, so a slow consumer stalls reading instead of buffering.

use crate::config::IngestConfig;
use crate::constants::{LINE_BUFFER_CAPACITY, READER_SOURCE_LABEL};
use crate::error::{IngestError, Result};
use crate::header::{Header, map_row};
use crate::models::{IngestionSummary, Row, RowEvent};
use crate::tokenizer::tokenize_line;

use futures::stream::{self, Stream};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Per-run context: options, the header captured at line 0, and the row count
#[derive(Debug)]
pub(crate) struct LineProcessor {
    config: IngestConfig,
    source: Option<PathBuf>,
    header: Arc<Header>,
    row_count: usize,
}

impl LineProcessor {
    pub(crate) fn new(config: IngestConfig) -> Self {
        Self {
            config,
            source: None,
            header: Arc::new(Header::default()),
            row_count: 0,
        }
    }

    /// Tokenize one line and turn it into the event for `line_index`
    pub(crate) fn process(&mut self, line_index: usize, line: &str) -> Result<RowEvent> {
        let fields = tokenize_line(
            line,
            self.config.delimiter,
            self.config.filter_non_printable,
        );

        if self.config.has_header && line_index == 0 {
            debug!("Captured header with {} fields", fields.len());
            self.header = Arc::new(Header::new(fields));
            return Ok(RowEvent::Header(Arc::clone(&self.header)));
        }

        let row = if self.config.has_header {
            let record = map_row(&self.header, fields)
                .map_err(|e| e.at_line(line_index).in_file(self.source.as_deref()))?;
            Row::Record(record)
        } else {
            Row::Fields(fields)
        };

        self.row_count += 1;
        Ok(RowEvent::Row(row))
    }
}

/// Single-pass, pull-based sequence of row events
///
/// Line indices are zero-based and count the header line. After the first
/// error the stream is finished and yields no further events.
#[derive(Debug)]
pub struct RowStream<R> {
    reader: R,
    buffer: Vec<u8>,
    processor: LineProcessor,
    next_index: usize,
    /// Last line ended on `\r`; a `\n` leading the next read belongs to it
    pending_line_feed: bool,
    finished: bool,
}

impl<R> RowStream<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R, config: IngestConfig) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(LINE_BUFFER_CAPACITY),
            processor: LineProcessor::new(config),
            next_index: 0,
            pending_line_feed: false,
            finished: false,
        }
    }

    /// Name the source file used in error messages and the summary
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.processor.source = Some(path.into());
        self
    }

    /// Read and process the next line
    ///
    /// Lines end at `\n`, `\r\n` or a lone `\r`. Returns `Ok(None)` at end of
    /// input. Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub async fn next_event(&mut self) -> Result<Option<(usize, RowEvent)>> {
        if self.finished {
            return Ok(None);
        }

        self.buffer.clear();
        let read = match self.read_line().await {
            Ok(read) => read,
            Err(e) => {
                self.finished = true;
                return Err(IngestError::io(self.source_label(), e));
            }
        };

        if read == 0 {
            self.finished = true;
            return Ok(None);
        }

        let line_index = self.next_index;
        self.next_index += 1;

        let line = String::from_utf8_lossy(&self.buffer);
        match self.processor.process(line_index, &line) {
            Ok(event) => Ok(Some((line_index, event))),
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    /// Data rows delivered so far
    pub fn row_count(&self) -> usize {
        self.processor.row_count
    }

    /// Header captured so far; empty before line 0 or when header mode is off
    pub fn header(&self) -> &Arc<Header> {
        &self.processor.header
    }

    pub fn source(&self) -> Option<&Path> {
        self.processor.source.as_deref()
    }

    pub fn into_summary(self) -> IngestionSummary {
        IngestionSummary {
            row_count: self.processor.row_count,
            header: self.processor.header,
            path: self.processor.source,
        }
    }

    /// Adapt into a `futures::Stream` of `(line_index, event)` pairs
    pub fn into_stream(self) -> impl Stream<Item = Result<(usize, RowEvent)>> {
        stream::try_unfold(self, |mut rows| async move {
            let next = rows.next_event().await?;
            Ok::<_, IngestError>(next.map(|event| (event, rows)))
        })
    }

    /// Append the next line to `buffer`, without its terminator
    ///
    /// Returns the number of bytes consumed for this line, terminator included;
    /// zero means end of input.
    async fn read_line(&mut self) -> io::Result<usize> {
        if self.pending_line_feed {
            self.pending_line_feed = false;
            if self.reader.fill_buf().await?.first() == Some(&LF) {
                self.reader.consume(1);
            }
        }

        let mut consumed = 0;
        loop {
            let (used, complete) = {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    return Ok(consumed);
                }
                match available.iter().position(|&b| b == LF || b == CR) {
                    Some(end) => {
                        self.buffer.extend_from_slice(&available[..end]);
                        let used = match (available[end], available.get(end + 1)) {
                            (CR, Some(&LF)) => end + 2,
                            // \r at the end of what is buffered; a \n may follow in the next fill
                            (CR, None) => {
                                self.pending_line_feed = true;
                                end + 1
                            }
                            _ => end + 1,
                        };
                        (used, true)
                    }
                    None => {
                        self.buffer.extend_from_slice(available);
                        (available.len(), false)
                    }
                }
            };

            self.reader.consume(used);
            consumed += used;
            if complete {
                return Ok(consumed);
            }
        }
    }

    fn source_label(&self) -> PathBuf {
        self.processor
            .source
            .clone()
            .unwrap_or_else(|| PathBuf::from(READER_SOURCE_LABEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[test]
    fn test_line_processor_counts_data_rows_only() {
        let mut processor = LineProcessor::new(IngestConfig::default());

        let header = processor.process(0, "id,name").unwrap();
        assert!(matches!(header, RowEvent::Header(ref h) if h.len() == 2));

        let row = processor.process(1, "1,Acer").unwrap();
        match row {
            RowEvent::Row(Row::Record(record)) => assert_eq!(record.get("name"), Some("Acer")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(processor.row_count, 1);
    }

    #[test]
    fn test_line_processor_without_header_keeps_arrays() {
        let mut processor = LineProcessor::new(IngestConfig::default().with_header(false));
        let event = processor.process(0, "id,name").unwrap();
        assert_eq!(
            event,
            RowEvent::Row(Row::Fields(vec!["id".to_string(), "name".to_string()]))
        );
        assert_eq!(processor.row_count, 1);
        assert!(processor.header.is_empty());
    }

    #[test]
    fn test_line_processor_mismatch_carries_line() {
        let mut processor = LineProcessor::new(IngestConfig::default());
        processor.process(0, "a,b,c").unwrap();
        let error = processor.process(4, "1,2").unwrap_err();
        assert_eq!(error.line_index(), Some(4));
    }

    #[tokio::test]
    async fn test_row_stream_strips_line_endings() {
        let input: &[u8] = b"a,b\r\n1,2\r\n3,4";
        let mut rows = RowStream::new(input, IngestConfig::default());

        let mut values = Vec::new();
        while let Some((index, event)) = rows.next_event().await.unwrap() {
            if let RowEvent::Row(row) = event {
                values.push((index, row.values().to_vec()));
            }
        }

        assert_eq!(
            values,
            vec![
                (1, vec!["1".to_string(), "2".to_string()]),
                (2, vec!["3".to_string(), "4".to_string()])
            ]
        );
        assert_eq!(rows.row_count(), 2);
        assert_eq!(rows.header().names(), ["a", "b"]);
    }

    async fn collect_lines<R: AsyncBufRead + Unpin>(reader: R) -> Vec<(usize, String)> {
        let mut rows = RowStream::new(reader, IngestConfig::default().with_header(false));
        let mut lines = Vec::new();
        while let Some((index, event)) = rows.next_event().await.unwrap() {
            if let RowEvent::Row(row) = event {
                lines.push((index, row.values().join("|")));
            }
        }
        lines
    }

    fn owned(lines: &[(usize, &str)]) -> Vec<(usize, String)> {
        lines
            .iter()
            .map(|(index, text)| (*index, text.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_row_stream_splits_on_lone_carriage_return() {
        let input: &[u8] = b"a,b\r1,2\r3,4\r";
        let mut rows = RowStream::new(input, IngestConfig::default());

        let mut count = 0;
        while let Some((_, event)) = rows.next_event().await.unwrap() {
            count += 1;
            if let RowEvent::Row(row) = event {
                assert_eq!(row.values().len(), 2);
            }
        }

        assert_eq!(count, 3);
        assert_eq!(rows.row_count(), 2);
        assert_eq!(rows.header().names(), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_row_stream_handles_mixed_line_endings() {
        let input: &[u8] = b"a\r\nb\rc\nd\r\re";
        assert_eq!(
            collect_lines(input).await,
            owned(&[(0, "a"), (1, "b"), (2, "c"), (3, "d"), (4, ""), (5, "e")])
        );
    }

    #[tokio::test]
    async fn test_row_stream_keeps_crlf_split_across_reads() {
        // A one-byte buffer forces the \r and \n into separate fills
        let input: &[u8] = b"x\r\ny\r\n";
        let reader = tokio::io::BufReader::with_capacity(1, input);
        assert_eq!(collect_lines(reader).await, owned(&[(0, "x"), (1, "y")]));
    }

    #[tokio::test]
    async fn test_row_stream_replaces_invalid_utf8() {
        let input: &[u8] = b"caf\xe9,ok\n";
        let mut rows = RowStream::new(input, IngestConfig::default().with_header(false));
        let (_, event) = rows.next_event().await.unwrap().unwrap();
        assert_eq!(
            event,
            RowEvent::Row(Row::Fields(vec!["caf\u{fffd}".to_string(), "ok".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_row_stream_finishes_after_error() {
        let input: &[u8] = b"a,b\n1\n2,3\n";
        let mut rows = RowStream::new(input, IngestConfig::default());

        assert!(rows.next_event().await.unwrap().is_some());
        assert!(rows.next_event().await.is_err());
        assert!(rows.next_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_into_stream_yields_every_event() {
        let input: &[u8] = b"a\n1\n2\n";
        let events: Vec<_> = RowStream::new(input, IngestConfig::default())
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], (0, RowEvent::Header(_))));
        assert_eq!(events[2].0, 2);
    }
}
