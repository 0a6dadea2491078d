//! Command-line interface components.

use crate::config::IngestConfig;
use crate::constants::{DEFAULT_DELIMITER, PROGRESS_UPDATE_INTERVAL};
use crate::error::IngestError;
use crate::header::reconstruct_line;
use crate::models::{Row, RowEvent};
use crate::processor::FileIngestor;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "delimited-ingest")]
#[command(about = "Tokenize and ingest delimited occurrence exports")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Files to ingest; glob patterns are expanded
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<String>,

    /// Field delimiter: a single character, or "tab"
    #[arg(short, long, default_value_t = DEFAULT_DELIMITER, value_parser = parse_delimiter)]
    pub delimiter: char,

    /// Treat line 0 as data instead of a header
    #[arg(long)]
    pub no_header: bool,

    /// Strip characters outside printable ASCII from every field
    #[arg(long)]
    pub filter_ascii: bool,

    /// Ingestion mode
    #[arg(long, value_enum, default_value_t = Mode::Stream)]
    pub mode: Mode,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Materialize every row before output
    Bulk,
    /// Deliver rows one at a time without retaining them
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-file summary on stdout
    Summary,
    /// One JSON value per data row
    Jsonl,
    /// Cleaned delimited text, header included
    Text,
}

impl Args {
    /// Build the ingestion configuration from the flags
    pub fn to_config(&self) -> IngestConfig {
        IngestConfig::default()
            .with_delimiter(self.delimiter)
            .with_header(!self.no_header)
            .with_filter_non_printable(self.filter_ascii)
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Parse a delimiter flag; accepts a single character, `tab` or `\t`
pub fn parse_delimiter(value: &str) -> std::result::Result<char, String> {
    match value {
        "tab" | "\\t" => return Ok('\t'),
        "pipe" => return Ok('|'),
        _ => {}
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!(
            "delimiter must be a single character, got {:?}",
            value
        )),
    }
}

/// Expand glob patterns; plain paths pass through unchanged
pub fn expand_paths(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(input));
            continue;
        }

        let mut matched: Vec<PathBuf> = glob::glob(input)
            .with_context(|| format!("Invalid glob pattern: {}", input))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();

        if matched.is_empty() {
            anyhow::bail!("No files match pattern: {}", input);
        }

        matched.sort();
        debug!("Pattern {} matched {} files", input, matched.len());
        paths.extend(matched);
    }

    Ok(paths)
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("delimited_ingest={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Outcome of ingesting one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub row_count: usize,
    pub header_fields: usize,
    pub elapsed_ms: u128,
}

/// Ingest every requested file in order, stopping at the first failure
pub async fn run(args: Args) -> Result<Vec<FileReport>> {
    let ingestor = FileIngestor::new(args.to_config()).context("Invalid ingestion options")?;
    let paths = expand_paths(&args.paths)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut reports = Vec::with_capacity(paths.len());

    for path in paths {
        let report = match args.mode {
            Mode::Bulk => ingest_bulk(&ingestor, &path, args.format, &mut out).await,
            Mode::Stream => ingest_streaming(&ingestor, &path, args.format, &mut out).await,
        }
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

        if args.format == OutputFormat::Summary {
            print_report(&mut out, &report, args.mode)?;
        }
        reports.push(report);
    }

    out.flush().context("Failed to flush output")?;
    Ok(reports)
}

async fn ingest_bulk<W: Write>(
    ingestor: &FileIngestor,
    path: &Path,
    format: OutputFormat,
    out: &mut W,
) -> Result<FileReport> {
    let start = Instant::now();
    let result = ingestor.ingest_file(path).await?;
    let delimiter = ingestor.config().delimiter;

    if format == OutputFormat::Text && !result.header.is_empty() {
        writeln!(out, "{}", reconstruct_line(result.header.names(), delimiter))?;
    }
    for row in &result.rows {
        write_row(out, row, format, delimiter)?;
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        row_count: result.row_count,
        header_fields: result.header.len(),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

async fn ingest_streaming<W: Write>(
    ingestor: &FileIngestor,
    path: &Path,
    format: OutputFormat,
    out: &mut W,
) -> Result<FileReport> {
    let start = Instant::now();
    let delimiter = ingestor.config().delimiter;

    let progress = if format == OutputFormat::Summary {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} rows {msg}")
                .unwrap()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        pb.set_message(path.display().to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut rows_seen: u64 = 0;
    let summary = ingestor
        .ingest_file_streaming(path, |event, _| {
            match event {
                RowEvent::Header(header) => {
                    if format == OutputFormat::Text {
                        writeln!(out, "{}", reconstruct_line(header.names(), delimiter))
                            .map_err(|e| IngestError::handler(e.to_string()))?;
                    }
                }
                RowEvent::Row(row) => {
                    write_row(out, &row, format, delimiter)
                        .map_err(|e| IngestError::handler(e.to_string()))?;
                    advance_progress(&progress, &mut rows_seen);
                }
            }
            Ok(())
        })
        .await;

    progress.set_position(rows_seen);
    progress.finish_and_clear();
    let summary = summary?;

    Ok(FileReport {
        path: path.to_path_buf(),
        row_count: summary.row_count,
        header_fields: summary.header.len(),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

/// Count one data row, refreshing the spinner every few rows
fn advance_progress(progress: &ProgressBar, rows_seen: &mut u64) {
    *rows_seen += 1;
    if *rows_seen % PROGRESS_UPDATE_INTERVAL == 0 {
        progress.set_position(*rows_seen);
    }
}

fn write_row<W: Write>(out: &mut W, row: &Row, format: OutputFormat, delimiter: char) -> Result<()> {
    match format {
        OutputFormat::Summary => {}
        OutputFormat::Jsonl => {
            serde_json::to_writer(&mut *out, row)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{}", reconstruct_line(row.values(), delimiter))?;
        }
    }
    Ok(())
}

fn print_report<W: Write>(out: &mut W, report: &FileReport, mode: Mode) -> Result<()> {
    writeln!(out, "{}", report.path.display().to_string().bright_green().bold())?;
    writeln!(
        out,
        "  {} {:?}",
        "Mode:".bright_cyan(),
        mode
    )?;
    writeln!(
        out,
        "  {} {}",
        "Rows:".bright_cyan(),
        report.row_count.to_string().bright_white().bold()
    )?;
    if report.header_fields > 0 {
        writeln!(
            out,
            "  {} {}",
            "Header fields:".bright_cyan(),
            report.header_fields.to_string().bright_white()
        )?;
    }
    writeln!(
        out,
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        report.elapsed_ms.to_string().bright_white()
    )?;
    Ok(())
}
