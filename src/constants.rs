//! Dialect characters and ingestion defaults
//!
//! The quoting dialect is fixed: double quotes toggle literal mode and a
//! doubled quote inside a quoted field is a literal quote. Only the delimiter
//! is configurable.

// =============================================================================
// Dialect Characters
// =============================================================================

/// Quote character that toggles literal interpretation of delimiters and line feeds
pub const QUOTE: char = '"';

/// Line terminator recognised by the tokenizers
pub const LINE_FEED: char = '\n';

/// Stripped from the end of a row when it immediately precedes a line feed
pub const CARRIAGE_RETURN: char = '\r';

/// UTF-8 byte-order mark; treated as whitespace during normalization
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// Literal empty quoted field; normalizes to an empty string
pub const EMPTY_QUOTED_FIELD: &str = "\"\"";

// =============================================================================
// Ingestion Defaults
// =============================================================================

/// Field delimiter used when none is configured
pub const DEFAULT_DELIMITER: char = ',';

/// Whether line 0 is treated as the header by default
pub const DEFAULT_HAS_HEADER: bool = true;

/// Whether non-printable characters are stripped from fields by default
pub const DEFAULT_FILTER_NON_PRINTABLE: bool = false;

/// Characters that cannot serve as a delimiter
pub const RESERVED_DELIMITERS: &[char] = &[QUOTE, LINE_FEED, CARRIAGE_RETURN];

/// Initial capacity of the per-line read buffer
pub const LINE_BUFFER_CAPACITY: usize = 4 * 1024;

/// Rows between progress updates in the command line front end
pub const PROGRESS_UPDATE_INTERVAL: u64 = 1_000;

/// Source label for I/O errors raised while reading from a non-file reader
pub const READER_SOURCE_LABEL: &str = "<reader>";
