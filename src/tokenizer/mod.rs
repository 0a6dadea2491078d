//! Quote-tolerant tokenizers for delimited text
//!
//! Both tokenizers share one quoting state machine and the same field
//! normalization ([`normalize`]):
//! - [`tokenize_line`] splits a single line into fields and stops at the first
//!   unquoted line feed.
//! - [`tokenize_buffer`] splits a whole in-memory buffer into rows, honouring
//!   line feeds embedded in quoted fields.
//!
//! ## Dialect
//!
//! The dialect is deliberately not RFC 4180. Delimiters are tested before
//! quotes, a doubled quote directly after a quote appends a literal quote, and
//! an unbalanced quote never swallows the rest of the input:
//!
//! ```rust
//! use delimited_ingest::tokenizer::tokenize_line;
//!
//! assert_eq!(tokenize_line(r#"a,"b,c",d"#, ',', false), vec!["a", "b,c", "d"]);
//! assert_eq!(tokenize_line(r#""He said ""hi""""#, ',', false), vec![r#"He said "hi""#]);
//! assert_eq!(tokenize_line(r#"a,"b,c"#, ',', false), vec!["a", "\"b", "c"]);
//! ```

pub mod normalize;
mod scanner;

pub use normalize::normalize_field;

use scanner::{LineBreak, Scanner};

/// Split one line of delimited text into normalized fields
///
/// Always yields at least one field; an empty line yields a single empty field.
pub fn tokenize_line(line: &str, delimiter: char, filter_non_printable: bool) -> Vec<String> {
    Scanner::new(delimiter, filter_non_printable, LineBreak::Stop)
        .scan(line)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Split an in-memory buffer into rows of normalized fields
///
/// A carriage return directly before a line feed is dropped, and a buffer
/// ending in a line feed does not produce a trailing empty row.
pub fn tokenize_buffer(
    text: &str,
    delimiter: char,
    filter_non_printable: bool,
) -> Vec<Vec<String>> {
    Scanner::new(delimiter, filter_non_printable, LineBreak::NextRow).scan(text)
}
