//! Two-state quoting state machine shared by the line and buffer tokenizers
//!
//! The delimiter and line feed are tested before the quote character. A quote
//! therefore only ever toggles the state (or, directly after another quote in
//! `Normal`, appends a literal quote); it never prevents an earlier delimiter
//! from splitting. A quote still open when the input runs out is treated as a
//! literal character and scanning resumes right after it.

use super::normalize::normalize_field;
use crate::constants::{CARRIAGE_RETURN, LINE_FEED, QUOTE};

/// Whether delimiters and line feeds are currently separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteState {
    Normal,
    InQuotes,
}

/// What a line feed does when seen in `Normal`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineBreak {
    /// Close the row and stop scanning
    Stop,
    /// Close the row and continue with a new one
    NextRow,
}

/// Position of the quote that opened the current `InQuotes` run
#[derive(Debug, Clone, Copy)]
struct OpenQuote {
    position: usize,
    field_len: usize,
}

#[derive(Debug)]
pub(crate) struct Scanner {
    delimiter: char,
    filter_non_printable: bool,
    line_break: LineBreak,
    state: QuoteState,
    previous: Option<char>,
    open_quote: Option<OpenQuote>,
    field: String,
    row: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Scanner {
    pub(crate) fn new(delimiter: char, filter_non_printable: bool, line_break: LineBreak) -> Self {
        Self {
            delimiter,
            filter_non_printable,
            line_break,
            state: QuoteState::Normal,
            previous: None,
            open_quote: None,
            field: String::new(),
            row: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Scan `text` to completion and return the closed rows
    pub(crate) fn scan(mut self, text: &str) -> Vec<Vec<String>> {
        let mut start = 0;
        let stopped = loop {
            let stopped = self.scan_from(text, start);

            // Unterminated quote: reinterpret it as a literal and rescan after it.
            // Fields and rows cannot close while in quotes, so only the open
            // field needs rewinding.
            match (self.state, self.open_quote.take()) {
                (QuoteState::InQuotes, Some(open)) => {
                    self.field.truncate(open.field_len);
                    self.field.push(QUOTE);
                    self.state = QuoteState::Normal;
                    self.previous = Some(QUOTE);
                    start = open.position + QUOTE.len_utf8();
                }
                _ => break stopped,
            }
        };

        if !stopped {
            self.finish();
        }
        self.rows
    }

    /// Returns true when a line feed stopped the scan
    fn scan_from(&mut self, text: &str, start: usize) -> bool {
        for (offset, c) in text[start..].char_indices() {
            let normal = self.state == QuoteState::Normal;

            if c == self.delimiter && normal {
                self.close_field();
                self.previous = None;
                continue;
            }

            if c == LINE_FEED && normal {
                if self.previous == Some(CARRIAGE_RETURN) && self.field.ends_with(CARRIAGE_RETURN) {
                    self.field.pop();
                }
                self.close_row();
                self.previous = None;
                match self.line_break {
                    LineBreak::Stop => return true,
                    LineBreak::NextRow => continue,
                }
            }

            if c == QUOTE {
                match self.state {
                    QuoteState::Normal => {
                        let field_len = self.field.len();
                        if self.previous == Some(QUOTE) {
                            self.field.push(QUOTE);
                        }
                        self.state = QuoteState::InQuotes;
                        self.open_quote = Some(OpenQuote {
                            position: start + offset,
                            field_len,
                        });
                    }
                    QuoteState::InQuotes => {
                        self.state = QuoteState::Normal;
                        self.open_quote = None;
                    }
                }
            } else {
                self.field.push(c);
            }

            self.previous = Some(c);
        }

        false
    }

    fn finish(&mut self) {
        let ended_on_line_feed = self.line_break == LineBreak::NextRow
            && !self.rows.is_empty()
            && self.row.is_empty()
            && self.field.is_empty()
            && self.previous.is_none();

        if !ended_on_line_feed {
            self.close_row();
        }
    }

    fn close_field(&mut self) {
        let raw = std::mem::take(&mut self.field);
        self.row
            .push(normalize_field(&raw, self.filter_non_printable));
    }

    fn close_row(&mut self) {
        self.close_field();
        self.rows.push(std::mem::take(&mut self.row));
    }
}
