//! Header capture and header-to-row mapping.
//!
//! A [`Header`] is captured once per run from line 0 and shared read-only by
//! every [`Record`] built from it. Mapping a row checks that its field count
//! matches the header; the ingestor attaches the line index and path to any
//! mismatch before aborting the run.

use crate::constants::{LINE_FEED, QUOTE};
use crate::error::{IngestError, Result};
use crate::tokenizer::tokenize_line;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered field names from the header line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    /// Build a header from tokenized field names
    ///
    /// When a name repeats, lookups resolve to its last column.
    pub fn new(names: Vec<String>) -> Self {
        let positions = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();
        Self { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column index for a field name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.names)
    }
}

/// A data row keyed by header field names (object form)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<String>,
}

impl Record {
    /// Value for a header field name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.header
            .position(name)
            .and_then(|index| self.values.get(index))
            .map(String::as_str)
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    /// Values in header order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    /// `(name, value)` pairs in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .names()
            .iter()
            .zip(&self.values)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    /// Serializes as a map; a repeated header name appears once with its last value
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (index, (name, value)) in self.iter().enumerate() {
            if self.header.position(name) == Some(index) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// Pair header names with row values
///
/// Fails with [`IngestError::FieldCountMismatch`] when the row length differs
/// from the header length.
pub fn map_row(header: &Arc<Header>, row: Vec<String>) -> Result<Record> {
    if row.len() != header.len() {
        return Err(IngestError::field_count_mismatch(header.len(), row.len()));
    }

    Ok(Record {
        header: Arc::clone(header),
        values: row,
    })
}

/// Rebuild a delimited text line from normalized values
///
/// Values holding the delimiter, a quote or a line feed are quoted with inner
/// quotes doubled, so the line tokenizes back to the same values.
pub fn reconstruct_line<S: AsRef<str>>(values: &[S], delimiter: char) -> String {
    let mut line = String::new();
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            line.push(delimiter);
        }
        let value = value.as_ref();
        if value.contains([delimiter, QUOTE, LINE_FEED]) {
            line.push(QUOTE);
            for c in value.chars() {
                if c == QUOTE {
                    line.push(QUOTE);
                }
                line.push(c);
            }
            line.push(QUOTE);
        } else {
            line.push_str(value);
        }
    }
    line
}

/// A single line mapped against a header line, in all three forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedLine {
    /// Ordered normalized values
    pub fields: Vec<String>,
    /// Values keyed by header field name
    pub record: Record,
    /// Reconstructed delimited text built from the normalized values
    pub text: String,
}

/// Tokenize a header line and a data line with the same options and map them
pub fn map_line(
    header_line: &str,
    line: &str,
    delimiter: char,
    filter_non_printable: bool,
) -> Result<MappedLine> {
    let header = Arc::new(Header::new(tokenize_line(
        header_line,
        delimiter,
        filter_non_printable,
    )));
    let fields = tokenize_line(line, delimiter, filter_non_printable);
    let text = reconstruct_line(&fields, delimiter);
    let record = map_row(&header, fields.clone())?;

    Ok(MappedLine {
        fields,
        record,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Arc<Header> {
        Arc::new(Header::new(names.iter().map(|s| s.to_string()).collect()))
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_row_pairs_by_position() {
        let header = header(&["gbifID", "scientificName", "stateProvince"]);
        let record = map_row(&header, row(&["1", "Acer rubrum", "Vermont"])).unwrap();

        assert_eq!(record.get("scientificName"), Some("Acer rubrum"));
        assert_eq!(record.get("stateProvince"), Some("Vermont"));
        assert_eq!(record.get("county"), None);
        assert_eq!(
            record.iter().collect::<Vec<_>>(),
            vec![
                ("gbifID", "1"),
                ("scientificName", "Acer rubrum"),
                ("stateProvince", "Vermont")
            ]
        );
    }

    #[test]
    fn test_map_row_rejects_count_mismatch() {
        let header = header(&["a", "b", "c"]);
        let error = map_row(&header, row(&["1", "2"])).unwrap_err();

        match error {
            IngestError::FieldCountMismatch {
                expected,
                found,
                line_index,
                ..
            } => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
                assert_eq!(line_index, None);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_names_resolve_to_last_column() {
        let header = header(&["id", "name", "id"]);
        let record = map_row(&header, row(&["1", "x", "2"])).unwrap();
        assert_eq!(record.get("id"), Some("2"));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"x","id":"2"}"#);
    }

    #[test]
    fn test_record_serializes_in_header_order() {
        let header = header(&["z", "a"]);
        let record = map_row(&header, row(&["1", "2"])).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"z":"1","a":"2"}"#);
        assert_eq!(serde_json::to_string(&*header).unwrap(), r#"["z","a"]"#);
    }

    #[test]
    fn test_reconstruct_quotes_only_when_needed() {
        let values = row(&["a", "b,c", r#"He said "hi""#, ""]);
        assert_eq!(
            reconstruct_line(&values, ','),
            r#"a,"b,c","He said ""hi""","#
        );
        assert_eq!(reconstruct_line(&row(&["a", "b,c"]), '\t'), "a\tb,c");
    }

    #[test]
    fn test_reconstructed_line_retokenizes_to_same_row() {
        let cases = [
            r#"  a ,"b, c",  "He said ""hi""" ,d"#,
            "plain,values,only",
            r#""" , x ,"quote "" inside""#,
        ];
        for case in cases {
            let once = tokenize_line(case, ',', false);
            let again = tokenize_line(&reconstruct_line(&once, ','), ',', false);
            assert_eq!(again, once, "input: {case}");
        }
    }

    #[test]
    fn test_map_line_returns_all_forms() {
        let mapped = map_line("id, name ,notes", "7,  Bufo   americanus ,\"a, b\"", ',', false)
            .unwrap();

        assert_eq!(mapped.fields, vec!["7", "Bufo americanus", "a, b"]);
        assert_eq!(mapped.record.get("name"), Some("Bufo americanus"));
        assert_eq!(mapped.text, "7,Bufo americanus,\"a, b\"");
    }

    #[test]
    fn test_map_line_mismatch() {
        let result = map_line("a,b", "1,2,3", ',', false);
        assert!(matches!(
            result,
            Err(IngestError::FieldCountMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }
}
