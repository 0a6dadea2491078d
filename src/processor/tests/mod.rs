//! Module tests for bulk and streaming file ingestion
//!
//! Fixtures are small occurrence exports written to temporary directories.


use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Occurrence export with a header and three data rows, one field quoted
pub const OCCURRENCES: &str = "gbifID,scientificName,locality,individualCount
1001,Acer rubrum,\"Burlington, VT\",3
1002,  Bufo   americanus ,Lake Champlain,1
1003,\"Turdus \"\"robin\"\" migratorius\",Stowe,12
";

/// Write `content` to `name` inside `temp_dir` and return the path
pub fn write_fixture(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
