//! Delimited file codec
//!
//! Reads and writes [`RecordTable`]s as delimited text with a header row.
//! Quoting follows the csv crate's defaults: fields are quoted only when they
//! contain the delimiter, a quote or a line break.

use crate::domain::{RecordError, RecordTable};
use std::fs;
use std::io;
use std::path::Path;

/// Read a delimited file with a header row.
///
/// Short rows are padded with empty cells. A row wider than the header is
/// rejected as malformed.
///
/// # Errors
///
/// Returns [`CodecError::Open`] when the file cannot be opened, so callers
/// can tell a missing file apart from bad content, and [`CodecError::Record`]
/// for anything wrong with the content itself.
pub fn read_table(path: &Path, delimiter: u8) -> Result<RecordTable, CodecError> {
    let file = fs::File::open(path).map_err(CodecError::Open)?;
    let display = path.display().to_string();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(io::BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(&display, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(&display, e))?;
        if record.len() > headers.len() {
            return Err(CodecError::Record(RecordError::Malformed {
                path: display,
                message: format!(
                    "row {} has {} fields, header has {}",
                    line + 1,
                    record.len(),
                    headers.len()
                ),
            }));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RecordTable::new(headers, rows))
}

/// Write a table with a header row, flushing every `chunk_size` rows.
///
/// Returns the number of data rows written.
pub fn write_table(
    path: &Path,
    table: &RecordTable,
    delimiter: u8,
    chunk_size: usize,
) -> Result<usize, RecordError> {
    let display = path.display().to_string();
    let write_failed = |e: csv::Error| write_error(&display, e);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(write_failed)?;

    writer
        .write_record(table.headers())
        .map_err(write_failed)?;

    let chunk_size = chunk_size.max(1);
    let mut written = 0;
    for chunk in table.rows().chunks(chunk_size) {
        for row in chunk {
            writer.write_record(row).map_err(write_failed)?;
        }
        writer
            .flush()
            .map_err(|e| write_failed(csv::Error::from(e)))?;
        written += chunk.len();
    }

    writer
        .flush()
        .map_err(|e| write_failed(csv::Error::from(e)))?;
    Ok(written)
}

/// Failure reading a delimited file
#[derive(Debug)]
pub enum CodecError {
    /// The file could not be opened
    Open(io::Error),
    /// The file was opened but its content could not be decoded
    Record(RecordError),
}

impl CodecError {
    /// Convert into a [`RecordError`] naming `path`
    pub fn into_record_error(self, path: &Path) -> RecordError {
        match self {
            CodecError::Open(e) => RecordError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            },
            CodecError::Record(e) => e,
        }
    }
}

fn write_error(path: &str, err: csv::Error) -> RecordError {
    RecordError::WriteFailed {
        path: path.to_string(),
        message: err.to_string(),
    }
}

fn malformed(path: &str, err: csv::Error) -> CodecError {
    let path = path.to_string();
    let message = err.to_string();
    if err.is_io_error() {
        CodecError::Record(RecordError::ReadFailed { path, message })
    } else {
        CodecError::Record(RecordError::Malformed { path, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_pipe_delimited() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidates.csv");
        fs::write(&path, "candidate_id|name\n1|Al\n2|\"Bo|b\"\n").unwrap();

        let table = read_table(&path, b'|').unwrap();
        assert_eq!(table.headers(), &["candidate_id", "name"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "name"), Some("Bo|b"));
    }

    #[test]
    fn test_read_pads_short_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "a|b|c\n1|2\n").unwrap();

        let table = read_table(&path, b'|').unwrap();
        assert_eq!(table.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_read_rejects_wide_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.csv");
        fs::write(&path, "a|b\n1|2|3\n").unwrap();

        let err = read_table(&path, b'|').unwrap_err();
        assert!(matches!(
            err,
            CodecError::Record(RecordError::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_missing_file_is_open_error() {
        let dir = TempDir::new().unwrap();
        let err = read_table(&dir.path().join("nope.csv"), b'|').unwrap_err();
        match err {
            CodecError::Open(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let table = read_table(&path, b'|').unwrap();
        assert!(table.headers().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_write_quotes_only_when_needed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let table = RecordTable::new(
            vec!["candidate_id".to_string(), "note".to_string()],
            vec![
                vec!["1".to_string(), "plain".to_string()],
                vec!["2".to_string(), "has|pipe".to_string()],
            ],
        );

        let written = write_table(&path, &table, b'|', 1).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "candidate_id|note\n1|plain\n2|\"has|pipe\"\n"
        );
    }

    #[test]
    fn test_write_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let table = RecordTable::new(vec!["candidate_id".to_string()], vec![]);

        assert_eq!(write_table(&path, &table, b'|', 10_000).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "candidate_id\n");
    }
}
