//! Streaming ingestion of delimited text into a compact vector.
//!
//! Rows are read one line at a time; only the encoded fields are kept, so a
//! file never has to be materialized as `f64`s. A row whose selected field is
//! missing or not a number is skipped with a warning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CompactError;
use crate::vector::CompactVector;

/// Largest row count used to presize fields from a truncation limit.
const PRESIZE_LIMIT: usize = 1 << 16;

/// Default field separator.
pub const DEFAULT_DELIMITER: char = ';';

/// Default 0-based column holding the values.
pub const DEFAULT_COLUMN: usize = 1;

/// Where and how to read values from a delimited text file.
///
/// # Example
/// ```
/// use compact_float_rs::TextSource;
///
/// let source = TextSource::new("readings.csv").column(2).delimiter(',').truncate(500);
/// assert_eq!(source.column, 2);
/// assert_eq!(source.truncate, Some(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSource {
    /// File to read.
    pub path: PathBuf,
    /// 0-based column to parse.
    pub column: usize,
    /// Field separator.
    pub delimiter: char,
    /// Read at most this many physical rows.
    pub truncate: Option<usize>,
}

impl TextSource {
    /// A source reading `path` with the default column and delimiter.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TextSource {
            path: path.into(),
            column: DEFAULT_COLUMN,
            delimiter: DEFAULT_DELIMITER,
            truncate: None,
        }
    }

    /// Set the column to parse.
    pub fn column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Set the field separator.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Stop after `rows` physical rows.
    pub fn truncate(mut self, rows: usize) -> Self {
        self.truncate = Some(rows);
        self
    }
}

impl Default for TextSource {
    fn default() -> Self {
        TextSource::new(PathBuf::new())
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_field(line: &str, column: usize, delimiter: char) -> Option<f64> {
    line.split(delimiter).nth(column)?.trim().parse().ok()
}

impl CompactVector {
    /// Fill the vector from column `column` of a `delimiter`-separated file.
    ///
    /// The vector is resized to the number of values parsed. With
    /// `truncate: Some(n)` only the first `n` rows are read. Returns the new
    /// length.
    ///
    /// A capacity error aborts ingestion and leaves the vector as it was.
    pub fn fill_from_text_records(
        &mut self,
        path: impl AsRef<Path>,
        column: usize,
        delimiter: char,
        truncate: Option<usize>,
    ) -> Result<usize, CompactError> {
        if self.is_destroyed() {
            return Err(CompactError::Destroyed);
        }
        let path = path.as_ref();
        debug!(path = %path.display(), column, "reading text records");
        let reader = BufReader::new(File::open(path)?);
        self.fill_from_reader(reader, column, delimiter, truncate)
    }

    /// [`fill_from_text_records`](Self::fill_from_text_records) driven by a [`TextSource`].
    pub fn fill_from_source(&mut self, source: &TextSource) -> Result<usize, CompactError> {
        self.fill_from_text_records(
            &source.path,
            source.column,
            source.delimiter,
            source.truncate,
        )
    }

    /// Fill the vector from delimited rows read from any buffered reader.
    pub fn fill_from_reader<R: BufRead>(
        &mut self,
        mut reader: R,
        column: usize,
        delimiter: char,
        truncate: Option<usize>,
    ) -> Result<usize, CompactError> {
        if self.is_destroyed() {
            return Err(CompactError::Destroyed);
        }

        let presize = truncate.map_or(0, |rows| rows.min(PRESIZE_LIMIT));
        let mut staged = CompactVector::growable(*self.codec(), presize);
        let mut buf = Vec::new();
        let mut rows = 0;
        let mut skipped = 0;

        loop {
            if truncate.is_some_and(|limit| rows >= limit) {
                break;
            }
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            rows += 1;

            let value = std::str::from_utf8(trim_line_ending(&buf))
                .ok()
                .and_then(|line| parse_field(line, column, delimiter));
            match value {
                Some(value) => staged.push(value)?,
                None => {
                    skipped += 1;
                    warn!(row = rows, column, "skipping row without a numeric value");
                }
            }
        }

        if let Some(limit) = truncate {
            if limit > rows {
                warn!(requested = limit, available = rows, "truncation exceeds row count");
            }
        }

        let len = staged.len();
        self.replace_fields_from(staged)?;
        debug!(rows, skipped, len, "ingested text records");
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::FieldWidth;
    use std::io::Cursor;

    fn vector() -> CompactVector {
        CompactVector::new(2, FieldWidth::W16).unwrap()
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("a;1.5", 1, ';'), Some(1.5));
        assert_eq!(parse_field(" 3 , -2.25 ", 1, ','), Some(-2.25));
        assert_eq!(parse_field("a;b", 1, ';'), None);
        assert_eq!(parse_field("only", 1, ';'), None);
        assert!(parse_field("x;NaN", 1, ';').unwrap().is_nan());
    }

    #[test]
    fn test_reader_ingestion_sizes_vector() {
        let text = "t0;1.25\nt1;-3.5\nt2;98.43\n";
        let mut v = vector();
        let len = v.fill_from_reader(Cursor::new(text), 1, ';', None).unwrap();
        assert_eq!(len, 3);
        assert!(v.is_created());
        let values = v.to_vec().unwrap();
        assert_eq!(&values[..2], &[1.25, -3.5]);
        assert!((values[2] - 98.43).abs() < 1e-9);
    }

    #[test]
    fn test_reader_skips_malformed_rows() {
        let text = "t0;1.0\nheader;value\n\nt3\nt4;4.5\n";
        let mut v = vector();
        let len = v.fill_from_reader(Cursor::new(text), 1, ';', None).unwrap();
        assert_eq!(len, 2);
        assert_eq!(v.to_vec().unwrap(), vec![1.0, 4.5]);
    }

    #[test]
    fn test_reader_skips_rows_with_invalid_utf8() {
        let text: &[u8] = b"t0;1.5\ncaf\xe9;2.5\nt2;3.5\r\nt3;4.5";
        let mut v = vector();
        let len = v.fill_from_reader(Cursor::new(text), 1, ';', None).unwrap();
        assert_eq!(len, 3);
        assert_eq!(v.to_vec().unwrap(), vec![1.5, 3.5, 4.5]);

        let len = v.fill_from_reader(Cursor::new(text), 1, ';', Some(2)).unwrap();
        assert_eq!(len, 1);
    }

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"a;1\r\n"), b"a;1");
        assert_eq!(trim_line_ending(b"a;1\n"), b"a;1");
        assert_eq!(trim_line_ending(b"a;1"), b"a;1");
    }

    #[test]
    fn test_reader_truncates_physical_rows() {
        let text = "a;1\nbad\nc;3\nd;4\n";
        let mut v = vector();
        let len = v.fill_from_reader(Cursor::new(text), 1, ';', Some(3)).unwrap();
        assert_eq!(len, 2);
        assert_eq!(v.to_vec().unwrap(), vec![1.0, 3.0]);

        let len = v.fill_from_reader(Cursor::new(text), 1, ';', Some(100)).unwrap();
        assert_eq!(len, 3);
    }

    #[test]
    fn test_capacity_error_leaves_vector_unchanged() {
        let mut v = CompactVector::from_values(&[7.5, 8.5], 1, FieldWidth::W8).unwrap();
        let result = v.fill_from_reader(Cursor::new("a;1.0\nb;1000.0\n"), 1, ';', None);
        assert!(matches!(result, Err(CompactError::Capacity { .. })));
        assert_eq!(v.to_vec().unwrap(), vec![7.5, 8.5]);
    }

    #[test]
    fn test_destroyed_vector_rejects_ingestion() {
        let mut v = vector();
        v.destroy();
        let result = v.fill_from_reader(Cursor::new("a;1\n"), 1, ';', None);
        assert!(matches!(result, Err(CompactError::Destroyed)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut v = vector();
        let result = v.fill_from_text_records("/nonexistent/compact-float/input.csv", 1, ';', None);
        assert!(matches!(result, Err(CompactError::Io(_))));
    }

    #[test]
    fn test_text_source_defaults() {
        let source = TextSource::default();
        assert_eq!(source.column, DEFAULT_COLUMN);
        assert_eq!(source.delimiter, ';');
        assert_eq!(source.truncate, None);
    }
}
