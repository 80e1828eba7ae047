//! CSV reader: header metadata plus full table loading.
//!
//! The header pass extracts column names and detects the delimiter
//! (comma, tab, or pipe by frequency). The load pass reads every record,
//! records empty cells as NULL, and infers each column's type from its
//! values: all-integer -> INT64, otherwise all-numeric -> FLOAT64,
//! otherwise VARCHAR.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::storage::{Column, Table};

/// Errors surfaced while reading a CSV file. All are fatal for the
/// current cycle.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV file is empty: no header line")]
    Empty,
    #[error("CSV header line is empty")]
    EmptyHeader,
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("table error: {0}")]
    Table(#[from] crate::storage::TableError),
}

/// Metadata extracted from a CSV file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvMetadata {
    /// Column names extracted from the header line.
    pub column_names: Vec<String>,
    /// Detected delimiter character.
    pub delimiter: u8,
    /// Path to the source file.
    pub file_path: PathBuf,
}

/// Candidate delimiters in priority order.
const CANDIDATES: &[u8] = b",\t|";

/// Detect the most likely delimiter in a header line.
///
/// Counts occurrences of each candidate and returns the most frequent.
/// Defaults to comma when no candidate appears.
fn detect_delimiter(line: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0usize;

    for &delim in CANDIDATES {
        let count = line.bytes().filter(|&b| b == delim).count();
        if count > best_count {
            best_count = count;
            best = delim;
        }
    }

    best
}

/// Split one record on the delimiter, honoring double-quoted fields
/// with `""` escapes.
fn split_record(line: &str, delimiter: u8) -> Vec<String> {
    let delim = delimiter as char;
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else if ch == '"' && field.is_empty() {
            in_quotes = true;
        } else if ch == delim {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(ch);
        }
    }
    fields.push(field);
    fields
}

/// Parse a header line into metadata.
fn header_from_line(line: &str, path: &Path) -> Result<CsvMetadata, CsvError> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        return Err(CsvError::EmptyHeader);
    }

    let delimiter = detect_delimiter(line);
    let column_names = split_record(line, delimiter)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                format!("_col_{}", i)
            } else {
                trimmed
            }
        })
        .collect();

    Ok(CsvMetadata {
        column_names,
        delimiter,
        file_path: path.to_path_buf(),
    })
}

/// Parse only the header of a CSV file.
///
/// # Errors
/// Fails if the file cannot be opened, is empty, or has a blank header.
pub fn parse_header<P: AsRef<Path>>(path: P) -> Result<CsvMetadata, CsvError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut header_line = String::new();
    let n = reader.read_line(&mut header_line).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if n == 0 {
        return Err(CsvError::Empty);
    }

    header_from_line(&header_line, path)
}

/// Load a whole CSV file into a [`Table`].
///
/// Empty cells become NULL. Each column's type is inferred from its
/// non-null cells; a column with no non-null cells stays VARCHAR.
/// Trailing blank lines are skipped; any other record with the wrong
/// field count is an error.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table, CsvError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = match lines.next() {
        Some(Ok(line)) => line,
        Some(Err(source)) => {
            return Err(CsvError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
        None => return Err(CsvError::Empty),
    };
    let meta = header_from_line(&header_line, path)?;
    let ncols = meta.column_names.len();

    // Column-major cell storage; None = missing.
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); ncols];

    for (line_no, line) in lines.enumerate() {
        let line = line.map_err(|source| CsvError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let fields = split_record(line, meta.delimiter);
        if fields.len() != ncols {
            return Err(CsvError::FieldCount {
                line: line_no + 2, // 1-based, after the header
                expected: ncols,
                found: fields.len(),
            });
        }

        for (col, field) in fields.into_iter().enumerate() {
            let trimmed = field.trim();
            if trimmed.is_empty() {
                cells[col].push(None);
            } else {
                cells[col].push(Some(trimmed.to_string()));
            }
        }
    }

    let mut table = Table::new();
    for (name, column_cells) in meta.column_names.iter().zip(cells) {
        table.add_column(infer_column(name, column_cells))?;
    }

    debug!(
        path = %path.display(),
        rows = table.row_count(),
        cols = table.num_columns(),
        "loaded csv"
    );
    Ok(table)
}

/// Infer a column's type from its raw cells and build it.
fn infer_column(name: &str, cells: Vec<Option<String>>) -> Column {
    let non_null = cells.iter().flatten();

    let all_int = {
        let mut any = false;
        let ok = non_null.clone().all(|s| {
            any = true;
            s.parse::<i64>().is_ok()
        });
        ok && any
    };
    if all_int {
        return Column::from_i64(
            name,
            cells
                .into_iter()
                .map(|c| c.and_then(|s| s.parse::<i64>().ok()))
                .collect(),
        );
    }

    let all_float = {
        let mut any = false;
        let ok = non_null.clone().all(|s| {
            any = true;
            s.parse::<f64>().is_ok()
        });
        ok && any
    };
    if all_float {
        return Column::from_f64(
            name,
            cells
                .into_iter()
                .map(|c| c.and_then(|s| s.parse::<f64>().ok()))
                .collect(),
        );
    }

    Column::from_str(name, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DataType, Value};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: create a temp CSV file with given content.
    fn make_csv(content: &str) -> NamedTempFile {
        let mut f = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        f.write_all(content.as_bytes()).expect("write csv");
        f.flush().expect("flush csv");
        f
    }

    #[test]
    fn test_parse_header_comma() {
        let tmp = make_csv("Product,Cost,Price\nWidget,10,20\n");
        let meta = parse_header(tmp.path()).unwrap();
        assert_eq!(meta.column_names, vec!["Product", "Cost", "Price"]);
        assert_eq!(meta.delimiter, b',');
    }

    #[test]
    fn test_parse_header_tab_and_pipe() {
        let tmp = make_csv("a\tb\tc\n1\t2\t3\n");
        assert_eq!(parse_header(tmp.path()).unwrap().delimiter, b'\t');

        let tmp = make_csv("a|b|c\n1|2|3\n");
        assert_eq!(parse_header(tmp.path()).unwrap().delimiter, b'|');
    }

    #[test]
    fn test_parse_header_empty_file() {
        let tmp = make_csv("");
        assert!(matches!(parse_header(tmp.path()), Err(CsvError::Empty)));
    }

    #[test]
    fn test_parse_header_blank_name() {
        let tmp = make_csv("a,,c\n1,2,3\n");
        let meta = parse_header(tmp.path()).unwrap();
        assert_eq!(meta.column_names, vec!["a", "_col_1", "c"]);
    }

    #[test]
    fn test_load_infers_types() {
        let tmp = make_csv("Product,Cost,Price\nWidget,10,19.5\nGadget,5,5\n");
        let t = load_table(tmp.path()).unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column("Product").unwrap().data_type(), DataType::Varchar);
        assert_eq!(t.column("Cost").unwrap().data_type(), DataType::Int64);
        assert_eq!(t.column("Price").unwrap().data_type(), DataType::Float64);
        assert_eq!(t.column("Price").unwrap().value(0), Value::Float(19.5));
    }

    #[test]
    fn test_load_empty_cells_are_null() {
        let tmp = make_csv("Product,Cost\nWidget,\n,5\n");
        let t = load_table(tmp.path()).unwrap();
        assert_eq!(t.column("Cost").unwrap().null_count(), 1);
        assert_eq!(t.column("Product").unwrap().null_count(), 1);
        // Cost stays numeric despite the missing cell
        assert_eq!(t.column("Cost").unwrap().data_type(), DataType::Int64);
    }

    #[test]
    fn test_load_all_null_column_is_varchar() {
        let tmp = make_csv("a,b\n1,\n2,\n");
        let t = load_table(tmp.path()).unwrap();
        assert_eq!(t.column("b").unwrap().data_type(), DataType::Varchar);
        assert_eq!(t.column("b").unwrap().null_count(), 2);
    }

    #[test]
    fn test_load_quoted_fields() {
        let tmp = make_csv("Product,Note\n\"Widget, large\",\"said \"\"hi\"\"\"\n");
        let t = load_table(tmp.path()).unwrap();
        assert_eq!(
            t.column("Product").unwrap().value(0),
            Value::Str("Widget, large".into())
        );
        assert_eq!(
            t.column("Note").unwrap().value(0),
            Value::Str("said \"hi\"".into())
        );
    }

    #[test]
    fn test_load_field_count_mismatch() {
        let tmp = make_csv("a,b\n1,2\n1,2,3\n");
        let err = load_table(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            CsvError::FieldCount {
                line: 3,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_load_skips_blank_lines_and_crlf() {
        let tmp = make_csv("a,b\r\n1,2\r\n\r\n3,4\r\n");
        let t = load_table(tmp.path()).unwrap();
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = load_table("/tmp/margin_lens_missing_12345.csv").unwrap_err();
        assert!(matches!(err, CsvError::Io { .. }));
    }

    #[test]
    fn test_detect_delimiter_prefers_most_frequent() {
        assert_eq!(detect_delimiter("a\tb\tc,d"), b'\t');
        assert_eq!(detect_delimiter("a,b,c\td"), b',');
        assert_eq!(detect_delimiter("plain"), b',');
    }
}
