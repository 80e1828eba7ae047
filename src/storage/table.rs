//! In-memory columnar table.
//!
//! The single dataset in play for a cycle: ordered named columns, each a
//! typed vector with a null bitmap, rows aligned by position. Column
//! names are unique within a table (enforced on append). The pricing
//! deriver appends two columns; nothing else mutates a loaded table.

use std::fmt;

use super::null_bitmap::NullBitmap;
use super::schema::{ColumnDef, DataType, Schema};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl Value {
    /// True for the NULL sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Strings and NULL have none; integers
    /// widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(_) | Value::Null => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => {
                if v.is_nan() {
                    write!(f, "NaN")
                } else if v.is_infinite() {
                    write!(f, "{}", if *v > 0.0 { "Inf" } else { "-Inf" })
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Str(v) => write!(f, "{}", v),
            Value::Null => write!(f, "NULL"),
        }
    }
}

/// Typed backing storage for one column. Null slots hold a placeholder
/// and are only meaningful through the column's bitmap.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Varchar(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Varchar(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::Varchar(_) => DataType::Varchar,
        }
    }
}

/// A named, typed column with null tracking.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
    pub nulls: NullBitmap,
}

impl Column {
    /// Build an INT64 column from optional values (None = NULL).
    pub fn from_i64(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        let mut nulls = NullBitmap::new();
        let data = values
            .into_iter()
            .map(|v| {
                nulls.push(v.is_none());
                v.unwrap_or(0)
            })
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Int64(data),
            nulls,
        }
    }

    /// Build a FLOAT64 column from optional values (None = NULL).
    pub fn from_f64(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let mut nulls = NullBitmap::new();
        let data = values
            .into_iter()
            .map(|v| {
                nulls.push(v.is_none());
                v.unwrap_or(0.0)
            })
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Float64(data),
            nulls,
        }
    }

    /// Build a VARCHAR column from optional values (None = NULL).
    pub fn from_str(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        let mut nulls = NullBitmap::new();
        let data = values
            .into_iter()
            .map(|v| {
                nulls.push(v.is_none());
                v.unwrap_or_default()
            })
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Varchar(data),
            nulls,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Cell value at `row` (NULL-aware).
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    pub fn value(&self, row: usize) -> Value {
        if self.nulls.is_null(row) {
            return Value::Null;
        }
        match &self.data {
            ColumnData::Int64(v) => Value::Int(v[row]),
            ColumnData::Float64(v) => Value::Float(v[row]),
            ColumnData::Varchar(v) => Value::Str(v[row].clone()),
        }
    }

    /// Numeric view of the cell at `row`: None for NULL or text.
    pub fn numeric(&self, row: usize) -> Option<f64> {
        if self.nulls.is_null(row) {
            return None;
        }
        match &self.data {
            ColumnData::Int64(v) => Some(v[row] as f64),
            ColumnData::Float64(v) => Some(v[row]),
            ColumnData::Varchar(_) => None,
        }
    }

    /// Count of NULL cells.
    pub fn null_count(&self) -> usize {
        self.nulls.null_count()
    }
}

/// Errors violating table structure invariants.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("column '{name}' has {len} rows, table has {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
}

/// Shape and missing-value report for a table. Pure read, computed fresh
/// each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProfile {
    pub row_count: usize,
    pub column_count: usize,
    /// (column name, missing cell count) in column order.
    pub missing: Vec<(String, usize)>,
}

/// The in-memory dataset.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Fails on a duplicate name or row-count mismatch
    /// (the first column fixes the table's row count).
    pub fn add_column(&mut self, column: Column) -> Result<(), TableError> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(TableError::DuplicateColumn(column.name));
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        } else if column.len() != self.row_count {
            let len = column.len();
            return Err(TableError::LengthMismatch {
                name: column.name,
                len,
                expected: self.row_count,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Append a column, replacing an existing column with the same name
    /// in place. Lets the pricing deriver overwrite stale derived
    /// columns carried in a source file.
    pub fn upsert_column(&mut self, column: Column) -> Result<(), TableError> {
        match self.columns.iter().position(|c| c.name == column.name) {
            Some(idx) => {
                if column.len() != self.row_count {
                    let len = column.len();
                    return Err(TableError::LengthMismatch {
                        name: column.name,
                        len,
                        expected: self.row_count,
                    });
                }
                self.columns[idx] = column;
                Ok(())
            }
            None => self.add_column(column),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column by case-insensitive name (SQL identifier lookup).
    pub fn column_ci(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Derive the schema from the current columns.
    pub fn schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| ColumnDef {
                    name: c.name.clone(),
                    data_type: c.data_type(),
                })
                .collect(),
        )
    }

    /// Shape and per-column missing counts.
    pub fn profile(&self) -> TableProfile {
        TableProfile {
            row_count: self.row_count,
            column_count: self.columns.len(),
            missing: self
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.null_count()))
                .collect(),
        }
    }

    /// First `n` rows as display strings, with the header, for the
    /// dataset preview panel.
    pub fn preview(&self, n: usize) -> (Vec<String>, Vec<Vec<String>>) {
        let header = self.columns.iter().map(|c| c.name.clone()).collect();
        let rows = (0..self.row_count.min(n))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.value(row).to_string())
                    .collect()
            })
            .collect();
        (header, rows)
    }
}
