//! Runtime schema for the loaded table.
//!
//! Maps column names to inferred data types. Well-known pricing columns
//! (`Cost`, `Price`, `Product`) are matched exactly by the deriver;
//! SQL identifier lookup is case-insensitive to match the relational
//! store the query panel emulates.

use std::fmt;

/// Data types a column can be inferred as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit IEEE 754 float.
    Float64,
    /// Arbitrary text.
    Varchar,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int64 => write!(f, "INT64"),
            DataType::Float64 => write!(f, "FLOAT64"),
            DataType::Varchar => write!(f, "VARCHAR"),
        }
    }
}

/// A column descriptor with name and inferred type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name from the CSV header.
    pub name: String,
    /// Inferred data type.
    pub data_type: DataType,
}

/// Schema describing the structure of a loaded table.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Ordered list of column definitions.
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get column index by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column index by case-insensitive name (SQL identifier lookup).
    pub fn column_index_ci(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check whether a column with this exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }
}
