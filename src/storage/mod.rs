//! Columnar in-memory storage for the loaded dataset.

pub mod null_bitmap;
pub mod schema;
pub mod table;

pub use null_bitmap::NullBitmap;
pub use schema::{ColumnDef, DataType, Schema};
pub use table::{Column, ColumnData, Table, TableError, TableProfile, Value};
