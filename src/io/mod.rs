//! Dataset input: CSV reading and source resolution.

pub mod csv;
pub mod source;

pub use csv::{load_table, parse_header, CsvError, CsvMetadata};
pub use source::{SourceError, SourceSpec, SAMPLE_FILE};
